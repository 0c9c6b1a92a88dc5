use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use lens_diff::NodeDelta;
use lens_graph::Node;
use lens_measure::MeasurementSet;
use lens_sequence::ActionReport;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::SdkResult;

/// One action with its post-action measurements and their delta.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    #[serde(flatten)]
    pub report: ActionReport,
    pub delta: Vec<NodeDelta>,
}

/// Everything one inspection run produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Discovered nodes, sorted by label.
    pub nodes: Vec<Node>,
    pub before: MeasurementSet,
    pub actions: Vec<ActionOutcome>,
    /// Mermaid rendering of the graph.
    pub diagram: String,
}

/// Writes report files into a directory.
///
/// Layout: `before.json`, one `<slug>.json` per action (in run order, with
/// a numeric suffix when two labels share a slug), and `graph.mmd`.
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write every file of `report`, returning the paths written.
    pub fn write(&self, report: &RunReport) -> SdkResult<Vec<PathBuf>> {
        fs::create_dir_all(&self.dir)?;
        let mut written = Vec::new();

        written.push(self.write_json("before.json", &report.before)?);

        let mut used = HashSet::new();
        for outcome in &report.actions {
            let base = slug(outcome.report.label());
            let mut name = base.clone();
            let mut n = 2;
            while !used.insert(name.clone()) || name == "before" {
                name = format!("{base}-{n}");
                n += 1;
            }
            written.push(self.write_json(&format!("{name}.json"), outcome)?);
        }

        let graph = self.dir.join("graph.mmd");
        fs::write(&graph, &report.diagram)?;
        written.push(graph);

        info!(dir = %self.dir.display(), files = written.len(), "wrote report");
        Ok(written)
    }

    fn write_json<T: Serialize>(&self, file: &str, value: &T) -> SdkResult<PathBuf> {
        let path = self.dir.join(file);
        fs::write(&path, serde_json::to_string_pretty(value)?)?;
        Ok(path)
    }
}

/// File-name form of an action label: lower-case alphanumerics separated by
/// single dashes.
pub fn slug(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_end_matches('-');
    if trimmed.is_empty() {
        "action".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Read a measurement set from `before.json` or from an action file.
pub fn load_set(path: impl AsRef<Path>) -> SdkResult<MeasurementSet> {
    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(path)?)?;
    let set = match value.get("after") {
        Some(after) => serde_json::from_value(after.clone())?,
        None => serde_json::from_value(value)?,
    };
    Ok(set)
}
