use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use colored::Colorize;
use lens_diff::{diff_sets, diff_tables, table_codec, TableDifference};
use lens_sdk::render::{render_deltas, render_set, render_summary};
use lens_sdk::{load_set, FormatRule, RunConfig};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Command::Show(args) => cmd_show(args, cli.format),
        Command::Delta(args) => cmd_delta(args, cli.format),
        Command::TableDiff(args) => cmd_table_diff(args, cli.format),
        Command::CheckConfig(args) => cmd_check_config(args),
    }
}

fn format_rules(config: Option<&Path>) -> anyhow::Result<Vec<FormatRule>> {
    match config {
        Some(path) => {
            let config = RunConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?;
            Ok(config.formats)
        }
        None => Ok(Vec::new()),
    }
}

fn cmd_show(args: ShowArgs, format: OutputFormat) -> anyhow::Result<ExitCode> {
    let set = load_set(&args.set).with_context(|| format!("reading {}", args.set.display()))?;
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&set)?);
        return Ok(ExitCode::SUCCESS);
    }
    let rules = format_rules(args.config.as_deref())?;
    if let Some(summary) = &set.summary {
        println!("{}", render_summary(summary).bold());
    }
    for line in render_set(&set, &rules) {
        println!("  {line}");
    }
    println!("{} measurements, {} succeeded", set.len(), set.successes());
    Ok(ExitCode::SUCCESS)
}

fn cmd_delta(args: DeltaArgs, format: OutputFormat) -> anyhow::Result<ExitCode> {
    let before = load_set(&args.before).with_context(|| format!("reading {}", args.before.display()))?;
    let after = load_set(&args.after).with_context(|| format!("reading {}", args.after.display()))?;
    let deltas = diff_sets(&before, &after)?;
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&deltas)?);
        return Ok(ExitCode::SUCCESS);
    }
    let rules = format_rules(args.config.as_deref())?;
    if let Some(summary) = &after.summary {
        println!("{}", render_summary(summary).bold());
    }
    let lines = render_deltas(&deltas, &rules);
    if lines.is_empty() {
        println!("{} No changes.", "✓".green());
    }
    for line in lines {
        println!("  {}", line.yellow());
    }
    Ok(ExitCode::SUCCESS)
}

/// Decode both tables and compare them.
pub fn compare_tables(expected: &str, actual: &str) -> anyhow::Result<Vec<TableDifference>> {
    let expected = table_codec::decode(expected).context("decoding expected table")?;
    let actual = table_codec::decode(actual).context("decoding actual table")?;
    Ok(diff_tables(&expected, &actual))
}

fn cmd_table_diff(args: TableDiffArgs, format: OutputFormat) -> anyhow::Result<ExitCode> {
    let expected = std::fs::read_to_string(&args.expected)
        .with_context(|| format!("reading {}", args.expected.display()))?;
    let actual = std::fs::read_to_string(&args.actual)
        .with_context(|| format!("reading {}", args.actual.display()))?;
    let differences = compare_tables(&expected, &actual)?;
    tracing::debug!(count = differences.len(), "tables compared");

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&differences)?);
    } else if differences.is_empty() {
        println!("{} Tables match.", "✓".green().bold());
    } else {
        for difference in &differences {
            println!("  {} {}", "✗".red(), difference);
        }
        println!("{} differences", differences.len().to_string().bold());
    }
    Ok(if differences.is_empty() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn cmd_check_config(args: CheckConfigArgs) -> anyhow::Result<ExitCode> {
    let config = RunConfig::load(&args.path)
        .with_context(|| format!("loading {}", args.path.display()))?;
    println!("{} {} is valid", "✓".green().bold(), args.path.display());
    println!("  Seeds: {}", config.seeds.len());
    println!("  Stop list: {}", config.stop_list.len());
    println!("  Actions: {}", config.actions.len());
    for action in &config.actions {
        println!("    {}", action.label().cyan());
    }
    println!("  Format rules: {}", config.formats.len());
    println!("  Reports: {}", config.report_dir.display());
    Ok(ExitCode::SUCCESS)
}
