//! Display formatting of measured integers.
//!
//! Format rules select measurements by any combination of value type,
//! contract label and measurement name. Matching rules merge from least to
//! most specific, so a rule naming a single measurement overrides a rule
//! for its whole contract. A `raw` rule discards every setting coming from
//! rules of lower or equal specificity.

use serde::{Deserialize, Serialize};

use lens_types::{Integer, MeasuredValue, Scalar};

/// One configured formatting rule.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatRule {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurement: Option<String>,
    /// Unit scaling: values are divided by `10^decimals`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u32>,
    /// Digits kept after the decimal point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    /// Explicit "no formatting".
    #[serde(default)]
    pub raw: bool,
}

impl FormatRule {
    /// Number of selectors the rule sets.
    pub fn specificity(&self) -> usize {
        [&self.ty, &self.contract, &self.measurement]
            .iter()
            .filter(|s| s.is_some())
            .count()
    }

    /// Returns `true` if every selector the rule sets matches.
    pub fn matches(&self, ty: &str, contract: &str, measurement: &str) -> bool {
        let hit = |selector: &Option<String>, value: &str| {
            selector.as_deref().map_or(true, |s| s == value)
        };
        hit(&self.ty, ty) && hit(&self.contract, contract) && hit(&self.measurement, measurement)
    }
}

/// Effective formatting for one measurement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Formatting {
    pub decimals: Option<u32>,
    pub precision: Option<u32>,
}

impl Formatting {
    /// Merge the rules matching `(ty, contract, measurement)`.
    pub fn resolve(rules: &[FormatRule], ty: &str, contract: &str, measurement: &str) -> Self {
        let mut matching: Vec<&FormatRule> = rules
            .iter()
            .filter(|r| r.matches(ty, contract, measurement))
            .collect();
        matching.sort_by_key(|r| r.specificity());

        let mut formatting = Self::default();
        for level in matching.chunk_by(|a, b| a.specificity() == b.specificity()) {
            if level.iter().any(|r| r.raw) {
                formatting = Self::default();
                continue;
            }
            for rule in level {
                formatting.decimals = rule.decimals.or(formatting.decimals);
                formatting.precision = rule.precision.or(formatting.precision);
            }
        }
        formatting
    }

    /// Returns `true` if values render unchanged.
    pub fn is_raw(&self) -> bool {
        self.decimals.is_none()
    }

    /// Render an integer, scaled by `decimals`.
    pub fn int(&self, value: Integer) -> String {
        let Some(decimals) = self.decimals else {
            return value.to_string();
        };
        let decimals = decimals as usize;
        let mut digits = value.magnitude().to_string();
        if digits.len() <= decimals {
            digits = format!("{}{digits}", "0".repeat(decimals + 1 - digits.len()));
        }
        let (whole, fraction) = digits.split_at(digits.len() - decimals);
        let fraction = match self.precision {
            Some(p) => {
                let p = p as usize;
                if p <= fraction.len() {
                    fraction[..p].to_string()
                } else {
                    format!("{fraction}{}", "0".repeat(p - fraction.len()))
                }
            }
            None => fraction.trim_end_matches('0').to_string(),
        };

        let sign = if value.is_negative() { "-" } else { "" };
        if fraction.is_empty() {
            format!("{sign}{whole}")
        } else {
            format!("{sign}{whole}.{fraction}")
        }
    }

    pub fn scalar(&self, scalar: &Scalar) -> String {
        match scalar {
            Scalar::Int(v) => self.int(*v),
            other => other.to_string(),
        }
    }

    /// Render a measured value; arrays render elementwise.
    pub fn value(&self, value: &MeasuredValue) -> String {
        match value {
            MeasuredValue::Value(s) => self.scalar(s),
            MeasuredValue::Array(items) => {
                let items: Vec<String> = items.iter().map(|s| self.scalar(s)).collect();
                format!("[{}]", items.join(", "))
            }
            MeasuredValue::Error(e) => format!("error: {e}"),
        }
    }
}
