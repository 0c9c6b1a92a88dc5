//! Human-readable lines for measurement sets and deltas.

use lens_diff::{DeltaPayload, ElementDelta, NodeDelta};
use lens_measure::{ActionSummary, FormatRule, Formatting, MeasurementSet};
use lens_types::Integer;

/// One line per measurement: `Node.name = value`.
pub fn render_set(set: &MeasurementSet, rules: &[FormatRule]) -> Vec<String> {
    let mut lines = Vec::new();
    for node in &set.nodes {
        for m in &node.measurements {
            let f = Formatting::resolve(rules, &m.ty, &node.contract_label, &m.name);
            lines.push(format!("{}.{} = {}", node.name, m.label(), f.value(&m.outcome)));
        }
    }
    lines
}

/// One line per delta: `Node.name: change`.
pub fn render_deltas(deltas: &[NodeDelta], rules: &[FormatRule]) -> Vec<String> {
    let mut lines = Vec::new();
    for node in deltas {
        for delta in &node.deltas {
            let f = Formatting::resolve(rules, &delta.ty, &node.contract_label, &delta.name);
            lines.push(format!("{}.{}: {}", node.name, delta.label(), payload(&f, &delta.payload)));
        }
    }
    lines
}

/// `label: gas 21000`, `label: returned 5` or `label: failed: reason`.
pub fn render_summary(summary: &ActionSummary) -> String {
    let mut line = summary.label.clone();
    if let Some(gas) = summary.gas_used {
        line.push_str(&format!(": gas {gas}"));
    }
    if let Some(value) = &summary.returned {
        line.push_str(&format!(": returned {value}"));
    }
    if let Some(error) = &summary.error {
        line.push_str(&format!(": failed: {error}"));
    }
    line
}

fn signed(f: &Formatting, d: Integer) -> String {
    if d.is_negative() {
        f.int(d)
    } else {
        format!("+{}", f.int(d))
    }
}

fn payload(f: &Formatting, payload: &DeltaPayload) -> String {
    match payload {
        DeltaPayload::Numeric(d) => signed(f, *d),
        DeltaPayload::Replaced { before, after } => {
            format!("{} => {}", f.scalar(before), f.scalar(after))
        }
        DeltaPayload::Elementwise(elements) => {
            let items: Vec<String> = elements
                .iter()
                .map(|e| match e {
                    ElementDelta::Numeric(d) => signed(f, *d),
                    ElementDelta::Same => "=".to_string(),
                    ElementDelta::Replaced { before, after } => {
                        format!("{} => {}", f.scalar(before), f.scalar(after))
                    }
                })
                .collect();
            format!("[{}]", items.join(", "))
        }
        DeltaPayload::Transition {
            description,
            surviving: Some(value),
        } => format!("{description} (value {})", f.value(value)),
        DeltaPayload::Transition { description, .. } => description.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lens_diff::Delta;
    use lens_measure::{Measurement, NodeMeasurements};
    use lens_types::{MeasuredValue, NodeKey, Scalar};

    fn rules() -> Vec<FormatRule> {
        vec![FormatRule {
            ty: Some("uint256".into()),
            decimals: Some(2),
            ..FormatRule::default()
        }]
    }

    fn delta(name: &str, payload: DeltaPayload) -> Delta {
        Delta {
            name: name.into(),
            ty: "uint256".into(),
            target: None,
            payload,
        }
    }

    #[test]
    fn deltas_apply_formats() {
        let deltas = vec![NodeDelta {
            address: NodeKey::new("0x01"),
            name: "Vault".into(),
            contract_label: "Vault".into(),
            deltas: vec![
                delta("assets", DeltaPayload::Numeric(Integer::from(150i64))),
                delta("debt", DeltaPayload::Numeric(Integer::from(-25i64))),
                delta(
                    "weights",
                    DeltaPayload::Elementwise(vec![
                        ElementDelta::Numeric(Integer::ZERO),
                        ElementDelta::Numeric(Integer::from(100i64)),
                    ]),
                ),
                delta(
                    "price",
                    DeltaPayload::Transition {
                        description: "value => error: stale".into(),
                        surviving: Some(MeasuredValue::Value(Scalar::int(300))),
                    },
                ),
            ],
        }];

        assert_eq!(
            render_deltas(&deltas, &rules()),
            vec![
                "Vault.assets: +1.5",
                "Vault.debt: -0.25",
                "Vault.weights: [+0, +1]",
                "Vault.price: value => error: stale (value 3)",
            ]
        );
    }

    #[test]
    fn sets_and_summaries() {
        let set = MeasurementSet::new(vec![NodeMeasurements {
            address: NodeKey::new("0x01"),
            name: "Token".into(),
            contract_label: "Token".into(),
            measurements: vec![Measurement {
                name: "balanceOf".into(),
                ty: "uint256".into(),
                target: Some(NodeKey::new("0x02")),
                outcome: MeasuredValue::Value(Scalar::int(1234)),
            }],
        }]);
        assert_eq!(render_set(&set, &rules()), vec!["Token.balanceOf(0x02) = 12.34"]);
        assert_eq!(render_set(&set, &[]), vec!["Token.balanceOf(0x02) = 1234"]);

        let summary = ActionSummary {
            label: "deposit".into(),
            gas_used: Some(42_000),
            error: Some("reverted".into()),
            ..ActionSummary::default()
        };
        assert_eq!(render_summary(&summary), "deposit: gas 42000: failed: reverted");
    }
}
