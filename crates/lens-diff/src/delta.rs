//! Before/after comparison of measurement sets.
//!
//! Sets are matched by position, node by node and measurement by
//! measurement. Each pair of outcomes falls into exactly one case:
//!
//! 1. both errors: a transition if the messages differ
//! 2. error on one side only: a transition carrying the surviving value
//! 3. two scalars: the numeric difference, or a replacement for
//!    non-numeric values
//! 4. two arrays of equal length: an elementwise delta if anything changed
//! 5. two arrays of different length: a length transition
//! 6. a scalar and an array: a type transition
//!
//! Equal outcomes produce no entry, and nodes without entries are omitted.

use serde::{Deserialize, Serialize};

use lens_measure::{Measurement, MeasurementSet, NodeMeasurements};
use lens_types::{Integer, MeasuredValue, NodeKey, Scalar};

use crate::error::{DiffError, DiffResult};

/// Change of one measurement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaPayload {
    /// `after - before` of two integers.
    Numeric(Integer),
    /// Two differing non-numeric scalars.
    Replaced { before: Scalar, after: Scalar },
    /// Per-element change of two arrays of equal length.
    Elementwise(Vec<ElementDelta>),
    /// A change that has no difference value: errors appearing,
    /// disappearing or changing, and representation changes.
    Transition {
        description: String,
        /// The value present on the non-error side, if any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        surviving: Option<MeasuredValue>,
    },
}

/// Change of one array element.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementDelta {
    /// Difference of two integers (zero when unchanged).
    Numeric(Integer),
    /// Equal non-numeric elements.
    Same,
    /// Differing non-numeric elements.
    Replaced { before: Scalar, after: Scalar },
}

impl ElementDelta {
    pub fn is_change(&self) -> bool {
        match self {
            Self::Numeric(d) => !d.is_zero(),
            Self::Same => false,
            Self::Replaced { .. } => true,
        }
    }
}

/// One changed measurement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delta {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<NodeKey>,
    pub payload: DeltaPayload,
}

impl Delta {
    /// `name`, or `name(target)` for relational measurements.
    pub fn label(&self) -> String {
        match &self.target {
            Some(target) => format!("{}({})", self.name, target.short()),
            None => self.name.clone(),
        }
    }

    /// Returns `true` for transition deltas.
    pub fn is_transition(&self) -> bool {
        matches!(self.payload, DeltaPayload::Transition { .. })
    }
}

/// Changed measurements of one node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDelta {
    pub address: NodeKey,
    pub name: String,
    pub contract_label: String,
    pub deltas: Vec<Delta>,
}

/// Compare two measurement sets produced by the same registry.
///
/// The action summary carried by `after` is not compared. Differing set
/// lengths, node identities or measurement counts are errors.
pub fn diff_sets(before: &MeasurementSet, after: &MeasurementSet) -> DiffResult<Vec<NodeDelta>> {
    if before.nodes.len() != after.nodes.len() {
        return Err(DiffError::ShapeMismatch(format!(
            "{} nodes before, {} after",
            before.nodes.len(),
            after.nodes.len()
        )));
    }

    let mut result = Vec::new();
    for (index, (b, a)) in before.nodes.iter().zip(&after.nodes).enumerate() {
        check_identity(index, b, a)?;
        let mut deltas = Vec::new();
        for (mb, ma) in b.measurements.iter().zip(&a.measurements) {
            if mb.name != ma.name || mb.target != ma.target {
                return Err(DiffError::ShapeMismatch(format!(
                    "node {} measures {} before and {} after at the same position",
                    b.address,
                    mb.label(),
                    ma.label()
                )));
            }
            if let Some(payload) = compare(&mb.outcome, &ma.outcome) {
                deltas.push(delta_of(ma, payload));
            }
        }
        if !deltas.is_empty() {
            result.push(NodeDelta {
                address: a.address.clone(),
                name: a.name.clone(),
                contract_label: a.contract_label.clone(),
                deltas,
            });
        }
    }
    Ok(result)
}

fn check_identity(index: usize, b: &NodeMeasurements, a: &NodeMeasurements) -> DiffResult<()> {
    if b.address != a.address || b.name != a.name || b.contract_label != a.contract_label {
        return Err(DiffError::ShapeMismatch(format!(
            "position {index} holds {} ({}) before and {} ({}) after",
            b.name, b.address, a.name, a.address
        )));
    }
    if b.measurements.len() != a.measurements.len() {
        return Err(DiffError::ShapeMismatch(format!(
            "{} has {} measurements before, {} after",
            b.name,
            b.measurements.len(),
            a.measurements.len()
        )));
    }
    Ok(())
}

fn delta_of(measurement: &Measurement, payload: DeltaPayload) -> Delta {
    Delta {
        name: measurement.name.clone(),
        ty: measurement.ty.clone(),
        target: measurement.target.clone(),
        payload,
    }
}

fn transition(description: String, surviving: Option<MeasuredValue>) -> Option<DeltaPayload> {
    Some(DeltaPayload::Transition {
        description,
        surviving,
    })
}

fn compare(before: &MeasuredValue, after: &MeasuredValue) -> Option<DeltaPayload> {
    use MeasuredValue::{Array, Error, Value};

    match (before, after) {
        (Error(b), Error(a)) if b == a => None,
        (Error(b), Error(a)) => transition(format!("{b} => {a}"), None),
        (Error(b), value) => transition(format!("error => value (was: {b})"), Some(value.clone())),
        (value, Error(a)) => transition(format!("value => error: {a}"), Some(value.clone())),
        (Value(b), Value(a)) => compare_scalars(b, a),
        (Array(b), Array(a)) if b.len() == a.len() => {
            let elements: Vec<ElementDelta> =
                b.iter().zip(a).map(|(x, y)| compare_elements(x, y)).collect();
            elements
                .iter()
                .any(ElementDelta::is_change)
                .then_some(DeltaPayload::Elementwise(elements))
        }
        (Array(b), Array(a)) => transition(
            format!("array length changed: {} => {}", b.len(), a.len()),
            None,
        ),
        (Value(_), Array(_)) => transition("type changed: scalar => array".into(), None),
        (Array(_), Value(_)) => transition("type changed: array => scalar".into(), None),
    }
}

fn compare_scalars(before: &Scalar, after: &Scalar) -> Option<DeltaPayload> {
    match (before, after) {
        (Scalar::Int(b), Scalar::Int(a)) => match a.checked_sub(*b) {
            Some(d) if d.is_zero() => None,
            Some(d) => Some(DeltaPayload::Numeric(d)),
            None => transition(format!("difference out of range: {b} => {a}"), None),
        },
        (b, a) if b == a => None,
        (b, a) if b.type_name() != a.type_name() => transition(
            format!("type changed: {} => {}", b.type_name(), a.type_name()),
            None,
        ),
        (b, a) => Some(DeltaPayload::Replaced {
            before: b.clone(),
            after: a.clone(),
        }),
    }
}

fn compare_elements(before: &Scalar, after: &Scalar) -> ElementDelta {
    match (before, after) {
        (Scalar::Int(b), Scalar::Int(a)) => match a.checked_sub(*b) {
            Some(d) => ElementDelta::Numeric(d),
            None => ElementDelta::Replaced {
                before: before.clone(),
                after: after.clone(),
            },
        },
        (b, a) if b == a => ElementDelta::Same,
        (b, a) => ElementDelta::Replaced {
            before: b.clone(),
            after: a.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lens_measure::ActionSummary;

    fn int(v: i64) -> MeasuredValue {
        MeasuredValue::Value(Scalar::int(v))
    }

    fn ints(vs: &[i64]) -> MeasuredValue {
        MeasuredValue::Array(vs.iter().map(|v| Scalar::int(*v)).collect())
    }

    fn set(outcomes: Vec<MeasuredValue>) -> MeasurementSet {
        MeasurementSet::new(vec![NodeMeasurements {
            address: NodeKey::new("0x01"),
            name: "Vault".into(),
            contract_label: "Vault".into(),
            measurements: outcomes
                .into_iter()
                .enumerate()
                .map(|(i, outcome)| Measurement {
                    name: format!("m{i}"),
                    ty: "uint256".into(),
                    target: None,
                    outcome,
                })
                .collect(),
        }])
    }

    fn single(before: MeasuredValue, after: MeasuredValue) -> Option<DeltaPayload> {
        let deltas = diff_sets(&set(vec![before]), &set(vec![after])).unwrap();
        deltas.into_iter().next().map(|n| n.deltas[0].payload.clone())
    }

    #[test]
    fn identical_sets_have_no_delta() {
        let outcomes = vec![
            int(5),
            ints(&[1, 2]),
            MeasuredValue::error("reverted"),
            MeasuredValue::Value(Scalar::text("x")),
        ];
        let before = set(outcomes.clone());
        let after = set(outcomes).with_summary(ActionSummary {
            label: "noop".into(),
            ..ActionSummary::default()
        });
        assert!(diff_sets(&before, &after).unwrap().is_empty());
    }

    #[test]
    fn numeric_delta() {
        assert_eq!(single(int(5), int(8)), Some(DeltaPayload::Numeric(Integer::from(3i64))));
        assert_eq!(single(int(8), int(5)), Some(DeltaPayload::Numeric(Integer::from(-3i64))));
    }

    #[test]
    fn full_range_unsigned_deltas() {
        use lens_types::U256;

        let zero = MeasuredValue::Value(Scalar::uint(U256::ZERO));
        let max = MeasuredValue::Value(Scalar::uint(U256::MAX));
        let five = MeasuredValue::Value(Scalar::uint(U256::from(5)));

        assert_eq!(
            single(zero, max.clone()),
            Some(DeltaPayload::Numeric(Integer::from(U256::MAX)))
        );
        assert_eq!(
            single(max.clone(), five.clone()),
            Some(DeltaPayload::Numeric(-Integer::from(U256::MAX - U256::from(5))))
        );
        assert_eq!(
            single(
                MeasuredValue::Array(vec![Scalar::uint(U256::MAX), Scalar::int(1)]),
                MeasuredValue::Array(vec![Scalar::uint(U256::from(5)), Scalar::int(1)])
            ),
            Some(DeltaPayload::Elementwise(vec![
                ElementDelta::Numeric(-Integer::from(U256::MAX - U256::from(5))),
                ElementDelta::Numeric(Integer::ZERO),
            ]))
        );
        assert_eq!(single(max.clone(), max), None);
    }

    #[test]
    fn difference_beyond_magnitude_is_a_transition() {
        use lens_types::{I256, U256};

        let low = MeasuredValue::Value(Scalar::sint(I256::MIN));
        let high = MeasuredValue::Value(Scalar::uint(U256::MAX));
        match single(low, high) {
            Some(DeltaPayload::Transition { description, .. }) => {
                assert!(description.starts_with("difference out of range"));
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn value_to_error_keeps_surviving_value() {
        match single(int(5), MeasuredValue::error("reverted")) {
            Some(DeltaPayload::Transition {
                description,
                surviving,
            }) => {
                assert!(description.starts_with("value => error"));
                assert_eq!(surviving, Some(int(5)));
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn error_to_value_and_changed_errors() {
        match single(MeasuredValue::error("paused"), int(1)) {
            Some(DeltaPayload::Transition { description, surviving }) => {
                assert!(description.starts_with("error => value"));
                assert_eq!(surviving, Some(int(1)));
            }
            other => panic!("unexpected payload {other:?}"),
        }
        assert_eq!(
            single(MeasuredValue::error("a"), MeasuredValue::error("b")),
            Some(DeltaPayload::Transition {
                description: "a => b".into(),
                surviving: None
            })
        );
    }

    #[test]
    fn array_cases() {
        match single(ints(&[1, 2, 3]), ints(&[1, 2])) {
            Some(DeltaPayload::Transition { description, .. }) => {
                assert_eq!(description, "array length changed: 3 => 2");
            }
            other => panic!("unexpected payload {other:?}"),
        }
        assert_eq!(
            single(ints(&[1, 2]), ints(&[1, 5])),
            Some(DeltaPayload::Elementwise(vec![
                ElementDelta::Numeric(Integer::ZERO),
                ElementDelta::Numeric(Integer::from(3i64)),
            ]))
        );
        assert!(matches!(
            single(int(1), ints(&[1])),
            Some(DeltaPayload::Transition { .. })
        ));
    }

    #[test]
    fn non_numeric_scalars() {
        assert_eq!(
            single(
                MeasuredValue::Value(Scalar::Bool(false)),
                MeasuredValue::Value(Scalar::Bool(true))
            ),
            Some(DeltaPayload::Replaced {
                before: Scalar::Bool(false),
                after: Scalar::Bool(true)
            })
        );
        assert!(matches!(
            single(int(1), MeasuredValue::Value(Scalar::text("1"))),
            Some(DeltaPayload::Transition { .. })
        ));
    }

    #[test]
    fn unchanged_nodes_are_omitted() {
        let mut before = set(vec![int(1)]);
        let mut second = before.nodes[0].clone();
        second.address = NodeKey::new("0x02");
        second.name = "Pool".into();
        before.nodes.push(second);
        let mut after = before.clone();
        after.nodes[1].measurements[0].outcome = int(2);

        let deltas = diff_sets(&before, &after).unwrap();
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].name, "Pool");
    }

    #[test]
    fn shape_violations_are_errors() {
        let before = set(vec![int(1)]);
        assert!(diff_sets(&before, &MeasurementSet::default()).is_err());

        let mut renamed = before.clone();
        renamed.nodes[0].address = NodeKey::new("0x09");
        assert!(matches!(diff_sets(&before, &renamed), Err(DiffError::ShapeMismatch(_))));

        let longer = set(vec![int(1), int(2)]);
        assert!(matches!(diff_sets(&before, &longer), Err(DiffError::ShapeMismatch(_))));

        let mut other_name = before.clone();
        other_name.nodes[0].measurements[0].name = "other".into();
        assert!(matches!(diff_sets(&before, &other_name), Err(DiffError::ShapeMismatch(_))));
    }

    #[test]
    fn payload_json() {
        let payload = DeltaPayload::Numeric(Integer::from(-7i64));
        assert_eq!(serde_json::to_string(&payload).unwrap(), r#"{"numeric":"-7"}"#);
    }
}
