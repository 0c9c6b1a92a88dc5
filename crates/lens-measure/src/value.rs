use alloy_dyn_abi::DynSolValue;
use alloy_primitives::hex;
use lens_types::{MeasuredValue, NodeKey, Scalar};

use crate::error::{MeasureError, MeasureResult};

/// Convert decoded call outputs into a measured value.
///
/// Exactly one output is expected. Integers keep their full range and sign, addresses
/// render as normalized keys, and byte strings as `0x` hex. Arrays of those
/// become array values; tuples and multi-output results are rejected.
pub fn to_measured(outputs: &[DynSolValue]) -> MeasureResult<MeasuredValue> {
    match outputs {
        [single] => match single {
            DynSolValue::Array(items) | DynSolValue::FixedArray(items) => {
                let scalars = items.iter().map(to_scalar).collect::<MeasureResult<Vec<_>>>()?;
                Ok(MeasuredValue::array(scalars)?)
            }
            other => Ok(MeasuredValue::Value(to_scalar(other)?)),
        },
        [] => Err(MeasureError::Conversion("call returned no outputs".into())),
        many => Err(MeasureError::Conversion(format!(
            "call returned {} outputs",
            many.len()
        ))),
    }
}

fn to_scalar(value: &DynSolValue) -> MeasureResult<Scalar> {
    Ok(match value {
        DynSolValue::Uint(v, _) => Scalar::uint(*v),
        DynSolValue::Int(v, _) => Scalar::sint(*v),
        DynSolValue::Bool(b) => Scalar::Bool(*b),
        DynSolValue::String(s) => Scalar::text(s.clone()),
        DynSolValue::Address(a) => Scalar::text(NodeKey::from_address(*a).as_str()),
        DynSolValue::FixedBytes(word, size) => {
            Scalar::text(format!("0x{}", hex::encode(&word[..*size])))
        }
        DynSolValue::Bytes(bytes) => Scalar::text(format!("0x{}", hex::encode(bytes))),
        other => {
            return Err(MeasureError::Conversion(format!(
                "unsupported value {other:?}"
            )))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, B256, I256, U256};

    #[test]
    fn scalars() {
        assert_eq!(
            to_measured(&[DynSolValue::Uint(U256::from(42), 256)]).unwrap(),
            MeasuredValue::Value(Scalar::int(42))
        );
        assert_eq!(
            to_measured(&[DynSolValue::Int(I256::try_from(-3).unwrap(), 256)]).unwrap(),
            MeasuredValue::Value(Scalar::int(-3))
        );
        assert_eq!(
            to_measured(&[DynSolValue::Bool(true)]).unwrap(),
            MeasuredValue::Value(Scalar::Bool(true))
        );
        assert_eq!(
            to_measured(&[DynSolValue::Address(Address::repeat_byte(0xab))]).unwrap(),
            MeasuredValue::Value(Scalar::text(format!("0x{}", "ab".repeat(20))))
        );
        assert_eq!(
            to_measured(&[DynSolValue::FixedBytes(B256::repeat_byte(1), 2)]).unwrap(),
            MeasuredValue::Value(Scalar::text("0x0101"))
        );
    }

    #[test]
    fn arrays() {
        let value = to_measured(&[DynSolValue::Array(vec![
            DynSolValue::Uint(U256::from(1), 256),
            DynSolValue::Uint(U256::from(2), 256),
        ])])
        .unwrap();
        assert_eq!(
            value,
            MeasuredValue::Array(vec![Scalar::int(1), Scalar::int(2)])
        );
    }

    #[test]
    fn rejects_tuples_and_multiple_outputs() {
        let tuple = DynSolValue::Tuple(vec![DynSolValue::Bool(true)]);
        assert!(matches!(to_measured(&[tuple]), Err(MeasureError::Conversion(_))));
        let two = [DynSolValue::Bool(true), DynSolValue::Bool(false)];
        assert!(matches!(to_measured(&two), Err(MeasureError::Conversion(_))));
        assert!(matches!(to_measured(&[]), Err(MeasureError::Conversion(_))));
    }

    #[test]
    fn extreme_integers_are_measured() {
        let huge = DynSolValue::Uint(U256::MAX, 256);
        assert_eq!(
            to_measured(&[huge]).unwrap(),
            MeasuredValue::Value(Scalar::uint(U256::MAX))
        );
        let lowest = DynSolValue::Int(I256::MIN, 256);
        assert_eq!(
            to_measured(&[lowest]).unwrap(),
            MeasuredValue::Value(Scalar::sint(I256::MIN))
        );
    }
}
