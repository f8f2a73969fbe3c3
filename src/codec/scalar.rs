use crate::error::Location;
use crate::schema::ColumnType;
use crate::value::Value;
use crate::{Error, Result};

/// A fixed-width cell before precision conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Value(Value),
    /// Signed tick count of a timestamp column.
    Ticks(i64),
}

#[inline]
fn le<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}

/// Reads one little-endian value of `ty` from `bytes`, which must be exactly
/// the type's width.
pub fn decode_scalar(ty: ColumnType, bytes: &[u8], location: Location) -> Result<Scalar> {
    let Some(width) = ty.fixed_width() else {
        return Err(Error::UnsupportedType {
            column: location.column().unwrap_or_default(),
            code: ty.code(),
        });
    };
    if bytes.len() != width {
        return Err(Error::layout(
            location,
            format!("{ty} needs {width} bytes, got {}", bytes.len()),
        ));
    }
    let v = match ty {
        ColumnType::Bool => Value::Bool(bytes[0] != 0),
        ColumnType::TinyInt => Value::I8(i8::from_le_bytes(le(bytes))),
        ColumnType::SmallInt => Value::I16(i16::from_le_bytes(le(bytes))),
        ColumnType::Int => Value::I32(i32::from_le_bytes(le(bytes))),
        ColumnType::BigInt => Value::I64(i64::from_le_bytes(le(bytes))),
        ColumnType::UTinyInt => Value::U8(bytes[0]),
        ColumnType::USmallInt => Value::U16(u16::from_le_bytes(le(bytes))),
        ColumnType::UInt => Value::U32(u32::from_le_bytes(le(bytes))),
        ColumnType::UBigInt => Value::U64(u64::from_le_bytes(le(bytes))),
        ColumnType::Float => Value::F32(f32::from_le_bytes(le(bytes))),
        ColumnType::Double => Value::F64(f64::from_le_bytes(le(bytes))),
        ColumnType::Timestamp => return Ok(Scalar::Ticks(i64::from_le_bytes(le(bytes)))),
        ColumnType::VarChar | ColumnType::NChar | ColumnType::Json | ColumnType::VarBinary => {
            unreachable!("variable-length types have no fixed width")
        }
    };
    Ok(Scalar::Value(v))
}

/// Appends the little-endian encoding of `value` for a fixed-width column.
/// Timestamps are written by the caller once converted to ticks.
pub(crate) fn encode_scalar(
    ty: ColumnType,
    value: &Value,
    location: Location,
    out: &mut Vec<u8>,
) -> Result<()> {
    match (ty, value) {
        (ColumnType::Bool, Value::Bool(v)) => out.push(*v as u8),
        (ColumnType::TinyInt, Value::I8(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (ColumnType::SmallInt, Value::I16(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (ColumnType::Int, Value::I32(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (ColumnType::BigInt, Value::I64(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (ColumnType::UTinyInt, Value::U8(v)) => out.push(*v),
        (ColumnType::USmallInt, Value::U16(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (ColumnType::UInt, Value::U32(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (ColumnType::UBigInt, Value::U64(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (ColumnType::Float, Value::F32(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (ColumnType::Double, Value::F64(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (ty, v) => {
            return Err(Error::encode(
                location,
                format!("{ty} column cannot hold {v:?}"),
            ));
        }
    }
    Ok(())
}
