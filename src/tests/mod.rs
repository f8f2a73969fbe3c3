mod test_scan;
mod test_varlen;

use time::OffsetDateTime;

use crate::codec::raw_block_writer::encode_raw_block_into;
use crate::schema::{ColumnType, Precision, ResultSchema};
use crate::value::{Row, Value};

pub(crate) fn ts_ms(ms: i64) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000).unwrap()
}

pub(crate) fn encode(schema: &ResultSchema, rows: &[Row]) -> Vec<u8> {
    let mut out = Vec::new();
    encode_raw_block_into(schema, rows, 0, &mut out).unwrap();
    out
}

pub(crate) fn patch_i32(block: &mut [u8], at: usize, v: i32) {
    block[at..at + 4].copy_from_slice(&v.to_le_bytes());
}

/// Timestamp, eleven fixed-width types, varchar, nchar.
pub(crate) fn all_types_schema() -> ResultSchema {
    ResultSchema::from_types(
        &[
            ColumnType::Timestamp,
            ColumnType::Bool,
            ColumnType::TinyInt,
            ColumnType::SmallInt,
            ColumnType::Int,
            ColumnType::BigInt,
            ColumnType::UTinyInt,
            ColumnType::USmallInt,
            ColumnType::UInt,
            ColumnType::UBigInt,
            ColumnType::Float,
            ColumnType::Double,
            ColumnType::VarChar,
            ColumnType::NChar,
        ],
        Precision::Milliseconds,
    )
    .unwrap()
}

/// Row one holds `1` in every numeric column and "x" in both strings; row two
/// is null everywhere but the timestamp.
pub(crate) fn scenario_rows(t1: OffsetDateTime, t2: OffsetDateTime) -> Vec<Row> {
    let full = vec![
        Value::Timestamp(t1),
        Value::Bool(true),
        Value::I8(1),
        Value::I16(1),
        Value::I32(1),
        Value::I64(1),
        Value::U8(1),
        Value::U16(1),
        Value::U32(1),
        Value::U64(1),
        Value::F32(1.0),
        Value::F64(1.0),
        Value::Str("x".to_string()),
        Value::Str("x".to_string()),
    ];
    let mut nulls = vec![Value::Null; full.len()];
    nulls[0] = Value::Timestamp(t2);
    vec![full, nulls]
}
