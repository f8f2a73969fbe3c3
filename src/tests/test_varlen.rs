use super::encode;
use crate::codec::layout::compute_layouts;
use crate::codec::raw_block::decode_raw_block;
use crate::error::Location;
use crate::options::DecodeOptions;
use crate::schema::{ColumnType, Precision, ResultSchema};
use crate::value::Value;
use crate::Error;

fn single(ty: ColumnType) -> ResultSchema {
    ResultSchema::from_types(&[ty], Precision::Milliseconds).unwrap()
}

#[test]
fn embedded_zero_bytes_survive() {
    let schema = ResultSchema::from_types(
        &[ColumnType::VarBinary, ColumnType::VarChar],
        Precision::Milliseconds,
    )
    .unwrap();
    let rows = vec![vec![
        Value::Bytes(b"a\0b\0\0".to_vec()),
        Value::Str("x\0y".to_string()),
    ]];
    let block = encode(&schema, &rows);
    let decoded = decode_raw_block(&block, 1, &schema, &DecodeOptions::default()).unwrap();
    assert_eq!(decoded[0][0].as_bytes().unwrap().len(), 5);
    assert_eq!(decoded[0][1].as_str().unwrap().len(), 3);
    assert_eq!(decoded, rows);
}

#[test]
fn payload_is_length_prefixed() {
    let schema = single(ColumnType::VarChar);
    let block = encode(
        &schema,
        &[
            vec![Value::Str("ab".to_string())],
            vec![Value::Str("cde".to_string())],
        ],
    );
    let layouts = compute_layouts(&block, 2, &schema).unwrap();
    assert_eq!(layouts[0].data, b"\x02\x00ab\x03\x00cde");
    assert_eq!(&layouts[0].header[4..8], &4i32.to_le_bytes());
}

#[test]
fn nchar_is_ucs4() {
    let schema = single(ColumnType::NChar);
    let rows = vec![
        vec![Value::Str("A".to_string())],
        vec![Value::Str("héllo ✓ 数据".to_string())],
        vec![Value::Str(String::new())],
    ];
    let block = encode(&schema, &rows);
    let layouts = compute_layouts(&block, 3, &schema).unwrap();
    assert_eq!(&layouts[0].data[..6], &[4, 0, 0x41, 0, 0, 0]);
    let decoded = decode_raw_block(&block, 3, &schema, &DecodeOptions::default()).unwrap();
    assert_eq!(decoded, rows);
}

#[test]
fn nchar_with_surrogate_is_rejected() {
    let schema = single(ColumnType::NChar);
    let mut block = encode(&schema, &[vec![Value::Str("A".to_string())]]);
    let data_start = compute_layouts(&block, 1, &schema).unwrap()[0].data_start;
    block[data_start + 2..data_start + 6].copy_from_slice(&0xD800u32.to_le_bytes());
    let err = decode_raw_block(&block, 1, &schema, &DecodeOptions::default()).unwrap_err();
    assert_eq!(
        err,
        Error::Payload {
            location: Location::Cell { column: 0, row: 0 },
            ty: ColumnType::NChar,
            message: "invalid code point 0xd800".to_string(),
        }
    );
}

#[test]
fn nchar_length_must_be_whole_code_units() {
    let schema = single(ColumnType::NChar);
    let mut block = encode(&schema, &[vec![Value::Str("AB".to_string())]]);
    let data_start = compute_layouts(&block, 1, &schema).unwrap()[0].data_start;
    block[data_start..data_start + 2].copy_from_slice(&6u16.to_le_bytes());
    let err = decode_raw_block(&block, 1, &schema, &DecodeOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Payload { ty: ColumnType::NChar, .. }));
}

#[test]
fn invalid_utf8_varchar_needs_binary_as_bytes() {
    let schema = single(ColumnType::VarChar);
    let rows = vec![vec![Value::Bytes(vec![0xFF, 0x00, 0xFE])]];
    let block = encode(&schema, &rows);

    let err = decode_raw_block(&block, 1, &schema, &DecodeOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Payload { ty: ColumnType::VarChar, .. }));

    let mut options = DecodeOptions::default();
    options.set_binary_as_bytes(true);
    let decoded = decode_raw_block(&block, 1, &schema, &options).unwrap();
    assert_eq!(decoded, rows);
}

#[test]
fn json_decodes_as_text() {
    let schema = single(ColumnType::Json);
    let rows = vec![vec![Value::Str(r#"{"site":"north","ok":true}"#.to_string())]];
    let block = encode(&schema, &rows);
    let decoded = decode_raw_block(&block, 1, &schema, &DecodeOptions::default()).unwrap();
    assert_eq!(decoded, rows);
}

#[test]
fn length_prefix_past_column_end_is_a_layout_fault() {
    let schema = single(ColumnType::VarChar);
    let mut block = encode(&schema, &[vec![Value::Str("abc".to_string())]]);
    let data_start = compute_layouts(&block, 1, &schema).unwrap()[0].data_start;
    block[data_start..data_start + 2].copy_from_slice(&100u16.to_le_bytes());
    let err = decode_raw_block(&block, 1, &schema, &DecodeOptions::default()).unwrap_err();
    assert!(err.is_layout_fault());
    assert_eq!(err.location(), Some(Location::Cell { column: 0, row: 0 }));
}

#[test]
fn offset_past_column_end_is_a_layout_fault() {
    let schema = single(ColumnType::VarChar);
    let mut block = encode(&schema, &[vec![Value::Str("abc".to_string())]]);
    let header_start = compute_layouts(&block, 1, &schema).unwrap()[0].header_start;
    // Data region is 5 bytes; a prefix at 4 cannot fit.
    super::patch_i32(&mut block, header_start, 4);
    let err = decode_raw_block(&block, 1, &schema, &DecodeOptions::default()).unwrap_err();
    assert!(err.is_layout_fault());
}
