use super::{all_types_schema, encode, patch_i32, scenario_rows, ts_ms};
use crate::codec::layout::BLOCK_HEADER_LEN;
use crate::options::DecodeOptions;
use crate::scan::{BlockScan, MemorySource, RawBlock, ResultSource, ScanState, read_all};
use crate::schema::{ColumnType, Precision, ResultSchema};
use crate::value::{Row, Value};
use crate::{Error, Result};

fn int_schema() -> ResultSchema {
    ResultSchema::from_types(&[ColumnType::Int], Precision::Milliseconds).unwrap()
}

fn int_rows(range: core::ops::Range<i32>) -> Vec<Row> {
    range.map(|i| vec![Value::I32(i)]).collect()
}

#[test]
fn zero_row_fetch_ends_the_scan() {
    let mut source = MemorySource::new(int_schema());
    let rows = read_all(&mut source, DecodeOptions::default()).unwrap();
    assert!(rows.is_empty());
    assert_eq!(source.describe_calls(), 1);
    assert_eq!(source.fetch_calls(), 1);
}

#[test]
fn rows_keep_fetch_order_across_blocks() {
    let mut source = MemorySource::new(int_schema());
    source.push_rows(&int_rows(0..3)).unwrap();
    source.push_rows(&int_rows(3..5)).unwrap();
    source.push_rows(&int_rows(5..9)).unwrap();

    let mut scan = BlockScan::new(&mut source, DecodeOptions::default()).unwrap();
    let mut out = Vec::new();
    assert_eq!(scan.read_to_end(&mut out).unwrap(), 9);
    assert_eq!(out, int_rows(0..9));
    assert_eq!(scan.blocks_decoded(), 3);
    assert_eq!(scan.rows_decoded(), 9);
    assert_eq!(scan.state(), ScanState::Done);
    drop(scan);
    assert_eq!(source.describe_calls(), 1);
}

#[test]
fn done_is_sticky() {
    let mut source = MemorySource::new(int_schema());
    source.push_rows(&int_rows(0..2)).unwrap();
    let mut scan = BlockScan::new(source, DecodeOptions::default()).unwrap();
    let mut out = Vec::new();
    assert_eq!(scan.next_block_into(&mut out).unwrap(), 2);
    assert_eq!(scan.state(), ScanState::Fetching);
    assert_eq!(scan.next_block_into(&mut out).unwrap(), 0);
    assert_eq!(scan.state(), ScanState::Done);
    assert_eq!(scan.next_block_into(&mut out).unwrap(), 0);
    assert_eq!(scan.into_source().fetch_calls(), 2);
}

#[test]
fn fetch_faults_pass_through_unchanged() {
    let mut source = MemorySource::new(int_schema());
    source.push_rows(&int_rows(0..2)).unwrap();
    source.push_fault(0x0216, "result set is broken");
    source.push_rows(&int_rows(2..4)).unwrap();

    let mut scan = BlockScan::new(source, DecodeOptions::default()).unwrap();
    let mut out = Vec::new();
    let err = scan.read_to_end(&mut out).unwrap_err();
    assert_eq!(err, Error::fetch(0x0216, "result set is broken"));
    assert_eq!(out, int_rows(0..2));

    // The scan is still usable; the next fetch is the caller's call.
    assert_eq!(scan.state(), ScanState::Fetching);
    assert_eq!(scan.read_to_end(&mut out).unwrap(), 2);
    assert_eq!(out, int_rows(0..4));
}

#[test]
fn corrupt_block_keeps_earlier_rows_and_adds_none() {
    let schema = all_types_schema();
    let good = encode(&schema, &scenario_rows(ts_ms(1_000), ts_ms(2_000)));
    let mut bad = good.clone();
    patch_i32(&mut bad, BLOCK_HEADER_LEN + 3 * 4, i32::MAX);

    let mut source = MemorySource::new(schema);
    source.push_block(good, 2).push_block(bad, 2);

    let mut scan = BlockScan::new(source, DecodeOptions::default()).unwrap();
    let mut out = Vec::new();
    let err = scan.read_to_end(&mut out).unwrap_err();
    assert!(err.is_layout_fault());
    assert_eq!(out.len(), 2);
    assert_eq!(scan.blocks_decoded(), 1);
    assert_eq!(scan.state(), ScanState::Fetching);
}

struct FailingDescribe;

impl ResultSource for FailingDescribe {
    fn describe(&mut self) -> Result<ResultSchema> {
        Err(Error::fetch(-1, "no result"))
    }

    fn fetch_block(&mut self) -> Result<RawBlock<'_>> {
        panic!("fetch must not run without a schema");
    }
}

#[test]
fn describe_failure_stops_before_fetching() {
    let err = read_all(FailingDescribe, DecodeOptions::default()).unwrap_err();
    assert_eq!(err, Error::fetch(-1, "no result"));
}

#[test]
fn engine_pointer_uses_block_length_prefix() {
    let mut block = encode(&int_schema(), &int_rows(0..3));
    let len = block.len();
    block.extend_from_slice(&[0xEE; 32]);

    let raw = unsafe { RawBlock::from_engine_ptr(block.as_ptr(), 3) }.unwrap();
    assert_eq!(raw.bytes().len(), len);
    assert_eq!(raw.row_count(), 3);

    let end = unsafe { RawBlock::from_engine_ptr(core::ptr::null(), 0) }.unwrap();
    assert!(end.is_end());

    let err = unsafe { RawBlock::from_engine_ptr(core::ptr::null(), 3) }.unwrap_err();
    assert!(err.is_layout_fault());
}
