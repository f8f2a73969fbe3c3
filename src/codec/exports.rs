use crate::Result;
use crate::codec::raw_block::{decode_raw_block, decode_raw_block_into};
use crate::codec::raw_block_writer::encode_raw_block_into;
use crate::options::DecodeOptions;
use crate::schema::ResultSchema;
use crate::value::Row;

pub fn decode_block(block: &[u8], row_count: usize, schema: &ResultSchema) -> Result<Vec<Row>> {
    decode_raw_block(block, row_count, schema, &DecodeOptions::default())
}

pub fn decode_block_with_options(
    block: &[u8],
    row_count: usize,
    schema: &ResultSchema,
    options: &DecodeOptions,
) -> Result<Vec<Row>> {
    decode_raw_block(block, row_count, schema, options)
}

pub fn decode_block_into(
    block: &[u8],
    row_count: usize,
    schema: &ResultSchema,
    out: &mut Vec<Row>,
) -> Result<usize> {
    decode_raw_block_into(block, row_count, schema, &DecodeOptions::default(), out)
}

pub fn encode_block_into(schema: &ResultSchema, rows: &[Row], out: &mut Vec<u8>) -> Result<()> {
    encode_raw_block_into(schema, rows, 0, out)
}
