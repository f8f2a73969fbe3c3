use crate::block_view::BlockView;
use crate::codec::bitmap::NullBitmap;
use crate::codec::layout::{ColumnLayout, compute_layouts};
use crate::codec::scalar::{Scalar, decode_scalar};
use crate::codec::timestamp::ticks_to_datetime;
use crate::codec::varlen::{decode_var, var_payload};
use crate::error::Location;
use crate::options::{DecodeOptions, TimestampRangePolicy};
use crate::schema::{Precision, ResultSchema};
use crate::value::{Row, Value};
use crate::{Error, Result};

pub fn decode_raw_block(
    block: &[u8],
    row_count: usize,
    schema: &ResultSchema,
    options: &DecodeOptions,
) -> Result<Vec<Row>> {
    let mut out = Vec::new();
    decode_raw_block_into(block, row_count, schema, options, &mut out)?;
    Ok(out)
}

/// Decodes every row of `block` and appends them to `out` in row-major order.
///
/// Either all rows of the block are appended or none are: on any fault `out`
/// is left as it was. Returns the number of rows appended.
pub fn decode_raw_block_into(
    block: &[u8],
    row_count: usize,
    schema: &ResultSchema,
    options: &DecodeOptions,
    out: &mut Vec<Row>,
) -> Result<usize> {
    if row_count == 0 {
        return Ok(0);
    }

    let layouts = compute_layouts(block, row_count, schema)?;
    let precision = schema.precision();

    let mut rows: Vec<Row> = Vec::with_capacity(row_count);
    for row in 0..row_count {
        let mut values: Row = Vec::with_capacity(layouts.len());
        for layout in &layouts {
            values.push(decode_cell(layout, row, precision, options)?);
        }
        rows.push(values);
    }

    tracing::trace!(
        rows = row_count,
        columns = layouts.len(),
        bytes = block.len(),
        "decoded raw block"
    );
    out.append(&mut rows);
    Ok(row_count)
}

fn decode_cell(
    layout: &ColumnLayout<'_>,
    row: usize,
    precision: Precision,
    options: &DecodeOptions,
) -> Result<Value> {
    let location = Location::Cell {
        column: layout.column,
        row,
    };

    let Some(width) = layout.ty.fixed_width() else {
        return match var_payload(layout, row)? {
            None => Ok(Value::Null),
            Some(payload) => decode_var(layout.ty, payload, location, options.binary_as_bytes()),
        };
    };

    let is_null = NullBitmap::new(layout.header)
        .is_null(row)
        .map_err(|e| e.fault(location, "null bitmap"))?;
    if is_null {
        return Ok(Value::Null);
    }

    let bytes = BlockView::new(layout.data)
        .slice(row * width, width)
        .map_err(|e| e.fault(location, "fixed value"))?;
    match decode_scalar(layout.ty, bytes, location)? {
        Scalar::Value(v) => Ok(v),
        Scalar::Ticks(ticks) => convert_ticks(ticks, precision, location, options),
    }
}

fn convert_ticks(
    ticks: i64,
    precision: Precision,
    location: Location,
    options: &DecodeOptions,
) -> Result<Value> {
    if let Some(ts) = ticks_to_datetime(ticks, precision) {
        return Ok(Value::Timestamp(ts));
    }
    match options.out_of_range_timestamps() {
        TimestampRangePolicy::Fail => Err(Error::Range {
            location,
            ticks,
            precision,
        }),
        TimestampRangePolicy::KeepTicks => {
            tracing::warn!(%location, ticks, %precision, "keeping out-of-range timestamp as raw ticks");
            Ok(Value::RawTimestamp { ticks, precision })
        }
    }
}
