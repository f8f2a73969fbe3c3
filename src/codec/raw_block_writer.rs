use crate::codec::bitmap::{null_bitmap_len, set_null};
use crate::codec::layout::BLOCK_HEADER_LEN;
use crate::codec::scalar::encode_scalar;
use crate::codec::timestamp::datetime_to_ticks;
use crate::codec::varlen::{NULL_OFFSET, VAR_OFFSET_WIDTH, encode_ucs4};
use crate::error::Location;
use crate::schema::{ColumnType, Precision, ResultSchema};
use crate::value::{Row, Value};
use crate::{Error, Result};

struct ColumnBuf {
    header: Vec<u8>,
    data: Vec<u8>,
}

/// Writes `rows` as one raw block in the engine's layout, replacing the
/// contents of `out`.
pub fn encode_raw_block_into(
    schema: &ResultSchema,
    rows: &[Row],
    group_id: u64,
    out: &mut Vec<u8>,
) -> Result<()> {
    for (row, values) in rows.iter().enumerate() {
        if values.len() != schema.len() {
            return Err(Error::encode(
                Location::Block,
                format!(
                    "row {row} has {} values, schema has {} columns",
                    values.len(),
                    schema.len()
                ),
            ));
        }
    }

    let mut columns = Vec::with_capacity(schema.len());
    for (column, ty) in schema.column_types().enumerate() {
        let buf = match ty.fixed_width() {
            Some(width) => encode_fixed_column(ty, width, column, rows, schema.precision())?,
            None => encode_var_column(ty, column, rows)?,
        };
        columns.push(buf);
    }

    let mut total = BLOCK_HEADER_LEN + 4 * columns.len();
    for c in &columns {
        total += c.header.len() + c.data.len();
    }
    let total_i32: i32 = total
        .try_into()
        .map_err(|_| Error::encode(Location::Block, "block too large"))?;

    out.clear();
    out.reserve(total);
    out.extend_from_slice(&total_i32.to_le_bytes());
    out.extend_from_slice(&group_id.to_le_bytes());
    for (column, c) in columns.iter().enumerate() {
        let len: i32 = c
            .data
            .len()
            .try_into()
            .map_err(|_| Error::encode(Location::Column(column), "column too large"))?;
        out.extend_from_slice(&len.to_le_bytes());
    }
    for c in &columns {
        out.extend_from_slice(&c.header);
        out.extend_from_slice(&c.data);
    }
    Ok(())
}

fn encode_fixed_column(
    ty: ColumnType,
    width: usize,
    column: usize,
    rows: &[Row],
    precision: Precision,
) -> Result<ColumnBuf> {
    let mut header = vec![0u8; null_bitmap_len(rows.len())];
    let mut data = Vec::with_capacity(rows.len() * width);
    for (row, values) in rows.iter().enumerate() {
        let location = Location::Cell { column, row };
        match (&values[column], ty) {
            (Value::Null, _) => {
                set_null(&mut header, row);
                data.resize(data.len() + width, 0);
            }
            (Value::Timestamp(dt), ColumnType::Timestamp) => {
                let ticks = datetime_to_ticks(*dt, precision).ok_or_else(|| {
                    Error::encode(
                        location,
                        format!("{dt} is not representable at {precision} precision"),
                    )
                })?;
                data.extend_from_slice(&ticks.to_le_bytes());
            }
            (Value::RawTimestamp { ticks, precision: p }, ColumnType::Timestamp)
                if *p == precision =>
            {
                data.extend_from_slice(&ticks.to_le_bytes());
            }
            (v, ty) => encode_scalar(ty, v, location, &mut data)?,
        }
    }
    Ok(ColumnBuf { header, data })
}

fn encode_var_column(ty: ColumnType, column: usize, rows: &[Row]) -> Result<ColumnBuf> {
    let mut header = Vec::with_capacity(rows.len() * VAR_OFFSET_WIDTH);
    let mut data = Vec::new();
    for (row, values) in rows.iter().enumerate() {
        let location = Location::Cell { column, row };
        let payload = match (ty, &values[column]) {
            (_, Value::Null) => {
                header.extend_from_slice(&NULL_OFFSET.to_le_bytes());
                continue;
            }
            (ColumnType::VarChar | ColumnType::Json, Value::Str(s)) => s.as_bytes().to_vec(),
            (ColumnType::VarChar | ColumnType::VarBinary, Value::Bytes(b)) => b.clone(),
            (ColumnType::NChar, Value::Str(s)) => encode_ucs4(s),
            (ty, v) => {
                return Err(Error::encode(
                    location,
                    format!("{ty} column cannot hold {v:?}"),
                ));
            }
        };
        let offset: i32 = data
            .len()
            .try_into()
            .map_err(|_| Error::encode(location, "column too large"))?;
        let len: u16 = payload
            .len()
            .try_into()
            .map_err(|_| Error::encode(location, "payload longer than 65535 bytes"))?;
        header.extend_from_slice(&offset.to_le_bytes());
        data.extend_from_slice(&len.to_le_bytes());
        data.extend_from_slice(&payload);
    }
    Ok(ColumnBuf { header, data })
}
