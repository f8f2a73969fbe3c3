use crate::block_view::BlockView;
use crate::codec::layout::ColumnLayout;
use crate::error::Location;
use crate::schema::ColumnType;
use crate::value::Value;
use crate::{Error, Result};

pub const VAR_OFFSET_WIDTH: usize = 4;
/// Offset-table entry of a null row.
pub const NULL_OFFSET: i32 = -1;
/// Each payload starts with its byte length as a u16.
pub const VAR_LEN_PREFIX: usize = 2;
const UCS4_WIDTH: usize = 4;

/// Payload bytes of `row` in a variable-length column, `None` when the row is
/// null.
pub fn var_payload<'a>(layout: &ColumnLayout<'a>, row: usize) -> Result<Option<&'a [u8]>> {
    let location = Location::Cell {
        column: layout.column,
        row,
    };
    let offsets = BlockView::new(layout.header);
    let offset = offsets
        .read_i32_le(row * VAR_OFFSET_WIDTH)
        .map_err(|e| e.fault(location, "offset table"))?;
    if offset == NULL_OFFSET {
        return Ok(None);
    }
    let start: usize = offset
        .try_into()
        .map_err(|_| Error::layout(location, format!("invalid offset {offset}")))?;

    let data = BlockView::new(layout.data);
    let len = data
        .read_u16_le(start)
        .map_err(|e| e.fault(location, "payload length prefix"))? as usize;
    let payload = data
        .slice(start + VAR_LEN_PREFIX, len)
        .map_err(|e| e.fault(location, "payload"))?;
    Ok(Some(payload))
}

pub fn decode_var(
    ty: ColumnType,
    payload: &[u8],
    location: Location,
    binary_as_bytes: bool,
) -> Result<Value> {
    let invalid = |message: String| Error::Payload {
        location,
        ty,
        message,
    };
    match ty {
        ColumnType::VarBinary => Ok(Value::Bytes(payload.to_vec())),
        ColumnType::VarChar if binary_as_bytes => Ok(Value::Bytes(payload.to_vec())),
        ColumnType::VarChar | ColumnType::Json => core::str::from_utf8(payload)
            .map(|s| Value::Str(s.to_string()))
            .map_err(|e| invalid(e.to_string())),
        ColumnType::NChar => decode_ucs4(payload).map(Value::Str).map_err(invalid),
        _ => Err(Error::UnsupportedType {
            column: location.column().unwrap_or_default(),
            code: ty.code(),
        }),
    }
}

fn decode_ucs4(payload: &[u8]) -> core::result::Result<String, String> {
    if payload.len() % UCS4_WIDTH != 0 {
        return Err(format!(
            "length {} is not a multiple of {UCS4_WIDTH}",
            payload.len()
        ));
    }
    payload
        .chunks_exact(UCS4_WIDTH)
        .map(|unit| {
            let cp = u32::from_le_bytes([unit[0], unit[1], unit[2], unit[3]]);
            char::from_u32(cp).ok_or_else(|| format!("invalid code point {cp:#x}"))
        })
        .collect()
}

pub(crate) fn encode_ucs4(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len() * UCS4_WIDTH);
    for c in s.chars() {
        out.extend_from_slice(&(c as u32).to_le_bytes());
    }
    out
}
