use crate::block_view::BlockView;
use crate::codec::bitmap::null_bitmap_len;
use crate::codec::varlen::VAR_OFFSET_WIDTH;
use crate::error::Location;
use crate::schema::{ColumnType, ResultSchema};
use crate::{Error, Result};

/// Total length (i32) followed by the group id (u64).
pub const BLOCK_HEADER_LEN: usize = 12;
const COLUMN_LEN_WIDTH: usize = 4;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    /// Length of the whole block, fixed header included.
    pub total_len: usize,
    pub group_id: u64,
}

pub fn read_block_header(block: &[u8]) -> Result<BlockHeader> {
    let view = BlockView::new(block);
    let total = view
        .read_i32_le(0)
        .map_err(|e| e.fault(Location::Block, "block length"))?;
    let group_id = view
        .read_u64_le(4)
        .map_err(|e| e.fault(Location::Block, "group id"))?;
    let total_len: usize = total
        .try_into()
        .map_err(|_| Error::layout(Location::Block, format!("negative block length {total}")))?;
    if total_len < BLOCK_HEADER_LEN {
        return Err(Error::layout(
            Location::Block,
            format!("block length {total_len} is shorter than the {BLOCK_HEADER_LEN}-byte header"),
        ));
    }
    if total_len > block.len() {
        return Err(Error::layout(
            Location::Block,
            format!(
                "block declares {total_len} bytes but only {} are available",
                block.len()
            ),
        ));
    }
    Ok(BlockHeader {
        total_len,
        group_id,
    })
}

/// Where one column lives inside one block. Valid for that block only.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ColumnLayout<'a> {
    pub column: usize,
    pub ty: ColumnType,
    pub header_start: usize,
    pub data_start: usize,
    /// Null bitmap for fixed-width columns, offset table for variable-length.
    pub header: &'a [u8],
    pub data: &'a [u8],
}

impl ColumnLayout<'_> {
    pub fn is_var_len(&self) -> bool {
        self.ty.is_var_len()
    }

    pub fn end(&self) -> usize {
        self.data_start + self.data.len()
    }
}

/// Locates the header and data regions of every column in `block`.
///
/// Regions are laid out back to back in schema order right after the column
/// length table, and together they must cover the declared block length
/// exactly. A length that would reach past the block is a layout fault; it is
/// never clamped.
pub fn compute_layouts<'a>(
    block: &'a [u8],
    row_count: usize,
    schema: &ResultSchema,
) -> Result<Vec<ColumnLayout<'a>>> {
    let header = read_block_header(block)?;
    let view = BlockView::new(&block[..header.total_len]);

    let lengths_len = schema
        .len()
        .checked_mul(COLUMN_LEN_WIDTH)
        .ok_or_else(|| Error::layout(Location::Block, "column length table overflow"))?;
    let lengths = view
        .sub(BLOCK_HEADER_LEN, lengths_len)
        .map_err(|e| e.fault(Location::Block, "column length table"))?;
    let payload_start = BLOCK_HEADER_LEN + lengths_len;

    let (layouts, end) = schema.column_types().enumerate().try_fold(
        (Vec::with_capacity(schema.len()), payload_start),
        |(mut layouts, cursor), (column, ty)| -> Result<_> {
            let declared = lengths
                .read_i32_le(column * COLUMN_LEN_WIDTH)
                .map_err(|e| e.fault(Location::Column(column), "column length"))?;
            let layout = column_layout(&view, column, ty, row_count, cursor, declared)?;
            let next = layout.end();
            layouts.push(layout);
            Ok((layouts, next))
        },
    )?;

    if end != header.total_len {
        return Err(Error::layout(
            Location::Block,
            format!(
                "column regions cover {} payload bytes but the block declares {}",
                end - payload_start,
                header.total_len - payload_start
            ),
        ));
    }
    Ok(layouts)
}

fn column_layout<'a>(
    view: &BlockView<'a>,
    column: usize,
    ty: ColumnType,
    row_count: usize,
    header_start: usize,
    declared: i32,
) -> Result<ColumnLayout<'a>> {
    let location = Location::Column(column);
    let data_len: usize = declared
        .try_into()
        .map_err(|_| Error::layout(location, format!("negative column length {declared}")))?;

    let header_len = match ty.fixed_width() {
        None => row_count
            .checked_mul(VAR_OFFSET_WIDTH)
            .ok_or_else(|| Error::layout(location, "offset table overflow"))?,
        Some(width) => {
            let needed = row_count
                .checked_mul(width)
                .ok_or_else(|| Error::layout(location, "data region overflow"))?;
            if data_len < needed {
                return Err(Error::layout(
                    location,
                    format!("{ty} column holds {data_len} bytes, {row_count} rows need {needed}"),
                ));
            }
            null_bitmap_len(row_count)
        }
    };

    let header = view
        .slice(header_start, header_len)
        .map_err(|e| e.fault(location, "header region"))?;
    let data_start = header_start + header_len;
    let data = view
        .slice(data_start, data_len)
        .map_err(|e| e.fault(location, "data region"))?;

    Ok(ColumnLayout {
        column,
        ty,
        header_start,
        data_start,
        header,
        data,
    })
}
