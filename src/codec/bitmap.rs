use crate::block_view::OutOfBounds;

pub fn null_bitmap_len(row_count: usize) -> usize {
    row_count.div_ceil(8)
}

/// Null bitmap of a fixed-width column: one bit per row, least-significant
/// bit first, set means null.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct NullBitmap<'a> {
    bytes: &'a [u8],
}

impl<'a> NullBitmap<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn is_null(&self, row: usize) -> Result<bool, OutOfBounds> {
        let byte_idx = row / 8;
        let bit_idx = row % 8;
        let byte = self.bytes.get(byte_idx).ok_or(OutOfBounds {
            start: byte_idx,
            len: 1,
            extent: self.bytes.len(),
        })?;
        Ok((byte & (1u8 << bit_idx)) != 0)
    }
}

pub(crate) fn set_null(bytes: &mut [u8], row: usize) {
    bytes[row / 8] |= 1u8 << (row % 8);
}
