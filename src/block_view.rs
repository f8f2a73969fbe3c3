use core::fmt;
use core::ops::Range;

use crate::Error;
use crate::error::Location;

/// A requested sub-range did not fit the view.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct OutOfBounds {
    pub start: usize,
    pub len: usize,
    pub extent: usize,
}

impl fmt::Display for OutOfBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "range {}+{} exceeds extent {}",
            self.start, self.len, self.extent
        )
    }
}

/// Read-only view over engine-owned block memory. Every access is checked
/// against the extent; nothing hands out addresses.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BlockView<'a> {
    bytes: &'a [u8],
}

impl<'a> BlockView<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn range(start: usize, len: usize, extent: usize) -> Result<Range<usize>, OutOfBounds> {
        let err = OutOfBounds { start, len, extent };
        let end = start.checked_add(len).ok_or(err)?;
        if end > extent {
            return Err(err);
        }
        Ok(start..end)
    }

    pub fn slice(&self, start: usize, len: usize) -> Result<&'a [u8], OutOfBounds> {
        let r = Self::range(start, len, self.bytes.len())?;
        Ok(&self.bytes[r])
    }

    pub fn sub(&self, start: usize, len: usize) -> Result<BlockView<'a>, OutOfBounds> {
        self.slice(start, len).map(BlockView::new)
    }

    pub fn array<const N: usize>(&self, at: usize) -> Result<[u8; N], OutOfBounds> {
        let b = self.slice(at, N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(b);
        Ok(out)
    }

    pub fn read_u16_le(&self, at: usize) -> Result<u16, OutOfBounds> {
        self.array::<2>(at).map(u16::from_le_bytes)
    }

    pub fn read_i32_le(&self, at: usize) -> Result<i32, OutOfBounds> {
        self.array::<4>(at).map(i32::from_le_bytes)
    }

    pub fn read_u64_le(&self, at: usize) -> Result<u64, OutOfBounds> {
        self.array::<8>(at).map(u64::from_le_bytes)
    }
}

impl OutOfBounds {
    /// Turns the bounds miss into a layout fault at `location`.
    pub fn fault(self, location: Location, what: &str) -> Error {
        Error::layout(location, format!("{what}: {self}"))
    }
}
