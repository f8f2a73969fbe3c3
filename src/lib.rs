pub mod block_view;
pub mod codec;
pub mod error;
pub mod options;
pub mod scan;
pub mod schema;
pub mod value;

pub use crate::codec::exports::{
    decode_block, decode_block_into, decode_block_with_options, encode_block_into,
};
pub use crate::error::{Error, Location, Result};
pub use crate::options::{DecodeOptions, TimestampRangePolicy};
pub use crate::scan::{BlockScan, MemorySource, RawBlock, ResultSource, ScanState, read_all};
pub use crate::schema::{ColumnDescriptor, ColumnType, Precision, ResultSchema};
pub use crate::value::{Row, Value};

#[cfg(test)]
mod tests;
