pub mod bitmap;
pub mod exports;
pub mod layout;
pub mod raw_block;
pub mod raw_block_writer;
pub mod scalar;
pub mod timestamp;
pub mod varlen;
