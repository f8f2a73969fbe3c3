use std::collections::VecDeque;

use crate::codec::layout::BLOCK_HEADER_LEN;
use crate::codec::raw_block::decode_raw_block_into;
use crate::codec::raw_block_writer::encode_raw_block_into;
use crate::error::Location;
use crate::options::DecodeOptions;
use crate::schema::ResultSchema;
use crate::value::Row;
use crate::{Error, Result};

/// One fetched block, borrowed from its source until the next fetch.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RawBlock<'a> {
    bytes: &'a [u8],
    row_count: usize,
}

impl<'a> RawBlock<'a> {
    pub fn new(bytes: &'a [u8], row_count: usize) -> Self {
        Self { bytes, row_count }
    }

    /// The end-of-results marker.
    pub fn empty() -> Self {
        Self {
            bytes: &[],
            row_count: 0,
        }
    }

    /// Wraps a block pointer returned by the engine's fetch call. The extent is
    /// taken from the block's own length prefix.
    ///
    /// # Safety
    ///
    /// When `row_count` is non-zero, `ptr` must point to a complete raw block
    /// that stays valid and unmodified for `'a`, which must not outlive the
    /// next fetch on the same result handle.
    pub unsafe fn from_engine_ptr(ptr: *const u8, row_count: usize) -> Result<Self> {
        if row_count == 0 {
            return Ok(Self::empty());
        }
        if ptr.is_null() {
            return Err(Error::layout(
                Location::Block,
                format!("null block pointer for {row_count} rows"),
            ));
        }
        // SAFETY: every engine block starts with its i32 length.
        let prefix = unsafe { core::slice::from_raw_parts(ptr, 4) };
        let total = i32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]);
        let total_len = usize::try_from(total)
            .ok()
            .filter(|&n| n >= BLOCK_HEADER_LEN)
            .ok_or_else(|| Error::layout(Location::Block, format!("invalid block length {total}")))?;
        // SAFETY: the caller guarantees the block is complete, and the block
        // spans exactly its declared length.
        let bytes = unsafe { core::slice::from_raw_parts(ptr, total_len) };
        Ok(Self { bytes, row_count })
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn is_end(&self) -> bool {
        self.row_count == 0
    }
}

/// The engine's two per-handle capabilities.
pub trait ResultSource {
    /// Column descriptors and precision. Called once per scan.
    fn describe(&mut self) -> Result<ResultSchema>;

    /// Next block of the result; zero rows means the result is exhausted.
    /// Engine-reported failures come back as `Error::Fetch`.
    fn fetch_block(&mut self) -> Result<RawBlock<'_>>;
}

impl<S: ResultSource + ?Sized> ResultSource for &mut S {
    fn describe(&mut self) -> Result<ResultSchema> {
        (**self).describe()
    }

    fn fetch_block(&mut self) -> Result<RawBlock<'_>> {
        (**self).fetch_block()
    }
}

/// Decoding runs inside `next_block_into`, so a scan is only ever seen
/// waiting for the next fetch or finished.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ScanState {
    Fetching,
    Done,
}

/// Fetch-then-decode loop over one result handle.
#[derive(Debug)]
pub struct BlockScan<S> {
    source: S,
    schema: ResultSchema,
    options: DecodeOptions,
    state: ScanState,
    blocks_decoded: u64,
    rows_decoded: u64,
}

impl<S: ResultSource> BlockScan<S> {
    pub fn new(mut source: S, options: DecodeOptions) -> Result<Self> {
        let schema = source.describe()?;
        tracing::debug!(
            columns = schema.len(),
            precision = %schema.precision(),
            "result described"
        );
        Ok(Self {
            source,
            schema,
            options,
            state: ScanState::Fetching,
            blocks_decoded: 0,
            rows_decoded: 0,
        })
    }

    pub fn schema(&self) -> &ResultSchema {
        &self.schema
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn blocks_decoded(&self) -> u64 {
        self.blocks_decoded
    }

    pub fn rows_decoded(&self) -> u64 {
        self.rows_decoded
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Fetches and decodes one block, appending its rows to `out`.
    ///
    /// Returns 0 once the source reports an empty block; from then on the
    /// source is not asked again. A failed block leaves `out` untouched.
    pub fn next_block_into(&mut self, out: &mut Vec<Row>) -> Result<usize> {
        if self.state == ScanState::Done {
            return Ok(0);
        }

        let block = self.source.fetch_block()?;
        if block.is_end() {
            self.state = ScanState::Done;
            tracing::debug!(
                blocks = self.blocks_decoded,
                rows = self.rows_decoded,
                "result exhausted"
            );
            return Ok(0);
        }

        let n = decode_raw_block_into(
            block.bytes(),
            block.row_count(),
            &self.schema,
            &self.options,
            out,
        )?;
        self.blocks_decoded += 1;
        self.rows_decoded += n as u64;
        Ok(n)
    }

    /// Decodes blocks until the source is exhausted. On a fault, rows of the
    /// blocks decoded before it stay in `out`.
    pub fn read_to_end(&mut self, out: &mut Vec<Row>) -> Result<usize> {
        let mut total = 0usize;
        loop {
            let n = self.next_block_into(out)?;
            if n == 0 {
                return Ok(total);
            }
            total += n;
        }
    }
}

pub fn read_all<S: ResultSource>(source: S, options: DecodeOptions) -> Result<Vec<Row>> {
    let mut scan = BlockScan::new(source, options)?;
    let mut out = Vec::new();
    scan.read_to_end(&mut out)?;
    Ok(out)
}

#[derive(Debug)]
enum Fetched {
    Block { bytes: Vec<u8>, row_count: usize },
    Fault(Error),
}

/// A [`ResultSource`] over blocks held in memory, for captured results and
/// tests. Once the queue is drained it keeps returning the empty block.
#[derive(Debug)]
pub struct MemorySource {
    schema: ResultSchema,
    pending: VecDeque<Fetched>,
    current: Vec<u8>,
    describe_calls: usize,
    fetch_calls: usize,
}

impl MemorySource {
    pub fn new(schema: ResultSchema) -> Self {
        Self {
            schema,
            pending: VecDeque::new(),
            current: Vec::new(),
            describe_calls: 0,
            fetch_calls: 0,
        }
    }

    pub fn push_block(&mut self, bytes: Vec<u8>, row_count: usize) -> &mut Self {
        self.pending.push_back(Fetched::Block { bytes, row_count });
        self
    }

    /// Encodes `rows` with the source's schema and queues them as one block.
    pub fn push_rows(&mut self, rows: &[Row]) -> Result<&mut Self> {
        let mut bytes = Vec::new();
        encode_raw_block_into(&self.schema, rows, 0, &mut bytes)?;
        Ok(self.push_block(bytes, rows.len()))
    }

    pub fn push_fault(&mut self, code: i32, message: impl Into<String>) -> &mut Self {
        self.pending.push_back(Fetched::Fault(Error::fetch(code, message)));
        self
    }

    pub fn describe_calls(&self) -> usize {
        self.describe_calls
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls
    }
}

impl ResultSource for MemorySource {
    fn describe(&mut self) -> Result<ResultSchema> {
        self.describe_calls += 1;
        Ok(self.schema.clone())
    }

    fn fetch_block(&mut self) -> Result<RawBlock<'_>> {
        self.fetch_calls += 1;
        match self.pending.pop_front() {
            None => Ok(RawBlock::empty()),
            Some(Fetched::Fault(err)) => Err(err),
            Some(Fetched::Block { bytes, row_count }) => {
                self.current = bytes;
                Ok(RawBlock::new(&self.current, row_count))
            }
        }
    }
}
