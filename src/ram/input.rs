use std::sync::Arc;

use crate::error::Result;
use crate::ram::file::{RamFile, BLOCK_SIZE};
use crate::stream::{BufferedInput, InputSource, StreamCursor};

/// Reader returned by `RamDirectory::open_input`.
pub type RamInput = BufferedInput<RamFileSource>;

/// Read adapter over a committed file's block array.
///
/// Holds its own clone of the file's `Arc`, so the bytes stay alive even if
/// the file is deleted from the directory while the reader is open. The
/// buffer handed to the reader is always the current block, refilled by
/// stepping to the next block.
pub struct RamFileSource {
    file: Arc<RamFile>,
    block: usize,
    last_block: usize,
    last_block_bytes: usize,
}

impl RamFileSource {
    pub(crate) fn new(file: Arc<RamFile>) -> Self {
        assert!(file.length > 0, "cannot open an empty file for reading");
        // the raw block count may include a trailing empty block, so the
        // end-of-data geometry comes from the committed length
        let last_block = ((file.length - 1) / BLOCK_SIZE as u64) as usize;
        let last_block_bytes = ((file.length - 1) % BLOCK_SIZE as u64 + 1) as usize;
        Self {
            file,
            block: 0,
            last_block,
            last_block_bytes,
        }
    }

    /// Valid bytes in the given block.
    fn filled_in(&self, block: usize) -> usize {
        if block == self.last_block {
            self.last_block_bytes
        } else {
            BLOCK_SIZE
        }
    }
}

impl InputSource for RamFileSource {
    fn buffer(&self) -> &[u8] {
        &self.file.blocks[self.block]
    }

    fn fill(&mut self, cursor: &mut StreamCursor) -> Result<bool> {
        debug_assert!(cursor.readable() == 0, "buffer is not exhausted");
        if !cursor.attached() {
            cursor.attach(BLOCK_SIZE);
            cursor.filled = self.filled_in(self.block);
            return Ok(true);
        }
        if self.block == self.last_block {
            return Ok(false);
        }
        self.block += 1;
        cursor.start = 0;
        cursor.cur = 0;
        cursor.end = BLOCK_SIZE;
        cursor.filled = self.filled_in(self.block);
        Ok(true)
    }

    fn seek(&mut self, cursor: &mut StreamCursor, pos: u64) -> Result<()> {
        assert!(
            pos < self.file.length,
            "seek past the end of the file is not supported"
        );
        self.block = (pos / BLOCK_SIZE as u64) as usize;
        cursor.attach(BLOCK_SIZE);
        cursor.cur = (pos % BLOCK_SIZE as u64) as usize;
        cursor.filled = self.filled_in(self.block);
        cursor.pos = pos;
        Ok(())
    }

    fn preferred_buffer_size(&self) -> usize {
        BLOCK_SIZE
    }
}
