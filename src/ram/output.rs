use std::sync::Arc;

use chrono::Utc;

use crate::error::Result;
use crate::ram::file::{FileSlot, FileTable, RamFile, BLOCK_SIZE};
use crate::stream::{BufferedOutput, OutputSink, StreamCursor};

/// Writer returned by `RamDirectory::create_output`.
pub type RamOutput = BufferedOutput<RamFileSink>;

/// Write adapter binding the buffered writer to a file's block array.
///
/// The buffer handed to the writer is always the current block itself, so
/// flushing never copies: it only advances bookkeeping. Stream position
/// maps to `(pos / BLOCK_SIZE, pos % BLOCK_SIZE)`.
///
/// If `flush` is called with a completely filled block (or `seek` lands one
/// past the last filled block), a fresh block is allocated, and when no
/// later write touches it the committed file keeps a trailing empty block.
/// Except for the wasted space this is harmless; readers work from the
/// committed length and never look at that block.
pub struct RamFileSink {
    file: Option<RamFile>,
    name: String,
    files: FileTable,
    block: usize,
}

impl RamFileSink {
    pub(crate) fn new(files: FileTable, name: &str) -> Self {
        Self {
            file: Some(RamFile::new()),
            name: name.to_string(),
            files,
            block: 0,
        }
    }

    fn file_mut(&mut self) -> &mut RamFile {
        self.file.as_mut().expect("output stream used after close")
    }
}

impl OutputSink for RamFileSink {
    fn init_buffer(&mut self, cursor: &mut StreamCursor) -> Result<()> {
        let file = self.file_mut();
        debug_assert!(file.blocks.is_empty(), "internal buffer initialized twice");
        file.alloc_block();
        cursor.attach(BLOCK_SIZE);
        Ok(())
    }

    fn buffer_mut(&mut self) -> &mut [u8] {
        let block = self.block;
        &mut self.file_mut().blocks[block]
    }

    fn write_out(&mut self, cursor: &mut StreamCursor) -> Result<()> {
        let block = self.block;
        let file = self.file_mut();
        if file.length < cursor.pos {
            file.length = cursor.pos;
        }
        if cursor.cur == cursor.end {
            // block is full, advance to the next one
            if block == file.blocks.len() - 1 {
                file.alloc_block();
            }
            self.block += 1;
            cursor.start = 0;
            cursor.end = BLOCK_SIZE;
        } else {
            // data stays where it is; the flushed span just becomes
            // off-limits for the cursor
            cursor.start = cursor.cur;
        }
        Ok(())
    }

    fn seek(&mut self, cursor: &mut StreamCursor, pos: u64) -> Result<()> {
        let target_block = (pos / BLOCK_SIZE as u64) as usize;
        let file = self.file_mut();
        if file.length < cursor.pos {
            file.length = cursor.pos;
        }
        assert!(
            pos <= file.length,
            "seek past one-past-the-end of the file is not supported"
        );
        // corner case: seeking to one past the end of an entirely filled
        // last block lands on a block that does not exist yet
        if target_block == file.blocks.len() {
            file.alloc_block();
        }
        self.block = target_block;
        cursor.attach(BLOCK_SIZE);
        cursor.cur = (pos % BLOCK_SIZE as u64) as usize;
        cursor.pos = pos;
        Ok(())
    }

    /// Commit the file: swap the directory slot from its reservation to the
    /// finished file. The slot already exists, so no table growth can
    /// happen here and the swap cannot fail.
    fn close(&mut self, cursor: &StreamCursor) {
        if let Some(mut file) = self.file.take() {
            if file.length < cursor.pos {
                file.length = cursor.pos;
            }
            file.last_modified = Utc::now();
            let mut files = self.files.lock();
            match files.get_mut(&self.name) {
                Some(slot) => {
                    assert!(
                        matches!(slot, FileSlot::Reserved),
                        "file name {:?} is not reserved, directory invariants do not hold",
                        self.name
                    );
                    *slot = FileSlot::Committed(Arc::new(file));
                }
                None => panic!(
                    "file name {:?} is not registered, directory invariants do not hold",
                    self.name
                ),
            }
        }
    }

    fn preferred_buffer_size(&self) -> usize {
        BLOCK_SIZE
    }
}
