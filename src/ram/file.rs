use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

/// Size in bytes of one storage block. A storage-engine constant, not a
/// user-facing knob.
pub(crate) const BLOCK_SIZE: usize = 4096;

/// An in-memory file: an ordered list of fixed-size blocks plus a committed
/// byte length.
///
/// A `RamFile` is built up by exactly one writer, which owns it outright
/// until the writer closes. Closing wraps the file in an `Arc` and installs
/// it in the directory table; from then on the contents are immutable and
/// every reader holds a clone of the `Arc`. The file is deallocated when
/// the last clone drops, which can only happen after the directory entry
/// itself was removed, so a file that is still reachable through the table
/// is never freed.
///
/// `length` may be smaller than `blocks.len() * BLOCK_SIZE`: the last block
/// is usually partially used, and a flush or seek at an exact block
/// boundary can leave a trailing block with no data in it at all. Readers
/// must derive their end-of-data geometry from `length`, never from the
/// block count.
#[derive(Debug)]
pub(crate) struct RamFile {
    pub(crate) blocks: Vec<Box<[u8]>>,
    pub(crate) length: u64,
    pub(crate) last_modified: DateTime<Utc>,
}

impl RamFile {
    pub(crate) fn new() -> Self {
        Self {
            blocks: Vec::new(),
            length: 0,
            last_modified: Utc::now(),
        }
    }

    /// Append one zeroed block.
    pub(crate) fn alloc_block(&mut self) {
        self.blocks.push(vec![0u8; BLOCK_SIZE].into_boxed_slice());
    }
}

/// One slot of the directory's name table.
///
/// `Reserved` marks a name that is taken but has no file behind it yet:
/// either a writer is still producing the file, or the name is a held lock.
/// Reserved names count as existing (so a second `create_output` or
/// `obtain_lock` fails) but are invisible to `open_input`, `rename` and
/// `delete_file`.
#[derive(Debug)]
pub(crate) enum FileSlot {
    Reserved,
    Committed(Arc<RamFile>),
}

/// The shared name table. Writers and lock handles keep their own handle to
/// it so that committing and releasing work no matter where the directory
/// value itself has moved.
pub(crate) type FileTable = Arc<Mutex<HashMap<String, FileSlot>>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_file_is_empty() {
        let file = RamFile::new();
        assert_eq!(file.length, 0);
        assert!(file.blocks.is_empty());
    }

    #[test]
    fn alloc_block_appends_zeroed_storage() {
        let mut file = RamFile::new();
        file.alloc_block();
        file.alloc_block();
        assert_eq!(file.blocks.len(), 2);
        assert_eq!(file.blocks[0].len(), BLOCK_SIZE);
        assert!(file.blocks[1].iter().all(|&b| b == 0));
        // allocation does not move the committed length
        assert_eq!(file.length, 0);
    }
}
