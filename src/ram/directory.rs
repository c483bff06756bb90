use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::directory::Directory;
use crate::error::{Result, StoreError};
use crate::ram::file::{FileSlot, FileTable};
use crate::ram::input::{RamFileSource, RamInput};
use crate::ram::output::{RamFileSink, RamOutput};
use crate::stream::{BufferedInput, BufferedOutput};

/// In-memory [`Directory`] implementation.
///
/// How ownership works across threads: a writer owns its `RamFile` outright
/// while the file's name sits in the table as a reservation. Closing the
/// writer wraps the file in an `Arc` and swaps it into the slot; that swap,
/// under the table mutex, is the point where the contents become visible to
/// every thread. Each `open_input` clones the `Arc` after the reader is
/// constructed, each reader drop releases its clone, and `delete_file`
/// removes the table's clone; whichever release happens to be last frees
/// the blocks. Table lookups and slot changes all happen under one mutex,
/// but the freeing itself never does: `delete_file` and `delete_segment`
/// move the removed entries out of the critical section first, and a reader
/// drop does not touch the mutex at all. Releasing large block lists
/// therefore never stalls unrelated directory operations.
pub struct RamDirectory {
    pub(crate) files: FileTable,
}

impl RamDirectory {
    pub fn new() -> Self {
        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// When the named file was last committed. Statting a name that is only
    /// reserved is a programming error, like reading one.
    pub fn file_modified(&self, name: &str) -> Result<DateTime<Utc>> {
        let files = self.files.lock();
        match files.get(name) {
            None => Err(StoreError::FileNotFound(name.to_string())),
            Some(FileSlot::Reserved) => {
                panic!("attempt to stat the uncommitted file {name:?}")
            }
            Some(FileSlot::Committed(file)) => Ok(file.last_modified),
        }
    }
}

impl Default for RamDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl Directory for RamDirectory {
    type Output = RamOutput;
    type Input = RamInput;
    type Lock = RamLock;

    fn list_all(&self) -> Result<Vec<String>> {
        Ok(self.files.lock().keys().cloned().collect())
    }

    fn delete_file(&self, name: &str) -> Result<()> {
        let removed = {
            let mut files = self.files.lock();
            match files.get(name) {
                None => return Err(StoreError::FileNotFound(name.to_string())),
                Some(FileSlot::Reserved) => panic!(
                    "attempt to delete the uncommitted file {name:?}; a file may be deleted \
                     only after it was committed"
                ),
                Some(FileSlot::Committed(_)) => {}
            }
            files.remove(name)
        };
        // the backing blocks are freed here, after the table lock is
        // released, unless a reader still holds the file
        drop(removed);
        Ok(())
    }

    fn file_length(&self, name: &str) -> Result<u64> {
        let files = self.files.lock();
        match files.get(name) {
            None => Err(StoreError::FileNotFound(name.to_string())),
            // a reserved name has no contents yet
            Some(FileSlot::Reserved) => Ok(0),
            Some(FileSlot::Committed(file)) => Ok(file.length),
        }
    }

    fn create_output(&self, name: &str) -> Result<RamOutput> {
        let mut files = self.files.lock();
        if files.contains_key(name) {
            return Err(StoreError::FileAlreadyExists(name.to_string()));
        }
        // reserve the name only once the writer exists, so a failed
        // construction cannot leave a dangling reservation behind
        let output = BufferedOutput::new(RamFileSink::new(Arc::clone(&self.files), name));
        files.insert(name.to_string(), FileSlot::Reserved);
        Ok(output)
    }

    fn rename(&self, src: &str, dst: &str) -> Result<()> {
        let mut files = self.files.lock();
        match files.get(src) {
            None => return Err(StoreError::FileNotFound(src.to_string())),
            Some(FileSlot::Reserved) => {
                panic!("attempt to rename the uncommitted file {src:?}")
            }
            Some(FileSlot::Committed(_)) => {}
        }
        if files.contains_key(dst) {
            return Err(StoreError::FileAlreadyExists(dst.to_string()));
        }
        if let Some(slot) = files.remove(src) {
            files.insert(dst.to_string(), slot);
        }
        Ok(())
    }

    fn open_input(&self, name: &str) -> Result<RamInput> {
        let files = self.files.lock();
        match files.get(name) {
            None => Err(StoreError::FileNotFound(name.to_string())),
            Some(FileSlot::Reserved) => panic!(
                "attempt to read the uncommitted file {name:?}; a file may be read only \
                 after it was committed"
            ),
            // the clone taken here is the reader's share of the file; if
            // construction bails out the clone is simply dropped again, so
            // the count can never leak
            Some(FileSlot::Committed(file)) => {
                Ok(BufferedInput::new(RamFileSource::new(Arc::clone(file))))
            }
        }
    }

    fn obtain_lock(&self, name: &str) -> Result<Option<RamLock>> {
        let mut files = self.files.lock();
        if files.contains_key(name) {
            // somebody holds the name; no waiting, no queue
            return Ok(None);
        }
        // same ordering as create_output: construct, then reserve
        let lock = RamLock {
            files: Arc::clone(&self.files),
            name: name.to_string(),
        };
        files.insert(name.to_string(), FileSlot::Reserved);
        Ok(Some(lock))
    }

    fn file_exists(&self, name: &str) -> Result<bool> {
        Ok(self.files.lock().contains_key(name))
    }

    fn delete_segment(&self, prefix: &str) {
        let removed = {
            let mut files = self.files.lock();
            let names: Vec<String> = files
                .keys()
                .filter(|n| n.starts_with(prefix))
                .cloned()
                .collect();
            let mut removed = Vec::with_capacity(names.len());
            for name in names {
                // cleanup runs after writers have already closed, so an
                // uncommitted match means the invariants are broken
                assert!(
                    matches!(files.get(&name), Some(FileSlot::Committed(_))),
                    "uncommitted file {name:?} in segment cleanup, directory invariants \
                     do not hold"
                );
                if let Some(FileSlot::Committed(file)) = files.remove(&name) {
                    removed.push(file);
                }
            }
            removed
        };
        drop(removed);
    }
}

impl Drop for RamDirectory {
    /// REQUIRES: no file is open for reading. Reserved entries are left
    /// alone: they may belong to lock handles, which keep the shared table
    /// alive and release cleanly on their own.
    fn drop(&mut self) {
        let files = self.files.lock();
        for (name, slot) in files.iter() {
            if let FileSlot::Committed(file) = slot {
                assert!(
                    Arc::strong_count(file) == 1,
                    "directory dropped while file {name:?} is open for reading"
                );
            }
        }
    }
}

/// Exclusive reservation of a directory name, released on drop. Obtained
/// through [`Directory::obtain_lock`]; there is no other surface.
pub struct RamLock {
    files: FileTable,
    name: String,
}

impl Drop for RamLock {
    fn drop(&mut self) {
        let mut files = self.files.lock();
        match files.remove(&self.name) {
            Some(FileSlot::Reserved) => {}
            Some(FileSlot::Committed(_)) => panic!(
                "lock name {:?} refers to a committed file, directory invariants do not hold",
                self.name
            ),
            // a lock whose name is gone means something already cleaned up
            // behind our back; degraded, but not worth crashing over
            None => log::warn!(
                "lock file {:?} is not found in the directory, it may be corrupted",
                self.name
            ),
        }
    }
}
