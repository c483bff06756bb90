use crate::error::Result;
use crate::stream::{IndexInput, IndexOutput};

/// Abstraction layer over a flat list of named files (no sub-folder
/// hierarchy).
///
/// Implementations must comply with the following:
/// - A file is created with `create_output`, written to, then closed.
/// - A file open for writing is not available for reading until its writer
///   is closed (or dropped); the close is the publication point.
/// - Once created, a file may only be opened for input or deleted. Calling
///   `create_output` on an existing name must fault.
pub trait Directory {
    /// Writer type bound to this directory's storage.
    type Output: IndexOutput;
    /// Reader type bound to this directory's storage.
    type Input: IndexInput;
    /// Lock handle; releases its reservation when dropped.
    type Lock;

    /// Names of all files stored in this directory, including reserved
    /// names (in-progress writes and held locks). Faults on I/O error.
    fn list_all(&self) -> Result<Vec<String>>;

    /// Remove an existing file. Faults with `FileNotFound` for an unknown
    /// name, or on I/O error. Deleting a name that is only reserved is a
    /// programming error.
    fn delete_file(&self, name: &str) -> Result<()>;

    /// Byte length of a file. Faults with `FileNotFound` for an unknown
    /// name, or on I/O error.
    fn file_length(&self, name: &str) -> Result<u64>;

    /// Create a new, empty file and return a writer for it. Faults with
    /// `FileAlreadyExists` if the name is taken (committed or reserved), or
    /// on I/O error.
    fn create_output(&self, name: &str) -> Result<Self::Output>;

    /// Rename `src` to `dst`, which must not already exist. Faults with
    /// `FileNotFound` / `FileAlreadyExists` accordingly, or on I/O error.
    fn rename(&self, src: &str, dst: &str) -> Result<()>;

    /// Open an existing file for reading. A name may exist but be
    /// unavailable because its writer has not finished; that is a
    /// programming error, not `FileNotFound`. Faults with `FileNotFound`
    /// for an unknown name, or on I/O error.
    fn open_input(&self, name: &str) -> Result<Self::Input>;

    /// Try to acquire the named directory lock, used to keep concurrent
    /// writers out of each other's way. Non-blocking: if anybody already
    /// holds the name, returns `None` immediately rather than waiting. The
    /// returned handle releases the lock when dropped. Faults only on I/O
    /// error.
    fn obtain_lock(&self, name: &str) -> Result<Option<Self::Lock>>;

    /// True if the named file exists (committed or reserved). Faults only
    /// on I/O error.
    fn file_exists(&self, name: &str) -> Result<bool>;

    /// Remove every committed file whose name starts with `prefix`, without
    /// faulting. Meant for cleanup after a partially failed multi-file
    /// write, so it must be callable from failure-handling paths. No-op by
    /// default.
    fn delete_segment(&self, _prefix: &str) {}
}
