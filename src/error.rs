use thiserror::Error;

/// Recoverable faults surfaced by directory and stream operations.
///
/// Violated internal invariants (double buffer assignment, reading an
/// uncommitted file, seeking past file bounds and the like) are caller
/// contract violations, not data faults; those panic instead of showing up
/// here.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The operation referenced a name that is not in the directory.
    #[error("file not found: {0}")]
    FileNotFound(String),

    /// The target name is already taken, either by a committed file or by a
    /// reservation (an in-progress write or a held lock).
    #[error("file already exists: {0}")]
    FileAlreadyExists(String),

    /// Backend I/O failure. The in-memory backend never produces this; it
    /// exists for directory implementations that talk to real devices.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A read-side parse failure: end of data inside a fixed-width value,
    /// varint or string, or a varint that exceeds its maximum byte count.
    #[error("index corruption: {0}")]
    Corruption(String),
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
