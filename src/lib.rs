//! Storage And Binary I/O Core
//!
//! This library is the storage layer of a small text-indexing engine: a
//! directory abstraction over named, append-then-immutable files, with a
//! buffered stream layer on top that encodes and decodes fixed-width and
//! variable-length integers. Index writers persist field data through
//! [`IndexOutput`] and read it back through [`IndexInput`]; the directory
//! arbitrates names, lifetimes and locking between concurrent writers and
//! readers.
//!
//! # Modules
//!
//! - `directory`: The [`Directory`] contract every storage backend
//!   satisfies: list, create, open, delete, rename, length, existence,
//!   locking.
//! - `stream`: The buffered binary streams and their pluggable backends.
//! - `ram`: The in-memory implementation: block-allocated files, the name
//!   table, lock files and the RAM stream adapters.
//! - `error`: The crate error type and `Result` alias.
//!
//! # Usage
//!
//! ```rust
//! use ramstore::{Directory, IndexInput, IndexOutput, RamDirectory};
//!
//! let dir = RamDirectory::new();
//!
//! // write a file; closing the writer publishes it
//! let mut output = dir.create_output("segment_1.fdt").unwrap();
//! output.write_string(b"hello, index").unwrap();
//! output.write_varint32(42).unwrap();
//! output.close();
//!
//! // read it back
//! let mut input = dir.open_input("segment_1.fdt").unwrap();
//! let mut buf = Vec::new();
//! input.read_string(&mut buf).unwrap();
//! assert_eq!(buf, b"hello, index");
//! assert_eq!(input.read_varint32().unwrap(), 42);
//! ```
//!
//! A file becomes visible to readers only when its writer is closed or
//! dropped; until then the name is reserved and a second `create_output`
//! on it fails. Deleting a file that still has open readers keeps its
//! bytes alive until the last reader goes away.

pub mod directory;
pub mod error;
pub mod ram;
pub mod stream;

pub use directory::Directory;
pub use error::{Result, StoreError};
pub use ram::{RamDirectory, RamInput, RamLock, RamOutput};
pub use stream::{
    BufferedInput, BufferedOutput, IndexInput, IndexOutput, InputSource, OutputSink, StreamCursor,
};
