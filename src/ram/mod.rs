//! The in-memory directory: a name table over block-allocated files, plus
//! the adapters that bind the buffered streams to block storage.

pub mod directory;
pub mod file;
pub mod input;
pub mod output;

pub use directory::{RamDirectory, RamLock};
pub use input::{RamFileSource, RamInput};
pub use output::{RamFileSink, RamOutput};
