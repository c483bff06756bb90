//! Buffered binary streams.
//!
//! Every read and write goes through a buffer, and the buffer is either
//! internal or external. Streams start out with no buffer at all; if no
//! external buffer is installed before the first read or write, the backend
//! attaches an internal one lazily. Once a stream has a buffer it cannot be
//! replaced through the public API: for a writer that would have the clear
//! meaning of flushing the old buffer first, but for a reader there is no
//! good answer for pending unread data (ignore it? copy it into a buffer
//! that may be too small?), so swapping buffers is treated as a programming
//! error and panics. Backends are free to juggle buffers internally.
//!
//! Some backends never accept an external buffer. The RAM-backed streams in
//! this crate are like that: their buffer is a block of the file itself, so
//! reusing a caller's buffer could only add copies.

pub mod input;
pub mod output;

pub use input::{BufferedInput, IndexInput, InputSource};
pub use output::{BufferedOutput, IndexOutput, OutputSink};

/// Maximum length in bytes of the varint encoding of a 32-bit value.
pub const MAX_VARINT32_LEN: usize = 5;

/// Maximum length in bytes of the varint encoding of a 64-bit value.
pub const MAX_VARINT64_LEN: usize = 10;

/// Fallback internal buffer capacity for backends without a better idea.
/// Backends with a natural allocation unit (the RAM streams use their block
/// size) override `preferred_buffer_size` instead.
pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

/// Cursor state shared by both stream directions.
///
/// The offsets point into whatever buffer the backend currently exposes:
/// `start` is the beginning of the writable/readable region, `end` one past
/// its end, `cur` the current position, `pos` the absolute stream position.
/// Readers also track `filled`, one past the last byte the backend has made
/// valid; `cur == filled` means the buffer has to be refilled before
/// further reads. Writers leave `filled` alone.
///
/// The fields are public so that backend implementations outside this crate
/// can maintain them from their `fill`/`write_out`/`seek` hooks.
#[derive(Debug, Default)]
pub struct StreamCursor {
    attached: bool,
    pub start: usize,
    pub cur: usize,
    pub end: usize,
    pub filled: usize,
    pub pos: u64,
}

impl StreamCursor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// True once a buffer (internal or external) has been attached.
    pub fn attached(&self) -> bool {
        self.attached
    }

    /// Attach a buffer of `size` bytes, with the cursor at its start.
    /// Callers reposition `cur` and `filled` afterwards when needed.
    pub fn attach(&mut self, size: usize) {
        self.attached = true;
        self.start = 0;
        self.cur = 0;
        self.end = size;
        self.filled = 0;
    }

    /// Unused bytes after the cursor (writer side).
    pub fn available(&self) -> usize {
        self.end - self.cur
    }

    /// Valid unread bytes after the cursor (reader side).
    pub fn readable(&self) -> usize {
        self.filled - self.cur
    }

    /// Size of the attached buffer, 0 if none.
    pub fn buffer_size(&self) -> usize {
        if self.attached {
            self.end - self.start
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_starts_detached() {
        let cursor = StreamCursor::new();
        assert!(!cursor.attached());
        assert_eq!(cursor.buffer_size(), 0);
        assert_eq!(cursor.available(), 0);
        assert_eq!(cursor.readable(), 0);
    }

    #[test]
    fn attach_resets_offsets() {
        let mut cursor = StreamCursor::new();
        cursor.attach(4096);
        assert!(cursor.attached());
        assert_eq!(cursor.buffer_size(), 4096);
        assert_eq!(cursor.available(), 4096);
        assert_eq!(cursor.readable(), 0);
    }
}
