use crate::error::{Result, StoreError};
use crate::stream::{StreamCursor, DEFAULT_BUFFER_SIZE, MAX_VARINT32_LEN, MAX_VARINT64_LEN};

/// Binary reader over a buffered stream, symmetric with
/// [`IndexOutput`](crate::stream::IndexOutput).
///
/// Decoders fault with [`StoreError::Corruption`] when the data ends in the
/// middle of a value; plain `read_bytes` is best-effort and simply stops at
/// end of data.
pub trait IndexInput {
    /// Read one byte, or fault with a corruption error at end of data.
    fn read_byte(&mut self) -> Result<u8>;

    /// Read as many bytes as there are, no more than `buf.len()`. Returns
    /// the number of bytes copied; end of data is not a fault here.
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// True iff no buffered data remains and a refill attempt yields
    /// nothing.
    fn eof(&mut self) -> Result<bool>;

    /// Reposition the stream. Seeking at or past the end of the underlying
    /// data is a programming error.
    fn seek(&mut self, pos: u64) -> Result<()>;

    /// Absolute position in the stream.
    fn position(&self) -> u64;

    /// True once a buffer (internal or external) is attached.
    fn has_buffer(&self) -> bool;

    /// Size of the attached buffer, 0 if none.
    fn buffer_size(&self) -> usize;

    /// Whether an external buffer may be installed. See the writer-side
    /// contract; RAM streams report false.
    fn supports_external_buffer(&self) -> bool {
        false
    }

    /// Install a caller-supplied buffer. Panics if the stream already has a
    /// buffer or the backend does not support external buffers.
    fn set_external_buffer(&mut self, buffer: Vec<u8>);

    /// Communicate a desired internal buffer capacity. Advisory.
    fn hint_buffer_size(&mut self, _hint: usize) {}

    /// An efficient buffer size for the underlying input mechanism.
    fn preferred_buffer_size(&self) -> usize {
        DEFAULT_BUFFER_SIZE
    }

    /// Read a little-endian `u32`, or fault if fewer than 4 bytes remain.
    fn read_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        if self.read_bytes(&mut buf)? < buf.len() {
            return Err(StoreError::Corruption(
                "unexpected end of data inside a 32-bit value".to_string(),
            ));
        }
        Ok(u32::from_le_bytes(buf))
    }

    /// Read a little-endian `u64`, or fault if fewer than 8 bytes remain.
    fn read_u64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        if self.read_bytes(&mut buf)? < buf.len() {
            return Err(StoreError::Corruption(
                "unexpected end of data inside a 64-bit value".to_string(),
            ));
        }
        Ok(u64::from_le_bytes(buf))
    }

    /// Decode a varint-encoded `u32`.
    fn read_varint32(&mut self) -> Result<u32> {
        let mut ret = 0u32;
        for group in 0..MAX_VARINT32_LEN {
            if self.eof()? {
                return Err(StoreError::Corruption(
                    "unexpected end of data inside a varint".to_string(),
                ));
            }
            let byte = self.read_byte()?;
            ret |= ((byte & 0x7f) as u32) << (7 * group);
            if byte & 0x80 == 0 {
                return Ok(ret);
            }
        }
        Err(StoreError::Corruption(
            "varint exceeds the 32-bit length limit".to_string(),
        ))
    }

    /// Decode a varint-encoded `u64`.
    fn read_varint64(&mut self) -> Result<u64> {
        let mut ret = 0u64;
        for group in 0..MAX_VARINT64_LEN {
            if self.eof()? {
                return Err(StoreError::Corruption(
                    "unexpected end of data inside a varint".to_string(),
                ));
            }
            let byte = self.read_byte()?;
            ret |= ((byte & 0x7f) as u64) << (7 * group);
            if byte & 0x80 == 0 {
                return Ok(ret);
            }
        }
        Err(StoreError::Corruption(
            "varint exceeds the 64-bit length limit".to_string(),
        ))
    }

    /// Read a length-prefixed byte string into `buf`, clearing it first.
    /// Takes the buffer by reference so one allocation can serve many
    /// reads.
    fn read_string(&mut self, buf: &mut Vec<u8>) -> Result<()> {
        buf.clear();
        let len = self.read_varint32()? as usize;
        buf.resize(len, 0);
        if self.read_bytes(buf)? < len {
            return Err(StoreError::Corruption(
                "unexpected end of data inside a string".to_string(),
            ));
        }
        Ok(())
    }
}

/// Storage backend for [`BufferedInput`].
pub trait InputSource {
    /// The buffer region the cursor offsets currently point into.
    fn buffer(&self) -> &[u8];

    /// Make more data available. On the first call this attaches the
    /// internal buffer. Returns true when new bytes are available (with
    /// `cursor.cur`/`cursor.filled` updated), false on a clean end of
    /// data. Only called when the buffer is provably exhausted.
    fn fill(&mut self, cursor: &mut StreamCursor) -> Result<bool>;

    /// Reposition the stream to the absolute position `pos`, updating the
    /// cursor accordingly.
    fn seek(&mut self, cursor: &mut StreamCursor, pos: u64) -> Result<()>;

    fn supports_external_buffer(&self) -> bool {
        false
    }

    /// Take ownership of a caller-supplied buffer. Sources that report
    /// support must override this.
    fn install_external_buffer(&mut self, _cursor: &mut StreamCursor, _buffer: Vec<u8>) {
        panic!("this stream does not support external buffers");
    }

    fn hint_buffer_size(&mut self, _hint: usize) {}

    fn preferred_buffer_size(&self) -> usize {
        DEFAULT_BUFFER_SIZE
    }
}

/// The buffering engine behind every reader: tracks the cursor and refills
/// through the source when the valid bytes run out.
pub struct BufferedInput<S: InputSource> {
    source: S,
    cursor: StreamCursor,
}

impl<S: InputSource> BufferedInput<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cursor: StreamCursor::new(),
        }
    }
}

impl<S: InputSource> IndexInput for BufferedInput<S> {
    fn read_byte(&mut self) -> Result<u8> {
        if self.eof()? {
            return Err(StoreError::Corruption(
                "cannot read a byte, end of data reached".to_string(),
            ));
        }
        let b = self.source.buffer()[self.cursor.cur];
        self.cursor.cur += 1;
        self.cursor.pos += 1;
        Ok(b)
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut copied = 0;
        while copied < buf.len() && !self.eof()? {
            let n = (buf.len() - copied).min(self.cursor.readable());
            let cur = self.cursor.cur;
            buf[copied..copied + n].copy_from_slice(&self.source.buffer()[cur..cur + n]);
            self.cursor.cur += n;
            copied += n;
        }
        self.cursor.pos += copied as u64;
        Ok(copied)
    }

    fn eof(&mut self) -> Result<bool> {
        if self.cursor.readable() > 0 {
            return Ok(false);
        }
        Ok(!self.source.fill(&mut self.cursor)?)
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        self.source.seek(&mut self.cursor, pos)
    }

    fn position(&self) -> u64 {
        self.cursor.pos
    }

    fn has_buffer(&self) -> bool {
        self.cursor.attached()
    }

    fn buffer_size(&self) -> usize {
        self.cursor.buffer_size()
    }

    fn supports_external_buffer(&self) -> bool {
        self.source.supports_external_buffer()
    }

    fn set_external_buffer(&mut self, buffer: Vec<u8>) {
        assert!(!self.has_buffer(), "stream already has a buffer");
        self.source.install_external_buffer(&mut self.cursor, buffer);
    }

    fn hint_buffer_size(&mut self, hint: usize) {
        self.source.hint_buffer_size(hint);
    }

    fn preferred_buffer_size(&self) -> usize {
        self.source.preferred_buffer_size()
    }
}
