//! Growable output buffer

use super::width::{Header, Prefix};
use crate::config::DEFAULT_MIN_ALLOC;

/// Append-only byte buffer the encoder writes through.
///
/// Capacity grows by at least doubling, starting from a minimum
/// allocation, so small messages allocate once and large ones amortize.
#[derive(Debug, Clone)]
pub struct ByteSink {
    buf: Vec<u8>,
}

impl Default for ByteSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteSink {
    /// Create a sink with the default minimum allocation.
    pub fn new() -> Self {
        Self::with_min_alloc(DEFAULT_MIN_ALLOC)
    }

    /// Create a sink whose first allocation holds `min_alloc` bytes.
    pub fn with_min_alloc(min_alloc: usize) -> Self {
        Self {
            buf: Vec::with_capacity(min_alloc.max(1)),
        }
    }

    fn reserve(&mut self, additional: usize) {
        let needed = self.buf.len().saturating_add(additional);
        let capacity = self.buf.capacity();
        if needed > capacity {
            let target = needed.max(capacity.saturating_mul(2));
            self.buf.reserve_exact(target - self.buf.len());
        }
    }

    /// Append one byte.
    pub fn put_u8(&mut self, byte: u8) {
        self.reserve(1);
        self.buf.push(byte);
    }

    /// Append a slice.
    pub fn put_slice(&mut self, bytes: &[u8]) {
        self.reserve(bytes.len());
        self.buf.extend_from_slice(bytes);
    }

    /// Append a tag byte followed by a big-endian payload.
    pub fn put_tagged(&mut self, tag: u8, payload: &[u8]) {
        self.reserve(1 + payload.len());
        self.buf.push(tag);
        self.buf.extend_from_slice(payload);
    }

    /// Append a header, writing `len` into its explicit prefix if it has one.
    ///
    /// Width selection guarantees `len` fits the prefix.
    pub fn put_header(&mut self, header: Header, len: usize) {
        let len = len as u64;
        match header.prefix {
            Prefix::None => self.put_u8(header.tag),
            Prefix::U8 => self.put_tagged(header.tag, &[len as u8]),
            Prefix::U16 => self.put_tagged(header.tag, &(len as u16).to_be_bytes()),
            Prefix::U32 => self.put_tagged(header.tag, &(len as u32).to_be_bytes()),
        }
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Currently allocated capacity.
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// View the written bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Take the written bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }
}
