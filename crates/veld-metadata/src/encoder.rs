//! Binary encoding and decoding utilities
//!
//! This module provides the primitive reader and writer used by the
//! archive header and package fragment payloads. All multi-byte values
//! are little-endian.

use thiserror::Error;

/// Errors that can occur while decoding metadata
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Unexpected end of the metadata stream
    #[error("Unexpected end of metadata at offset {0}")]
    UnexpectedEnd(usize),

    /// Invalid UTF-8 string
    #[error("Invalid UTF-8 string at offset {0}")]
    InvalidUtf8(usize),

    /// Invalid declaration kind tag
    #[error("Invalid declaration kind tag {0} at offset {1}")]
    InvalidKindTag(u8, usize),
}

/// Metadata writer for encoding archive parts
pub struct MetadataWriter {
    buffer: Vec<u8>,
}

impl MetadataWriter {
    /// Create a new metadata writer
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Get the current buffer contents
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Consume the writer and return the encoded bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Get the current offset (length of the buffer)
    pub fn offset(&self) -> usize {
        self.buffer.len()
    }

    /// Emit a raw byte
    pub fn emit_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    /// Emit a 16-bit unsigned integer
    pub fn emit_u16(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Emit a 32-bit unsigned integer
    pub fn emit_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Emit raw bytes
    pub fn emit_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Emit a length-prefixed string (u32 length + UTF-8 bytes)
    pub fn emit_string(&mut self, value: &str) {
        self.emit_u32(value.len() as u32);
        self.buffer.extend_from_slice(value.as_bytes());
    }

    /// Reserve space for a u32 value, returning its offset for later patching
    pub fn reserve_u32(&mut self) -> usize {
        let offset = self.offset();
        self.emit_u32(0);
        offset
    }

    /// Patch a previously reserved u32 value at the given offset
    pub fn patch_u32(&mut self, offset: usize, value: u32) {
        self.buffer[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }
}

impl Default for MetadataWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Metadata reader for decoding archive parts
pub struct MetadataReader<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> MetadataReader<'a> {
    /// Create a new metadata reader
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    /// Get the current position in the buffer
    pub fn position(&self) -> usize {
        self.position
    }

    /// Get the remaining bytes in the buffer
    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    /// Read a single byte
    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        if self.position >= self.buffer.len() {
            return Err(DecodeError::UnexpectedEnd(self.position));
        }
        let value = self.buffer[self.position];
        self.position += 1;
        Ok(value)
    }

    /// Read a 16-bit unsigned integer
    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        if self.position + 2 > self.buffer.len() {
            return Err(DecodeError::UnexpectedEnd(self.position));
        }
        let bytes = [self.buffer[self.position], self.buffer[self.position + 1]];
        self.position += 2;
        Ok(u16::from_le_bytes(bytes))
    }

    /// Read a 32-bit unsigned integer
    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        if self.position + 4 > self.buffer.len() {
            return Err(DecodeError::UnexpectedEnd(self.position));
        }
        let bytes = [
            self.buffer[self.position],
            self.buffer[self.position + 1],
            self.buffer[self.position + 2],
            self.buffer[self.position + 3],
        ];
        self.position += 4;
        Ok(u32::from_le_bytes(bytes))
    }

    /// Read a fixed number of bytes
    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>, DecodeError> {
        if self.position + count > self.buffer.len() {
            return Err(DecodeError::UnexpectedEnd(self.position));
        }
        let bytes = self.buffer[self.position..self.position + count].to_vec();
        self.position += count;
        Ok(bytes)
    }

    /// Read a length-prefixed string (u32 length + UTF-8 bytes)
    pub fn read_string(&mut self) -> Result<String, DecodeError> {
        let len = self.read_u32()? as usize;
        if self.position + len > self.buffer.len() {
            return Err(DecodeError::UnexpectedEnd(self.position));
        }
        let bytes = &self.buffer[self.position..self.position + len];
        self.position += len;
        String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidUtf8(self.position - len))
    }
}
