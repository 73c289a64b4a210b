//! Archive header encoding and decoding

use crate::encoder::{DecodeError, MetadataReader, MetadataWriter};
use crate::versions::LibraryVersioning;
use thiserror::Error;

/// Magic number for Veld library archives: "VLIB"
pub const MAGIC: [u8; 4] = *b"VLIB";

/// Current header format version
pub const HEADER_VERSION: u32 = 1;

/// Header encoding/decoding errors
#[derive(Debug, Error)]
pub enum HeaderError {
    /// Decode error
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Invalid magic number
    #[error("Invalid magic number: expected VLIB, got {0:?}")]
    InvalidMagic([u8; 4]),

    /// Unsupported header format version
    #[error("Unsupported header version: {0} (current: {HEADER_VERSION})")]
    UnsupportedVersion(u32),

    /// Checksum mismatch
    #[error("Header checksum mismatch: expected {expected:#x}, got {actual:#x}")]
    ChecksumMismatch { expected: u32, actual: u32 },
}

/// Header of a library archive.
///
/// Records the module's name, its version stamps, and the names of the
/// package fragments the archive carries. A header declaring zero
/// fragments is valid; such a library simply contributes nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveHeader {
    /// Declared module name
    pub module_name: String,
    /// Version quadruple stamped at write time
    pub versions: LibraryVersioning,
    /// Names of the package fragments in the archive
    pub package_fragment_names: Vec<String>,
}

impl ArchiveHeader {
    /// Encode the header to binary.
    ///
    /// Layout: magic (4 bytes) + header version (u32) + crc32 of the
    /// remainder (u32) + versioning + module name + fragment name list.
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = MetadataWriter::new();
        writer.emit_bytes(&MAGIC);
        writer.emit_u32(HEADER_VERSION);
        let checksum_offset = writer.reserve_u32();

        self.versions.encode(&mut writer);
        writer.emit_string(&self.module_name);
        writer.emit_u32(self.package_fragment_names.len() as u32);
        for name in &self.package_fragment_names {
            writer.emit_string(name);
        }

        let checksum = crc32fast::hash(&writer.buffer()[checksum_offset + 4..]);
        writer.patch_u32(checksum_offset, checksum);
        writer.into_bytes()
    }

    /// Decode a header from binary
    pub fn decode(data: &[u8]) -> Result<Self, HeaderError> {
        let mut reader = MetadataReader::new(data);

        let magic = reader.read_bytes(4)?;
        let magic: [u8; 4] = magic.try_into().unwrap_or([0; 4]);
        if magic != MAGIC {
            return Err(HeaderError::InvalidMagic(magic));
        }

        let version = reader.read_u32()?;
        if version != HEADER_VERSION {
            return Err(HeaderError::UnsupportedVersion(version));
        }

        let stored_checksum = reader.read_u32()?;
        let payload = &data[12..];
        let actual_checksum = crc32fast::hash(payload);
        if stored_checksum != actual_checksum {
            return Err(HeaderError::ChecksumMismatch {
                expected: stored_checksum,
                actual: actual_checksum,
            });
        }

        let versions = LibraryVersioning::decode(&mut reader)?;
        let module_name = reader.read_string()?;
        let count = reader.read_u32()? as usize;
        let mut package_fragment_names = Vec::with_capacity(count);
        for _ in 0..count {
            package_fragment_names.push(reader.read_string()?);
        }

        Ok(Self {
            module_name,
            versions,
            package_fragment_names,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> ArchiveHeader {
        ArchiveHeader {
            module_name: "common-core".to_string(),
            versions: LibraryVersioning::current_metadata_only(),
            package_fragment_names: vec!["common".to_string(), "common.io".to_string()],
        }
    }

    #[test]
    fn test_header_roundtrip() {
        let header = sample_header();
        let bytes = header.encode();
        let decoded = ArchiveHeader::decode(&bytes).unwrap();
        assert_eq!(decoded, header);
    }

    #[test]
    fn test_zero_fragment_header_is_valid() {
        let header = ArchiveHeader {
            module_name: "empty-lib".to_string(),
            versions: LibraryVersioning::current_metadata_only(),
            package_fragment_names: vec![],
        };
        let decoded = ArchiveHeader::decode(&header.encode()).unwrap();
        assert!(decoded.package_fragment_names.is_empty());
    }

    #[test]
    fn test_invalid_magic() {
        let mut bytes = sample_header().encode();
        bytes[0..4].copy_from_slice(b"XXXX");
        assert!(matches!(
            ArchiveHeader::decode(&bytes),
            Err(HeaderError::InvalidMagic(_))
        ));
    }

    #[test]
    fn test_unsupported_version() {
        let mut bytes = sample_header().encode();
        bytes[4..8].copy_from_slice(&999u32.to_le_bytes());
        assert!(matches!(
            ArchiveHeader::decode(&bytes),
            Err(HeaderError::UnsupportedVersion(999))
        ));
    }

    #[test]
    fn test_corrupted_payload_fails_checksum() {
        let mut bytes = sample_header().encode();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        assert!(matches!(
            ArchiveHeader::decode(&bytes),
            Err(HeaderError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_truncated_header_fails() {
        let bytes = sample_header().encode();
        assert!(ArchiveHeader::decode(&bytes[..10]).is_err());
    }
}
