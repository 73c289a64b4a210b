//! Version stamps carried by library archives
//!
//! Every archive header records which ABI the library was built against,
//! which compiler produced it, and optionally a library version and the
//! metadata payload format version.

use crate::encoder::{DecodeError, MetadataReader, MetadataWriter};

/// Version of the compiler that produced an archive.
pub const COMPILER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// ABI version of the library format.
///
/// Two libraries are compatible when their major versions match and the
/// reader's minor version is at least the writer's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbiVersion {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
}

impl AbiVersion {
    /// ABI version stamped by the current toolchain
    pub const CURRENT: AbiVersion = AbiVersion {
        major: 1,
        minor: 4,
        patch: 0,
    };

    /// Whether a library with this ABI version can be read by the current toolchain
    pub fn is_compatible(&self) -> bool {
        self.major == Self::CURRENT.major && self.minor <= Self::CURRENT.minor
    }

    pub(crate) fn encode(&self, writer: &mut MetadataWriter) {
        writer.emit_u16(self.major);
        writer.emit_u16(self.minor);
        writer.emit_u16(self.patch);
    }

    pub(crate) fn decode(reader: &mut MetadataReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            major: reader.read_u16()?,
            minor: reader.read_u16()?,
            patch: reader.read_u16()?,
        })
    }
}

impl std::fmt::Display for AbiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Version of the binary metadata payload format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataVersion(pub u16, pub u16);

impl MetadataVersion {
    /// Payload format version written by the current toolchain
    pub const CURRENT: MetadataVersion = MetadataVersion(1, 1);

    pub(crate) fn encode(&self, writer: &mut MetadataWriter) {
        writer.emit_u16(self.0);
        writer.emit_u16(self.1);
    }

    pub(crate) fn decode(reader: &mut MetadataReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self(reader.read_u16()?, reader.read_u16()?))
    }
}

impl std::fmt::Display for MetadataVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.0, self.1)
    }
}

/// The version quadruple stamped into an archive header.
///
/// The metadata-only serialization path fills in the ABI and compiler
/// versions and leaves `library_version` and `metadata_version` unset;
/// richer serialization paths populate the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryVersioning {
    /// ABI version of the archive format
    pub abi_version: AbiVersion,
    /// User-facing library version, if any
    pub library_version: Option<String>,
    /// Compiler that produced the archive
    pub compiler_version: String,
    /// Payload format version, if stamped
    pub metadata_version: Option<MetadataVersion>,
}

impl LibraryVersioning {
    /// Versioning stamped by the metadata-only serializer
    pub fn current_metadata_only() -> Self {
        Self {
            abi_version: AbiVersion::CURRENT,
            library_version: None,
            compiler_version: COMPILER_VERSION.to_string(),
            metadata_version: None,
        }
    }

    pub(crate) fn encode(&self, writer: &mut MetadataWriter) {
        self.abi_version.encode(writer);
        match &self.library_version {
            Some(version) => {
                writer.emit_u8(1);
                writer.emit_string(version);
            }
            None => writer.emit_u8(0),
        }
        writer.emit_string(&self.compiler_version);
        match &self.metadata_version {
            Some(version) => {
                writer.emit_u8(1);
                version.encode(writer);
            }
            None => writer.emit_u8(0),
        }
    }

    pub(crate) fn decode(reader: &mut MetadataReader<'_>) -> Result<Self, DecodeError> {
        let abi_version = AbiVersion::decode(reader)?;
        let library_version = if reader.read_u8()? != 0 {
            Some(reader.read_string()?)
        } else {
            None
        };
        let compiler_version = reader.read_string()?;
        let metadata_version = if reader.read_u8()? != 0 {
            Some(MetadataVersion::decode(reader)?)
        } else {
            None
        };
        Ok(Self {
            abi_version,
            library_version,
            compiler_version,
            metadata_version,
        })
    }
}
