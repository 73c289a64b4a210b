//! Serialized declaration model
//!
//! Declarations are grouped into package fragments so that large modules
//! can be deserialized one package at a time.

use crate::encoder::{DecodeError, MetadataReader, MetadataWriter};

/// Kind of a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Class,
    Function,
    Constructor,
    Property,
    EnumEntry,
    TypeAlias,
}

impl DeclarationKind {
    /// Stable binary tag for this kind
    pub fn to_u8(self) -> u8 {
        match self {
            DeclarationKind::Class => 0,
            DeclarationKind::Function => 1,
            DeclarationKind::Constructor => 2,
            DeclarationKind::Property => 3,
            DeclarationKind::EnumEntry => 4,
            DeclarationKind::TypeAlias => 5,
        }
    }

    /// Decode a binary tag back into a kind
    pub fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(DeclarationKind::Class),
            1 => Some(DeclarationKind::Function),
            2 => Some(DeclarationKind::Constructor),
            3 => Some(DeclarationKind::Property),
            4 => Some(DeclarationKind::EnumEntry),
            5 => Some(DeclarationKind::TypeAlias),
            _ => None,
        }
    }
}

/// Where a declaration came from.
///
/// Only `Source` declarations are written by the serializer; everything an
/// archive contains is its own content, so origin is not persisted.
/// Declarations read back from a library are marked `Dependency`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationOrigin {
    /// Declared in the current compilation's own sources
    Source,
    /// Re-exported from a dependency library
    Dependency,
}

/// A single top-level declaration inside a package fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Fully qualified package the declaration belongs to
    pub package: String,
    /// Simple name of the declaration
    pub name: String,
    /// Declaration kind
    pub kind: DeclarationKind,
    /// Origin of the declaration
    pub origin: DeclarationOrigin,
}

impl Declaration {
    /// Create a declaration originating in current sources
    pub fn source(package: impl Into<String>, name: impl Into<String>, kind: DeclarationKind) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
            kind,
            origin: DeclarationOrigin::Source,
        }
    }

    /// Create a declaration inherited from a dependency library
    pub fn dependency(
        package: impl Into<String>,
        name: impl Into<String>,
        kind: DeclarationKind,
    ) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
            kind,
            origin: DeclarationOrigin::Dependency,
        }
    }

    fn encode(&self, writer: &mut MetadataWriter) {
        writer.emit_string(&self.name);
        writer.emit_u8(self.kind.to_u8());
    }

    fn decode(reader: &mut MetadataReader<'_>, package: &str) -> Result<Self, DecodeError> {
        let name = reader.read_string()?;
        let tag = reader.read_u8()?;
        let kind = DeclarationKind::from_u8(tag)
            .ok_or(DecodeError::InvalidKindTag(tag, reader.position() - 1))?;
        Ok(Self {
            package: package.to_string(),
            name,
            kind,
            origin: DeclarationOrigin::Dependency,
        })
    }
}

/// A named, independently decodable subset of a module's declarations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageFragment {
    /// Fully qualified package name
    pub package: String,
    /// Declarations contained in the package
    pub declarations: Vec<Declaration>,
}

impl PackageFragment {
    /// Create a new package fragment
    pub fn new(package: impl Into<String>, declarations: Vec<Declaration>) -> Self {
        Self {
            package: package.into(),
            declarations,
        }
    }

    /// Encode the fragment payload
    pub fn encode(&self, writer: &mut MetadataWriter) {
        writer.emit_string(&self.package);
        writer.emit_u32(self.declarations.len() as u32);
        for decl in &self.declarations {
            decl.encode(writer);
        }
    }

    /// Decode a fragment payload
    pub fn decode(reader: &mut MetadataReader<'_>) -> Result<Self, DecodeError> {
        let package = reader.read_string()?;
        let count = reader.read_u32()? as usize;
        let mut declarations = Vec::with_capacity(count);
        for _ in 0..count {
            declarations.push(Declaration::decode(reader, &package)?);
        }
        Ok(Self {
            package,
            declarations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags_roundtrip() {
        let kinds = [
            DeclarationKind::Class,
            DeclarationKind::Function,
            DeclarationKind::Constructor,
            DeclarationKind::Property,
            DeclarationKind::EnumEntry,
            DeclarationKind::TypeAlias,
        ];
        for kind in kinds {
            assert_eq!(DeclarationKind::from_u8(kind.to_u8()), Some(kind));
        }
        assert_eq!(DeclarationKind::from_u8(0xFF), None);
    }

    #[test]
    fn test_fragment_roundtrip_marks_dependency_origin() {
        let fragment = PackageFragment::new(
            "common.text",
            vec![
                Declaration::source("common.text", "StringBuilder", DeclarationKind::Class),
                Declaration::source("common.text", "format", DeclarationKind::Function),
            ],
        );

        let mut writer = MetadataWriter::new();
        fragment.encode(&mut writer);
        let bytes = writer.into_bytes();

        let mut reader = MetadataReader::new(&bytes);
        let decoded = PackageFragment::decode(&mut reader).unwrap();

        assert_eq!(decoded.package, "common.text");
        assert_eq!(decoded.declarations.len(), 2);
        // Deserialized declarations always come back as dependency content.
        for decl in &decoded.declarations {
            assert_eq!(decl.origin, DeclarationOrigin::Dependency);
            assert_eq!(decl.package, "common.text");
        }
        assert_eq!(decoded.declarations[0].name, "StringBuilder");
        assert_eq!(decoded.declarations[1].kind, DeclarationKind::Function);
    }

    #[test]
    fn test_empty_fragment_roundtrip() {
        let fragment = PackageFragment::new("common.empty", vec![]);
        let mut writer = MetadataWriter::new();
        fragment.encode(&mut writer);
        let bytes = writer.into_bytes();

        let mut reader = MetadataReader::new(&bytes);
        let decoded = PackageFragment::decode(&mut reader).unwrap();
        assert_eq!(decoded.package, "common.empty");
        assert!(decoded.declarations.is_empty());
    }

    #[test]
    fn test_invalid_kind_tag_fails() {
        let mut writer = MetadataWriter::new();
        writer.emit_string("p");
        writer.emit_u32(1);
        writer.emit_string("Broken");
        writer.emit_u8(0xEE); // no such kind

        let bytes = writer.into_bytes();
        let mut reader = MetadataReader::new(&bytes);
        assert!(matches!(
            PackageFragment::decode(&mut reader),
            Err(DecodeError::InvalidKindTag(0xEE, _))
        ));
    }
}
