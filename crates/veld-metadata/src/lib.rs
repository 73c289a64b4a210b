//! Veld Metadata Library Format
//!
//! This crate provides the on-disk format for Veld metadata libraries:
//! version stamps, the archive header, per-package declaration payloads,
//! and the unpacked `.vlib` archive layout.

#![warn(rust_2018_idioms)]

pub mod archive;
pub mod decl;
pub mod encoder;
pub mod header;
pub mod versions;

pub use archive::{ArchiveError, LibraryArchive};
pub use decl::{Declaration, DeclarationKind, DeclarationOrigin, PackageFragment};
pub use encoder::{DecodeError, MetadataReader, MetadataWriter};
pub use header::{ArchiveHeader, HeaderError};
pub use versions::{AbiVersion, LibraryVersioning, MetadataVersion, COMPILER_VERSION};
