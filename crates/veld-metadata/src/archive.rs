//! Unpacked library archives
//!
//! A library archive is a directory named `<module>.vlib` containing a
//! `header.vm` file and one `fragments/<package>.vf` file per package
//! fragment. Archives are read-only once produced; the header is parsed
//! lazily on first access and memoized.

use crate::decl::PackageFragment;
use crate::encoder::{DecodeError, MetadataReader, MetadataWriter};
use crate::header::{ArchiveHeader, HeaderError};
use crate::versions::MetadataVersion;
use once_cell::unsync::OnceCell;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File extension of a library archive directory
pub const ARCHIVE_EXTENSION: &str = "vlib";

/// Name of the header file inside an archive
pub const HEADER_FILE: &str = "header.vm";

/// Name of the fragments directory inside an archive
pub const FRAGMENTS_DIR: &str = "fragments";

/// Extension of a fragment payload file
pub const FRAGMENT_EXTENSION: &str = "vf";

/// Errors that can occur while reading or writing archives
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// IO error
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed archive header
    #[error("Malformed header in {path}: {source}")]
    Header {
        path: PathBuf,
        #[source]
        source: HeaderError,
    },

    /// Malformed fragment payload
    #[error("Malformed fragment '{package}' in {path}: {source}")]
    Fragment {
        path: PathBuf,
        package: String,
        #[source]
        source: DecodeError,
    },

    /// Fragment payload checksum mismatch
    #[error("Fragment '{package}' checksum mismatch in {path}")]
    FragmentChecksum { path: PathBuf, package: String },

    /// Destination directory missing or not a directory
    #[error("Destination directory does not exist: {0}")]
    DestinationMissing(PathBuf),
}

impl ArchiveError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        ArchiveError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A library archive on disk
pub struct LibraryArchive {
    root: PathBuf,
    header: OnceCell<ArchiveHeader>,
}

impl LibraryArchive {
    /// Whether a search-path entry looks like a library archive.
    ///
    /// Recognized forms: a `.vlib` directory, or any directory containing
    /// a `header.vm` file. Everything else is not an archive (mixed
    /// classpaths are expected, so this is not an error condition).
    pub fn recognize(path: &Path) -> bool {
        if path.extension().and_then(|ext| ext.to_str()) == Some(ARCHIVE_EXTENSION) {
            return path.exists();
        }
        path.is_dir() && path.join(HEADER_FILE).is_file()
    }

    /// Open an archive rooted at the given path.
    ///
    /// The header is not read until first requested.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            header: OnceCell::new(),
        }
    }

    /// Path of the archive root directory
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Parse the archive header, memoized after the first read.
    ///
    /// A malformed header is a hard error; a half-understood dependency
    /// graph is not safe to proceed with.
    pub fn header(&self) -> Result<&ArchiveHeader, ArchiveError> {
        self.header.get_or_try_init(|| {
            let header_path = self.root.join(HEADER_FILE);
            let data = fs::read(&header_path).map_err(|e| ArchiveError::io(&header_path, e))?;
            ArchiveHeader::decode(&data).map_err(|source| ArchiveError::Header {
                path: self.root.clone(),
                source,
            })
        })
    }

    /// Read and decode one package fragment.
    ///
    /// Returns `Ok(None)` when the header does not list the package.
    pub fn read_fragment(&self, package: &str) -> Result<Option<PackageFragment>, ArchiveError> {
        let header = self.header()?;
        if !header.package_fragment_names.iter().any(|n| n == package) {
            return Ok(None);
        }

        let path = self.fragment_path(package);
        let data = fs::read(&path).map_err(|e| ArchiveError::io(&path, e))?;

        let mut reader = MetadataReader::new(&data);
        let stored_checksum = reader.read_u32().map_err(|source| ArchiveError::Fragment {
            path: path.clone(),
            package: package.to_string(),
            source,
        })?;
        if stored_checksum != crc32fast::hash(&data[4..]) {
            return Err(ArchiveError::FragmentChecksum {
                path,
                package: package.to_string(),
            });
        }

        let _metadata_version =
            MetadataVersion::decode(&mut reader).map_err(|source| ArchiveError::Fragment {
                path: path.clone(),
                package: package.to_string(),
                source,
            })?;
        let fragment =
            PackageFragment::decode(&mut reader).map_err(|source| ArchiveError::Fragment {
                path: path.clone(),
                package: package.to_string(),
                source,
            })?;
        Ok(Some(fragment))
    }

    /// Write an unpacked archive into `dest_dir`, named by the header's
    /// module name, and return the archive root path.
    ///
    /// The destination directory is checked before anything is encoded or
    /// created, so the expected failure mode (missing destination) never
    /// leaves a partial archive behind.
    pub fn write_unpacked(
        dest_dir: &Path,
        header: &ArchiveHeader,
        fragments: &[PackageFragment],
        metadata_version: MetadataVersion,
    ) -> Result<PathBuf, ArchiveError> {
        if !dest_dir.is_dir() {
            return Err(ArchiveError::DestinationMissing(dest_dir.to_path_buf()));
        }

        // Encode everything up front; filesystem work starts only after
        // every payload has been produced.
        let header_bytes = header.encode();
        let mut encoded_fragments = Vec::with_capacity(fragments.len());
        for fragment in fragments {
            let mut writer = MetadataWriter::new();
            let checksum_offset = writer.reserve_u32();
            metadata_version.encode(&mut writer);
            fragment.encode(&mut writer);
            let checksum = crc32fast::hash(&writer.buffer()[checksum_offset + 4..]);
            writer.patch_u32(checksum_offset, checksum);
            encoded_fragments.push((fragment.package.clone(), writer.into_bytes()));
        }

        let root = dest_dir.join(format!("{}.{}", header.module_name, ARCHIVE_EXTENSION));
        let fragments_dir = root.join(FRAGMENTS_DIR);
        fs::create_dir_all(&fragments_dir).map_err(|e| ArchiveError::io(&fragments_dir, e))?;

        for (package, bytes) in &encoded_fragments {
            let path = fragments_dir.join(format!("{}.{}", package, FRAGMENT_EXTENSION));
            fs::write(&path, bytes).map_err(|e| ArchiveError::io(&path, e))?;
        }
        // Header last: an archive without one is never recognized as valid.
        let header_path = root.join(HEADER_FILE);
        fs::write(&header_path, &header_bytes).map_err(|e| ArchiveError::io(&header_path, e))?;

        Ok(root)
    }

    fn fragment_path(&self, package: &str) -> PathBuf {
        self.root
            .join(FRAGMENTS_DIR)
            .join(format!("{}.{}", package, FRAGMENT_EXTENSION))
    }
}
