//! Compiler configuration surface
//!
//! No command-line parsing here; embedders construct the configuration
//! programmatically and hand it to the pipeline.

use std::path::PathBuf;
use veld_metadata::MetadataVersion;

/// Language version settings, passed through to the analysis collaborator
/// untouched by this pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageVersion {
    pub major: u16,
    pub minor: u16,
}

impl LanguageVersion {
    /// Language version targeted by the current toolchain
    pub const CURRENT: LanguageVersion = LanguageVersion { major: 1, minor: 9 };
}

impl Default for LanguageVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

/// Configuration for one metadata compilation session
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Name of the module being compiled; also names the output archive
    pub module_name: String,
    /// Destination directory for the output archive
    pub destination: Option<PathBuf>,
    /// Classpath-like entries to scan for dependency archives
    pub search_path: Vec<PathBuf>,
    /// Language version handed to analysis
    pub language_version: LanguageVersion,
    /// Payload format override; defaults to the current format
    pub metadata_version: Option<MetadataVersion>,
}

impl CompilerConfig {
    /// Create a configuration for the given module name
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            destination: None,
            search_path: Vec::new(),
            language_version: LanguageVersion::default(),
            metadata_version: None,
        }
    }

    /// Set the output destination directory
    pub fn with_destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    /// Set the dependency search path
    pub fn with_search_path(mut self, search_path: Vec<PathBuf>) -> Self {
        self.search_path = search_path;
        self
    }

    /// Override the metadata payload format version
    pub fn with_metadata_version(mut self, version: MetadataVersion) -> Self {
        self.metadata_version = Some(version);
        self
    }

    /// Payload format version in effect for this session
    pub fn effective_metadata_version(&self) -> MetadataVersion {
        self.metadata_version.unwrap_or(MetadataVersion::CURRENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_version_defaults_to_current() {
        let config = CompilerConfig::new("app");
        assert_eq!(config.effective_metadata_version(), MetadataVersion::CURRENT);

        let pinned = config.with_metadata_version(MetadataVersion(1, 0));
        assert_eq!(pinned.effective_metadata_version(), MetadataVersion(1, 0));
    }

    #[test]
    fn test_builder_sets_fields() {
        let config = CompilerConfig::new("app")
            .with_destination("/tmp/out")
            .with_search_path(vec![PathBuf::from("lib-a.vlib")]);
        assert_eq!(config.module_name, "app");
        assert_eq!(config.destination, Some(PathBuf::from("/tmp/out")));
        assert_eq!(config.search_path.len(), 1);
        assert_eq!(config.language_version, LanguageVersion::CURRENT);
    }
}
