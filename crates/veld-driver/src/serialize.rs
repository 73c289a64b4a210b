//! Metadata serialization
//!
//! Encodes the current module's own declarations into a versioned,
//! unpacked library archive. Declarations inherited from dependencies
//! are filtered out so metadata-only libraries stay minimal and never
//! duplicate dependency content.

use crate::analysis::AnalysisResult;
use crate::config::CompilerConfig;
use crate::diagnostics::{MessageCollector, Severity};
use std::path::PathBuf;
use thiserror::Error;
use veld_metadata::{
    ArchiveError, ArchiveHeader, Declaration, DeclarationOrigin, LibraryArchive,
    LibraryVersioning, PackageFragment,
};

/// Errors during serialization that are not user-configuration problems
#[derive(Debug, Error)]
pub enum SerializeError {
    /// Archive write failure past the configuration checks
    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

/// Serializes one module's metadata into a library archive
pub struct MetadataSerializer<'a> {
    config: &'a CompilerConfig,
}

impl<'a> MetadataSerializer<'a> {
    /// Create a serializer for the given configuration
    pub fn new(config: &'a CompilerConfig) -> Self {
        Self { config }
    }

    /// Serialize the analysis result into an unpacked archive.
    ///
    /// Returns `Ok(None)` without touching the filesystem when analysis
    /// reported errors (a normal outcome) or when the destination is
    /// missing or unusable (reported through the sink, exactly once).
    pub fn serialize(
        &self,
        analysis: &AnalysisResult,
        sink: &mut dyn MessageCollector,
    ) -> Result<Option<PathBuf>, SerializeError> {
        if analysis.has_errors {
            return Ok(None);
        }

        let destination = match &self.config.destination {
            Some(destination) => destination,
            None => {
                sink.report(
                    Severity::Error,
                    "no destination directory specified for metadata output",
                );
                return Ok(None);
            }
        };
        if !destination.is_dir() {
            sink.report(
                Severity::Error,
                &format!(
                    "destination directory does not exist: {}",
                    destination.display()
                ),
            );
            return Ok(None);
        }

        let fragments = group_into_fragments(&analysis.declarations);
        let header = ArchiveHeader {
            module_name: self.config.module_name.clone(),
            versions: LibraryVersioning::current_metadata_only(),
            package_fragment_names: fragments.iter().map(|f| f.package.clone()).collect(),
        };

        let root = LibraryArchive::write_unpacked(
            destination,
            &header,
            &fragments,
            self.config.effective_metadata_version(),
        )?;
        Ok(Some(root))
    }
}

/// Keep only current-source declarations and group them by package,
/// in deterministic package order.
fn group_into_fragments(declarations: &[Declaration]) -> Vec<PackageFragment> {
    let mut fragments: Vec<PackageFragment> = Vec::new();
    for decl in declarations {
        if decl.origin != DeclarationOrigin::Source {
            continue;
        }
        match fragments.iter_mut().find(|f| f.package == decl.package) {
            Some(fragment) => fragment.declarations.push(decl.clone()),
            None => fragments.push(PackageFragment::new(
                decl.package.clone(),
                vec![decl.clone()],
            )),
        }
    }
    fragments.sort_by(|a, b| a.package.cmp(&b.package));
    fragments
}

#[cfg(test)]
mod tests {
    use super::*;
    use veld_metadata::DeclarationKind;

    #[test]
    fn test_grouping_filters_dependency_declarations() {
        let declarations = vec![
            Declaration::source("pkg.b", "Beta", DeclarationKind::Class),
            Declaration::dependency("pkg.a", "Inherited", DeclarationKind::Class),
            Declaration::source("pkg.a", "Alpha", DeclarationKind::Function),
            Declaration::source("pkg.a", "gamma", DeclarationKind::Property),
        ];

        let fragments = group_into_fragments(&declarations);
        assert_eq!(fragments.len(), 2);
        // Deterministic package order.
        assert_eq!(fragments[0].package, "pkg.a");
        assert_eq!(fragments[1].package, "pkg.b");
        // The inherited declaration is gone.
        let names: Vec<&str> = fragments[0]
            .declarations
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(names, vec!["Alpha", "gamma"]);
    }

    #[test]
    fn test_no_source_declarations_means_no_fragments() {
        let declarations = vec![Declaration::dependency(
            "pkg.a",
            "Inherited",
            DeclarationKind::Class,
        )];
        assert!(group_into_fragments(&declarations).is_empty());
    }
}
