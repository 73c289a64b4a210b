//! Veld metadata compilation pipeline
//!
//! Ties the pieces together: discover dependency archives on the search
//! path, expose their declarations through fragment providers, hand the
//! resolved world to an analysis collaborator, and serialize the result
//! as a versioned library archive.

pub mod analysis;
pub mod config;
pub mod descriptor;
pub mod diagnostics;
pub mod provider;
pub mod resolver;
pub mod serialize;

pub use analysis::AnalysisResult;
pub use config::{CompilerConfig, LanguageVersion};
pub use descriptor::{DescriptorError, ModuleDescriptor, ModuleId, ModuleOrigin};
pub use diagnostics::{CollectingMessageSink, Message, MessageCollector, Severity};
pub use provider::{CompositeFragmentProvider, FragmentProvider, LibraryFragmentProvider};
pub use resolver::{DependencyResolver, ResolveError, ResolvedModules};
pub use serialize::{MetadataSerializer, SerializeError};

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the whole metadata pipeline
#[derive(Debug, Error)]
pub enum DriverError {
    /// Dependency resolution failed
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Serialization failed
    #[error(transparent)]
    Serialize(#[from] SerializeError),
}

/// Run the metadata compilation pipeline end to end.
///
/// Resolves the search path into dependency modules, runs the supplied
/// analysis over them, and serializes the result. Configuration problems
/// are reported through `sink` and yield `Ok(None)`; analysis errors also
/// yield `Ok(None)` since serialization is gated on a clean analysis.
/// Expect/actual linking is a separate pass (`veld_ir::link_expects`)
/// because its ordering relative to code generation is the caller's call.
pub fn compile_metadata<F>(
    config: &CompilerConfig,
    sink: &mut dyn MessageCollector,
    analyze: F,
) -> Result<Option<PathBuf>, DriverError>
where
    F: FnOnce(&ResolvedModules) -> AnalysisResult,
{
    // The destination is checked before any work happens, so a
    // misconfigured invocation costs nothing and reports exactly once.
    if config.destination.is_none() {
        sink.report(
            Severity::Error,
            "no destination directory specified for metadata output",
        );
        return Ok(None);
    }

    let resolver = DependencyResolver::new(config.search_path.clone());
    let resolved = resolver.resolve()?;
    let analysis = analyze(resolved);

    let serializer = MetadataSerializer::new(config);
    Ok(serializer.serialize(&analysis, sink)?)
}
