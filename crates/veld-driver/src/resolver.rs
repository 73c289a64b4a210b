//! Module dependency resolution
//!
//! Scans the search path for library archives, builds one module
//! descriptor per archive, and wires every descriptor's dependency list
//! to itself plus all sibling modules. Metadata compilation treats all
//! dependency archives as mutually visible, so the cluster is flat; no
//! partial ordering is computed.

use crate::descriptor::{DescriptorError, ModuleDescriptor, ModuleId, ModuleOrigin};
use crate::provider::{CompositeFragmentProvider, FragmentProvider, LibraryFragmentProvider};
use once_cell::unsync::OnceCell;
use std::path::PathBuf;
use std::rc::Rc;
use thiserror::Error;
use veld_metadata::{ArchiveError, LibraryArchive};

/// Errors during dependency resolution
#[derive(Debug, Error)]
pub enum ResolveError {
    /// An archive on the search path could not be loaded.
    ///
    /// This aborts the whole resolution; a partial dependency graph is
    /// unsafe to proceed with.
    #[error("Failed to load library {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: ArchiveError,
    },

    /// Descriptor lifecycle violation
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
}

/// Resolves the search path into module descriptors, at most once per
/// session. Archive parsing is costly and several consumers may ask for
/// the resolved set, so the computation is lazy and memoized.
pub struct DependencyResolver {
    search_path: Vec<PathBuf>,
    resolved: OnceCell<ResolvedModules>,
}

impl DependencyResolver {
    /// Create a resolver over the given search path
    pub fn new(search_path: Vec<PathBuf>) -> Self {
        Self {
            search_path,
            resolved: OnceCell::new(),
        }
    }

    /// Resolve the search path, memoized.
    pub fn resolve(&self) -> Result<&ResolvedModules, ResolveError> {
        self.resolved.get_or_try_init(|| self.resolve_modules())
    }

    fn resolve_modules(&self) -> Result<ResolvedModules, ResolveError> {
        // Entries that don't look like archives are silently skipped;
        // mixed classpaths are expected.
        let archives: Vec<Rc<LibraryArchive>> = self
            .search_path
            .iter()
            .filter(|path| LibraryArchive::recognize(path))
            .map(|path| Rc::new(LibraryArchive::open(path.clone())))
            .collect();

        let mut descriptors = Vec::with_capacity(archives.len());
        for archive in &archives {
            let header = archive.header().map_err(|source| ResolveError::Archive {
                path: archive.path().to_path_buf(),
                source,
            })?;
            descriptors.push(
                ModuleDescriptor::new(
                    header.module_name.clone(),
                    ModuleOrigin::DeserializedFromLibrary,
                )
                .with_capability("library.path", archive.path().display().to_string()),
            );
        }

        // Every module depends on itself plus all siblings, self first.
        let count = descriptors.len();
        for (index, descriptor) in descriptors.iter().enumerate() {
            let mut dependencies = Vec::with_capacity(count);
            dependencies.push(ModuleId::new(index));
            dependencies.extend((0..count).filter(|i| *i != index).map(ModuleId::new));
            descriptor.set_dependencies(dependencies)?;
        }

        let providers = (0..count).map(|_| OnceCell::new()).collect();
        Ok(ResolvedModules {
            descriptors,
            archives,
            providers,
            composite: OnceCell::new(),
        })
    }
}

/// The session's resolved dependency modules
pub struct ResolvedModules {
    descriptors: Vec<ModuleDescriptor>,
    archives: Vec<Rc<LibraryArchive>>,
    providers: Vec<OnceCell<Rc<LibraryFragmentProvider>>>,
    composite: OnceCell<Rc<CompositeFragmentProvider>>,
}

impl ResolvedModules {
    /// All module descriptors, in search-path order
    pub fn descriptors(&self) -> &[ModuleDescriptor] {
        &self.descriptors
    }

    /// Descriptor for one module
    pub fn descriptor(&self, id: ModuleId) -> Option<&ModuleDescriptor> {
        self.descriptors.get(id.index())
    }

    /// Number of resolved modules
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether the search path yielded no archives
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Fragment provider for one module's archive, created lazily and
    /// shared across consumers
    pub fn fragment_provider(&self, id: ModuleId) -> Option<Rc<LibraryFragmentProvider>> {
        let cell = self.providers.get(id.index())?;
        let archive = self.archives.get(id.index())?;
        Some(Rc::clone(cell.get_or_init(|| {
            Rc::new(LibraryFragmentProvider::new(Rc::clone(archive)))
        })))
    }

    /// Composite provider over all resolved modules, built at most once
    pub fn composite_provider(&self) -> Rc<CompositeFragmentProvider> {
        Rc::clone(self.composite.get_or_init(|| {
            let providers = (0..self.descriptors.len())
                .filter_map(|index| self.fragment_provider(ModuleId::new(index)))
                .map(|p| p as Rc<dyn FragmentProvider>)
                .collect();
            Rc::new(CompositeFragmentProvider::new(providers))
        }))
    }
}
