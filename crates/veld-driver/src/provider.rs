//! Package fragment providers
//!
//! A provider answers "which declarations does package P have" for one
//! library archive, deserializing each fragment on first request and
//! caching it for the life of the provider. A composite provider layers
//! several libraries and returns the union of their contributions, since
//! multiple dependency archives may each contribute part of the same
//! package.

use rustc_hash::FxHashMap;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use veld_metadata::{ArchiveError, LibraryArchive, PackageFragment};

/// Lookup of declarations by package fragment name.
///
/// An empty result means the package is absent from this provider.
pub trait FragmentProvider {
    fn fragments_for(&self, package: &str) -> Result<Vec<Rc<PackageFragment>>, ArchiveError>;
}

/// Provider backed by a single library archive
pub struct LibraryFragmentProvider {
    archive: Rc<LibraryArchive>,
    cache: RefCell<FxHashMap<String, Rc<PackageFragment>>>,
    parses: Cell<usize>,
}

impl LibraryFragmentProvider {
    /// Create a provider over an archive; nothing is deserialized yet
    pub fn new(archive: Rc<LibraryArchive>) -> Self {
        Self {
            archive,
            cache: RefCell::new(FxHashMap::default()),
            parses: Cell::new(0),
        }
    }

    /// How many fragments have actually been parsed so far
    pub fn parse_count(&self) -> usize {
        self.parses.get()
    }
}

impl FragmentProvider for LibraryFragmentProvider {
    fn fragments_for(&self, package: &str) -> Result<Vec<Rc<PackageFragment>>, ArchiveError> {
        if let Some(cached) = self.cache.borrow().get(package) {
            return Ok(vec![Rc::clone(cached)]);
        }

        match self.archive.read_fragment(package)? {
            Some(fragment) => {
                self.parses.set(self.parses.get() + 1);
                let fragment = Rc::new(fragment);
                self.cache
                    .borrow_mut()
                    .insert(package.to_string(), Rc::clone(&fragment));
                Ok(vec![fragment])
            }
            None => Ok(Vec::new()),
        }
    }
}

/// Ordered composition of providers; all contributing libraries'
/// declarations for a package are visible simultaneously
pub struct CompositeFragmentProvider {
    providers: Vec<Rc<dyn FragmentProvider>>,
}

impl CompositeFragmentProvider {
    /// Compose an ordered list of providers
    pub fn new(providers: Vec<Rc<dyn FragmentProvider>>) -> Self {
        Self { providers }
    }

    /// Number of composed providers
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the composite is empty
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl FragmentProvider for CompositeFragmentProvider {
    fn fragments_for(&self, package: &str) -> Result<Vec<Rc<PackageFragment>>, ArchiveError> {
        let mut result = Vec::new();
        for provider in &self.providers {
            result.extend(provider.fragments_for(package)?);
        }
        Ok(result)
    }
}
