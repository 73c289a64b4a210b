//! Module descriptors
//!
//! A descriptor is the in-memory identity of one compilation unit: its
//! name, where it came from, opaque capability slots, and a dependency
//! list that is set exactly once. Descriptors reference each other by
//! `ModuleId` within the session's resolved set, which keeps the flat
//! dependency cluster representable without reference cycles.

use once_cell::unsync::OnceCell;
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Index of a descriptor within the session's resolved module set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleId(usize);

impl ModuleId {
    /// Wrap a raw index
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Raw index value
    pub fn index(self) -> usize {
        self.0
    }
}

/// How a module entered the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleOrigin {
    /// Compiled from current sources
    Source,
    /// Loaded back from a library archive
    DeserializedFromLibrary,
}

/// Errors in descriptor lifecycle handling
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// Dependencies were set a second time
    #[error("Dependencies of module '{0}' have already been set")]
    DependenciesAlreadySet(String),

    /// Dependencies were read before being set
    #[error("Dependencies of module '{0}' have not been set yet")]
    DependenciesNotSet(String),
}

/// In-memory representation of one compilation unit
#[derive(Debug)]
pub struct ModuleDescriptor {
    name: String,
    origin: ModuleOrigin,
    capabilities: FxHashMap<&'static str, String>,
    dependencies: OnceCell<Vec<ModuleId>>,
}

impl ModuleDescriptor {
    /// Create a descriptor with no dependencies set yet
    pub fn new(name: impl Into<String>, origin: ModuleOrigin) -> Self {
        Self {
            name: name.into(),
            origin,
            capabilities: FxHashMap::default(),
            dependencies: OnceCell::new(),
        }
    }

    /// Attach an opaque capability slot
    pub fn with_capability(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.capabilities.insert(key, value.into());
        self
    }

    /// Module name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where the module came from
    pub fn origin(&self) -> ModuleOrigin {
        self.origin
    }

    /// Read a capability slot
    pub fn capability(&self, key: &str) -> Option<&str> {
        self.capabilities.get(key).map(String::as_str)
    }

    /// Set the dependency list, once.
    ///
    /// The resolution contract requires the list to contain the module
    /// itself; callers construct it that way and this descriptor keeps it
    /// immutable afterwards.
    pub fn set_dependencies(&self, dependencies: Vec<ModuleId>) -> Result<(), DescriptorError> {
        self.dependencies
            .set(dependencies)
            .map_err(|_| DescriptorError::DependenciesAlreadySet(self.name.clone()))
    }

    /// The dependency list, including the module itself
    pub fn dependencies(&self) -> Result<&[ModuleId], DescriptorError> {
        self.dependencies
            .get()
            .map(Vec::as_slice)
            .ok_or_else(|| DescriptorError::DependenciesNotSet(self.name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependencies_set_exactly_once() {
        let descriptor = ModuleDescriptor::new("lib-a", ModuleOrigin::DeserializedFromLibrary);
        assert!(matches!(
            descriptor.dependencies(),
            Err(DescriptorError::DependenciesNotSet(_))
        ));

        descriptor
            .set_dependencies(vec![ModuleId::new(0), ModuleId::new(1)])
            .unwrap();
        assert_eq!(descriptor.dependencies().unwrap().len(), 2);

        let again = descriptor.set_dependencies(vec![ModuleId::new(0)]);
        assert!(matches!(
            again,
            Err(DescriptorError::DependenciesAlreadySet(_))
        ));
        // The original list is untouched.
        assert_eq!(descriptor.dependencies().unwrap().len(), 2);
    }

    #[test]
    fn test_capabilities() {
        let descriptor = ModuleDescriptor::new("lib-a", ModuleOrigin::Source)
            .with_capability("library.path", "/deps/lib-a.vlib");
        assert_eq!(
            descriptor.capability("library.path"),
            Some("/deps/lib-a.vlib")
        );
        assert_eq!(descriptor.capability("unknown"), None);
    }
}
