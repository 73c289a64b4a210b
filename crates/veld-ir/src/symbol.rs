//! Session symbol table
//!
//! Binds a declaration identity to an opaque symbol handle exactly once.
//! The table never owns semantic data; it only hands out references that
//! later phases (serializer, code generator) use to name declarations
//! without re-resolving them.

use crate::decl::DeclId;
use crate::link::LinkError;
use rustc_hash::FxHashMap;

/// Shape of a referenced symbol.
///
/// Enum entries are class-like in this model, so they take `Class`
/// symbols rather than a kind of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Class,
    Function,
    Constructor,
    Property,
}

/// Opaque reference to a declaration, valid for the current session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol {
    id: u32,
    kind: SymbolKind,
}

impl Symbol {
    /// Session-unique symbol number
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Shape of the referenced declaration
    pub fn kind(&self) -> SymbolKind {
        self.kind
    }
}

/// Registry mapping declaration identities to symbols.
///
/// Mutation discipline is insert-if-absent: referencing the same identity
/// again returns the existing symbol, which makes repeated traversal of
/// the same expect from multiple actual sites safe.
#[derive(Debug, Default)]
pub struct SymbolTable {
    entries: FxHashMap<DeclId, Symbol>,
    next_id: u32,
}

impl SymbolTable {
    /// Create an empty symbol table
    pub fn new() -> Self {
        Self::default()
    }

    /// Reference a class-shaped declaration
    pub fn reference_class(&mut self, decl: DeclId) -> Result<Symbol, LinkError> {
        self.reference(decl, SymbolKind::Class)
    }

    /// Reference a function declaration
    pub fn reference_function(&mut self, decl: DeclId) -> Result<Symbol, LinkError> {
        self.reference(decl, SymbolKind::Function)
    }

    /// Reference a constructor declaration
    pub fn reference_constructor(&mut self, decl: DeclId) -> Result<Symbol, LinkError> {
        self.reference(decl, SymbolKind::Constructor)
    }

    /// Reference a property declaration
    pub fn reference_property(&mut self, decl: DeclId) -> Result<Symbol, LinkError> {
        self.reference(decl, SymbolKind::Property)
    }

    /// Look up the symbol already bound to an identity, if any
    pub fn get(&self, decl: DeclId) -> Option<Symbol> {
        self.entries.get(&decl).copied()
    }

    /// Number of bound symbols
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn reference(&mut self, decl: DeclId, kind: SymbolKind) -> Result<Symbol, LinkError> {
        if let Some(existing) = self.entries.get(&decl) {
            if existing.kind != kind {
                return Err(LinkError::SymbolKindMismatch {
                    decl,
                    bound: existing.kind,
                    requested: kind,
                });
            }
            return Ok(*existing);
        }

        let symbol = Symbol {
            id: self.next_id,
            kind,
        };
        self.next_id += 1;
        self.entries.insert(decl, symbol);
        Ok(symbol)
    }
}
