//! Veld Intermediate Representation
//!
//! The resolved declaration tree handed over by analysis, the session
//! symbol table, and the pass that links "actual" declarations back to
//! their cross-module "expect" placeholders.

pub mod decl;
pub mod link;
pub mod symbol;

pub use decl::{DeclId, IrClass, IrConstructor, IrDeclaration, IrModule};
pub use link::{link_expects, ExpectProvider, ExpectSymbolMap, ExpectTarget, LinkError};
pub use symbol::{Symbol, SymbolKind, SymbolTable};
