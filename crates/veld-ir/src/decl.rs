//! Resolved declaration tree

/// Logical identity of a declaration, unique within one compilation
/// session. Identities are handed out by the analysis phase; this crate
/// never invents them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(u32);

impl DeclId {
    /// Wrap a raw identity
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw identity value
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// The resolved intermediate representation of one module
#[derive(Debug, Clone)]
pub struct IrModule {
    /// Module name
    pub name: String,
    /// Top-level declarations
    pub declarations: Vec<IrDeclaration>,
}

impl IrModule {
    /// Create a module with the given top-level declarations
    pub fn new(name: impl Into<String>, declarations: Vec<IrDeclaration>) -> Self {
        Self {
            name: name.into(),
            declarations,
        }
    }
}

/// A class declaration with its constructors and nested members
#[derive(Debug, Clone)]
pub struct IrClass {
    pub id: DeclId,
    pub constructors: Vec<IrConstructor>,
    pub nested: Vec<IrDeclaration>,
}

/// A constructor declaration
#[derive(Debug, Clone)]
pub struct IrConstructor {
    pub id: DeclId,
}

/// One resolved declaration node.
///
/// The kind set is closed; the linker dispatches over it exhaustively so
/// a newly added kind fails to compile until its linking rule is written.
#[derive(Debug, Clone)]
pub enum IrDeclaration {
    Class(IrClass),
    Function { id: DeclId },
    Constructor(IrConstructor),
    Property { id: DeclId },
    EnumEntry { id: DeclId },
    TypeAlias { id: DeclId },
}

impl IrDeclaration {
    /// Identity of this declaration
    pub fn id(&self) -> DeclId {
        match self {
            IrDeclaration::Class(class) => class.id,
            IrDeclaration::Function { id } => *id,
            IrDeclaration::Constructor(ctor) => ctor.id,
            IrDeclaration::Property { id } => *id,
            IrDeclaration::EnumEntry { id } => *id,
            IrDeclaration::TypeAlias { id } => *id,
        }
    }
}
