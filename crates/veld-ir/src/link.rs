//! Expect/actual symbol linking
//!
//! IR nodes carry no back-link from an actual declaration to the expect
//! it implements, and analysis never materializes one. This pass walks
//! the current module's resolved tree and manufactures forward-reference
//! symbols for every expect whose concrete implementation lives here, so
//! that code generation can refer to expects that were declared in a
//! different module.

use crate::decl::{DeclId, IrClass, IrConstructor, IrDeclaration, IrModule};
use crate::symbol::{Symbol, SymbolKind, SymbolTable};
use rustc_hash::FxHashMap;
use thiserror::Error;
use veld_metadata::DeclarationKind;

/// Errors raised when an analysis-phase invariant turns out broken.
///
/// These are internal consistency violations: callers abort the session
/// rather than report-and-continue.
#[derive(Debug, Error)]
pub enum LinkError {
    /// An identity was referenced with two different symbol shapes
    #[error(
        "Internal error: declaration {decl:?} already bound as {bound:?}, re-referenced as {requested:?}"
    )]
    SymbolKindMismatch {
        decl: DeclId,
        bound: SymbolKind,
        requested: SymbolKind,
    },

    /// An actual declaration was matched with an expect of a shape the
    /// linking rules do not admit
    #[error(
        "Internal error: actual {actual_kind:?} declaration {actual:?} cannot satisfy expect {expect:?} of kind {expect_kind:?}"
    )]
    UnexpectedExpectShape {
        actual: DeclId,
        actual_kind: DeclarationKind,
        expect: DeclId,
        expect_kind: DeclarationKind,
    },
}

/// One expect declaration satisfied by an actual, as reported by analysis.
///
/// `constructors` is populated only for class-shaped expects.
#[derive(Debug, Clone)]
pub struct ExpectTarget {
    pub id: DeclId,
    pub kind: DeclarationKind,
    pub constructors: Vec<DeclId>,
}

impl ExpectTarget {
    /// An expect of the given kind with no constructors
    pub fn new(id: DeclId, kind: DeclarationKind) -> Self {
        Self {
            id,
            kind,
            constructors: Vec::new(),
        }
    }

    /// A class-shaped expect with the given constructors
    pub fn class_with_constructors(id: DeclId, constructors: Vec<DeclId>) -> Self {
        Self {
            id,
            kind: DeclarationKind::Class,
            constructors,
        }
    }
}

/// Analysis collaborator that answers which expects an actual satisfies.
///
/// A declaration may satisfy zero, one, or several expects, possibly of
/// a different kind than itself.
pub trait ExpectProvider {
    fn expects_of(&self, actual: DeclId) -> Vec<ExpectTarget>;
}

/// The externally-owned accumulator mapping each expect identity to the
/// symbol code generation should use for it
pub type ExpectSymbolMap = FxHashMap<DeclId, Symbol>;

/// Walk the module and record a symbol for every expect that an actual
/// declaration in this module satisfies.
///
/// Insertion is insert-if-absent: an expect identity that is already
/// mapped keeps its first symbol.
pub fn link_expects(
    module: &IrModule,
    provider: &dyn ExpectProvider,
    symbols: &mut SymbolTable,
    map: &mut ExpectSymbolMap,
) -> Result<(), LinkError> {
    for declaration in &module.declarations {
        link_declaration(declaration, provider, symbols, map)?;
    }
    Ok(())
}

fn link_declaration(
    declaration: &IrDeclaration,
    provider: &dyn ExpectProvider,
    symbols: &mut SymbolTable,
    map: &mut ExpectSymbolMap,
) -> Result<(), LinkError> {
    match declaration {
        IrDeclaration::Class(class) => link_class(class, provider, symbols, map),
        IrDeclaration::Function { id } => {
            for expect in provider.expects_of(*id) {
                expect_kind_check(*id, DeclarationKind::Function, &expect)?;
                let symbol = symbols.reference_function(expect.id)?;
                record(map, expect.id, symbol);
            }
            Ok(())
        }
        IrDeclaration::Constructor(ctor) => link_constructor(ctor, provider, symbols, map),
        IrDeclaration::Property { id } => {
            for expect in provider.expects_of(*id) {
                expect_kind_check(*id, DeclarationKind::Property, &expect)?;
                let symbol = symbols.reference_property(expect.id)?;
                record(map, expect.id, symbol);
            }
            Ok(())
        }
        // Enum entries are class-like: the expect side is an enum entry
        // too, but the reference it gets is a class symbol.
        IrDeclaration::EnumEntry { id } => {
            for expect in provider.expects_of(*id) {
                if expect.kind != DeclarationKind::EnumEntry {
                    return Err(shape_error(*id, DeclarationKind::EnumEntry, &expect));
                }
                let symbol = symbols.reference_class(expect.id)?;
                record(map, expect.id, symbol);
            }
            Ok(())
        }
        // A type alias may only actualize a class-shaped expect; anything
        // else means analysis let an invalid actualization through.
        IrDeclaration::TypeAlias { id } => {
            for expect in provider.expects_of(*id) {
                if expect.kind != DeclarationKind::Class {
                    return Err(shape_error(*id, DeclarationKind::TypeAlias, &expect));
                }
                let symbol = symbols.reference_class(expect.id)?;
                record(map, expect.id, symbol);
            }
            Ok(())
        }
    }
}

fn link_class(
    class: &IrClass,
    provider: &dyn ExpectProvider,
    symbols: &mut SymbolTable,
    map: &mut ExpectSymbolMap,
) -> Result<(), LinkError> {
    for expect in provider.expects_of(class.id) {
        expect_kind_check(class.id, DeclarationKind::Class, &expect)?;
        let symbol = symbols.reference_class(expect.id)?;
        record(map, expect.id, symbol);
        // Constructors of the expect class are linked independently of
        // the class itself.
        for ctor in &expect.constructors {
            let ctor_symbol = symbols.reference_constructor(*ctor)?;
            record(map, *ctor, ctor_symbol);
        }
    }
    for ctor in &class.constructors {
        link_constructor(ctor, provider, symbols, map)?;
    }
    for nested in &class.nested {
        link_declaration(nested, provider, symbols, map)?;
    }
    Ok(())
}

fn link_constructor(
    ctor: &IrConstructor,
    provider: &dyn ExpectProvider,
    symbols: &mut SymbolTable,
    map: &mut ExpectSymbolMap,
) -> Result<(), LinkError> {
    for expect in provider.expects_of(ctor.id) {
        expect_kind_check(ctor.id, DeclarationKind::Constructor, &expect)?;
        let symbol = symbols.reference_constructor(expect.id)?;
        record(map, expect.id, symbol);
    }
    Ok(())
}

fn expect_kind_check(
    actual: DeclId,
    actual_kind: DeclarationKind,
    expect: &ExpectTarget,
) -> Result<(), LinkError> {
    if expect.kind != actual_kind {
        return Err(shape_error(actual, actual_kind, expect));
    }
    Ok(())
}

fn shape_error(actual: DeclId, actual_kind: DeclarationKind, expect: &ExpectTarget) -> LinkError {
    LinkError::UnexpectedExpectShape {
        actual,
        actual_kind,
        expect: expect.id,
        expect_kind: expect.kind,
    }
}

fn record(map: &mut ExpectSymbolMap, expect: DeclId, symbol: Symbol) {
    map.entry(expect).or_insert(symbol);
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test provider backed by a plain map
    #[derive(Default)]
    struct MapProvider {
        expects: FxHashMap<DeclId, Vec<ExpectTarget>>,
    }

    impl MapProvider {
        fn add(&mut self, actual: DeclId, target: ExpectTarget) {
            self.expects.entry(actual).or_default().push(target);
        }
    }

    impl ExpectProvider for MapProvider {
        fn expects_of(&self, actual: DeclId) -> Vec<ExpectTarget> {
            self.expects.get(&actual).cloned().unwrap_or_default()
        }
    }

    fn link(
        module: &IrModule,
        provider: &MapProvider,
    ) -> Result<(SymbolTable, ExpectSymbolMap), LinkError> {
        let mut symbols = SymbolTable::new();
        let mut map = ExpectSymbolMap::default();
        link_expects(module, provider, &mut symbols, &mut map)?;
        Ok((symbols, map))
    }

    #[test]
    fn test_function_actual_links_its_expect() {
        let actual = DeclId::new(1);
        let expect = DeclId::new(100);

        let mut provider = MapProvider::default();
        provider.add(actual, ExpectTarget::new(expect, DeclarationKind::Function));

        let module = IrModule::new("platform", vec![IrDeclaration::Function { id: actual }]);
        let (symbols, map) = link(&module, &provider).unwrap();

        assert_eq!(map.len(), 1);
        let symbol = map[&expect];
        assert_eq!(symbol.kind(), SymbolKind::Function);
        assert_eq!(symbols.get(expect), Some(symbol));
    }

    #[test]
    fn test_declaration_with_no_expects_links_nothing() {
        let module = IrModule::new(
            "platform",
            vec![IrDeclaration::Function { id: DeclId::new(1) }],
        );
        let (symbols, map) = link(&module, &MapProvider::default()).unwrap();
        assert!(map.is_empty());
        assert!(symbols.is_empty());
    }

    #[test]
    fn test_class_actual_links_class_and_expect_constructors() {
        let expect_class = DeclId::new(100);
        let expect_ctor = DeclId::new(101);
        let actual_class = DeclId::new(1);
        let actual_ctor_a = DeclId::new(2);
        let actual_ctor_b = DeclId::new(3);

        let mut provider = MapProvider::default();
        provider.add(
            actual_class,
            ExpectTarget::class_with_constructors(expect_class, vec![expect_ctor]),
        );
        // Each actual constructor resolves to its expect counterpart.
        provider.add(
            actual_ctor_a,
            ExpectTarget::new(expect_ctor, DeclarationKind::Constructor),
        );
        provider.add(
            actual_ctor_b,
            ExpectTarget::new(expect_ctor, DeclarationKind::Constructor),
        );

        let module = IrModule::new(
            "platform",
            vec![IrDeclaration::Class(IrClass {
                id: actual_class,
                constructors: vec![
                    IrConstructor { id: actual_ctor_a },
                    IrConstructor { id: actual_ctor_b },
                ],
                nested: vec![],
            })],
        );

        let (symbols, map) = link(&module, &provider).unwrap();

        assert_eq!(map[&expect_class].kind(), SymbolKind::Class);
        assert_eq!(map[&expect_ctor].kind(), SymbolKind::Constructor);
        assert_eq!(map.len(), 2);
        // Both constructor traversals reuse the single bound symbol.
        assert_eq!(symbols.len(), 2);
    }

    #[test]
    fn test_nested_declarations_are_visited() {
        let expect_fn = DeclId::new(100);
        let nested_fn = DeclId::new(5);

        let mut provider = MapProvider::default();
        provider.add(nested_fn, ExpectTarget::new(expect_fn, DeclarationKind::Function));

        let module = IrModule::new(
            "platform",
            vec![IrDeclaration::Class(IrClass {
                id: DeclId::new(1),
                constructors: vec![],
                nested: vec![IrDeclaration::Function { id: nested_fn }],
            })],
        );

        let (_, map) = link(&module, &provider).unwrap();
        assert_eq!(map.len(), 1);
        assert!(map.contains_key(&expect_fn));
    }

    #[test]
    fn test_property_and_enum_entry_mapping() {
        let expect_prop = DeclId::new(100);
        let expect_entry = DeclId::new(101);

        let mut provider = MapProvider::default();
        provider.add(
            DeclId::new(1),
            ExpectTarget::new(expect_prop, DeclarationKind::Property),
        );
        provider.add(
            DeclId::new(2),
            ExpectTarget::new(expect_entry, DeclarationKind::EnumEntry),
        );

        let module = IrModule::new(
            "platform",
            vec![
                IrDeclaration::Property { id: DeclId::new(1) },
                IrDeclaration::EnumEntry { id: DeclId::new(2) },
            ],
        );

        let (_, map) = link(&module, &provider).unwrap();
        assert_eq!(map[&expect_prop].kind(), SymbolKind::Property);
        // Enum entries take class symbols.
        assert_eq!(map[&expect_entry].kind(), SymbolKind::Class);
    }

    #[test]
    fn test_type_alias_actual_for_expect_class() {
        let expect_class = DeclId::new(100);
        let alias = DeclId::new(1);

        let mut provider = MapProvider::default();
        provider.add(alias, ExpectTarget::new(expect_class, DeclarationKind::Class));

        let module = IrModule::new("platform", vec![IrDeclaration::TypeAlias { id: alias }]);
        let (_, map) = link(&module, &provider).unwrap();
        assert_eq!(map[&expect_class].kind(), SymbolKind::Class);
    }

    #[test]
    fn test_type_alias_actual_for_non_class_expect_is_fatal() {
        let expect_fn = DeclId::new(100);
        let alias = DeclId::new(1);

        let mut provider = MapProvider::default();
        provider.add(alias, ExpectTarget::new(expect_fn, DeclarationKind::Function));

        let module = IrModule::new("platform", vec![IrDeclaration::TypeAlias { id: alias }]);
        let result = link(&module, &provider);
        assert!(matches!(
            result,
            Err(LinkError::UnexpectedExpectShape { .. })
        ));
    }

    #[test]
    fn test_relinking_same_expect_keeps_first_symbol() {
        let expect_fn = DeclId::new(100);
        let actual_a = DeclId::new(1);
        let actual_b = DeclId::new(2);

        let mut provider = MapProvider::default();
        provider.add(actual_a, ExpectTarget::new(expect_fn, DeclarationKind::Function));
        provider.add(actual_b, ExpectTarget::new(expect_fn, DeclarationKind::Function));

        let module = IrModule::new(
            "platform",
            vec![
                IrDeclaration::Function { id: actual_a },
                IrDeclaration::Function { id: actual_b },
            ],
        );

        let (symbols, map) = link(&module, &provider).unwrap();
        // One entry, bound once; the second traversal saw the same symbol.
        assert_eq!(map.len(), 1);
        assert_eq!(symbols.len(), 1);
        assert_eq!(map[&expect_fn], symbols.get(expect_fn).unwrap());
    }

    #[test]
    fn test_actual_satisfying_several_expects() {
        let expect_a = DeclId::new(100);
        let expect_b = DeclId::new(101);
        let actual = DeclId::new(1);

        let mut provider = MapProvider::default();
        provider.add(actual, ExpectTarget::new(expect_a, DeclarationKind::Function));
        provider.add(actual, ExpectTarget::new(expect_b, DeclarationKind::Function));

        let module = IrModule::new("platform", vec![IrDeclaration::Function { id: actual }]);
        let (_, map) = link(&module, &provider).unwrap();
        assert_eq!(map.len(), 2);
        assert!(map.contains_key(&expect_a));
        assert!(map.contains_key(&expect_b));
    }
}
