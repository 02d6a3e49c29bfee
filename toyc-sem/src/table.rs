//! The two-level symbol table tree: one [`GlobalTable`] holding globals
//! and function signatures, with one child [`LocalTable`] per function
//! holding its parameters and locals. There is no block-level scoping
//! beyond the function boundary — this language has none.

use indexmap::IndexMap;
use toyc_util::Symbol;

use crate::symbol::{builtins, FunctionSymbol, VariableSymbol};

/// A function's parameters and locals, keyed by name.
#[derive(Debug, Default)]
pub struct LocalTable {
    pub variables: IndexMap<Symbol, VariableSymbol>,
}

impl LocalTable {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Global variables, every function signature, and the per-function
/// local tables, all keyed by name.
#[derive(Debug, Default)]
pub struct GlobalTable {
    pub variables: IndexMap<Symbol, VariableSymbol>,
    pub functions: IndexMap<Symbol, FunctionSymbol>,
    pub locals: IndexMap<Symbol, LocalTable>,
}

impl GlobalTable {
    /// A table pre-seeded with `input`, `print`, and `exit`, each with an
    /// empty (and in practice unused) local table, matching the spirit of
    /// every declared function getting one.
    pub fn with_builtins() -> Self {
        let mut table = Self::default();
        for sym in builtins() {
            table.locals.insert(sym.name, LocalTable::new());
            table.functions.insert(sym.name, sym);
        }
        table
    }
}
