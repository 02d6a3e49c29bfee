//! Symbol kinds tracked by the [`crate::table::GlobalTable`] /
//! [`crate::table::LocalTable`] tree.

use toyc_par::Type;
use toyc_util::{Span, Symbol};

/// A variable binding: a global or a function parameter/local.
///
/// `position` starts `None` and is filled in by the code generator: a
/// global's data-segment index, or a local's/parameter's frame offset
/// relative to `rbp`.
#[derive(Debug, Clone)]
pub struct VariableSymbol {
    pub name: Symbol,
    pub ty: Type,
    pub is_global: bool,
    pub span: Span,
    pub referenced: u32,
    pub position: Option<i64>,
}

impl VariableSymbol {
    pub fn new(name: Symbol, ty: Type, is_global: bool, span: Span) -> Self {
        Self {
            name,
            ty,
            is_global,
            span,
            referenced: 0,
            position: None,
        }
    }
}

/// A function binding: its sorted parameter list and return type.
///
/// `position` starts `None` and is filled in by the code generator with
/// the function's text-segment entry point; builtins never get one —
/// the linker rewrites their call sites to a pseudo-instruction instead.
#[derive(Debug, Clone)]
pub struct FunctionSymbol {
    pub name: Symbol,
    pub params: Vec<(Symbol, Type)>,
    pub return_ty: Type,
    pub span: Span,
    pub referenced: u32,
    pub is_builtin: bool,
    pub position: Option<usize>,
}

impl FunctionSymbol {
    pub fn new(name: Symbol, params: Vec<(Symbol, Type)>, return_ty: Type, span: Span) -> Self {
        Self {
            name,
            params,
            return_ty,
            span,
            referenced: 0,
            is_builtin: false,
            position: None,
        }
    }

    fn builtin(name: &str, params: Vec<(Symbol, Type)>, return_ty: Type) -> Self {
        Self {
            name: Symbol::intern(name),
            params,
            return_ty,
            span: Span::DUMMY,
            referenced: 0,
            is_builtin: true,
            position: None,
        }
    }
}

/// The three builtins every global table is pre-populated with:
/// `input() : Int`, `print(val: Int) : Int`, `exit() : Int`.
pub fn builtins() -> Vec<FunctionSymbol> {
    vec![
        FunctionSymbol::builtin("input", Vec::new(), Type::Int),
        FunctionSymbol::builtin("print", vec![(Symbol::intern("val"), Type::Int)], Type::Int),
        FunctionSymbol::builtin("exit", Vec::new(), Type::Int),
    ]
}
