//! Abstract syntax tree produced by the parser.
//!
//! Every node carries the [`Span`] of the source text it came from, so
//! later phases can point diagnostics back at the user's program.

use std::fmt;

use toyc_lex::{BinOp, UnOp};
use toyc_util::{Span, Symbol};

/// The only type the language has today, spelled out explicitly so the
/// parser has something to validate `:` annotations against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Int,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "Int"),
        }
    }
}

/// An expression.
#[derive(Debug, Clone)]
pub enum Expr {
    Number {
        value: i64,
        span: Span,
    },
    Variable {
        name: Symbol,
        span: Span,
    },
    Unary {
        op: UnOp,
        operand: Box<Expr>,
        span: Span,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        span: Span,
    },
    /// A function call with named arguments, e.g. `add(x: 1, y: 2)`.
    Call {
        callee: Symbol,
        args: Vec<(Symbol, Expr)>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Number { span, .. }
            | Expr::Variable { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Call { span, .. } => *span,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number { value, .. } => write!(f, "{value}"),
            Expr::Variable { name, .. } => write!(f, "{name}"),
            Expr::Unary { op, operand, .. } => write!(f, "({} {})", op.as_str(), operand),
            Expr::Binary { op, lhs, rhs, .. } => {
                write!(f, "({}, {}, {})", op.as_str(), lhs, rhs)
            }
            Expr::Call { callee, args, .. } => {
                let joined = args
                    .iter()
                    .map(|(name, value)| format!("{name}:{value}"))
                    .collect::<Vec<_>>()
                    .join(" ");
                write!(f, "({} {})", callee, joined)
            }
        }
    }
}

/// A named, typed local or global variable declaration (no initializer:
/// assignment is a separate statement).
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub name: Symbol,
    pub ty: Type,
    pub span: Span,
}

impl fmt::Display for VarDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(var {}:{})", self.name, self.ty)
    }
}

/// A statement inside a function body.
#[derive(Debug, Clone)]
pub enum Stmt {
    Expr(Expr),
    Return {
        value: Expr,
        span: Span,
    },
    If {
        cond: Expr,
        then_block: Vec<Stmt>,
        else_block: Vec<Stmt>,
        span: Span,
    },
    While {
        cond: Expr,
        body: Vec<Stmt>,
        span: Span,
    },
    /// A no-op statement (`pass`). Carries no effect through codegen;
    /// exists so a branch can be syntactically required without giving
    /// it real content.
    Pass {
        span: Span,
    },
    /// A bare nested `{ statement* }` block appearing anywhere a
    /// statement is expected (not just as an `if`/`while` body).
    Block {
        stmts: Vec<Stmt>,
        span: Span,
    },
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Expr(e) => write!(f, "{e}"),
            Stmt::Return { value, .. } => write!(f, "(return {value})"),
            Stmt::If {
                cond,
                then_block,
                else_block,
                ..
            } => {
                let then_str = then_block
                    .iter()
                    .map(|s| s.to_string())
                    .collect::<Vec<_>>()
                    .join(" ");
                let else_str = else_block
                    .iter()
                    .map(|s| s.to_string())
                    .collect::<Vec<_>>()
                    .join(" ");
                write!(f, "(if {cond} {then_str} {else_str})")
            }
            Stmt::While { cond, body, .. } => {
                let body_str = body.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(" ");
                write!(f, "(while {cond} {body_str})")
            }
            Stmt::Pass { .. } => write!(f, "(pass)"),
            Stmt::Block { stmts, .. } => {
                let inner = stmts.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(" ");
                write!(f, "({inner})")
            }
        }
    }
}

/// A function parameter: name, type, and source position.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: Symbol,
    pub ty: Type,
    pub span: Span,
}

/// The local variable declarations plus executable statements that make
/// up a function's body.
#[derive(Debug, Clone)]
pub struct FuncBody {
    pub locals: Vec<VarDecl>,
    pub stmts: Vec<Stmt>,
}

impl fmt::Display for FuncBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let locals = self.locals.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" ");
        let stmts = self.stmts.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(" ");
        write!(f, "({locals} {stmts})")
    }
}

/// A top-level function declaration.
#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub name: Symbol,
    pub params: Vec<Param>,
    pub return_ty: Type,
    pub body: FuncBody,
    pub span: Span,
}

impl fmt::Display for FuncDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self
            .params
            .iter()
            .map(|p| format!("{}:{}", p.name, p.ty))
            .collect::<Vec<_>>()
            .join(" ");
        write!(f, "({}({})->{} {})", self.name, params, self.return_ty, self.body)
    }
}

/// A whole compilation unit: global variable declarations followed by
/// function declarations.
#[derive(Debug, Clone)]
pub struct Program {
    pub globals: Vec<VarDecl>,
    pub functions: Vec<FuncDecl>,
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let globals = self.globals.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" ");
        let functions = self
            .functions
            .iter()
            .map(|fd| fd.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        write!(f, "({globals} {functions})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toyc_util::FileId;

    fn dummy_span() -> Span {
        Span::point(0, 1, 1, FileId(0))
    }

    #[test]
    fn binary_expr_prints_as_prefix_triple() {
        let e = Expr::Binary {
            op: BinOp::Add,
            lhs: Box::new(Expr::Number {
                value: 1,
                span: dummy_span(),
            }),
            rhs: Box::new(Expr::Number {
                value: 2,
                span: dummy_span(),
            }),
            span: dummy_span(),
        };
        assert_eq!(e.to_string(), "(+, 1, 2)");
    }

    #[test]
    fn var_decl_prints_name_and_type() {
        let v = VarDecl {
            name: Symbol::intern("count"),
            ty: Type::Int,
            span: dummy_span(),
        };
        assert_eq!(v.to_string(), "(var count:Int)");
    }
}
