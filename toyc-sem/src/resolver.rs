//! Two-pass symbol resolution: function hoisting, then full resolution.
//!
//! Pass 1 walks only the top-level function declarations so that forward
//! calls (a function calling one declared later in the file) resolve
//! correctly; pass 2 walks the whole program, including expressions.

use toyc_par::{Expr, FuncDecl, Program, Stmt, VarDecl};
use toyc_util::diagnostic::DiagnosticCode;
use toyc_util::{Handler, Span, Symbol};

use crate::symbol::{FunctionSymbol, VariableSymbol};
use crate::table::{GlobalTable, LocalTable};

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("function {name} is already defined")]
    FunctionRedefinition { name: Symbol, span: Span },
    #[error("variable {name} is already defined in this scope")]
    VariableRedefinition { name: Symbol, span: Span },
    #[error("undefined variable {name}")]
    UndefinedVariable { name: Symbol, span: Span },
    #[error("undefined function {name}")]
    UndefinedFunction { name: Symbol, span: Span },
    #[error("{callee} expects {expected} argument(s), found {found}")]
    ArityMismatch {
        callee: Symbol,
        expected: usize,
        found: usize,
        span: Span,
    },
    #[error("{callee} has no parameter named {name}")]
    UnknownArgument {
        callee: Symbol,
        name: Symbol,
        span: Span,
    },
}

impl ResolveError {
    pub fn span(&self) -> Span {
        match self {
            ResolveError::FunctionRedefinition { span, .. }
            | ResolveError::VariableRedefinition { span, .. }
            | ResolveError::UndefinedVariable { span, .. }
            | ResolveError::UndefinedFunction { span, .. }
            | ResolveError::ArityMismatch { span, .. }
            | ResolveError::UnknownArgument { span, .. } => *span,
        }
    }
}

/// Lexicographic order by the symbol's *string*, not its intern id —
/// intern order reflects first-use order, which is not what "sorted by
/// name" means here.
fn by_name(a: Symbol, b: Symbol) -> std::cmp::Ordering {
    a.as_str().cmp(b.as_str())
}

pub struct Resolver;

impl Resolver {
    /// Runs both passes over `program`, mutating it in place (sorting
    /// parameter and call-argument lists) and returning the populated
    /// [`GlobalTable`]. Stops at the first hard error; unused-variable and
    /// unused-function findings are reported as warnings via `handler`
    /// and never block resolution.
    pub fn resolve(program: &mut Program, handler: &mut Handler) -> Result<GlobalTable, ResolveError> {
        let mut globals = GlobalTable::with_builtins();
        Self::hoist_functions(program, &mut globals)?;
        Self::resolve_globals(program, &mut globals)?;
        for func in &mut program.functions {
            Self::resolve_function(func, &mut globals)?;
        }
        Self::report_unused(&globals, handler);
        Ok(globals)
    }

    /// Pass 1: register every function's signature (with its parameter
    /// list sorted lexicographically by name) before anything is
    /// resolved, so forward references and keyword-style call sites both
    /// work.
    fn hoist_functions(program: &mut Program, globals: &mut GlobalTable) -> Result<(), ResolveError> {
        for func in &mut program.functions {
            tracing::trace!(name = %func.name, "hoisting function");
            if let Some(existing) = globals.functions.get(&func.name) {
                return Err(ResolveError::FunctionRedefinition {
                    name: func.name,
                    span: existing.span,
                });
            }
            func.params.sort_by(|a, b| by_name(a.name, b.name));
            let params = func.params.iter().map(|p| (p.name, p.ty)).collect();
            let symbol = FunctionSymbol::new(func.name, params, func.return_ty, func.span);
            globals.functions.insert(func.name, symbol);
            globals.locals.insert(func.name, LocalTable::new());
        }
        Ok(())
    }

    fn resolve_globals(program: &Program, globals: &mut GlobalTable) -> Result<(), ResolveError> {
        for decl in &program.globals {
            Self::declare_variable(&mut globals.variables, decl, true)?;
        }
        Ok(())
    }

    fn declare_variable(
        table: &mut indexmap::IndexMap<Symbol, VariableSymbol>,
        decl: &VarDecl,
        is_global: bool,
    ) -> Result<(), ResolveError> {
        if let Some(existing) = table.get(&decl.name) {
            return Err(ResolveError::VariableRedefinition {
                name: decl.name,
                span: existing.span,
            });
        }
        table.insert(
            decl.name,
            VariableSymbol::new(decl.name, decl.ty, is_global, decl.span),
        );
        Ok(())
    }

    fn resolve_function(func: &mut FuncDecl, globals: &mut GlobalTable) -> Result<(), ResolveError> {
        tracing::debug!(name = %func.name, "resolving function");
        let mut locals = std::mem::take(globals.locals.get_mut(&func.name).expect("hoisted in pass 1"));
        for param in &func.params {
            Self::declare_variable(
                &mut locals.variables,
                &VarDecl {
                    name: param.name,
                    ty: param.ty,
                    span: param.span,
                },
                false,
            )?;
        }
        for decl in &func.body.locals {
            Self::declare_variable(&mut locals.variables, decl, false)?;
        }
        for stmt in &mut func.body.stmts {
            Self::resolve_stmt(stmt, globals, &mut locals)?;
        }
        globals.locals.insert(func.name, locals);
        Ok(())
    }

    fn resolve_stmt(
        stmt: &mut Stmt,
        globals: &mut GlobalTable,
        locals: &mut LocalTable,
    ) -> Result<(), ResolveError> {
        match stmt {
            Stmt::Expr(expr) => Self::resolve_expr(expr, globals, locals),
            Stmt::Return { value, .. } => Self::resolve_expr(value, globals, locals),
            Stmt::If {
                cond,
                then_block,
                else_block,
                ..
            } => {
                Self::resolve_expr(cond, globals, locals)?;
                for s in then_block {
                    Self::resolve_stmt(s, globals, locals)?;
                }
                for s in else_block {
                    Self::resolve_stmt(s, globals, locals)?;
                }
                Ok(())
            }
            Stmt::While { cond, body, .. } => {
                Self::resolve_expr(cond, globals, locals)?;
                for s in body {
                    Self::resolve_stmt(s, globals, locals)?;
                }
                Ok(())
            }
            Stmt::Pass { .. } => Ok(()),
            Stmt::Block { stmts, .. } => {
                for s in stmts {
                    Self::resolve_stmt(s, globals, locals)?;
                }
                Ok(())
            }
        }
    }

    fn resolve_expr(expr: &mut Expr, globals: &mut GlobalTable, locals: &mut LocalTable) -> Result<(), ResolveError> {
        match expr {
            Expr::Number { .. } => Ok(()),
            Expr::Variable { name, span } => Self::resolve_variable(*name, *span, globals, locals),
            Expr::Unary { operand, .. } => Self::resolve_expr(operand, globals, locals),
            Expr::Binary { lhs, rhs, .. } => {
                Self::resolve_expr(lhs, globals, locals)?;
                Self::resolve_expr(rhs, globals, locals)
            }
            Expr::Call { callee, args, span } => Self::resolve_call(*callee, args, *span, globals, locals),
        }
    }

    fn resolve_variable(
        name: Symbol,
        span: Span,
        globals: &mut GlobalTable,
        locals: &mut LocalTable,
    ) -> Result<(), ResolveError> {
        if let Some(sym) = locals.variables.get_mut(&name) {
            sym.referenced += 1;
            return Ok(());
        }
        if let Some(sym) = globals.variables.get_mut(&name) {
            sym.referenced += 1;
            return Ok(());
        }
        Err(ResolveError::UndefinedVariable { name, span })
    }

    fn resolve_call(
        callee: Symbol,
        args: &mut Vec<(Symbol, Expr)>,
        span: Span,
        globals: &mut GlobalTable,
        locals: &mut LocalTable,
    ) -> Result<(), ResolveError> {
        for (_, value) in args.iter_mut() {
            Self::resolve_expr(value, globals, locals)?;
        }
        args.sort_by(|a, b| by_name(a.0, b.0));

        let func = globals
            .functions
            .get_mut(&callee)
            .ok_or(ResolveError::UndefinedFunction { name: callee, span })?;
        if func.params.len() != args.len() {
            return Err(ResolveError::ArityMismatch {
                callee,
                expected: func.params.len(),
                found: args.len(),
                span,
            });
        }
        for ((param_name, _), (arg_name, _)) in func.params.iter().zip(args.iter()) {
            if param_name != arg_name {
                return Err(ResolveError::UnknownArgument {
                    callee,
                    name: *arg_name,
                    span,
                });
            }
        }
        func.referenced += 1;
        Ok(())
    }

    /// Supplementary diagnostics (not hard errors): locals that are never
    /// read, and non-`main` functions that are never called.
    fn report_unused(globals: &GlobalTable, handler: &mut Handler) {
        for table in globals.locals.values() {
            for var in table.variables.values() {
                if var.referenced == 0 {
                    handler.warning(
                        DiagnosticCode::W3001_UNUSED_VARIABLE,
                        format!("unused variable: {}", var.name),
                        var.span,
                    );
                }
            }
        }
        for var in globals.variables.values() {
            if var.referenced == 0 {
                handler.warning(
                    DiagnosticCode::W3001_UNUSED_VARIABLE,
                    format!("unused variable: {}", var.name),
                    var.span,
                );
            }
        }
        for func in globals.functions.values() {
            if func.is_builtin || func.name.as_str() == "main" {
                continue;
            }
            if func.referenced == 0 {
                handler.warning(
                    DiagnosticCode::W3002_UNUSED_FUNCTION,
                    format!("unused function: {}", func.name),
                    func.span,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toyc_lex::Lexer;
    use toyc_par::Parser;
    use toyc_util::FileId;

    fn resolve(src: &str) -> Result<GlobalTable, ResolveError> {
        let tokens = Lexer::new(src, FileId(0)).tokenize().unwrap();
        let mut program = Parser::new(tokens).parse_program().unwrap();
        let mut handler = Handler::new();
        Resolver::resolve(&mut program, &mut handler)
    }

    #[test]
    fn keyword_call_args_sort_to_match_declaration() {
        let tokens = Lexer::new(
            "func add(x: Int, y: Int) : Int { return x + y } \
 func main() : Int { return add(y: 2, x: 3) }",
            FileId(0),
        )
        .tokenize()
        .unwrap();
        let mut program = Parser::new(tokens).parse_program().unwrap();
        let mut handler = Handler::new();
        Resolver::resolve(&mut program, &mut handler).unwrap();

        let add = &program.functions[0];
        assert_eq!(add.params[0].name.as_str(), "x");
        assert_eq!(add.params[1].name.as_str(), "y");

        let main = &program.functions[1];
        match &main.body.stmts[0] {
            Stmt::Return { value, .. } => match value {
                Expr::Call { args, .. } => {
                    assert_eq!(args[0].0.as_str(), "x");
                    assert_eq!(args[1].0.as_str(), "y");
                }
                _ => panic!("expected call"),
            },
            _ => panic!("expected return"),
        }
    }

    #[test]
    fn undefined_function_is_reported() {
        let err = resolve("func main() : Int { return foo(x: 1) }").unwrap_err();
        assert!(matches!(err, ResolveError::UndefinedFunction { .. }));
    }

    #[test]
    fn undefined_variable_is_reported() {
        let err = resolve("func main() : Int { return missing }").unwrap_err();
        assert!(matches!(err, ResolveError::UndefinedVariable { .. }));
    }

    #[test]
    fn duplicate_function_is_reported() {
        let err = resolve(
            "func f() : Int { return 0 } func f() : Int { return 1 } \
 func main() : Int { return 0 }",
        )
        .unwrap_err();
        assert!(matches!(err, ResolveError::FunctionRedefinition { .. }));
    }

    #[test]
    fn duplicate_local_variable_is_reported() {
        let err =
            resolve("func main() : Int { var a: Int var a: Int return 0 }").unwrap_err();
        assert!(matches!(err, ResolveError::VariableRedefinition { .. }));
    }

    #[test]
    fn arity_mismatch_is_reported() {
        let err = resolve(
            "func add(x: Int, y: Int) : Int { return x + y } \
 func main() : Int { return add(x: 1) }",
        )
        .unwrap_err();
        assert!(matches!(err, ResolveError::ArityMismatch { .. }));
    }

    #[test]
    fn unknown_argument_name_is_reported() {
        let err = resolve(
            "func add(x: Int, y: Int) : Int { return x + y } \
 func main() : Int { return add(x: 1, z: 2) }",
        )
        .unwrap_err();
        assert!(matches!(err, ResolveError::UnknownArgument { .. }));
    }

    #[test]
    fn rvalue_assignment_is_left_for_codegen_to_reject() {
        // Resolution only resolves names; `1 = 2` is syntactically a
        // `Binary` like any other and is accepted here, matching the
        // grammar's deferral of the LHS-is-a-variable check to codegen.
        resolve("func main() : Int { 1 = 2 return 0 }").unwrap();
    }

    #[test]
    fn builtins_are_callable_without_declaration() {
        resolve("func main() : Int { print(val: 1) return input() }").unwrap();
    }

    #[test]
    fn unused_variable_is_a_warning_not_an_error() {
        let tokens = Lexer::new(
            "func main() : Int { var a: Int return 0 }",
            FileId(0),
        )
        .tokenize()
        .unwrap();
        let mut program = Parser::new(tokens).parse_program().unwrap();
        let mut handler = Handler::new();
        Resolver::resolve(&mut program, &mut handler).unwrap();
        assert!(!handler.has_errors());
        assert!(handler
            .diagnostics()
            .iter()
            .any(|d| d.message.contains("unused variable: a")));
    }

    #[test]
    fn pass_and_nested_block_resolve_without_declaring_a_scope() {
        resolve("func main() : Int { var a: Int { a = 1 } pass return a }").unwrap();
    }
}
