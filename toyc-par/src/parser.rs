//! Recursive-descent, precedence-climbing parser.
//!
//! Grammar (informal):
//!
//! ```text
//! program      := (global_decl | func_decl)*
//! global_decl  := "var" ident ":" type
//! func_decl    := "func" ident "(" params? ")" ":" type "{" func_body "}"
//! params       := param ("," param)*
//! param        := ident ":" type
//! func_body    := local_decl* stmt*
//! local_decl   := "var" ident ":" type
//! stmt         := if_stmt | while_stmt | return_stmt | pass_stmt | block_stmt | expr_stmt
//! if_stmt      := "if" "(" expr ")" stmt_body ("else" stmt_body)?
//! while_stmt   := "while" "(" expr ")" stmt_body
//! stmt_body    := "{" stmt* "}" | stmt
//! return_stmt  := "return" expr
//! pass_stmt    := "pass"
//! block_stmt   := "{" stmt* "}"
//! expr_stmt    := expr
//! expr         := assignment climbed by precedence (right-assoc "=" at the bottom)
//! unary        := ("!" | "~" | "-") unary | primary
//! primary      := number | call | ident | "(" expr ")"
//! call         := ident "(" (ident ":" expr ("," ident ":" expr)*)? ")"
//! type         := "Int"
//! ```

use toyc_lex::{BinOp, Token, TokenKind, UnOp};
use toyc_util::Symbol;

use crate::ast::{Expr, FuncBody, FuncDecl, Param, Program, Stmt, Type, VarDecl};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("expected {expected}, found {found:?} at {span}")]
    TokenMismatch {
        expected: &'static str,
        found: TokenKind,
        span: toyc_util::Span,
    },
    #[error("expected a term, found {found:?} at {span}")]
    ExpectedTerm {
        found: TokenKind,
        span: toyc_util::Span,
    },
    #[error("unrecognized type {found:?} at {span}")]
    UnrecognizedType {
        found: TokenKind,
        span: toyc_util::Span,
    },
    #[error(transparent)]
    Lex(#[from] toyc_lex::LexError),
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parses a whole program: a mix of global variable declarations and
    /// function declarations, in any order.
    ///
    /// # Examples
    ///
    /// ```
    /// use toyc_lex::Lexer;
    /// use toyc_par::Parser;
    /// use toyc_util::FileId;
    ///
    /// let tokens = Lexer::new("func main() : Int { return 0 }", FileId(0))
    ///     .tokenize()
    ///     .unwrap();
    /// let program = Parser::new(tokens).parse_program().unwrap();
    /// assert_eq!(program.functions.len(), 1);
    /// ```
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        tracing::debug!("parsing program");
        let mut globals = Vec::new();
        while self.check(&TokenKind::Var) {
            globals.push(self.parse_var_decl()?);
        }
        let mut functions = Vec::new();
        while !self.at_eof() {
            functions.push(self.parse_func_decl()?);
        }
        tracing::debug!(
            globals = globals.len(),
            functions = functions.len(),
            "parsing finished"
        );
        Ok(Program { globals, functions })
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind)
    }

    fn bump(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<Token, ParseError> {
        if self.check(&kind) {
            Ok(self.bump())
        } else {
            let found = self.peek().clone();
            Err(ParseError::TokenMismatch {
                expected,
                found: found.kind,
                span: found.span,
            })
        }
    }

    fn ident(&mut self) -> Result<(Symbol, toyc_util::Span), ParseError> {
        let tok = self.expect(TokenKind::Ident(Symbol::intern("")), "identifier")?;
        match tok.kind {
            TokenKind::Ident(sym) => Ok((sym, tok.span)),
            _ => unreachable!(),
        }
    }

    fn parse_type(&mut self) -> Result<Type, ParseError> {
        let tok = self.bump();
        match tok.kind {
            TokenKind::IntType => Ok(Type::Int),
            found => Err(ParseError::UnrecognizedType {
                found,
                span: tok.span,
            }),
        }
    }

    fn parse_var_decl(&mut self) -> Result<VarDecl, ParseError> {
        let start = self.expect(TokenKind::Var, "'var'")?.span;
        let (name, _) = self.ident()?;
        self.expect(TokenKind::Colon, "':'")?;
        let ty = self.parse_type()?;
        let end = self.prev_span();
        Ok(VarDecl {
            name,
            ty,
            span: start.merge(end),
        })
    }

    fn parse_func_decl(&mut self) -> Result<FuncDecl, ParseError> {
        let start = self.expect(TokenKind::Func, "'func'")?.span;
        let (name, _) = self.ident()?;
        tracing::trace!(%name, "parsing function");
        self.expect(TokenKind::LParen, "'('")?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let (pname, pspan) = self.ident()?;
                self.expect(TokenKind::Colon, "':'")?;
                let ty = self.parse_type()?;
                params.push(Param {
                    name: pname,
                    ty,
                    span: pspan,
                });
                if self.check(&TokenKind::Comma) {
                    self.bump();
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        self.expect(TokenKind::Colon, "':'")?;
        let return_ty = self.parse_type()?;
        self.expect(TokenKind::LBrace, "'{'")?;
        let body = self.parse_func_body()?;
        let end = self.expect(TokenKind::RBrace, "'}'")?.span;
        Ok(FuncDecl {
            name,
            params,
            return_ty,
            body,
            span: start.merge(end),
        })
    }

    fn parse_func_body(&mut self) -> Result<FuncBody, ParseError> {
        let mut locals = Vec::new();
        while self.check(&TokenKind::Var) {
            locals.push(self.parse_var_decl()?);
        }
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            stmts.push(self.parse_stmt()?);
        }
        Ok(FuncBody { locals, stmts })
    }

    fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            stmts.push(self.parse_stmt()?);
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(stmts)
    }

    /// An `if`/`while` body per the grammar's `statement` production: a
    /// braced `{ statement* }` block, or a single bare statement (so
    /// `if (x) pass` and `while (x) n = n - 1` are both legal, not just
    /// braced bodies).
    fn parse_stmt_body(&mut self) -> Result<Vec<Stmt>, ParseError> {
        if self.check(&TokenKind::LBrace) {
            self.parse_block()
        } else {
            Ok(vec![self.parse_stmt()?])
        }
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        match self.peek().kind {
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Pass => self.parse_pass(),
            TokenKind::LBrace => self.parse_nested_block(),
            _ => {
                let expr = self.parse_expr()?;
                Ok(Stmt::Expr(expr))
            }
        }
    }

    fn parse_pass(&mut self) -> Result<Stmt, ParseError> {
        let span = self.expect(TokenKind::Pass, "'pass'")?.span;
        Ok(Stmt::Pass { span })
    }

    /// A `{ statement* }` appearing in statement position, e.g. to
    /// introduce a bare nested scope inside a function body.
    fn parse_nested_block(&mut self) -> Result<Stmt, ParseError> {
        let start = self.peek().span;
        let stmts = self.parse_block()?;
        let end = self.prev_span();
        Ok(Stmt::Block {
            stmts,
            span: start.merge(end),
        })
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let start = self.expect(TokenKind::If, "'if'")?.span;
        self.expect(TokenKind::LParen, "'('")?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen, "')'")?;
        let then_block = self.parse_stmt_body()?;
        let (else_block, end) = if self.check(&TokenKind::Else) {
            self.bump();
            let block = self.parse_stmt_body()?;
            let end = self.prev_span();
            (block, end)
        } else {
            (Vec::new(), self.prev_span())
        };
        Ok(Stmt::If {
            cond,
            then_block,
            else_block,
            span: start.merge(end),
        })
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        let start = self.expect(TokenKind::While, "'while'")?.span;
        self.expect(TokenKind::LParen, "'('")?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen, "')'")?;
        let body = self.parse_stmt_body()?;
        let end = self.prev_span();
        Ok(Stmt::While {
            cond,
            body,
            span: start.merge(end),
        })
    }

    fn parse_return(&mut self) -> Result<Stmt, ParseError> {
        let start = self.expect(TokenKind::Return, "'return'")?.span;
        let value = self.parse_expr()?;
        let end = value.span();
        Ok(Stmt::Return {
            value,
            span: start.merge(end),
        })
    }

    fn prev_span(&self) -> toyc_util::Span {
        self.tokens[self.pos.saturating_sub(1)].span
    }

    /// Entry point for expression parsing: precedence climbing starting
    /// at the lowest binding power (the right-associative `=`).
    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary(0)
    }

    fn parse_binary(&mut self, min_precedence: u32) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let Some(op) = BinOp::from_token(&self.peek().kind) else {
                break;
            };
            let prec = op.precedence();
            if prec < min_precedence {
                break;
            }
            self.bump();
            let next_min = if op.is_right_assoc() { prec } else { prec + 1 };
            let rhs = self.parse_binary(next_min)?;
            let span = lhs.span().merge(rhs.span());
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if let Some(op) = UnOp::from_token(&self.peek().kind) {
            let start = self.bump().span;
            let operand = self.parse_unary()?;
            let span = start.merge(operand.span());
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
                span,
            });
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::Number { value, .. } => {
                self.bump();
                Ok(Expr::Number {
                    value,
                    span: tok.span,
                })
            }
            TokenKind::LParen => {
                self.bump();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::Ident(name) => {
                self.bump();
                if self.check(&TokenKind::LParen) {
                    self.parse_call(name, tok.span)
                } else {
                    Ok(Expr::Variable {
                        name,
                        span: tok.span,
                    })
                }
            }
            found => Err(ParseError::ExpectedTerm {
                found,
                span: tok.span,
            }),
        }
    }

    fn parse_call(&mut self, callee: Symbol, callee_span: toyc_util::Span) -> Result<Expr, ParseError> {
        self.expect(TokenKind::LParen, "'('")?;
        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let (name, _) = self.ident()?;
                self.expect(TokenKind::Colon, "':'")?;
                let value = self.parse_expr()?;
                args.push((name, value));
                if self.check(&TokenKind::Comma) {
                    self.bump();
                } else {
                    break;
                }
            }
        }
        let end = self.expect(TokenKind::RParen, "')'")?.span;
        Ok(Expr::Call {
            callee,
            args,
            span: callee_span.merge(end),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toyc_lex::Lexer;
    use toyc_util::FileId;

    fn parse(src: &str) -> Program {
        let tokens = Lexer::new(src, FileId(0)).tokenize().unwrap();
        Parser::new(tokens).parse_program().unwrap()
    }

    #[test]
    fn precedence_climbing_orders_mul_before_add() {
        let program = parse("func f() : Int { return 0x1F + 0b11 * 2 }");
        let body = &program.functions[0].body;
        match &body.stmts[0] {
            Stmt::Return { value, .. } => {
                assert_eq!(value.to_string(), "(+, 31, (*, 3, 2))");
            }
            _ => panic!("expected return"),
        }
    }

    #[test]
    fn assignment_is_right_associative() {
        let program = parse("func f() : Int { var a: Int var b: Int a = b = 5 return 0 }");
        let body = &program.functions[0].body;
        match &body.stmts[0] {
            Stmt::Expr(e) => assert_eq!(e.to_string(), "(=, a, (=, b, 5))"),
            _ => panic!("expected expr stmt"),
        }
    }

    #[test]
    fn call_parses_named_arguments_in_source_order() {
        let program = parse("func f() : Int { return add(y:2, x:3) }");
        let body = &program.functions[0].body;
        match &body.stmts[0] {
            Stmt::Return { value, .. } => {
                if let Expr::Call { args, .. } = value {
                    assert_eq!(args[0].0.as_str(), "y");
                    assert_eq!(args[1].0.as_str(), "x");
                } else {
                    panic!("expected call");
                }
            }
            _ => panic!("expected return"),
        }
    }

    #[test]
    fn if_else_parses_both_blocks() {
        let program = parse("func f() : Int { if (1) { return 1 } else { return 2 } }");
        let body = &program.functions[0].body;
        match &body.stmts[0] {
            Stmt::If {
                then_block,
                else_block,
                ..
            } => {
                assert_eq!(then_block.len(), 1);
                assert_eq!(else_block.len(), 1);
            }
            _ => panic!("expected if"),
        }
    }

    #[test]
    fn while_loop_parses_body() {
        let program = parse("func f() : Int { while (1) { print(val:1) } return 0 }");
        let body = &program.functions[0].body;
        assert!(matches!(body.stmts[0], Stmt::While { .. }));
    }

    #[test]
    fn pass_parses_as_a_no_op_statement() {
        let program = parse("func f() : Int { pass return 0 }");
        let body = &program.functions[0].body;
        assert!(matches!(body.stmts[0], Stmt::Pass { .. }));
    }

    #[test]
    fn if_body_may_be_a_single_bare_statement() {
        let program = parse("func f() : Int { if (1) pass return 0 }");
        let body = &program.functions[0].body;
        match &body.stmts[0] {
            Stmt::If { then_block, else_block, .. } => {
                assert_eq!(then_block.len(), 1);
                assert!(else_block.is_empty());
                assert!(matches!(then_block[0], Stmt::Pass { .. }));
            }
            _ => panic!("expected if"),
        }
    }

    #[test]
    fn while_body_may_be_a_single_bare_statement() {
        let program = parse("func f() : Int { var n: Int while (n) n = n - 1 return 0 }");
        let body = &program.functions[0].body;
        match &body.stmts[0] {
            Stmt::While { body, .. } => assert_eq!(body.len(), 1),
            _ => panic!("expected while"),
        }
    }

    #[test]
    fn bare_nested_block_parses_as_a_statement() {
        let program = parse("func f() : Int { { pass } return 0 }");
        let body = &program.functions[0].body;
        match &body.stmts[0] {
            Stmt::Block { stmts, .. } => assert_eq!(stmts.len(), 1),
            _ => panic!("expected block"),
        }
    }

    #[test]
    fn locals_must_precede_statements() {
        let program = parse("func f() : Int { var a: Int a = 1 return a }");
        let body = &program.functions[0].body;
        assert_eq!(body.locals.len(), 1);
        assert_eq!(body.stmts.len(), 2);
    }

    #[test]
    fn global_declarations_precede_function_declarations() {
        let program = parse("var g: Int func main() : Int { return g }");
        assert_eq!(program.globals.len(), 1);
        assert_eq!(program.functions.len(), 1);
    }

    #[test]
    fn variable_declaration_after_a_function_is_rejected() {
        // global ::= var_decl* func_decl* — a `var` can't follow a `func`.
        let tokens = Lexer::new(
            "func main() : Int { return 0 } var g: Int",
            FileId(0),
        )
        .tokenize()
        .unwrap();
        let err = Parser::new(tokens).parse_program().unwrap_err();
        assert!(matches!(err, ParseError::TokenMismatch { .. }));
    }

    #[test]
    fn expected_term_error_on_dangling_operator() {
        let tokens = Lexer::new("func f() : Int { return + }", FileId(0))
            .tokenize()
            .unwrap();
        let err = Parser::new(tokens).parse_program().unwrap_err();
        assert!(matches!(err, ParseError::ExpectedTerm { .. }));
    }
}
