//! The code generator: one recursive walk over a resolved [`Program`]
//! that emits [`Instruction`]s into a growable text buffer, plus the
//! link pass that rewrites call placeholders afterward.

use toyc_isa::{local_offset, param_offset, Instruction, Register, SEGMENT_SIZE};
use toyc_lex::{BinOp, UnOp};
use toyc_par::{Expr, FuncDecl, Program, Stmt};
use toyc_sem::GlobalTable;
use toyc_util::{Span, Symbol};

use crate::error::{CodegenError, CodegenResult};

/// A linked program image, ready to be loaded into a [`toyc_vm`] text
/// segment along with a `data` segment of `data_len` zeroed cells.
pub struct LinkedProgram {
    pub text: Vec<u64>,
    pub data_len: usize,
}

struct CodeGenerator {
    text: Vec<Instruction>,
    pending_calls: Vec<(usize, Symbol, Span)>,
}

impl CodeGenerator {
    fn emit(&mut self, instr: Instruction) -> usize {
        self.text.push(instr);
        self.text.len() - 1
    }

    fn resolve_variable(name: Symbol, globals: &GlobalTable, func_name: Symbol) -> (bool, i64) {
        let local_table = &globals.locals[&func_name];
        if let Some(sym) = local_table.variables.get(&name) {
            return (true, sym.position.expect("codegen layout pass assigns every local's offset"));
        }
        let sym = &globals.variables[&name];
        (false, sym.position.expect("codegen layout pass assigns every global's offset"))
    }

    fn emit_load_address(&mut self, is_local: bool, offset: i64) {
        let base = if is_local { Register::Rbp } else { Register::Rzero };
        self.emit(Instruction::Lea {
            reg0: Register::Rax,
            reg1: base,
            imm: offset as i32,
        });
    }

    fn generate_expr(&mut self, expr: &Expr, globals: &GlobalTable, func_name: Symbol) -> CodegenResult<()> {
        match expr {
            Expr::Number { value, .. } => {
                self.emit(Instruction::Lea {
                    reg0: Register::Rax,
                    reg1: Register::Rzero,
                    imm: *value as i32,
                });
                Ok(())
            }
            Expr::Variable { name, .. } => {
                let (is_local, offset) = Self::resolve_variable(*name, globals, func_name);
                self.emit_load_address(is_local, offset);
                self.emit(Instruction::Push { reg: Register::Rax });
                self.emit(if is_local { Instruction::Li } else { Instruction::Lid });
                Ok(())
            }
            Expr::Unary { op, operand, .. } => {
                self.generate_expr(operand, globals, func_name)?;
                match op {
                    UnOp::Not => {
                        self.emit(Instruction::Push { reg: Register::Rzero });
                        self.emit(Instruction::Eq);
                    }
                    UnOp::BitNot => {
                        self.emit(Instruction::Push { reg: Register::Rax });
                        self.emit(Instruction::Notb);
                    }
                    UnOp::Neg => {
                        self.emit(Instruction::Push { reg: Register::Rzero });
                        self.emit(Instruction::Sub);
                    }
                }
                Ok(())
            }
            Expr::Binary { op, lhs, rhs, .. } => self.generate_binary(*op, lhs, rhs, globals, func_name),
            Expr::Call { callee, args, span } => {
                for (_, value) in args {
                    self.generate_expr(value, globals, func_name)?;
                    self.emit(Instruction::Push { reg: Register::Rax });
                }
                let idx = self.emit(Instruction::Call { imm: 0 });
                self.pending_calls.push((idx, *callee, *span));
                self.emit(Instruction::Lea {
                    reg0: Register::Rsp,
                    reg1: Register::Rsp,
                    imm: -(args.len() as i32),
                });
                Ok(())
            }
        }
    }

    fn generate_binary(
        &mut self,
        op: BinOp,
        lhs: &Expr,
        rhs: &Expr,
        globals: &GlobalTable,
        func_name: Symbol,
    ) -> CodegenResult<()> {
        if op == BinOp::Assign {
            return self.generate_assign(lhs, rhs, globals, func_name);
        }
        self.generate_expr(lhs, globals, func_name)?;
        self.emit(Instruction::Push { reg: Register::Rax });
        self.generate_expr(rhs, globals, func_name)?;
        match op {
            BinOp::And => {
                self.emit(Instruction::Mul);
                self.emit(Instruction::Push { reg: Register::Rzero });
                self.emit(Instruction::Ne);
            }
            BinOp::Or => {
                self.emit(Instruction::Orb);
                self.emit(Instruction::Push { reg: Register::Rzero });
                self.emit(Instruction::Ne);
            }
            BinOp::BitOr => {
                self.emit(Instruction::Orb);
            }
            BinOp::BitXor => {
                self.emit(Instruction::Xorb);
            }
            BinOp::BitAnd => {
                self.emit(Instruction::Andb);
            }
            BinOp::Eq => {
                self.emit(Instruction::Eq);
            }
            BinOp::Ne => {
                self.emit(Instruction::Ne);
            }
            BinOp::Lt => {
                self.emit(Instruction::Lt);
            }
            BinOp::Le => {
                self.emit(Instruction::Le);
            }
            BinOp::Gt => {
                self.emit(Instruction::Gt);
            }
            BinOp::Ge => {
                self.emit(Instruction::Ge);
            }
            BinOp::Shl => {
                self.emit(Instruction::Shl);
            }
            BinOp::Shr => {
                self.emit(Instruction::Shr);
            }
            BinOp::Add => {
                self.emit(Instruction::Add);
            }
            BinOp::Sub => {
                self.emit(Instruction::Sub);
            }
            BinOp::Mul => {
                self.emit(Instruction::Mul);
            }
            BinOp::Div => {
                self.emit(Instruction::Div);
            }
            BinOp::Mod => {
                self.emit(Instruction::Mod);
            }
            BinOp::Assign => unreachable!("handled above"),
        };
        Ok(())
    }

    fn generate_assign(&mut self, lhs: &Expr, rhs: &Expr, globals: &GlobalTable, func_name: Symbol) -> CodegenResult<()> {
        let Expr::Variable { name, .. } = lhs else {
            return Err(CodegenError::RvalueAssignment { span: lhs.span() });
        };
        let (is_local, offset) = Self::resolve_variable(*name, globals, func_name);
        self.emit_load_address(is_local, offset);
        self.emit(Instruction::Push { reg: Register::Rax });
        self.generate_expr(rhs, globals, func_name)?;
        self.emit(if is_local { Instruction::Si } else { Instruction::Sid });
        Ok(())
    }

    fn generate_stmt(&mut self, stmt: &Stmt, globals: &GlobalTable, func_name: Symbol, locals_len: i64) -> CodegenResult<()> {
        match stmt {
            Stmt::Expr(expr) => self.generate_expr(expr, globals, func_name),
            Stmt::Return { value, .. } => {
                self.generate_expr(value, globals, func_name)?;
                self.unwind_and_return(locals_len);
                Ok(())
            }
            Stmt::If {
                cond,
                then_block,
                else_block,
                ..
            } => {
                self.generate_expr(cond, globals, func_name)?;
                let jz_idx = self.emit(Instruction::Jz { imm: 0 });
                for s in then_block {
                    self.generate_stmt(s, globals, func_name, locals_len)?;
                }
                let jmp_idx = self.emit(Instruction::Jmp { imm: 0 });
                let else_start = self.text.len() as i32;
                self.text[jz_idx] = Instruction::Jz { imm: else_start };
                for s in else_block {
                    self.generate_stmt(s, globals, func_name, locals_len)?;
                }
                let after = self.text.len() as i32;
                self.text[jmp_idx] = Instruction::Jmp { imm: after };
                Ok(())
            }
            Stmt::While { cond, body, .. } => {
                let loop_top = self.text.len() as i32;
                self.generate_expr(cond, globals, func_name)?;
                let jz_idx = self.emit(Instruction::Jz { imm: 0 });
                for s in body {
                    self.generate_stmt(s, globals, func_name, locals_len)?;
                }
                self.emit(Instruction::Jmp { imm: loop_top });
                let after = self.text.len() as i32;
                self.text[jz_idx] = Instruction::Jz { imm: after };
                Ok(())
            }
            Stmt::Pass { .. } => Ok(()),
            Stmt::Block { stmts, .. } => {
                for s in stmts {
                    self.generate_stmt(s, globals, func_name, locals_len)?;
                }
                Ok(())
            }
        }
    }

    fn unwind_and_return(&mut self, locals_len: i64) {
        self.emit(Instruction::Lea {
            reg0: Register::Rsp,
            reg1: Register::Rsp,
            imm: -(locals_len as i32),
        });
        self.emit(Instruction::Pop { reg: Register::Rbp });
        self.emit(Instruction::Ret);
    }

    fn generate_function(&mut self, func: &FuncDecl, globals: &GlobalTable) -> CodegenResult<()> {
        tracing::debug!(name = %func.name, "emitting function body");
        self.emit(Instruction::Push { reg: Register::Rbp });
        self.emit(Instruction::Lea {
            reg0: Register::Rbp,
            reg1: Register::Rsp,
            imm: 0,
        });
        let locals_len = func.body.locals.len() as i64;
        self.emit(Instruction::Lea {
            reg0: Register::Rsp,
            reg1: Register::Rsp,
            imm: locals_len as i32,
        });
        for stmt in &func.body.stmts {
            self.generate_stmt(stmt, globals, func.name, locals_len)?;
        }
        self.emit(Instruction::Lea {
            reg0: Register::Rsp,
            reg1: Register::Rsp,
            imm: -(locals_len as i32),
        });
        self.emit(Instruction::Pop { reg: Register::Rbp });
        self.emit(Instruction::Ret);
        Ok(())
    }
}

fn assign_global_positions(program: &Program, globals: &mut GlobalTable) -> usize {
    let mut data_len = 0usize;
    for decl in &program.globals {
        globals.variables.get_mut(&decl.name).expect("resolved").position = Some(data_len as i64);
        data_len += 1;
    }
    data_len
}

fn assign_local_positions(program: &Program, globals: &mut GlobalTable) {
    for func in &program.functions {
        let argc = func.params.len();
        let table = globals.locals.get_mut(&func.name).expect("hoisted by the resolver");
        for (i, param) in func.params.iter().enumerate() {
            table.variables.get_mut(&param.name).expect("resolved").position = Some(param_offset(argc, i));
        }
        for (i, decl) in func.body.locals.iter().enumerate() {
            table.variables.get_mut(&decl.name).expect("resolved").position = Some(local_offset(i));
        }
    }
}

/// Generates and links a whole program: the entry sequence (`call main;
/// iexit`), every function body in declaration order, then a link pass
/// rewriting every call placeholder to a `CALL <offset>` or the builtin
/// opcode it stands for.
pub fn generate(program: &Program, globals: &mut GlobalTable) -> CodegenResult<LinkedProgram> {
    tracing::debug!("starting code generation");
    let data_len = assign_global_positions(program, globals);
    assign_local_positions(program, globals);

    let mut gen = CodeGenerator {
        text: Vec::new(),
        pending_calls: Vec::new(),
    };

    let main = Symbol::intern("main");
    let entry_span = Span::DUMMY;
    let idx = gen.emit(Instruction::Call { imm: 0 });
    gen.pending_calls.push((idx, main, entry_span));
    gen.emit(Instruction::Iexit);

    for func in &program.functions {
        globals.functions.get_mut(&func.name).expect("hoisted by the resolver").position = Some(gen.text.len());
        gen.generate_function(func, globals)?;
    }

    link(&mut gen, globals)?;

    if gen.text.len() > SEGMENT_SIZE || data_len > SEGMENT_SIZE {
        return Err(CodegenError::SegmentOverflow);
    }

    Ok(LinkedProgram {
        text: gen.text.into_iter().map(Instruction::to_word).collect(),
        data_len,
    })
}

fn link(gen: &mut CodeGenerator, globals: &GlobalTable) -> CodegenResult<()> {
    for (idx, name, span) in gen.pending_calls.drain(..) {
        let sym = globals
            .functions
            .get(&name)
            .ok_or(CodegenError::UndefinedSymbol { name, span })?;
        let instr = if sym.is_builtin {
            match name.as_str() {
                "print" => Instruction::Outpt,
                "input" => Instruction::Inpt,
                "exit" => Instruction::Iexit,
                other => unreachable!("unknown builtin {other}"),
            }
        } else {
            let pos = sym.position.ok_or(CodegenError::UndefinedSymbol { name, span })?;
            Instruction::Call { imm: pos as i32 }
        };
        gen.text[idx] = instr;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use toyc_lex::Lexer;
    use toyc_par::Parser;
    use toyc_sem::Resolver;
    use toyc_util::{FileId, Handler};

    fn compile(src: &str) -> CodegenResult<LinkedProgram> {
        let tokens = Lexer::new(src, FileId(0)).tokenize().unwrap();
        let mut program = Parser::new(tokens).parse_program().unwrap();
        let mut handler = Handler::new();
        let mut globals = Resolver::resolve(&mut program, &mut handler).unwrap();
        generate(&program, &mut globals)
    }

    #[test]
    fn entry_sequence_calls_main_then_exits() {
        let result = compile("func main() : Int { return 0 }").unwrap();
        let entry = Instruction::from_word(result.text[0]).unwrap();
        assert!(matches!(entry, Instruction::Call { .. }));
        let halt = Instruction::from_word(result.text[1]).unwrap();
        assert_eq!(halt, Instruction::Iexit);
    }

    #[test]
    fn print_call_links_to_outpt() {
        let result = compile("func main() : Int { print(val: 1) return 0 }").unwrap();
        let found = result
            .text
            .iter()
            .any(|&w| Instruction::from_word(w) == Ok(Instruction::Outpt));
        assert!(found);
    }

    #[test]
    fn user_function_call_links_to_its_recorded_position() {
        let result = compile(
            "func add(x: Int, y: Int) : Int { return x + y } \
 func main() : Int { return add(x: 1, y: 2) }",
        )
        .unwrap();
        let has_call = result.text.iter().any(|&w| match Instruction::from_word(w) {
            Ok(Instruction::Call { imm }) => imm > 1,
            _ => false,
        });
        assert!(has_call);
    }

    #[test]
    fn rvalue_assignment_is_rejected_at_codegen_time() {
        let err = compile("func main() : Int { 1 = 2 return 0 }").unwrap_err();
        assert!(matches!(err, CodegenError::RvalueAssignment { .. }));
    }

    #[test]
    fn global_variables_get_distinct_data_positions() {
        let tokens = Lexer::new(
            "var a: Int var b: Int func main() : Int { a = 1 b = 2 return a + b }",
            FileId(0),
        )
        .tokenize()
        .unwrap();
        let mut program = Parser::new(tokens).parse_program().unwrap();
        let mut handler = Handler::new();
        let mut globals = Resolver::resolve(&mut program, &mut handler).unwrap();
        let result = generate(&program, &mut globals).unwrap();
        assert_eq!(result.data_len, 2);
    }

    #[test]
    fn pass_emits_no_instructions() {
        let with_pass = compile("func main() : Int { pass return 0 }").unwrap();
        let without_pass = compile("func main() : Int { return 0 }").unwrap();
        assert_eq!(with_pass.text, without_pass.text);
    }

    #[test]
    fn bare_nested_block_generates_its_statements() {
        let result = compile("func main() : Int { var a: Int { a = 1 } return a }").unwrap();
        let found = result.text.iter().any(|&w| matches!(Instruction::from_word(w), Ok(Instruction::Si)));
        assert!(found, "assignment inside the nested block should still emit a store");
    }
}
