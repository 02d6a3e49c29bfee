//! Orchestrates one compile-and-run: read source, then walk every
//! phase in order, stopping early for the `--dump-*` flags and
//! rendering the first error any phase raises.

use std::io::Write;
use std::path::PathBuf;

use toyc_lex::Lexer;
use toyc_par::Parser;
use toyc_sem::{GlobalTable, Resolver};
use toyc_util::{Handler, SourceMap};
use toyc_vm::VirtualMachine;

use crate::config::Config;
use crate::error::DriverError;
use crate::report;

/// Exit code for a clean run with no compile-time errors.
pub const EXIT_OK: i32 = 0;
/// Exit code for a compile-time diagnostic (lex/parse/resolve/codegen error).
pub const EXIT_COMPILE_ERROR: i32 = 1;
/// Exit code for a fatal error raised by the virtual machine itself.
pub const EXIT_VM_ERROR: i32 = 2;

pub struct Session {
    config: Config,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Runs the whole pipeline, returning the process exit code.
    ///
    /// Any read failure or bad invocation is a [`DriverError`]; every
    /// later phase's errors are caught here, rendered to stderr via
    /// [`Handler`], and turned into [`EXIT_COMPILE_ERROR`] or
    /// [`EXIT_VM_ERROR`] instead of propagating.
    pub fn run(&self) -> Result<i32, DriverError> {
        let path: PathBuf = self.config.input_file.clone();
        let contents = std::fs::read_to_string(&path).map_err(|source| DriverError::ReadSource {
            path: path.clone(),
            source,
        })?;

        let mut sources = SourceMap::new();
        let file_id = sources.add_file(path, contents.clone());

        let mut handler = Handler::new();

        let tokens = match Lexer::new(&contents, file_id).tokenize() {
            Ok(tokens) => tokens,
            Err(err) => return Ok(self.report_error(&mut handler, &sources, report::lex(&err))),
        };

        if self.config.dump_tokens {
            for token in &tokens {
                println!("{}\t{:?}", token.span, token.kind);
            }
            return Ok(EXIT_OK);
        }

        let mut program = match Parser::new(tokens).parse_program() {
            Ok(program) => program,
            Err(err) => return Ok(self.report_error(&mut handler, &sources, report::parse(&err))),
        };

        if self.config.dump_ast {
            println!("{program}");
            return Ok(EXIT_OK);
        }

        let mut globals: GlobalTable = match Resolver::resolve(&mut program, &mut handler) {
            Ok(globals) => globals,
            Err(err) => return Ok(self.report_error(&mut handler, &sources, report::resolve(&err))),
        };
        let linked = match toyc_gen::generate(&program, &mut globals) {
            Ok(linked) => linked,
            Err(err) => return Ok(self.report_error(&mut handler, &sources, report::codegen(&err))),
        };

        self.print_warnings(&handler, &sources);

        if self.config.dump_assembly {
            for line in toyc_vm::disassemble(&linked.text) {
                println!("{line}");
            }
            return Ok(EXIT_OK);
        }

        let mut vm = VirtualMachine::new(linked.text, linked.data_len).with_trace(self.config.trace_vm);
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        let mut stdin_lock = stdin.lock();
        let mut stdout_lock = stdout.lock();

        match vm.run(&mut stdin_lock, &mut stdout_lock) {
            Ok(()) => Ok(EXIT_OK),
            Err(err) => {
                let _ = stdout_lock.flush();
                eprintln!("fatal[{}]: {err}", report::vm(&err));
                Ok(EXIT_VM_ERROR)
            }
        }
    }

    fn report_error(&self, handler: &mut Handler, sources: &SourceMap, (code, message, span): (toyc_util::DiagnosticCode, String, toyc_util::Span)) -> i32 {
        handler.error(code, message, span);
        self.print_warnings(handler, sources);
        EXIT_COMPILE_ERROR
    }

    fn print_warnings(&self, handler: &Handler, sources: &SourceMap) {
        let rendered = handler.render(sources, !self.config.no_color);
        if !rendered.trim().is_empty() {
            eprint!("{rendered}");
        }
    }
}
