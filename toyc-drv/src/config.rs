//! Command-line configuration.
//!
//! Parsing is a hand-rolled loop over `std::env::args()` rather than a
//! `clap` derive — the whole flag surface is six booleans and a path.

use std::io::IsTerminal;
use std::path::PathBuf;

use crate::error::DriverError;

const USAGE: &str =
    "usage: toyc <file> [--dump-tokens] [--dump-ast] [--dump-assembly] [--trace] [-v|--verbose] [--no-color]";

/// Parsed command-line configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub input_file: PathBuf,
    /// Print each lexed token and exit, without parsing.
    pub dump_tokens: bool,
    /// Print the parenthesized AST and exit, without resolving.
    pub dump_ast: bool,
    /// Print the linked text segment and exit, without running.
    pub dump_assembly: bool,
    /// Log every executed instruction at `tracing::trace!` while running.
    pub trace_vm: bool,
    pub verbose: bool,
    pub no_color: bool,
}

impl Config {
    /// Parses `args` (the process's arguments, *not* including the
    /// program name). Exactly one positional argument — the source
    /// file — is required; every other recognized argument is a flag.
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, DriverError> {
        let mut input_file = None;
        let mut dump_tokens = false;
        let mut dump_ast = false;
        let mut dump_assembly = false;
        let mut trace_vm = false;
        let mut verbose = false;
        let mut no_color = false;

        for arg in args {
            match arg.as_str() {
                "--dump-tokens" => dump_tokens = true,
                "--dump-ast" => dump_ast = true,
                "--dump-assembly" => dump_assembly = true,
                "--trace" => trace_vm = true,
                "-v" | "--verbose" => verbose = true,
                "--no-color" => no_color = true,
                "-h" | "--help" => return Err(DriverError::Usage(USAGE.to_string())),
                other if other.starts_with('-') => {
                    return Err(DriverError::Usage(format!("unrecognized flag {other}\n{USAGE}")));
                }
                other if input_file.is_none() => input_file = Some(PathBuf::from(other)),
                other => {
                    return Err(DriverError::Usage(format!("unexpected extra argument {other}\n{USAGE}")));
                }
            }
        }

        let input_file = input_file.ok_or_else(|| DriverError::Usage(USAGE.to_string()))?;
        let no_color = no_color || !std::io::stdout().is_terminal();

        Ok(Self {
            input_file,
            dump_tokens,
            dump_ast,
            dump_assembly,
            trace_vm,
            verbose,
            no_color,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_an_input_file() {
        let err = Config::parse(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, DriverError::Usage(_)));
    }

    #[test]
    fn parses_flags_in_any_order() {
        let config = Config::parse(["--verbose".to_string(), "prog.toy".to_string(), "--dump-ast".to_string()]).unwrap();
        assert_eq!(config.input_file, PathBuf::from("prog.toy"));
        assert!(config.verbose);
        assert!(config.dump_ast);
        assert!(!config.dump_tokens);
    }

    #[test]
    fn rejects_a_second_positional_argument() {
        let err = Config::parse(["a.toy".to_string(), "b.toy".to_string()]).unwrap_err();
        assert!(matches!(err, DriverError::Usage(_)));
    }

    #[test]
    fn rejects_unknown_flags() {
        let err = Config::parse(["prog.toy".to_string(), "--bogus".to_string()]).unwrap_err();
        assert!(matches!(err, DriverError::Usage(_)));
    }
}
