//! End-to-end tests that exercise the `toyc` binary as a subprocess
//! via `assert_cmd`, with `predicates` for output matching and
//! `tempfile` for scratch source files.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn toyc_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_toyc"))
}

fn source_file(src: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("failed to create temp source file");
    write!(file, "{src}").expect("failed to write temp source file");
    file
}

#[test]
fn missing_argument_prints_usage_and_exits_nonzero() {
    toyc_bin()
        .assert()
        .failure()
        .stderr(predicate::str::contains("usage"));
}

#[test]
fn unknown_flag_is_a_usage_error() {
    toyc_bin()
        .arg("prog.toy")
        .arg("--bogus")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized flag"));
}

#[test]
fn nonexistent_source_file_is_reported() {
    toyc_bin()
        .arg("/no/such/file.toy")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn runs_a_program_that_prints_and_exits() {
    let file = source_file("func main() : Int { print(val:1+2) return 0 }");
    toyc_bin()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("3"));
}

#[test]
fn keyword_call_arguments_can_be_given_out_of_order() {
    let file = source_file(
        "func add(x: Int, y: Int) : Int { return x + y } \
 func main() : Int { print(val:add(y:2, x:3)) return 0 }",
    );
    toyc_bin()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("5"));
}

#[test]
fn while_loop_counts_down_then_exits() {
    let file = source_file(
        "var n: Int \
 func main() : Int { n = 3 while (n > 0) { print(val:n) n = n - 1 } return 0 }",
    );
    toyc_bin()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("3").and(predicate::str::contains("2")).and(predicate::str::contains("1")));
}

#[test]
fn dump_tokens_exits_without_running() {
    let file = source_file("func main() : Int { return 0 }");
    toyc_bin()
        .arg(file.path())
        .arg("--dump-tokens")
        .assert()
        .success()
        .stdout(predicate::str::contains("Func"));
}

#[test]
fn dump_ast_prints_the_parenthesized_program() {
    let file = source_file("func main() : Int { return 0 }");
    toyc_bin()
        .arg(file.path())
        .arg("--dump-ast")
        .assert()
        .success()
        .stdout(predicate::str::contains("main"));
}

#[test]
fn dump_assembly_prints_disassembled_text_without_running() {
    let file = source_file("func main() : Int { return 0 }");
    toyc_bin()
        .arg(file.path())
        .arg("--dump-assembly")
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn undefined_variable_is_a_compile_error_with_exit_code_one() {
    let file = source_file("func main() : Int { return missing }");
    toyc_bin()
        .arg(file.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("E3003"));
}

#[test]
fn division_by_zero_is_a_fatal_vm_error_with_exit_code_two() {
    let file = source_file("func main() : Int { print(val:1/0) return 0 }");
    toyc_bin().arg(file.path()).assert().code(2);
}

#[test]
fn pass_statement_is_a_no_op_in_a_braceless_if_body() {
    let file = source_file("func main() : Int { if (0) pass else print(val:9) return 0 }");
    toyc_bin()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("9"));
}
