// ABOUTME: Black-box tests of the hustle binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

fn hustle() -> Command {
    Command::cargo_bin("hustle").unwrap()
}

fn write_script(dir: &Path, name: &str, text: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap();
    path.display().to_string()
}

// ============================================================================
// Program scenarios
// ============================================================================

#[test]
fn test_arithmetic_precedence() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "t.hsle", "var x = 1 + 2 * 3 ; printh(x)\n");

    hustle()
        .args(["run", &script])
        .assert()
        .success()
        .stdout("7\n");
}

#[test]
fn test_arrow_function() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "t.hsle", "func sq(n) -> n^2 ; printh(sq(5))\n");

    hustle()
        .args(["run", &script])
        .assert()
        .success()
        .stdout("25\n");
}

#[test]
fn test_list_mutation_and_indexing() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(
        dir.path(),
        "t.hsle",
        "var L = [1,2,3] ; append(L, 4) ; printh(len(L)) ; printh(L/0)\n",
    );

    hustle()
        .args(["run", &script])
        .assert()
        .success()
        .stdout("4\n1\n");
}

#[test]
fn test_for_loop_prints_each_iteration() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "t.hsle", "for i = 0 to 3 then printh(i)\n");

    hustle()
        .args(["run", &script])
        .assert()
        .success()
        .stdout("0\n1\n2\n");
}

#[test]
fn test_while_loop_block() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(
        dir.path(),
        "t.hsle",
        "var i = 0 ; while i < 3 then ; var i = i + 1 ; printh(i) ; end\n",
    );

    hustle()
        .args(["run", &script])
        .assert()
        .success()
        .stdout("1\n2\n3\n");
}

#[test]
fn test_recursive_factorial() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(
        dir.path(),
        "t.hsle",
        "func fact(n) ; if n == 0 then return 1 ; return n * fact(n - 1) ; end ; printh(fact(5))\n",
    );

    hustle()
        .args(["run", &script])
        .assert()
        .success()
        .stdout("120\n");
}

#[test]
fn test_runtime_error_is_nonzero_exit() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "t.hsle", "printh(1 / 0)\n");

    hustle()
        .args(["run", &script])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Division by zero"))
        .stdout(predicate::str::contains("Traceback (most recent call last):"));
}

#[test]
fn test_syntax_error_shows_excerpt() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "t.hsle", "var = 5\n");

    hustle()
        .args(["run", &script])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Invalid Syntax"))
        .stdout(predicate::str::contains("Expected identifier"));
}

// ============================================================================
// Intrinsics observable only through the process
// ============================================================================

#[test]
fn test_exit_sets_the_process_status() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "t.hsle", "printh(1)\nExit(3)\nprinth(2)\n");

    hustle()
        .args(["run", &script])
        .assert()
        .code(3)
        .stdout("1\n");
}

#[test]
fn test_exit_with_string_prints_and_fails() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "t.hsle", "Exit(\"goodbye\")\n");

    hustle()
        .args(["run", &script])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("goodbye"));
}

#[test]
fn test_argv_reads_host_arguments() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "t.hsle", "printh(Argv[1] / 0)\n");

    hustle()
        .args(["run", &script, "bonus"])
        .assert()
        .success()
        .stdout("bonus\n");
}

#[test]
fn test_input_int_parses_stdin() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "t.hsle", "var n = input_int() ; printh(n + 1)\n");

    hustle()
        .args(["run", &script])
        .write_stdin("41\n")
        .assert()
        .success()
        .stdout("42\n");
}

#[test]
fn test_input_int_failure_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "t.hsle", "var n = input_int() ; printh(n)\n");

    hustle()
        .args(["run", &script])
        .write_stdin("not a number\n")
        .assert()
        .code(1);
}

#[test]
fn test_input_echo() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "t.hsle", "printh(input() + \"!\")\n");

    hustle()
        .args(["run", &script])
        .write_stdin("hi\n")
        .assert()
        .success()
        .stdout("hi!\n");
}

#[test]
fn test_include_stdlib_from_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    let stdlib = include_str!("../stdlib.hsle");
    write_script(dir.path(), "stdlib.hsle", stdlib);
    write_script(
        dir.path(),
        "t.hsle",
        "include(\"stdlib\")\nprinth(sum([1, 2, 3]))\nprinth(join(reverse([1, 2, 3]), \"-\"))\n",
    );

    hustle()
        .current_dir(dir.path())
        .args(["run", "t.hsle"])
        .assert()
        .success()
        .stdout("6\n3-2-1\n");
}

#[test]
fn test_nested_run_keeps_output_order() {
    let dir = tempfile::tempdir().unwrap();
    write_script(dir.path(), "inner.hsle", "printh(\"inner\")\n");
    write_script(
        dir.path(),
        "outer.hsle",
        "printh(\"before\")\nrun(\"inner.hsle\")\nprinth(\"after\")\n",
    );

    hustle()
        .current_dir(dir.path())
        .args(["run", "outer.hsle"])
        .assert()
        .success()
        .stdout("before\ninner\nafter\n");
}

// ============================================================================
// Driver surface
// ============================================================================

#[test]
fn test_no_subcommand_exits_one_with_usage() {
    hustle()
        .assert()
        .code(1)
        .stdout(predicate::str::contains("ERROR: No subcommand provided"))
        .stdout(predicate::str::contains("Subcommands are :-"));
}

#[test]
fn test_unknown_subcommand_exits_one() {
    hustle()
        .arg("frobnicate")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("ERROR: Unknown subcommand"));
}

#[test]
fn test_help_subcommand_exits_zero() {
    hustle()
        .arg("help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Subcommands are :-"));
}

#[test]
fn test_run_without_file_exits_one() {
    hustle()
        .arg("run")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("ERROR: No file provided"));
}

#[test]
fn test_run_with_missing_file_exits_one() {
    hustle()
        .args(["run", "definitely_missing.hsle"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Failed to load script"));
}

#[test]
fn test_com_is_a_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "t.hsle", "printh(1)\n");

    hustle()
        .args(["com", &script])
        .assert()
        .success()
        .stdout(predicate::str::contains("still in progress"));

    hustle()
        .args(["com", "-r", &script])
        .assert()
        .success()
        .stdout(predicate::str::contains("still in progress"));
}
