// ABOUTME: Constants shared by the driver and the interpreter

/// Canonical extension for Hustle source files, enforced by `include` and
/// expected by `run` when loading from inside the language.
pub const HUSTLE_EXT: &str = ".hsle";

/// File that `include("all")` and `include("stdlib")` resolve to, relative
/// to the host process's working directory.
pub const STDLIB_FILE: &str = "stdlib.hsle";

/// Default call-depth cap. Deep recursion is reported as a runtime error
/// instead of overflowing the host stack.
pub const MAX_CALL_DEPTH: usize = 1024;

pub const USAGE: &str = "Subcommands are :-
    run    <filepath>              - interprete the program.
    com    <filepath>              - compile the program.
    help                           - print this help screen.";
