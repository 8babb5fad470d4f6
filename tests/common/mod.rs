//! Shared test infrastructure for integration tests.

use std::path::Path;
use std::process::{Command, Output};

/// Run the viewer binary with the given subcommand against an input path.
pub fn run_aview(subcommand: &str, input: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_aview"))
        .arg(subcommand)
        .arg("--input")
        .arg(input)
        .output()
        .expect("spawn aview")
}

pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent directory");
    }
    std::fs::write(path, contents).expect("write file");
}

pub fn stdout_text(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("utf-8 stdout")
}
