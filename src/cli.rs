//! CLI argument parsing for the artifact viewer.
//!
//! The CLI is intentionally thin: it resolves an input path and picks an
//! output format, so the panel pipeline can be reused elsewhere.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint for the viewer.
#[derive(Parser, Debug)]
#[command(
    name = "aview",
    version,
    about = "Read-only viewer for pipeline run artifacts",
    after_help = "Commands:\n  view --input <PATH>  Render artifact panels as plain text\n  json --input <PATH>  Emit the panel model as machine-readable JSON\n\nExamples:\n  aview view --input /tmp/run-artifacts\n  aview view --input /tmp/run-artifacts/receipt.json\n  aview json --input /tmp/run-artifacts",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level viewer commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    View(ViewArgs),
    Json(JsonArgs),
}

/// View command inputs.
#[derive(Parser, Debug)]
#[command(about = "Render artifact panels as plain text")]
pub struct ViewArgs {
    /// Run directory containing the artifact JSON files, or a single
    /// artifact file
    #[arg(long, value_name = "PATH")]
    pub input: PathBuf,
}

/// Json command inputs.
#[derive(Parser, Debug)]
#[command(about = "Emit the panel model as machine-readable JSON")]
pub struct JsonArgs {
    /// Run directory containing the artifact JSON files, or a single
    /// artifact file
    #[arg(long, value_name = "PATH")]
    pub input: PathBuf,
}
