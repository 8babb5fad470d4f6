use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

mod cli;
mod enrich;
mod loader;
mod panel;
mod render;
mod util;

use cli::{Command, JsonArgs, RootArgs, ViewArgs};
use loader::LoadedArtifacts;
use panel::{Panel, PanelReport, PANEL_SCHEMA_VERSION};

fn main() -> Result<ExitCode> {
    init_tracing();
    let args = RootArgs::parse();
    match args.command {
        Command::View(args) => cmd_view(args),
        Command::Json(args) => cmd_json(args),
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_view(args: ViewArgs) -> Result<ExitCode> {
    let (artifacts, panels) = resolve_panels(&args.input)?;
    print!("{}", render::render_text(&panels));
    Ok(exit_code(&artifacts))
}

fn cmd_json(args: JsonArgs) -> Result<ExitCode> {
    let (artifacts, panels) = resolve_panels(&args.input)?;
    let report = PanelReport {
        schema_version: PANEL_SCHEMA_VERSION,
        panels,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(exit_code(&artifacts))
}

fn resolve_panels(input: &std::path::Path) -> Result<(LoadedArtifacts, Vec<Panel>)> {
    let artifacts = loader::load(input)?;
    let mut panels = panel::build_panels(&artifacts);
    enrich::apply(&artifacts, &mut panels);
    Ok((artifacts, panels))
}

/// Degraded artifacts still render, but the exit code records partial
/// success so callers can tell.
fn exit_code(artifacts: &LoadedArtifacts) -> ExitCode {
    if artifacts.has_malformed() {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    }
}
