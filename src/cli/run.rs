//! Command dispatch for the pyzod CLI.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

use super::args::{Arguments, Command, ParseCommand};
use super::exit_status::ExitStatus;
use super::report;
use crate::config::{CONFIG_FILE_NAME, Config, default_config_json, load_config};
use crate::extract::parse_models;

pub fn run(Arguments { command }: Arguments) -> Result<ExitStatus> {
    match command {
        Some(Command::Parse(cmd)) => parse(cmd),
        Some(Command::Init) => {
            init()?;
            Ok(ExitStatus::Success)
        }
        None => {
            anyhow::bail!("No command provided. Use --help to see available commands.")
        }
    }
}

fn parse(cmd: ParseCommand) -> Result<ExitStatus> {
    let config = resolve_config(&cmd)?;

    let parsed = parse_models(&cmd.module, &config)
        .with_context(|| format!("Failed to parse '{}'", cmd.module.display()))?;

    report::print(&parsed, cmd.format, cmd.common.verbose)?;
    Ok(ExitStatus::Success)
}

/// Configuration priority: CLI arguments > config file > built-in defaults.
/// The config file is searched upwards from the source root.
fn resolve_config(cmd: &ParseCommand) -> Result<Config> {
    let search_dir = cmd
        .common
        .source_root
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    let search_dir = search_dir
        .to_str()
        .map(Path::new)
        .ok_or_else(|| anyhow!("Invalid path: {:?}", cmd.common.source_root))?;

    let mut config = load_config(search_dir)?.config;
    if let Some(source_root) = &cmd.common.source_root {
        config.source_root = source_root.to_string_lossy().into_owned();
    }
    Ok(config)
}

fn init() -> Result<()> {
    let config_path = Path::new(CONFIG_FILE_NAME);
    if config_path.exists() {
        anyhow::bail!("{} already exists", CONFIG_FILE_NAME);
    }
    fs::write(config_path, default_config_json()?)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;
    println!("Created {}", CONFIG_FILE_NAME);
    Ok(())
}
