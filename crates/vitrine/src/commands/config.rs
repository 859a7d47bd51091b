//! Config commands

use anyhow::{Context, Result};
use camino::Utf8Path;
use vitrine_catalog::InstallEnvironment;

use super::{load_config, print_json};
use crate::cli::ConfigCommands;
use crate::output;

pub fn run(command: ConfigCommands, config_path: Option<&Utf8Path>) -> Result<()> {
    match command {
        ConfigCommands::Show { json } => show(json, config_path),
    }
}

fn show(json: bool, config_path: Option<&Utf8Path>) -> Result<()> {
    let config = load_config(config_path)?;

    if json {
        return print_json(&config);
    }

    let environment = InstallEnvironment::from_setting(config.environment, &config.requirements_file);
    output::kv("Install environment", environment.as_str());
    println!();

    let yaml = serde_yaml_ng::to_string(&config).context("Failed to serialize configuration")?;
    print!("{}", yaml);
    Ok(())
}
