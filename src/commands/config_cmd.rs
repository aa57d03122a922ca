use clap::Subcommand;
use std::path::Path;

use crate::config::{self, InvokeConfig};
use crate::error::Result;
use crate::output;

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Show the stored configuration
    Get,
    /// Store a configuration value
    Set {
        /// Key to set (base, overlay, log_file, program, function, output)
        key: String,
        /// Value
        value: String,
    },
}

pub fn run(cmd: ConfigCmd, config_path: &Path, output_format: &str) -> Result<()> {
    output::check_format(output_format)?;
    match cmd {
        ConfigCmd::Get => {
            let cfg = InvokeConfig::load(config_path)?;
            if output_format == "json" || output_format == "yaml" {
                let value = serde_json::to_value(&cfg)?;
                print!("{}", output::format_value(&value, output_format)?);
            } else {
                for key in config::KEYS {
                    let shown = match cfg.get(key) {
                        Some(v) => v.to_string(),
                        None => format!("(default: {})", config::default_for(key)),
                    };
                    println!("{:<10} {shown}", format!("{key}:"));
                }
            }
        }
        ConfigCmd::Set { key, value } => {
            let mut cfg = InvokeConfig::load(config_path)?;
            cfg.set(&key, value)?;
            cfg.save(config_path)?;
            output::print_success(&format!("Set '{key}' in {}", config_path.display()));
        }
    }
    Ok(())
}
