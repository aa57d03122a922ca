use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{InvokeError, Result};

pub const DEFAULT_BASE: &str = "/tmp/events/base_api_request.json";
pub const DEFAULT_OVERLAY: &str = "/tmp/events/prepare_shipment.json";
pub const DEFAULT_PROGRAM: &str = "aws-sam-local";
pub const DEFAULT_FUNCTION: &str = "LambdaFunction";
pub const DEFAULT_OUTPUT: &str = "text";

/// Keys accepted by `config set`.
pub const KEYS: &[&str] = &["base", "overlay", "log_file", "program", "function", "output"];

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct InvokeConfig {
    pub base: Option<String>,
    pub overlay: Option<String>,
    pub log_file: Option<String>,
    pub program: Option<String>,
    pub function: Option<String>,
    pub output: Option<String>,
}

impl InvokeConfig {
    /// A missing file yields the defaults. A file that exists but cannot be
    /// read or parsed is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| InvokeError::Config(format!("cannot read {}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| InvokeError::Config(format!("invalid TOML in {}: {e}", path.display())))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| InvokeError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn set(&mut self, key: &str, value: String) -> Result<()> {
        match key {
            "base" => self.base = Some(value),
            "overlay" => self.overlay = Some(value),
            "log_file" | "log-file" => self.log_file = Some(value),
            "program" => self.program = Some(value),
            "function" => self.function = Some(value),
            "output" => self.output = Some(value),
            _ => {
                return Err(InvokeError::Input(format!(
                    "Unknown key '{key}'. Valid keys: {}",
                    KEYS.join(", ")
                )));
            }
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "base" => self.base.as_deref(),
            "overlay" => self.overlay.as_deref(),
            "log_file" => self.log_file.as_deref(),
            "program" => self.program.as_deref(),
            "function" => self.function.as_deref(),
            "output" => self.output.as_deref(),
            _ => None,
        }
    }

    pub fn default_path() -> PathBuf {
        home().join(".invoke-api").join("config.toml")
    }
}

fn home() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

pub fn default_log_file() -> PathBuf {
    home().join("logs").join("api-gateway.log")
}

/// Built-in value for a config key, shown by `config get`.
pub fn default_for(key: &str) -> String {
    match key {
        "base" => DEFAULT_BASE.to_string(),
        "overlay" => DEFAULT_OVERLAY.to_string(),
        "log_file" => default_log_file().display().to_string(),
        "program" => DEFAULT_PROGRAM.to_string(),
        "function" => DEFAULT_FUNCTION.to_string(),
        "output" => DEFAULT_OUTPUT.to_string(),
        _ => String::new(),
    }
}

/// Values given on the command line or through the environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub base: Option<PathBuf>,
    pub overlay: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub program: Option<String>,
    pub function: Option<String>,
    pub output: Option<String>,
}

/// Everything one run needs, fully resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base: PathBuf,
    pub overlay: PathBuf,
    pub log_file: PathBuf,
    pub program: String,
    pub function: String,
    pub output: String,
}

impl Settings {
    /// Overrides win over the config file, which wins over the defaults.
    pub fn resolve(overrides: Overrides, cfg: InvokeConfig) -> Self {
        Self {
            base: overrides
                .base
                .or(cfg.base.map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_BASE)),
            overlay: overrides
                .overlay
                .or(cfg.overlay.map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OVERLAY)),
            log_file: overrides
                .log_file
                .or(cfg.log_file.map(PathBuf::from))
                .unwrap_or_else(default_log_file),
            program: overrides
                .program
                .or(cfg.program)
                .unwrap_or_else(|| DEFAULT_PROGRAM.into()),
            function: overrides
                .function
                .or(cfg.function)
                .unwrap_or_else(|| DEFAULT_FUNCTION.into()),
            output: overrides
                .output
                .or(cfg.output)
                .unwrap_or_else(|| DEFAULT_OUTPUT.into()),
        }
    }

    /// Arguments for `sam local invoke`, reading the event from stdin.
    pub fn program_args(&self) -> Vec<String> {
        vec![
            "local".into(),
            "invoke".into(),
            self.function.clone(),
            "--event".into(),
            "-".into(),
        ]
    }
}
