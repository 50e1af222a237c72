// Copyright © 2024 FaultPage. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Configuration Module
//!
//! Settings for the export tool: where exports are written, which kinds are
//! produced, and where template overrides live. Values come from a TOML
//! file, then environment variables, then explicit overrides, and the
//! result is validated once at the end.
//!
//! ## Example
//!
//! ```rust,no_run
//! use faultpage::core::config::ConfigBuilder;
//! use faultpage::export::OutputKind;
//!
//! let config = ConfigBuilder::new()
//!     .with_file("faultpage.toml")
//!     .with_env_prefix("FAULTPAGE_")
//!     .with_override("kinds", "python")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.kinds, vec![OutputKind::Python]);
//! ```

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};
use toml::Value as TomlValue;

use crate::export::OutputKind;
use crate::{FaultPageError, Result};

/// Export tool settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory the exports are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Optional directory of `*.hbs` files replacing the built-in wrappers.
    #[serde(default)]
    pub template_dir: Option<PathBuf>,

    /// Kinds produced by `export`.
    #[serde(default = "default_kinds")]
    pub kinds: Vec<OutputKind>,

    /// Drop `time`, `ray_id` and `client_ip` before generating.
    #[serde(default = "default_true")]
    pub strip_transient: bool,

    /// Keep markup in the free-text fields when preparing render params.
    #[serde(default = "default_true")]
    pub allow_html: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            template_dir: None,
            kinds: default_kinds(),
            strip_transient: true,
            allow_html: true,
        }
    }
}

impl Config {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        validate_config(self)
    }
}

/// Builds a [`Config`] from a file, environment variables and overrides.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config_file: Option<PathBuf>,
    env_prefix: Option<String>,
    overrides: HashMap<String, TomlValue>,
}

impl ConfigBuilder {
    /// Initialises a new `ConfigBuilder` instance with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a TOML configuration file.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Reads overrides from environment variables starting with `prefix`,
    /// e.g. `FAULTPAGE_OUTPUT_DIR`.
    pub fn with_env_prefix<S: Into<String>>(
        mut self,
        prefix: S,
    ) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Adds a key-value pair to override configuration values.
    pub fn with_override<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<TomlValue>,
    {
        _ = self.overrides.insert(key.into(), value.into());
        self
    }

    /// Builds the final configuration by applying all specified settings
    /// and overrides, then validates it.
    pub fn build(self) -> Result<Config> {
        let mut config = if let Some(path) = self.config_file {
            load_from_file(&path)?
        } else {
            Config::default()
        };

        if let Some(prefix) = self.env_prefix {
            apply_env_overrides(&mut config, &prefix)?;
        }

        apply_overrides(&mut config, &self.overrides)?;
        validate_config(&config)?;
        debug!("Resolved configuration: {:?}", config);

        Ok(config)
    }
}

// Internal helper functions

fn load_from_file(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| {
        FaultPageError::config_error(
            format!("Failed to read config file: {}", e),
            Some(path.to_path_buf()),
        )
    })?;

    toml::from_str(&content).map_err(|e| {
        FaultPageError::config_error(
            format!("Failed to parse config file: {}", e),
            Some(path.to_path_buf()),
        )
    })
}

fn apply_env_overrides(config: &mut Config, prefix: &str) -> Result<()> {
    for (key, value) in env::vars() {
        // Strip the prefix and ensure no leading underscores remain
        if let Some(stripped) = key.strip_prefix(prefix) {
            let config_key =
                stripped.trim_start_matches('_').to_lowercase();
            apply_config_value(config, &config_key, &value)?;
        }
    }
    Ok(())
}

fn apply_overrides(
    config: &mut Config,
    overrides: &HashMap<String, TomlValue>,
) -> Result<()> {
    for (key, value) in overrides {
        let value = match value {
            TomlValue::String(s) => s.clone(),
            TomlValue::Array(items) => items
                .iter()
                .map(|item| match item {
                    TomlValue::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            other => other.to_string(),
        };
        apply_config_value(config, key, &value)?;
    }
    Ok(())
}

fn apply_config_value(
    config: &mut Config,
    key: &str,
    value: &str,
) -> Result<()> {
    match key {
        "output_dir" => config.output_dir = PathBuf::from(value),
        "template_dir" => {
            config.template_dir = (!value.is_empty()).then(|| PathBuf::from(value))
        }
        "kinds" => {
            config.kinds = value
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::parse)
                .collect::<Result<Vec<OutputKind>>>()?;
        }
        "strip_transient" => {
            config.strip_transient = parse_bool(key, value)?
        }
        "allow_html" => config.allow_html = parse_bool(key, value)?,
        _ => {
            return Err(FaultPageError::config_error(
                format!("Unknown configuration key: {}", key),
                None,
            ));
        }
    }
    Ok(())
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    value.trim().parse().map_err(|e| {
        FaultPageError::config_error(
            format!("Invalid {} value '{}': {}", key, value, e),
            None,
        )
    })
}

fn validate_config(config: &Config) -> Result<()> {
    if config.kinds.is_empty() {
        return Err(FaultPageError::config_error(
            "No output kinds specified",
            None,
        ));
    }

    if let Some(template_dir) = &config.template_dir {
        if !template_dir.is_dir() {
            return Err(FaultPageError::config_error(
                format!(
                    "template directory does not exist: {}",
                    template_dir.display()
                ),
                Some(template_dir.clone()),
            ));
        }
    }

    if config.output_dir.exists() && !config.output_dir.is_dir() {
        return Err(FaultPageError::config_error(
            format!(
                "output path is not a directory: {}",
                config.output_dir.display()
            ),
            Some(config.output_dir.clone()),
        ));
    }

    Ok(())
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("exports")
}

fn default_kinds() -> Vec<OutputKind> {
    OutputKind::ALL.to_vec()
}
