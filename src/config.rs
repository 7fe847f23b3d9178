//! Configuration management for the checker
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (protocompat.toml)
//! - Environment variables (PROTOCOMPAT__*)
//!
//! ## Example config file (protocompat.toml):
//! ```toml
//! [report]
//! suppress_warnings = false
//! format = "text"
//!
//! [defaults.newer]
//! path = "build/schemas/next.pb"
//! include_dirs = ["build/schemas"]
//!
//! [defaults.older]
//! path = "build/schemas/released.pb"
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::descriptor::SchemaLocation;
use crate::error::Result;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompatConfig {
    /// Report settings
    #[serde(default)]
    pub report: ReportConfig,

    /// Locations compared when none are given on the command line
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// Report configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Leave the WARNING section out of text output
    #[serde(default)]
    pub suppress_warnings: bool,

    /// Output format (text or json)
    #[serde(default)]
    pub format: OutputFormat,
}

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default)]
    pub newer: Option<LocationConfig>,
    #[serde(default)]
    pub older: Option<LocationConfig>,
}

/// A schema location as written in config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub include_dirs: Vec<PathBuf>,
}

impl From<&LocationConfig> for SchemaLocation {
    fn from(location: &LocationConfig) -> Self {
        SchemaLocation {
            path: location.path.clone(),
            include_dirs: location.include_dirs.clone(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            suppress_warnings: false,
            format: OutputFormat::Text,
        }
    }
}

impl DefaultsConfig {
    /// Both default locations, if both are configured
    pub fn pair(&self) -> Option<(SchemaLocation, SchemaLocation)> {
        match (&self.newer, &self.older) {
            (Some(newer), Some(older)) => Some((newer.into(), older.into())),
            _ => None,
        }
    }
}

impl CompatConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, layering an explicit file over the default locations
    pub fn load_from(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = [
            "protocompat.toml",
            ".protocompat.toml",
            "config/protocompat.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        let project_dirs = directories::ProjectDirs::from("dev", "proto-compat", "protocompat");
        if let Some(config_dir) = project_dirs {
            let xdg_config = config_dir.config_dir().join("protocompat.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // PROTOCOMPAT__REPORT__SUPPRESS_WARNINGS=true
        builder = builder.add_source(
            Environment::with_prefix("PROTOCOMPAT")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}
