//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.na-kasem.toml` files.

use crate::analysis::{RangePreset, HEBREW_LOCALE};
use crate::models::Granularity;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = ".na-kasem.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Input file locations.
    #[serde(default)]
    pub data: DataConfig,

    /// Analysis settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default report path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "sales_report.md".to_string()
}

/// Where the dashboard exports live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Sales notes export (JSON array).
    #[serde(default = "default_notes")]
    pub notes: PathBuf,

    /// Client directory export (JSON array or keyed object).
    #[serde(default)]
    pub clients: Option<PathBuf>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            notes: default_notes(),
            clients: None,
        }
    }
}

fn default_notes() -> PathBuf {
    PathBuf::from("notes.json")
}

/// Analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Timeline granularity. Unset picks one from the range length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granularity: Option<Granularity>,

    /// Rows in product/client rankings.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Locale for ordering timeline labels.
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Default range when none is given on the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<RangePreset>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            granularity: None,
            top_n: default_top_n(),
            locale: default_locale(),
            range: None,
        }
    }
}

fn default_top_n() -> usize {
    5
}

fn default_locale() -> String {
    HEBREW_LOCALE.to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.na-kasem.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref notes) = args.notes {
            self.data.notes = notes.clone();
        }
        if let Some(ref clients) = args.clients {
            self.data.clients = Some(clients.clone());
        }
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }

        if let Some(ref granularity) = args.granularity {
            self.analysis.granularity = Some(Granularity::from(granularity.as_str()));
        }
        if let Some(top) = args.top {
            self.analysis.top_n = top;
        }
        if let Some(ref locale) = args.locale {
            self.analysis.locale = locale.clone();
        }

        // explicit bounds replace any configured preset
        if args.range.is_some() || args.from.is_some() || args.to.is_some() {
            self.analysis.range = args.range;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.output, "sales_report.md");
        assert_eq!(config.data.notes, PathBuf::from("notes.json"));
        assert_eq!(config.analysis.top_n, 5);
        assert_eq!(config.analysis.locale, "he-IL");
        assert!(config.analysis.granularity.is_none());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "march.md"
verbose = true

[data]
notes = "exports/notes.json"
clients = "exports/clients.json"

[analysis]
granularity = "week"
top_n = 10
range = "quarter"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, "march.md");
        assert!(config.general.verbose);
        assert_eq!(config.data.notes, PathBuf::from("exports/notes.json"));
        assert_eq!(config.data.clients, Some(PathBuf::from("exports/clients.json")));
        assert_eq!(config.analysis.granularity, Some(Granularity::Week));
        assert_eq!(config.analysis.top_n, 10);
        assert_eq!(config.analysis.range, Some(RangePreset::Quarter));
        assert_eq!(config.analysis.locale, "he-IL");
    }

    #[test]
    fn test_unknown_granularity_falls_back() {
        let config: Config = toml::from_str("[analysis]\ngranularity = \"hourly\"\n").unwrap();
        assert_eq!(config.analysis.granularity, Some(Granularity::Day));
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[data]"));
        assert!(toml_str.contains("[analysis]"));

        let reparsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(reparsed.analysis.top_n, 5);
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[analysis]\ntop_n = 3\n").unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.analysis.top_n, 3);

        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[analysis\n").unwrap();
        assert!(Config::load_from_dir(dir.path()).is_err());
    }

    #[test]
    fn test_verbose_setting_raises_log_level() {
        let mut config: Config = toml::from_str("[general]\nverbose = true\n").unwrap();
        let args = crate::cli::Args::parse_from(["na-kasem-analytics"]);
        config.merge_with_args(&args);
        assert_eq!(args.log_level(config.general.verbose), tracing::Level::DEBUG);

        let quiet = crate::cli::Args::parse_from(["na-kasem-analytics", "--quiet"]);
        assert_eq!(quiet.log_level(config.general.verbose), tracing::Level::ERROR);

        let mut config = Config::default();
        let verbose = crate::cli::Args::parse_from(["na-kasem-analytics", "-v"]);
        config.merge_with_args(&verbose);
        assert!(config.general.verbose);
    }

    #[test]
    fn test_merge_with_args() {
        let mut config: Config = toml::from_str("[analysis]\nrange = \"year\"\ntop_n = 8\n").unwrap();
        let args = crate::cli::Args::parse_from([
            "na-kasem-analytics",
            "--notes",
            "other.json",
            "--granularity",
            "month",
            "--from",
            "2024-01-01",
            "--to",
            "2024-01-31",
        ]);

        config.merge_with_args(&args);
        assert_eq!(config.data.notes, PathBuf::from("other.json"));
        assert_eq!(config.analysis.granularity, Some(Granularity::Month));
        assert_eq!(config.analysis.top_n, 8);
        assert!(config.analysis.range.is_none());
    }
}
