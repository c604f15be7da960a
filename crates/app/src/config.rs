//! `daric.toml`: where statements come from and how the dashboard opens.
//!
//! ```toml
//! top_n = 5
//! default_filter = "previous_month"
//! category_map = "categories.json"
//!
//! [source]
//! kind = "local"
//! account_dir = "statements/account"
//! credit_card_dir = "statements/card"
//!
//! [exclude]
//! account = ["Pagamento de fatura"]
//! credit_card = ["Pagamento recebido"]
//! ```
//!
//! Relative paths are taken from the directory holding the file.

use anyhow::{bail, Context, Result};
use daric_core::DEFAULT_TOP_N;
use daric_import::{DataSource, IngestOptions, LocalFolderSource, SampleSource, StatementLayout};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "daric.toml";

/// Platform config location, e.g. `~/.config/daric/daric.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "daric", "Daric").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterPreset {
    #[default]
    All,
    PreviousMonth,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    #[default]
    Sample,
    Local {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        account_dir: Option<PathBuf>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        credit_card_dir: Option<PathBuf>,
    },
}

/// Statement lines dropped before unification, per format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exclusions {
    #[serde(default = "default_account_exclusions")]
    pub account: Vec<String>,
    #[serde(default = "default_credit_card_exclusions")]
    pub credit_card: Vec<String>,
}

fn default_account_exclusions() -> Vec<String> {
    StatementLayout::account().excluded_descriptions
}

fn default_credit_card_exclusions() -> Vec<String> {
    StatementLayout::credit_card().excluded_descriptions
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

impl Default for Exclusions {
    fn default() -> Self {
        Self {
            account: default_account_exclusions(),
            credit_card: default_credit_card_exclusions(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default)]
    pub default_filter: FilterPreset,
    /// JSON description → category map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_map: Option<PathBuf>,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub exclude: Exclusions,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            default_filter: FilterPreset::default(),
            category_map: None,
            source: SourceConfig::default(),
            exclude: Exclusions::default(),
        }
    }
}

impl AppConfig {
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Invalid configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::from_toml(&contents).with_context(|| format!("In {}", path.display()))?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// An explicit path must exist; the platform default may be absent, in
    /// which case the built-in defaults apply.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.is_file() {
                bail!("Config file not found: {}", path.display());
            }
            return Self::load(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => {
                tracing::debug!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        if let Some(path) = &mut self.category_map {
            resolve(path);
        }
        if let SourceConfig::Local {
            account_dir,
            credit_card_dir,
        } = &mut self.source
        {
            account_dir.iter_mut().for_each(resolve);
            credit_card_dir.iter_mut().for_each(resolve);
        }
    }

    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            account_layout: StatementLayout::account().with_excluded_descriptions(self.exclude.account.clone()),
            credit_card_layout: StatementLayout::credit_card()
                .with_excluded_descriptions(self.exclude.credit_card.clone()),
            top_n: self.top_n,
        }
    }

    pub fn data_source(&self) -> Box<dyn DataSource> {
        match &self.source {
            SourceConfig::Sample => Box::new(SampleSource),
            SourceConfig::Local {
                account_dir,
                credit_card_dir,
            } => Box::new(LocalFolderSource::new(account_dir.clone(), credit_card_dir.clone())),
        }
    }
}
