use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::query::{DEFAULT_MAX_LIMIT, PageOptions, RulerOptions};

use super::cli::CliConfig;
use super::constants::{APP_DOT_FOLDER, CONFIG_FILE_NAME};

// =============================================================================
// File Config (JSON)
// =============================================================================

/// Query configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct QueryFileConfig {
    pub max_limit: Option<i64>,
    pub whitelist: Option<Vec<String>>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub query: Option<QueryFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(query) = other.query {
            let current = self.query.get_or_insert_with(QueryFileConfig::default);
            if query.max_limit.is_some() {
                tracing::trace!(max_limit = ?query.max_limit, "Merging query.max_limit");
                current.max_limit = query.max_limit;
            }
            if query.whitelist.is_some() {
                tracing::trace!(whitelist = ?query.whitelist, "Merging query.whitelist");
                current.whitelist = query.whitelist;
            }
        }
    }
}

// =============================================================================
// Resolved Config
// =============================================================================

/// Query conversion settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    /// Upper bound for rows per page
    pub max_limit: i64,
    /// Allowed column names; `None` allows any name
    pub whitelist: Option<Vec<String>>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_limit: DEFAULT_MAX_LIMIT,
            whitelist: None,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub query: QueryConfig,
}

impl AppConfig {
    /// Load configuration with priority (later overrides earlier):
    /// 1. Built-in defaults
    /// 2. Profile directory config (~/.mgo-query/mgo-query.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        let overlay_path = if let Some(ref path) = cli.config {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Some(path.clone())
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let file_query = file_config.query.unwrap_or_default();
        let defaults = QueryConfig::default();
        let config = Self {
            query: QueryConfig {
                max_limit: cli
                    .max_limit
                    .or(file_query.max_limit)
                    .unwrap_or(defaults.max_limit),
                whitelist: cli.whitelist.clone().or(file_query.whitelist),
            },
        };

        config.validate()?;
        tracing::debug!(config = ?config, "Configuration resolved");
        Ok(config)
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        if self.query.max_limit <= 0 {
            anyhow::bail!(
                "Configuration error: query.max_limit must be greater than 0 (got {})",
                self.query.max_limit
            );
        }

        if let Some(whitelist) = &self.query.whitelist
            && whitelist.iter().any(|name| name.is_empty())
        {
            anyhow::bail!("Configuration error: query.whitelist must not contain empty names");
        }

        if let Some(whitelist) = &self.query.whitelist
            && whitelist.is_empty()
        {
            tracing::warn!("query.whitelist is empty, every column will be rejected");
        }

        Ok(())
    }

    pub fn ruler_options(&self) -> RulerOptions {
        match &self.query.whitelist {
            Some(names) => RulerOptions::new().with_whitelist(names.iter().cloned()),
            None => RulerOptions::new(),
        }
    }

    pub fn page_options(&self) -> PageOptions {
        PageOptions::default().with_max_limit(self.query.max_limit)
    }
}

/// Get the profile config path (~/.mgo-query/mgo-query.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}
