//! Core application

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use bson::Bson;
use serde_json::{Value as JsonValue, json};

use crate::core::cli::{self, Commands};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, DEFAULT_LOG_LEVEL, ENV_LOG};
use crate::query::{QueryError, parse_conditions, parse_params};

pub struct CoreApp {
    pub config: AppConfig,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        let app = Self::new(AppConfig::load(&cli_config)?);
        let command = command.unwrap_or(Commands::Filter { input: None });

        let output = match command {
            Commands::Filter { input } => app.filter(&read_input(input.as_deref())?)?,
            Commands::Page { input } => app.page(&read_input(input.as_deref())?)?,
            Commands::Check { input } => app.check(&read_input(input.as_deref())?)?,
        };

        let rendered = if cli_config.pretty {
            serde_json::to_string_pretty(&output)?
        } else {
            serde_json::to_string(&output)?
        };
        println!("{}", rendered);
        Ok(())
    }

    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    fn init_logging() {
        let default_filter = format!("{},{}={}", DEFAULT_LOG_LEVEL, APP_NAME_LOWER, DEFAULT_LOG_LEVEL);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_writer(io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    /// Convert a query document into a MongoDB filter (relaxed extended JSON)
    pub fn filter(&self, json_str: &str) -> Result<JsonValue> {
        let params = parse_params(json_str).map_err(reject)?;
        let filter = params
            .convert_to_mongo_filter(&self.config.ruler_options())
            .map_err(reject)?;
        Ok(Bson::Document(filter).into_relaxed_extjson())
    }

    /// Convert a query document into sort/limit/skip
    pub fn page(&self, json_str: &str) -> Result<JsonValue> {
        let params = parse_params(json_str).map_err(reject)?;
        let spec = params.convert_to_page(&self.config.page_options());
        Ok(json!({
            "sort": Bson::Document(spec.sort).into_relaxed_extjson(),
            "limit": spec.limit,
            "skip": spec.skip,
        }))
    }

    /// Check a conditions document without converting it
    pub fn check(&self, json_str: &str) -> Result<JsonValue> {
        let conditions = parse_conditions(json_str).map_err(reject)?;
        conditions.check_valid().map_err(reject)?;
        Ok(json!({
            "valid": true,
            "columns": conditions.columns.len(),
        }))
    }
}

fn reject(e: QueryError) -> anyhow::Error {
    tracing::debug!(code = e.code(), error = %e, "Query rejected");
    anyhow::anyhow!("[{}] {}", e.code(), e)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read input from stdin")?;
            Ok(buf)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::QueryConfig;
    use std::io::Write;

    fn app() -> CoreApp {
        CoreApp::new(AppConfig::default())
    }

    #[test]
    fn test_filter_outputs_extended_json() {
        let json = r#"{"columns": [
            {"name": "id", "value": "507f1f77bcf86cd799439011", "logic": "or"},
            {"name": "age", "exp": ">", "value": 18}
        ]}"#;
        let output = app().filter(json).unwrap();
        assert_eq!(
            output,
            json!({"$or": [
                {"_id": {"$oid": "507f1f77bcf86cd799439011"}},
                {"age": {"$gt": 18}}
            ]})
        );
    }

    #[test]
    fn test_filter_empty_columns() {
        assert_eq!(app().filter("{}").unwrap(), json!({}));
    }

    #[test]
    fn test_filter_respects_whitelist() {
        let app = CoreApp::new(AppConfig {
            query: QueryConfig {
                whitelist: Some(vec!["age".to_string()]),
                ..Default::default()
            },
        });
        let err = app
            .filter(r#"{"columns": [{"name": "name", "value": "tom"}]}"#)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "[INVALID_FILTER_COLUMN] field name 'name' is not allowed"
        );
    }

    #[test]
    fn test_filter_invalid_json() {
        let err = app().filter("nope").unwrap_err();
        assert!(err.to_string().starts_with("[INVALID_FILTER_JSON]"));
    }

    #[test]
    fn test_page_output() {
        let output = app()
            .page(r#"{"page": 2, "limit": 25, "sort": "-id,name"}"#)
            .unwrap();
        assert_eq!(
            output,
            json!({"sort": {"_id": -1, "name": 1}, "limit": 25, "skip": 50})
        );
    }

    #[test]
    fn test_check_output() {
        let output = app()
            .check(r#"{"columns": [{"name": "age", "exp": ">=", "value": 18}]}"#)
            .unwrap();
        assert_eq!(output, json!({"valid": true, "columns": 1}));

        let err = app().check(r#"{"columns": []}"#).unwrap_err();
        assert!(err.to_string().starts_with("[EMPTY_FILTER]"));
    }

    #[test]
    fn test_read_input_from_file() {
        let mut temp_file = tempfile::NamedTempFile::new().unwrap();
        temp_file.write_all(b"{\"page\": 1}").unwrap();
        let content = read_input(Some(temp_file.path())).unwrap();
        assert_eq!(content, "{\"page\": 1}");
    }

    #[test]
    fn test_read_input_missing_file() {
        let err = read_input(Some(Path::new("/nonexistent/query.json"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read input file"));
    }
}
