use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::constants::{APP_NAME, ENV_CONFIG, ENV_MAX_LIMIT, ENV_WHITELIST};

#[derive(Parser)]
#[command(name = APP_NAME)]
#[command(version, about = "Convert query conditions into MongoDB filters", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Maximum rows per page (values below 10 are raised to 10)
    #[arg(long, global = true, env = ENV_MAX_LIMIT)]
    pub max_limit: Option<i64>,

    /// Allowed column names, comma-separated
    #[arg(long, global = true, env = ENV_WHITELIST, value_delimiter = ',')]
    pub whitelist: Option<Vec<String>>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Convert query columns into a MongoDB filter (default command)
    Filter {
        /// Query JSON file (reads stdin when omitted)
        #[arg(long, short = 'i')]
        input: Option<PathBuf>,
    },
    /// Convert page, limit and sort into sort/limit/skip
    Page {
        /// Query JSON file (reads stdin when omitted)
        #[arg(long, short = 'i')]
        input: Option<PathBuf>,
    },
    /// Check a conditions document without converting it
    Check {
        /// Conditions JSON file (reads stdin when omitted)
        #[arg(long, short = 'i')]
        input: Option<PathBuf>,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub config: Option<PathBuf>,
    pub max_limit: Option<i64>,
    pub whitelist: Option<Vec<String>>,
    pub pretty: bool,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig {
        config: cli.config,
        max_limit: cli.max_limit,
        whitelist: cli.whitelist,
        pretty: cli.pretty,
    };
    (config, cli.command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults_to_no_command() {
        let cli = Cli::try_parse_from(["mgo-query"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.pretty);
    }

    #[test]
    fn test_parse_whitelist_is_comma_separated() {
        let cli = Cli::try_parse_from(["mgo-query", "--whitelist", "name,age", "filter"]).unwrap();
        assert_eq!(
            cli.whitelist,
            Some(vec!["name".to_string(), "age".to_string()])
        );
        assert!(matches!(cli.command, Some(Commands::Filter { input: None })));
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "mgo-query",
            "page",
            "--input",
            "query.json",
            "--max-limit",
            "50",
            "--pretty",
        ])
        .unwrap();
        assert_eq!(cli.max_limit, Some(50));
        assert!(cli.pretty);
        match cli.command {
            Some(Commands::Page { input }) => assert_eq!(input, Some(PathBuf::from("query.json"))),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
