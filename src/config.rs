use anyhow::{bail, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::api_connection::connection::ollama_url_from_env;
use crate::cli::Cli;

/// Runtime settings resolved from command-line flags and `OLLAMA_URL`.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_file: PathBuf,
    pub ollama_url: String,
    pub model: String,
    pub timeout: Duration,
    pub use_model: bool,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        Self::build(cli, ollama_url_from_env())
    }

    fn build(cli: &Cli, ollama_url: String) -> Result<Self> {
        if cli.timeout_secs == 0 {
            bail!("--timeout-secs must be greater than zero");
        }
        if cli.model.trim().is_empty() {
            bail!("--model must not be empty");
        }
        Ok(Self {
            data_file: cli.data_file.clone(),
            ollama_url,
            model: cli.model.trim().to_string(),
            timeout: Duration::from_secs(cli.timeout_secs),
            use_model: !cli.no_model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_config_from_flags() {
        let cli = Cli::parse_from(["recipe_buddy", "--timeout-secs", "5", "--no-model", "pull-model"]);
        let config = Config::build(&cli, "http://localhost:11434".to_string()).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(!config.use_model);
        assert_eq!(config.ollama_url, "http://localhost:11434");
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let cli = Cli::parse_from(["recipe_buddy", "--timeout-secs", "0", "pull-model"]);
        assert!(Config::build(&cli, "http://x".to_string()).is_err());
    }
}
