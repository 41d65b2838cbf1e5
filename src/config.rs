use std::path::PathBuf;

use clap::Args;
use tracing_subscriber::EnvFilter;

use crate::error::ConfigError;

pub const DEFAULT_MODEL_PATH: &str = "churn_model.json";
pub const DEFAULT_DATASET_PATH: &str = "Telco-Customer-Churn.csv";

/// Process-wide settings shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct Config {
    /// Trained model artifact (JSON)
    #[arg(
        long = "model",
        env = "CHURN_MODEL_PATH",
        default_value = DEFAULT_MODEL_PATH,
        global = true
    )]
    pub model_path: PathBuf,
    /// Historical churn dataset (CSV)
    #[arg(
        long = "dataset",
        env = "CHURN_DATASET_PATH",
        default_value = DEFAULT_DATASET_PATH,
        global = true
    )]
    pub dataset_path: PathBuf,
    /// Log filter, e.g. `info` or `churn_predictor=debug`
    #[arg(long, env = "CHURN_LOG", default_value = "warn", global = true)]
    pub log_level: String,
}

impl Config {
    pub fn init_logging(&self) -> Result<(), ConfigError> {
        let filter = EnvFilter::try_new(&self.log_level)
            .map_err(|_| ConfigError::LogFilter(self.log_level.clone()))?;

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        config: Config,
    }

    #[test]
    fn defaults_match_original_file_names() {
        let cli = TestCli::try_parse_from(["test"]).unwrap();
        if std::env::var_os("CHURN_MODEL_PATH").is_none() {
            assert_eq!(cli.config.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
        }
        if std::env::var_os("CHURN_DATASET_PATH").is_none() {
            assert_eq!(cli.config.dataset_path, PathBuf::from(DEFAULT_DATASET_PATH));
        }
    }

    #[test]
    fn flags_override_paths() {
        let cli = TestCli::try_parse_from([
            "test",
            "--model",
            "models/tree.json",
            "--dataset",
            "data/telco.csv",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.config.model_path, PathBuf::from("models/tree.json"));
        assert_eq!(cli.config.dataset_path, PathBuf::from("data/telco.csv"));
        assert_eq!(cli.config.log_level, "debug");
    }
}
