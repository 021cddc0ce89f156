//! CLI arguments and their mapping onto `PipelineConfig`.
//!
//! 優先順位: デフォルト < `--config` の JSON < 個別フラグ

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use sieve_core::app::ConfigError;
use sieve_core::{PipelineConfig, TerminationPolicy};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("cannot read config file {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Build(#[from] sieve_core::app::BuildError),

    #[error(transparent)]
    Pipeline(#[from] sieve_core::PipelineError),

    #[error(transparent)]
    Sink(#[from] sieve_core::ports::SinkError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FaultMode {
    /// Corrupt each task with `--malformed-probability`.
    Random,
    /// Corrupt tasks created at an odd nanosecond.
    OddNanosecond,
    /// Never corrupt.
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Generate tasks, sort them into fresh and stale, report the results.
#[derive(Parser, Debug)]
#[command(name = "sieve", version)]
pub struct Cli {
    /// JSON pipeline config. Flags below override its values.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of concurrent workers.
    #[arg(long)]
    pub workers: Option<usize>,

    /// Capacity of the generator → worker channel.
    #[arg(long)]
    pub capacity: Option<usize>,

    /// Maximum task age, in milliseconds, that still counts as fresh.
    #[arg(long, value_name = "MS")]
    pub staleness_ms: Option<u64>,

    /// Probability that a generated task has a malformed timestamp.
    #[arg(long)]
    pub malformed_probability: Option<f64>,

    /// Upper bound of the simulated processing delay, in milliseconds.
    #[arg(long, value_name = "MS")]
    pub jitter_ms: Option<u64>,

    /// Stop after this many tasks.
    #[arg(long)]
    pub max_tasks: Option<u64>,

    /// Stop after this many milliseconds.
    #[arg(long, value_name = "MS")]
    pub duration_ms: Option<u64>,

    /// Ignore configured limits and run until Ctrl-C.
    #[arg(long, conflicts_with_all = ["max_tasks", "duration_ms"])]
    pub until_interrupted: bool,

    #[arg(long, value_enum, default_value = "random")]
    pub fault: FaultMode,

    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Enable debug logging.
    #[arg(long)]
    pub verbose: bool,
}

impl Cli {
    pub fn to_config(&self) -> Result<PipelineConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| CliError::ReadConfig {
                    path: path.clone(),
                    source,
                })?;
                PipelineConfig::from_json_str(&raw)?
            }
            None => PipelineConfig::default(),
        };

        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(capacity) = self.capacity {
            config.generated_capacity = capacity;
        }
        if let Some(ms) = self.staleness_ms {
            config.staleness_threshold = Duration::from_millis(ms);
        }
        if let Some(p) = self.malformed_probability {
            config.malformed_probability = p;
        }
        if let Some(ms) = self.jitter_ms {
            config.max_jitter = Duration::from_millis(ms);
        }

        // 上限フラグがあれば停止条件はフラグだけで決める
        if self.until_interrupted {
            config.termination = TerminationPolicy::manual();
        } else if self.max_tasks.is_some() || self.duration_ms.is_some() {
            config.termination = TerminationPolicy {
                max_tasks: self.max_tasks,
                max_duration: self.duration_ms.map(Duration::from_millis),
            };
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("sieve").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn no_flags_give_the_default_config() {
        let config = parse(&[]).to_config().unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn flags_override_fields() {
        let config = parse(&[
            "--workers",
            "8",
            "--capacity",
            "32",
            "--staleness-ms",
            "5000",
            "--malformed-probability",
            "0.1",
            "--jitter-ms",
            "0",
            "--max-tasks",
            "100",
        ])
        .to_config()
        .unwrap();

        assert_eq!(config.workers, 8);
        assert_eq!(config.generated_capacity, 32);
        assert_eq!(config.staleness_threshold, Duration::from_secs(5));
        assert_eq!(config.malformed_probability, 0.1);
        assert_eq!(config.max_jitter, Duration::ZERO);
        assert_eq!(config.termination, TerminationPolicy::after_tasks(100));
    }

    #[test]
    fn until_interrupted_clears_the_limits() {
        let config = parse(&["--until-interrupted"]).to_config().unwrap();
        assert!(config.termination.is_manual());
    }

    #[test]
    fn until_interrupted_conflicts_with_limits() {
        let result = Cli::try_parse_from(["sieve", "--until-interrupted", "--max-tasks", "3"]);
        assert!(result.is_err());
    }

    #[test]
    fn invalid_values_are_reported() {
        let err = parse(&["--workers", "0"]).to_config().unwrap_err();
        assert!(matches!(err, CliError::Config(ConfigError::ZeroWorkers)));
    }

    #[test]
    fn missing_config_file_is_reported() {
        let err = parse(&["--config", "/definitely/not/here.json"])
            .to_config()
            .unwrap_err();
        assert!(matches!(err, CliError::ReadConfig { .. }));
    }

    #[rstest]
    #[case(&[], FaultMode::Random, OutputFormat::Text)]
    #[case(&["--fault", "odd-nanosecond"], FaultMode::OddNanosecond, OutputFormat::Text)]
    #[case(&["--fault", "never", "--output", "json"], FaultMode::Never, OutputFormat::Json)]
    fn enums_parse_from_kebab_case(
        #[case] args: &[&str],
        #[case] fault: FaultMode,
        #[case] output: OutputFormat,
    ) {
        let cli = parse(args);
        assert_eq!(cli.fault, fault);
        assert_eq!(cli.output, output);
    }

    #[rstest]
    #[case(&["--max-tasks", "7"], TerminationPolicy::after_tasks(7))]
    #[case(&["--duration-ms", "250"], TerminationPolicy::after(Duration::from_millis(250)))]
    #[case(
        &["--max-tasks", "7", "--duration-ms", "250"],
        TerminationPolicy { max_tasks: Some(7), max_duration: Some(Duration::from_millis(250)) },
    )]
    #[case(&["--until-interrupted"], TerminationPolicy::manual())]
    fn limit_flags_set_the_termination(
        #[case] args: &[&str],
        #[case] expected: TerminationPolicy,
    ) {
        assert_eq!(parse(args).to_config().unwrap().termination, expected);
    }

    #[rstest]
    #[case(&["--capacity", "0"])]
    #[case(&["--malformed-probability", "1.5"])]
    fn out_of_range_flags_are_rejected(#[case] args: &[&str]) {
        assert!(matches!(parse(args).to_config(), Err(CliError::Config(_))));
    }
}
