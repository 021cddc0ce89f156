//! PipelineConfig - 実行時パラメータ
//!
//! コンパイル時定数にはしない。テストではチャネル容量やワーカー数、
//! 鮮度しきい値を自由に変えたいため。
//!
//! JSON では Duration をミリ秒の整数（`*_ms`）で表す。

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::domain::StalenessPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("worker pool size must be at least 1")]
    ZeroWorkers,

    #[error("channel capacity for {channel} must be at least 1")]
    ZeroCapacity { channel: &'static str },

    #[error("malformed probability must be within [0, 1], got {0}")]
    InvalidProbability(f64),

    #[error("staleness threshold {0:?} is out of range")]
    ThresholdOutOfRange(Duration),

    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
}

/// When the run stops producing new tasks.
///
/// Both limits unset means the caller stops the run by hand. When both are
/// set, whichever is reached first wins. A finite task source also ends the
/// run when it runs dry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TerminationPolicy {
    pub max_tasks: Option<u64>,
    #[serde(rename = "max_duration_ms", with = "duration_ms::option")]
    pub max_duration: Option<Duration>,
}

impl TerminationPolicy {
    pub fn manual() -> Self {
        Self::default()
    }

    pub fn after_tasks(max_tasks: u64) -> Self {
        Self {
            max_tasks: Some(max_tasks),
            max_duration: None,
        }
    }

    pub fn after(max_duration: Duration) -> Self {
        Self {
            max_tasks: None,
            max_duration: Some(max_duration),
        }
    }

    pub fn is_manual(&self) -> bool {
        self.max_tasks.is_none() && self.max_duration.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Number of concurrent workers.
    pub workers: usize,
    /// Generator → workers.
    pub generated_capacity: usize,
    /// Workers → classifier.
    pub processed_capacity: usize,
    /// Classifier → completed aggregator.
    pub completed_capacity: usize,
    /// Classifier → failed aggregator.
    pub failed_capacity: usize,
    #[serde(rename = "staleness_threshold_ms", with = "duration_ms")]
    pub staleness_threshold: Duration,
    /// Chance that a generated task gets a malformed timestamp.
    pub malformed_probability: f64,
    /// Upper bound of the simulated per-task processing delay. Zero disables it.
    #[serde(rename = "max_jitter_ms", with = "duration_ms")]
    pub max_jitter: Duration,
    pub termination: TerminationPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            generated_capacity: 10,
            processed_capacity: 1,
            completed_capacity: 1,
            failed_capacity: 1,
            staleness_threshold: Duration::from_secs(20),
            malformed_probability: 0.5,
            max_jitter: Duration::from_millis(300),
            termination: TerminationPolicy::after(Duration::from_secs(3)),
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set every channel capacity at once.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.generated_capacity = capacity;
        self.processed_capacity = capacity;
        self.completed_capacity = capacity;
        self.failed_capacity = capacity;
        self
    }

    pub fn with_staleness_threshold(mut self, threshold: Duration) -> Self {
        self.staleness_threshold = threshold;
        self
    }

    pub fn with_malformed_probability(mut self, probability: f64) -> Self {
        self.malformed_probability = probability;
        self
    }

    pub fn with_max_jitter(mut self, max_jitter: Duration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    pub fn with_termination(mut self, termination: TerminationPolicy) -> Self {
        self.termination = termination;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        for (channel, capacity) in [
            ("generated", self.generated_capacity),
            ("processed", self.processed_capacity),
            ("completed", self.completed_capacity),
            ("failed", self.failed_capacity),
        ] {
            if capacity == 0 {
                return Err(ConfigError::ZeroCapacity { channel });
            }
        }
        if !(0.0..=1.0).contains(&self.malformed_probability) {
            return Err(ConfigError::InvalidProbability(self.malformed_probability));
        }
        self.staleness_policy()?;
        Ok(())
    }

    pub fn staleness_policy(&self) -> Result<StalenessPolicy, ConfigError> {
        TimeDelta::from_std(self.staleness_threshold)
            .map(StalenessPolicy::new)
            .map_err(|_| ConfigError::ThresholdOutOfRange(self.staleness_threshold))
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }

    pub mod option {
        use super::*;

        pub fn serialize<S>(d: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match d {
                Some(d) => serializer.serialize_some(&(d.as_millis() as u64)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Option::<u64>::deserialize(deserializer).map(|ms| ms.map(Duration::from_millis))
        }
    }
}
