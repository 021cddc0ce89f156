//! Outcome model: the result a worker attaches to a task.
//!
//! Outcomes are a tagged enum rather than a payload compared against magic
//! strings. The failure case carries its reason as data so it can flow to the
//! failed aggregator without aborting the pipeline.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a task failed.
///
/// Both variants are expected, per-task outcomes. They never stop the run.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// The creation timestamp was corrupted upstream.
    #[error("malformed timestamp")]
    MalformedTimestamp,

    /// The task was older than the staleness threshold when it was processed.
    #[error("task expired: created at {}", .created_at.to_rfc3339_opts(SecondsFormat::Secs, true))]
    Expired { created_at: DateTime<Utc> },
}

impl FailureReason {
    pub fn is_expired(&self) -> bool {
        matches!(self, FailureReason::Expired { .. })
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, FailureReason::MalformedTimestamp)
    }
}

/// Processing state of a task.
///
/// `Pending` → `Completed` / `Failed` の一方向のみ。戻ることはない。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    #[default]
    Pending,
    Completed,
    Failed(FailureReason),
}

impl Outcome {
    pub fn failed(reason: FailureReason) -> Self {
        Outcome::Failed(reason)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Outcome::Pending)
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed)
    }

    pub fn failure_reason(&self) -> Option<&FailureReason> {
        match self {
            Outcome::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn failure_reasons_render_readable_messages() {
        assert_eq!(
            FailureReason::MalformedTimestamp.to_string(),
            "malformed timestamp"
        );

        let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(
            FailureReason::Expired { created_at }.to_string(),
            "task expired: created at 2024-01-01T12:00:00Z"
        );
    }

    #[test]
    fn outcome_defaults_to_pending() {
        let outcome = Outcome::default();
        assert!(outcome.is_pending());
        assert!(outcome.failure_reason().is_none());
    }

    #[test]
    fn outcome_predicates_are_exclusive() {
        assert!(Outcome::Completed.is_completed());
        assert!(!Outcome::Completed.is_pending());

        let failed = Outcome::failed(FailureReason::MalformedTimestamp);
        assert!(!failed.is_completed());
        assert!(!failed.is_pending());
        assert_eq!(failed.failure_reason(), Some(&FailureReason::MalformedTimestamp));
        assert!(!Outcome::Pending.is_completed());
    }

    #[test]
    fn outcome_serializes_as_tagged_status() {
        let s = serde_json::to_string(&Outcome::Completed).unwrap();
        assert_eq!(s, r#"{"status":"COMPLETED"}"#);

        let v = serde_json::to_value(Outcome::failed(FailureReason::MalformedTimestamp)).unwrap();
        assert_eq!(v["status"], "FAILED");
        assert_eq!(v["reason"]["kind"], "malformed_timestamp");
    }
}
