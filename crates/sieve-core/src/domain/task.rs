use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::{Outcome, TaskId};

/// Raw text used for a corrupted creation timestamp.
pub const MALFORMED_TIMESTAMP: &str = "Some error occupied";

/// A task's creation time as it arrived from upstream.
///
/// Upstream records carry RFC 3339 strings. A record that does not parse is
/// kept as `Malformed` with its raw text so the failure can be reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CreatedAt {
    At(DateTime<Utc>),
    Malformed(String),
}

impl CreatedAt {
    /// Parse an RFC 3339 timestamp, falling back to `Malformed`.
    pub fn parse(raw: &str) -> Self {
        match DateTime::parse_from_rfc3339(raw) {
            Ok(t) => CreatedAt::At(t.with_timezone(&Utc)),
            Err(_) => CreatedAt::Malformed(raw.to_string()),
        }
    }

    pub fn malformed() -> Self {
        CreatedAt::Malformed(MALFORMED_TIMESTAMP.to_string())
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            CreatedAt::At(t) => Some(*t),
            CreatedAt::Malformed(_) => None,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, CreatedAt::Malformed(_))
    }
}

impl From<DateTime<Utc>> for CreatedAt {
    fn from(t: DateTime<Utc>) -> Self {
        CreatedAt::At(t)
    }
}

impl fmt::Display for CreatedAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreatedAt::At(t) => f.write_str(&t.to_rfc3339_opts(SecondsFormat::Secs, true)),
            CreatedAt::Malformed(raw) => f.write_str(raw),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskStateError {
    #[error("task {0} already finished")]
    AlreadyFinished(TaskId),

    #[error("task {0} cannot finish as pending")]
    PendingOutcome(TaskId),
}

/// The unit of work flowing through the pipeline.
///
/// `finished_at` と `outcome` は `finish()` 経由でのみ更新する。
/// これで「finished_at があるのは outcome が Pending 以外のときだけ」が保たれる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    created_at: CreatedAt,
    finished_at: Option<DateTime<Utc>>,
    outcome: Outcome,
}

impl Task {
    pub fn new(id: TaskId, created_at: impl Into<CreatedAt>) -> Self {
        Self {
            id,
            created_at: created_at.into(),
            finished_at: None,
            outcome: Outcome::Pending,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn created_at(&self) -> &CreatedAt {
        &self.created_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn is_finished(&self) -> bool {
        !self.outcome.is_pending()
    }

    /// Record the terminal outcome. Allowed exactly once.
    pub fn finish(&mut self, outcome: Outcome, at: DateTime<Utc>) -> Result<(), TaskStateError> {
        if self.is_finished() {
            return Err(TaskStateError::AlreadyFinished(self.id));
        }
        if outcome.is_pending() {
            return Err(TaskStateError::PendingOutcome(self.id));
        }
        self.outcome = outcome;
        self.finished_at = Some(at);
        Ok(())
    }
}
