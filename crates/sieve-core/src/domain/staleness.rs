//! Staleness - 鮮度判定
//!
//! worker が 1 タスクごとに呼ぶ純粋関数。時刻は引数で受け取るので
//! Clock を差し替えなくてもテストできる。

use chrono::{DateTime, TimeDelta, Utc};

use super::{CreatedAt, FailureReason, Outcome};

/// Decides whether a task is still fresh at processing time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessPolicy {
    threshold: TimeDelta,
}

impl StalenessPolicy {
    pub fn new(threshold: TimeDelta) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> TimeDelta {
        self.threshold
    }

    /// Map a creation time to a terminal outcome.
    ///
    /// - malformed → `Failed(MalformedTimestamp)`
    /// - `now - created_at <= threshold` → `Completed`
    /// - otherwise → `Failed(Expired)`
    ///
    /// A creation time in the future counts as fresh.
    pub fn evaluate(&self, created_at: &CreatedAt, now: DateTime<Utc>) -> Outcome {
        match created_at {
            CreatedAt::Malformed(_) => Outcome::failed(FailureReason::MalformedTimestamp),
            CreatedAt::At(t) if now.signed_duration_since(*t) <= self.threshold => {
                Outcome::Completed
            }
            CreatedAt::At(t) => Outcome::failed(FailureReason::Expired { created_at: *t }),
        }
    }
}
