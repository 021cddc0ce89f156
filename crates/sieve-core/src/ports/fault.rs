//! FaultInjector port - 不正な created_at を混ぜる条件
//!
//! 上流データの品質不良をシミュレートする。実装は `impls::fault`。

use chrono::{DateTime, Utc};

/// Decides whether a freshly generated task gets a malformed timestamp.
pub trait FaultInjector: Send + Sync {
    /// `now` is the creation instant the task would otherwise carry.
    fn corrupt(&self, now: DateTime<Utc>) -> bool;
}
