//! Domain identifiers.
//!
//! TaskId は整数の newtype。採番は `ports::IdGenerator` が担当し、
//! ドメイン側は「一意な整数」であることだけを前提にする。

use serde::{Deserialize, Serialize};
use std::fmt;

/// Task の一意な識別子
///
/// Display は数値そのもの（`task id 42 ...` のようにエラー文へ埋め込むため）。
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(u64);

impl TaskId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for TaskId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_id_displays_as_plain_number() {
        assert_eq!(TaskId::new(42).to_string(), "42");
    }

    #[test]
    fn task_ids_order_numerically() {
        let mut ids = vec![TaskId::new(3), TaskId::new(1), TaskId::new(2)];
        ids.sort();
        assert_eq!(ids, vec![TaskId::new(1), TaskId::new(2), TaskId::new(3)]);
    }
}
