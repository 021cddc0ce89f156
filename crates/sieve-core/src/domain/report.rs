//! RunReport - drain 完了後に呼び出し側へ渡す集計結果

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

use super::{TaskError, TaskId};

/// Final result of a pipeline run.
///
/// `completed` と `failed` の順序は各 aggregator が受け取った順。
/// タスクの生成順とは一致しない。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    pub completed: Vec<TaskId>,
    pub failed: Vec<TaskError>,
    /// Number of tasks the generator published.
    pub generated: u64,
    pub elapsed: Duration,
    /// Workers still alive after drain. Always 0 for a clean run.
    pub live_workers: usize,
}

impl RunReport {
    pub fn processed(&self) -> usize {
        self.completed.len() + self.failed.len()
    }

    /// Every generated task ended up in exactly one collection.
    pub fn is_conserved(&self) -> bool {
        if self.processed() as u64 != self.generated {
            return false;
        }
        let mut seen = HashSet::with_capacity(self.processed());
        self.completed
            .iter()
            .copied()
            .chain(self.failed.iter().map(|e| e.id))
            .all(|id| seen.insert(id))
    }
}
