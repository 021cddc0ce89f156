//! Status - 実行中のパイプラインの観測
//!
//! 各ステージは自分のカウンタだけを加算する（書き手は常に 1 種類）。
//! スナップショットは目安であり、drain 後の正確な値は RunReport を見ること。

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::domain::PipelineState;

/// Point-in-time view of a running pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStatus {
    pub state: PipelineState,
    pub generated: u64,
    pub processed: u64,
    pub completed: u64,
    pub failed: u64,
    pub live_workers: usize,
}

#[derive(Debug, Default)]
pub(crate) struct StageCounters {
    pub generated: AtomicU64,
    pub processed: AtomicU64,
    pub completed: AtomicU64,
    pub failed: AtomicU64,
    pub live_workers: AtomicUsize,
}

impl StageCounters {
    pub fn snapshot(&self, state: PipelineState) -> PipelineStatus {
        PipelineStatus {
            state,
            generated: self.generated.load(Ordering::Relaxed),
            processed: self.processed.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            live_workers: self.live_workers.load(Ordering::Acquire),
        }
    }
}

/// Counts a worker as live from creation until drop, panics included.
pub(crate) struct LiveWorkerGuard {
    counters: Arc<StageCounters>,
}

impl LiveWorkerGuard {
    pub fn enter(counters: Arc<StageCounters>) -> Self {
        counters.live_workers.fetch_add(1, Ordering::AcqRel);
        Self { counters }
    }
}

impl Drop for LiveWorkerGuard {
    fn drop(&mut self) {
        self.counters.live_workers.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_worker_guard_counts_until_dropped() {
        let counters = Arc::new(StageCounters::default());
        let a = LiveWorkerGuard::enter(Arc::clone(&counters));
        let b = LiveWorkerGuard::enter(Arc::clone(&counters));
        assert_eq!(counters.snapshot(PipelineState::Running).live_workers, 2);

        drop(a);
        assert_eq!(counters.snapshot(PipelineState::Running).live_workers, 1);
        drop(b);
        assert_eq!(counters.snapshot(PipelineState::Done).live_workers, 0);
    }

    #[test]
    fn snapshot_carries_state_and_counts() {
        let counters = StageCounters::default();
        counters.generated.fetch_add(3, Ordering::Relaxed);
        counters.completed.fetch_add(2, Ordering::Relaxed);
        let status = counters.snapshot(PipelineState::Draining);
        assert_eq!(status.state, PipelineState::Draining);
        assert_eq!(status.generated, 3);
        assert_eq!(status.completed, 2);
        assert_eq!(status.failed, 0);
    }
}
