//! State - パイプライン全体の状態
//!
//! # 状態遷移
//! - idle: 構築済み、未起動
//! - running: 全ステージ起動済み、generator が生成中
//! - draining: 停止シグナル受信後、流れているタスクを捌き切るまで
//! - done: 全ステージの終了を確認済み

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a pipeline run. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    Running,
    Draining,
    Done,
}

impl PipelineState {
    /// Whether `next` is a legal successor of `self`.
    pub fn can_transition_to(self, next: PipelineState) -> bool {
        matches!(
            (self, next),
            (PipelineState::Idle, PipelineState::Running)
                | (PipelineState::Running, PipelineState::Draining)
                | (PipelineState::Draining, PipelineState::Done)
        )
    }

    pub fn is_terminal(self) -> bool {
        self == PipelineState::Done
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineState::Idle => "idle",
            PipelineState::Running => "running",
            PipelineState::Draining => "draining",
            PipelineState::Done => "done",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(PipelineState::Idle, PipelineState::Running)]
    #[case(PipelineState::Running, PipelineState::Draining)]
    #[case(PipelineState::Draining, PipelineState::Done)]
    fn forward_transitions_are_allowed(#[case] from: PipelineState, #[case] to: PipelineState) {
        assert!(from.can_transition_to(to));
    }

    #[rstest]
    #[case(PipelineState::Idle, PipelineState::Draining)]
    #[case(PipelineState::Running, PipelineState::Done)]
    #[case(PipelineState::Done, PipelineState::Running)]
    #[case(PipelineState::Draining, PipelineState::Running)]
    #[case(PipelineState::Done, PipelineState::Done)]
    fn skipping_or_reverting_is_rejected(#[case] from: PipelineState, #[case] to: PipelineState) {
        assert!(!from.can_transition_to(to));
    }

    #[rstest]
    #[case(PipelineState::Idle, false)]
    #[case(PipelineState::Running, false)]
    #[case(PipelineState::Draining, false)]
    #[case(PipelineState::Done, true)]
    fn only_done_is_terminal(#[case] state: PipelineState, #[case] terminal: bool) {
        assert_eq!(state.is_terminal(), terminal);
    }
}
