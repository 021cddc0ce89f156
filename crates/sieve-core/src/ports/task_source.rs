//! TaskSource port - generator が取り出すタスクの供給元
//!
//! - GeneratedTasks: 無限に生成（本番・デモ用）
//! - FixedTasks: 事前に用意した有限リスト（テスト用の注入）

use crate::domain::Task;

/// Supplies tasks to the generator stage, one at a time.
///
/// `None` means the source is exhausted. The generator then stops and the
/// pipeline drains as if a stop had been requested.
pub trait TaskSource: Send {
    fn next_task(&mut self) -> Option<Task>;
}

impl<I> TaskSource for I
where
    I: Iterator<Item = Task> + Send,
{
    fn next_task(&mut self) -> Option<Task> {
        self.next()
    }
}
