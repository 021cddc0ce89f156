//! TaskSource の実装
//!
//! どちらも `Iterator<Item = Task>` なので、`ports::TaskSource` の
//! blanket impl でそのまま generator に渡せる。

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::SecondsFormat;

use crate::domain::{CreatedAt, MALFORMED_TIMESTAMP, Task};
use crate::ports::{Clock, FaultInjector, IdGenerator};

/// Endless stream of new tasks stamped with the current time.
///
/// Each record is written as an RFC 3339 string and read back through
/// [`CreatedAt::parse`]. When the fault injector says so, the string is the
/// malformed sentinel instead, which fails to parse.
pub struct GeneratedTasks {
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    fault: Arc<dyn FaultInjector>,
}

impl GeneratedTasks {
    pub fn new(
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        fault: Arc<dyn FaultInjector>,
    ) -> Self {
        Self { clock, ids, fault }
    }
}

impl Iterator for GeneratedTasks {
    type Item = Task;

    fn next(&mut self) -> Option<Task> {
        let now = self.clock.now();
        let raw = if self.fault.corrupt(now) {
            MALFORMED_TIMESTAMP.to_string()
        } else {
            now.to_rfc3339_opts(SecondsFormat::Nanos, true)
        };
        Some(Task::new(self.ids.next_task_id(), CreatedAt::parse(&raw)))
    }
}

/// A finite, pre-built list of tasks, yielded in order.
#[derive(Debug, Default)]
pub struct FixedTasks {
    tasks: VecDeque<Task>,
}

impl FixedTasks {
    pub fn new(tasks: impl IntoIterator<Item = Task>) -> Self {
        Self {
            tasks: tasks.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.tasks.len()
    }
}

impl Iterator for FixedTasks {
    type Item = Task;

    fn next(&mut self) -> Option<Task> {
        self.tasks.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskId;
    use crate::impls::fault::{NoFault, RandomFault};
    use crate::ports::{FixedClock, SequentialIdGenerator};
    use chrono::{TimeZone, Timelike, Utc};

    #[test]
    fn generated_timestamps_survive_the_string_form() {
        let t = Utc
            .with_ymd_and_hms(2024, 1, 1, 12, 0, 0)
            .unwrap()
            .with_nanosecond(123_456_789)
            .unwrap();
        let mut source = GeneratedTasks::new(
            Arc::new(FixedClock::new(t)),
            Arc::new(SequentialIdGenerator::new()),
            Arc::new(NoFault),
        );
        let task = source.next().unwrap();
        assert_eq!(task.created_at().timestamp(), Some(t));
    }

    #[test]
    fn generated_tasks_are_pending_and_numbered() {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let mut source = GeneratedTasks::new(
            Arc::new(FixedClock::new(t)),
            Arc::new(SequentialIdGenerator::new()),
            Arc::new(NoFault),
        );

        let tasks: Vec<Task> = source.by_ref().take(3).collect();
        assert_eq!(
            tasks.iter().map(Task::id).collect::<Vec<_>>(),
            vec![TaskId::new(1), TaskId::new(2), TaskId::new(3)]
        );
        for task in &tasks {
            assert_eq!(task.created_at(), &CreatedAt::At(t));
            assert!(task.outcome().is_pending());
        }
        // 無限ソース
        assert!(source.next().is_some());
    }

    #[test]
    fn generated_tasks_use_the_fault_injector() {
        let source = GeneratedTasks::new(
            Arc::new(FixedClock::new(Utc::now())),
            Arc::new(SequentialIdGenerator::new()),
            Arc::new(RandomFault::seeded(1.0, 1)),
        );
        assert!(
            source
                .take(10)
                .all(|t| t.created_at() == &CreatedAt::malformed())
        );
    }

    #[test]
    fn fixed_tasks_yield_in_order_then_end() {
        let t = Utc::now();
        let mut source = FixedTasks::new(vec![
            Task::new(TaskId::new(10), t),
            Task::new(TaskId::new(20), t),
        ]);
        assert_eq!(source.remaining(), 2);
        assert_eq!(source.next().map(|t| t.id()), Some(TaskId::new(10)));
        assert_eq!(source.next().map(|t| t.id()), Some(TaskId::new(20)));
        assert!(source.next().is_none());
    }
}
