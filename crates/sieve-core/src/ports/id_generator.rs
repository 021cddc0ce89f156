//! IdGenerator port - TaskId の採番
//!
//! テスト容易性のために trait として抽象化している。

use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::TaskId;

/// IdGenerator は一意な TaskId を生成
///
/// # Thread Safety
/// - `Send + Sync` を要求（generator タスクへ move して使う）
pub trait IdGenerator: Send + Sync {
    fn next_task_id(&self) -> TaskId;
}

/// Hands out 1, 2, 3, ...
#[derive(Debug)]
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_task_id(&self) -> TaskId {
        TaskId::new(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn sequential_ids_start_at_one() {
        let id_gen = SequentialIdGenerator::new();
        assert_eq!(id_gen.next_task_id(), TaskId::new(1));
        assert_eq!(id_gen.next_task_id(), TaskId::new(2));
        assert_eq!(id_gen.next_task_id(), TaskId::new(3));
    }

    #[test]
    fn ids_are_unique_across_threads() {
        let id_gen = Arc::new(SequentialIdGenerator::starting_at(100));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let id_gen = Arc::clone(&id_gen);
                std::thread::spawn(move || {
                    (0..250).map(|_| id_gen.next_task_id()).collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for h in handles {
            for id in h.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 1000);
    }
}
