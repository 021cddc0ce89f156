//! Impls - ports の実装（本番用・テスト用）
//!
//! # 含まれる実装
//! - **RandomFault / OddNanosecondFault / NoFault**: FaultInjector
//! - **GeneratedTasks / FixedTasks**: TaskSource
//! - **MemorySink**: ResultSink（テスト用）
//!
//! stdout への表示は `sieve-cli` 側の ResultSink が担当する。

pub mod fault;
pub mod memory_sink;
pub mod sources;

pub use self::fault::{NoFault, OddNanosecondFault, RandomFault};
pub use self::memory_sink::MemorySink;
pub use self::sources::{FixedTasks, GeneratedTasks};
