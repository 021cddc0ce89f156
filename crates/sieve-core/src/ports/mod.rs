//! Ports - 抽象化レイヤー
//!
//! パイプラインのコアが外部から受け取る能力をここで定義する。
//! 時刻・採番・障害注入・タスク供給元・結果の受け取り先はすべて差し替え可能。

pub mod clock;
pub mod fault;
pub mod id_generator;
pub mod result_sink;
pub mod task_source;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::fault::FaultInjector;
pub use self::id_generator::{IdGenerator, SequentialIdGenerator};
pub use self::result_sink::{ResultSink, SinkError};
pub use self::task_source::TaskSource;
