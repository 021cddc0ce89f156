//! Domain model (ids, tasks, outcomes, staleness, pipeline state).
//!
//! キュー・ワーカー・チャネルには依存しない。パイプラインが運ぶ
//! データの「形」と、鮮度判定のルールだけを定義する。

pub mod errors;
pub mod ids;
pub mod outcome;
pub mod report;
pub mod staleness;
pub mod state;
pub mod task;

pub use self::errors::TaskError;
pub use self::ids::TaskId;
pub use self::outcome::{FailureReason, Outcome};
pub use self::report::RunReport;
pub use self::staleness::StalenessPolicy;
pub use self::state::PipelineState;
pub use self::task::{CreatedAt, MALFORMED_TIMESTAMP, Task, TaskStateError};
