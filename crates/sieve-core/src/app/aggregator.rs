//! Aggregator - 結果の収集
//!
//! 収集先の Vec はループ内のローカル変数で、書き手はこのタスクだけ。
//! ロックは不要。チャネルが閉じたら Vec を JoinHandle 経由で返す
//! （これが完了シグナルになる）。

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::error::{PipelineError, Stage};

pub(crate) struct Aggregator<T> {
    stage: Stage,
    join: JoinHandle<Vec<T>>,
}

impl<T: Send + 'static> Aggregator<T> {
    pub fn spawn(stage: Stage, input: mpsc::Receiver<T>) -> Self {
        let join = tokio::spawn(collect(stage, input));
        Self { stage, join }
    }

    /// Wait for the source channel to close and take the collection.
    pub async fn join(self) -> Result<Vec<T>, PipelineError> {
        self.join
            .await
            .map_err(|e| PipelineError::from_join(self.stage, e))
    }
}

async fn collect<T>(stage: Stage, mut input: mpsc::Receiver<T>) -> Vec<T> {
    let mut items = Vec::new();
    while let Some(item) = input.recv().await {
        items.push(item);
    }
    info!(%stage, collected = items.len(), "aggregator stopped");
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn collects_in_arrival_order_until_closed() {
        let (tx, rx) = mpsc::channel(2);
        let aggregator = Aggregator::spawn(Stage::CompletedAggregator, rx);

        for i in 0..10 {
            tx.send(i).await.unwrap();
        }
        drop(tx);

        assert_eq!(aggregator.join().await.unwrap(), (0..10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn closed_without_items_yields_an_empty_collection() {
        let (tx, rx) = mpsc::channel::<u64>(1);
        drop(tx);
        let items = Aggregator::spawn(Stage::FailedAggregator, rx)
            .join()
            .await
            .unwrap();
        assert!(items.is_empty());
    }
}
