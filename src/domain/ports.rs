use crate::domain::model::LibraryStats;
use crate::utils::error::Result;
use async_trait::async_trait;

/// 統計來源 (Plex)
#[async_trait]
pub trait StatsSource: Send + Sync {
    async fn collect(&self) -> Result<LibraryStats>;
}

/// 統計寫入目標，每次呼叫整筆覆寫
#[async_trait]
pub trait StatsSink: Send + Sync {
    async fn publish(&self, stats: &LibraryStats) -> Result<()>;
}

/// 建立寫入端的連線 (session)，只在收集成功後呼叫一次
#[async_trait]
pub trait SinkConnector: Send + Sync {
    type Sink: StatsSink;

    async fn connect(&self) -> Result<Self::Sink>;
}
