use crate::domain::model::LibraryStats;
use crate::domain::ports::{SinkConnector, StatsSink, StatsSource};
use crate::utils::error::Result;

const RULE_WIDTH: usize = 50;

/// collect → connect → publish，任何一步失敗就直接回傳錯誤
pub struct StatsUpdater<S: StatsSource, C: SinkConnector> {
    source: S,
    connector: C,
}

impl<S: StatsSource, C: SinkConnector> StatsUpdater<S, C> {
    pub fn new(source: S, connector: C) -> Self {
        Self { source, connector }
    }

    pub async fn run(&self) -> Result<LibraryStats> {
        let rule = "=".repeat(RULE_WIDTH);
        println!("{}", rule);
        println!("Plex Library Stats Updater");
        println!("{}", rule);

        let stats = self.source.collect().await?;
        tracing::debug!("Collected stats: {:?}", stats);

        let sink = self.connector.connect().await?;
        sink.publish(&stats).await?;

        println!("[Success] Stats updated successfully!");
        println!("{}", rule);

        Ok(stats)
    }
}
