pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::firebase::{FirebaseConnector, FirebasePublisher, FirebaseSession};
pub use adapters::plex::{PlexClient, PlexCollector};
pub use config::AppConfig;
pub use core::updater::StatsUpdater;
pub use domain::model::LibraryStats;
pub use utils::error::{Result, StatsError};

/// 依設定組出 Plex → Firebase 的完整流程並執行一次
pub async fn run(config: &AppConfig) -> Result<LibraryStats> {
    let client = PlexClient::from_config(&config.plex)?;
    let collector = PlexCollector::new(client, &config.libraries);
    let connector = FirebaseConnector::new(config.firebase.clone());

    StatsUpdater::new(collector, connector).run().await
}
