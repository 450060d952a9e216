pub mod auth;
pub mod credentials;
pub mod session;

pub use session::{DatabaseReference, FirebaseSession};

use crate::config::toml_config::FirebaseConfig;
use crate::domain::model::LibraryStats;
use crate::domain::ports::{SinkConnector, StatsSink};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 收集完成後才建立 Firebase session
pub struct FirebaseConnector {
    config: FirebaseConfig,
}

impl FirebaseConnector {
    pub fn new(config: FirebaseConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SinkConnector for FirebaseConnector {
    type Sink = FirebasePublisher;

    async fn connect(&self) -> Result<FirebasePublisher> {
        println!("[Firebase] Initializing Firebase...");
        let session = FirebaseSession::initialize(&self.config).await?;
        Ok(FirebasePublisher::new(session, self.config.reference_path.clone()))
    }
}

pub struct FirebasePublisher {
    session: FirebaseSession,
    reference_path: String,
}

impl FirebasePublisher {
    pub fn new(session: FirebaseSession, reference_path: String) -> Self {
        Self {
            session,
            reference_path,
        }
    }
}

#[async_trait]
impl StatsSink for FirebasePublisher {
    async fn publish(&self, stats: &LibraryStats) -> Result<()> {
        self.session.reference(&self.reference_path).set(stats).await?;

        let written = serde_json::to_string(stats).unwrap_or_default();
        println!("[Firebase] Successfully updated stats: {}", written);
        Ok(())
    }
}
