use super::auth;
use super::credentials::ServiceAccountKey;
use crate::config::toml_config::FirebaseConfig;
use crate::utils::error::PublishError;
use reqwest::Client;
use serde::Serialize;
use url::Url;

/// 每個 process 建立一次，由 orchestrator 傳給 publisher
pub struct FirebaseSession {
    client: Client,
    database_url: Url,
    access_token: String,
}

impl std::fmt::Debug for FirebaseSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseSession")
            .field("database_url", &self.database_url.as_str())
            .finish_non_exhaustive()
    }
}

impl FirebaseSession {
    /// 載入憑證並換取 access token
    pub async fn initialize(config: &FirebaseConfig) -> Result<Self, PublishError> {
        let key = ServiceAccountKey::from_file(&config.service_account_path)?;
        tracing::debug!("Loaded service account {}", key.client_email);

        let client = Client::new();
        let access_token = auth::fetch_access_token(&client, &key).await?;

        Self::with_token(client, &config.database_url, access_token)
    }

    pub fn with_token(
        client: Client,
        database_url: &str,
        access_token: String,
    ) -> Result<Self, PublishError> {
        let mut database_url = Url::parse(database_url)?;
        if !database_url.path().ends_with('/') {
            let path = format!("{}/", database_url.path());
            database_url.set_path(&path);
        }

        Ok(Self {
            client,
            database_url,
            access_token,
        })
    }

    pub fn reference(&self, path: &str) -> DatabaseReference<'_> {
        DatabaseReference {
            session: self,
            path: path.trim_matches('/').to_string(),
        }
    }
}

/// 指向資料庫中某個路徑
#[derive(Debug)]
pub struct DatabaseReference<'a> {
    session: &'a FirebaseSession,
    path: String,
}

impl DatabaseReference<'_> {
    pub fn path(&self) -> &str {
        &self.path
    }

    fn endpoint(&self) -> Result<Url, PublishError> {
        // 空路徑會變成 `/.json`，等於覆寫整個資料庫
        if self.path.is_empty() || self.path.split('/').any(|segment| segment.is_empty()) {
            return Err(PublishError::InvalidReference {
                path: self.path.clone(),
            });
        }
        Ok(self.session.database_url.join(&format!("{}.json", self.path))?)
    }

    /// 整筆覆寫 (PUT)，不做欄位合併
    pub async fn set<T: Serialize + ?Sized>(&self, value: &T) -> Result<(), PublishError> {
        let url = self.endpoint()?;
        tracing::debug!("Writing to: {}", url);

        let response = self
            .session
            .client
            .put(url)
            .bearer_auth(&self.session.access_token)
            .json(value)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Database response status: {}", status);
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Status {
                endpoint: format!("/{}.json", self.path),
                status,
                body,
            });
        }

        Ok(())
    }
}
