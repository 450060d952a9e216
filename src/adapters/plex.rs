use crate::config::toml_config::{LibrariesConfig, PlexConfig};
use crate::domain::model::{LibraryFilter, LibrarySection, LibraryStats};
use crate::domain::ports::StatsSource;
use crate::utils::error::{Result, SourceError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

const TOKEN_HEADER: &str = "x-plex-token";

/// Plex 回應外層一律是 `{"MediaContainer": {...}}`
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(rename = "MediaContainer")]
    media_container: T,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerIdentity {
    #[serde(default)]
    pub friendly_name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SectionList {
    #[serde(rename = "Directory", default)]
    directory: Vec<LibrarySection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SectionItems {
    #[serde(default)]
    total_size: Option<u64>,
    #[serde(default)]
    size: Option<u64>,
    #[serde(rename = "Metadata", default)]
    metadata: Vec<serde_json::Value>,
}

impl SectionItems {
    fn count(&self) -> u64 {
        self.total_size
            .or(self.size)
            .unwrap_or(self.metadata.len() as u64)
    }
}

pub struct PlexClient {
    client: Client,
    base_url: Url,
}

impl PlexClient {
    pub fn new(base_url: &str, token: &str) -> std::result::Result<Self, SourceError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let mut token_value =
            HeaderValue::from_str(token).map_err(|_| SourceError::InvalidToken)?;
        token_value.set_sensitive(true);
        headers.insert(TOKEN_HEADER, token_value);

        let client = Client::builder().default_headers(headers).build()?;

        // 保留反向代理的路徑前綴，後續 join 一律用相對路徑
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &PlexConfig) -> std::result::Result<Self, SourceError> {
        Self::new(&config.url, &config.token)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> std::result::Result<T, SourceError> {
        let url = self.base_url.join(path)?;
        tracing::debug!("Making Plex request to: {}", url);

        let response = self.client.get(url).send().await?;
        tracing::debug!("Plex response status: {}", response.status());

        if !response.status().is_success() {
            return Err(SourceError::Status {
                endpoint: format!("/{}", path),
                status: response.status(),
            });
        }

        let envelope: Envelope<T> = response.json().await?;
        Ok(envelope.media_container)
    }

    /// 驗證伺服器可連線且 token 有效
    pub async fn connect(&self) -> std::result::Result<ServerIdentity, SourceError> {
        self.get_json("").await
    }

    pub async fn sections(&self) -> std::result::Result<Vec<LibrarySection>, SourceError> {
        let list: SectionList = self.get_json("library/sections").await?;
        Ok(list.directory)
    }

    pub async fn count_items(
        &self,
        section: &LibrarySection,
    ) -> std::result::Result<u64, SourceError> {
        let path = format!("library/sections/{}/all", section.key);
        let items: SectionItems = self.get_json(&path).await?;
        Ok(items.count())
    }
}

/// 從 Plex 收集兩個 library 的項目數
pub struct PlexCollector {
    client: PlexClient,
    movies: LibraryFilter,
    shows: LibraryFilter,
    require_match: bool,
}

impl PlexCollector {
    pub fn new(client: PlexClient, libraries: &LibrariesConfig) -> Self {
        Self {
            client,
            movies: libraries.movie_filter(),
            shows: libraries.show_filter(),
            require_match: libraries.require_match,
        }
    }

    async fn collect_from_server(&self) -> std::result::Result<LibraryStats, SourceError> {
        println!("[Plex] Connecting to Plex server...");
        let identity = self.client.connect().await?;
        tracing::debug!(
            "Connected to {} (version {})",
            identity.friendly_name.as_deref().unwrap_or("unnamed server"),
            identity.version.as_deref().unwrap_or("unknown")
        );

        let mut stats = LibraryStats::default();
        let mut found_movies = false;
        let mut found_shows = false;

        for section in self.client.sections().await? {
            if self.movies.matches(&section) {
                stats.movies = self.client.count_items(&section).await?;
                found_movies = true;
                println!("[Plex] Found {} movies in '{}'", stats.movies, self.movies.name);
            } else if self.shows.matches(&section) {
                stats.tv_shows = self.client.count_items(&section).await?;
                found_shows = true;
                println!("[Plex] Found {} TV shows in '{}'", stats.tv_shows, self.shows.name);
            } else {
                tracing::debug!("Skipping section '{}' ({})", section.title, section.kind);
            }
        }

        for (found, filter) in [(found_movies, &self.movies), (found_shows, &self.shows)] {
            if found {
                continue;
            }
            if self.require_match {
                return Err(SourceError::MissingLibrary {
                    name: filter.name.clone(),
                    kind: filter.kind.to_string(),
                });
            }
            tracing::warn!(
                "No {} library named '{}' on the server, reporting 0",
                filter.kind,
                filter.name
            );
        }

        Ok(stats)
    }
}

#[async_trait]
impl StatsSource for PlexCollector {
    async fn collect(&self) -> Result<LibraryStats> {
        Ok(self.collect_from_server().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::StatsError;
    use httpmock::prelude::*;

    fn libraries(require_match: bool) -> LibrariesConfig {
        LibrariesConfig {
            require_match,
            ..LibrariesConfig::default()
        }
    }

    #[test]
    fn test_section_item_count_precedence() {
        let items: SectionItems = serde_json::from_value(serde_json::json!({
            "size": 2, "totalSize": 7, "Metadata": [{}, {}]
        }))
        .unwrap();
        assert_eq!(items.count(), 7);

        let items: SectionItems =
            serde_json::from_value(serde_json::json!({"Metadata": [{}, {}, {}]})).unwrap();
        assert_eq!(items.count(), 3);

        let items: SectionItems = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(items.count(), 0);
    }

    #[tokio::test]
    async fn test_client_sends_token_and_parses_sections() {
        let server = MockServer::start();
        let sections_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/library/sections")
                .header("x-plex-token", "secret")
                .header("accept", "application/json");
            then.status(200).json_body(serde_json::json!({
                "MediaContainer": {"size": 1, "Directory": [
                    {"key": "4", "title": "Movies", "type": "movie",
                     "agent": "tv.plex.agents.movie"}
                ]}
            }));
        });

        let client = PlexClient::new(&server.base_url(), "secret").unwrap();
        let sections = client.sections().await.unwrap();

        sections_mock.assert();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].key, "4");
    }

    #[tokio::test]
    async fn test_base_url_path_prefix_is_kept() {
        let server = MockServer::start();
        let sections_mock = server.mock(|when, then| {
            when.method(GET).path("/plex/library/sections");
            then.status(200)
                .json_body(serde_json::json!({"MediaContainer": {"Directory": []}}));
        });

        let client = PlexClient::new(&server.url("/plex"), "secret").unwrap();
        client.sections().await.unwrap();

        sections_mock.assert();
    }

    #[tokio::test]
    async fn test_empty_container_means_no_sections() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/library/sections");
            then.status(200)
                .json_body(serde_json::json!({"MediaContainer": {"size": 0}}));
        });

        let client = PlexClient::new(&server.base_url(), "secret").unwrap();
        assert!(client.sections().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_library_fails_when_required() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(200)
                .json_body(serde_json::json!({"MediaContainer": {"friendlyName": "nas"}}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/library/sections");
            then.status(200).json_body(serde_json::json!({
                "MediaContainer": {"Directory": [
                    {"key": "1", "title": "Movies", "type": "movie"}
                ]}
            }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/library/sections/1/all");
            then.status(200)
                .json_body(serde_json::json!({"MediaContainer": {"size": 12}}));
        });

        let client = PlexClient::new(&server.base_url(), "secret").unwrap();
        let collector = PlexCollector::new(client, &libraries(true));

        let err = collector.collect().await.unwrap_err();
        assert!(matches!(
            err,
            StatsError::SourceQueryFailure(SourceError::MissingLibrary { ref name, .. })
                if name == "TV Shows"
        ));
    }

    #[tokio::test]
    async fn test_unauthorized_token_is_source_failure() {
        let server = MockServer::start();
        let identity_mock = server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(401);
        });
        let sections_mock = server.mock(|when, then| {
            when.method(GET).path("/library/sections");
            then.status(200);
        });

        let client = PlexClient::new(&server.base_url(), "wrong").unwrap();
        let collector = PlexCollector::new(client, &libraries(false));

        let err = collector.collect().await.unwrap_err();
        identity_mock.assert();
        sections_mock.assert_hits(0);
        assert!(matches!(
            err,
            StatsError::SourceQueryFailure(SourceError::Status { status, .. })
                if status == reqwest::StatusCode::UNAUTHORIZED
        ));
    }
}
