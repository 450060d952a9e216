use crate::domain::model::{LibraryFilter, LibraryKind};
use crate::utils::error::{Result, StatsError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// 指定設定檔路徑的環境變數，未設定時使用內建預設值
pub const CONFIG_PATH_ENV: &str = "PLEX_STATS_CONFIG";

pub const DEFAULT_PLEX_URL: &str = "http://localhost:32400";
pub const PLACEHOLDER_PLEX_TOKEN: &str = "YOUR_PLEX_TOKEN_HERE";
pub const DEFAULT_DATABASE_URL: &str =
    "https://hatch-network-website-default-rtdb.europe-west1.firebasedatabase.app";
pub const DEFAULT_SERVICE_ACCOUNT_PATH: &str = "firebase-service-account.json";
pub const DEFAULT_REFERENCE_PATH: &str = "plexStats";
pub const DEFAULT_MOVIE_LIBRARY: &str = "Movies";
pub const DEFAULT_TV_LIBRARY: &str = "TV Shows";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub plex: PlexConfig,
    #[serde(default)]
    pub firebase: FirebaseConfig,
    #[serde(default)]
    pub libraries: LibrariesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlexConfig {
    pub url: String,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirebaseConfig {
    pub database_url: String,
    pub service_account_path: PathBuf,
    #[serde(default = "default_reference_path")]
    pub reference_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibrariesConfig {
    pub movies: String,
    pub tv_shows: String,
    /// 找不到指定的 library 時直接失敗，而不是記為 0
    #[serde(default)]
    pub require_match: bool,
}

fn default_reference_path() -> String {
    DEFAULT_REFERENCE_PATH.to_string()
}

impl Default for PlexConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_PLEX_URL.to_string(),
            token: PLACEHOLDER_PLEX_TOKEN.to_string(),
        }
    }
}

impl Default for FirebaseConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            service_account_path: PathBuf::from(DEFAULT_SERVICE_ACCOUNT_PATH),
            reference_path: default_reference_path(),
        }
    }
}

impl Default for LibrariesConfig {
    fn default() -> Self {
        Self {
            movies: DEFAULT_MOVIE_LIBRARY.to_string(),
            tv_shows: DEFAULT_TV_LIBRARY.to_string(),
            require_match: false,
        }
    }
}

impl LibrariesConfig {
    pub fn movie_filter(&self) -> LibraryFilter {
        LibraryFilter::new(self.movies.clone(), LibraryKind::Movie)
    }

    pub fn show_filter(&self) -> LibraryFilter {
        LibraryFilter::new(self.tv_shows.clone(), LibraryKind::Show)
    }
}

impl AppConfig {
    /// 有設定 `PLEX_STATS_CONFIG` 就讀檔，否則使用內建預設值
    pub fn load() -> Result<Self> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => {
                tracing::debug!("Loading configuration from {}", path);
                Self::from_file(path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| StatsError::ConfigError {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| StatsError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }
}

/// 替換環境變數 (例如 ${PLEX_TOKEN})，找不到的保留原字串
fn substitute_env_vars(content: &str) -> String {
    static ENV_VAR: OnceLock<Regex> = OnceLock::new();
    let re = ENV_VAR.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid regex"));

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    })
    .into_owned()
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("plex.url", &self.plex.url)?;
        validation::validate_non_empty_string("plex.token", &self.plex.token)?;
        validation::validate_not_placeholder(
            "plex.token",
            &self.plex.token,
            PLACEHOLDER_PLEX_TOKEN,
        )?;

        validation::validate_url("firebase.database_url", &self.firebase.database_url)?;
        validation::validate_path(
            "firebase.service_account_path",
            &self.firebase.service_account_path.to_string_lossy(),
        )?;
        validation::validate_database_path(
            "firebase.reference_path",
            &self.firebase.reference_path,
        )?;

        validation::validate_non_empty_string("libraries.movies", &self.libraries.movies)?;
        validation::validate_non_empty_string("libraries.tv_shows", &self.libraries.tv_shows)?;

        Ok(())
    }
}
