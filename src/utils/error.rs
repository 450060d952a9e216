use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Error querying Plex: {0}")]
    SourceQueryFailure(#[from] SourceError),

    #[error("Error updating Firebase: {0}")]
    PublishFailure(#[from] PublishError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

/// Plex 端的錯誤
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("{endpoint} returned {status}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
    },

    #[error("token is not a valid header value")]
    InvalidToken,

    #[error("no {kind} library named '{name}'")]
    MissingLibrary { name: String, kind: String },
}

/// Firebase 端的錯誤 (包含憑證載入與 token 交換)
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("cannot read credential file {path}: {source}")]
    CredentialFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid credential file {path}: {reason}")]
    InvalidCredential { path: String, reason: String },

    #[error("cannot sign token request: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("token exchange rejected ({status}): {body}")]
    TokenExchange {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("refusing to write to '{path}': not a key below the database root")]
    InvalidReference { path: String },

    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
        body: String,
    },
}

impl StatsError {
    /// 輸出時使用的前綴標籤
    pub fn tag(&self) -> &'static str {
        match self {
            StatsError::SourceQueryFailure(_) => "[Plex]",
            StatsError::PublishFailure(_) => "[Firebase]",
            StatsError::ConfigError { .. }
            | StatsError::InvalidConfigValueError { .. }
            | StatsError::MissingConfigError { .. } => "[Config]",
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            StatsError::SourceQueryFailure(SourceError::Status { status, .. })
                if *status == reqwest::StatusCode::UNAUTHORIZED =>
            {
                "Check that plex.token is a valid X-Plex-Token"
            }
            StatsError::SourceQueryFailure(SourceError::InvalidToken) => {
                "Check that plex.token is a valid X-Plex-Token"
            }
            StatsError::SourceQueryFailure(SourceError::MissingLibrary { .. }) => {
                "Check libraries.movies / libraries.tv_shows against the library names in Plex"
            }
            StatsError::SourceQueryFailure(_) => {
                "Check that the Plex server is running and plex.url is reachable"
            }
            StatsError::PublishFailure(PublishError::CredentialFile { .. })
            | StatsError::PublishFailure(PublishError::InvalidCredential { .. })
            | StatsError::PublishFailure(PublishError::Signing(_)) => {
                "Download a fresh service account key and check firebase.service_account_path"
            }
            StatsError::PublishFailure(_) => {
                "Check firebase.database_url and the database rules for the service account"
            }
            _ => "Fix the configuration file referenced by PLEX_STATS_CONFIG",
        }
    }

    /// 任何失敗都以 1 結束，由排程器負責重跑
    pub fn exit_code(&self) -> i32 {
        1
    }
}

pub type Result<T> = std::result::Result<T, StatsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_follow_phase() {
        let source: StatsError = SourceError::MissingLibrary {
            name: "Movies".to_string(),
            kind: "movie".to_string(),
        }
        .into();
        assert_eq!(source.tag(), "[Plex]");
        assert_eq!(
            source.to_string(),
            "Error querying Plex: no movie library named 'Movies'"
        );

        let publish: StatsError = PublishError::InvalidCredential {
            path: "key.json".to_string(),
            reason: "private_key is empty".to_string(),
        }
        .into();
        assert_eq!(publish.tag(), "[Firebase]");
        assert!(publish.to_string().starts_with("Error updating Firebase:"));

        let config = StatsError::MissingConfigError {
            field: "plex.token".to_string(),
        };
        assert_eq!(config.tag(), "[Config]");
        assert_eq!(config.exit_code(), 1);
    }

    #[test]
    fn test_unauthorized_plex_suggestion_mentions_token() {
        let err: StatsError = SourceError::Status {
            endpoint: "/library/sections".to_string(),
            status: reqwest::StatusCode::UNAUTHORIZED,
        }
        .into();
        assert!(err.recovery_suggestion().contains("plex.token"));
    }
}
