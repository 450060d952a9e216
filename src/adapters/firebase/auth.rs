use super::credentials::ServiceAccountKey;
use crate::utils::error::PublishError;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Realtime Database 需要的 OAuth scope
pub const DATABASE_SCOPES: &str = "https://www.googleapis.com/auth/firebase.database \
https://www.googleapis.com/auth/userinfo.email";

const ASSERTION_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub sub: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

pub fn sign_assertion(key: &ServiceAccountKey, now: i64) -> Result<String, PublishError> {
    let claims = AssertionClaims {
        iss: key.client_email.clone(),
        sub: key.client_email.clone(),
        scope: DATABASE_SCOPES.to_string(),
        aud: key.token_uri.clone(),
        iat: now,
        exp: now + ASSERTION_LIFETIME_SECS,
    };

    let mut header = Header::new(Algorithm::RS256);
    if !key.private_key_id.is_empty() {
        header.kid = Some(key.private_key_id.clone());
    }

    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
    Ok(encode(&header, &claims, &encoding_key)?)
}

/// 用 service account 換取 OAuth access token
pub async fn fetch_access_token(
    client: &Client,
    key: &ServiceAccountKey,
) -> Result<String, PublishError> {
    let assertion = sign_assertion(key, chrono::Utc::now().timestamp())?;

    tracing::debug!("Requesting access token from: {}", key.token_uri);
    let response = client
        .post(&key.token_uri)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
        .send()
        .await?;

    let status = response.status();
    tracing::debug!("Token endpoint status: {}", status);
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(PublishError::TokenExchange { status, body });
    }

    let token: TokenResponse = response.json().await?;
    tracing::debug!(
        "Access token for {} expires in {}s",
        key.client_email,
        token.expires_in.unwrap_or_default()
    );
    Ok(token.access_token)
}
