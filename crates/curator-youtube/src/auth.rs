//! OAuth credentials for the Data API.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use curator_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Google token endpoint for the refresh-token grant.
pub const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Refresh tokens this close to expiry.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Supplies bearer tokens to the client.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// A currently valid access token.
    async fn access_token(&self) -> Result<String>;

    /// Discard the current token and obtain a new one.
    async fn refresh(&self) -> Result<String>;
}

/// A fixed access token, never refreshed.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl CredentialProvider for StaticToken {
    async fn access_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }

    async fn refresh(&self) -> Result<String> {
        Err(Error::Auth("static token cannot be refreshed".to_string()))
    }
}

/// Authorized-user credentials, as written by Google's client libraries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorizedUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub refresh_token: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl AuthorizedUser {
    fn valid_token(&self, now: DateTime<Utc>) -> Option<&str> {
        let token = self.token.as_deref()?;
        match self.expiry {
            Some(expiry) if expiry.timestamp() - EXPIRY_MARGIN_SECS <= now.timestamp() => None,
            _ => Some(token),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Credentials loaded from an authorized-user JSON file.
///
/// Access tokens are cached until shortly before expiry. Refreshed tokens
/// are written back to the file.
pub struct AuthorizedUserFile {
    path: PathBuf,
    http: reqwest::Client,
    state: tokio::sync::Mutex<AuthorizedUser>,
}

impl AuthorizedUserFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            Error::Auth(format!("Could not read credentials {}: {e}", path.display()))
        })?;
        let user: AuthorizedUser = serde_json::from_str(&content)
            .map_err(|e| Error::Auth(format!("Invalid credentials {}: {e}", path.display())))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {e}")))?;

        debug!("Loaded credentials from {}", path.display());

        Ok(Self {
            path,
            http,
            state: tokio::sync::Mutex::new(user),
        })
    }

    async fn refresh_locked(&self, user: &mut AuthorizedUser) -> Result<String> {
        let token_uri = user.token_uri.as_deref().unwrap_or(TOKEN_URI);
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", user.refresh_token.as_str()),
            ("client_id", user.client_id.as_str()),
            ("client_secret", user.client_secret.as_str()),
        ];

        let response = self
            .http
            .post(token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Token refresh failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Auth(format!("Token refresh failed: {status} - {body}")));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::Auth(format!("Invalid token response: {e}")))?;

        let expires_in = token.expires_in.unwrap_or(3600);
        user.token = Some(token.access_token.clone());
        user.expiry = Some(Utc::now() + chrono::Duration::seconds(expires_in));
        info!("Refreshed access token, valid for {expires_in}s");

        if let Err(e) = self.persist(user) {
            warn!("Could not save refreshed credentials: {e}");
        }

        Ok(token.access_token)
    }

    fn persist(&self, user: &AuthorizedUser) -> Result<()> {
        let content = serde_json::to_string_pretty(user)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

#[async_trait]
impl CredentialProvider for AuthorizedUserFile {
    async fn access_token(&self) -> Result<String> {
        let mut user = self.state.lock().await;
        if let Some(token) = user.valid_token(Utc::now()) {
            return Ok(token.to_string());
        }
        debug!("Access token missing or near expiry, refreshing");
        self.refresh_locked(&mut user).await
    }

    async fn refresh(&self) -> Result<String> {
        let mut user = self.state.lock().await;
        self.refresh_locked(&mut user).await
    }
}
