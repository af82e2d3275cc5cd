//! Central service façade for the sent-mail verification pipeline.
//!
//! Aggregates the HTTP client, OAuth2 state, and the extract→verify
//! pipeline behind a single `GmailService` struct that can be held as
//! shared application state.

use std::fmt;
use std::sync::Arc;

use tokio::sync::Mutex;

use sentcheck_extract::{extract_addresses, ExtractError};

use crate::auth;
use crate::client::GmailClient;
use crate::types::{
    GmailConfig, GmailConnectionSummary, GmailError, GmailErrorKind, GmailProfile, GmailResult,
    OAuthCredentials, VerificationResult,
};
use crate::verify;

/// Thread-safe shared service state.
pub type GmailServiceState = Arc<Mutex<GmailService>>;

/// Error from the combined upload-to-results pipeline. Extraction and
/// verification failures stay distinct so the caller can pick the right
/// remediation (re-export the file vs. re-authenticate).
#[derive(Debug, Clone)]
pub enum PipelineError {
    Extract(ExtractError),
    Gmail(GmailError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Extract(e) => write!(f, "Extraction failed: {}", e),
            Self::Gmail(e) => write!(f, "Verification failed: {}", e),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<ExtractError> for PipelineError {
    fn from(e: ExtractError) -> Self {
        Self::Extract(e)
    }
}

impl From<GmailError> for PipelineError {
    fn from(e: GmailError) -> Self {
        Self::Gmail(e)
    }
}

/// The core Gmail verification service combining client + state.
pub struct GmailService {
    /// HTTP client with auth.
    client: GmailClient,
    /// OAuth2 credentials.
    credentials: OAuthCredentials,
    /// Cached mailbox profile.
    cached_profile: Option<GmailProfile>,
}

impl GmailService {
    /// Create a new service wrapped in `Arc<Mutex<_>>` for shared state.
    pub fn new() -> GmailResult<GmailServiceState> {
        Ok(Arc::new(Mutex::new(Self {
            client: GmailClient::default_client()?,
            credentials: OAuthCredentials::default(),
            cached_profile: None,
        })))
    }

    /// Create with specific config.
    pub fn with_config(config: GmailConfig) -> GmailResult<GmailServiceState> {
        let credentials = config.credentials.clone();
        Ok(Arc::new(Mutex::new(Self {
            client: GmailClient::new(config)?,
            credentials,
            cached_profile: None,
        })))
    }

    // ── Configuration ────────────────────────────────────────────

    /// Update OAuth credentials.
    pub fn set_credentials(&mut self, credentials: OAuthCredentials) {
        self.credentials = credentials;
    }

    /// Get current credentials (without secret).
    pub fn credentials_summary(&self) -> OAuthCredentials {
        OAuthCredentials {
            client_id: self.credentials.client_id.clone(),
            client_secret: "***".into(),
            redirect_uri: self.credentials.redirect_uri.clone(),
            scopes: self.credentials.scopes.clone(),
        }
    }

    /// Check if authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.client.is_authenticated()
    }

    /// Get connection summary.
    pub fn connection_summary(&self) -> GmailConnectionSummary {
        GmailConnectionSummary {
            name: self.client.config().name.clone(),
            authenticated: self.is_authenticated(),
            user_email: self
                .cached_profile
                .as_ref()
                .map(|p| p.email_address.clone()),
            messages_total: self.cached_profile.as_ref().map(|p| p.messages_total),
        }
    }

    // ── Auth ─────────────────────────────────────────────────────

    /// Build authorization URL.
    pub fn build_auth_url(&self) -> GmailResult<String> {
        auth::build_auth_url(&self.credentials)
    }

    /// Exchange authorization code for tokens.
    pub async fn exchange_code(&mut self, code: &str) -> GmailResult<()> {
        let token = auth::exchange_code(&self.client, &self.credentials, code).await?;
        self.client.set_token(token);
        Ok(())
    }

    /// Refresh the access token.
    pub async fn refresh_token(&mut self) -> GmailResult<()> {
        let refresh = self
            .client
            .token()
            .and_then(|t| t.refresh_token.clone())
            .ok_or_else(|| {
                GmailError::new(GmailErrorKind::TokenExpired, "No refresh token available")
            })?;
        let token = auth::refresh_token(&self.client, &self.credentials, &refresh).await?;
        self.client.set_token(token);
        Ok(())
    }

    /// Revoke the current token and clear local auth state.
    pub async fn sign_out(&mut self) -> GmailResult<()> {
        if let Some(token) = self.client.token() {
            let access = token.access_token.clone();
            if !access.is_empty() {
                auth::revoke_token(&self.client, &access).await?;
            }
        }
        self.client.clear_token();
        self.cached_profile = None;
        Ok(())
    }

    /// Fetch and cache the mailbox profile.
    pub async fn fetch_profile(&mut self) -> GmailResult<GmailProfile> {
        let profile = self.client.profile().await?;
        self.cached_profile = Some(profile.clone());
        Ok(profile)
    }

    // ── Pipeline ─────────────────────────────────────────────────

    /// Extract the unique addresses from an uploaded spreadsheet.
    pub fn extract_addresses(&self, bytes: &[u8]) -> Result<Vec<String>, ExtractError> {
        extract_addresses(bytes)
    }

    /// Verify a batch of addresses against the sent-mail store.
    ///
    /// Fails before any query is issued when no usable credential is
    /// held; the caller should re-run the auth flow and retry.
    pub async fn verify_addresses(
        &self,
        addresses: &[String],
    ) -> GmailResult<Vec<VerificationResult>> {
        match self.client.token() {
            None => return Err(GmailError::auth("No credential set")),
            Some(t) if t.access_token.is_empty() => {
                return Err(GmailError::auth("Credential is empty"))
            }
            Some(t) if t.is_expired() => {
                return Err(GmailError::new(
                    GmailErrorKind::TokenExpired,
                    "Credential has expired — refresh required",
                ))
            }
            Some(_) => {}
        }
        verify::verify_addresses(&self.client, addresses, self.client.config().max_in_flight).await
    }

    /// Full pipeline: spreadsheet bytes in, ordered verification results
    /// out.
    pub async fn verify_spreadsheet(
        &self,
        bytes: &[u8],
    ) -> Result<Vec<VerificationResult>, PipelineError> {
        let addresses = self.extract_addresses(bytes)?;
        Ok(self.verify_addresses(&addresses).await?)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
