//! Core types for the Gmail sent-mail verification integration.
//!
//! All types are serde-friendly with camelCase JSON field naming; wire
//! types mirror the Gmail API v1 `users.messages` and `users.getProfile`
//! resource shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Errors
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Error kind for Gmail operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GmailErrorKind {
    /// HTTP-level error with status code.
    HttpError(u16),
    /// OAuth2 authentication failure (credential missing or rejected).
    AuthenticationFailed,
    /// Token has expired.
    TokenExpired,
    /// Insufficient scopes for operation.
    InsufficientScope,
    /// Permission denied.
    PermissionDenied,
    /// Resource not found.
    NotFound,
    /// Rate limit exceeded.
    RateLimitExceeded,
    /// Invalid request parameter.
    InvalidParameter,
    /// Network/connectivity error.
    NetworkError,
    /// Server error (5xx).
    ServerError,
    /// Generic / unmapped error.
    Other,
}

impl std::fmt::Display for GmailErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HttpError(code) => write!(f, "HTTP {}", code),
            Self::AuthenticationFailed => write!(f, "AuthenticationFailed"),
            Self::TokenExpired => write!(f, "TokenExpired"),
            Self::InsufficientScope => write!(f, "InsufficientScope"),
            Self::PermissionDenied => write!(f, "PermissionDenied"),
            Self::NotFound => write!(f, "NotFound"),
            Self::RateLimitExceeded => write!(f, "RateLimitExceeded"),
            Self::InvalidParameter => write!(f, "InvalidParameter"),
            Self::NetworkError => write!(f, "NetworkError"),
            Self::ServerError => write!(f, "ServerError"),
            Self::Other => write!(f, "Other"),
        }
    }
}

/// A Gmail integration error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GmailError {
    pub kind: GmailErrorKind,
    pub message: String,
}

impl std::fmt::Display for GmailError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl std::error::Error for GmailError {}

impl GmailError {
    pub fn new(kind: GmailErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Create from an HTTP status code.
    ///
    /// Gmail reports account-level authorization failures as 401 (and as
    /// 403 with an `authError` reason); per-user quota trips arrive as
    /// 403 bodies mentioning `rateLimitExceeded`.
    pub fn from_status(status: u16, body: &str) -> Self {
        let kind = match status {
            400 => GmailErrorKind::InvalidParameter,
            401 => GmailErrorKind::AuthenticationFailed,
            403 if body.contains("rateLimitExceeded") => GmailErrorKind::RateLimitExceeded,
            403 if body.contains("authError") => GmailErrorKind::AuthenticationFailed,
            403 if body.contains("insufficientPermissions") => GmailErrorKind::InsufficientScope,
            403 => GmailErrorKind::PermissionDenied,
            404 => GmailErrorKind::NotFound,
            429 => GmailErrorKind::RateLimitExceeded,
            500..=599 => GmailErrorKind::ServerError,
            _ => GmailErrorKind::HttpError(status),
        };
        Self::new(kind, body.chars().take(500).collect::<String>())
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        Self::new(GmailErrorKind::AuthenticationFailed, msg)
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::new(GmailErrorKind::InvalidParameter, msg)
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::new(GmailErrorKind::NetworkError, msg)
    }

    /// Whether this error invalidates the whole credential rather than a
    /// single request. Batch verification escalates these instead of
    /// recording a per-address error.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(
            self.kind,
            GmailErrorKind::AuthenticationFailed | GmailErrorKind::TokenExpired
        )
    }
}

/// Convenience type alias.
pub type GmailResult<T> = Result<T, GmailError>;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  OAuth2
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Google OAuth2 scopes for Gmail.
pub mod scopes {
    /// Read-only access to messages and labels (all the pipeline needs).
    pub const GMAIL_READONLY: &str = "https://www.googleapis.com/auth/gmail.readonly";
    /// Metadata-only access (headers and labels, no bodies).
    pub const GMAIL_METADATA: &str = "https://www.googleapis.com/auth/gmail.metadata";
}

/// OAuth2 client credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthCredentials {
    /// OAuth2 client ID from Google Cloud Console.
    pub client_id: String,
    /// OAuth2 client secret.
    pub client_secret: String,
    /// Redirect URI for the OAuth flow.
    pub redirect_uri: String,
    /// Requested scopes.
    pub scopes: Vec<String>,
}

impl Default for OAuthCredentials {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: "urn:ietf:wg:oauth:2.0:oob".to_string(),
            scopes: vec![scopes::GMAIL_READONLY.to_string()],
        }
    }
}

/// OAuth2 token pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthToken {
    /// Bearer access token.
    pub access_token: String,
    /// Refresh token (used to obtain new access tokens).
    pub refresh_token: Option<String>,
    /// Token type (usually "Bearer").
    pub token_type: String,
    /// Expiry time.
    pub expires_at: Option<DateTime<Utc>>,
    /// Granted scopes.
    pub scope: Option<String>,
}

impl Default for OAuthToken {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            refresh_token: None,
            token_type: "Bearer".to_string(),
            expires_at: None,
            scope: None,
        }
    }
}

impl OAuthToken {
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(exp) => Utc::now() >= exp,
            None => false,
        }
    }
}

/// Raw JSON response from Google's token endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub token_type: Option<String>,
    pub expires_in: Option<i64>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Gmail wire types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Reference to a message in a list response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRef {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub thread_id: String,
}

/// Response from `users.messages.list`.
///
/// Gmail omits `messages` entirely when there are no matches, so both
/// fields default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageList {
    #[serde(default)]
    pub messages: Vec<MessageRef>,
    #[serde(default)]
    pub result_size_estimate: u64,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Response from `users.getProfile`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GmailProfile {
    #[serde(default)]
    pub email_address: String,
    #[serde(default)]
    pub messages_total: i64,
    #[serde(default)]
    pub threads_total: i64,
    #[serde(default)]
    pub history_id: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Verification results
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Outcome of a single sent-mail existence check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SendStatus {
    /// At least one sent message addressed to this recipient exists.
    Sent,
    /// The store answered cleanly with no match.
    NotFound,
    /// The check itself failed; see the diagnostic on the result.
    Error,
}

impl std::fmt::Display for SendStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sent => write!(f, "Sent"),
            Self::NotFound => write!(f, "Not Found"),
            Self::Error => write!(f, "Error"),
        }
    }
}

/// One verification result per input address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub address: String,
    pub status: SendStatus,
    /// Diagnostic string, present only when `status` is `Error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerificationResult {
    pub fn sent(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            status: SendStatus::Sent,
            error: None,
        }
    }

    pub fn not_found(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            status: SendStatus::NotFound,
            error: None,
        }
    }

    pub fn failed(address: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            status: SendStatus::Error,
            error: Some(error.into()),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Configuration
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Gmail service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GmailConfig {
    /// Display name for this connection.
    pub name: String,
    /// OAuth2 credentials.
    pub credentials: OAuthCredentials,
    /// Request timeout (seconds).
    pub timeout_seconds: u64,
    /// Maximum retries for transient failures.
    pub max_retries: u32,
    /// Rate-limit delay between requests (ms).
    pub rate_limit_ms: u64,
    /// Maximum concurrent existence queries per verification batch.
    pub max_in_flight: usize,
}

impl Default for GmailConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            credentials: OAuthCredentials::default(),
            timeout_seconds: 30,
            max_retries: 3,
            rate_limit_ms: 100,
            max_in_flight: 8,
        }
    }
}

/// Connection summary (non-sensitive subset of config + state).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GmailConnectionSummary {
    pub name: String,
    pub authenticated: bool,
    pub user_email: Option<String>,
    pub messages_total: Option<i64>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
