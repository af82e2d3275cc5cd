//! HTTP client for the Gmail API v1.
//!
//! Wraps `reqwest::Client` with OAuth2 bearer-token auth, request-level
//! rate limiting, and exponential-backoff retries for the read-only
//! message endpoints the verification pipeline uses.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::types::{GmailConfig, GmailError, GmailErrorKind, GmailProfile, GmailResult, OAuthToken};

/// Base URL for Gmail API v1 endpoints.
pub const API_BASE: &str = "https://gmail.googleapis.com/gmail/v1";
/// Google OAuth2 token endpoint.
pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
/// Google OAuth2 authorization endpoint.
pub const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
/// Google OAuth2 token revocation endpoint.
pub const REVOKE_URL: &str = "https://oauth2.googleapis.com/revoke";

/// Gmail HTTP client with built-in auth, rate-limiting, and retries.
#[derive(Clone)]
pub struct GmailClient {
    /// Inner reqwest client.
    inner: Client,
    /// Currently active OAuth2 token.
    token: Option<OAuthToken>,
    /// Configuration.
    config: GmailConfig,
    /// Nanosecond timestamp of the last request (for rate-limiting).
    last_request_ns: Arc<AtomicU64>,
}

impl GmailClient {
    // ── Construction ─────────────────────────────────────────────

    /// Create a new client from config.
    pub fn new(config: GmailConfig) -> GmailResult<Self> {
        let inner = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| GmailError::network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            inner,
            token: None,
            config,
            last_request_ns: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Create a client without any configuration (for tests / quick scripts).
    pub fn default_client() -> GmailResult<Self> {
        Self::new(GmailConfig::default())
    }

    // ── Token management ─────────────────────────────────────────

    /// Set the active OAuth2 token.
    pub fn set_token(&mut self, token: OAuthToken) {
        self.token = Some(token);
    }

    /// Drop the active token (sign-out).
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Get a reference to the current token, if any.
    pub fn token(&self) -> Option<&OAuthToken> {
        self.token.as_ref()
    }

    /// Whether the client currently has a valid (non-expired) token.
    pub fn is_authenticated(&self) -> bool {
        self.token
            .as_ref()
            .map(|t| !t.access_token.is_empty() && !t.is_expired())
            .unwrap_or(false)
    }

    /// Get the config reference.
    pub fn config(&self) -> &GmailConfig {
        &self.config
    }

    /// Get mutable config reference.
    pub fn config_mut(&mut self) -> &mut GmailConfig {
        &mut self.config
    }

    // ── Rate limiting ────────────────────────────────────────────

    async fn rate_limit(&self) {
        if self.config.rate_limit_ms == 0 {
            return;
        }
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64;
        let last = self.last_request_ns.load(Ordering::Relaxed);
        let min_gap = self.config.rate_limit_ms * 1_000_000; // ms → ns
        if last > 0 && now.saturating_sub(last) < min_gap {
            let wait = min_gap - now.saturating_sub(last);
            tokio::time::sleep(Duration::from_nanos(wait)).await;
        }
        self.last_request_ns.store(
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos() as u64,
            Ordering::Relaxed,
        );
    }

    // ── Request building helpers ─────────────────────────────────

    fn auth_headers(&self) -> GmailResult<HeaderMap> {
        let token = self
            .token
            .as_ref()
            .ok_or_else(|| GmailError::auth("No OAuth2 token set"))?;
        if token.access_token.is_empty() {
            return Err(GmailError::auth("OAuth2 token is empty"));
        }
        if token.is_expired() {
            return Err(GmailError::new(
                GmailErrorKind::TokenExpired,
                "OAuth2 token has expired — refresh required",
            ));
        }
        let mut headers = HeaderMap::new();
        let val = format!("Bearer {}", token.access_token);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&val)
                .map_err(|e| GmailError::auth(format!("Invalid auth header: {e}")))?,
        );
        Ok(headers)
    }

    fn build_request(&self, method: Method, url: &str) -> GmailResult<RequestBuilder> {
        let headers = self.auth_headers()?;
        Ok(self.inner.request(method, url).headers(headers))
    }

    // ── Core execution with retries ──────────────────────────────

    /// Execute a request builder with automatic retry on transient failures.
    async fn execute_with_retry(
        &self,
        build_fn: impl Fn() -> GmailResult<RequestBuilder>,
    ) -> GmailResult<Response> {
        let max_retries = self.config.max_retries;
        let mut attempt = 0u32;
        loop {
            self.rate_limit().await;
            let request = build_fn()?
                .build()
                .map_err(|e| GmailError::network(format!("Failed to build request: {e}")))?;
            debug!("Gmail API {} {}", request.method(), request.url());

            match self.inner.execute(request).await {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        return Ok(resp);
                    }
                    let body = resp.text().await.unwrap_or_default();
                    let err = GmailError::from_status(status.as_u16(), &body);

                    // Retry on 429 and 5xx
                    if (status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error())
                        && attempt < max_retries
                    {
                        attempt += 1;
                        let backoff = Duration::from_millis(500 * 2u64.pow(attempt));
                        warn!(
                            "Gmail API transient error ({}), retry {}/{} in {:?}",
                            status, attempt, max_retries, backoff
                        );
                        tokio::time::sleep(backoff).await;
                        continue;
                    }
                    return Err(err);
                }
                Err(e) => {
                    if attempt < max_retries {
                        attempt += 1;
                        let backoff = Duration::from_millis(500 * 2u64.pow(attempt));
                        warn!(
                            "Gmail API network error: {}, retry {}/{} in {:?}",
                            e, attempt, max_retries, backoff
                        );
                        tokio::time::sleep(backoff).await;
                        continue;
                    }
                    return Err(GmailError::network(e.to_string()));
                }
            }
        }
    }

    // ── Public HTTP helpers ──────────────────────────────────────

    /// GET a JSON response.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> GmailResult<T> {
        let url_owned = url.to_string();
        let resp = self
            .execute_with_retry(|| self.build_request(Method::GET, &url_owned))
            .await?;
        resp.json::<T>()
            .await
            .map_err(|e| GmailError::network(format!("JSON parse error: {e}")))
    }

    /// GET with query parameters, return JSON.
    pub async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> GmailResult<T> {
        let url_owned = url.to_string();
        let resp = self
            .execute_with_retry(|| {
                Ok(self.build_request(Method::GET, &url_owned)?.query(query))
            })
            .await?;
        resp.json::<T>()
            .await
            .map_err(|e| GmailError::network(format!("JSON parse error: {e}")))
    }

    /// POST to the token endpoint (un-authenticated).
    pub async fn post_form_unauthenticated<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> GmailResult<T> {
        self.rate_limit().await;
        let resp = self
            .inner
            .post(url)
            .form(params)
            .send()
            .await
            .map_err(|e| GmailError::network(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(GmailError::from_status(status, &body));
        }
        resp.json::<T>()
            .await
            .map_err(|e| GmailError::network(format!("Token response parse error: {e}")))
    }

    /// Fetch the authenticated user's mailbox profile.
    pub async fn profile(&self) -> GmailResult<GmailProfile> {
        self.get_json(&Self::api_url("users/me/profile")).await
    }

    /// Build a full API URL: `{API_BASE}/{path}`.
    pub fn api_url(path: &str) -> String {
        format!("{}/{}", API_BASE, path.trim_start_matches('/'))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
