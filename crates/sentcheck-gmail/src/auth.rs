//! OAuth2 authentication for Gmail.
//!
//! Implements the authorization-code flow that produces the credential
//! the verification pipeline consumes:
//!   1. Build an authorization URL for the user.
//!   2. Exchange the authorization code for tokens.
//!   3. Refresh expired access tokens.
//!   4. Revoke tokens.
//!
//! The verifier itself never refreshes or persists a credential; a
//! rejected credential surfaces there as an authentication error and the
//! caller comes back through this module.

use chrono::{Duration, Utc};
use log::debug;

use crate::client::{GmailClient, AUTH_URL, REVOKE_URL, TOKEN_URL};
use crate::types::{
    GmailError, GmailErrorKind, GmailResult, OAuthCredentials, OAuthToken, TokenResponse,
};

/// Build the Google OAuth2 authorization URL that the user should open.
pub fn build_auth_url(credentials: &OAuthCredentials) -> GmailResult<String> {
    if credentials.client_id.is_empty() {
        return Err(GmailError::invalid("client_id is required"));
    }
    if credentials.scopes.is_empty() {
        return Err(GmailError::invalid("At least one scope is required"));
    }

    let scope = credentials.scopes.join(" ");
    let params = [
        ("client_id", credentials.client_id.as_str()),
        ("redirect_uri", credentials.redirect_uri.as_str()),
        ("response_type", "code"),
        ("scope", &scope),
        ("access_type", "offline"),
        ("prompt", "consent"),
    ];

    let url = url::Url::parse_with_params(AUTH_URL, &params)
        .map_err(|e| GmailError::invalid(format!("Failed to build auth URL: {e}")))?;

    Ok(url.to_string())
}

/// Exchange an authorization code for access + refresh tokens.
pub async fn exchange_code(
    client: &GmailClient,
    credentials: &OAuthCredentials,
    code: &str,
) -> GmailResult<OAuthToken> {
    if code.is_empty() {
        return Err(GmailError::invalid("Authorization code is empty"));
    }

    debug!("Exchanging authorization code for tokens");
    let params = [
        ("client_id", credentials.client_id.as_str()),
        ("client_secret", credentials.client_secret.as_str()),
        ("code", code),
        ("redirect_uri", credentials.redirect_uri.as_str()),
        ("grant_type", "authorization_code"),
    ];

    let resp: TokenResponse = client.post_form_unauthenticated(TOKEN_URL, &params).await?;
    Ok(token_from_response(resp))
}

/// Refresh an expired access token using the refresh token.
pub async fn refresh_token(
    client: &GmailClient,
    credentials: &OAuthCredentials,
    refresh_token: &str,
) -> GmailResult<OAuthToken> {
    if refresh_token.is_empty() {
        return Err(GmailError::new(
            GmailErrorKind::TokenExpired,
            "No refresh token available",
        ));
    }

    debug!("Refreshing access token");
    let params = [
        ("client_id", credentials.client_id.as_str()),
        ("client_secret", credentials.client_secret.as_str()),
        ("refresh_token", refresh_token),
        ("grant_type", "refresh_token"),
    ];

    let resp: TokenResponse = client.post_form_unauthenticated(TOKEN_URL, &params).await?;
    let mut token = token_from_response(resp);
    // Google does not always return a new refresh_token on refresh.
    if token.refresh_token.is_none() {
        token.refresh_token = Some(refresh_token.to_string());
    }
    Ok(token)
}

/// Revoke a token (access or refresh).
pub async fn revoke_token(client: &GmailClient, token: &str) -> GmailResult<()> {
    if token.is_empty() {
        return Err(GmailError::invalid("Token string is empty"));
    }

    debug!("Revoking token");
    let params = [("token", token)];
    let _: serde_json::Value = client
        .post_form_unauthenticated(REVOKE_URL, &params)
        .await
        .or_else(|e| {
            // Revocation endpoint may return 200 with empty body
            if matches!(e.kind, GmailErrorKind::NetworkError) {
                Ok(serde_json::Value::Null)
            } else {
                Err(e)
            }
        })?;
    Ok(())
}

/// Convert the raw token response to our token type.
fn token_from_response(resp: TokenResponse) -> OAuthToken {
    let expires_at = resp.expires_in.map(|secs| Utc::now() + Duration::seconds(secs));
    OAuthToken {
        access_token: resp.access_token,
        refresh_token: resp.refresh_token,
        token_type: resp.token_type.unwrap_or_else(|| "Bearer".into()),
        expires_at,
        scope: resp.scope,
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
