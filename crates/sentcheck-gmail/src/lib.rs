//! # SentCheck – Gmail Sent-Mail Verification
//!
//! Checks, for a batch of email addresses, whether the authenticated
//! account has ever sent mail to each of them, via the Gmail API v1.
//!
//! ## Features
//!
//! - **OAuth2 Authentication** – authorization URL, code exchange, token
//!   refresh and revocation
//! - **Gmail Client** – bearer-token auth, rate limiting, retries with
//!   exponential backoff
//! - **Search Queries** – fluent builder for Gmail query syntax
//! - **Batch Verification** – bounded concurrent existence checks with
//!   per-address failure isolation and positional output ordering
//! - **Credential Rejection** – account-level auth failures fail the
//!   batch once instead of producing N per-address errors
//! - **Service Façade** – client, credentials, and the extract→verify
//!   pipeline behind one shareable state struct

pub mod types;
pub mod client;
pub mod auth;
pub mod query;
pub mod verify;
pub mod service;
