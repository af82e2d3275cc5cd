//! Batch sent-mail verification.
//!
//! Fans out one existence query per address against a [`SentMailStore`],
//! with bounded concurrency. Outcomes are classified per address:
//!
//! - store reports a match → `Sent`
//! - store answers cleanly with no match → `NotFound`
//! - the query itself fails → `Error`, diagnostic attached, siblings
//!   unaffected
//!
//! Account-level credential rejection is the one exception to per-item
//! isolation: it invalidates every pending query uniformly, so it fails
//! the whole batch and the caller re-authenticates instead of reading N
//! identical error rows.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use log::{debug, warn};

use crate::client::GmailClient;
use crate::query::MailQueryBuilder;
use crate::types::{GmailResult, MessageList, VerificationResult};

/// Default cap on concurrent in-flight existence queries.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 8;

/// The one operation the verifier needs from a message store: whether at
/// least one sent message addressed to `address` exists for the
/// authenticated account. Any store satisfying this contract can be
/// substituted.
#[async_trait]
pub trait SentMailStore: Send + Sync {
    async fn has_sent_to(&self, address: &str) -> GmailResult<bool>;
}

#[async_trait]
impl SentMailStore for GmailClient {
    /// `users.messages.list` with `to:<address> label:SENT`, capped at one
    /// result; only existence matters, not content.
    async fn has_sent_to(&self, address: &str) -> GmailResult<bool> {
        let q = MailQueryBuilder::new().to(address).in_sent().build();
        let url = GmailClient::api_url("users/me/messages");
        let list: MessageList = self
            .get_json_with_query(&url, &[("q", q.as_str()), ("maxResults", "1")])
            .await?;
        Ok(list.result_size_estimate > 0 || !list.messages.is_empty())
    }
}

/// Check a single address, converting per-query failures into data.
///
/// Only credential-rejection errors propagate as `Err`; everything else
/// becomes a `VerificationResult` so one bad query cannot sink a batch.
pub async fn check_address<S>(store: &S, address: &str) -> GmailResult<VerificationResult>
where
    S: SentMailStore + ?Sized,
{
    match store.has_sent_to(address).await {
        Ok(true) => Ok(VerificationResult::sent(address)),
        Ok(false) => Ok(VerificationResult::not_found(address)),
        Err(e) if e.is_auth_rejection() => Err(e),
        Err(e) => {
            warn!("Check failed for {}: {}", address, e);
            Ok(VerificationResult::failed(address, e.to_string()))
        }
    }
}

/// Verify a batch of addresses with at most `max_in_flight` concurrent
/// queries.
///
/// On success the result vector has the same length and order as the
/// input, regardless of the order in which queries complete. All queries
/// settle before the batch is assembled; a credential rejection then
/// fails the call as a whole.
pub async fn verify_addresses<S>(
    store: &S,
    addresses: &[String],
    max_in_flight: usize,
) -> GmailResult<Vec<VerificationResult>>
where
    S: SentMailStore + ?Sized,
{
    let limit = max_in_flight.max(1);
    debug!(
        "Verifying {} addresses ({} max in flight)",
        addresses.len(),
        limit
    );

    let settled: Vec<GmailResult<VerificationResult>> = stream::iter(addresses)
        .map(|address| check_address(store, address))
        .buffered(limit)
        .collect()
        .await;

    let mut results = Vec::with_capacity(settled.len());
    for outcome in settled {
        results.push(outcome?);
    }
    Ok(results)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GmailError, GmailErrorKind, OAuthToken, SendStatus};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Clone)]
    enum Outcome {
        Sent,
        NotFound,
        Fail(&'static str),
        AuthFail,
        SlowSent(u64),
    }

    #[derive(Default)]
    struct MockStore {
        outcomes: HashMap<String, Outcome>,
        calls: AtomicUsize,
    }

    impl MockStore {
        fn with(outcomes: &[(&str, Outcome)]) -> Self {
            Self {
                outcomes: outcomes
                    .iter()
                    .map(|(a, o)| (a.to_string(), o.clone()))
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SentMailStore for MockStore {
        async fn has_sent_to(&self, address: &str) -> GmailResult<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.outcomes.get(address) {
                Some(Outcome::Sent) => Ok(true),
                Some(Outcome::NotFound) | None => Ok(false),
                Some(Outcome::Fail(msg)) => Err(GmailError::network(*msg)),
                Some(Outcome::AuthFail) => Err(GmailError::from_status(401, "invalid credentials")),
                Some(Outcome::SlowSent(ms)) => {
                    tokio::time::sleep(Duration::from_millis(*ms)).await;
                    Ok(true)
                }
            }
        }
    }

    fn addrs(list: &[&str]) -> Vec<String> {
        list.iter().map(|a| a.to_string()).collect()
    }

    // ── Single checks ────────────────────────────────────────────

    #[tokio::test]
    async fn sent_and_not_found_mapping() {
        let store = MockStore::with(&[("a@x.com", Outcome::Sent), ("b@x.com", Outcome::NotFound)]);
        let results = verify_addresses(&store, &addrs(&["a@x.com", "b@x.com"]), 4)
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].address, "a@x.com");
        assert_eq!(results[0].status, SendStatus::Sent);
        assert_eq!(results[1].address, "b@x.com");
        assert_eq!(results[1].status, SendStatus::NotFound);
    }

    #[tokio::test]
    async fn transport_error_becomes_data_not_failure() {
        let store = MockStore::with(&[("a@x.com", Outcome::Fail("connection reset"))]);
        let results = verify_addresses(&store, &addrs(&["a@x.com"]), 4)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, SendStatus::Error);
        assert!(results[0].error.as_ref().unwrap().contains("connection reset"));
    }

    // ── Batch contracts ──────────────────────────────────────────

    #[tokio::test]
    async fn output_matches_input_cardinality_and_order() {
        let input = addrs(&["e@x.com", "a@x.com", "c@x.com", "b@x.com", "d@x.com"]);
        let store = MockStore::with(&[("a@x.com", Outcome::Sent), ("c@x.com", Outcome::Sent)]);
        let results = verify_addresses(&store, &input, 2).await.unwrap();
        assert_eq!(results.len(), input.len());
        for (result, address) in results.iter().zip(&input) {
            assert_eq!(&result.address, address);
        }
    }

    #[tokio::test]
    async fn order_preserved_despite_completion_order() {
        // The first address completes last; positional output must not care.
        let store = MockStore::with(&[
            ("slow@x.com", Outcome::SlowSent(50)),
            ("fast@x.com", Outcome::Sent),
        ]);
        let results = verify_addresses(&store, &addrs(&["slow@x.com", "fast@x.com"]), 2)
            .await
            .unwrap();
        assert_eq!(results[0].address, "slow@x.com");
        assert_eq!(results[0].status, SendStatus::Sent);
        assert_eq!(results[1].address, "fast@x.com");
    }

    #[tokio::test]
    async fn one_failure_does_not_affect_siblings() {
        let store = MockStore::with(&[
            ("a@x.com", Outcome::Sent),
            ("b@x.com", Outcome::Fail("boom")),
            ("c@x.com", Outcome::NotFound),
        ]);
        let results = verify_addresses(&store, &addrs(&["a@x.com", "b@x.com", "c@x.com"]), 4)
            .await
            .unwrap();
        assert_eq!(results[0].status, SendStatus::Sent);
        assert_eq!(results[1].status, SendStatus::Error);
        assert_eq!(results[2].status, SendStatus::NotFound);
    }

    #[tokio::test]
    async fn empty_batch_issues_no_queries() {
        let store = MockStore::default();
        let results = verify_addresses(&store, &[], 4).await.unwrap();
        assert!(results.is_empty());
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn every_address_is_queried_exactly_once() {
        let input = addrs(&["a@x.com", "b@x.com", "c@x.com"]);
        let store = MockStore::with(&[]);
        verify_addresses(&store, &input, 1).await.unwrap();
        assert_eq!(store.call_count(), 3);
    }

    #[tokio::test]
    async fn zero_concurrency_clamped_to_one() {
        let store = MockStore::with(&[("a@x.com", Outcome::Sent)]);
        let results = verify_addresses(&store, &addrs(&["a@x.com"]), 0).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    // ── Credential rejection ─────────────────────────────────────

    #[tokio::test]
    async fn auth_rejection_fails_whole_batch() {
        let store = MockStore::with(&[
            ("a@x.com", Outcome::Sent),
            ("b@x.com", Outcome::AuthFail),
            ("c@x.com", Outcome::Sent),
        ]);
        let err = verify_addresses(&store, &addrs(&["a@x.com", "b@x.com", "c@x.com"]), 4)
            .await
            .unwrap_err();
        assert_eq!(err.kind, GmailErrorKind::AuthenticationFailed);
    }

    #[tokio::test]
    async fn check_address_propagates_auth_rejection() {
        let store = MockStore::with(&[("a@x.com", Outcome::AuthFail)]);
        let err = check_address(&store, "a@x.com").await.unwrap_err();
        assert!(err.is_auth_rejection());
    }

    // ── Client precondition (no token → no network) ──────────────

    #[tokio::test]
    async fn client_without_token_rejects_before_any_query() {
        let client = GmailClient::default_client().unwrap();
        let err = client.has_sent_to("a@x.com").await.unwrap_err();
        assert_eq!(err.kind, GmailErrorKind::AuthenticationFailed);
    }

    #[tokio::test]
    async fn client_with_expired_token_rejects_before_any_query() {
        let mut client = GmailClient::default_client().unwrap();
        client.set_token(OAuthToken {
            access_token: "ya29.expired".into(),
            expires_at: Some(chrono::Utc::now() - chrono::Duration::hours(1)),
            ..Default::default()
        });
        let err = client.has_sent_to("a@x.com").await.unwrap_err();
        assert_eq!(err.kind, GmailErrorKind::TokenExpired);
    }

    #[tokio::test]
    async fn batch_with_unauthenticated_client_fails_as_a_whole() {
        let client = GmailClient::default_client().unwrap();
        let err = verify_addresses(&client, &addrs(&["a@x.com", "b@x.com"]), 4)
            .await
            .unwrap_err();
        assert!(err.is_auth_rejection());
    }
}
