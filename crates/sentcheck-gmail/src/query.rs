//! Gmail search query builder.
//!
//! Provides a fluent API for constructing the `q` parameter used by
//! `users.messages.list`.
//!
//! # Example
//! ```ignore
//! use sentcheck_gmail::query::MailQueryBuilder;
//!
//! let q = MailQueryBuilder::new()
//!     .to("alice@x.com")
//!     .in_sent()
//!     .build();
//! // q = "to:alice@x.com label:SENT"
//! ```

/// Fluent builder for Gmail search queries.
#[derive(Debug, Clone, Default)]
pub struct MailQueryBuilder {
    clauses: Vec<String>,
}

impl MailQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a raw query clause.
    pub fn raw(mut self, clause: &str) -> Self {
        self.clauses.push(clause.to_string());
        self
    }

    // ── Participants ─────────────────────────────────────────────

    /// `to:value`
    pub fn to(mut self, value: &str) -> Self {
        self.clauses.push(format!("to:{}", quote(value)));
        self
    }

    /// `from:value`
    pub fn from(mut self, value: &str) -> Self {
        self.clauses.push(format!("from:{}", quote(value)));
        self
    }

    /// `cc:value`
    pub fn cc(mut self, value: &str) -> Self {
        self.clauses.push(format!("cc:{}", quote(value)));
        self
    }

    // ── Content ──────────────────────────────────────────────────

    /// `subject:value`
    pub fn subject(mut self, value: &str) -> Self {
        self.clauses.push(format!("subject:{}", quote(value)));
        self
    }

    /// `has:attachment`
    pub fn has_attachment(mut self) -> Self {
        self.clauses.push("has:attachment".to_string());
        self
    }

    // ── Labels ───────────────────────────────────────────────────

    /// `label:value`
    pub fn label(mut self, value: &str) -> Self {
        self.clauses.push(format!("label:{}", quote(value)));
        self
    }

    /// `label:SENT` — restrict to messages the account has sent.
    pub fn in_sent(self) -> Self {
        self.label("SENT")
    }

    // ── Time filters ─────────────────────────────────────────────

    /// `newer_than:<n>d`
    pub fn newer_than_days(mut self, days: u32) -> Self {
        self.clauses.push(format!("newer_than:{}d", days));
        self
    }

    /// `older_than:<n>d`
    pub fn older_than_days(mut self, days: u32) -> Self {
        self.clauses.push(format!("older_than:{}d", days));
        self
    }

    // ── Build ────────────────────────────────────────────────────

    /// Join all clauses with a space and return the query string.
    pub fn build(&self) -> String {
        self.clauses.join(" ")
    }

    /// Return whether the query is empty.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Number of clauses.
    pub fn len(&self) -> usize {
        self.clauses.len()
    }
}

/// Quote a value containing whitespace for Gmail query syntax.
fn quote(s: &str) -> String {
    if s.chars().any(char::is_whitespace) {
        format!("\"{}\"", s)
    } else {
        s.to_string()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
