// Tollgate — Consumer data models
//
// SECURITY: The `secret` field is private. It never appears in Debug or
// Display output, log messages, or serialized listings. Read it only via
// `Consumer::secret()`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One trusted caller: the key/secret pair plus its approval flags.
///
/// Equality compares every field, secret included.
#[derive(Clone, PartialEq, Eq)]
pub struct Consumer {
    key: String,
    /// The shared secret — NEVER printed, logged, or Debug-displayed
    secret: String,
    pub name: String,
    /// Not yet approved for unsupervised use.
    pub provisional: bool,
    /// May bypass manual approval.
    pub trusted: bool,
}

impl Consumer {
    /// A new consumer, provisional and untrusted.
    pub fn new(
        key: impl Into<String>,
        secret: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
            name: name.into(),
            provisional: true,
            trusted: false,
        }
    }

    pub fn with_provisional(mut self, provisional: bool) -> Self {
        self.provisional = provisional;
        self
    }

    pub fn with_trusted(mut self, trusted: bool) -> Self {
        self.trusted = trusted;
        self
    }

    /// The consumer key. Immutable once the record exists.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Access the raw shared secret.
    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn summary(&self) -> ConsumerSummary {
        ConsumerSummary {
            key: self.key.clone(),
            name: self.name.clone(),
            provisional: self.provisional,
            trusted: self.trusted,
        }
    }
}

/// Custom Debug implementation that NEVER reveals the secret.
impl fmt::Debug for Consumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer")
            .field("key", &self.key)
            .field("secret", &"[REDACTED]")
            .field("name", &self.name)
            .field("provisional", &self.provisional)
            .field("trusted", &self.trusted)
            .finish()
    }
}

impl fmt::Display for Consumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.key)
    }
}

/// A secret-free view of a consumer, used for listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerSummary {
    pub key: String,
    pub name: String,
    pub provisional: bool,
    pub trusted: bool,
}

impl fmt::Display for ConsumerSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.key)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
