//! Subscription Table
//!
//! Tracks the `(symbol, timeframe)` pairs a stream client is subscribed to.
//! Keys are unique: subscribing twice to the same key is a no-op, which is
//! what keeps the upstream feed from receiving duplicate subscribe frames.
//!
//! Insertion order is preserved so that replaying the table after a
//! reconnect sends subscriptions in the order the caller made them.

use std::fmt;

/// A symbol string such as `EUR/USD`.
pub type Symbol = String;

/// Unique key of a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionKey {
    /// Instrument symbol.
    pub symbol: Symbol,
    /// Timeframe token (e.g. `15m`).
    pub timeframe: String,
}

impl SubscriptionKey {
    /// Create a key.
    #[must_use]
    pub fn new(symbol: impl Into<Symbol>, timeframe: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe: timeframe.into(),
        }
    }
}

impl fmt::Display for SubscriptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.symbol, self.timeframe)
    }
}

/// Ordered set of active subscriptions.
#[derive(Debug, Default, Clone)]
pub struct SubscriptionTable {
    keys: Vec<SubscriptionKey>,
}

impl SubscriptionTable {
    /// Create an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self { keys: Vec::new() }
    }

    /// Add a key.
    ///
    /// Returns `true` if the key was not present before.
    pub fn insert(&mut self, key: SubscriptionKey) -> bool {
        if self.keys.contains(&key) {
            return false;
        }
        self.keys.push(key);
        true
    }

    /// Remove a key.
    ///
    /// Returns `true` if the key was present.
    pub fn remove(&mut self, key: &SubscriptionKey) -> bool {
        let before = self.keys.len();
        self.keys.retain(|k| k != key);
        self.keys.len() != before
    }

    /// Whether the key is present.
    #[must_use]
    pub fn contains(&self, key: &SubscriptionKey) -> bool {
        self.keys.contains(key)
    }

    /// Keys matching a symbol, optionally narrowed to one timeframe.
    ///
    /// Used to route inbound prices: feeds that key by symbol only match
    /// every timeframe subscribed for that symbol.
    #[must_use]
    pub fn matching(&self, symbol: &str, timeframe: Option<&str>) -> Vec<SubscriptionKey> {
        self.keys
            .iter()
            .filter(|k| k.symbol == symbol && timeframe.is_none_or(|tf| k.timeframe == tf))
            .cloned()
            .collect()
    }

    /// All keys in insertion order.
    #[must_use]
    pub fn keys(&self) -> &[SubscriptionKey] {
        &self.keys
    }

    /// Number of subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether there are no subscriptions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Remove every subscription.
    pub fn clear(&mut self) {
        self.keys.clear();
    }
}
