//! Feed Wire Protocol
//!
//! Encoding and decoding for the two vendor protocol variants.
//!
//! # Token-then-socket
//!
//! - URL: `{ws_url}?access_token={token}`
//! - Subscribe: `{"event":"subscribe","pairs":["EUR/USD"]}`
//! - Unsubscribe: `{"event":"unsubscribe","pairs":["EUR/USD"]}`
//! - Prices arrive as events named after the pair:
//!   `{"event":"EUR/USD","data":{...}}`
//!
//! # Key-based join
//!
//! - URL: `{ws_url}?api_key={key}`
//! - Subscribe: `{"type":"join","symbol":"EUR/USD","timeframe":"15m"}`
//! - Unsubscribe: `{"type":"leave","symbol":"EUR/USD","timeframe":"15m"}`
//! - Inbound: `{"type":"price","symbol":..,"timeframe":..,"prices":..}`,
//!   `{"type":"error","short":..,"details":..}`, or informational envelopes.
//!
//! An error whose `short` is `authentication_failed` is fatal.

use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::domain::subscription::SubscriptionKey;

/// Error code the vendor uses for rejected credentials.
pub const AUTHENTICATION_FAILED: &str = "authentication_failed";

/// Token-variant event names that carry no price data.
const CONTROL_EVENTS: &[&str] = &[
    "connect",
    "connected",
    "subscribe",
    "subscribed",
    "unsubscribe",
    "unsubscribed",
    "info",
    "welcome",
    "heartbeat",
];

/// Codec errors.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// JSON encoding/decoding failed.
    #[error("JSON codec error: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload was not a JSON object.
    #[error("invalid message format: {0}")]
    InvalidFormat(String),

    /// The feed base URL could not be parsed.
    #[error("invalid feed URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Vendor protocol variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedProtocol {
    /// Authenticate over HTTP, then open the socket with the token.
    TokenSocket,
    /// Open the socket with an API key and join per symbol and timeframe.
    #[default]
    KeyJoin,
}

impl FeedProtocol {
    /// Parse a protocol name (`token` or `key`), defaulting to `KeyJoin`.
    #[must_use]
    pub fn from_str_case_insensitive(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "token" | "token_socket" => Self::TokenSocket,
            _ => Self::KeyJoin,
        }
    }

    /// Protocol name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TokenSocket => "token",
            Self::KeyJoin => "key",
        }
    }

    /// Whether the socket needs a token from [`crate::application::ports::TokenIssuer`].
    #[must_use]
    pub const fn requires_token(&self) -> bool {
        matches!(self, Self::TokenSocket)
    }

    /// Socket URL carrying the credential as a percent-encoded query parameter.
    ///
    /// # Errors
    ///
    /// Returns an error if `base` is not an absolute URL.
    pub fn socket_url(&self, base: &str, credential: &str) -> Result<String, CodecError> {
        let param = match self {
            Self::TokenSocket => "access_token",
            Self::KeyJoin => "api_key",
        };
        let mut url = Url::parse(base)?;
        url.query_pairs_mut().append_pair(param, credential);
        Ok(url.into())
    }

    /// Identity of a subscription on the wire.
    ///
    /// The token variant subscribes whole pairs, so every timeframe of a
    /// symbol shares one remote subscription.
    #[must_use]
    pub fn wire_key(&self, key: &SubscriptionKey) -> String {
        match self {
            Self::TokenSocket => key.symbol.clone(),
            Self::KeyJoin => key.to_string(),
        }
    }

    /// Frame subscribing to `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn subscribe_frame(&self, key: &SubscriptionKey) -> Result<String, CodecError> {
        self.frame(key, true)
    }

    /// Frame unsubscribing from `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn unsubscribe_frame(&self, key: &SubscriptionKey) -> Result<String, CodecError> {
        self.frame(key, false)
    }

    fn frame(&self, key: &SubscriptionKey, subscribe: bool) -> Result<String, CodecError> {
        let json = match self {
            Self::TokenSocket => serde_json::to_string(&PairsRequest {
                event: if subscribe { "subscribe" } else { "unsubscribe" },
                pairs: vec![key.symbol.as_str()],
            })?,
            Self::KeyJoin => serde_json::to_string(&JoinRequest {
                msg_type: if subscribe { "join" } else { "leave" },
                symbol: &key.symbol,
                timeframe: &key.timeframe,
            })?,
        };
        Ok(json)
    }

    /// Decode an inbound text frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a JSON object.
    pub fn decode(&self, text: &str) -> Result<InboundMessage, CodecError> {
        let value: Value = serde_json::from_str(text.trim())?;
        if !value.is_object() {
            return Err(CodecError::InvalidFormat(format!(
                "expected JSON object, got: {}",
                truncate(text)
            )));
        }

        Ok(match self {
            Self::TokenSocket => decode_event(value),
            Self::KeyJoin => decode_typed(value),
        })
    }
}

#[derive(Serialize)]
struct PairsRequest<'a> {
    event: &'static str,
    pairs: Vec<&'a str>,
}

#[derive(Serialize)]
struct JoinRequest<'a> {
    #[serde(rename = "type")]
    msg_type: &'static str,
    symbol: &'a str,
    timeframe: &'a str,
}

/// A decoded inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// Price update.
    Price {
        /// Instrument symbol.
        symbol: String,
        /// Timeframe, when the feed keys by it.
        timeframe: Option<String>,
        /// Raw price payload.
        data: Value,
    },
    /// Vendor error.
    Error {
        /// Short error code.
        short: String,
        /// Optional details.
        details: Option<String>,
    },
    /// Informational envelope with nothing to dispatch.
    Info(Value),
}

impl InboundMessage {
    /// Whether this is an error the client must not retry.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Error { short, .. } if short == AUTHENTICATION_FAILED)
    }
}

fn decode_typed(mut value: Value) -> InboundMessage {
    let msg_type = string_field(&value, "type");
    match msg_type.as_deref() {
        Some("price") => {
            let Some(symbol) = string_field(&value, "symbol") else {
                return InboundMessage::Info(value);
            };
            let timeframe = string_field(&value, "timeframe");
            let data = value.get_mut("prices").map(Value::take).unwrap_or(Value::Null);
            InboundMessage::Price {
                symbol,
                timeframe,
                data,
            }
        }
        Some("error") => error_from(&value),
        _ => InboundMessage::Info(value),
    }
}

fn decode_event(mut value: Value) -> InboundMessage {
    let Some(event) = string_field(&value, "event") else {
        return InboundMessage::Info(value);
    };

    if event == "error" {
        return value
            .get("data")
            .filter(|d| d.is_object())
            .map_or_else(|| error_from(&value), error_from);
    }
    if CONTROL_EVENTS.contains(&event.as_str()) {
        return InboundMessage::Info(value);
    }

    let data = value.get_mut("data").map(Value::take).unwrap_or(Value::Null);
    InboundMessage::Price {
        symbol: event,
        timeframe: None,
        data,
    }
}

fn error_from(value: &Value) -> InboundMessage {
    InboundMessage::Error {
        short: string_field(value, "short").unwrap_or_else(|| "unknown".to_string()),
        details: string_field(value, "details"),
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn truncate(text: &str) -> &str {
    let end = text
        .char_indices()
        .nth(50)
        .map_or(text.len(), |(idx, _)| idx);
    &text[..end]
}
