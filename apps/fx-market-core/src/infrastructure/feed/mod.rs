//! Real-Time FX Price Feed
//!
//! Streaming client for the vendor's WebSocket price feed.
//!
//! # Variants
//!
//! - **Key join**: `?api_key=` on the socket URL, `join`/`leave` frames keyed
//!   by `symbol@timeframe`
//! - **Token socket**: `POST /authenticate` for an access token, then
//!   `?access_token=` on the socket URL and `subscribe`/`unsubscribe` frames
//!   keyed by symbol
//!
//! Both share the same client, reconnect policy and subscription table; only
//! the [`FeedProtocol`] codec differs.

/// Token exchange for the token socket variant.
pub mod auth;

/// Connection lifecycle, subscriptions and event dispatch.
pub mod client;

/// Wire formats of the supported vendor variants.
pub mod protocol;

/// Bounded fixed-delay reconnection.
pub mod reconnect;

/// WebSocket transport adapter.
pub mod transport;

pub use auth::{AuthError, Credentials, HttpTokenIssuer};
pub use client::{
    ConnectionState, MarketDataStreamClient, StreamClientConfig, StreamError, StreamErrorKind,
    StreamEvent, watch_events,
};
pub use protocol::{CodecError, FeedProtocol, InboundMessage};
pub use reconnect::{ReconnectConfig, ReconnectPolicy};
pub use transport::WsTransport;
