#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! FX Market Core - Session Rules, FX Analytics and Price Streaming
//!
//! Core of a forex trading-information service: decides whether the FX
//! market is open, provides small analytics utilities, and maintains a
//! resilient streaming connection to a real-time price vendor.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Pure, synchronous rules and utilities
//!   - `session`: Trading-week rules and market status
//!   - `timeframe`: Timeframe normalization and footprint window sizing
//!   - `pricing`: Pip value per standard lot
//!   - `levels`: Key price levels from footprint signals
//!   - `subscription`: Subscription table for the stream client
//!
//! - **Application**: Port definitions
//!   - `ports`: Clock, feed socket and token endpoint interfaces
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `clock`: Timezone-aware clock (`chrono-tz`)
//!   - `feed`: WebSocket stream client, vendor codecs, reconnect policy
//!   - `config`: Environment configuration
//!   - `health`: Health check HTTP endpoint
//!   - `metrics` / `telemetry`: Prometheus and OpenTelemetry
//!
//! # Data Flow
//!
//! ```text
//! Vendor WS ──► WsTransport ──► MarketDataStreamClient ──► StreamEvent channel ──► Caller
//!                                   ▲            │
//!            subscribe/unsubscribe ─┘            └── reconnect + replay on drop
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Session rules and analytics with no I/O.
pub mod domain;

/// Application layer - Port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::levels::{KeyLevelRequest, extract_key_levels, price_precision};
pub use domain::pricing::{CurrencyPair, PipValueRequest, pip_value_per_lot};
pub use domain::session::{
    MarketClockReading, MarketSessionEvaluator, MarketStatus, MarketWeekday, SessionHours,
    StatusReason, is_session_open,
};
pub use domain::subscription::{SubscriptionKey, SubscriptionTable, Symbol};
pub use domain::timeframe::{CanonicalInterval, IntervalUnit, default_points, normalize};

// Ports
pub use application::ports::{
    AuthError, Credentials, FeedConnection, FeedTransport, MarketClock, TokenIssuer,
    TransportError, TransportFrame,
};

// Stream client
pub use infrastructure::feed::{
    ConnectionState, FeedProtocol, HttpTokenIssuer, MarketDataStreamClient, ReconnectConfig,
    StreamClientConfig, StreamError, StreamErrorKind, StreamEvent, WsTransport, watch_events,
};

// Clock
pub use infrastructure::clock::ZonedClock;

// Infrastructure config
pub use infrastructure::config::{AppConfig, ConfigError};

// Health server
pub use infrastructure::health::{HealthServer, HealthServerError, HealthServerState};

// Metrics
pub use infrastructure::metrics::init_metrics;

// Telemetry
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};
