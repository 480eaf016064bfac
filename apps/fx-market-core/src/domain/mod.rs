//! Domain Layer - Session rules, FX analytics and subscription tracking.
//!
//! Everything here is synchronous and free of I/O. Utilities signal
//! "cannot compute" with `None` or an empty result instead of errors.

/// Forex trading-week rules and market status.
pub mod session;

/// Timeframe normalization and default window sizing.
pub mod timeframe;

/// Pip value per standard lot.
pub mod pricing;

/// Key price level extraction from footprint signals.
pub mod levels;

/// Subscription tracking for the stream client.
pub mod subscription;
