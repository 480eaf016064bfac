//! Configuration Module
//!
//! Environment-driven configuration for the market core.

mod settings;

pub use settings::{
    AppConfig, ConfigError, DEFAULT_FEED_AUTH_URL, DEFAULT_FEED_WS_URL, DEFAULT_HEALTH_PORT,
    DEFAULT_TIMEFRAME, FeedSettings, MarketSettings, ServerSettings,
};
