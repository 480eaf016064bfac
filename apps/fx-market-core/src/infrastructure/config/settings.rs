//! Application Configuration Settings
//!
//! Configuration types for the market core, loaded from environment
//! variables. Numeric values outside their allowed range are clamped;
//! unparseable values fall back to the default.

use std::time::Duration;

use crate::domain::session::{DEFAULT_CLOSE_HOUR_FRIDAY, DEFAULT_OPEN_HOUR_SUNDAY, SessionHours};
use crate::domain::timeframe::normalize;
use crate::infrastructure::clock::DEFAULT_MARKET_TIMEZONE;
use crate::infrastructure::feed::client::DEFAULT_EVENT_BUFFER;
use crate::infrastructure::feed::reconnect::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RECONNECT_DELAY};
use crate::infrastructure::feed::{
    AuthError, Credentials, FeedProtocol, ReconnectConfig, StreamClientConfig,
};
use crate::infrastructure::telemetry::TelemetryConfig;

/// Default feed WebSocket URL.
pub const DEFAULT_FEED_WS_URL: &str = "wss://stream.example-fx.com/ws";

/// Default token endpoint base URL.
pub const DEFAULT_FEED_AUTH_URL: &str = "https://api.example-fx.com";

/// Default account type sent with the token request.
pub const DEFAULT_ACCOUNT_TYPE: &str = "demo";

/// Default subscription timeframe.
pub const DEFAULT_TIMEFRAME: &str = "15m";

/// Default symbols subscribed by the binary.
pub const DEFAULT_SYMBOLS: &str = "EUR/USD";

/// Default health server port.
pub const DEFAULT_HEALTH_PORT: u16 = 8083;

const MAX_RECONNECT_ATTEMPTS: i64 = 100;
const MIN_RECONNECT_DELAY_MS: i64 = 100;
const MAX_RECONNECT_DELAY_MS: i64 = 60_000;

/// Market session settings.
#[derive(Debug, Clone)]
pub struct MarketSettings {
    /// IANA timezone of the trading week.
    pub timezone: String,
    /// Weekly boundary hours.
    pub hours: SessionHours,
}

impl Default for MarketSettings {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_MARKET_TIMEZONE.to_string(),
            hours: SessionHours::default(),
        }
    }
}

/// Price feed settings.
#[derive(Clone)]
pub struct FeedSettings {
    /// Vendor protocol variant.
    pub protocol: FeedProtocol,
    /// API key (key variant).
    pub api_key: Option<String>,
    /// WebSocket URL.
    pub ws_url: String,
    /// Token endpoint base URL (token variant).
    pub auth_url: String,
    /// Account login (token variant).
    pub login: Option<String>,
    /// Account password (token variant).
    pub password: Option<String>,
    /// Account type (token variant).
    pub account_type: String,
    /// Reconnection settings.
    pub reconnect: ReconnectConfig,
    /// Canonical timeframe for default subscriptions.
    pub default_timeframe: String,
    /// Symbols subscribed at startup.
    pub symbols: Vec<String>,
}

impl FeedSettings {
    /// Stream client configuration for these settings.
    #[must_use]
    pub fn stream_config(&self) -> StreamClientConfig {
        StreamClientConfig {
            protocol: self.protocol,
            ws_url: self.ws_url.clone(),
            api_key: self.api_key.clone(),
            reconnect: self.reconnect,
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }

    /// Account credentials for the token exchange.
    ///
    /// # Errors
    ///
    /// Returns an error if login or password is missing.
    pub fn credentials(&self) -> Result<Credentials, AuthError> {
        Credentials::new(
            self.login.clone().unwrap_or_default(),
            self.password.clone().unwrap_or_default(),
            self.account_type.clone(),
        )
    }
}

impl std::fmt::Debug for FeedSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedSettings")
            .field("protocol", &self.protocol)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("ws_url", &self.ws_url)
            .field("auth_url", &self.auth_url)
            .field("login", &self.login)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("account_type", &self.account_type)
            .field("reconnect", &self.reconnect)
            .field("default_timeframe", &self.default_timeframe)
            .field("symbols", &self.symbols)
            .finish()
    }
}

/// Server port settings.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Health check HTTP port (0 = disabled).
    pub health_port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            health_port: DEFAULT_HEALTH_PORT,
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Market session settings.
    pub market: MarketSettings,
    /// Price feed settings.
    pub feed: FeedSettings,
    /// Server port settings.
    pub server: ServerSettings,
    /// Log filter and span export settings.
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if credentials required by the selected feed
    /// protocol are missing or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`AppConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let market = MarketSettings {
            timezone: lookup("MARKET_TIMEZONE")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MARKET_TIMEZONE.to_string()),
            hours: SessionHours::new(
                parse_hour(&lookup, "MARKET_OPEN_HOUR_SUNDAY", DEFAULT_OPEN_HOUR_SUNDAY),
                parse_hour(&lookup, "MARKET_CLOSE_HOUR_FRIDAY", DEFAULT_CLOSE_HOUR_FRIDAY),
            ),
        };

        let protocol = lookup("FEED_PROTOCOL")
            .map(|s| FeedProtocol::from_str_case_insensitive(&s))
            .unwrap_or_default();

        let api_key = lookup("FEED_API_KEY");
        let login = lookup("FEED_LOGIN");
        let password = lookup("FEED_PASSWORD");

        if protocol.requires_token() {
            require(login.as_deref(), "FEED_LOGIN")?;
            require(password.as_deref(), "FEED_PASSWORD")?;
        } else {
            require(api_key.as_deref(), "FEED_API_KEY")?;
        }

        let max_attempts = parse_clamped(
            &lookup,
            "FEED_MAX_RECONNECT_ATTEMPTS",
            i64::from(DEFAULT_MAX_ATTEMPTS),
            0,
            MAX_RECONNECT_ATTEMPTS,
        );
        let delay_ms = parse_clamped(
            &lookup,
            "FEED_RECONNECT_DELAY_MS",
            i64::try_from(DEFAULT_RECONNECT_DELAY.as_millis()).unwrap_or(3_000),
            MIN_RECONNECT_DELAY_MS,
            MAX_RECONNECT_DELAY_MS,
        );

        let default_timeframe = lookup("DEFAULT_TIMEFRAME")
            .and_then(|v| normalize(&v))
            .map_or_else(|| DEFAULT_TIMEFRAME.to_string(), |i| i.to_string());

        let symbols = lookup("FX_SYMBOLS")
            .map_or_else(|| parse_symbols(DEFAULT_SYMBOLS), |v| parse_symbols(&v));

        let feed = FeedSettings {
            protocol,
            api_key,
            ws_url: lookup("FEED_WS_URL").unwrap_or_else(|| DEFAULT_FEED_WS_URL.to_string()),
            auth_url: lookup("FEED_AUTH_URL")
                .unwrap_or_else(|| DEFAULT_FEED_AUTH_URL.to_string()),
            login,
            password,
            account_type: lookup("FEED_ACCOUNT_TYPE")
                .unwrap_or_else(|| DEFAULT_ACCOUNT_TYPE.to_string()),
            reconnect: ReconnectConfig::new(
                Duration::from_millis(delay_ms.unsigned_abs()),
                u32::try_from(max_attempts).unwrap_or(DEFAULT_MAX_ATTEMPTS),
            ),
            default_timeframe,
            symbols,
        };

        let server = ServerSettings {
            health_port: lookup("FX_HEALTH_PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_HEALTH_PORT),
        };

        let telemetry = TelemetryConfig::from_lookup(&lookup)
            .with_attribute("fx.feed.protocol", feed.protocol.as_str())
            .with_attribute("fx.market.timezone", market.timezone.clone());

        Ok(Self {
            market,
            feed,
            server,
            telemetry,
        })
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    /// Environment variable has empty value.
    #[error("environment variable {0} cannot be empty")]
    EmptyValue(String),
}

fn require(value: Option<&str>, key: &str) -> Result<(), ConfigError> {
    match value {
        None => Err(ConfigError::MissingEnvVar(key.to_string())),
        Some(v) if v.trim().is_empty() => Err(ConfigError::EmptyValue(key.to_string())),
        Some(_) => Ok(()),
    }
}

fn parse_clamped<F>(lookup: &F, key: &str, default: i64, min: i64, max: i64) -> i64
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<i64>().ok())
        .map_or(default, |v| v.clamp(min, max))
}

fn parse_hour<F>(lookup: &F, key: &str, default: u8) -> u8
where
    F: Fn(&str) -> Option<String>,
{
    let hour = parse_clamped(lookup, key, i64::from(default), 0, 23);
    u8::try_from(hour).unwrap_or(default)
}

fn parse_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_uppercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_with_api_key() {
        let config = config(&[("FEED_API_KEY", "k")]).unwrap();

        assert_eq!(config.market.timezone, "America/New_York");
        assert_eq!(config.market.hours, SessionHours::default());
        assert_eq!(config.feed.protocol, FeedProtocol::KeyJoin);
        assert_eq!(config.feed.ws_url, DEFAULT_FEED_WS_URL);
        assert_eq!(config.feed.reconnect.max_attempts, 10);
        assert_eq!(config.feed.reconnect.delay, Duration::from_secs(3));
        assert_eq!(config.feed.default_timeframe, "15m");
        assert_eq!(config.feed.symbols, vec!["EUR/USD"]);
        assert_eq!(config.server.health_port, 8083);
    }

    #[test]
    fn key_protocol_requires_api_key() {
        assert!(matches!(
            config(&[]),
            Err(ConfigError::MissingEnvVar(k)) if k == "FEED_API_KEY"
        ));
        assert!(matches!(
            config(&[("FEED_API_KEY", " ")]),
            Err(ConfigError::EmptyValue(_))
        ));
    }

    #[test]
    fn token_protocol_requires_login() {
        let err = config(&[("FEED_PROTOCOL", "TOKEN"), ("FEED_PASSWORD", "pw")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(k) if k == "FEED_LOGIN"));

        let config = config(&[
            ("FEED_PROTOCOL", "token"),
            ("FEED_LOGIN", "trader"),
            ("FEED_PASSWORD", "pw"),
        ])
        .unwrap();
        assert_eq!(config.feed.protocol, FeedProtocol::TokenSocket);
        assert_eq!(config.feed.credentials().unwrap().login(), "trader");
    }

    #[test]
    fn numeric_values_are_clamped() {
        let config = config(&[
            ("FEED_API_KEY", "k"),
            ("MARKET_OPEN_HOUR_SUNDAY", "30"),
            ("MARKET_CLOSE_HOUR_FRIDAY", "-4"),
            ("FEED_MAX_RECONNECT_ATTEMPTS", "500"),
            ("FEED_RECONNECT_DELAY_MS", "5"),
        ])
        .unwrap();

        assert_eq!(config.market.hours.open_hour_sunday(), 23);
        assert_eq!(config.market.hours.close_hour_friday(), 0);
        assert_eq!(config.feed.reconnect.max_attempts, 100);
        assert_eq!(config.feed.reconnect.delay, Duration::from_millis(100));
    }

    #[test]
    fn unparseable_values_use_defaults() {
        let config = config(&[
            ("FEED_API_KEY", "k"),
            ("MARKET_OPEN_HOUR_SUNDAY", "five"),
            ("FEED_MAX_RECONNECT_ATTEMPTS", "lots"),
            ("DEFAULT_TIMEFRAME", "bogus"),
            ("FX_HEALTH_PORT", "http"),
        ])
        .unwrap();

        assert_eq!(config.market.hours.open_hour_sunday(), 17);
        assert_eq!(config.feed.reconnect.max_attempts, 10);
        assert_eq!(config.feed.default_timeframe, "15m");
        assert_eq!(config.server.health_port, 8083);
    }

    #[test]
    fn timeframe_is_normalized() {
        let config = config(&[("FEED_API_KEY", "k"), ("DEFAULT_TIMEFRAME", "H4")]).unwrap();
        assert_eq!(config.feed.default_timeframe, "4h");
    }

    #[test]
    fn symbols_are_split_and_trimmed() {
        assert_eq!(
            parse_symbols(" eur/usd, GBP/JPY ,,"),
            vec!["EUR/USD", "GBP/JPY"]
        );
    }

    #[test]
    fn feed_settings_redacted_debug() {
        let config =
            config(&[("FEED_API_KEY", "secret-key"), ("FEED_PASSWORD", "pw123")]).unwrap();
        let debug = format!("{:?}", config.feed);
        assert!(!debug.contains("secret-key"));
        assert!(!debug.contains("pw123"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn stream_config_carries_feed_settings() {
        let config =
            config(&[("FEED_API_KEY", "k"), ("FEED_WS_URL", "wss://feed.test/ws")]).unwrap();
        let stream = config.feed.stream_config();
        assert_eq!(stream.ws_url, "wss://feed.test/ws");
        assert_eq!(stream.api_key.as_deref(), Some("k"));
        assert_eq!(stream.protocol, FeedProtocol::KeyJoin);
    }

    #[test]
    fn telemetry_describes_feed_and_market() {
        let config = config(&[
            ("FEED_API_KEY", "k"),
            ("MARKET_TIMEZONE", "Europe/London"),
            ("OTEL_ENABLED", "false"),
            ("OTEL_SERVICE_NAME", "fx-edge"),
        ])
        .unwrap();

        assert!(!config.telemetry.enabled);
        assert_eq!(config.telemetry.service_name, "fx-edge");
        assert_eq!(
            config.telemetry.attributes,
            vec![
                ("fx.feed.protocol".to_string(), "key".to_string()),
                ("fx.market.timezone".to_string(), "Europe/London".to_string()),
            ]
        );
    }
}
