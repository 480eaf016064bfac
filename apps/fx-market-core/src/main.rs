//! FX Market Core Binary
//!
//! Logs the market session status and streams live FX prices.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin fx-market-core
//! ```
//!
//! # Environment Variables
//!
//! ## Required
//! - `FEED_API_KEY`: API key (key protocol)
//! - `FEED_LOGIN` / `FEED_PASSWORD`: account credentials (token protocol)
//!
//! ## Optional
//! - `FEED_PROTOCOL`: key | token (default: key)
//! - `FEED_WS_URL`, `FEED_AUTH_URL`, `FEED_ACCOUNT_TYPE`
//! - `FEED_MAX_RECONNECT_ATTEMPTS` (default: 10), `FEED_RECONNECT_DELAY_MS` (default: 3000)
//! - `MARKET_TIMEZONE` (default: America/New_York)
//! - `MARKET_OPEN_HOUR_SUNDAY` / `MARKET_CLOSE_HOUR_FRIDAY` (default: 17)
//! - `DEFAULT_TIMEFRAME` (default: 15m), `FX_SYMBOLS` (default: EUR/USD)
//! - `FX_HEALTH_PORT`: Health check HTTP port, 0 disables (default: 8083)
//! - `OTEL_ENABLED` (default: true), `OTEL_EXPORTER_OTLP_ENDPOINT`, `OTEL_SERVICE_NAME`
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;

use anyhow::Context;
use fx_market_core::infrastructure::health::{HealthServer, HealthServerState};
use fx_market_core::infrastructure::telemetry;
use fx_market_core::{
    AppConfig, HttpTokenIssuer, MarketDataStreamClient, MarketSessionEvaluator, WsTransport,
    ZonedClock, default_points, init_metrics, normalize, watch_events,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls crypto provider"))?;

    load_dotenv();

    let config = AppConfig::from_env().context("invalid configuration")?;

    // Initialize telemetry (OpenTelemetry + tracing)
    let _telemetry_guard = telemetry::init(&config.telemetry);

    tracing::info!("Starting FX Market Core");

    // Initialize Prometheus metrics
    let _metrics_handle = init_metrics();

    log_config(&config);

    let shutdown_token = CancellationToken::new();

    // Market session
    let clock = ZonedClock::named(&config.market.timezone);
    let evaluator = Arc::new(MarketSessionEvaluator::new(clock, config.market.hours));
    let status = evaluator.status_now();
    tracing::info!(
        is_open = status.is_open,
        reason = status.reason.as_str(),
        market_day = %status.market_day,
        market_time = %status.market_time,
        timezone = %status.timezone,
        "Market status"
    );

    // Stream client
    let issuer = HttpTokenIssuer::new(config.feed.auth_url.clone())
        .context("failed to build token client")?;
    let (client, events) = MarketDataStreamClient::new(
        config.feed.stream_config(),
        Arc::new(WsTransport::new()),
        Arc::new(issuer),
    );
    let client = Arc::new(client);

    let mut feed_events = tokio::spawn(watch_events(events));

    // Health server
    if config.server.health_port == 0 {
        tracing::info!("Health server disabled");
    } else {
        let health_state = Arc::new(HealthServerState::new(
            env!("CARGO_PKG_VERSION").to_string(),
            Arc::clone(&client),
            Arc::clone(&evaluator),
        ));
        let health_server = HealthServer::new(
            config.server.health_port,
            health_state,
            shutdown_token.clone(),
        );
        tokio::spawn(async move {
            if let Err(e) = health_server.run().await {
                tracing::error!(error = %e, "Health server error");
            }
        });
    }

    if config.feed.protocol.requires_token() {
        let credentials = config
            .feed
            .credentials()
            .context("invalid feed credentials")?;
        if let Err(e) = client.authenticate(&credentials).await {
            shutdown_token.cancel();
            return Err(e).context("feed authentication failed");
        }
    }

    for symbol in &config.feed.symbols {
        client.subscribe(symbol.clone(), config.feed.default_timeframe.clone());
    }

    if let Err(e) = client.connect().await {
        shutdown_token.cancel();
        return Err(e).context("failed to connect to market data feed");
    }

    tracing::info!("FX Market Core ready");

    // A failed feed (rejected credentials, reconnects exhausted) ends the process
    let outcome = tokio::select! {
        () = await_shutdown(shutdown_token.clone()) => Ok(()),
        failure = &mut feed_events => match failure {
            Ok(Some(reason)) => Err(anyhow::anyhow!("market data feed failed: {reason}")),
            Ok(None) => Ok(()),
            Err(e) => Err(anyhow::Error::new(e).context("feed event task aborted")),
        },
    };

    shutdown_token.cancel();
    client.disconnect();
    tracing::info!("FX Market Core stopped");
    outcome
}

/// Log the parsed configuration.
fn log_config(config: &AppConfig) {
    let footprint_points = normalize(&config.feed.default_timeframe)
        .map(|interval| default_points(&interval));

    tracing::info!(
        protocol = config.feed.protocol.as_str(),
        timezone = %config.market.timezone,
        open_hour_sunday = config.market.hours.open_hour_sunday(),
        close_hour_friday = config.market.hours.close_hour_friday(),
        timeframe = %config.feed.default_timeframe,
        footprint_points = ?footprint_points,
        symbols = ?config.feed.symbols,
        max_reconnect_attempts = config.feed.reconnect.max_attempts,
        reconnect_delay_ms = config.feed.reconnect.delay.as_millis(),
        health_port = config.server.health_port,
        "Configuration loaded"
    );
    tracing::debug!(
        ws_url = %config.feed.ws_url,
        auth_url = %config.feed.auth_url,
        "Feed endpoints"
    );
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
#[allow(clippy::expect_used)]
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown_token.cancel();
}
