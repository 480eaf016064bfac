//! Prometheus Metrics Module
//!
//! Exposes feed metrics in Prometheus format.
//!
//! # Metrics Categories
//!
//! - **Messages**: frames received from the feed, prices dispatched
//! - **Connection**: current connection state, reconnect attempts
//! - **Subscriptions**: active subscription count
//!
//! # Integration
//!
//! Metrics are exposed at `/metrics` on the health server port.

use std::sync::OnceLock;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::infrastructure::feed::ConnectionState;

// =============================================================================
// Global Metrics Handle
// =============================================================================

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// # Panics
///
/// Panics if another global recorder is already installed.
#[allow(clippy::expect_used)]
pub fn init_metrics() -> PrometheusHandle {
    PROMETHEUS_HANDLE
        .get_or_init(|| {
            let handle = PrometheusBuilder::new()
                .install_recorder()
                .expect("failed to install Prometheus recorder");

            register_metrics();
            handle
        })
        .clone()
}

/// Get the Prometheus handle for rendering metrics.
///
/// Returns `None` if metrics have not been initialized.
#[must_use]
pub fn get_metrics_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

// =============================================================================
// Metric Registration
// =============================================================================

fn register_metrics() {
    describe_counter!(
        "fx_feed_messages_received_total",
        "Total text frames received from the price feed"
    );
    describe_counter!(
        "fx_feed_prices_dispatched_total",
        "Total price events delivered to subscribers"
    );
    describe_counter!(
        "fx_feed_reconnects_total",
        "Total feed reconnection attempts"
    );
    describe_gauge!(
        "fx_feed_connection_state",
        "Current feed connection state (1 for the active state label)"
    );
    describe_gauge!(
        "fx_feed_subscriptions",
        "Number of active feed subscriptions"
    );
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

const STATES: [ConnectionState; 5] = [
    ConnectionState::Disconnected,
    ConnectionState::Connecting,
    ConnectionState::Connected,
    ConnectionState::Reconnecting,
    ConnectionState::Failed,
];

/// Record a text frame received from the feed.
pub fn record_message_received() {
    counter!("fx_feed_messages_received_total").increment(1);
}

/// Record a price event delivered to a subscriber.
pub fn record_price_dispatched() {
    counter!("fx_feed_prices_dispatched_total").increment(1);
}

/// Record a reconnection attempt.
pub fn record_reconnect_attempt() {
    counter!("fx_feed_reconnects_total").increment(1);
}

/// Set the connection state gauge.
pub fn set_connection_state(current: ConnectionState) {
    for state in STATES {
        let value = if state == current { 1.0 } else { 0.0 };
        gauge!("fx_feed_connection_state", "state" => state.as_str()).set(value);
    }
}

/// Update the active subscription count.
#[allow(clippy::cast_precision_loss)]
pub fn set_active_subscriptions(count: usize) {
    gauge!("fx_feed_subscriptions").set(count as f64);
}

// =============================================================================
// Tests
// =============================================================================
