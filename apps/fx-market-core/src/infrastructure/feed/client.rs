//! Market Data Stream Client
//!
//! Owns one connection to the vendor's real-time price feed, multiplexes
//! `(symbol, timeframe)` subscriptions over it, and recovers from transport
//! failures with a bounded, fixed-delay reconnect.
//!
//! # Connection States
//!
//! ```text
//! Disconnected ──connect()──► Connecting ──handshake──► Connected
//!                                  │                        │
//!                               failure              drop / error
//!                                  ▼                        ▼
//!                               Failed ◄──exhausted── Reconnecting ──delay──► Connecting
//! ```
//!
//! `disconnect()` returns to `Disconnected` from any state. A fatal vendor
//! error (`authentication_failed`) goes straight to `Failed` without retry.
//!
//! # Events
//!
//! Everything the feed produces arrives on the single ordered
//! [`StreamEvent`] channel returned by [`MarketDataStreamClient::new`].
//!
//! # Ordering
//!
//! After every (re)connect the whole subscription table is replayed before
//! the first inbound frame is read and before queued subscribe/unsubscribe
//! commands are applied. Commands are checked against the set of
//! subscriptions already sent on the live connection, so a key is never
//! subscribed twice on one socket.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::protocol::{CodecError, FeedProtocol, InboundMessage};
use super::reconnect::{ReconnectConfig, ReconnectPolicy};
use crate::application::ports::{
    AuthError, Credentials, FeedConnection, FeedTransport, TokenIssuer, TransportError,
    TransportFrame,
};
use crate::domain::subscription::{SubscriptionKey, SubscriptionTable};
use crate::infrastructure::metrics;

/// Default capacity of the event channel.
pub const DEFAULT_EVENT_BUFFER: usize = 1024;

// =============================================================================
// Error Type
// =============================================================================

/// Errors returned by stream client operations.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The vendor rejected authentication.
    #[error("authentication failed: {0}")]
    Authentication(#[from] AuthError),

    /// The token variant was asked to connect before `authenticate()`.
    #[error("no access token: call authenticate() first")]
    MissingToken,

    /// The key variant has no API key configured.
    #[error("no API key configured")]
    MissingApiKey,

    /// Transport failure.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Codec failure.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// `connect()` was called while a connection is active or pending.
    #[error("client is already connected or connecting")]
    AlreadyConnected,

    /// `disconnect()` cancelled the operation.
    #[error("operation cancelled by disconnect")]
    Cancelled,
}

// =============================================================================
// States and Events
// =============================================================================

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// No connection and none pending.
    #[default]
    Disconnected,
    /// Opening the transport.
    Connecting,
    /// Live and dispatching.
    Connected,
    /// Waiting to retry after a lost connection.
    Reconnecting,
    /// Terminal failure; call `connect()` again to start over.
    Failed,
}

impl ConnectionState {
    /// Lowercase state name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Reconnecting => "reconnecting",
            Self::Failed => "failed",
        }
    }
}

/// Category of a [`StreamEvent::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamErrorKind {
    /// Credentials rejected; not retried.
    Authentication,
    /// Socket-level failure.
    Transport,
    /// Non-fatal error reported by the vendor.
    Vendor,
}

/// Events emitted by the stream client.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Connected and subscriptions replayed.
    Connected,
    /// Price update for a registered subscription.
    Price {
        /// Instrument symbol.
        symbol: String,
        /// Subscription timeframe.
        timeframe: String,
        /// Raw price payload.
        data: Value,
    },
    /// Error occurred.
    Error {
        /// Error category.
        kind: StreamErrorKind,
        /// Error detail.
        detail: String,
    },
    /// The connection closed.
    Closed {
        /// Close code, if any.
        code: Option<u16>,
        /// Close reason.
        reason: String,
    },
    /// Reconnecting to the feed.
    Reconnecting {
        /// Reconnection attempt number.
        attempt: u32,
    },
    /// Terminal failure. Emitted once per transition to `Failed`.
    Failed {
        /// Why the client gave up.
        reason: String,
    },
}

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the stream client.
#[derive(Debug, Clone)]
pub struct StreamClientConfig {
    /// Vendor protocol variant.
    pub protocol: FeedProtocol,
    /// WebSocket URL without credentials.
    pub ws_url: String,
    /// API key for the key variant.
    pub api_key: Option<String>,
    /// Reconnection configuration.
    pub reconnect: ReconnectConfig,
    /// Capacity of the event channel.
    pub event_buffer: usize,
}

impl StreamClientConfig {
    /// Configuration for the key-based join variant.
    #[must_use]
    pub fn key_join(ws_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            protocol: FeedProtocol::KeyJoin,
            ws_url: ws_url.into(),
            api_key: Some(api_key.into()),
            reconnect: ReconnectConfig::default(),
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }

    /// Configuration for the token-then-socket variant.
    #[must_use]
    pub fn token_socket(ws_url: impl Into<String>) -> Self {
        Self {
            protocol: FeedProtocol::TokenSocket,
            ws_url: ws_url.into(),
            api_key: None,
            reconnect: ReconnectConfig::default(),
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }

    /// Override the reconnection configuration.
    #[must_use]
    pub fn with_reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.reconnect = reconnect;
        self
    }
}

// =============================================================================
// Internal State
// =============================================================================

#[derive(Debug)]
enum Command {
    Subscribe(SubscriptionKey),
    Unsubscribe(SubscriptionKey),
}

struct Session {
    cancel: CancellationToken,
    commands: mpsc::UnboundedSender<Command>,
}

#[derive(Default)]
struct Control {
    state: ConnectionState,
    session: Option<Session>,
    token: Option<String>,
}

enum Outcome {
    Cancelled,
    Lost { code: Option<u16>, reason: String },
    Fatal(String),
}

struct Shared {
    config: StreamClientConfig,
    transport: Arc<dyn FeedTransport>,
    issuer: Arc<dyn TokenIssuer>,
    events: mpsc::Sender<StreamEvent>,
    control: Mutex<Control>,
    table: Mutex<SubscriptionTable>,
}

// =============================================================================
// Client
// =============================================================================

/// Streaming client for one vendor connection.
///
/// Each instance owns its token, socket and subscription table; nothing is
/// shared between instances.
pub struct MarketDataStreamClient {
    shared: Arc<Shared>,
}

impl MarketDataStreamClient {
    /// Create a client and the receiver for its events.
    #[must_use]
    pub fn new(
        config: StreamClientConfig,
        transport: Arc<dyn FeedTransport>,
        issuer: Arc<dyn TokenIssuer>,
    ) -> (Self, mpsc::Receiver<StreamEvent>) {
        let (events, rx) = mpsc::channel(config.event_buffer.max(1));
        let shared = Arc::new(Shared {
            config,
            transport,
            issuer,
            events,
            control: Mutex::new(Control::default()),
            table: Mutex::new(SubscriptionTable::new()),
        });
        (Self { shared }, rx)
    }

    /// Exchange credentials for an access token and keep it for `connect()`.
    ///
    /// A rejection moves an idle client to `Failed`; it is never retried.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Authentication`] if the exchange fails.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<String, StreamError> {
        match self.shared.issuer.issue(credentials).await {
            Ok(token) => {
                self.shared.control.lock().token = Some(token.clone());
                tracing::info!(login = credentials.login(), "Feed access token obtained");
                Ok(token)
            }
            Err(e) => {
                tracing::error!(error = %e, "Feed authentication failed");
                let idle = {
                    let mut control = self.shared.control.lock();
                    let idle = control.session.is_none();
                    if idle {
                        control.state = ConnectionState::Failed;
                        metrics::set_connection_state(ConnectionState::Failed);
                    }
                    idle
                };
                self.shared
                    .emit(StreamEvent::Error {
                        kind: StreamErrorKind::Authentication,
                        detail: e.to_string(),
                    })
                    .await;
                if idle {
                    self.shared
                        .emit(StreamEvent::Failed {
                            reason: e.to_string(),
                        })
                        .await;
                }
                Err(e.into())
            }
        }
    }

    /// Open the feed connection.
    ///
    /// Resolves once the socket handshake completes and registered
    /// subscriptions have been sent. Prices then flow on the event channel.
    ///
    /// # Errors
    ///
    /// Returns an error if credentials are missing, the client is already
    /// active, the transport fails (client moves to `Failed`), or
    /// `disconnect()` cancels the attempt.
    pub async fn connect(&self) -> Result<(), StreamError> {
        let url = self.shared.socket_url()?;

        let (cancel, commands) = {
            let mut control = self.shared.control.lock();
            match control.state {
                ConnectionState::Connecting
                | ConnectionState::Connected
                | ConnectionState::Reconnecting => return Err(StreamError::AlreadyConnected),
                ConnectionState::Disconnected | ConnectionState::Failed => {}
            }
            let cancel = CancellationToken::new();
            let (tx, rx) = mpsc::unbounded_channel();
            control.session = Some(Session {
                cancel: cancel.clone(),
                commands: tx,
            });
            control.state = ConnectionState::Connecting;
            metrics::set_connection_state(ConnectionState::Connecting);
            (cancel, rx)
        };

        tracing::info!(
            url = %self.shared.config.ws_url,
            protocol = self.shared.config.protocol.as_str(),
            "Connecting to market data feed"
        );

        let opened = tokio::select! {
            () = cancel.cancelled() => return Err(StreamError::Cancelled),
            result = self.shared.transport.open(&url) => result,
        };

        let mut conn = match opened {
            Ok(conn) => conn,
            Err(e) => {
                tracing::error!(error = %e, "Market data feed connection failed");
                self.shared.fail(&cancel, e.to_string()).await;
                return Err(e.into());
            }
        };

        let remote = match self.shared.establish(&cancel, conn.as_mut()).await {
            Ok(remote) => remote,
            Err(e) => {
                conn.close().await;
                if !matches!(e, StreamError::Cancelled) {
                    self.shared.fail(&cancel, e.to_string()).await;
                }
                return Err(e);
            }
        };

        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            shared.run_session(cancel, commands, conn, remote).await;
        });

        Ok(())
    }

    /// Subscribe to a symbol and timeframe.
    ///
    /// Idempotent per key: repeating a subscription sends nothing.
    /// Returns `true` if the key was new.
    pub fn subscribe(&self, symbol: impl Into<String>, timeframe: impl Into<String>) -> bool {
        let key = SubscriptionKey::new(symbol, timeframe);
        let (inserted, count) = {
            let mut table = self.shared.table.lock();
            (table.insert(key.clone()), table.len())
        };

        if !inserted {
            tracing::debug!(%key, "Already subscribed");
            return false;
        }

        metrics::set_active_subscriptions(count);
        tracing::info!(%key, "Subscribed");
        self.shared.send_command(Command::Subscribe(key));
        true
    }

    /// Unsubscribe from a symbol and timeframe.
    ///
    /// No-op if the key is not subscribed. Returns `true` if it was.
    pub fn unsubscribe(&self, symbol: impl Into<String>, timeframe: impl Into<String>) -> bool {
        let key = SubscriptionKey::new(symbol, timeframe);
        let (removed, count) = {
            let mut table = self.shared.table.lock();
            (table.remove(&key), table.len())
        };

        if !removed {
            return false;
        }

        metrics::set_active_subscriptions(count);
        tracing::info!(%key, "Unsubscribed");
        self.shared.send_command(Command::Unsubscribe(key));
        true
    }

    /// Close the connection and forget all subscriptions.
    ///
    /// Safe from any state. Cancels a pending connect, a reconnect delay, or
    /// the live session; none of them can change state afterwards.
    pub fn disconnect(&self) {
        {
            let mut control = self.shared.control.lock();
            if let Some(session) = control.session.take() {
                session.cancel.cancel();
            }
            control.state = ConnectionState::Disconnected;
        }
        self.shared.table.lock().clear();
        metrics::set_connection_state(ConnectionState::Disconnected);
        metrics::set_active_subscriptions(0);
        tracing::info!("Market data feed disconnected");
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.shared.control.lock().state
    }

    /// Registered subscriptions in insertion order.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<SubscriptionKey> {
        self.shared.table.lock().keys().to_vec()
    }

    /// Last access token obtained by `authenticate()`.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.shared.control.lock().token.clone()
    }
}

impl Drop for MarketDataStreamClient {
    fn drop(&mut self) {
        if let Some(session) = self.shared.control.lock().session.take() {
            session.cancel.cancel();
        }
    }
}

// =============================================================================
// Session Driver
// =============================================================================

impl Shared {
    fn socket_url(&self) -> Result<String, StreamError> {
        let protocol = self.config.protocol;
        let credential = if protocol.requires_token() {
            self.control
                .lock()
                .token
                .clone()
                .ok_or(StreamError::MissingToken)?
        } else {
            self.config
                .api_key
                .clone()
                .filter(|k| !k.is_empty())
                .ok_or(StreamError::MissingApiKey)?
        };
        Ok(protocol.socket_url(&self.config.ws_url, &credential)?)
    }

    async fn emit(&self, event: StreamEvent) {
        let _ = self.events.send(event).await;
    }

    /// Deliver a session event unless the session is cancelled first.
    ///
    /// Returns `false` if the session was cancelled before delivery.
    async fn emit_within(&self, cancel: &CancellationToken, event: StreamEvent) -> bool {
        tokio::select! {
            biased;
            () = cancel.cancelled() => false,
            _ = self.events.send(event) => true,
        }
    }

    fn send_command(&self, command: Command) {
        if let Some(session) = &self.control.lock().session {
            let _ = session.commands.send(command);
        }
    }

    /// Set the state unless the session was cancelled.
    fn set_state(&self, cancel: &CancellationToken, state: ConnectionState) -> bool {
        let mut control = self.control.lock();
        if cancel.is_cancelled() {
            return false;
        }
        control.state = state;
        metrics::set_connection_state(state);
        true
    }

    /// Move to `Failed`, end the session, and emit the terminal event.
    async fn fail(&self, cancel: &CancellationToken, reason: String) {
        {
            let mut control = self.control.lock();
            if cancel.is_cancelled() {
                return;
            }
            control.state = ConnectionState::Failed;
            control.session = None;
            metrics::set_connection_state(ConnectionState::Failed);
        }
        self.emit(StreamEvent::Failed { reason }).await;
    }

    /// Replay the subscription table on a fresh connection.
    ///
    /// Returns the wire keys now subscribed on this connection.
    async fn establish(
        &self,
        cancel: &CancellationToken,
        conn: &mut dyn FeedConnection,
    ) -> Result<HashSet<String>, StreamError> {
        let protocol = self.config.protocol;
        let keys = self.table.lock().keys().to_vec();

        let mut remote = HashSet::new();
        for key in &keys {
            let wire = protocol.wire_key(key);
            if remote.contains(&wire) {
                continue;
            }
            conn.send(protocol.subscribe_frame(key)?).await?;
            remote.insert(wire);
        }

        if !self.set_state(cancel, ConnectionState::Connected) {
            return Err(StreamError::Cancelled);
        }

        tracing::info!(subscriptions = keys.len(), "Market data feed connected");
        self.emit_within(cancel, StreamEvent::Connected).await;
        Ok(remote)
    }

    async fn run_session(
        self: Arc<Self>,
        cancel: CancellationToken,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut conn: Box<dyn FeedConnection>,
        mut remote: HashSet<String>,
    ) {
        let mut policy = ReconnectPolicy::new(self.config.reconnect);

        loop {
            let outcome = self
                .pump(&cancel, &mut commands, conn.as_mut(), &mut remote)
                .await;
            conn.close().await;

            match outcome {
                Outcome::Cancelled => {
                    tracing::debug!("Feed session cancelled");
                    return;
                }
                Outcome::Fatal(detail) => {
                    tracing::error!(detail = %detail, "Fatal feed error, not reconnecting");
                    if cancel.is_cancelled() {
                        return;
                    }
                    let event = StreamEvent::Error {
                        kind: StreamErrorKind::Authentication,
                        detail: detail.clone(),
                    };
                    self.emit_within(&cancel, event).await;
                    self.fail(&cancel, detail).await;
                    return;
                }
                Outcome::Lost { code, reason } => {
                    if cancel.is_cancelled() {
                        return;
                    }
                    tracing::warn!(code = ?code, reason = %reason, "Market data feed connection lost");
                    if !self
                        .emit_within(&cancel, StreamEvent::Closed { code, reason })
                        .await
                    {
                        return;
                    }

                    match self.reconnect(&cancel, &mut policy).await {
                        Some((new_conn, new_remote)) => {
                            conn = new_conn;
                            remote = new_remote;
                        }
                        None => return,
                    }
                }
            }
        }
    }

    async fn reconnect(
        &self,
        cancel: &CancellationToken,
        policy: &mut ReconnectPolicy,
    ) -> Option<(Box<dyn FeedConnection>, HashSet<String>)> {
        loop {
            let Some(delay) = policy.next_delay() else {
                let attempts = policy.attempt_count();
                tracing::error!(attempts, "Reconnect attempts exhausted");
                self.fail(
                    cancel,
                    format!("reconnect attempts exhausted after {attempts} tries"),
                )
                .await;
                return None;
            };

            let attempt = policy.attempt_count();
            if !self.set_state(cancel, ConnectionState::Reconnecting) {
                return None;
            }
            metrics::record_reconnect_attempt();
            tracing::info!(
                attempt,
                delay_ms = delay.as_millis(),
                "Reconnecting to market data feed"
            );
            if !self
                .emit_within(cancel, StreamEvent::Reconnecting { attempt })
                .await
            {
                return None;
            }

            tokio::select! {
                () = cancel.cancelled() => return None,
                () = tokio::time::sleep(delay) => {}
            }

            if !self.set_state(cancel, ConnectionState::Connecting) {
                return None;
            }

            let url = match self.socket_url() {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "Cannot build feed URL");
                    continue;
                }
            };

            let opened = tokio::select! {
                () = cancel.cancelled() => return None,
                result = self.transport.open(&url) => result,
            };

            let mut conn = match opened {
                Ok(conn) => conn,
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "Reconnect attempt failed");
                    continue;
                }
            };

            match self.establish(cancel, conn.as_mut()).await {
                Ok(remote) => {
                    policy.reset();
                    return Some((conn, remote));
                }
                Err(StreamError::Cancelled) => {
                    conn.close().await;
                    return None;
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "Subscription replay failed");
                    conn.close().await;
                }
            }
        }
    }

    async fn pump(
        &self,
        cancel: &CancellationToken,
        commands: &mut mpsc::UnboundedReceiver<Command>,
        conn: &mut dyn FeedConnection,
        remote: &mut HashSet<String>,
    ) -> Outcome {
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return Outcome::Cancelled,
                Some(command) = commands.recv() => {
                    if let Err(e) = self.apply(command, conn, remote).await {
                        return Outcome::Lost { code: None, reason: e.to_string() };
                    }
                }
                frame = conn.recv() => match frame {
                    Some(Ok(TransportFrame::Text(text))) => {
                        if let Some(outcome) = self.handle_text(cancel, &text).await {
                            return outcome;
                        }
                    }
                    Some(Ok(TransportFrame::Close { code, reason })) => {
                        return Outcome::Lost { code, reason };
                    }
                    Some(Err(e)) => {
                        let event = StreamEvent::Error {
                            kind: StreamErrorKind::Transport,
                            detail: e.to_string(),
                        };
                        if !self.emit_within(cancel, event).await {
                            return Outcome::Cancelled;
                        }
                        return Outcome::Lost { code: None, reason: e.to_string() };
                    }
                    None => {
                        return Outcome::Lost { code: None, reason: "stream ended".to_string() };
                    }
                }
            }
        }
    }

    async fn apply(
        &self,
        command: Command,
        conn: &mut dyn FeedConnection,
        remote: &mut HashSet<String>,
    ) -> Result<(), StreamError> {
        let protocol = self.config.protocol;

        match command {
            Command::Subscribe(key) => {
                let wanted = self.table.lock().contains(&key);
                let wire = protocol.wire_key(&key);
                if !wanted || remote.contains(&wire) {
                    return Ok(());
                }
                conn.send(protocol.subscribe_frame(&key)?).await?;
                tracing::debug!(%key, "Sent subscribe");
                remote.insert(wire);
            }
            Command::Unsubscribe(key) => {
                let wire = protocol.wire_key(&key);
                if !remote.contains(&wire) {
                    return Ok(());
                }
                let shared_wire = self
                    .table
                    .lock()
                    .keys()
                    .iter()
                    .any(|k| protocol.wire_key(k) == wire);
                if shared_wire {
                    return Ok(());
                }
                conn.send(protocol.unsubscribe_frame(&key)?).await?;
                tracing::debug!(%key, "Sent unsubscribe");
                remote.remove(&wire);
            }
        }

        Ok(())
    }

    /// Handle one text frame. Returns an outcome if the session must end.
    async fn handle_text(&self, cancel: &CancellationToken, text: &str) -> Option<Outcome> {
        metrics::record_message_received();

        let message = match self.config.protocol.decode(text) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding undecodable feed message");
                return None;
            }
        };

        if message.is_fatal() {
            let detail = match message {
                InboundMessage::Error { short, details } => {
                    details.map_or(short.clone(), |d| format!("{short}: {d}"))
                }
                _ => "fatal feed error".to_string(),
            };
            return Some(Outcome::Fatal(detail));
        }

        match message {
            InboundMessage::Price {
                symbol,
                timeframe,
                data,
            } => {
                let targets = self.table.lock().matching(&symbol, timeframe.as_deref());
                if targets.is_empty() {
                    tracing::trace!(symbol = %symbol, "Price for unsubscribed symbol");
                }
                for key in targets {
                    let event = StreamEvent::Price {
                        symbol: key.symbol,
                        timeframe: key.timeframe,
                        data: data.clone(),
                    };
                    if !self.emit_within(cancel, event).await {
                        return Some(Outcome::Cancelled);
                    }
                    metrics::record_price_dispatched();
                }
                None
            }
            InboundMessage::Error { short, details } => {
                let detail = details.map_or(short.clone(), |d| format!("{short}: {d}"));
                tracing::warn!(code = %short, detail = %detail, "Feed error, reconnecting");
                let event = StreamEvent::Error {
                    kind: StreamErrorKind::Vendor,
                    detail,
                };
                if !self.emit_within(cancel, event).await {
                    return Some(Outcome::Cancelled);
                }
                Some(Outcome::Lost {
                    code: None,
                    reason: short,
                })
            }
            InboundMessage::Info(info) => {
                tracing::debug!(message = %info, "Feed info");
                None
            }
        }
    }
}

// =============================================================================
// Event Logging
// =============================================================================

/// Log stream events until the client gives up.
///
/// Returns the reason carried by the first [`StreamEvent::Failed`], or
/// `None` if the channel closes first.
pub async fn watch_events(mut events: mpsc::Receiver<StreamEvent>) -> Option<String> {
    while let Some(event) = events.recv().await {
        match event {
            StreamEvent::Connected => {
                tracing::info!("Feed connected");
            }
            StreamEvent::Price {
                symbol,
                timeframe,
                data,
            } => {
                tracing::info!(symbol = %symbol, timeframe = %timeframe, data = %data, "Price");
            }
            StreamEvent::Error { kind, detail } => {
                tracing::error!(kind = ?kind, detail = %detail, "Feed error");
            }
            StreamEvent::Closed { code, reason } => {
                tracing::warn!(code = ?code, reason = %reason, "Feed closed");
            }
            StreamEvent::Reconnecting { attempt } => {
                tracing::info!(attempt, "Feed reconnecting");
            }
            StreamEvent::Failed { reason } => {
                tracing::error!(reason = %reason, "Feed failed, giving up");
                return Some(reason);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_names() {
        assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
        assert_eq!(ConnectionState::Reconnecting.as_str(), "reconnecting");
        assert_eq!(
            serde_json::to_string(&ConnectionState::Failed).unwrap(),
            "\"failed\""
        );
    }

    #[test]
    fn config_constructors() {
        let key = StreamClientConfig::key_join("wss://feed.test/ws", "k");
        assert_eq!(key.protocol, FeedProtocol::KeyJoin);
        assert_eq!(key.api_key.as_deref(), Some("k"));

        let token = StreamClientConfig::token_socket("wss://feed.test/ws")
            .with_reconnect(ReconnectConfig::new(std::time::Duration::from_secs(1), 2));
        assert_eq!(token.protocol, FeedProtocol::TokenSocket);
        assert!(token.api_key.is_none());
        assert_eq!(token.reconnect.max_attempts, 2);
    }
}
