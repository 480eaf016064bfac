//! Port Interfaces
//!
//! Contracts between the core and the outside world, following the
//! Hexagonal Architecture pattern. Infrastructure adapters implement these;
//! tests substitute deterministic doubles.
//!
//! ## Driven Ports (Outbound)
//!
//! - `MarketClock`: reads wall-clock time in the market timezone
//! - `FeedTransport` / `FeedConnection`: the streaming socket to the vendor
//! - `TokenIssuer`: the vendor's token endpoint

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::session::MarketClockReading;

// =============================================================================
// Clock
// =============================================================================

/// Reads an instant as a weekday and time of day in a fixed market timezone.
///
/// Implementations must not panic; an unresolvable timezone yields
/// [`MarketClockReading::unknown`].
pub trait MarketClock: Send + Sync {
    /// Read `instant` in the market timezone.
    fn read(&self, instant: DateTime<Utc>) -> MarketClockReading;

    /// Timezone identifier reported in market status.
    fn timezone(&self) -> &str;
}

// =============================================================================
// Transport
// =============================================================================

/// Errors raised by a feed transport.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// The socket could not be opened.
    #[error("connection failed: {0}")]
    ConnectFailed(String),

    /// Sending a frame failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// The socket reported an error while reading.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),
}

/// A frame read from the feed socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFrame {
    /// Text payload.
    Text(String),
    /// The peer closed the connection.
    Close {
        /// Close code, if the peer sent one.
        code: Option<u16>,
        /// Close reason.
        reason: String,
    },
}

/// Opens connections to a feed endpoint.
#[async_trait]
pub trait FeedTransport: Send + Sync {
    /// Open a connection to `url`. Resolves once the handshake completes.
    async fn open(&self, url: &str) -> Result<Box<dyn FeedConnection>, TransportError>;
}

/// A live, full-duplex feed connection.
#[async_trait]
pub trait FeedConnection: Send {
    /// Send a text frame.
    async fn send(&mut self, text: String) -> Result<(), TransportError>;

    /// Receive the next frame. `None` means the stream ended.
    async fn recv(&mut self) -> Option<Result<TransportFrame, TransportError>>;

    /// Close the connection. Errors are ignored.
    async fn close(&mut self);
}

// =============================================================================
// Authentication
// =============================================================================

/// Errors that can occur during authentication.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    /// The vendor rejected the credentials.
    #[error("authentication rejected: {0}")]
    Rejected(String),

    /// The token endpoint could not be reached.
    #[error("token request failed: {0}")]
    Network(String),

    /// The response did not contain a token.
    #[error("invalid token response: {0}")]
    InvalidResponse(String),

    /// Credentials were incomplete.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),
}

/// Vendor account credentials.
///
/// The `Debug` implementation redacts the password for safe logging.
#[derive(Clone, Serialize)]
pub struct Credentials {
    login: String,
    password: String,
    #[serde(rename = "type")]
    account_type: String,
}

impl Credentials {
    /// Create credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if login or password is empty.
    pub fn new(
        login: impl Into<String>,
        password: impl Into<String>,
        account_type: impl Into<String>,
    ) -> Result<Self, AuthError> {
        let login = login.into();
        let password = password.into();

        if login.is_empty() {
            return Err(AuthError::InvalidCredentials(
                "login cannot be empty".to_string(),
            ));
        }
        if password.is_empty() {
            return Err(AuthError::InvalidCredentials(
                "password cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            login,
            password,
            account_type: account_type.into(),
        })
    }

    /// Account login.
    #[must_use]
    pub fn login(&self) -> &str {
        &self.login
    }

    /// Account type sent with the token request.
    #[must_use]
    pub fn account_type(&self) -> &str {
        &self.account_type
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"[REDACTED]")
            .field("account_type", &self.account_type)
            .finish()
    }
}

/// Exchanges credentials for an access token.
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    /// Request a token. Not retried.
    async fn issue(&self, credentials: &Credentials) -> Result<String, AuthError>;
}
