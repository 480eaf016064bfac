//! Feed Authentication
//!
//! Token exchange for the token-then-socket feed variant.
//!
//! # Flow
//!
//! 1. `POST {base}/authenticate` with `{"login":"...","password":"...","type":"..."}`
//! 2. Receive `{"access_token":"..."}`
//! 3. Open the socket with `?access_token=...`
//!
//! The exchange is one-shot: a rejected or failed request is surfaced to the
//! caller and never retried here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

pub use crate::application::ports::{AuthError, Credentials};
use crate::application::ports::TokenIssuer;

/// Timeout for the token request.
pub const AUTH_TIMEOUT: Duration = Duration::from_secs(10);

// =============================================================================
// HTTP Token Issuer
// =============================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// [`TokenIssuer`] calling the vendor's `/authenticate` endpoint.
#[derive(Debug, Clone)]
pub struct HttpTokenIssuer {
    client: Client,
    base_url: String,
}

impl HttpTokenIssuer {
    /// Create an issuer for `base_url` (without the `/authenticate` suffix).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(AUTH_TIMEOUT)
            .build()
            .map_err(|e| AuthError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/authenticate", self.base_url)
    }
}

#[async_trait]
impl TokenIssuer for HttpTokenIssuer {
    async fn issue(&self, credentials: &Credentials) -> Result<String, AuthError> {
        tracing::debug!(login = credentials.login(), "Requesting feed access token");

        let response = self
            .client
            .post(self.endpoint())
            .json(credentials)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Rejected(format!("{status}: {body}")));
        }
        if !status.is_success() {
            return Err(AuthError::Network(format!("unexpected status {status}")));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;

        match body.access_token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(AuthError::InvalidResponse(
                "missing access_token".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn credentials() -> Credentials {
        Credentials::new("trader", "hunter2", "demo").unwrap()
    }

    #[tokio::test]
    async fn issues_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/authenticate"))
            .and(body_json(serde_json::json!({
                "login": "trader",
                "password": "hunter2",
                "type": "demo"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "access_token": "tok-123" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let issuer = HttpTokenIssuer::new(format!("{}/", server.uri())).unwrap();
        let token = issuer.issue(&credentials()).await.unwrap();
        assert_eq!(token, "tok-123");
    }

    #[tokio::test]
    async fn rejected_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/authenticate"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad login"))
            .mount(&server)
            .await;

        let issuer = HttpTokenIssuer::new(server.uri()).unwrap();
        let err = issuer.issue(&credentials()).await.unwrap_err();
        assert!(matches!(err, AuthError::Rejected(_)));
    }

    #[tokio::test]
    async fn missing_token_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/authenticate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let issuer = HttpTokenIssuer::new(server.uri()).unwrap();
        let err = issuer.issue(&credentials()).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidResponse(_)));
    }
}
