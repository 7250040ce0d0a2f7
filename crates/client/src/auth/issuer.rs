//! Credential issuance collaborator
//!
//! The trait seam allows tests and embedders to inject their own issuer;
//! the HTTP implementation talks to the platform's token endpoint.

use async_trait::async_trait;
use hiveport_domain::constants::TOKEN_PATH;
use hiveport_domain::{BearerToken, HiveError, Result};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http::HttpClient;

/// Issues bearer tokens for a (root, key, secret) identity.
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    /// Fetch a new token. No caching, no retries.
    async fn issue(&self, root: &str, key: &str, secret: &str) -> Result<BearerToken>;
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    key: &'a str,
    secret: &'a str,
}

/// The issuance endpoint is known to sometimes answer 200 with an embedded
/// error instead of an HTTP error status, so both shapes are modeled.
#[derive(Deserialize)]
struct TokenReply {
    #[serde(default)]
    token: Option<String>,
    #[serde(default, rename = "errorType")]
    error_type: Option<String>,
    #[serde(default, rename = "errorMessage")]
    error_message: Option<String>,
}

/// Token issuer backed by the platform's HTTP credential endpoint.
pub struct HttpTokenIssuer {
    http: HttpClient,
}

impl HttpTokenIssuer {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl TokenIssuer for HttpTokenIssuer {
    async fn issue(&self, root: &str, key: &str, secret: &str) -> Result<BearerToken> {
        let url = format!("{}{}", root.trim_end_matches('/'), TOKEN_PATH);
        debug!(%url, "requesting bearer token");

        let request = self
            .http
            .request(Method::POST, &url)
            .header("Content-Type", "application/json")
            .json(&TokenRequest { key, secret });

        let response = self
            .http
            .send(request)
            .await
            .map_err(|err| HiveError::Credential(err.message().to_string()))?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            return Err(HiveError::Forbidden("credential issuance rejected".to_string()));
        }
        if !status.is_success() {
            return Err(HiveError::Credential(format!("{url} returned status {status}")));
        }

        let reply: TokenReply = response
            .json()
            .await
            .map_err(|err| HiveError::Credential(format!("malformed token reply: {err}")))?;

        if let Some(message) = reply.error_message {
            let kind = reply.error_type.unwrap_or_else(|| "error".to_string());
            return Err(HiveError::Credential(format!("{kind}: {message}")));
        }

        match reply.token {
            Some(token) if !token.is_empty() => Ok(BearerToken::new(token)),
            _ => Err(HiveError::Credential("token reply carried no token".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn issuer() -> HttpTokenIssuer {
        HttpTokenIssuer::new(HttpClient::new().expect("http client"))
    }

    #[tokio::test]
    async fn posts_identity_and_returns_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_json(json!({ "key": "k1", "secret": "s1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "tok-abc" })))
            .mount(&server)
            .await;

        let token = issuer().issue(&server.uri(), "k1", "s1").await.expect("token");
        assert_eq!(token.as_str(), "tok-abc");
    }

    #[tokio::test]
    async fn classifies_403_as_forbidden() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = issuer().issue(&server.uri(), "k1", "s1").await.expect_err("error");
        assert!(matches!(err, HiveError::Forbidden(_)));
    }

    #[tokio::test]
    async fn embedded_error_in_success_status_is_a_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errorType": "InvalidCredentials",
                "errorMessage": "unknown client key"
            })))
            .mount(&server)
            .await;

        let err = issuer().issue(&server.uri(), "k1", "s1").await.expect_err("error");
        match err {
            HiveError::Credential(msg) => {
                assert!(msg.contains("InvalidCredentials"));
                assert!(msg.contains("unknown client key"));
            }
            other => panic!("expected credential error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn empty_token_field_is_a_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "" })))
            .mount(&server)
            .await;

        let err = issuer().issue(&server.uri(), "k1", "s1").await.expect_err("error");
        assert!(matches!(err, HiveError::Credential(_)));
    }
}
