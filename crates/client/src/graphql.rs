//! GraphQL transport
//!
//! The platform exposes a single GraphQL endpoint at the endpoint root plus
//! a fixed path suffix. Every operation is a POST of `{ query, variables }`
//! authenticated with a bearer token; responses carry either a `data`
//! payload keyed by operation name or an `errors` array that is flattened
//! into one message.

use hiveport_domain::constants::GRAPHQL_PATH;
use hiveport_domain::{BearerToken, HiveError, Result};
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::http::HttpClient;

#[derive(Debug, Deserialize)]
struct GraphQlEnvelope {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
    #[serde(default)]
    locations: Option<Vec<GraphQlLocation>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlLocation {
    line: u32,
    column: u32,
}

/// Client for the platform's GraphQL endpoint.
#[derive(Clone)]
pub struct GraphQlClient {
    http: HttpClient,
}

impl GraphQlClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Execute a named query or mutation and return its `data` payload.
    ///
    /// # Arguments
    ///
    /// * `endpoint_root` - Root URL of the platform (no trailing slash)
    /// * `token` - Bearer token; omitted for unauthenticated operations
    /// * `operation` - Operation name the `data` payload is keyed by
    /// * `query` - GraphQL document
    /// * `variables` - Named variables object
    ///
    /// # Errors
    ///
    /// Returns `HiveError::Api` for non-success HTTP statuses and for
    /// GraphQL error envelopes (errors flattened into one message with
    /// line/column locations when present).
    pub async fn execute(
        &self,
        endpoint_root: &str,
        token: Option<&BearerToken>,
        operation: &str,
        query: &str,
        variables: Value,
    ) -> Result<Value> {
        let url = format!("{}{}", endpoint_root.trim_end_matches('/'), GRAPHQL_PATH);
        debug!(%url, operation, "executing GraphQL operation");

        let mut request = self
            .http
            .request(Method::POST, &url)
            .header("Content-Type", "application/json")
            .json(&serde_json::json!({ "query": query, "variables": variables }));

        if let Some(token) = token {
            request = request.header("Authorization", format!("Bearer {}", token.as_str()));
        }

        let response = self.http.send(request).await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.is_empty() {
                format!("{url} returned status {status}")
            } else {
                format!("{url} returned status {status}: {body}")
            };
            return Err(HiveError::Api { code: status.as_u16(), message });
        }

        let envelope: GraphQlEnvelope = response
            .json()
            .await
            .map_err(|err| HiveError::Internal(format!("failed to parse response: {err}")))?;

        if let Some(errors) = envelope.errors.filter(|errors| !errors.is_empty()) {
            return Err(HiveError::Api { code: 400, message: flatten_errors(&errors) });
        }

        envelope
            .data
            .and_then(|mut data| data.get_mut(operation).map(Value::take))
            .ok_or_else(|| {
                HiveError::Internal(format!("response carried no data for operation {operation}"))
            })
    }
}

/// Combine a GraphQL error array into a single message string.
fn flatten_errors(errors: &[GraphQlError]) -> String {
    errors
        .iter()
        .map(|error| match error.locations.as_deref() {
            Some(locations) if !locations.is_empty() => {
                let positions = locations
                    .iter()
                    .map(|loc| format!("line {}, column {}", loc.line, loc.column))
                    .collect::<Vec<_>>()
                    .join("; ");
                format!("{} ({})", error.message, positions)
            }
            _ => error.message.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client() -> GraphQlClient {
        GraphQlClient::new(HttpClient::new().expect("http client"))
    }

    #[tokio::test]
    async fn returns_data_keyed_by_operation_name() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(header("Authorization", "Bearer tok-1"))
            .and(body_partial_json(json!({ "variables": { "first": 10 } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "currentUser": { "id": "u1", "email": "a@b.c" } }
            })))
            .mount(&server)
            .await;

        let token = BearerToken::new("tok-1");
        let data = client()
            .execute(
                &server.uri(),
                Some(&token),
                "currentUser",
                "query { currentUser { id email } }",
                json!({ "first": 10 }),
            )
            .await
            .expect("data");

        assert_eq!(data["id"], "u1");
    }

    #[tokio::test]
    async fn flattens_error_array_with_locations() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errors": [
                    { "message": "Cannot query field", "locations": [{ "line": 2, "column": 7 }] },
                    { "message": "Unknown argument" }
                ]
            })))
            .mount(&server)
            .await;

        let err = client()
            .execute(&server.uri(), None, "bees", "query { bees }", json!({}))
            .await
            .expect_err("error");

        match err {
            HiveError::Api { code, message } => {
                assert_eq!(code, 400);
                assert_eq!(message, "Cannot query field (line 2, column 7); Unknown argument");
            }
            other => panic!("expected api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn maps_http_status_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let err = client()
            .execute(&server.uri(), None, "bees", "query { bees }", json!({}))
            .await
            .expect_err("error");

        match err {
            HiveError::Api { code, .. } => assert_eq!(code, 403),
            other => panic!("expected api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_operation_payload_is_internal_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "data": { "other": 1 } })),
            )
            .mount(&server)
            .await;

        let err = client()
            .execute(&server.uri(), None, "bees", "query { bees }", json!({}))
            .await
            .expect_err("error");

        assert!(matches!(err, HiveError::Internal(_)));
    }
}
