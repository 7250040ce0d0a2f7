//! Webhook payload handling
//!
//! The platform delivers webhook payloads encrypted for the receiving
//! client. This module only routes: it validates the identifying headers
//! and hands the raw payload to an injected decrypt function together with
//! the configured secret key and passphrase. Serving HTTP and the
//! encryption scheme itself are out of scope.

use std::sync::Arc;

use async_trait::async_trait;
use hiveport_domain::{HiveError, Result};
use serde_json::Value;
use tracing::debug;

/// Decrypts a delivered payload with the client's key material.
#[async_trait]
pub trait PayloadDecryptor: Send + Sync {
    async fn decrypt(&self, payload: &[u8], secret_key: &str, passphrase: &str) -> Result<Vec<u8>>;
}

/// Headers accompanying a webhook delivery, identifying the target handler
/// and carrying the delivery signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookHeaders {
    pub handler: String,
    pub signature: String,
}

/// A decrypted, parsed webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookDelivery {
    /// Name of the handler the delivery is addressed to.
    pub handler: String,
    /// Decrypted payload, parsed as JSON.
    pub payload: Value,
}

/// Routes raw webhook deliveries through an injected decryptor.
pub struct WebhookHandler {
    decryptor: Arc<dyn PayloadDecryptor>,
    secret_key: String,
    passphrase: String,
}

impl WebhookHandler {
    pub fn new(
        decryptor: Arc<dyn PayloadDecryptor>,
        secret_key: impl Into<String>,
        passphrase: impl Into<String>,
    ) -> Self {
        Self { decryptor, secret_key: secret_key.into(), passphrase: passphrase.into() }
    }

    /// Decode one delivery.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for missing handler or signature headers (before
    /// calling the decryptor); decryptor failures propagate; a payload that
    /// decrypts to non-JSON is an `Internal` error.
    pub async fn handle(
        &self,
        payload: &[u8],
        headers: &WebhookHeaders,
    ) -> Result<WebhookDelivery> {
        if headers.handler.trim().is_empty() {
            return Err(HiveError::InvalidArgument(
                "webhook delivery carries no handler header".to_string(),
            ));
        }
        if headers.signature.trim().is_empty() {
            return Err(HiveError::InvalidArgument(
                "webhook delivery carries no signature header".to_string(),
            ));
        }

        debug!(handler = %headers.handler, bytes = payload.len(), "decoding webhook delivery");

        let decrypted =
            self.decryptor.decrypt(payload, &self.secret_key, &self.passphrase).await?;
        let parsed: Value = serde_json::from_slice(&decrypted)
            .map_err(|err| HiveError::Internal(format!("webhook payload is not JSON: {err}")))?;

        Ok(WebhookDelivery { handler: headers.handler.clone(), payload: parsed })
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::Mutex;

    use super::*;

    /// Echoes the payload and records the key material it was handed.
    struct RecordingDecryptor {
        seen: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl PayloadDecryptor for RecordingDecryptor {
        async fn decrypt(
            &self,
            payload: &[u8],
            secret_key: &str,
            passphrase: &str,
        ) -> Result<Vec<u8>> {
            self.seen.lock().await.push((secret_key.to_string(), passphrase.to_string()));
            Ok(payload.to_vec())
        }
    }

    fn headers() -> WebhookHeaders {
        WebhookHeaders { handler: "consent-updated".to_string(), signature: "sig-1".to_string() }
    }

    #[tokio::test]
    async fn passes_payload_and_key_material_to_decryptor() {
        let decryptor = Arc::new(RecordingDecryptor { seen: Mutex::new(Vec::new()) });
        let handler = WebhookHandler::new(decryptor.clone(), "key-1", "pass-1");

        let delivery =
            handler.handle(br#"{"consentId":"c-1"}"#, &headers()).await.expect("delivery");

        assert_eq!(delivery.handler, "consent-updated");
        assert_eq!(delivery.payload["consentId"], "c-1");
        assert_eq!(
            decryptor.seen.lock().await.as_slice(),
            &[("key-1".to_string(), "pass-1".to_string())]
        );
    }

    #[tokio::test]
    async fn missing_headers_fail_before_decryption() {
        let decryptor = Arc::new(RecordingDecryptor { seen: Mutex::new(Vec::new()) });
        let handler = WebhookHandler::new(decryptor.clone(), "key-1", "pass-1");

        let no_handler =
            WebhookHeaders { handler: String::new(), signature: "sig".to_string() };
        let err = handler.handle(b"{}", &no_handler).await.expect_err("error");
        assert!(matches!(err, HiveError::InvalidArgument(_)));
        assert!(decryptor.seen.lock().await.is_empty());
    }

    #[tokio::test]
    async fn non_json_plaintext_is_an_internal_error() {
        let decryptor = Arc::new(RecordingDecryptor { seen: Mutex::new(Vec::new()) });
        let handler = WebhookHandler::new(decryptor, "key-1", "pass-1");

        let err = handler.handle(b"not json", &headers()).await.expect_err("error");
        assert!(matches!(err, HiveError::Internal(_)));
    }
}
