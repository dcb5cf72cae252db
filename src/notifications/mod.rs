use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, instrument};

use crate::config::FcmConfig;
use crate::errors::ServiceError;

/// Push-notification collaborator boundary. The core only needs a send
/// capability; token internals are opaque.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        token: &str,
        title: &str,
        body: &str,
        data: Option<HashMap<String, String>>,
    ) -> Result<(), ServiceError>;
}

#[derive(Serialize)]
struct FcmMessage<'a> {
    to: &'a str,
    notification: FcmNotification<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<HashMap<String, String>>,
}

#[derive(Serialize)]
struct FcmNotification<'a> {
    title: &'a str,
    body: &'a str,
}

/// Sends through the FCM HTTP endpoint with a server key.
pub struct FcmNotifier {
    http: reqwest::Client,
    endpoint: String,
    server_key: String,
}

const FCM_SEND_ENDPOINT: &str = "https://fcm.googleapis.com/fcm/send";

impl FcmNotifier {
    /// Fails with a `Configuration` error naming the missing setting when the
    /// server key is absent.
    pub fn from_config(cfg: &FcmConfig) -> Result<Self, ServiceError> {
        let server_key = cfg.server_key.clone().ok_or_else(|| {
            ServiceError::configuration(
                "fcm.server_key",
                "Set ATELIER_FCM__SERVER_KEY (or fcm.server_key in config/) to enable push notifications.",
            )
        })?;
        Ok(Self {
            http: reqwest::Client::new(),
            endpoint: FCM_SEND_ENDPOINT.to_string(),
            server_key,
        })
    }

    #[cfg(test)]
    pub fn with_endpoint(endpoint: String, server_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
            server_key,
        }
    }
}

#[async_trait]
impl Notifier for FcmNotifier {
    #[instrument(skip(self, body, data))]
    async fn send(
        &self,
        token: &str,
        title: &str,
        body: &str,
        data: Option<HashMap<String, String>>,
    ) -> Result<(), ServiceError> {
        let message = FcmMessage {
            to: token,
            notification: FcmNotification { title, body },
            data,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .header("Authorization", format!("key={}", self.server_key))
            .json(&message)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response
                .json::<serde_json::Value>()
                .await
                .unwrap_or_else(|_| json!({}));
            return Err(ServiceError::ExternalService(format!(
                "FCM rejected the message with {status}: {detail}"
            )));
        }

        debug!("push notification delivered");
        Ok(())
    }
}

/// No-op notifier for tests and credential-less development.
#[derive(Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send(
        &self,
        _token: &str,
        title: &str,
        _body: &str,
        _data: Option<HashMap<String, String>>,
    ) -> Result<(), ServiceError> {
        debug!(%title, "push notifications disabled; dropping message");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_server_key_is_a_configuration_error() {
        let cfg = FcmConfig::default();
        match FcmNotifier::from_config(&cfg) {
            Err(ServiceError::Configuration { setting, .. }) => {
                assert_eq!(setting, "fcm.server_key")
            }
            other => panic!("expected configuration error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn noop_notifier_accepts_everything() {
        let notifier = NoopNotifier;
        assert!(notifier
            .send("device-token", "Order update", "ready", None)
            .await
            .is_ok());
    }
}
