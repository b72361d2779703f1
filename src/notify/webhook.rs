//! HTTP webhook notification sink.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use url::Url;

use crate::notify::sink::{NotifyError, NotifySink, QoS};

pub const QOS_HEADER: &str = "x-notify-qos";
pub const CLIENT_ID_HEADER: &str = "x-notify-client-id";

/// POSTs each notification to `<base_url>/<topic>`.
#[derive(Debug, Clone)]
pub struct WebhookSink {
    http: reqwest::Client,
    base_url: Url,
    client_id: String,
}

impl WebhookSink {
    pub fn new(base_url: &str, client_id: &str, timeout: Duration) -> Result<Self, NotifyError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: Url::parse(base_url)?,
            client_id: client_id.to_string(),
        })
    }

    /// Target URL for `topic`. Topic segments become path segments.
    pub fn url_for(&self, topic: &str) -> String {
        format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), topic)
    }
}

#[async_trait]
impl NotifySink for WebhookSink {
    async fn publish(&self, topic: &str, payload: &str, qos: QoS) -> Result<(), NotifyError> {
        let response = self
            .http
            .post(self.url_for(topic))
            .header(CONTENT_TYPE, "application/json")
            .header(QOS_HEADER, u8::from(qos).to_string())
            .header(CLIENT_ID_HEADER, &self.client_id)
            .body(payload.to_string())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }
        Ok(())
    }
}
