use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::time::Duration;

use crate::api::models::OutboundPayload;
use crate::error::{BiochatError, Result};
use crate::identity::UserIdentity;

pub const HEADER_UID: &str = "x-identity-uid";
pub const HEADER_EMAIL: &str = "x-identity-email";
pub const HEADER_DISPLAY_NAME: &str = "x-identity-display-name";
pub const HEADER_PHOTO_URL: &str = "x-identity-photo-url";

/// Transport seam for one chat request. Implementations return the parsed
/// response body; any transport, status, or parse failure is an error.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, identity: &UserIdentity, payload: OutboundPayload) -> Result<Value>;
}

pub struct HttpChatTransport {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpChatTransport {
    pub fn new(endpoint: String, request_timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(request_timeout_secs))
            .build()?;
        Ok(Self { endpoint, client })
    }

    fn identity_headers(identity: &UserIdentity) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (name, value) in [
            (HEADER_UID, Some(identity.uid.as_str())),
            (HEADER_EMAIL, Some(identity.email.as_str())),
            (HEADER_DISPLAY_NAME, Some(identity.display_name.as_str())),
            (HEADER_PHOTO_URL, identity.photo_url.as_deref()),
        ] {
            if let Some(value) = value {
                let value = HeaderValue::from_str(value).map_err(|e| {
                    BiochatError::Other(format!("Invalid identity header {}: {}", name, e))
                })?;
                headers.insert(name, value);
            }
        }
        Ok(headers)
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn send(&self, identity: &UserIdentity, payload: OutboundPayload) -> Result<Value> {
        let headers = Self::identity_headers(identity)?;

        let request = match payload {
            OutboundPayload::Json(body) => self
                .client
                .post(&self.endpoint)
                .headers(headers)
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .json(&body),
            OutboundPayload::Multipart {
                message,
                file,
                file_context,
            } => {
                // No explicit Content-Type here: reqwest sets the
                // multipart boundary itself.
                let part = Part::bytes(file.bytes.to_vec())
                    .file_name(file.name.clone())
                    .mime_str(&file.mime_type)?;
                let mut form = Form::new().text("message", message).part("file", part);
                if let Some(context_json) = file_context {
                    form = form.text("fileContext", context_json);
                }
                self.client.post(&self.endpoint).headers(headers).multipart(form)
            }
        };

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(BiochatError::ApiError { status, message });
        }

        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text)?;
        Ok(body)
    }
}
