use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use tracing::debug;

use super::{check_storage_name, ImageHost};
use crate::errors::ServiceError;

/// Longest slice of an error body copied into the error message.
const ERROR_BODY_PREVIEW: usize = 256;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    data: Option<UploadData>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    url: Option<String>,
}

/// Client for an imgbb-style hosting API: base64 form upload, `data.url` reply.
#[derive(Clone)]
pub struct RemoteImageHost {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl RemoteImageHost {
    pub fn new(endpoint: &str, api_key: &str, timeout: Duration) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Upstream(format!("build image host client: {e}")))?;
        Ok(Self { client, endpoint: endpoint.to_string(), api_key: api_key.to_string() })
    }
}

#[async_trait]
impl ImageHost for RemoteImageHost {
    fn backend(&self) -> &'static str { "remote" }

    async fn upload(&self, bytes: Vec<u8>, storage_name: &str) -> Result<String, ServiceError> {
        check_storage_name(storage_name)?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
        let stem = storage_name.split('.').next().unwrap_or(storage_name);
        let form = reqwest::multipart::Form::new()
            .text("image", encoded)
            .text("name", stem.to_string());

        // without_url(): the request URL carries the API key
        let resp = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .multipart(form)
            .send()
            .await
            .map_err(|e| ServiceError::Upstream(format!("image host request failed: {}", e.without_url())))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let preview: String = body.chars().take(ERROR_BODY_PREVIEW).collect();
            return Err(ServiceError::Upstream(format!("image host returned {status}: {preview}")));
        }

        let parsed: UploadResponse = resp
            .json()
            .await
            .map_err(|e| ServiceError::Upstream(format!("image host reply unreadable: {}", e.without_url())))?;
        let url = parsed
            .data
            .and_then(|d| d.url)
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| ServiceError::Upstream("image host reply missing data.url".into()))?;

        debug!(%url, size = bytes.len(), "image_hosted");
        Ok(url)
    }
}
