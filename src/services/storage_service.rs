//! Object storage integration — server-side copy via the GCS JSON API.

use serde::Deserialize;

use crate::config::BadgeConfig;
use crate::error::BadgeError;

/// Metadata applied to the destination object by a copy.
#[derive(Debug, Clone)]
pub struct CopyMetadata {
    pub content_type: String,
    pub cache_control: String,
}

/// One HTTP client per process; tokens are resolved per copy so metadata
/// server credentials never go stale.
pub struct StorageClient {
    http: reqwest::Client,
    storage_base_url: String,
    metadata_base_url: String,
    static_token: String,
}

#[derive(Deserialize)]
struct MetadataToken {
    access_token: String,
}

impl StorageClient {
    pub fn new(config: &BadgeConfig) -> Result<Self, BadgeError> {
        let http = reqwest::Client::builder()
            .user_agent("build-badge")
            .build()
            .map_err(|e| BadgeError::ClientInit(e.to_string()))?;

        Ok(Self {
            http,
            storage_base_url: config.storage_base_url.trim_end_matches('/').to_string(),
            metadata_base_url: config.metadata_base_url.trim_end_matches('/').to_string(),
            static_token: config.static_token.clone(),
        })
    }

    /// Resolve a bearer token: static override first, else the GCE metadata
    /// server (the ambient service-account credential).
    async fn access_token(&self) -> Result<String, BadgeError> {
        if !self.static_token.is_empty() {
            return Ok(self.static_token.clone());
        }

        let url = format!(
            "{}/computeMetadata/v1/instance/service-accounts/default/token",
            self.metadata_base_url
        );
        let resp = self
            .http
            .get(&url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| BadgeError::ClientInit(format!("metadata server unreachable: {e}")))?;

        if !resp.status().is_success() {
            return Err(BadgeError::ClientInit(format!(
                "metadata server returned {}",
                resp.status()
            )));
        }

        let token: MetadataToken = resp
            .json()
            .await
            .map_err(|e| BadgeError::ClientInit(format!("bad token response: {e}")))?;

        Ok(token.access_token)
    }

    /// Server-side copy of `src` onto `dst` within `bucket`, setting the
    /// destination's content type and cache control. No bytes are streamed
    /// through this process.
    pub async fn copy_object(
        &self,
        bucket: &str,
        src: &str,
        dst: &str,
        meta: &CopyMetadata,
    ) -> Result<(), BadgeError> {
        let token = self.access_token().await?;

        // Object names may contain `/`, so they go percent-encoded into the path.
        let url = format!(
            "{}/storage/v1/b/{}/o/{}/copyTo/b/{}/o/{}",
            self.storage_base_url,
            bucket,
            urlencoding::encode(src),
            bucket,
            urlencoding::encode(dst),
        );

        let body = serde_json::json!({
            "contentType": meta.content_type,
            "cacheControl": meta.cache_control,
        });

        let resp = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {token}"))
            .json(&body)
            .send()
            .await
            .map_err(|e| BadgeError::Copy(format!("copy request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(BadgeError::Copy(format!("storage returned {status}: {text}")));
        }

        Ok(())
    }
}
