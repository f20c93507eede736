//! Badge updater configuration — loaded from environment variables.

#[derive(Clone, Debug)]
pub struct BadgeConfig {
    /// Bucket holding the badge objects.
    pub bucket: String,
    /// Repository whose builds drive the badge.
    pub target_repo: String,
    /// Key prefix for the per-status source images.
    pub source_prefix: String,
    /// Key of the published badge object.
    pub destination_key: String,
    /// Storage JSON API base URL.
    pub storage_base_url: String,
    /// GCE metadata server base URL (token source when no static token is set).
    pub metadata_base_url: String,
    /// Static OAuth bearer token; skips the metadata server when set.
    pub static_token: String,
    /// Shared secret required as `?token=` on the push endpoint.
    pub push_token: String,
}

impl BadgeConfig {
    pub fn from_env() -> Self {
        let bucket =
            std::env::var("BADGE_BUCKET").unwrap_or_else(|_| "gcp-build-badge".to_string());
        let target_repo =
            std::env::var("BADGE_REPO").unwrap_or_else(|_| "http-gallery-beego".to_string());
        let source_prefix =
            std::env::var("BADGE_SOURCE_PREFIX").unwrap_or_else(|_| format!("{target_repo}/"));
        let destination_key = std::env::var("BADGE_DESTINATION_KEY")
            .unwrap_or_else(|_| format!("{target_repo}/statusbadge.svg"));
        let storage_base_url = std::env::var("BADGE_STORAGE_URL")
            .unwrap_or_else(|_| "https://storage.googleapis.com".to_string());
        let metadata_base_url = std::env::var("BADGE_METADATA_URL")
            .unwrap_or_else(|_| "http://metadata.google.internal".to_string());
        let static_token = std::env::var("BADGE_STORAGE_TOKEN").unwrap_or_default();
        let push_token = std::env::var("BADGE_PUSH_TOKEN").unwrap_or_default();

        if push_token.is_empty() {
            tracing::warn!("BADGE_PUSH_TOKEN not set -- push endpoint token check disabled");
        }
        if static_token.is_empty() {
            tracing::info!("BADGE_STORAGE_TOKEN not set -- using metadata server credentials");
        }

        Self {
            bucket,
            target_repo,
            source_prefix,
            destination_key,
            storage_base_url,
            metadata_base_url,
            static_token,
            push_token,
        }
    }
}
