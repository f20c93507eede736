//! Badge gate and copy orchestration.

use crate::config::BadgeConfig;
use crate::error::BadgeError;
use crate::models::event::BuildEvent;
use crate::services::storage_service::{CopyMetadata, StorageClient};

pub const BADGE_CONTENT_TYPE: &str = "image/svg+xml";
/// Doc hosts proxy and cache embedded images; force revalidation so the badge
/// always shows the latest build result.
pub const BADGE_CACHE_CONTROL: &str = "no-cache, max-age=0";

/// Terminal outcome of handling one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BadgeOutcome {
    /// Gate not matched; nothing written.
    Skipped { reason: &'static str },
    /// Badge object overwritten from the status image at `source_key`.
    Copied { source_key: String },
}

/// Handle one build notification: gate on repo and terminal status, then copy
/// the matching status image over the published badge object.
///
/// Concurrent notifications may race on the destination; last-write-wins is
/// fine since there are only two possible final contents.
pub async fn handle_event(
    config: &BadgeConfig,
    storage: &StorageClient,
    event: &BuildEvent,
) -> Result<BadgeOutcome, BadgeError> {
    tracing::info!(
        status = event.status.as_str(),
        repo = %event.repo,
        branch = event.branch.as_deref().unwrap_or("unknown"),
        "Build notification received"
    );

    if event.repo != config.target_repo {
        tracing::debug!(repo = %event.repo, "Ignoring build for unwatched repo");
        return Ok(BadgeOutcome::Skipped { reason: "repo" });
    }

    // Only terminal SUCCESS/FAILURE builds move the badge. Branch is not part
    // of the gate: every branch of the watched repo is eligible.
    let stem = match event.status.badge_stem() {
        Some(s) => s,
        None => {
            tracing::debug!(
                status = event.status.as_str(),
                "Ignoring non-terminal build status"
            );
            return Ok(BadgeOutcome::Skipped { reason: "status" });
        }
    };

    let source_key = format!("{}{}.svg", config.source_prefix, stem);
    tracing::info!(from = %source_key, to = %config.destination_key, "Updating status badge");

    let meta = CopyMetadata {
        content_type: BADGE_CONTENT_TYPE.to_string(),
        cache_control: BADGE_CACHE_CONTROL.to_string(),
    };
    storage
        .copy_object(&config.bucket, &source_key, &config.destination_key, &meta)
        .await?;

    tracing::info!("Badge updated");
    Ok(BadgeOutcome::Copied { source_key })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::BuildStatus;

    fn test_config() -> BadgeConfig {
        BadgeConfig {
            bucket: "gcp-build-badge".to_string(),
            target_repo: "http-gallery-beego".to_string(),
            source_prefix: "http-gallery-beego/".to_string(),
            destination_key: "http-gallery-beego/statusbadge.svg".to_string(),
            // Unreachable on purpose; gate-fail paths must not touch storage.
            storage_base_url: "http://127.0.0.1:1".to_string(),
            metadata_base_url: "http://127.0.0.1:1".to_string(),
            static_token: "test-token".to_string(),
            push_token: String::new(),
        }
    }

    fn event(status: BuildStatus, repo: &str) -> BuildEvent {
        BuildEvent {
            status,
            repo: repo.to_string(),
            branch: Some("main".to_string()),
        }
    }

    #[tokio::test]
    async fn wrong_repo_is_skipped_even_on_success() {
        let config = test_config();
        let storage = StorageClient::new(&config).unwrap();
        let outcome = handle_event(&config, &storage, &event(BuildStatus::Success, "other-repo"))
            .await
            .unwrap();
        assert_eq!(outcome, BadgeOutcome::Skipped { reason: "repo" });
    }

    #[tokio::test]
    async fn non_terminal_status_is_skipped() {
        let config = test_config();
        let storage = StorageClient::new(&config).unwrap();
        let outcome = handle_event(
            &config,
            &storage,
            &event(BuildStatus::Other("QUEUED".into()), "http-gallery-beego"),
        )
        .await
        .unwrap();
        assert_eq!(outcome, BadgeOutcome::Skipped { reason: "status" });
    }

    #[tokio::test]
    async fn lowercase_success_is_skipped() {
        let config = test_config();
        let storage = StorageClient::new(&config).unwrap();
        let outcome = handle_event(
            &config,
            &storage,
            &event(BuildStatus::Other("success".into()), "http-gallery-beego"),
        )
        .await
        .unwrap();
        assert_eq!(outcome, BadgeOutcome::Skipped { reason: "status" });
    }

    #[tokio::test]
    async fn terminal_status_with_unreachable_storage_is_a_copy_error() {
        let config = test_config();
        let storage = StorageClient::new(&config).unwrap();
        let err = handle_event(
            &config,
            &storage,
            &event(BuildStatus::Failure, "http-gallery-beego"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BadgeError::Copy(_)));
    }
}
