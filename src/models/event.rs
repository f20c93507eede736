//! Cloud Build notifications as delivered by Pub/Sub push.

use std::collections::HashMap;

use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::BadgeError;

/// Pub/Sub push delivery envelope.
#[derive(Debug, Deserialize)]
pub struct PushEnvelope {
    pub message: PushMessage,
    #[serde(default)]
    pub subscription: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PushMessage {
    /// Base64-encoded build event JSON.
    #[serde(default)]
    pub data: Option<String>,
    #[serde(rename = "messageId", default)]
    pub message_id: Option<String>,
    #[serde(rename = "publishTime", default)]
    pub publish_time: Option<DateTime<Utc>>,
}

/// Build result status. Matching is exact and case-sensitive; anything that
/// is not a terminal SUCCESS/FAILURE (QUEUED, WORKING, a lowercase variant)
/// is carried as `Other` and never moves the badge.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum BuildStatus {
    #[serde(rename = "SUCCESS")]
    Success,
    #[serde(rename = "FAILURE")]
    Failure,
    #[serde(untagged)]
    Other(String),
}

impl BuildStatus {
    /// Lowercase file stem of the badge source image for terminal statuses.
    pub fn badge_stem(&self) -> Option<&'static str> {
        match self {
            BuildStatus::Success => Some("success"),
            BuildStatus::Failure => Some("failure"),
            BuildStatus::Other(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BuildStatus::Success => "SUCCESS",
            BuildStatus::Failure => "FAILURE",
            BuildStatus::Other(s) => s,
        }
    }
}

/// Raw wire shape of a Cloud Build notification. Everything is optional here;
/// validation happens in [`BuildEvent::from_json`].
#[derive(Debug, Deserialize)]
struct RawBuildEvent {
    status: Option<BuildStatus>,
    #[serde(default)]
    substitutions: Option<HashMap<String, String>>,
}

/// A validated build event: the fields the badge gate needs.
#[derive(Debug, Clone)]
pub struct BuildEvent {
    pub status: BuildStatus,
    pub repo: String,
    /// Extracted and logged but not consulted by the gate.
    pub branch: Option<String>,
}

impl BuildEvent {
    /// Decode the base64 `message.data` payload into a validated event.
    pub fn from_push_data(data: &str) -> Result<Self, BadgeError> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(data)
            .map_err(|e| BadgeError::MalformedEvent(format!("data is not base64: {e}")))?;
        Self::from_json(&bytes)
    }

    /// Decode a build event from raw JSON bytes.
    pub fn from_json(bytes: &[u8]) -> Result<Self, BadgeError> {
        let raw: RawBuildEvent = serde_json::from_slice(bytes)
            .map_err(|e| BadgeError::MalformedEvent(format!("invalid event JSON: {e}")))?;

        let status = raw
            .status
            .ok_or_else(|| BadgeError::MalformedEvent("missing status".into()))?;
        let mut substitutions = raw
            .substitutions
            .ok_or_else(|| BadgeError::MalformedEvent("missing substitutions".into()))?;
        let repo = substitutions
            .remove("REPO_NAME")
            .ok_or_else(|| BadgeError::MalformedEvent("missing REPO_NAME".into()))?;
        let branch = substitutions.remove("BRANCH_NAME");

        Ok(Self {
            status,
            repo,
            branch,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_json(status: &str, repo: &str) -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({
            "status": status,
            "substitutions": { "REPO_NAME": repo, "BRANCH_NAME": "main" },
        }))
        .unwrap()
    }

    #[test]
    fn decodes_terminal_statuses() {
        let ev = BuildEvent::from_json(&event_json("SUCCESS", "http-gallery-beego")).unwrap();
        assert_eq!(ev.status, BuildStatus::Success);
        assert_eq!(ev.repo, "http-gallery-beego");
        assert_eq!(ev.branch.as_deref(), Some("main"));

        let ev = BuildEvent::from_json(&event_json("FAILURE", "http-gallery-beego")).unwrap();
        assert_eq!(ev.status, BuildStatus::Failure);
    }

    #[test]
    fn non_terminal_status_is_other() {
        let ev = BuildEvent::from_json(&event_json("QUEUED", "r")).unwrap();
        assert_eq!(ev.status, BuildStatus::Other("QUEUED".into()));
        assert_eq!(ev.status.badge_stem(), None);
    }

    #[test]
    fn status_match_is_case_sensitive() {
        let ev = BuildEvent::from_json(&event_json("success", "r")).unwrap();
        assert_eq!(ev.status, BuildStatus::Other("success".into()));
    }

    #[test]
    fn missing_status_is_malformed() {
        let json = br#"{"substitutions":{"REPO_NAME":"r"}}"#;
        assert!(matches!(
            BuildEvent::from_json(json),
            Err(BadgeError::MalformedEvent(_))
        ));
    }

    #[test]
    fn missing_substitutions_is_malformed() {
        let json = br#"{"status":"SUCCESS"}"#;
        assert!(matches!(
            BuildEvent::from_json(json),
            Err(BadgeError::MalformedEvent(_))
        ));
    }

    #[test]
    fn missing_repo_name_is_malformed() {
        let json = br#"{"status":"SUCCESS","substitutions":{"BRANCH_NAME":"main"}}"#;
        assert!(matches!(
            BuildEvent::from_json(json),
            Err(BadgeError::MalformedEvent(_))
        ));
    }

    #[test]
    fn missing_branch_is_tolerated() {
        let json = br#"{"status":"SUCCESS","substitutions":{"REPO_NAME":"r"}}"#;
        let ev = BuildEvent::from_json(json).unwrap();
        assert_eq!(ev.branch, None);
    }

    #[test]
    fn decodes_base64_push_data() {
        use base64::Engine;
        let data = base64::engine::general_purpose::STANDARD
            .encode(event_json("SUCCESS", "http-gallery-beego"));
        let ev = BuildEvent::from_push_data(&data).unwrap();
        assert_eq!(ev.status, BuildStatus::Success);
    }

    #[test]
    fn garbage_push_data_is_malformed() {
        assert!(matches!(
            BuildEvent::from_push_data("%%not-base64%%"),
            Err(BadgeError::MalformedEvent(_))
        ));
        // Valid base64, invalid JSON inside.
        assert!(matches!(
            BuildEvent::from_push_data("bm90IGpzb24="),
            Err(BadgeError::MalformedEvent(_))
        ));
    }
}
