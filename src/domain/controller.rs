use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    ApplicationId, ApplicationStatus, ControllerRecordType, RecordId, Uid, resolve_asset_url,
};
use crate::domain::user::User;

/// Controller list entries are plain user profiles.
pub type Controller = User;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ControllerRating {
    #[serde(default)]
    pub avatar_url: String,
    pub cid: i32,
    #[serde(default)]
    pub is_guest: bool,
    pub rating: i32,
    #[serde(default)]
    pub solo_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub under_monitor: bool,
    #[serde(default)]
    pub under_solo: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ControllerRecord {
    pub id: RecordId,
    #[serde(rename = "type")]
    pub record_type: ControllerRecordType,
    pub uid: Uid,
    pub operator_cid: i32,
    pub content: String,
    pub time: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ControllerApplication {
    pub id: ApplicationId,
    pub user_id: Uid,
    #[serde(default)]
    pub user: Option<User>,
    pub why_want_to_be_controller: String,
    pub controller_record: String,
    pub is_guest: bool,
    pub platform: String,
    #[serde(default)]
    pub evidence: String,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl ControllerApplication {
    /// Rewrites a relative evidence image path into an absolute URL.
    pub fn resolve_assets(&mut self, backend_url: &str) {
        self.evidence = resolve_asset_url(backend_url, &self.evidence);
        if let Some(user) = self.user.as_mut() {
            user.resolve_assets(backend_url);
        }
    }
}

/// Rating fields an administrator may change on a controller.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RatingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier2: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub under_monitor: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub under_solo: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solo_until: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest: Option<bool>,
}

impl RatingUpdate {
    pub fn is_empty(&self) -> bool {
        self == &RatingUpdate::default()
    }
}

/// Body of `PUT /controllers/applications/{id}`.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ApplicationDecision {
    pub status: ApplicationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<Vec<String>>,
}

impl ApplicationDecision {
    /// Moves the application into the interview stage with proposed time slots.
    pub fn confirm(slots: Vec<String>) -> Self {
        Self {
            status: ApplicationStatus::Processing,
            message: None,
            time: Some(slots),
        }
    }

    pub fn pass(message: impl Into<String>) -> Self {
        Self {
            status: ApplicationStatus::Passed,
            message: Some(message.into()),
            time: None,
        }
    }

    pub fn reject(message: impl Into<String>) -> Self {
        Self {
            status: ApplicationStatus::Rejected,
            message: Some(message.into()),
            time: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decisions_serialize_only_relevant_fields() {
        let confirm = serde_json::to_value(ApplicationDecision::confirm(vec![
            "2025-03-01 20:00".to_string(),
        ]))
        .unwrap();
        assert_eq!(confirm["status"], 1);
        assert!(confirm.get("message").is_none());

        let reject = serde_json::to_value(ApplicationDecision::reject("not yet")).unwrap();
        assert_eq!(reject["status"], 3);
        assert_eq!(reject["message"], "not yet");
        assert!(reject.get("time").is_none());
    }

    #[test]
    fn empty_rating_update_is_detected() {
        assert!(RatingUpdate::default().is_empty());
        let update = RatingUpdate {
            under_solo: Some(true),
            ..RatingUpdate::default()
        };
        assert!(!update.is_empty());
        assert_eq!(
            serde_json::to_string(&update).unwrap(),
            r#"{"under_solo":true}"#
        );
    }
}
