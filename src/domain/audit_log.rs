use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::AuditLogId;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChangeDetails {
    pub old_value: String,
    pub new_value: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AuditLog {
    pub id: AuditLogId,
    pub time: DateTime<Utc>,
    pub event_type: String,
    /// CID of the member who triggered the event.
    pub subject: i32,
    pub object: String,
    pub ip: String,
    pub user_agent: String,
    #[serde(default)]
    pub change_details: Option<ChangeDetails>,
}
