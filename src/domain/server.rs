//! Server-wide configuration and statistics.

use serde::{Deserialize, Serialize};

/// Input limits the server enforces on registration and profile edits.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Limits {
    pub username_length_min: usize,
    pub username_length_max: usize,
    pub password_length_min: usize,
    pub password_length_max: usize,
    pub email_length_min: usize,
    pub email_length_max: usize,
    pub cid_min: i32,
    pub cid_max: i32,
    #[serde(default)]
    pub simulator_server: bool,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            username_length_min: 4,
            username_length_max: 16,
            password_length_min: 6,
            password_length_max: 64,
            email_length_min: 4,
            email_length_max: 64,
            cid_min: 1,
            cid_max: 9999,
            simulator_server: false,
        }
    }
}

/// Upload restrictions for one class of files.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct UploadLimit {
    pub max_allow_size: u64,
    /// Extensions including the leading dot, e.g. `.png`.
    #[serde(default)]
    pub allowed_ext: Vec<String>,
}

/// Short/long name pair used for ratings and facilities.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NamedCode {
    pub id: i32,
    pub short_name: String,
    pub long_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct ServerConfig {
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub image_limit: UploadLimit,
    #[serde(default)]
    pub file_limit: UploadLimit,
    /// Seconds between two verification emails.
    #[serde(default)]
    pub email_send_interval: u64,
    #[serde(default)]
    pub facilities: Vec<NamedCode>,
    #[serde(default)]
    pub ratings: Vec<NamedCode>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct ServerInfo {
    pub total_user: i64,
    pub total_controller: i64,
    pub total_activity: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ServerRating {
    pub cid: i32,
    #[serde(default)]
    pub avatar_url: String,
    /// Seconds online in the ranking period.
    pub time: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct ServerRatings {
    #[serde(default)]
    pub pilots: Vec<ServerRating>,
    #[serde(default)]
    pub controllers: Vec<ServerRating>,
}
