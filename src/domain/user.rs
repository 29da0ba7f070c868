use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::permission::Permission;
use crate::domain::types::{Rating, Uid, resolve_asset_url};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uid,
    pub username: String,
    pub email: String,
    pub cid: i32,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub qq: i64,
    pub rating: i32,
    #[serde(default)]
    pub guest: bool,
    #[serde(default)]
    pub under_monitor: bool,
    #[serde(default)]
    pub under_solo: bool,
    #[serde(default)]
    pub tier2: bool,
    #[serde(default)]
    pub solo_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub permission: Permission,
    #[serde(default)]
    pub total_atc_time: i64,
    #[serde(default)]
    pub total_pilot_time: i64,
    #[serde(default)]
    pub register_time: Option<DateTime<Utc>>,
}

impl User {
    /// Parsed rating, `None` when the server sent a code this client does not know.
    pub fn rating(&self) -> Option<Rating> {
        Rating::try_from(self.rating).ok()
    }

    /// Rewrites a relative avatar path into an absolute URL.
    pub fn resolve_assets(&mut self, backend_url: &str) {
        self.avatar_url = resolve_asset_url(backend_url, &self.avatar_url);
    }
}

/// Payload returned by login and token refresh.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LoginData {
    pub user: User,
    pub token: String,
    #[serde(default)]
    pub flush_token: String,
}

/// One connection session in the user's pilot or controller history.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct HistoryRecord {
    pub callsign: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Seconds online.
    pub online_time: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct UserHistory {
    pub total_pilot_time: i64,
    pub total_atc_time: i64,
    #[serde(default)]
    pub controllers: Vec<HistoryRecord>,
    #[serde(default)]
    pub pilots: Vec<HistoryRecord>,
}

/// Field checked by the availability endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Availability {
    Cid(i32),
    Username(String),
    Email(String),
}

impl Availability {
    /// Inputs the server would reject anyway count as available so that
    /// form validation reports the more specific error instead.
    pub fn is_trivially_available(&self) -> bool {
        match self {
            Availability::Cid(cid) => *cid <= 0,
            Availability::Username(name) => name.is_empty(),
            Availability::Email(email) => email.is_empty(),
        }
    }

    /// Query pair sent to `/users/availability`.
    pub fn query(&self) -> (&'static str, String) {
        match self {
            Availability::Cid(cid) => ("cid", cid.to_string()),
            Availability::Username(name) => ("username", name.clone()),
            Availability::Email(email) => ("email", email.clone()),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn user(uid: i32, permission: Permission) -> User {
        User {
            id: Uid::new(uid).expect("valid uid"),
            username: format!("user{uid}"),
            email: format!("user{uid}@example.com"),
            cid: 1000 + uid,
            avatar_url: String::new(),
            qq: 0,
            rating: 5,
            guest: false,
            under_monitor: false,
            under_solo: false,
            tier2: false,
            solo_until: None,
            permission,
            total_atc_time: 0,
            total_pilot_time: 0,
            register_time: None,
        }
    }
}
