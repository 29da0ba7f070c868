use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::{AnnouncementId, AnnouncementType};
use crate::domain::user::User;

/// Announcement as shown to administrators, including the publisher.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Announcement {
    pub id: AnnouncementId,
    pub publisher_id: i32,
    #[serde(default)]
    pub user: Option<User>,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub announcement_type: AnnouncementType,
    pub force_show: bool,
    pub important: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Announcement as listed to ordinary members.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserAnnouncement {
    pub id: AnnouncementId,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub announcement_type: AnnouncementType,
    pub force_show: bool,
    pub important: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /announcements`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NewAnnouncement {
    #[serde(rename = "type")]
    pub announcement_type: AnnouncementType,
    pub title: String,
    pub content: String,
    pub important: bool,
    pub force_show: bool,
}

/// Partial body of `PUT /announcements/{id}`.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct AnnouncementUpdate {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub announcement_type: Option<AnnouncementType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub important: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_show: Option<bool>,
}

/// Reduces announcement HTML to plain text for terminal display.
pub fn plain_text(html: &str) -> String {
    let mut builder = ammonia::Builder::empty();
    builder.clean_content_tags(HashSet::from(["script", "style"]));
    let stripped = builder.clean(html).to_string();
    html_escape::decode_html_entities(&stripped)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_is_reduced_to_text() {
        let html = "<p>1. New <b>activity</b> page</p>\n<p><script>alert(1)</script>2. Fixes</p>";
        assert_eq!(plain_text(html), "1. New activity page\n2. Fixes");
    }

    #[test]
    fn entities_are_decoded() {
        assert_eq!(
            plain_text("<p>Tom &amp; Jerry: 1 < 2</p>"),
            "Tom & Jerry: 1 < 2"
        );
        assert_eq!(plain_text("caf&eacute; &quot;ZBAA&quot;&nbsp;tower"), "café \"ZBAA\"\u{a0}tower");
    }

    #[test]
    fn update_serializes_present_fields_only() {
        let update = AnnouncementUpdate {
            important: Some(true),
            ..AnnouncementUpdate::default()
        };
        assert_eq!(serde_json::to_string(&update).unwrap(), r#"{"important":true}"#);
    }
}
