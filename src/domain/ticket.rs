use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::{TicketId, TicketType};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Ticket {
    pub id: TicketId,
    pub creator: i32,
    #[serde(rename = "type")]
    pub ticket_type: TicketType,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub reply: String,
    #[serde(default)]
    pub closer: i32,
    pub open_at: DateTime<Utc>,
    #[serde(default)]
    pub close_at: Option<DateTime<Utc>>,
}

impl Ticket {
    /// A ticket is closed once somebody replied to it.
    pub fn is_closed(&self) -> bool {
        self.closer > 0 || self.close_at.is_some()
    }
}

/// Body of `POST /tickets`.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct NewTicket {
    #[serde(rename = "type")]
    pub ticket_type: TicketType,
    pub title: String,
    pub content: String,
}
