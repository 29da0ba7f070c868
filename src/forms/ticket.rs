use serde::Deserialize;
use validator::Validate;

use crate::domain::ticket::NewTicket;
use crate::domain::types::TicketType;
use crate::forms::FormError;

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct TicketForm {
    pub ticket_type: i32,
    #[validate(length(min = 1, max = 128))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
}

impl TryFrom<TicketForm> for NewTicket {
    type Error = FormError;

    fn try_from(form: TicketForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(NewTicket {
            ticket_type: TicketType::try_from(form.ticket_type)?,
            title: form.title.trim().to_string(),
            content: form.content.trim().to_string(),
        })
    }
}
