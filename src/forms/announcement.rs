use serde::Deserialize;
use validator::Validate;

use crate::domain::announcement::NewAnnouncement;
use crate::domain::types::AnnouncementType;
use crate::forms::FormError;

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct AnnouncementForm {
    pub announcement_type: i32,
    #[validate(length(min = 1, max = 128))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
    #[serde(default)]
    pub important: bool,
    #[serde(default)]
    pub force_show: bool,
}

impl TryFrom<AnnouncementForm> for NewAnnouncement {
    type Error = FormError;

    fn try_from(form: AnnouncementForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(NewAnnouncement {
            announcement_type: AnnouncementType::try_from(form.announcement_type)?,
            title: form.title.trim().to_string(),
            content: form.content,
            important: form.important,
            force_show: form.force_show,
        })
    }
}
