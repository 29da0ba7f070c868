//! Forms for controller applications and training records.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::types::{ControllerRecordType, TypeConstraintError};
use crate::forms::FormError;

/// Networks an applicant may cite as prior controlling experience.
pub const SUPPORTED_PLATFORMS: &[&str] = &["Vatprc(Vatsim)", "Skyline", "Xflysim", "Chinaflier", "Sino"];

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct ApplicationForm {
    #[validate(length(min = 1, max = 2048))]
    pub why_want_to_be_controller: String,
    #[serde(default)]
    pub controller_record: String,
    #[serde(default)]
    pub is_guest: bool,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub evidence: String,
}

/// Body of `POST /controllers/applications`.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ApplicationPayload {
    pub why_want_to_be_controller: String,
    pub controller_record: String,
    pub is_guest: bool,
    pub platform: String,
    pub evidence: String,
}

impl TryFrom<ApplicationForm> for ApplicationPayload {
    type Error = FormError;

    fn try_from(form: ApplicationForm) -> Result<Self, Self::Error> {
        form.validate()?;
        let platform = form.platform.trim().to_string();
        // Guests transfer from another network and must name it.
        if form.is_guest && !SUPPORTED_PLATFORMS.contains(&platform.as_str()) {
            return Err(TypeConstraintError::InvalidValue(format!("platform `{platform}`")).into());
        }
        Ok(Self {
            why_want_to_be_controller: form.why_want_to_be_controller.trim().to_string(),
            controller_record: form.controller_record.trim().to_string(),
            is_guest: form.is_guest,
            platform,
            evidence: form.evidence.trim().to_string(),
        })
    }
}

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct RecordForm {
    pub record_type: i32,
    #[validate(length(min = 1))]
    pub content: String,
}

/// Validated training record entry.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordPayload {
    pub record_type: ControllerRecordType,
    pub content: String,
}

impl TryFrom<RecordForm> for RecordPayload {
    type Error = FormError;

    fn try_from(form: RecordForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            record_type: ControllerRecordType::try_from(form.record_type)?,
            content: form.content.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn application(is_guest: bool, platform: &str) -> ApplicationForm {
        ApplicationForm {
            why_want_to_be_controller: "I enjoy ATC".to_string(),
            controller_record: String::new(),
            is_guest,
            platform: platform.to_string(),
            evidence: String::new(),
        }
    }

    #[test]
    fn guest_applications_need_a_known_platform() {
        assert!(ApplicationPayload::try_from(application(true, "Skyline")).is_ok());
        assert!(matches!(
            ApplicationPayload::try_from(application(true, "Elsewhere")),
            Err(FormError::Constraint(_))
        ));
        assert!(ApplicationPayload::try_from(application(false, "")).is_ok());
    }

    #[test]
    fn record_type_must_be_known() {
        let ok = RecordPayload::try_from(RecordForm {
            record_type: 1,
            content: "Simulator session passed".to_string(),
        })
        .expect("known type");
        assert_eq!(ok.record_type, ControllerRecordType::Simulator);

        assert!(
            RecordPayload::try_from(RecordForm {
                record_type: 99,
                content: "x".to_string(),
            })
            .is_err()
        );
    }
}
