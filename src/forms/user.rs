//! Forms for authentication and profile management.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::types::{Cid, EmailAddress};
use crate::forms::FormError;

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
/// Credentials posted to `/users/sessions`.
pub struct LoginForm {
    /// Username, email or CID; the server resolves which one it is.
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Clone, Debug, Deserialize, Validate)]
/// Registration form as entered by the user.
pub struct RegisterForm {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    pub cid: i32,
    #[validate(length(min = 1))]
    pub email_code: String,
    #[validate(length(min = 1))]
    pub password: String,
    pub confirm_password: String,
}

/// Registration body sent to `POST /users`.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct RegisterPayload {
    pub username: String,
    pub email: String,
    pub cid: i32,
    pub email_code: String,
    pub password: String,
}

impl TryFrom<RegisterForm> for RegisterPayload {
    type Error = FormError;

    fn try_from(form: RegisterForm) -> Result<Self, Self::Error> {
        form.validate()?;
        if form.password != form.confirm_password {
            return Err(FormError::PasswordMismatch);
        }
        let email = EmailAddress::new(form.email).map_err(|_| FormError::InvalidEmail)?;
        let cid = Cid::new(form.cid)?;

        Ok(Self {
            username: form.username.trim().to_string(),
            email: email.into_inner(),
            cid: cid.get(),
            email_code: form.email_code.trim().to_string(),
            password: form.password,
        })
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
/// Request for a verification code mailed to `email`.
pub struct EmailCodeForm {
    #[validate(email)]
    pub email: String,
    pub cid: i32,
}

#[derive(Clone, Debug, Deserialize, Validate)]
/// Self-service password change.
pub struct ChangePasswordForm {
    #[validate(length(min = 1))]
    pub origin_password: String,
    #[validate(length(min = 1))]
    pub new_password: String,
    pub confirm_password: String,
}

impl TryFrom<ChangePasswordForm> for ProfileUpdate {
    type Error = FormError;

    fn try_from(form: ChangePasswordForm) -> Result<Self, Self::Error> {
        form.validate()?;
        if form.new_password != form.confirm_password {
            return Err(FormError::PasswordMismatch);
        }
        Ok(ProfileUpdate {
            origin_password: Some(form.origin_password),
            new_password: Some(form.new_password),
            ..ProfileUpdate::default()
        })
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
/// Password reset with a mailed verification code.
pub struct ResetPasswordForm {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub email_code: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
/// Profile edit form; blank fields are left untouched.
pub struct ProfileForm {
    pub username: Option<String>,
    pub email: Option<String>,
    pub email_code: Option<i32>,
    pub avatar_url: Option<String>,
    pub qq: Option<i64>,
}

/// Body of `PATCH /users/profiles/{uid}`; only present fields are sent.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qq: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_password: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl TryFrom<ProfileForm> for ProfileUpdate {
    type Error = FormError;

    fn try_from(form: ProfileForm) -> Result<Self, Self::Error> {
        let email = match non_blank(form.email) {
            Some(email) => Some(
                EmailAddress::new(email)
                    .map_err(|_| FormError::InvalidEmail)?
                    .into_inner(),
            ),
            None => None,
        };

        let update = ProfileUpdate {
            username: non_blank(form.username),
            email,
            email_code: form.email_code,
            avatar_url: non_blank(form.avatar_url),
            qq: form.qq.filter(|qq| *qq > 0),
            origin_password: None,
            new_password: None,
        };

        if update == ProfileUpdate::default() {
            return Err(FormError::EmptyUpdate);
        }
        Ok(update)
    }
}
