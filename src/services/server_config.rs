//! Server-published limits and the field validators built on them.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::api::{ServerApi, UserApi};
use crate::domain::server::{Limits, NamedCode, ServerConfig};
use crate::domain::types::EmailAddress;
use crate::domain::user::Availability;
use crate::services::ServiceResult;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LimitError {
    #[error("Username may only contain letters, digits and underscores and must not start with a digit")]
    UsernamePattern,

    #[error("{field} must be between {min} and {max} characters")]
    Length {
        field: &'static str,
        min: usize,
        max: usize,
    },

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("CID must be numeric")]
    CidNotNumeric,

    #[error("CID must not be less than {0}")]
    CidTooSmall(i32),

    #[error("CID must not be greater than {0}")]
    CidTooLarge(i32),

    #[error("This {0} is already registered")]
    Taken(&'static str),
}

fn check_length(field: &'static str, value: &str, min: usize, max: usize) -> Result<(), LimitError> {
    let len = value.chars().count();
    if (min..=max).contains(&len) {
        Ok(())
    } else {
        Err(LimitError::Length { field, min, max })
    }
}

static USERNAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]+$").expect("username pattern compiles")
});

async fn ensure_available<A>(api: &A, field: Availability, name: &'static str) -> ServiceResult<()>
where
    A: UserApi + ?Sized,
{
    if api.check_availability(&field).await? {
        Ok(())
    } else {
        Err(LimitError::Taken(name).into())
    }
}

/// Holds the last server configuration, falling back to built-in limits.
#[derive(Clone, Debug, Default)]
pub struct ServerConfigStore {
    config: ServerConfig,
}

impl ServerConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Replaces the cached configuration with the server's.
    pub async fn load<A>(&mut self, api: &A) -> ServiceResult<()>
    where
        A: ServerApi + ?Sized,
    {
        self.config = api.server_config().await.map_err(|err| {
            log::error!("Failed to load server config, contact an administrator: {err}");
            err
        })?;
        Ok(())
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn limits(&self) -> &Limits {
        &self.config.limits
    }

    pub fn ratings(&self) -> &[NamedCode] {
        &self.config.ratings
    }

    pub fn facilities(&self) -> &[NamedCode] {
        &self.config.facilities
    }

    pub fn check_username(&self, name: &str) -> Result<(), LimitError> {
        if !USERNAME_PATTERN.is_match(name) {
            return Err(LimitError::UsernamePattern);
        }
        let limits = self.limits();
        check_length(
            "Username",
            name,
            limits.username_length_min,
            limits.username_length_max,
        )
    }

    pub fn check_password(&self, password: &str) -> Result<(), LimitError> {
        let limits = self.limits();
        check_length(
            "Password",
            password,
            limits.password_length_min,
            limits.password_length_max,
        )
    }

    pub fn check_email(&self, email: &str) -> Result<(), LimitError> {
        EmailAddress::new(email).map_err(|_| LimitError::InvalidEmail)?;
        let limits = self.limits();
        check_length(
            "Email",
            email,
            limits.email_length_min,
            limits.email_length_max,
        )
    }

    /// Parses a CID typed by the user and checks it against the limits.
    pub fn check_cid(&self, value: &str) -> Result<i32, LimitError> {
        let value = value.trim();
        if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
            return Err(LimitError::CidNotNumeric);
        }
        let cid: i32 = value.parse().map_err(|_| LimitError::CidNotNumeric)?;
        let limits = self.limits();
        if cid < limits.cid_min {
            Err(LimitError::CidTooSmall(limits.cid_min))
        } else if cid > limits.cid_max {
            Err(LimitError::CidTooLarge(limits.cid_max))
        } else {
            Ok(cid)
        }
    }

    /// Format, length and availability of a username.
    pub async fn validate_username<A>(&self, api: &A, name: &str) -> ServiceResult<()>
    where
        A: UserApi + ?Sized,
    {
        self.check_username(name)?;
        ensure_available(api, Availability::Username(name.to_string()), "username").await
    }

    pub fn validate_password(&self, password: &str) -> ServiceResult<()> {
        Ok(self.check_password(password)?)
    }

    pub async fn validate_email<A>(&self, api: &A, email: &str) -> ServiceResult<()>
    where
        A: UserApi + ?Sized,
    {
        self.check_email(email)?;
        ensure_available(api, Availability::Email(email.to_string()), "email").await
    }

    pub async fn validate_cid<A>(&self, api: &A, value: &str) -> ServiceResult<i32>
    where
        A: UserApi + ?Sized,
    {
        let cid = self.check_cid(value)?;
        ensure_available(api, Availability::Cid(cid), "CID").await?;
        Ok(cid)
    }

    /// Ratings are listed from `Ban` (-1), so the code is offset by one.
    pub fn rating_short_name(&self, rating: i32) -> Option<&str> {
        lookup(&self.config.ratings, rating).map(|code| code.short_name.as_str())
    }

    pub fn rating_long_name(&self, rating: i32) -> Option<&str> {
        lookup(&self.config.ratings, rating).map(|code| code.long_name.as_str())
    }

    pub fn facility_short_name(&self, facility: i32) -> Option<&str> {
        lookup(&self.config.facilities, facility).map(|code| code.short_name.as_str())
    }

    pub fn facility_long_name(&self, facility: i32) -> Option<&str> {
        lookup(&self.config.facilities, facility).map(|code| code.long_name.as_str())
    }
}

fn lookup(codes: &[NamedCode], code: i32) -> Option<&NamedCode> {
    code.checked_add(1)
        .and_then(|index| usize::try_from(index).ok())
        .and_then(|index| codes.get(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::errors::ApiError;
    use crate::api::mock::MockApi;
    use crate::services::ServiceError;

    fn named(id: i32, short: &str) -> NamedCode {
        NamedCode {
            id,
            short_name: short.to_string(),
            long_name: format!("{short} long"),
        }
    }

    /// Verifies built-in limits apply before the server config arrives.
    #[test]
    fn default_limits() {
        let store = ServerConfigStore::new();
        assert_eq!(store.limits().username_length_min, 4);
        assert_eq!(store.limits().cid_max, 9999);

        assert!(store.check_username("pilot_1").is_ok());
        assert_eq!(store.check_username("1pilot"), Err(LimitError::UsernamePattern));
        assert_eq!(store.check_username("a"), Err(LimitError::UsernamePattern));
        assert_eq!(store.check_username("pilot-1"), Err(LimitError::UsernamePattern));
        assert!(store.check_username("_tower").is_ok());
        assert!(matches!(
            store.check_username("abc"),
            Err(LimitError::Length { min: 4, max: 16, .. })
        ));
        assert!(store.check_password("123456").is_ok());
        assert!(store.check_password("12345").is_err());
        assert!(store.check_email("a@b.co").is_ok());
        assert_eq!(store.check_email("nope"), Err(LimitError::InvalidEmail));
    }

    /// Verifies CID parsing and range checks.
    #[test]
    fn cid_rules() {
        let store = ServerConfigStore::new();
        assert_eq!(store.check_cid("2352"), Ok(2352));
        assert_eq!(store.check_cid("23a"), Err(LimitError::CidNotNumeric));
        assert_eq!(store.check_cid(""), Err(LimitError::CidNotNumeric));
        assert_eq!(store.check_cid("-3"), Err(LimitError::CidNotNumeric));
        assert_eq!(store.check_cid("+3"), Err(LimitError::CidNotNumeric));
        assert_eq!(store.check_cid("0"), Err(LimitError::CidTooSmall(1)));
        assert_eq!(store.check_cid("10000"), Err(LimitError::CidTooLarge(9999)));
    }

    /// Verifies name lookups are offset by one.
    #[test]
    fn names_are_offset_by_one() {
        let store = ServerConfigStore::with_config(ServerConfig {
            ratings: vec![named(-1, "BAN"), named(0, "NEW"), named(1, "OBS")],
            facilities: vec![named(0, "OBS"), named(1, "FSS")],
            ..ServerConfig::default()
        });

        assert_eq!(store.rating_short_name(-1), Some("BAN"));
        assert_eq!(store.rating_long_name(1), Some("OBS long"));
        assert_eq!(store.rating_short_name(5), None);
        assert_eq!(store.rating_short_name(-2), None);
        assert_eq!(store.facility_short_name(0), Some("FSS"));
    }

    /// Ensures a taken username is reported as a form error.
    #[tokio::test]
    async fn username_must_be_available() {
        let mut api = MockApi::new();
        api.expect_check_availability()
            .withf(|field| *field == Availability::Username("pilot_1".into()))
            .times(1)
            .returning(|_| Ok(false));
        let store = ServerConfigStore::new();

        let result = store.validate_username(&api, "pilot_1").await;

        assert!(matches!(result, Err(ServiceError::Form(message)) if message.contains("username")));
    }

    /// Confirms a failed load keeps the previous configuration.
    #[tokio::test]
    async fn failed_load_keeps_defaults() {
        let mut api = MockApi::new();
        api.expect_server_config()
            .times(1)
            .returning(|| Err(ApiError::Timeout));
        let mut store = ServerConfigStore::new();

        assert!(store.load(&api).await.is_err());
        assert_eq!(store.limits(), &Limits::default());
    }
}
