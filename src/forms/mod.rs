//! Form definitions validating user input before it reaches the API.

use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::types::TypeConstraintError;

pub mod activity;
pub mod announcement;
pub mod controller;
pub mod flight_plan;
pub mod ticket;
pub mod user;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid email address")]
    InvalidEmail,

    #[error("invalid callsign")]
    InvalidCallsign,

    #[error("invalid airport code `{0}`")]
    InvalidAirport(String),

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("nothing to update")]
    EmptyUpdate,

    #[error("{0}")]
    Constraint(#[from] TypeConstraintError),
}

/// ICAO airport designators are four ASCII letters.
pub(crate) fn normalize_icao(code: &str) -> Result<String, FormError> {
    let code = code.trim().to_uppercase();
    if code.len() == 4 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code)
    } else {
        Err(FormError::InvalidAirport(code))
    }
}
