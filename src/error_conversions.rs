//! Error conversion glue between layers.
//!
//! The domain and form layers must not depend on service error types, so the
//! conversions live here.

use crate::domain::types::TypeConstraintError;
use crate::forms::FormError;
use crate::services::ServiceError;
use crate::services::server_config::LimitError;
use crate::session::SessionError;

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::TypeConstraint(val.to_string())
    }
}

impl From<FormError> for ServiceError {
    fn from(val: FormError) -> Self {
        match val {
            FormError::Constraint(err) => err.into(),
            other => ServiceError::Form(other.to_string()),
        }
    }
}

impl From<LimitError> for ServiceError {
    fn from(val: LimitError) -> Self {
        ServiceError::Form(val.to_string())
    }
}

impl From<SessionError> for ServiceError {
    fn from(val: SessionError) -> Self {
        match val {
            SessionError::NotLoggedIn => ServiceError::Unauthorized,
            SessionError::Api(err) => ServiceError::Api(err),
            SessionError::Form(err) => err.into(),
            other => ServiceError::Session(other),
        }
    }
}
