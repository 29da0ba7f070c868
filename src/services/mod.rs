//! Workflows layered over the API traits.
//!
//! Services check what the signed-in user may do before issuing a call, the
//! same gating the server performs again on its side.

use thiserror::Error;

use crate::api::errors::ApiError;
use crate::domain::permission::PermissionNode;
use crate::domain::user::User;
use crate::session::SessionError;

pub mod activity;
pub mod announcements;
pub mod audit;
pub mod controllers;
pub mod flight_plans;
pub mod online;
pub mod server_config;
pub mod tickets;
pub mod upload;
pub mod users;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("You are not logged in, please log in and try again")]
    Unauthorized,

    #[error("Missing permission `{0}`")]
    Forbidden(PermissionNode),

    #[error("{0}")]
    Form(String),

    #[error("{0}")]
    TypeConstraint(String),

    #[error("Upload rejected: {0}")]
    Upload(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Session(SessionError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Returns the signed-in user or [`ServiceError::Unauthorized`].
pub fn ensure_login(user: Option<&User>) -> ServiceResult<&User> {
    user.ok_or(ServiceError::Unauthorized)
}

/// Returns the signed-in user when they hold `node`.
pub fn ensure_permission(user: Option<&User>, node: PermissionNode) -> ServiceResult<&User> {
    let user = ensure_login(user)?;
    if user.permission.has_permission(node) {
        Ok(user)
    } else {
        Err(ServiceError::Forbidden(node))
    }
}

/// Returns the signed-in user when they hold every one of `nodes`.
pub fn ensure_permissions<'a>(
    user: Option<&'a User>,
    nodes: &[PermissionNode],
) -> ServiceResult<&'a User> {
    let user = ensure_login(user)?;
    match nodes
        .iter()
        .find(|node| !user.permission.has_permission(**node))
    {
        Some(missing) => Err(ServiceError::Forbidden(*missing)),
        None => Ok(user),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::permission::Permission;
    use crate::domain::user::fixtures;

    /// Ensures anonymous callers are told to log in before anything else.
    #[test]
    fn anonymous_is_unauthorized() {
        assert!(matches!(ensure_login(None), Err(ServiceError::Unauthorized)));
        assert!(matches!(
            ensure_permission(None, PermissionNode::AdminEntry),
            Err(ServiceError::Unauthorized)
        ));
    }

    /// Ensures the first missing node is reported.
    #[test]
    fn reports_missing_node() {
        let user = fixtures::user(1, Permission::new(PermissionNode::TicketShowList.bit()));

        assert!(ensure_permission(Some(&user), PermissionNode::TicketShowList).is_ok());
        assert!(matches!(
            ensure_permissions(
                Some(&user),
                &[PermissionNode::TicketShowList, PermissionNode::TicketReply]
            ),
            Err(ServiceError::Forbidden(PermissionNode::TicketReply))
        ));
        assert!(ensure_permissions(Some(&user), &[]).is_ok());
    }
}
