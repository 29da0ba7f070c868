//! Live traffic view and the online client manager.

use crate::api::OnlineApi;
use crate::domain::online::{FlightPathPoint, OnlineClients};
use crate::domain::permission::PermissionNode;
use crate::domain::types::Callsign;
use crate::domain::user::User;
use crate::services::{ServiceError, ServiceResult, ensure_permissions};

fn non_empty<'a>(field: &str, value: &'a str) -> ServiceResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        Err(ServiceError::Form(format!("{field} must not be empty")))
    } else {
        Ok(value)
    }
}

pub async fn online_clients<A>(api: &A) -> ServiceResult<OnlineClients>
where
    A: OnlineApi + ?Sized,
{
    Ok(api.online_clients().await?)
}

pub async fn flight_path<A>(api: &A, callsign: &str) -> ServiceResult<Vec<FlightPathPoint>>
where
    A: OnlineApi + ?Sized,
{
    let callsign = Callsign::new(callsign)?;
    Ok(api.flight_path(&callsign).await?)
}

/// Whether `user` may open the client manager at all.
pub fn can_manage_clients(user: Option<&User>) -> bool {
    user.is_some_and(|user| {
        user.permission
            .has_permission(PermissionNode::ClientManagerEntry)
    })
}

pub async fn send_message<A>(
    api: &A,
    user: Option<&User>,
    callsign: &str,
    message: &str,
) -> ServiceResult<()>
where
    A: OnlineApi + ?Sized,
{
    ensure_permissions(
        user,
        &[
            PermissionNode::ClientManagerEntry,
            PermissionNode::ClientSendMessage,
        ],
    )?;
    let callsign = Callsign::new(callsign)?;
    api.send_message(&callsign, non_empty("Message", message)?)
        .await?;
    log::info!("Sent message to {callsign}");
    Ok(())
}

/// Sends `message` to every client matching `target` (e.g. `*` or `*A`).
pub async fn broadcast<A>(
    api: &A,
    user: Option<&User>,
    target: &str,
    message: &str,
) -> ServiceResult<()>
where
    A: OnlineApi + ?Sized,
{
    ensure_permissions(
        user,
        &[
            PermissionNode::ClientManagerEntry,
            PermissionNode::ClientSendBroadcastMessage,
        ],
    )?;
    let target = non_empty("Target", target)?;
    api.broadcast(target, non_empty("Message", message)?)
        .await?;
    log::info!("Broadcast sent to `{target}`");
    Ok(())
}

pub async fn kick<A>(api: &A, user: Option<&User>, callsign: &str, reason: &str) -> ServiceResult<()>
where
    A: OnlineApi + ?Sized,
{
    ensure_permissions(
        user,
        &[PermissionNode::ClientManagerEntry, PermissionNode::ClientKill],
    )?;
    let callsign = Callsign::new(callsign)?;
    let reason = non_empty("Reason", reason)?;
    api.kick(&callsign, reason).await?;
    log::warn!("Kicked {callsign} from the server: {reason}");
    Ok(())
}
