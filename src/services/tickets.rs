use crate::api::TicketApi;
use crate::domain::permission::PermissionNode;
use crate::domain::ticket::{NewTicket, Ticket};
use crate::domain::types::TicketId;
use crate::domain::user::User;
use crate::dto::api::{PageData, PageQuery};
use crate::forms::ticket::TicketForm;
use crate::services::{ServiceError, ServiceResult, ensure_login, ensure_permission};

pub async fn own_tickets<A>(
    api: &A,
    user: Option<&User>,
    page: PageQuery,
) -> ServiceResult<PageData<Ticket>>
where
    A: TicketApi + ?Sized,
{
    ensure_login(user)?;
    Ok(api.own_tickets(page).await?)
}

pub async fn list_tickets<A>(
    api: &A,
    user: Option<&User>,
    page: PageQuery,
) -> ServiceResult<PageData<Ticket>>
where
    A: TicketApi + ?Sized,
{
    ensure_permission(user, PermissionNode::TicketShowList)?;
    Ok(api.list_tickets(page).await?)
}

pub async fn create_ticket<A>(api: &A, user: Option<&User>, form: TicketForm) -> ServiceResult<()>
where
    A: TicketApi + ?Sized,
{
    let user = ensure_login(user)?;
    let ticket = NewTicket::try_from(form)?;
    api.create_ticket(&ticket).await?;
    log::info!("Ticket `{}` opened by {}", ticket.title, user.username);
    Ok(())
}

/// Replying closes the ticket on the server side.
pub async fn reply_ticket<A>(
    api: &A,
    user: Option<&User>,
    id: TicketId,
    reply: &str,
) -> ServiceResult<()>
where
    A: TicketApi + ?Sized,
{
    ensure_permission(user, PermissionNode::TicketReply)?;
    let reply = reply.trim();
    if reply.is_empty() {
        return Err(ServiceError::Form("Reply must not be empty".to_string()));
    }
    api.reply_ticket(id, reply).await?;
    log::info!("Replied to ticket {id}");
    Ok(())
}

pub async fn delete_ticket<A>(api: &A, user: Option<&User>, id: TicketId) -> ServiceResult<()>
where
    A: TicketApi + ?Sized,
{
    ensure_permission(user, PermissionNode::TicketRemove)?;
    api.delete_ticket(id).await?;
    log::info!("Deleted ticket {id}");
    Ok(())
}
