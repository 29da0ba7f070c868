//! Administration commands; each one is gated on its own permission node.

use crate::cli::Context;
use crate::domain::types::TicketId;
use crate::domain::user::User;
use crate::pagination::Paginated;
use crate::services::{ServiceResult, audit, online, tickets, users};

pub async fn run_reply(
    context: &Context,
    user: Option<&User>,
    id: i32,
    reply: &str,
) -> ServiceResult<()> {
    tickets::reply_ticket(&context.api, user, TicketId::new(id)?, reply).await?;
    println!("Ticket #{id} answered.");
    Ok(())
}

pub async fn run_users(context: &Context, user: Option<&User>, page: usize) -> ServiceResult<()> {
    let data = users::list_users(&context.api, user, context.page(page)).await?;
    let paginated = Paginated::from(data);
    println!("{:<6} {:<6} {:<16} EMAIL", "UID", "CID", "USERNAME");
    for member in &paginated.items {
        println!(
            "{:<6} {:<6} {:<16} {}",
            member.id, member.cid, member.username, member.email
        );
    }
    println!("{} users  {}", paginated.total, paginated.page_strip());
    Ok(())
}

pub async fn run_audit(context: &Context, user: Option<&User>, page: usize) -> ServiceResult<()> {
    let data = audit::list_audit_logs(&context.api, user, context.page(page)).await?;
    let paginated = Paginated::from(data);
    for entry in &paginated.items {
        println!(
            "{} CID {:<6} {:<24} {} {}",
            entry.time.format("%Y-%m-%d %H:%M:%S"),
            entry.subject,
            entry.event_type,
            entry.object,
            entry.ip
        );
        if let Some(change) = &entry.change_details {
            println!("    {} -> {}", change.old_value, change.new_value);
        }
    }
    println!("{}", paginated.page_strip());
    Ok(())
}

pub async fn run_message(
    context: &Context,
    user: Option<&User>,
    callsign: &str,
    message: &str,
) -> ServiceResult<()> {
    online::send_message(&context.api, user, callsign, message).await?;
    println!("Message sent.");
    Ok(())
}

pub async fn run_broadcast(
    context: &Context,
    user: Option<&User>,
    target: &str,
    message: &str,
) -> ServiceResult<()> {
    online::broadcast(&context.api, user, target, message).await?;
    println!("Broadcast sent.");
    Ok(())
}

pub async fn run_kick(
    context: &Context,
    user: Option<&User>,
    callsign: &str,
    reason: &str,
) -> ServiceResult<()> {
    online::kick(&context.api, user, callsign, reason).await?;
    println!("{callsign} disconnected.");
    Ok(())
}
