//! Command handlers, grouped by the page they belong to.

mod account;
mod activity;
mod admin;
mod community;
mod upload;

use crate::cli::{CliCommand, Context};
use crate::domain::user::User;
use crate::services::ServiceResult;

pub(super) async fn dispatch(
    command: CliCommand,
    context: &Context,
    user: Option<&User>,
) -> ServiceResult<()> {
    match command {
        CliCommand::Login { username, password } => {
            account::run_login(context, username, password).await
        }
        CliCommand::Logout => account::run_logout(context).await,
        CliCommand::Register {
            username,
            email,
            cid,
            code,
            password,
        } => account::run_register(context, username, email, cid, code, password).await,
        CliCommand::SendCode { email, cid } => account::run_send_code(context, email, cid).await,
        CliCommand::ResetPassword {
            email,
            code,
            password,
        } => account::run_reset_password(context, email, code, password).await,
        CliCommand::Whoami => account::run_whoami(context, user).await,
        CliCommand::Permissions => account::run_permissions(user),
        CliCommand::History => account::run_history(context, user).await,
        CliCommand::ChangePassword { old, new } => {
            account::run_change_password(context, user, old, new).await
        }
        CliCommand::Calendar { month } => activity::run_calendar(context, month).await,
        CliCommand::Activity { id } => activity::run_show(context, user, id).await,
        CliCommand::Sign {
            id,
            callsign,
            aircraft,
        } => activity::run_sign(context, user, id, callsign, aircraft).await,
        CliCommand::Unsign { id } => activity::run_unsign(context, user, id).await,
        CliCommand::Airports { query } => activity::run_airports(context, &query),
        CliCommand::Online => community::run_online(context).await,
        CliCommand::Path { callsign } => community::run_path(context, &callsign).await,
        CliCommand::Announcements { page } => community::run_announcements(context, page).await,
        CliCommand::Server => community::run_server(context).await,
        CliCommand::Ratings { page } => community::run_ratings(context, page).await,
        CliCommand::Plan { delete } => community::run_plan(context, user, delete).await,
        CliCommand::Tickets { all, page } => community::run_tickets(context, user, all, page).await,
        CliCommand::Ticket {
            kind,
            title,
            content,
        } => community::run_open_ticket(context, user, kind, title, content).await,
        CliCommand::Reply { id, reply } => admin::run_reply(context, user, id, &reply).await,
        CliCommand::Users { page } => admin::run_users(context, user, page).await,
        CliCommand::Audit { page } => admin::run_audit(context, user, page).await,
        CliCommand::Message { callsign, message } => {
            admin::run_message(context, user, &callsign, &message).await
        }
        CliCommand::Broadcast { target, message } => {
            admin::run_broadcast(context, user, &target, &message).await
        }
        CliCommand::Kick { callsign, reason } => {
            admin::run_kick(context, user, &callsign, &reason).await
        }
        CliCommand::Upload { path } => upload::run_upload(context, &path).await,
    }
}

/// Minutes and hours for a duration given in seconds, e.g. `12h 05m`.
pub(super) fn format_duration(seconds: i64) -> String {
    let minutes = seconds.max(0) / 60;
    format!("{}h {:02}m", minutes / 60, minutes % 60)
}
