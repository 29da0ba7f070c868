//! Read-mostly commands shown to every member.

use crate::api::ServerApi;
use crate::cli::Context;
use crate::cli::commands::format_duration;
use crate::domain::announcement::plain_text;
use crate::domain::user::User;
use crate::forms::ticket::TicketForm;
use crate::pagination::Paginated;
use crate::services::server_config::ServerConfigStore;
use crate::services::{ServiceResult, announcements, controllers, flight_plans, online, tickets};

pub async fn run_online(context: &Context) -> ServiceResult<()> {
    let clients = online::online_clients(&context.api).await?;
    println!(
        "{} pilots, {} controllers online (generated {})",
        clients.general.online_pilot,
        clients.general.online_controller,
        clients.general.generate_time
    );
    for controller in &clients.controllers {
        println!(
            "ATC   {:<12} {} {}",
            controller.callsign,
            controller.frequency_mhz(),
            controller.real_name
        );
    }
    for pilot in &clients.pilots {
        let route = pilot
            .flight_plan
            .as_ref()
            .map(|plan| format!("{}-{}", plan.departure, plan.arrival))
            .unwrap_or_default();
        println!(
            "PILOT {:<12} FL{:03} {:>3}kt {route}",
            pilot.callsign,
            pilot.altitude / 100,
            pilot.ground_speed
        );
    }
    Ok(())
}

pub async fn run_path(context: &Context, callsign: &str) -> ServiceResult<()> {
    let points = online::flight_path(&context.api, callsign).await?;
    for point in points {
        println!(
            "{:>9.4} {:>10.4} {:>6}ft",
            point.latitude, point.longitude, point.altitude
        );
    }
    Ok(())
}

pub async fn run_announcements(context: &Context, page: usize) -> ServiceResult<()> {
    let data = announcements::list_announcements(&context.api, context.page(page)).await?;
    let paginated = Paginated::from(data);
    for announcement in &paginated.items {
        let flag = if announcement.important { "!" } else { " " };
        println!(
            "{flag} #{} [{}] {} ({})",
            announcement.id,
            announcement.announcement_type,
            announcement.title,
            announcement.created_at.format("%Y-%m-%d")
        );
        for line in plain_text(&announcement.content).lines() {
            println!("    {line}");
        }
    }
    println!("{}", paginated.page_strip());
    Ok(())
}

pub async fn run_server(context: &Context) -> ServiceResult<()> {
    let info = context.api.server_info().await?;
    println!(
        "{} users, {} controllers, {} activities",
        info.total_user, info.total_controller, info.total_activity
    );
    let ratings = context.api.server_ratings().await?;
    for (role, entries) in [("PILOT", &ratings.pilots), ("ATC", &ratings.controllers)] {
        for (rank, entry) in entries.iter().enumerate() {
            println!(
                "{role:<6} {:>2}. CID {:<6} {}",
                rank + 1,
                entry.cid,
                format_duration(entry.time)
            );
        }
    }
    Ok(())
}

pub async fn run_ratings(context: &Context, page: usize) -> ServiceResult<()> {
    let mut names = ServerConfigStore::new();
    if let Err(err) = names.load(&context.api).await {
        log::warn!("Rating names unavailable: {err}");
    }
    let data = controllers::list_ratings(&context.api, context.page(page)).await?;
    let paginated = Paginated::from(data);
    for rating in &paginated.items {
        let name = names
            .rating_short_name(rating.rating)
            .map_or_else(|| rating.rating.to_string(), str::to_string);
        let mut flags = Vec::new();
        if rating.is_guest {
            flags.push("guest");
        }
        if rating.under_monitor {
            flags.push("under monitor");
        }
        if rating.under_solo {
            flags.push("solo");
        }
        println!("CID {:<6} {:<6} {}", rating.cid, name, flags.join(", "));
    }
    println!("{}", paginated.page_strip());
    Ok(())
}

pub async fn run_plan(context: &Context, user: Option<&User>, delete: bool) -> ServiceResult<()> {
    if delete {
        flight_plans::delete_own_plan(&context.api, user).await?;
        println!("Flight plan withdrawn.");
        return Ok(());
    }
    match flight_plans::own_plan(&context.api, user).await? {
        Some(plan) => {
            println!("{}", plan.summary());
            if plan.locked {
                println!("(locked)");
            }
        }
        None => println!("No flight plan filed."),
    }
    Ok(())
}

pub async fn run_tickets(
    context: &Context,
    user: Option<&User>,
    all: bool,
    page: usize,
) -> ServiceResult<()> {
    let query = context.page(page);
    let data = if all {
        tickets::list_tickets(&context.api, user, query).await?
    } else {
        tickets::own_tickets(&context.api, user, query).await?
    };
    let paginated = Paginated::from(data);
    for ticket in &paginated.items {
        let state = if ticket.is_closed() { "closed" } else { "open" };
        println!(
            "#{:<5} {:<6} [{}] {}",
            ticket.id, state, ticket.ticket_type, ticket.title
        );
        if !ticket.reply.is_empty() {
            println!("       > {}", ticket.reply);
        }
    }
    println!("{}", paginated.page_strip());
    Ok(())
}

pub async fn run_open_ticket(
    context: &Context,
    user: Option<&User>,
    kind: i32,
    title: String,
    content: String,
) -> ServiceResult<()> {
    let form = TicketForm {
        ticket_type: kind,
        title,
        content,
    };
    tickets::create_ticket(&context.api, user, form).await?;
    println!("Ticket opened.");
    Ok(())
}
