//! Calendar and activity sign-up commands.

use chrono::{Local, NaiveDate};

use crate::cli::Context;
use crate::domain::types::ActivityId;
use crate::domain::user::User;
use crate::forms::activity::PilotSignForm;
use crate::services::{ServiceResult, activity};

pub async fn run_calendar(context: &Context, month: Option<NaiveDate>) -> ServiceResult<()> {
    let day = month.unwrap_or_else(|| Local::now().date_naive());
    let calendar = activity::load_calendar(&context.api, day, &Local).await?;
    if calendar.is_empty() {
        println!("No activities in {}.", day.format("%Y-%m"));
        return Ok(());
    }
    for (date, entries) in calendar {
        for entry in entries {
            println!(
                "{date} {} #{:<5} {} ({}-{})",
                entry.start_time,
                entry.activity.id,
                entry.activity.title,
                entry.activity.departure_airport,
                entry.activity.arrival_airport
            );
        }
    }
    Ok(())
}

pub async fn run_show(context: &Context, user: Option<&User>, id: i32) -> ServiceResult<()> {
    let activity = activity::get_activity(&context.api, ActivityId::new(id)?).await?;
    println!("#{} {}", activity.id, activity.title);
    println!(
        "{} {}-{} via {}",
        activity.active_time.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
        activity.departure_airport,
        activity.arrival_airport,
        activity.route
    );
    println!("Pilots signed up: {}", activity.pilots.len());
    for facility in &activity.facilities {
        let taken_by = facility
            .controller
            .as_ref()
            .and_then(|controller| controller.user.as_ref())
            .map_or("open", |user| user.username.as_str());
        println!("  {:<12} {:<8} {taken_by}", facility.callsign, facility.frequency);
    }
    if let Some(pilot) = user.and_then(|user| activity.pilot_by_cid(user.cid)) {
        println!("You are signed up as {} ({}).", pilot.callsign, pilot.aircraft_type);
    }
    Ok(())
}

pub async fn run_sign(
    context: &Context,
    user: Option<&User>,
    id: i32,
    callsign: String,
    aircraft: String,
) -> ServiceResult<()> {
    let form = PilotSignForm {
        callsign,
        aircraft_type: aircraft,
    };
    activity::sign_pilot(&context.api, user, ActivityId::new(id)?, form).await?;
    println!("Signed up for activity #{id}.");
    Ok(())
}

pub async fn run_unsign(context: &Context, user: Option<&User>, id: i32) -> ServiceResult<()> {
    activity::cancel_pilot(&context.api, user, ActivityId::new(id)?).await?;
    println!("Sign-up for activity #{id} cancelled.");
    Ok(())
}

pub fn run_airports(context: &Context, query: &str) -> ServiceResult<()> {
    for code in activity::search_airports(&context.config.airports, query) {
        println!("{code}");
    }
    Ok(())
}
