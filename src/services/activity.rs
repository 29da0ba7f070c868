use std::collections::BTreeMap;
use std::fmt::Display;

use chrono::{NaiveDate, TimeZone};

use crate::api::ActivityApi;
use crate::domain::activity::{Activity, NewActivity};
use crate::domain::permission::PermissionNode;
use crate::domain::types::{ActivityId, FacilityId, PilotId};
use crate::domain::user::User;
use crate::dto::api::{PageData, PageQuery};
use crate::forms::activity::{ActivityForm, PilotSignForm, PilotSignPayload};
use crate::services::{ServiceResult, ensure_login, ensure_permission};

/// An activity placed on the calendar day it starts.
#[derive(Clone, Debug, PartialEq)]
pub struct CalendarEntry {
    /// Local start time, `HH:MM:SS`.
    pub start_time: String,
    pub activity: Activity,
}

/// Groups activities by local start day (`YYYY-MM-DD`), ordered by start time.
pub fn build_calendar<Tz>(activities: Vec<Activity>, tz: &Tz) -> BTreeMap<String, Vec<CalendarEntry>>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut calendar: BTreeMap<String, Vec<CalendarEntry>> = BTreeMap::new();
    let mut sorted = activities;
    sorted.sort_by_key(|activity| activity.active_time);

    for activity in sorted {
        let local = activity.active_time.with_timezone(tz);
        calendar
            .entry(local.format("%Y-%m-%d").to_string())
            .or_default()
            .push(CalendarEntry {
                start_time: local.format("%H:%M:%S").to_string(),
                activity,
            });
    }

    calendar
}

/// Airports whose code starts with `query`; an empty query matches everything.
pub fn search_airports<'a>(known: &'a [String], query: &str) -> Vec<&'a str> {
    let prefix = query.trim().to_uppercase();
    known
        .iter()
        .map(String::as_str)
        .filter(|code| code.starts_with(&prefix))
        .collect()
}

/// Loads the month containing `day` and lays it out by local day.
pub async fn load_calendar<A, Tz>(
    api: &A,
    day: NaiveDate,
    tz: &Tz,
) -> ServiceResult<BTreeMap<String, Vec<CalendarEntry>>>
where
    A: ActivityApi + ?Sized,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let activities = api
        .list_activities(&day.format("%Y-%m-%d").to_string())
        .await?;
    Ok(build_calendar(activities, tz))
}

pub async fn get_activity<A>(api: &A, id: ActivityId) -> ServiceResult<Activity>
where
    A: ActivityApi + ?Sized,
{
    Ok(api.get_activity(id).await?)
}

/// Paged activity list shown in the administration view.
pub async fn list_activities<A>(
    api: &A,
    user: Option<&User>,
    page: PageQuery,
) -> ServiceResult<PageData<Activity>>
where
    A: ActivityApi + ?Sized,
{
    ensure_permission(user, PermissionNode::ActivityShowList)?;
    Ok(api.list_activity_page(page).await?)
}

pub async fn sign_pilot<A>(
    api: &A,
    user: Option<&User>,
    id: ActivityId,
    form: PilotSignForm,
) -> ServiceResult<()>
where
    A: ActivityApi + ?Sized,
{
    ensure_login(user)?;
    let payload = PilotSignPayload::try_from(form)?;
    api.sign_pilot(id, &payload).await?;
    log::info!("Signed up for activity {id} as {}", payload.callsign);
    Ok(())
}

pub async fn cancel_pilot<A>(api: &A, user: Option<&User>, id: ActivityId) -> ServiceResult<()>
where
    A: ActivityApi + ?Sized,
{
    ensure_login(user)?;
    Ok(api.cancel_pilot(id).await?)
}

pub async fn sign_controller<A>(
    api: &A,
    user: Option<&User>,
    id: ActivityId,
    facility: FacilityId,
) -> ServiceResult<()>
where
    A: ActivityApi + ?Sized,
{
    ensure_login(user)?;
    api.sign_controller(id, facility).await?;
    log::info!("Signed up for facility {facility} of activity {id}");
    Ok(())
}

pub async fn cancel_controller<A>(
    api: &A,
    user: Option<&User>,
    id: ActivityId,
    facility: FacilityId,
) -> ServiceResult<()>
where
    A: ActivityApi + ?Sized,
{
    ensure_login(user)?;
    Ok(api.cancel_controller(id, facility).await?)
}

pub async fn publish_activity<A>(
    api: &A,
    user: Option<&User>,
    form: ActivityForm,
) -> ServiceResult<()>
where
    A: ActivityApi + ?Sized,
{
    ensure_permission(user, PermissionNode::ActivityPublish)?;
    let activity = NewActivity::try_from(form)?;
    api.create_activity(&activity).await?;
    log::info!("Published activity `{}`", activity.title);
    Ok(())
}

pub async fn edit_activity<A>(
    api: &A,
    user: Option<&User>,
    id: ActivityId,
    form: ActivityForm,
) -> ServiceResult<()>
where
    A: ActivityApi + ?Sized,
{
    ensure_permission(user, PermissionNode::ActivityEdit)?;
    let activity = NewActivity::try_from(form)?;
    Ok(api.update_activity(id, &activity).await?)
}

pub async fn delete_activity<A>(api: &A, user: Option<&User>, id: ActivityId) -> ServiceResult<()>
where
    A: ActivityApi + ?Sized,
{
    ensure_permission(user, PermissionNode::ActivityDelete)?;
    api.delete_activity(id).await?;
    log::info!("Deleted activity {id}");
    Ok(())
}

pub async fn set_activity_status<A>(
    api: &A,
    user: Option<&User>,
    id: ActivityId,
    status: i32,
) -> ServiceResult<()>
where
    A: ActivityApi + ?Sized,
{
    ensure_permission(user, PermissionNode::ActivityEditState)?;
    Ok(api.update_activity_status(id, status).await?)
}

pub async fn set_pilot_status<A>(
    api: &A,
    user: Option<&User>,
    id: ActivityId,
    pilot: PilotId,
    status: i32,
) -> ServiceResult<()>
where
    A: ActivityApi + ?Sized,
{
    ensure_permission(user, PermissionNode::ActivityEditPilotState)?;
    Ok(api.update_pilot_status(id, pilot, status).await?)
}
