use crate::api::FlightPlanApi;
use crate::domain::flight_plan::FlightPlan;
use crate::domain::permission::PermissionNode;
use crate::domain::user::User;
use crate::dto::api::{PageData, PageQuery};
use crate::forms::flight_plan::FlightPlanForm;
use crate::services::{ServiceError, ServiceResult, ensure_login, ensure_permission};

/// The plan filed by the signed-in user, if any.
pub async fn own_plan<A>(api: &A, user: Option<&User>) -> ServiceResult<Option<FlightPlan>>
where
    A: FlightPlanApi + ?Sized,
{
    ensure_login(user)?;
    Ok(api.own_plan().await?)
}

/// Files a plan under the user's CID; a locked plan cannot be replaced.
pub async fn submit_plan<A>(
    api: &A,
    user: Option<&User>,
    form: FlightPlanForm,
) -> ServiceResult<FlightPlan>
where
    A: FlightPlanApi + ?Sized,
{
    let user = ensure_login(user)?;
    if api.own_plan().await?.is_some_and(|plan| plan.locked) {
        return Err(ServiceError::Form(
            "Your flight plan is locked and cannot be changed".to_string(),
        ));
    }
    let plan = form.into_plan(user.cid)?;
    api.submit_plan(&plan).await?;
    log::info!("Filed flight plan {}", plan.summary());
    Ok(plan)
}

pub async fn delete_own_plan<A>(api: &A, user: Option<&User>) -> ServiceResult<()>
where
    A: FlightPlanApi + ?Sized,
{
    ensure_login(user)?;
    Ok(api.delete_own_plan().await?)
}

pub async fn list_plans<A>(
    api: &A,
    user: Option<&User>,
    page: PageQuery,
) -> ServiceResult<PageData<FlightPlan>>
where
    A: FlightPlanApi + ?Sized,
{
    ensure_permission(user, PermissionNode::FlightPlanShowList)?;
    Ok(api.list_plans(page).await?)
}

pub async fn set_plan_lock<A>(
    api: &A,
    user: Option<&User>,
    cid: i32,
    locked: bool,
) -> ServiceResult<()>
where
    A: FlightPlanApi + ?Sized,
{
    ensure_permission(user, PermissionNode::FlightPlanChangeLock)?;
    api.set_plan_lock(cid, locked).await?;
    log::info!(
        "Flight plan of CID {cid} {}",
        if locked { "locked" } else { "unlocked" }
    );
    Ok(())
}

pub async fn delete_plan<A>(api: &A, user: Option<&User>, cid: i32) -> ServiceResult<()>
where
    A: FlightPlanApi + ?Sized,
{
    ensure_permission(user, PermissionNode::FlightPlanDelete)?;
    api.delete_plan(cid).await?;
    log::info!("Deleted flight plan of CID {cid}");
    Ok(())
}
