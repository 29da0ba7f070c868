use crate::api::ControllerApi;
use crate::domain::controller::{
    ApplicationDecision, Controller, ControllerApplication, ControllerRating, ControllerRecord,
    RatingUpdate,
};
use crate::domain::permission::PermissionNode;
use crate::domain::types::{ApplicationId, Rating, RecordId, Uid};
use crate::domain::user::User;
use crate::dto::api::{PageData, PageQuery};
use crate::forms::FormError;
use crate::forms::controller::{ApplicationForm, ApplicationPayload, RecordForm, RecordPayload};
use crate::services::{ServiceResult, ensure_login, ensure_permission, ensure_permissions};

/// Nodes needed to apply `update`, one per kind of field touched.
pub fn rating_update_nodes(update: &RatingUpdate) -> Vec<PermissionNode> {
    let mut nodes = Vec::new();
    if update.rating.is_some() {
        nodes.push(PermissionNode::ControllerEditRating);
    }
    if update.tier2.is_some() {
        nodes.push(PermissionNode::ControllerTier2Rating);
    }
    if update.under_monitor.is_some() {
        nodes.push(PermissionNode::ControllerChangeUnderMonitor);
    }
    if update.under_solo.is_some() || update.solo_until.is_some() {
        nodes.push(PermissionNode::ControllerChangeSolo);
    }
    if update.guest.is_some() {
        nodes.push(PermissionNode::ControllerChangeGuest);
    }
    nodes
}

pub async fn list_controllers<A>(
    api: &A,
    user: Option<&User>,
    page: PageQuery,
) -> ServiceResult<PageData<Controller>>
where
    A: ControllerApi + ?Sized,
{
    ensure_permission(user, PermissionNode::ControllerShowList)?;
    Ok(api.list_controllers(page).await?)
}

/// Public roster of controller ratings.
pub async fn list_ratings<A>(api: &A, page: PageQuery) -> ServiceResult<PageData<ControllerRating>>
where
    A: ControllerApi + ?Sized,
{
    Ok(api.list_ratings(page).await?)
}

pub async fn own_records<A>(
    api: &A,
    user: Option<&User>,
    page: PageQuery,
) -> ServiceResult<PageData<ControllerRecord>>
where
    A: ControllerApi + ?Sized,
{
    ensure_login(user)?;
    Ok(api.own_records(page).await?)
}

pub async fn records<A>(
    api: &A,
    user: Option<&User>,
    uid: Uid,
    page: PageQuery,
) -> ServiceResult<PageData<ControllerRecord>>
where
    A: ControllerApi + ?Sized,
{
    ensure_permission(user, PermissionNode::ControllerShowRecord)?;
    Ok(api.records(uid, page).await?)
}

pub async fn create_record<A>(
    api: &A,
    user: Option<&User>,
    uid: Uid,
    form: RecordForm,
) -> ServiceResult<()>
where
    A: ControllerApi + ?Sized,
{
    ensure_permission(user, PermissionNode::ControllerCreateRecord)?;
    let record = RecordPayload::try_from(form)?;
    api.create_record(uid, &record).await?;
    log::info!("Added {} record for user {uid}", record.record_type);
    Ok(())
}

pub async fn delete_record<A>(
    api: &A,
    user: Option<&User>,
    uid: Uid,
    record: RecordId,
) -> ServiceResult<()>
where
    A: ControllerApi + ?Sized,
{
    ensure_permission(user, PermissionNode::ControllerDeleteRecord)?;
    Ok(api.delete_record(uid, record).await?)
}

/// Applies a rating change; every touched field needs its own node.
pub async fn update_rating<A>(
    api: &A,
    user: Option<&User>,
    uid: Uid,
    update: RatingUpdate,
) -> ServiceResult<()>
where
    A: ControllerApi + ?Sized,
{
    ensure_login(user)?;
    if update.is_empty() {
        return Err(FormError::EmptyUpdate.into());
    }
    if let Some(code) = update.rating {
        Rating::try_from(code)?;
    }
    ensure_permissions(user, &rating_update_nodes(&update))?;
    api.update_rating(uid, &update).await?;
    log::info!("Updated controller rating of user {uid}");
    Ok(())
}

pub async fn own_application<A>(
    api: &A,
    user: Option<&User>,
) -> ServiceResult<Option<ControllerApplication>>
where
    A: ControllerApi + ?Sized,
{
    ensure_login(user)?;
    Ok(api.own_application().await?)
}

pub async fn submit_application<A>(
    api: &A,
    user: Option<&User>,
    form: ApplicationForm,
) -> ServiceResult<()>
where
    A: ControllerApi + ?Sized,
{
    let user = ensure_login(user)?;
    let application = ApplicationPayload::try_from(form)?;
    api.submit_application(&application).await?;
    log::info!("Controller application submitted by {}", user.username);
    Ok(())
}

pub async fn cancel_application<A>(api: &A, user: Option<&User>) -> ServiceResult<()>
where
    A: ControllerApi + ?Sized,
{
    ensure_login(user)?;
    Ok(api.cancel_application().await?)
}

pub async fn list_applications<A>(
    api: &A,
    user: Option<&User>,
    page: PageQuery,
) -> ServiceResult<PageData<ControllerApplication>>
where
    A: ControllerApi + ?Sized,
{
    ensure_permission(user, PermissionNode::ControllerShowList)?;
    Ok(api.list_applications(page).await?)
}

pub async fn decide_application<A>(
    api: &A,
    user: Option<&User>,
    id: ApplicationId,
    decision: ApplicationDecision,
) -> ServiceResult<()>
where
    A: ControllerApi + ?Sized,
{
    ensure_permission(user, PermissionNode::ControllerEditRating)?;
    api.decide_application(id, &decision).await?;
    log::info!("Application {id} moved to {}", decision.status);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockApi;
    use crate::domain::permission::Permission;
    use crate::domain::user::fixtures;
    use crate::services::ServiceError;

    /// Verifies each touched field maps onto its node.
    #[test]
    fn nodes_follow_fields() {
        let update = RatingUpdate {
            rating: Some(5),
            solo_until: Some(chrono::Utc::now()),
            ..RatingUpdate::default()
        };
        assert_eq!(
            rating_update_nodes(&update),
            vec![
                PermissionNode::ControllerEditRating,
                PermissionNode::ControllerChangeSolo
            ]
        );
        assert!(rating_update_nodes(&RatingUpdate::default()).is_empty());
    }

    /// Ensures a guest flag change needs ControllerChangeGuest even with rating rights.
    #[tokio::test]
    async fn guest_change_needs_its_own_node() {
        let mut api = MockApi::new();
        api.expect_update_rating().times(0);
        let user = fixtures::user(1, Permission::new(PermissionNode::ControllerEditRating.bit()));
        let update = RatingUpdate {
            rating: Some(5),
            guest: Some(true),
            ..RatingUpdate::default()
        };

        let result = update_rating(&api, Some(&user), Uid::new(2).unwrap(), update).await;

        assert!(matches!(
            result,
            Err(ServiceError::Forbidden(PermissionNode::ControllerChangeGuest))
        ));
    }

    /// Ensures an empty update is rejected before any request.
    #[tokio::test]
    async fn empty_update_is_rejected() {
        let mut api = MockApi::new();
        api.expect_update_rating().times(0);
        let user = fixtures::user(1, Permission::all());

        let result = update_rating(
            &api,
            Some(&user),
            Uid::new(2).unwrap(),
            RatingUpdate::default(),
        )
        .await;

        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    /// Confirms a permitted rating change reaches the server.
    #[tokio::test]
    async fn rating_update_is_sent() {
        let mut api = MockApi::new();
        api.expect_update_rating()
            .withf(|uid, update| uid.get() == 2 && update.rating == Some(6))
            .times(1)
            .returning(|_, _| Ok(()));
        let user = fixtures::user(1, Permission::new(PermissionNode::ControllerEditRating.bit()));
        let update = RatingUpdate {
            rating: Some(6),
            ..RatingUpdate::default()
        };

        update_rating(&api, Some(&user), Uid::new(2).unwrap(), update)
            .await
            .unwrap();
    }

    /// Ensures records are created with the parsed record type.
    #[tokio::test]
    async fn create_record_parses_type() {
        let mut api = MockApi::new();
        api.expect_create_record()
            .withf(|uid, record| uid.get() == 4 && record.content == "Good TWR session")
            .times(1)
            .returning(|_, _| Ok(()));
        let user = fixtures::user(
            1,
            Permission::new(PermissionNode::ControllerCreateRecord.bit()),
        );
        let form = RecordForm {
            record_type: 0,
            content: " Good TWR session ".into(),
        };

        create_record(&api, Some(&user), Uid::new(4).unwrap(), form)
            .await
            .unwrap();
    }

    /// Ensures anonymous users cannot apply.
    #[tokio::test]
    async fn application_requires_login() {
        let mut api = MockApi::new();
        api.expect_submit_application().times(0);
        let form = ApplicationForm {
            why_want_to_be_controller: "I enjoy ATC".into(),
            controller_record: String::new(),
            is_guest: false,
            platform: String::new(),
            evidence: String::new(),
        };

        let result = submit_application(&api, None, form).await;

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }
}
