use crate::api::UserApi;
use crate::domain::permission::{Permission, PermissionNode};
use crate::domain::types::Uid;
use crate::domain::user::{User, UserHistory};
use crate::dto::api::{PageData, PageQuery};
use crate::forms::user::{ChangePasswordForm, ProfileForm, ProfileUpdate};
use crate::services::{ServiceError, ServiceResult, ensure_login, ensure_permission};

pub async fn current_profile<A>(api: &A, user: Option<&User>) -> ServiceResult<User>
where
    A: UserApi + ?Sized,
{
    ensure_login(user)?;
    Ok(api.current_profile().await?)
}

pub async fn update_own_profile<A>(
    api: &A,
    user: Option<&User>,
    form: ProfileForm,
) -> ServiceResult<()>
where
    A: UserApi + ?Sized,
{
    ensure_login(user)?;
    let update = ProfileUpdate::try_from(form)?;
    Ok(api.update_current_profile(&update).await?)
}

pub async fn change_password<A>(
    api: &A,
    user: Option<&User>,
    form: ChangePasswordForm,
) -> ServiceResult<()>
where
    A: UserApi + ?Sized,
{
    let user = ensure_login(user)?;
    let update = ProfileUpdate::try_from(form)?;
    api.update_current_profile(&update).await?;
    log::info!("Password changed for {}", user.username);
    Ok(())
}

pub async fn history<A>(api: &A, user: Option<&User>) -> ServiceResult<UserHistory>
where
    A: UserApi + ?Sized,
{
    ensure_login(user)?;
    Ok(api.history().await?)
}

pub async fn list_users<A>(
    api: &A,
    user: Option<&User>,
    page: PageQuery,
) -> ServiceResult<PageData<User>>
where
    A: UserApi + ?Sized,
{
    ensure_permission(user, PermissionNode::UserShowList)?;
    Ok(api.list_users(page).await?)
}

pub async fn get_user<A>(api: &A, user: Option<&User>, uid: Uid) -> ServiceResult<User>
where
    A: UserApi + ?Sized,
{
    ensure_permission(user, PermissionNode::UserGetProfile)?;
    Ok(api.get_profile(uid).await?)
}

/// Edits another user's base information.
pub async fn update_user<A>(
    api: &A,
    user: Option<&User>,
    uid: Uid,
    form: ProfileForm,
) -> ServiceResult<()>
where
    A: UserApi + ?Sized,
{
    ensure_permission(user, PermissionNode::UserEditBaseInfo)?;
    let update = ProfileUpdate::try_from(form)?;
    api.update_profile(uid, &update).await?;
    log::info!("Updated profile of user {uid}");
    Ok(())
}

/// Sets another user's password without knowing the old one.
pub async fn set_user_password<A>(
    api: &A,
    user: Option<&User>,
    uid: Uid,
    new_password: &str,
) -> ServiceResult<()>
where
    A: UserApi + ?Sized,
{
    ensure_permission(user, PermissionNode::UserSetPassword)?;
    if new_password.is_empty() {
        return Err(ServiceError::Form("Password must not be empty".to_string()));
    }
    let update = ProfileUpdate {
        new_password: Some(new_password.to_string()),
        ..ProfileUpdate::default()
    };
    api.update_profile(uid, &update).await?;
    log::info!("Reset password of user {uid}");
    Ok(())
}

/// Sends the nodes whose grant differs between `subject`'s current mask and `target`.
///
/// Returns `false` without calling the server when nothing changes.
pub async fn edit_permission<A>(
    api: &A,
    user: Option<&User>,
    subject: &User,
    target: Permission,
) -> ServiceResult<bool>
where
    A: UserApi + ?Sized,
{
    ensure_permission(user, PermissionNode::UserEditPermission)?;
    let changes = subject.permission.diff(target);
    if changes.is_empty() {
        return Ok(false);
    }
    api.update_permission(subject.id, &changes).await?;
    log::info!(
        "Changed {} permission node(s) of user {}",
        changes.len(),
        subject.id
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockApi;
    use crate::domain::user::fixtures;

    /// Ensures a user without UserShowList cannot list users.
    #[tokio::test]
    async fn list_requires_permission() {
        let mut api = MockApi::new();
        api.expect_list_users().times(0);
        let user = fixtures::user(1, Permission::default());

        let result = list_users(&api, Some(&user), PageQuery::new(0, 20)).await;

        assert!(matches!(
            result,
            Err(ServiceError::Forbidden(PermissionNode::UserShowList))
        ));
    }

    /// Verifies only the changed nodes are sent.
    #[tokio::test]
    async fn edit_permission_sends_diff() {
        let mut api = MockApi::new();
        api.expect_update_permission()
            .withf(|uid, changes| {
                uid.get() == 2
                    && changes.len() == 2
                    && changes.get("TicketReply") == Some(&true)
                    && changes.get("AdminEntry") == Some(&false)
            })
            .times(1)
            .returning(|_, _| Ok(()));
        let admin = fixtures::user(1, Permission::all());
        let subject = fixtures::user(
            2,
            Permission::from_iter([PermissionNode::AdminEntry, PermissionNode::TicketShowList]),
        );
        let target = Permission::from_iter([
            PermissionNode::TicketShowList,
            PermissionNode::TicketReply,
        ]);

        let changed = edit_permission(&api, Some(&admin), &subject, target)
            .await
            .unwrap();

        assert!(changed);
    }

    /// Ensures an unchanged mask skips the request.
    #[tokio::test]
    async fn unchanged_permission_is_not_sent() {
        let mut api = MockApi::new();
        api.expect_update_permission().times(0);
        let admin = fixtures::user(1, Permission::all());
        let subject = fixtures::user(2, Permission::new(3));

        let changed = edit_permission(&api, Some(&admin), &subject, Permission::new(3))
            .await
            .unwrap();

        assert!(!changed);
    }

    /// Verifies the password change body carries both passwords.
    #[tokio::test]
    async fn change_password_updates_own_profile() {
        let mut api = MockApi::new();
        api.expect_update_current_profile()
            .withf(|update| {
                update.origin_password.as_deref() == Some("old-pass")
                    && update.new_password.as_deref() == Some("new-pass")
                    && update.username.is_none()
            })
            .times(1)
            .returning(|_| Ok(()));
        let user = fixtures::user(1, Permission::default());
        let form = ChangePasswordForm {
            origin_password: "old-pass".into(),
            new_password: "new-pass".into(),
            confirm_password: "new-pass".into(),
        };

        change_password(&api, Some(&user), form).await.unwrap();
    }

    /// Ensures an administrator reset sends only the new password.
    #[tokio::test]
    async fn set_password_requires_node() {
        let mut api = MockApi::new();
        api.expect_update_profile()
            .withf(|uid, update| {
                uid.get() == 9
                    && update.new_password.as_deref() == Some("reset-pass")
                    && update.origin_password.is_none()
            })
            .times(1)
            .returning(|_, _| Ok(()));
        let admin = fixtures::user(1, Permission::new(PermissionNode::UserSetPassword.bit()));
        let uid = Uid::new(9).unwrap();

        set_user_password(&api, Some(&admin), uid, "reset-pass")
            .await
            .unwrap();
        assert!(matches!(
            set_user_password(&api, None, uid, "x").await,
            Err(ServiceError::Unauthorized)
        ));
    }
}
