use crate::api::AnnouncementApi;
use crate::domain::announcement::{
    Announcement, AnnouncementUpdate, NewAnnouncement, UserAnnouncement,
};
use crate::domain::permission::PermissionNode;
use crate::domain::types::AnnouncementId;
use crate::domain::user::User;
use crate::dto::api::{PageData, PageQuery};
use crate::forms::FormError;
use crate::forms::announcement::AnnouncementForm;
use crate::services::{ServiceResult, ensure_permission};

/// Announcements as every visitor sees them.
pub async fn list_announcements<A>(
    api: &A,
    page: PageQuery,
) -> ServiceResult<PageData<UserAnnouncement>>
where
    A: AnnouncementApi + ?Sized,
{
    Ok(api.list_announcements(page).await?)
}

/// Unread announcements the client must pop up on start.
pub fn forced(announcements: &[UserAnnouncement]) -> Vec<&UserAnnouncement> {
    announcements
        .iter()
        .filter(|announcement| announcement.force_show)
        .collect()
}

/// Full records including the publisher, for the administration view.
pub async fn list_announcement_details<A>(
    api: &A,
    user: Option<&User>,
    page: PageQuery,
) -> ServiceResult<PageData<Announcement>>
where
    A: AnnouncementApi + ?Sized,
{
    ensure_permission(user, PermissionNode::AdminEntry)?;
    Ok(api.list_announcement_details(page).await?)
}

pub async fn publish_announcement<A>(
    api: &A,
    user: Option<&User>,
    form: AnnouncementForm,
) -> ServiceResult<()>
where
    A: AnnouncementApi + ?Sized,
{
    ensure_permission(user, PermissionNode::AdminEntry)?;
    let announcement = NewAnnouncement::try_from(form)?;
    api.create_announcement(&announcement).await?;
    log::info!("Published announcement `{}`", announcement.title);
    Ok(())
}

pub async fn update_announcement<A>(
    api: &A,
    user: Option<&User>,
    id: AnnouncementId,
    update: AnnouncementUpdate,
) -> ServiceResult<()>
where
    A: AnnouncementApi + ?Sized,
{
    ensure_permission(user, PermissionNode::AdminEntry)?;
    if update == AnnouncementUpdate::default() {
        return Err(FormError::EmptyUpdate.into());
    }
    Ok(api.update_announcement(id, &update).await?)
}

pub async fn delete_announcement<A>(
    api: &A,
    user: Option<&User>,
    id: AnnouncementId,
) -> ServiceResult<()>
where
    A: AnnouncementApi + ?Sized,
{
    ensure_permission(user, PermissionNode::AdminEntry)?;
    api.delete_announcement(id).await?;
    log::info!("Deleted announcement {id}");
    Ok(())
}
