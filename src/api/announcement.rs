use async_trait::async_trait;
use reqwest::Method;

use crate::api::errors::ApiResult;
use crate::api::{AnnouncementApi, HttpApi};
use crate::domain::announcement::{
    Announcement, AnnouncementUpdate, NewAnnouncement, UserAnnouncement,
};
use crate::domain::types::AnnouncementId;
use crate::dto::api::{PageData, PageQuery};

#[async_trait]
impl AnnouncementApi for HttpApi {
    async fn list_announcements(
        &self,
        page: PageQuery,
    ) -> ApiResult<PageData<UserAnnouncement>> {
        self.page("/announcements", page).await
    }

    async fn list_announcement_details(
        &self,
        page: PageQuery,
    ) -> ApiResult<PageData<Announcement>> {
        let backend_url = self.backend_url();
        let announcements: PageData<Announcement> =
            self.page("/announcements/detail", page).await?;
        Ok(announcements.map(|mut announcement| {
            if let Some(user) = announcement.user.as_mut() {
                user.resolve_assets(backend_url);
            }
            announcement
        }))
    }

    async fn create_announcement(&self, announcement: &NewAnnouncement) -> ApiResult<()> {
        self.send_confirmed(Method::POST, "/announcements", Some(announcement))
            .await
    }

    async fn update_announcement(
        &self,
        id: AnnouncementId,
        update: &AnnouncementUpdate,
    ) -> ApiResult<()> {
        self.send_confirmed(Method::PUT, &format!("/announcements/{id}"), Some(update))
            .await
    }

    async fn delete_announcement(&self, id: AnnouncementId) -> ApiResult<()> {
        self.delete(&format!("/announcements/{id}")).await
    }
}
