use async_trait::async_trait;
use reqwest::Method;

use crate::api::errors::ApiResult;
use crate::api::{ActivityApi, HttpApi};
use crate::domain::activity::{Activity, NewActivity};
use crate::domain::types::{ActivityId, FacilityId, PilotId};
use crate::dto::api::{PageData, PageQuery, StatusBody, TimeQuery};
use crate::forms::activity::PilotSignPayload;

impl HttpApi {
    fn resolve_activity(&self, mut activity: Activity) -> Activity {
        activity.resolve_assets(self.backend_url());
        activity
    }
}

#[async_trait]
impl ActivityApi for HttpApi {
    async fn list_activities(&self, time: &str) -> ApiResult<Vec<Activity>> {
        let path = "/activities";
        let request = self
            .request(Method::GET, path)
            .await
            .query(&TimeQuery { time });
        let activities: Vec<Activity> = self.fetch(request, path).await?;
        Ok(activities
            .into_iter()
            .map(|activity| self.resolve_activity(activity))
            .collect())
    }

    async fn list_activity_page(&self, page: PageQuery) -> ApiResult<PageData<Activity>> {
        let activities: PageData<Activity> = self.page("/activities/pages", page).await?;
        Ok(activities.map(|activity| self.resolve_activity(activity)))
    }

    async fn get_activity(&self, id: ActivityId) -> ApiResult<Activity> {
        let activity = self.get(&format!("/activities/{id}")).await?;
        Ok(self.resolve_activity(activity))
    }

    async fn create_activity(&self, activity: &NewActivity) -> ApiResult<()> {
        self.send_confirmed(Method::POST, "/activities", Some(activity))
            .await
    }

    async fn update_activity(&self, id: ActivityId, activity: &NewActivity) -> ApiResult<()> {
        self.send_confirmed(Method::PUT, &format!("/activities/{id}"), Some(activity))
            .await
    }

    async fn delete_activity(&self, id: ActivityId) -> ApiResult<()> {
        self.delete(&format!("/activities/{id}")).await
    }

    async fn sign_pilot(&self, id: ActivityId, payload: &PilotSignPayload) -> ApiResult<()> {
        self.send_confirmed(
            Method::POST,
            &format!("/activities/{id}/pilots"),
            Some(payload),
        )
        .await
    }

    async fn cancel_pilot(&self, id: ActivityId) -> ApiResult<()> {
        self.delete(&format!("/activities/{id}/pilots")).await
    }

    async fn sign_controller(&self, id: ActivityId, facility: FacilityId) -> ApiResult<()> {
        self.send_confirmed::<()>(
            Method::POST,
            &format!("/activities/{id}/controllers/{facility}"),
            None,
        )
        .await
    }

    async fn cancel_controller(&self, id: ActivityId, facility: FacilityId) -> ApiResult<()> {
        self.delete(&format!("/activities/{id}/controllers/{facility}"))
            .await
    }

    async fn update_activity_status(&self, id: ActivityId, status: i32) -> ApiResult<()> {
        self.send_confirmed(
            Method::PUT,
            &format!("/activities/{id}/status"),
            Some(&StatusBody { status }),
        )
        .await
    }

    async fn update_pilot_status(
        &self,
        id: ActivityId,
        pilot: PilotId,
        status: i32,
    ) -> ApiResult<()> {
        self.send_confirmed(
            Method::PUT,
            &format!("/activities/{id}/pilots/{pilot}/status"),
            Some(&StatusBody { status }),
        )
        .await
    }
}
