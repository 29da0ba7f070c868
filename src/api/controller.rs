use async_trait::async_trait;
use reqwest::Method;

use crate::api::errors::ApiResult;
use crate::api::{ControllerApi, HttpApi};
use crate::domain::controller::{
    ApplicationDecision, Controller, ControllerApplication, ControllerRating, ControllerRecord,
    RatingUpdate,
};
use crate::domain::types::{ApplicationId, RecordId, Uid};
use crate::dto::api::{PageData, PageQuery, RecordBody};
use crate::forms::controller::{ApplicationPayload, RecordPayload};

#[async_trait]
impl ControllerApi for HttpApi {
    async fn list_controllers(&self, page: PageQuery) -> ApiResult<PageData<Controller>> {
        let backend_url = self.backend_url();
        let controllers: PageData<Controller> = self.page("/controllers", page).await?;
        Ok(controllers.map(|mut controller| {
            controller.resolve_assets(backend_url);
            controller
        }))
    }

    async fn list_ratings(&self, page: PageQuery) -> ApiResult<PageData<ControllerRating>> {
        self.page("/controllers/ratings", page).await
    }

    async fn own_records(&self, page: PageQuery) -> ApiResult<PageData<ControllerRecord>> {
        self.page("/controllers/records/self", page).await
    }

    async fn records(&self, uid: Uid, page: PageQuery) -> ApiResult<PageData<ControllerRecord>> {
        self.page(&format!("/controllers/records/{uid}"), page)
            .await
    }

    async fn create_record(&self, uid: Uid, record: &RecordPayload) -> ApiResult<()> {
        let body = RecordBody {
            record_type: record.record_type.code(),
            content: &record.content,
        };
        self.send_confirmed(
            Method::POST,
            &format!("/controllers/records/{uid}"),
            Some(&body),
        )
        .await
    }

    async fn delete_record(&self, uid: Uid, record: RecordId) -> ApiResult<()> {
        self.delete(&format!("/controllers/records/{uid}/{record}"))
            .await
    }

    async fn update_rating(&self, uid: Uid, update: &RatingUpdate) -> ApiResult<()> {
        self.send_confirmed(
            Method::PUT,
            &format!("/controllers/{uid}/rating"),
            Some(update),
        )
        .await
    }

    async fn own_application(&self) -> ApiResult<Option<ControllerApplication>> {
        let path = "/controllers/applications/self";
        let request = self.request(Method::GET, path).await;
        let application: Option<ControllerApplication> = self.execute(request, path).await?;
        Ok(application.map(|mut application| {
            application.resolve_assets(self.backend_url());
            application
        }))
    }

    async fn submit_application(&self, application: &ApplicationPayload) -> ApiResult<()> {
        self.send_confirmed(Method::POST, "/controllers/applications", Some(application))
            .await
    }

    async fn cancel_application(&self) -> ApiResult<()> {
        self.delete("/controllers/applications/self").await
    }

    async fn list_applications(
        &self,
        page: PageQuery,
    ) -> ApiResult<PageData<ControllerApplication>> {
        let backend_url = self.backend_url();
        let applications: PageData<ControllerApplication> =
            self.page("/controllers/applications", page).await?;
        Ok(applications.map(|mut application| {
            application.resolve_assets(backend_url);
            application
        }))
    }

    async fn decide_application(
        &self,
        id: ApplicationId,
        decision: &ApplicationDecision,
    ) -> ApiResult<()> {
        self.send_confirmed(
            Method::PUT,
            &format!("/controllers/applications/{id}"),
            Some(decision),
        )
        .await
    }
}
