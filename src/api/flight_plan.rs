use async_trait::async_trait;
use reqwest::Method;

use crate::api::errors::ApiResult;
use crate::api::{FlightPlanApi, HttpApi};
use crate::domain::flight_plan::FlightPlan;
use crate::dto::api::{PageData, PageQuery};

#[async_trait]
impl FlightPlanApi for HttpApi {
    async fn own_plan(&self) -> ApiResult<Option<FlightPlan>> {
        let path = "/plans/self";
        let request = self.request(Method::GET, path).await;
        self.execute(request, path).await
    }

    async fn delete_own_plan(&self) -> ApiResult<()> {
        self.delete("/plans/self").await
    }

    async fn list_plans(&self, page: PageQuery) -> ApiResult<PageData<FlightPlan>> {
        self.page("/plans", page).await
    }

    async fn submit_plan(&self, plan: &FlightPlan) -> ApiResult<()> {
        self.send_confirmed(Method::POST, "/plans", Some(plan)).await
    }

    async fn delete_plan(&self, cid: i32) -> ApiResult<()> {
        self.delete(&format!("/plans/{cid}")).await
    }

    async fn set_plan_lock(&self, cid: i32, locked: bool) -> ApiResult<()> {
        let path = format!("/plans/{cid}/lock");
        if locked {
            self.send_confirmed::<()>(Method::PUT, &path, None).await
        } else {
            self.delete(&path).await
        }
    }
}
