use async_trait::async_trait;

use crate::api::errors::ApiResult;
use crate::api::{HttpApi, ServerApi};
use crate::domain::server::{ServerConfig, ServerInfo, ServerRatings};
use crate::domain::types::resolve_asset_url;

#[async_trait]
impl ServerApi for HttpApi {
    async fn server_info(&self) -> ApiResult<ServerInfo> {
        self.get("/server/info").await
    }

    async fn server_ratings(&self) -> ApiResult<ServerRatings> {
        let backend_url = self.backend_url();
        let mut ratings: ServerRatings = self.get("/server/rating").await?;
        for rating in ratings.pilots.iter_mut().chain(ratings.controllers.iter_mut()) {
            rating.avatar_url = resolve_asset_url(backend_url, &rating.avatar_url);
        }
        Ok(ratings)
    }

    async fn server_config(&self) -> ApiResult<ServerConfig> {
        self.get("/server/config").await
    }
}
