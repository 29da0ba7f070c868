use async_trait::async_trait;
use reqwest::Method;

use crate::api::errors::ApiResult;
use crate::api::{HttpApi, OnlineApi};
use crate::domain::online::{FlightPathPoint, OnlineClients};
use crate::dto::api::{BroadcastBody, KickBody, MessageBody};

#[async_trait]
impl OnlineApi for HttpApi {
    async fn online_clients(&self) -> ApiResult<OnlineClients> {
        self.get("/clients").await
    }

    async fn flight_path(&self, callsign: &str) -> ApiResult<Vec<FlightPathPoint>> {
        self.get(&format!("/clients/paths/{callsign}")).await
    }

    async fn send_message(&self, callsign: &str, message: &str) -> ApiResult<()> {
        self.send_confirmed(
            Method::POST,
            &format!("/clients/messages/{callsign}"),
            Some(&MessageBody { message }),
        )
        .await
    }

    async fn broadcast(&self, target: &str, message: &str) -> ApiResult<()> {
        self.send_confirmed(
            Method::POST,
            "/clients/messages",
            Some(&BroadcastBody { target, message }),
        )
        .await
    }

    async fn kick(&self, callsign: &str, reason: &str) -> ApiResult<()> {
        self.send_confirmed(
            Method::DELETE,
            &format!("/clients/{callsign}"),
            Some(&KickBody { reason }),
        )
        .await
    }
}
