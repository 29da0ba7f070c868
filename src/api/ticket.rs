use async_trait::async_trait;
use reqwest::Method;

use crate::api::errors::ApiResult;
use crate::api::{HttpApi, TicketApi};
use crate::domain::ticket::{NewTicket, Ticket};
use crate::domain::types::TicketId;
use crate::dto::api::{PageData, PageQuery, ReplyBody};

#[async_trait]
impl TicketApi for HttpApi {
    async fn own_tickets(&self, page: PageQuery) -> ApiResult<PageData<Ticket>> {
        self.page("/tickets/self", page).await
    }

    async fn list_tickets(&self, page: PageQuery) -> ApiResult<PageData<Ticket>> {
        self.page("/tickets", page).await
    }

    async fn create_ticket(&self, ticket: &NewTicket) -> ApiResult<()> {
        self.send_confirmed(Method::POST, "/tickets", Some(ticket))
            .await
    }

    async fn reply_ticket(&self, id: TicketId, reply: &str) -> ApiResult<()> {
        self.send_confirmed(
            Method::PUT,
            &format!("/tickets/{id}"),
            Some(&ReplyBody { reply }),
        )
        .await
    }

    async fn delete_ticket(&self, id: TicketId) -> ApiResult<()> {
        self.delete(&format!("/tickets/{id}")).await
    }
}
