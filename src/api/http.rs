//! `reqwest`-backed implementation shared by every API area.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use crate::api::errors::{ApiError, ApiResult};
use crate::dto::api::{ApiEnvelope, PageData, PageQuery};
use crate::models::config::ClientConfig;

/// Access token attached to outgoing requests, shared with the session.
#[derive(Clone, Debug, Default)]
pub struct BearerToken(Arc<RwLock<Option<String>>>);

impl BearerToken {
    pub async fn set(&self, token: Option<String>) {
        *self.0.write().await = token;
    }

    pub async fn get(&self) -> Option<String> {
        self.0.read().await.clone()
    }
}

/// HTTP client for the platform API.
#[derive(Clone, Debug)]
pub struct HttpApi {
    client: Client,
    base_url: String,
    bearer: BearerToken,
}

impl HttpApi {
    /// Builds a client using the configured backend URL and timeout.
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self::with_client(client, &config.backend_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer: BearerToken::default(),
        }
    }

    /// Token slot this client reads before every request.
    pub fn bearer(&self) -> &BearerToken {
        &self.bearer
    }

    /// Base URL relative asset paths are resolved against.
    pub fn backend_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Starts a request carrying the session's access token, if any.
    pub(crate) async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let token = self.bearer.get().await;
        self.request_with_token(method, path, token.as_deref())
    }

    /// Starts a request authorized with an explicit token.
    pub(crate) fn request_with_token(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
    ) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends the request and unwraps the envelope's `data` field.
    pub(crate) async fn execute<T>(&self, request: RequestBuilder, path: &str) -> ApiResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let result = self.execute_inner(request).await;
        if let Err(err) = &result {
            log::error!("Request to {path} failed: {err}");
        }
        result
    }

    async fn execute_inner<T>(&self, request: RequestBuilder) -> ApiResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ApiEnvelope<serde_json::Value>>(&body)
                .map(|envelope| envelope.message)
                .unwrap_or_default();
            return Err(ApiError::from_status(status, message));
        }

        if body.is_empty() {
            return Ok(None);
        }

        let envelope: ApiEnvelope<T> = serde_json::from_slice(&body)?;
        Ok(envelope.data)
    }

    /// Like [`execute`](Self::execute) but a missing payload is an error.
    pub(crate) async fn fetch<T>(&self, request: RequestBuilder, path: &str) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        match self.execute(request, path).await? {
            Some(data) => Ok(data),
            None => {
                log::error!("Request to {path} returned no data");
                Err(ApiError::EmptyData)
            }
        }
    }

    /// Mutating endpoints answer with a boolean; anything but `true` is a rejection.
    pub(crate) async fn confirm(&self, request: RequestBuilder, path: &str) -> ApiResult<()> {
        match self.execute::<bool>(request, path).await? {
            Some(true) => Ok(()),
            _ => {
                log::error!("Request to {path} was rejected");
                Err(ApiError::Rejected)
            }
        }
    }

    pub(crate) async fn get<T>(&self, path: &str) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let request = self.request(Method::GET, path).await;
        self.fetch(request, path).await
    }

    pub(crate) async fn page<T>(&self, path: &str, page: PageQuery) -> ApiResult<PageData<T>>
    where
        T: DeserializeOwned,
    {
        let request = self.request(Method::GET, path).await.query(&page);
        self.fetch(request, path).await
    }

    /// Sends an optional JSON body and expects a `true` acknowledgement.
    pub(crate) async fn send_confirmed<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ApiResult<()>
    where
        B: Serialize + ?Sized,
    {
        let mut request = self.request(method, path).await;
        if let Some(body) = body {
            request = request.json(body);
        }
        self.confirm(request, path).await
    }

    pub(crate) async fn delete(&self, path: &str) -> ApiResult<()> {
        self.send_confirmed::<()>(Method::DELETE, path, None).await
    }
}
