use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Method;

use crate::api::errors::ApiResult;
use crate::api::{HttpApi, UserApi};
use crate::domain::types::Uid;
use crate::domain::user::{Availability, LoginData, User, UserHistory};
use crate::dto::api::{FirstQuery, PageData, PageQuery, PermissionBody};
use crate::forms::user::{
    EmailCodeForm, LoginForm, ProfileUpdate, RegisterPayload, ResetPasswordForm,
};

#[async_trait]
impl UserApi for HttpApi {
    async fn login(&self, form: &LoginForm) -> ApiResult<LoginData> {
        let path = "/users/sessions";
        let request = self.request_with_token(Method::POST, path, None).json(form);
        let mut data: LoginData = self.fetch(request, path).await?;
        data.user.resolve_assets(self.backend_url());
        Ok(data)
    }

    async fn refresh_session(&self, flush_token: &str, first: bool) -> ApiResult<LoginData> {
        let path = "/users/sessions";
        let request = self
            .request_with_token(Method::GET, path, Some(flush_token))
            .query(&FirstQuery { first });
        let mut data: LoginData = self.fetch(request, path).await?;
        data.user.resolve_assets(self.backend_url());
        Ok(data)
    }

    async fn profile_with_token(&self, token: &str) -> ApiResult<User> {
        let path = "/users/profiles/self";
        let request = self.request_with_token(Method::GET, path, Some(token));
        let mut user: User = self.fetch(request, path).await?;
        user.resolve_assets(self.backend_url());
        Ok(user)
    }

    async fn register(&self, payload: &RegisterPayload) -> ApiResult<()> {
        self.send_confirmed(Method::POST, "/users", Some(payload))
            .await
    }

    async fn send_email_code(&self, form: &EmailCodeForm) -> ApiResult<()> {
        self.send_confirmed(Method::POST, "/codes", Some(form)).await
    }

    async fn reset_password(&self, form: &ResetPasswordForm) -> ApiResult<()> {
        self.send_confirmed(Method::POST, "/users/password", Some(form))
            .await
    }

    async fn current_profile(&self) -> ApiResult<User> {
        let mut user: User = self.get("/users/profiles/self").await?;
        user.resolve_assets(self.backend_url());
        Ok(user)
    }

    async fn update_current_profile(&self, update: &ProfileUpdate) -> ApiResult<()> {
        self.send_confirmed(Method::PATCH, "/users/profiles/self", Some(update))
            .await
    }

    async fn get_profile(&self, uid: Uid) -> ApiResult<User> {
        let mut user: User = self.get(&format!("/users/profiles/{uid}")).await?;
        user.resolve_assets(self.backend_url());
        Ok(user)
    }

    async fn update_profile(&self, uid: Uid, update: &ProfileUpdate) -> ApiResult<()> {
        self.send_confirmed(Method::PATCH, &format!("/users/profiles/{uid}"), Some(update))
            .await
    }

    async fn update_permission(
        &self,
        uid: Uid,
        changes: &BTreeMap<String, bool>,
    ) -> ApiResult<()> {
        let body = PermissionBody {
            permissions: changes,
        };
        self.send_confirmed(
            Method::PATCH,
            &format!("/users/profiles/{uid}/permission"),
            Some(&body),
        )
        .await
    }

    async fn list_users(&self, page: PageQuery) -> ApiResult<PageData<User>> {
        let backend_url = self.backend_url();
        let users: PageData<User> = self.page("/users", page).await?;
        Ok(users.map(|mut user| {
            user.resolve_assets(backend_url);
            user
        }))
    }

    async fn check_availability(&self, field: &Availability) -> ApiResult<bool> {
        if field.is_trivially_available() {
            return Ok(true);
        }
        let path = "/users/availability";
        let request = self.request(Method::GET, path).await.query(&[field.query()]);
        self.fetch(request, path).await
    }

    async fn history(&self) -> ApiResult<UserHistory> {
        self.get("/users/histories/self").await
    }
}
