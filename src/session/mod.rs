//! Login state and the access-token lifecycle.
//!
//! A [`Session`] owns the current user, the access and flush tokens and the
//! background task that refreshes the access token shortly before it expires.
//! At most one refresh task exists at a time; it is replaced whenever new
//! tokens arrive and aborted on logout.

use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use validator::Validate;

use crate::api::errors::{ApiError, ApiResult};
use crate::api::{BearerToken, UserApi};
use crate::domain::permission::Permission;
use crate::domain::user::{LoginData, User};
use crate::forms::FormError;
use crate::forms::user::{EmailCodeForm, LoginForm, RegisterForm, RegisterPayload, ResetPasswordForm};

pub mod claims;
pub mod storage;

pub use storage::{
    FileTokenStorage, MemoryTokenStorage, SessionError, SessionResult, StoredTokens, TokenStorage,
};

/// Snapshot of what the client knows about the signed-in user.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionState {
    pub user: Option<User>,
    pub token: Option<String>,
    pub flush_token: Option<String>,
    pub permission: Permission,
}

impl SessionState {
    pub fn is_login(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }
}

struct Inner {
    api: Arc<dyn UserApi>,
    storage: Arc<dyn TokenStorage>,
    bearer: BearerToken,
    state: RwLock<SessionState>,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
}

impl Inner {
    /// Adopts freshly issued credentials; an empty flush token keeps the current one.
    async fn apply(&self, data: LoginData) -> SessionResult<()> {
        let LoginData {
            user,
            token,
            flush_token,
        } = data;

        let tokens = {
            let mut state = self.state.write().await;
            if !flush_token.is_empty() {
                state.flush_token = Some(flush_token);
            }
            state.permission = user.permission;
            state.user = Some(user);
            state.token = Some(token.clone());
            StoredTokens {
                token: state.token.clone(),
                flush_token: state.flush_token.clone(),
            }
        };

        self.bearer.set(Some(token)).await;
        self.storage.save(&tokens).await
    }

    async fn refresh(&self, first: bool) -> SessionResult<()> {
        let flush_token = self
            .state
            .read()
            .await
            .flush_token
            .clone()
            .ok_or(SessionError::NotLoggedIn)?;
        let data = self.api.refresh_session(&flush_token, first).await?;
        self.apply(data).await?;
        log::info!("Access token refreshed");
        Ok(())
    }

    async fn clear(&self) {
        *self.state.write().await = SessionState::default();
        self.bearer.set(None).await;
        if let Err(err) = self.storage.clear().await {
            log::error!("Failed to clear stored tokens: {err}");
        }
    }
}

/// Shortest wait between two refreshes, for tokens living less than the margin.
const MIN_REFRESH_DELAY: Duration = Duration::from_secs(1);
/// Wait before retrying a refresh the server could not be reached for.
const REFRESH_RETRY_DELAY: Duration = Duration::from_secs(30);

async fn refresh_loop(inner: Weak<Inner>) {
    let mut retry = None;
    loop {
        let delay = if let Some(delay) = retry.take() {
            delay
        } else {
            let Some(inner) = inner.upgrade() else {
                return;
            };
            let state = inner.state.read().await;
            let delay = state
                .token
                .as_deref()
                .and_then(|token| claims::refresh_delay(token, Utc::now()));
            match delay {
                Some(delay) => delay.max(MIN_REFRESH_DELAY),
                None => {
                    log::warn!("Access token carries no readable expiry; refresh not scheduled");
                    return;
                }
            }
        };

        log::debug!("Next access token refresh in {}s", delay.as_secs());
        tokio::time::sleep(delay).await;

        let Some(inner) = inner.upgrade() else {
            return;
        };
        match inner.refresh(false).await {
            Ok(()) => {}
            Err(err) if err.is_transport() => {
                log::warn!(
                    "Failed to reach server for token refresh, retrying in {}s: {err}",
                    REFRESH_RETRY_DELAY.as_secs()
                );
                retry = Some(REFRESH_RETRY_DELAY);
            }
            Err(err) => {
                log::error!("Failed to refresh access token, logging out: {err}");
                inner.clear().await;
                return;
            }
        }
    }
}

/// Shared handle to the signed-in state; clones refer to the same session.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

impl Session {
    /// `bearer` is the slot the HTTP client reads its access token from.
    pub fn new(
        api: Arc<dyn UserApi>,
        storage: Arc<dyn TokenStorage>,
        bearer: BearerToken,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                storage,
                bearer,
                state: RwLock::new(SessionState::default()),
                refresh_task: Mutex::new(None),
            }),
        }
    }

    pub async fn is_login(&self) -> bool {
        self.inner.state.read().await.is_login()
    }

    pub async fn user(&self) -> Option<User> {
        self.inner.state.read().await.user.clone()
    }

    pub async fn permission(&self) -> Permission {
        self.inner.state.read().await.permission
    }

    pub async fn snapshot(&self) -> SessionState {
        self.inner.state.read().await.clone()
    }

    /// Whether a refresh task is currently waiting.
    pub async fn refresh_scheduled(&self) -> bool {
        self.inner
            .refresh_task
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub async fn login(&self, form: &LoginForm) -> SessionResult<User> {
        form.validate().map_err(FormError::from)?;
        let data = self.inner.api.login(form).await?;
        let user = data.user.clone();
        self.inner.apply(data).await?;
        self.schedule_refresh().await;
        log::info!("User {} logged in", user.username);
        Ok(user)
    }

    pub async fn register(&self, form: RegisterForm) -> SessionResult<()> {
        let payload = RegisterPayload::try_from(form)?;
        self.inner.api.register(&payload).await?;
        log::info!("Registered user {}", payload.username);
        Ok(())
    }

    pub async fn send_email_code(&self, form: &EmailCodeForm) -> SessionResult<()> {
        form.validate().map_err(FormError::from)?;
        self.inner.api.send_email_code(form).await?;
        Ok(())
    }

    pub async fn reset_password(&self, form: &ResetPasswordForm) -> SessionResult<()> {
        form.validate().map_err(FormError::from)?;
        self.inner.api.reset_password(form).await?;
        Ok(())
    }

    /// Restores the session persisted by a previous run.
    ///
    /// Returns whether the user ends up logged in. Stored credentials the
    /// server no longer accepts are discarded; when the server cannot be
    /// reached the error is returned and storage is left as it was.
    pub async fn init(&self) -> SessionResult<bool> {
        let stored = self.inner.storage.load().await?;
        let Some(flush_token) = stored.flush_token.filter(|token| !token.is_empty()) else {
            return Ok(false);
        };

        match stored.token.filter(|token| claims::verify_token_live(token)) {
            Some(token) => match self.inner.api.profile_with_token(&token).await {
                Ok(user) => {
                    self.inner
                        .apply(LoginData {
                            user,
                            token,
                            flush_token,
                        })
                        .await?;
                }
                Err(err) if err.is_transport() => {
                    log::warn!("Failed to reach server to restore session: {err}");
                    return Err(err.into());
                }
                Err(err) => {
                    log::warn!("Stored session rejected: {err}");
                    self.logout().await;
                    return Ok(false);
                }
            },
            None if claims::verify_token_live(&flush_token) => {
                self.inner.state.write().await.flush_token = Some(flush_token);
                match self.inner.refresh(true).await {
                    Ok(()) => {}
                    Err(err) if err.is_transport() => {
                        log::warn!("Failed to reach server to restore session: {err}");
                        self.inner.state.write().await.flush_token = None;
                        return Err(err);
                    }
                    Err(err) => {
                        log::warn!("Failed to restore session: {err}");
                        self.logout().await;
                        return Ok(false);
                    }
                }
            }
            None => {
                log::info!("Stored session has expired");
                self.logout().await;
                return Ok(false);
            }
        }

        self.schedule_refresh().await;
        if let Some(user) = self.user().await {
            log::info!("Restored session for {}", user.username);
        }
        Ok(true)
    }

    /// Exchanges the flush token for a new access token and reschedules the refresh.
    pub async fn flush_access_token(&self, first: bool) -> SessionResult<()> {
        self.inner.refresh(first).await?;
        self.schedule_refresh().await;
        Ok(())
    }

    pub async fn logout(&self) {
        if let Some(handle) = self.inner.refresh_task.lock().await.take() {
            handle.abort();
        }
        self.inner.clear().await;
        log::info!("Logged out");
    }

    /// Passes `result` through, logging out when the server rejected the credentials.
    pub async fn checked<T>(&self, result: ApiResult<T>) -> ApiResult<T> {
        if matches!(result, Err(ApiError::Unauthorized(_))) {
            log::warn!("Credentials rejected by server");
            self.logout().await;
        }
        result
    }

    async fn schedule_refresh(&self) {
        let mut task = self.inner.refresh_task.lock().await;
        if let Some(handle) = task.take() {
            handle.abort();
        }
        if self.inner.state.read().await.is_login() {
            *task = Some(tokio::spawn(refresh_loop(Arc::downgrade(&self.inner))));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::claims::fixtures::token_expiring_in;
    use super::*;
    use crate::api::mock::MockApi;
    use crate::domain::permission::PermissionNode;
    use crate::domain::user::fixtures;

    fn login_data(token: String, flush_token: &str) -> LoginData {
        LoginData {
            user: fixtures::user(1, Permission::new(PermissionNode::AdminEntry.bit())),
            token,
            flush_token: flush_token.to_string(),
        }
    }

    fn login_form() -> LoginForm {
        LoginForm {
            username: "user1".into(),
            password: "secret".into(),
        }
    }

    fn session(api: MockApi, storage: Arc<MemoryTokenStorage>) -> Session {
        Session::new(Arc::new(api), storage, BearerToken::default())
    }

    #[tokio::test]
    async fn login_persists_both_tokens() {
        let token = token_expiring_in(600);
        let mut api = MockApi::new();
        let issued = token.clone();
        api.expect_login()
            .withf(|form| form.username == "user1")
            .times(1)
            .returning(move |_| Ok(login_data(issued.clone(), "flush-1")));
        let storage = Arc::new(MemoryTokenStorage::new());
        let bearer = BearerToken::default();
        let session = Session::new(Arc::new(api), storage.clone(), bearer.clone());

        let user = session.login(&login_form()).await.unwrap();

        assert_eq!(user.username, "user1");
        assert!(session.is_login().await);
        assert!(session.permission().await.has_permission(PermissionNode::AdminEntry));
        assert_eq!(bearer.get().await.as_deref(), Some(token.as_str()));
        assert_eq!(
            storage.snapshot().await,
            StoredTokens {
                token: Some(token),
                flush_token: Some("flush-1".into()),
            }
        );
        assert!(session.refresh_scheduled().await);
    }

    #[tokio::test]
    async fn login_rejects_blank_credentials_without_calling_api() {
        let mut api = MockApi::new();
        api.expect_login().never();
        let session = session(api, Arc::new(MemoryTokenStorage::new()));

        let form = LoginForm {
            username: String::new(),
            password: "secret".into(),
        };

        assert!(matches!(
            session.login(&form).await,
            Err(SessionError::Form(FormError::Validation(_)))
        ));
    }

    #[tokio::test]
    async fn logout_clears_storage_and_cancels_refresh() {
        let mut api = MockApi::new();
        api.expect_login()
            .returning(|_| Ok(login_data(token_expiring_in(600), "flush-1")));
        let storage = Arc::new(MemoryTokenStorage::new());
        let session = session(api, storage.clone());
        session.login(&login_form()).await.unwrap();

        session.logout().await;

        assert!(!session.is_login().await);
        assert_eq!(session.snapshot().await, SessionState::default());
        assert_eq!(storage.snapshot().await, StoredTokens::default());
        assert!(!session.refresh_scheduled().await);
    }

    #[tokio::test]
    async fn refresh_keeps_flush_token_when_server_sends_empty_one() {
        let mut api = MockApi::new();
        api.expect_login()
            .returning(|_| Ok(login_data(token_expiring_in(600), "flush-1")));
        let renewed = token_expiring_in(900);
        let expected = renewed.clone();
        api.expect_refresh_session()
            .withf(|flush_token, first| flush_token == "flush-1" && !*first)
            .times(1)
            .returning(move |_, _| Ok(login_data(renewed.clone(), "")));
        let storage = Arc::new(MemoryTokenStorage::new());
        let session = session(api, storage.clone());
        session.login(&login_form()).await.unwrap();

        session.flush_access_token(false).await.unwrap();

        let state = session.snapshot().await;
        assert_eq!(state.token.as_deref(), Some(expected.as_str()));
        assert_eq!(state.flush_token.as_deref(), Some("flush-1"));
        assert_eq!(storage.snapshot().await.flush_token.as_deref(), Some("flush-1"));
    }

    #[tokio::test]
    async fn flush_without_session_is_rejected() {
        let mut api = MockApi::new();
        api.expect_refresh_session().never();
        let session = session(api, Arc::new(MemoryTokenStorage::new()));

        assert!(matches!(
            session.flush_access_token(true).await,
            Err(SessionError::NotLoggedIn)
        ));
    }

    #[tokio::test]
    async fn init_with_live_token_fetches_profile() {
        let token = token_expiring_in(600);
        let storage = Arc::new(MemoryTokenStorage::with_tokens(StoredTokens {
            token: Some(token.clone()),
            flush_token: Some("flush-1".into()),
        }));
        let mut api = MockApi::new();
        let expected = token.clone();
        api.expect_profile_with_token()
            .withf(move |used| used == expected)
            .times(1)
            .returning(|_| Ok(fixtures::user(1, Permission::default())));
        api.expect_refresh_session().never();
        let session = session(api, storage);

        assert!(session.init().await.unwrap());
        assert_eq!(session.snapshot().await.token, Some(token));
        assert!(session.refresh_scheduled().await);
    }

    #[tokio::test]
    async fn init_with_expired_token_refreshes_with_first_flag() {
        let flush_token = token_expiring_in(86_400);
        let storage = Arc::new(MemoryTokenStorage::with_tokens(StoredTokens {
            token: Some(token_expiring_in(-10)),
            flush_token: Some(flush_token.clone()),
        }));
        let mut api = MockApi::new();
        api.expect_profile_with_token().never();
        let expected = flush_token.clone();
        api.expect_refresh_session()
            .withf(move |used, first| used == expected && *first)
            .times(1)
            .returning(|_, _| Ok(login_data(token_expiring_in(600), "")));
        let session = session(api, storage.clone());

        assert!(session.init().await.unwrap());
        assert_eq!(
            storage.snapshot().await.flush_token.as_deref(),
            Some(flush_token.as_str())
        );
    }

    #[tokio::test]
    async fn init_discards_rejected_credentials() {
        let storage = Arc::new(MemoryTokenStorage::with_tokens(StoredTokens {
            token: Some(token_expiring_in(600)),
            flush_token: Some("flush-1".into()),
        }));
        let mut api = MockApi::new();
        api.expect_profile_with_token()
            .returning(|_| Err(ApiError::Unauthorized("token revoked".into())));
        let session = session(api, storage.clone());

        assert!(!session.init().await.unwrap());
        assert_eq!(storage.snapshot().await, StoredTokens::default());
        assert!(!session.refresh_scheduled().await);
    }

    #[tokio::test]
    async fn init_keeps_stored_credentials_when_server_unreachable() {
        let stored = StoredTokens {
            token: Some(token_expiring_in(600)),
            flush_token: Some("flush-1".into()),
        };
        let storage = Arc::new(MemoryTokenStorage::with_tokens(stored.clone()));
        let mut api = MockApi::new();
        api.expect_profile_with_token()
            .times(1)
            .returning(|_| Err(ApiError::Timeout));
        let session = session(api, storage.clone());

        let err = session.init().await.unwrap_err();

        assert!(err.is_transport());
        assert!(!session.is_login().await);
        assert!(!session.refresh_scheduled().await);
        assert_eq!(storage.snapshot().await, stored);
    }

    #[tokio::test]
    async fn init_keeps_flush_token_when_refresh_cannot_connect() {
        let stored = StoredTokens {
            token: Some(token_expiring_in(-10)),
            flush_token: Some(token_expiring_in(86_400)),
        };
        let storage = Arc::new(MemoryTokenStorage::with_tokens(stored.clone()));
        let mut api = MockApi::new();
        api.expect_refresh_session()
            .times(1)
            .returning(|_, _| Err(ApiError::Connection("connection refused".into())));
        let session = session(api, storage.clone());

        assert!(session.init().await.is_err());
        assert_eq!(storage.snapshot().await, stored);
    }

    #[tokio::test]
    async fn init_without_stored_flush_token_stays_logged_out() {
        let mut api = MockApi::new();
        api.expect_profile_with_token().never();
        api.expect_refresh_session().never();
        let session = session(api, Arc::new(MemoryTokenStorage::new()));

        assert!(!session.init().await.unwrap());
        assert!(!session.is_login().await);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_task_fires_a_minute_before_expiry() {
        let mut api = MockApi::new();
        api.expect_login()
            .returning(|_| Ok(login_data(token_expiring_in(600), "flush-1")));
        api.expect_refresh_session()
            .times(1)
            .returning(|_, _| Ok(login_data(token_expiring_in(3600), "flush-2")));
        let storage = Arc::new(MemoryTokenStorage::new());
        let session = session(api, storage.clone());
        session.login(&login_form()).await.unwrap();

        tokio::time::sleep(Duration::from_secs(500)).await;
        assert_eq!(storage.snapshot().await.flush_token.as_deref(), Some("flush-1"));

        tokio::time::sleep(Duration::from_secs(45)).await;
        assert_eq!(storage.snapshot().await.flush_token.as_deref(), Some("flush-2"));
        assert!(session.refresh_scheduled().await);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_background_refresh_logs_out() {
        let mut api = MockApi::new();
        api.expect_login()
            .returning(|_| Ok(login_data(token_expiring_in(120), "flush-1")));
        api.expect_refresh_session()
            .times(1)
            .returning(|_, _| Err(ApiError::Unauthorized("expired".into())));
        let storage = Arc::new(MemoryTokenStorage::new());
        let session = session(api, storage.clone());
        session.login(&login_form()).await.unwrap();

        tokio::time::sleep(Duration::from_secs(70)).await;

        assert!(!session.is_login().await);
        assert_eq!(storage.snapshot().await, StoredTokens::default());
    }

    #[tokio::test(start_paused = true)]
    async fn unreachable_server_delays_background_refresh() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut api = MockApi::new();
        api.expect_login()
            .returning(|_| Ok(login_data(token_expiring_in(120), "flush-1")));
        let counter = calls.clone();
        api.expect_refresh_session().times(2).returning(move |_, _| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(ApiError::Timeout)
            } else {
                Ok(login_data(token_expiring_in(3600), "flush-2"))
            }
        });
        let storage = Arc::new(MemoryTokenStorage::new());
        let session = session(api, storage.clone());
        session.login(&login_form()).await.unwrap();

        tokio::time::sleep(Duration::from_secs(70)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(session.is_login().await);
        assert_eq!(storage.snapshot().await.flush_token.as_deref(), Some("flush-1"));

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(storage.snapshot().await.flush_token.as_deref(), Some("flush-2"));
    }

    #[tokio::test(start_paused = true)]
    async fn short_lived_tokens_are_not_refreshed_back_to_back() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut api = MockApi::new();
        api.expect_login()
            .returning(|_| Ok(login_data(token_expiring_in(30), "flush-1")));
        let counter = calls.clone();
        api.expect_refresh_session().returning(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(login_data(token_expiring_in(30), ""))
        });
        let session = session(api, Arc::new(MemoryTokenStorage::new()));
        session.login(&login_form()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(2500)).await;

        let calls = calls.load(Ordering::SeqCst);
        assert!((1..=3).contains(&calls), "refreshed {calls} times");
        assert!(session.is_login().await);
    }

    #[tokio::test]
    async fn checked_logs_out_on_unauthorized() {
        let mut api = MockApi::new();
        api.expect_login()
            .returning(|_| Ok(login_data(token_expiring_in(600), "flush-1")));
        let session = session(api, Arc::new(MemoryTokenStorage::new()));
        session.login(&login_form()).await.unwrap();

        let ok: ApiResult<u8> = session.checked(Ok(1)).await;
        assert_eq!(ok.unwrap(), 1);
        assert!(session.is_login().await);

        let rejected: ApiResult<u8> = session
            .checked(Err(ApiError::Unauthorized("expired".into())))
            .await;
        assert!(rejected.is_err());
        assert!(!session.is_login().await);
    }
}
