//! Typed wrappers around the platform's REST API.
//!
//! Each REST area gets its own trait so services can depend on exactly the
//! calls they make. [`HttpApi`] implements all of them over `reqwest`; the
//! `mock` module provides `mockall` doubles for tests.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::api::errors::ApiResult;
use crate::domain::activity::{Activity, NewActivity};
use crate::domain::announcement::{
    Announcement, AnnouncementUpdate, NewAnnouncement, UserAnnouncement,
};
use crate::domain::audit_log::AuditLog;
use crate::domain::controller::{
    ApplicationDecision, Controller, ControllerApplication, ControllerRating, ControllerRecord,
    RatingUpdate,
};
use crate::domain::flight_plan::FlightPlan;
use crate::domain::online::{FlightPathPoint, OnlineClients};
use crate::domain::server::{ServerConfig, ServerInfo, ServerRatings};
use crate::domain::ticket::{NewTicket, Ticket};
use crate::domain::types::{
    ActivityId, AnnouncementId, ApplicationId, FacilityId, PilotId, RecordId, TicketId, Uid,
};
use crate::domain::user::{Availability, LoginData, User, UserHistory};
use crate::dto::api::{ImageUpload, PageData, PageQuery, UploadedFile};
use crate::forms::activity::PilotSignPayload;
use crate::forms::controller::{ApplicationPayload, RecordPayload};
use crate::forms::user::{
    EmailCodeForm, LoginForm, ProfileUpdate, RegisterPayload, ResetPasswordForm,
};

pub mod activity;
pub mod announcement;
pub mod audit_log;
pub mod controller;
pub mod errors;
pub mod file;
pub mod flight_plan;
pub mod http;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;
pub mod online;
pub mod server;
pub mod ticket;
pub mod user;

pub use http::{BearerToken, HttpApi};

#[async_trait]
pub trait UserApi: Send + Sync {
    async fn login(&self, form: &LoginForm) -> ApiResult<LoginData>;
    /// Exchanges a flush token for a fresh access token.
    async fn refresh_session(&self, flush_token: &str, first: bool) -> ApiResult<LoginData>;
    /// Fetches the caller's profile using an explicit access token.
    async fn profile_with_token(&self, token: &str) -> ApiResult<User>;
    async fn register(&self, payload: &RegisterPayload) -> ApiResult<()>;
    async fn send_email_code(&self, form: &EmailCodeForm) -> ApiResult<()>;
    async fn reset_password(&self, form: &ResetPasswordForm) -> ApiResult<()>;
    async fn current_profile(&self) -> ApiResult<User>;
    async fn update_current_profile(&self, update: &ProfileUpdate) -> ApiResult<()>;
    async fn get_profile(&self, uid: Uid) -> ApiResult<User>;
    async fn update_profile(&self, uid: Uid, update: &ProfileUpdate) -> ApiResult<()>;
    async fn update_permission(
        &self,
        uid: Uid,
        changes: &BTreeMap<String, bool>,
    ) -> ApiResult<()>;
    async fn list_users(&self, page: PageQuery) -> ApiResult<PageData<User>>;
    async fn check_availability(&self, field: &Availability) -> ApiResult<bool>;
    async fn history(&self) -> ApiResult<UserHistory>;
}

#[async_trait]
pub trait ActivityApi: Send + Sync {
    /// Activities of the month containing `time` (`YYYY-MM-DD`).
    async fn list_activities(&self, time: &str) -> ApiResult<Vec<Activity>>;
    async fn list_activity_page(&self, page: PageQuery) -> ApiResult<PageData<Activity>>;
    async fn get_activity(&self, id: ActivityId) -> ApiResult<Activity>;
    async fn create_activity(&self, activity: &NewActivity) -> ApiResult<()>;
    async fn update_activity(&self, id: ActivityId, activity: &NewActivity) -> ApiResult<()>;
    async fn delete_activity(&self, id: ActivityId) -> ApiResult<()>;
    async fn sign_pilot(&self, id: ActivityId, payload: &PilotSignPayload) -> ApiResult<()>;
    async fn cancel_pilot(&self, id: ActivityId) -> ApiResult<()>;
    async fn sign_controller(&self, id: ActivityId, facility: FacilityId) -> ApiResult<()>;
    async fn cancel_controller(&self, id: ActivityId, facility: FacilityId) -> ApiResult<()>;
    async fn update_activity_status(&self, id: ActivityId, status: i32) -> ApiResult<()>;
    async fn update_pilot_status(
        &self,
        id: ActivityId,
        pilot: PilotId,
        status: i32,
    ) -> ApiResult<()>;
}

#[async_trait]
pub trait ControllerApi: Send + Sync {
    async fn list_controllers(&self, page: PageQuery) -> ApiResult<PageData<Controller>>;
    async fn list_ratings(&self, page: PageQuery) -> ApiResult<PageData<ControllerRating>>;
    async fn own_records(&self, page: PageQuery) -> ApiResult<PageData<ControllerRecord>>;
    async fn records(&self, uid: Uid, page: PageQuery) -> ApiResult<PageData<ControllerRecord>>;
    async fn create_record(&self, uid: Uid, record: &RecordPayload) -> ApiResult<()>;
    async fn delete_record(&self, uid: Uid, record: RecordId) -> ApiResult<()>;
    async fn update_rating(&self, uid: Uid, update: &RatingUpdate) -> ApiResult<()>;
    /// The caller's pending application, `None` when there is none.
    async fn own_application(&self) -> ApiResult<Option<ControllerApplication>>;
    async fn submit_application(&self, application: &ApplicationPayload) -> ApiResult<()>;
    async fn cancel_application(&self) -> ApiResult<()>;
    async fn list_applications(
        &self,
        page: PageQuery,
    ) -> ApiResult<PageData<ControllerApplication>>;
    async fn decide_application(
        &self,
        id: ApplicationId,
        decision: &ApplicationDecision,
    ) -> ApiResult<()>;
}

#[async_trait]
pub trait FlightPlanApi: Send + Sync {
    async fn own_plan(&self) -> ApiResult<Option<FlightPlan>>;
    async fn delete_own_plan(&self) -> ApiResult<()>;
    async fn list_plans(&self, page: PageQuery) -> ApiResult<PageData<FlightPlan>>;
    async fn submit_plan(&self, plan: &FlightPlan) -> ApiResult<()>;
    async fn delete_plan(&self, cid: i32) -> ApiResult<()>;
    async fn set_plan_lock(&self, cid: i32, locked: bool) -> ApiResult<()>;
}

#[async_trait]
pub trait TicketApi: Send + Sync {
    async fn own_tickets(&self, page: PageQuery) -> ApiResult<PageData<Ticket>>;
    async fn list_tickets(&self, page: PageQuery) -> ApiResult<PageData<Ticket>>;
    async fn create_ticket(&self, ticket: &NewTicket) -> ApiResult<()>;
    async fn reply_ticket(&self, id: TicketId, reply: &str) -> ApiResult<()>;
    async fn delete_ticket(&self, id: TicketId) -> ApiResult<()>;
}

#[async_trait]
pub trait AnnouncementApi: Send + Sync {
    async fn list_announcements(&self, page: PageQuery)
    -> ApiResult<PageData<UserAnnouncement>>;
    async fn list_announcement_details(
        &self,
        page: PageQuery,
    ) -> ApiResult<PageData<Announcement>>;
    async fn create_announcement(&self, announcement: &NewAnnouncement) -> ApiResult<()>;
    async fn update_announcement(
        &self,
        id: AnnouncementId,
        update: &AnnouncementUpdate,
    ) -> ApiResult<()>;
    async fn delete_announcement(&self, id: AnnouncementId) -> ApiResult<()>;
}

#[async_trait]
pub trait OnlineApi: Send + Sync {
    async fn online_clients(&self) -> ApiResult<OnlineClients>;
    async fn flight_path(&self, callsign: &str) -> ApiResult<Vec<FlightPathPoint>>;
    async fn send_message(&self, callsign: &str, message: &str) -> ApiResult<()>;
    async fn broadcast(&self, target: &str, message: &str) -> ApiResult<()>;
    async fn kick(&self, callsign: &str, reason: &str) -> ApiResult<()>;
}

#[async_trait]
pub trait ServerApi: Send + Sync {
    async fn server_info(&self) -> ApiResult<ServerInfo>;
    async fn server_ratings(&self) -> ApiResult<ServerRatings>;
    async fn server_config(&self) -> ApiResult<ServerConfig>;
}

#[async_trait]
pub trait AuditLogApi: Send + Sync {
    async fn list_audit_logs(&self, page: PageQuery) -> ApiResult<PageData<AuditLog>>;
}

#[async_trait]
pub trait FileApi: Send + Sync {
    async fn upload_image(&self, image: &ImageUpload) -> ApiResult<UploadedFile>;
}
