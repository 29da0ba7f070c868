//! Command-line front end over the services.

mod commands;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::api::HttpApi;
use crate::api::errors::ApiError;
use crate::domain::user::User;
use crate::dto::api::PageQuery;
use crate::middleware::{AccessDecision, guard};
use crate::models::config::ClientConfig;
use crate::services::{ServiceError, ServiceResult};
use crate::session::{FileTokenStorage, MemoryTokenStorage, Session, TokenStorage};

/// Top-level CLI for the community portal.
#[derive(Debug, Parser)]
#[command(name = "atc-portal")]
#[command(about = "Client for the virtual ATC community platform", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Log in with a username, email or CID.
    Login {
        username: String,
        #[arg(long, env = "ATC_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session.
    Logout,

    /// Create a new account.
    Register {
        username: String,
        email: String,
        cid: i32,
        /// Code mailed by `send-code`.
        #[arg(long)]
        code: String,
        #[arg(long, env = "ATC_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Mail a verification code.
    SendCode { email: String, cid: i32 },

    /// Reset a forgotten password with a mailed code.
    ResetPassword {
        email: String,
        #[arg(long)]
        code: String,
        #[arg(long, env = "ATC_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Show the signed-in user.
    Whoami,

    /// List the permission nodes of the signed-in user.
    Permissions,

    /// Show connection history.
    History,

    /// Change the password of the signed-in user.
    ChangePassword {
        #[arg(long, env = "ATC_PASSWORD", hide_env_values = true)]
        old: String,
        #[arg(long, env = "ATC_NEW_PASSWORD", hide_env_values = true)]
        new: String,
    },

    /// Show the activity calendar of a month.
    Calendar {
        /// Any day of the month, `YYYY-MM-DD`; today when omitted.
        #[arg(long)]
        month: Option<NaiveDate>,
    },

    /// Show one activity.
    Activity { id: i32 },

    /// Sign up for an activity as a pilot.
    Sign {
        id: i32,
        callsign: String,
        aircraft: String,
    },

    /// Cancel a pilot sign-up.
    Unsign { id: i32 },

    /// Search known airports by ICAO prefix.
    Airports {
        #[arg(default_value = "")]
        query: String,
    },

    /// Show pilots and controllers currently online.
    Online,

    /// Show the recorded track of an online pilot.
    Path { callsign: String },

    /// List announcements.
    Announcements {
        #[arg(long, default_value = "1")]
        page: usize,
    },

    /// Show server statistics and the online-time ranking.
    Server,

    /// List controller ratings.
    Ratings {
        #[arg(long, default_value = "1")]
        page: usize,
    },

    /// Show or withdraw the filed flight plan.
    Plan {
        #[arg(long)]
        delete: bool,
    },

    /// List tickets; `--all` lists every member's tickets.
    Tickets {
        #[arg(long)]
        all: bool,
        #[arg(long, default_value = "1")]
        page: usize,
    },

    /// Open a ticket.
    Ticket {
        /// 0 suggestion, 1 bug, 2 complaint, 3 praise, 4 other.
        #[arg(long, default_value = "4")]
        kind: i32,
        title: String,
        content: String,
    },

    /// Reply to and close a ticket.
    Reply { id: i32, reply: String },

    /// List registered users.
    Users {
        #[arg(long, default_value = "1")]
        page: usize,
    },

    /// List audit log entries.
    Audit {
        #[arg(long, default_value = "1")]
        page: usize,
    },

    /// Send a private message to an online client.
    Message { callsign: String, message: String },

    /// Send a message to every client matching the target.
    Broadcast { target: String, message: String },

    /// Disconnect a client from the server.
    Kick { callsign: String, reason: String },

    /// Upload an image and print its access path.
    Upload { path: PathBuf },
}

impl CliCommand {
    /// Page whose access rule governs this command.
    pub fn route(&self) -> &'static str {
        match self {
            CliCommand::Login { .. }
            | CliCommand::Logout
            | CliCommand::Register { .. }
            | CliCommand::SendCode { .. }
            | CliCommand::ResetPassword { .. } => "/login",
            CliCommand::Whoami
            | CliCommand::Permissions
            | CliCommand::History
            | CliCommand::ChangePassword { .. }
            | CliCommand::Upload { .. } => "/profile",
            CliCommand::Calendar { .. } | CliCommand::Airports { .. } => "/activities",
            CliCommand::Activity { .. } | CliCommand::Sign { .. } | CliCommand::Unsign { .. } => {
                "/activities/:id"
            }
            CliCommand::Online | CliCommand::Path { .. } => "/online-map",
            CliCommand::Ratings { .. } => "/controller",
            CliCommand::Announcements { .. }
            | CliCommand::Server
            | CliCommand::Plan { .. }
            | CliCommand::Tickets { all: false, .. }
            | CliCommand::Ticket { .. } => "/home",
            CliCommand::Tickets { all: true, .. }
            | CliCommand::Reply { .. }
            | CliCommand::Users { .. }
            | CliCommand::Audit { .. }
            | CliCommand::Message { .. }
            | CliCommand::Broadcast { .. }
            | CliCommand::Kick { .. } => "/admin",
        }
    }

    /// Runs the command after the access guard admits it.
    pub async fn run(self, context: &Context) -> ServiceResult<()> {
        let user = context.session.user().await;
        match guard(user.as_ref(), self.route()) {
            AccessDecision::Allow => {}
            AccessDecision::RedirectToLogin { .. } => return Err(ServiceError::Unauthorized),
            AccessDecision::Forbidden(node) => return Err(ServiceError::Forbidden(node)),
        }

        let result = commands::dispatch(self, context, user.as_ref()).await;
        if let Err(ServiceError::Api(ApiError::Unauthorized(_))) = &result {
            context.session.logout().await;
        }
        result
    }
}

/// Shared handles every command runs against.
pub struct Context {
    pub config: ClientConfig,
    pub api: HttpApi,
    pub session: Session,
}

impl Context {
    /// Builds the client and restores any stored session.
    pub async fn connect(config: ClientConfig) -> ServiceResult<Self> {
        let api = HttpApi::new(&config)?;
        let storage: Arc<dyn TokenStorage> = match config.token_path() {
            Some(path) => Arc::new(FileTokenStorage::new(path)),
            None => {
                log::warn!("No config directory found, the session will not be kept");
                Arc::new(MemoryTokenStorage::new())
            }
        };
        let session = Session::new(Arc::new(api.clone()), storage, api.bearer().clone());
        if let Err(err) = session.init().await {
            log::error!("Failed to restore session: {err}");
        }
        Ok(Self {
            config,
            api,
            session,
        })
    }

    pub fn page(&self, page: usize) -> PageQuery {
        PageQuery::new(page, self.config.page_size)
    }

    pub async fn user(&self) -> Option<User> {
        self.session.user().await
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsStr;

    use clap::CommandFactory;

    use super::*;

    fn parse(args: &[&str]) -> CliCommand {
        Cli::try_parse_from(args).unwrap().command
    }

    #[test]
    fn parses_calendar_month() {
        match parse(&["atc-portal", "calendar", "--month", "2025-03-01"]) {
            CliCommand::Calendar { month } => {
                assert_eq!(month, NaiveDate::from_ymd_opt(2025, 3, 1));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_sign_up() {
        match parse(&["atc-portal", "sign", "7", "CES2352", "A320"]) {
            CliCommand::Sign {
                id,
                callsign,
                aircraft,
            } => {
                assert_eq!(id, 7);
                assert_eq!(callsign, "CES2352");
                assert_eq!(aircraft, "A320");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn paged_commands_default_to_first_page() {
        assert!(matches!(
            parse(&["atc-portal", "users"]),
            CliCommand::Users { page: 1 }
        ));
        assert!(matches!(
            parse(&["atc-portal", "tickets", "--all", "--page", "3"]),
            CliCommand::Tickets { all: true, page: 3 }
        ));
    }

    #[test]
    fn commands_map_to_guarded_pages() {
        assert_eq!(parse(&["atc-portal", "whoami"]).route(), "/profile");
        assert_eq!(parse(&["atc-portal", "online"]).route(), "/online-map");
        assert_eq!(
            parse(&["atc-portal", "kick", "CCA1234", "testing"]).route(),
            "/admin"
        );
        assert_eq!(parse(&["atc-portal", "tickets"]).route(), "/home");
    }

    #[test]
    fn passwords_can_come_from_hidden_env_values() {
        let command = Cli::command();
        let change = command
            .find_subcommand("change-password")
            .expect("change-password subcommand");
        for (id, env) in [("old", "ATC_PASSWORD"), ("new", "ATC_NEW_PASSWORD")] {
            let arg = change
                .get_arguments()
                .find(|arg| arg.get_id() == id)
                .expect("password argument");
            assert_eq!(arg.get_env(), Some(OsStr::new(env)));
            assert!(arg.is_hide_env_values_set());
        }
    }

    #[test]
    fn rejects_malformed_month() {
        assert!(Cli::try_parse_from(["atc-portal", "calendar", "--month", "March"]).is_err());
    }
}
