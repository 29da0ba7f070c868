//! Access guard run before a page or command is entered.

use url::form_urlencoded;

use crate::domain::permission::PermissionNode;
use crate::domain::user::User;

/// Path visitors are sent to when a page needs a signed-in user.
pub const LOGIN_PATH: &str = "/login";

/// Requirements a page places on the current session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AccessRule {
    pub require_auth: bool,
    pub require_permission: Option<PermissionNode>,
}

impl AccessRule {
    pub const PUBLIC: AccessRule = AccessRule {
        require_auth: false,
        require_permission: None,
    };

    pub const LOGIN: AccessRule = AccessRule {
        require_auth: true,
        require_permission: None,
    };

    /// Signed-in users holding `node`.
    pub const fn permission(node: PermissionNode) -> Self {
        Self {
            require_auth: true,
            require_permission: Some(node),
        }
    }

    pub fn evaluate(&self, user: Option<&User>, path: &str) -> AccessDecision {
        let needs_user = self.require_auth || self.require_permission.is_some();
        let Some(user) = user else {
            return if needs_user {
                AccessDecision::RedirectToLogin {
                    redirect: path.to_string(),
                }
            } else {
                AccessDecision::Allow
            };
        };
        match self.require_permission {
            Some(node) if !user.permission.has_permission(node) => {
                AccessDecision::Forbidden(node)
            }
            _ => AccessDecision::Allow,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    /// Send the visitor to [`LOGIN_PATH`], returning to `redirect` afterwards.
    RedirectToLogin { redirect: String },
    Forbidden(PermissionNode),
}

impl AccessDecision {
    /// Login URL carrying the requested path, e.g. `/login?redirect=%2Fprofile`.
    pub fn login_location(&self) -> Option<String> {
        match self {
            AccessDecision::RedirectToLogin { redirect } => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair("redirect", redirect)
                    .finish();
                Some(format!("{LOGIN_PATH}?{query}"))
            }
            _ => None,
        }
    }
}

/// A named page and the rule guarding it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub name: &'static str,
    pub rule: AccessRule,
}

pub const ROUTES: &[Route] = &[
    Route {
        path: "/",
        name: "Root",
        rule: AccessRule::LOGIN,
    },
    Route {
        path: "/home",
        name: "Home",
        rule: AccessRule::LOGIN,
    },
    Route {
        path: LOGIN_PATH,
        name: "Login",
        rule: AccessRule::PUBLIC,
    },
    Route {
        path: "/activities",
        name: "Activity",
        rule: AccessRule::PUBLIC,
    },
    Route {
        path: "/activities/:id",
        name: "ActivityDetail",
        rule: AccessRule::PUBLIC,
    },
    Route {
        path: "/online-map",
        name: "OnlineMap",
        rule: AccessRule::PUBLIC,
    },
    Route {
        path: "/controller",
        name: "Controller",
        rule: AccessRule::PUBLIC,
    },
    Route {
        path: "/admin",
        name: "Admin",
        rule: AccessRule::permission(PermissionNode::AdminEntry),
    },
    Route {
        path: "/profile",
        name: "Profile",
        rule: AccessRule::LOGIN,
    },
];

fn matches(pattern: &str, path: &str) -> bool {
    let pattern = pattern.trim_end_matches('/');
    let path = path.split(['?', '#']).next().unwrap_or(path).trim_end_matches('/');
    let mut pattern_parts = pattern.split('/');
    let mut path_parts = path.split('/');
    loop {
        match (pattern_parts.next(), path_parts.next()) {
            (None, None) => return true,
            (Some(expected), Some(actual)) => {
                let is_param = expected.starts_with(':') && !actual.is_empty();
                if !is_param && expected != actual {
                    return false;
                }
            }
            _ => return false,
        }
    }
}

/// The route registered for `path`, if any.
pub fn find_route(path: &str) -> Option<&'static Route> {
    ROUTES.iter().find(|route| matches(route.path, path))
}

/// Evaluates the rule of the route `path` belongs to; unknown paths are public.
pub fn guard(user: Option<&User>, path: &str) -> AccessDecision {
    let rule = find_route(path).map_or(AccessRule::PUBLIC, |route| route.rule);
    let decision = rule.evaluate(user, path);
    if decision != AccessDecision::Allow {
        log::debug!("Access to {path} denied: {decision:?}");
    }
    decision
}
