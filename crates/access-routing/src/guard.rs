//! Route guard: may the current session open a target path?

use crate::routes::{access_for, landing_route, split_target, RouteAccess, LOGIN_PATH};
use crate::AccessPolicy;
use inventory_types::{Role, SessionStatus, User};
use serde::Serialize;
use tracing::debug;
use url::form_urlencoded;

/// Outcome of evaluating a navigation target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "decision")]
pub enum GuardDecision {
    /// Session not settled yet; show a placeholder, do not redirect.
    Loading,
    /// Not signed in; go to the login screen and come back afterwards.
    RedirectToLogin { return_to: String },
    /// Signed in but not allowed here.
    Redirect { to: String },
    Render,
}

impl GuardDecision {
    pub fn is_render(&self) -> bool {
        matches!(self, GuardDecision::Render)
    }

    /// Path to navigate to, if this decision redirects.
    pub fn redirect_target(&self) -> Option<String> {
        match self {
            GuardDecision::RedirectToLogin { return_to } => Some(login_redirect_target(return_to)),
            GuardDecision::Redirect { to } => Some(to.clone()),
            GuardDecision::Loading | GuardDecision::Render => None,
        }
    }
}

/// Evaluate `target` with the default privileged allow-list.
pub fn guard(status: SessionStatus, user: Option<&User>, target: &str) -> GuardDecision {
    AccessPolicy::default().guard(status, user, target)
}

impl AccessPolicy {
    /// Evaluate `target` for a session in `status` held by `user`.
    pub fn guard(&self, status: SessionStatus, user: Option<&User>, target: &str) -> GuardDecision {
        let (path, query) = split_target(target);
        let access = access_for(&path);

        let decision = match status {
            SessionStatus::Bootstrapping => GuardDecision::Loading,
            SessionStatus::Anonymous => match access {
                RouteAccess::Public => GuardDecision::Render,
                _ => GuardDecision::RedirectToLogin {
                    return_to: match query {
                        Some(query) => format!("{}?{}", path, query),
                        None => path.clone(),
                    },
                },
            },
            SessionStatus::Authenticated => {
                let role = user.map(User::role).unwrap_or_default();
                self.authorize(&role, &access)
            }
        };

        if !matches!(decision, GuardDecision::Render | GuardDecision::Loading) {
            debug!(path = %path, status = %status, decision = ?decision, "Route guard redirect");
        }
        decision
    }

    fn authorize(&self, role: &Role, access: &RouteAccess) -> GuardDecision {
        let allowed = match access {
            // Signed-in users have no business on the login screen.
            RouteAccess::Public => false,
            RouteAccess::AnyAuthenticated => true,
            RouteAccess::RoleArea(owner) => role == owner || role.is_admin_like(),
            RouteAccess::AdminOnly => role.is_admin_like(),
            RouteAccess::Privileged => self.is_privileged(role),
        };

        if allowed {
            GuardDecision::Render
        } else {
            GuardDecision::Redirect {
                to: landing_route(role).to_string(),
            }
        }
    }

    /// Where to go right after a successful login.
    ///
    /// `from` is the path the user was bounced from. It is honoured only
    /// when it is a local path this user may open; otherwise the landing
    /// route of the user's role is used.
    pub fn post_login_destination(&self, user: &User, from: Option<&str>) -> String {
        let landing = landing_route(&user.role()).to_string();
        let Some(from) = from.filter(|f| is_local_path(f)) else {
            return landing;
        };

        match self.guard(SessionStatus::Authenticated, Some(user), from) {
            GuardDecision::Render => from.to_string(),
            _ => landing,
        }
    }
}

/// [`AccessPolicy::post_login_destination`] with the default policy.
pub fn post_login_destination(user: &User, from: Option<&str>) -> String {
    AccessPolicy::default().post_login_destination(user, from)
}

/// Login URL carrying the path to return to: `/login?from=%2Fassets`.
pub fn login_redirect_target(return_to: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(return_to.as_bytes()).collect();
    format!("{}?from={}", LOGIN_PATH, encoded)
}

/// Read the `from` parameter back out of a login URL's query string.
pub fn return_to_from_query(query: &str) -> Option<String> {
    form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .find(|(key, _)| key == "from")
        .map(|(_, value)| value.into_owned())
        .filter(|value| is_local_path(value))
}

/// Same-origin absolute path. Rejects `//host` and scheme URLs.
fn is_local_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.contains("://")
}
