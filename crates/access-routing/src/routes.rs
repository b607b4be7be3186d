//! Route table and path handling.

use inventory_types::Role;
use serde::Serialize;

pub const LOGIN_PATH: &str = "/login";
pub const ADMIN_LANDING: &str = "/dashboard";
pub const LOGISTIK_LANDING: &str = "/logistik/dashboard";
pub const USER_LANDING: &str = "/user/dashboard";

/// Who may open a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "role")]
pub enum RouteAccess {
    /// Open to everyone.
    Public,
    /// Any signed-in user.
    AnyAuthenticated,
    /// Area of one non-admin role. Admin-like roles may enter too.
    RoleArea(Role),
    /// Admin-like roles only.
    AdminOnly,
    /// Roles on the privileged allow-list only.
    Privileged,
}

/// Path prefix and its access class.
const ROUTES: &[(&str, RouteAccess)] = &[
    (LOGIN_PATH, RouteAccess::Public),
    ("/profile", RouteAccess::AnyAuthenticated),
    ("/user", RouteAccess::AnyAuthenticated),
    ("/logistik", RouteAccess::RoleArea(Role::Logistik)),
    ("/dashboard", RouteAccess::AdminOnly),
    ("/assets", RouteAccess::AdminOnly),
    ("/usage-logs", RouteAccess::AdminOnly),
    ("/transfers", RouteAccess::AdminOnly),
    ("/stock-opname", RouteAccess::AdminOnly),
    ("/reports", RouteAccess::AdminOnly),
    ("/labs", RouteAccess::Privileged),
    ("/users", RouteAccess::Privileged),
];

/// Split a navigation target into its normalized path and query.
///
/// The fragment is dropped, empty segments collapse, and the trailing
/// slash goes away: `"assets//12/?tab=log#x"` → `("/assets/12", Some("tab=log"))`.
pub fn split_target(target: &str) -> (String, Option<&str>) {
    let without_fragment = target.split('#').next().unwrap_or_default();
    let (raw_path, query) = match without_fragment.split_once('?') {
        Some((path, query)) if !query.is_empty() => (path, Some(query)),
        Some((path, _)) => (path, None),
        None => (without_fragment, None),
    };

    let segments: Vec<&str> = raw_path.split('/').filter(|s| !s.is_empty()).collect();
    (format!("/{}", segments.join("/")), query)
}

/// Normalized path of a navigation target, without query or fragment.
pub fn normalize_path(target: &str) -> String {
    split_target(target).0
}

/// Segment-wise prefix match: `/assets` covers `/assets` and `/assets/3`
/// but not `/assets-archive`.
fn matches_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Access class of a path. Unknown paths need any signed-in user.
pub fn access_for(path: &str) -> RouteAccess {
    let path = normalize_path(path);
    ROUTES
        .iter()
        .filter(|(prefix, _)| matches_prefix(&path, prefix))
        .max_by_key(|(prefix, _)| prefix.len())
        .map(|(_, access)| access.clone())
        .unwrap_or(RouteAccess::AnyAuthenticated)
}

/// Where a role lands after login or after being turned away.
pub fn landing_route(role: &Role) -> &'static str {
    if role.is_admin_like() {
        return ADMIN_LANDING;
    }
    match role {
        Role::Logistik => LOGISTIK_LANDING,
        _ => USER_LANDING,
    }
}
