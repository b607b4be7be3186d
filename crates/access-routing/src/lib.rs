//! Protected routing contract for the labinv client.
//!
//! - [`guard`]: decide whether a target path renders, waits, or redirects
//! - [`navigation_for`]: the ordered menu a role gets to see
//! - [`landing_route`]: where each role lands after login
//!
//! Everything here is a pure function of the session snapshot.

mod guard;
mod navigation;
mod policy;
mod routes;

pub use guard::{
    guard, login_redirect_target, post_login_destination, return_to_from_query, GuardDecision,
};
pub use navigation::{navigation_for, NavEntry};
pub use policy::{AccessPolicy, DEFAULT_PRIVILEGED_ROLES};
pub use routes::{
    access_for, landing_route, normalize_path, split_target, RouteAccess, ADMIN_LANDING,
    LOGIN_PATH, LOGISTIK_LANDING, USER_LANDING,
};
