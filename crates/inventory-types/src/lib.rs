//! Shared data model for the labinv client.
//!
//! - [`User`]: the profile snapshot returned by `/login` and `/me`
//! - [`LabRef`]: the nested lab object some endpoints embed in a user
//! - [`Role`]: the flat role classification and its admin-like set
//! - [`SessionStatus`]: bootstrapping, authenticated or anonymous

mod role;
mod status;
mod user;

pub use role::{Role, ADMIN_LIKE_ROLES};
pub use status::SessionStatus;
pub use user::{LabRef, User};
