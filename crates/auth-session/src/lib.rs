//! Client session lifecycle for the labinv inventory client.
//!
//! This crate provides:
//! - An explicit FSM for `bootstrapping`, `authenticated` and `anonymous`
//! - `SessionManager`: bootstrap from the persisted record, login, logout
//! - Global invalidation of the session on any 401 seen by the API client
//! - Broadcast session events for UI layers

mod auth_fsm;
mod error;
mod manager;

pub use auth_fsm::session_machine;
pub use auth_fsm::{SessionMachine, SessionMachineInput, SessionMachineState};
pub use error::{AuthError, AuthResult};
pub use inventory_types::SessionStatus;
pub use manager::{SessionEvent, SessionManager, SessionSnapshot};
