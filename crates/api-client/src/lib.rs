//! HTTP client adapter for the inventory JSON API.
//!
//! Every request goes to a fixed base address with `Accept:
//! application/json` and, when a token is stored, `Authorization: Bearer`.
//! Any 401 response is reported to the injected [`AuthFailureHandler`]
//! before the failure is returned to the caller.

mod client;
mod error;
#[cfg(feature = "test-util")]
pub mod testing;

pub use client::{ApiClient, ApiResponse, AuthFailureHandler, RequestOptions};
pub use error::{ApiResult, FailureKind, RequestFailure};
pub use reqwest::Method;
