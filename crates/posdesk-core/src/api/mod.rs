//! HTTP access to the point-of-sale backend.
//!
//! - `Gateway`: the single outbound path, with an ordered `Middleware` pipeline
//!   and a pluggable `Transport`
//! - `middleware`: bearer credentials, 401 logout-and-redirect, request logging
//! - `ApiClient`: typed endpoint functions on top of the gateway
//!
//! The API uses JWT bearer tokens obtained from `/auth/login`.

pub mod client;
pub mod error;
pub mod gateway;
pub mod middleware;

#[cfg(test)]
pub(crate) mod mock;

pub use client::ApiClient;
pub use error::ApiError;
pub use gateway::{ApiRequest, ApiResponse, Flow, Gateway, Middleware, ReqwestTransport, Transport};
pub use middleware::{BearerAuth, LogoutOnUnauthorized, RequestLog};
