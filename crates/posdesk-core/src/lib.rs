//! Core library for posdesk, a point-of-sale admin client.
//!
//! - `auth`: the shared session store and its persisted record
//! - `api`: the HTTP gateway, its middleware pipeline and the typed endpoint façade
//! - `router`: route table, navigation guard and the `Router` itself
//! - `app`: wiring of the above into one `App`
//! - `models`: DTOs exchanged with the backend
//! - `config`, `utils`: configuration and display helpers

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod models;
pub mod router;
pub mod utils;

pub use api::{ApiClient, ApiError, Gateway};
pub use app::App;
pub use auth::SessionStore;
pub use config::Config;
pub use router::{Route, RouteName, Router};
