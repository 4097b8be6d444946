//! sheetxml-server
//!
//! axum adapter over `sheetxml-core`: configuration, session checks, routes,
//! and error mapping. All conversion work happens in the core crate.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod telemetry;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use routes::{router, AppState};
