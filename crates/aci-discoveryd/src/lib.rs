//! ACI discovery daemon library
//!
//! This module provides the core components of the daemon:
//! - Configuration loading
//! - REST router and the discovery handler
//! - Server lifecycle management

#![deny(unsafe_code)]

pub mod api;
pub mod config;
pub mod error;
pub mod server;

pub use api::create_router;
pub use api::rest::state::AppState;
pub use config::DaemonConfig;
pub use error::{ApiError, DaemonError};
pub use server::Server;
