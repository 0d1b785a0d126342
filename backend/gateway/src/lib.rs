//! Appify Gateway HTTP API Server
//!
//! JSON endpoints the host shell calls to open pages, submit turns and fetch
//! the generated app.

pub mod auth;
pub mod error;
pub mod routes;
pub mod server;
pub mod session_registry;

pub use server::{build_router, start_server, GatewayState};
pub use session_registry::SessionRegistry;
