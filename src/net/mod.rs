//! Networking modules for the console's REST calls.
//!
//! SYSTEM CONTEXT
//! ==============
//! `pipeline` is the decorated dispatcher every call goes through, `api`
//! holds the auth endpoint helpers built on it, `transport` is the HTTP seam,
//! and `types` defines the request/response values and auth DTOs.

pub mod api;
pub mod error;
pub mod pipeline;
pub mod transport;
pub mod types;
