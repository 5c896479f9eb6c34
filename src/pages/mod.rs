//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns route-scoped orchestration. Protected pages are wrapped in
//! `RequireAuth` by the router, so they can assume a verified session.

pub mod dashboard;
pub mod login;
