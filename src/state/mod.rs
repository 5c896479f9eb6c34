//! Client-side state machines and models.
//!
//! DESIGN
//! ======
//! Everything here is plain data driven by events, with no Leptos or browser
//! types, so pages and drivers stay thin and the rules stay testable.

pub mod auth;
pub mod guard;
pub mod polling;
