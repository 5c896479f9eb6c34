//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components read shared session and auth state from Leptos context
//! providers installed by `app::App`.

pub mod require_auth;
