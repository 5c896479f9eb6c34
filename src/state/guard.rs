//! Route-guard state machine for protected views.
//!
//! SYSTEM CONTEXT
//! ==============
//! `RequireAuth` feeds this machine every time auth state, credential
//! presence, the initial-load timer, or verification progress changes, then
//! acts on the decision. Keeping the machine free of Leptos makes the
//! no-flash and no-loop guarantees testable directly.
//!
//! INVARIANTS
//! ==========
//! - No redirect before the initial-load window has elapsed.
//! - Session verification is requested at most once per guard lifetime
//!   (re-armed only after the guard has redirected).
//! - One redirect per entry into `Unauthenticated`.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use super::auth::AuthStatus;
use crate::util::redirect::login_href;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GuardPhase {
    #[default]
    Initializing,
    CheckingSession,
    Authenticated,
    Unauthenticated,
}

/// Snapshot of everything the guard decides on.
#[derive(Clone, Copy, Debug)]
pub struct GuardInput<'a> {
    pub auth: AuthStatus,
    pub has_credentials: bool,
    pub initial_window_elapsed: bool,
    pub verification_outstanding: bool,
    /// Path (with query) of the protected route being guarded.
    pub path: &'a str,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GuardView {
    #[default]
    Blank,
    Loading,
    Content,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardAction {
    /// Start the session-verification call.
    Verify,
    /// Navigate to this login href.
    Redirect(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuardDecision {
    pub view: GuardView,
    pub action: Option<GuardAction>,
}

#[derive(Clone, Debug)]
pub struct RouteGuard {
    login_path: String,
    phase: GuardPhase,
    verification_requested: bool,
    redirected: bool,
}

impl RouteGuard {
    pub fn new(login_path: impl Into<String>) -> Self {
        Self {
            login_path: login_path.into(),
            phase: GuardPhase::Initializing,
            verification_requested: false,
            redirected: false,
        }
    }

    pub fn phase(&self) -> GuardPhase {
        self.phase
    }

    pub fn evaluate(&mut self, input: &GuardInput<'_>) -> GuardDecision {
        if input.auth == AuthStatus::Authenticated {
            self.phase = GuardPhase::Authenticated;
            self.redirected = false;
            return GuardDecision { view: GuardView::Content, action: None };
        }

        if input.has_credentials {
            self.phase = GuardPhase::CheckingSession;
            self.redirected = false;
            let action = if self.verification_requested {
                None
            } else {
                self.verification_requested = true;
                Some(GuardAction::Verify)
            };
            let view = if input.verification_outstanding || action.is_some() {
                GuardView::Loading
            } else {
                GuardView::Blank
            };
            return GuardDecision { view, action };
        }

        if !input.initial_window_elapsed {
            let view = if input.verification_outstanding { GuardView::Loading } else { GuardView::Blank };
            return GuardDecision { view, action: None };
        }

        self.phase = GuardPhase::Unauthenticated;
        let action = if self.redirected {
            None
        } else {
            self.redirected = true;
            self.verification_requested = false;
            log::debug!("guard redirecting {} to login", input.path);
            Some(GuardAction::Redirect(login_href(&self.login_path, Some(input.path))))
        };
        GuardDecision { view: GuardView::Blank, action }
    }
}
