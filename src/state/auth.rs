//! Auth-session state for the current console operator.
//!
//! SYSTEM CONTEXT
//! ==============
//! Used by the route guard and user-aware components to coordinate login
//! redirects and identity-dependent rendering. Session logic writes it; the
//! guard only reads it.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use crate::net::types::User;

/// Whether the session has been checked, and with what result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthStatus {
    /// Not yet checked this page load.
    #[default]
    Unknown,
    Authenticated,
    Unauthenticated,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthState {
    pub status: AuthStatus,
    pub user: Option<User>,
    /// A session-verification call is outstanding.
    pub verifying: bool,
}

impl AuthState {
    /// Starting state for a page load, given whether credentials were found in storage.
    ///
    /// With no stored pair there is nothing to verify, so the status is
    /// already known. With a pair, it stays `Unknown` until verified.
    pub fn initial(has_stored_credentials: bool) -> Self {
        let status = if has_stored_credentials { AuthStatus::Unknown } else { AuthStatus::Unauthenticated };
        Self { status, user: None, verifying: false }
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == AuthStatus::Authenticated
    }

    pub fn begin_verification(&mut self) {
        self.verifying = true;
    }

    /// Record a verified (or freshly logged-in) operator. `None` keeps any
    /// user already known.
    pub fn authenticate(&mut self, user: Option<User>) {
        self.status = AuthStatus::Authenticated;
        if user.is_some() {
            self.user = user;
        }
        self.verifying = false;
    }

    pub fn deauthenticate(&mut self) {
        self.status = AuthStatus::Unauthenticated;
        self.user = None;
        self.verifying = false;
    }
}
