//! Single-flight credential renewal.
//!
//! ARCHITECTURE
//! ============
//! The first caller to need a renewal sets the in-progress flag and issues the
//! one renewal call. Everyone who arrives while the flag is set parks a
//! oneshot sender in a FIFO queue and awaits the shared outcome.
//!
//! Scheduling is single-threaded and cooperative: the flag check and set run
//! with no `.await` between them, so no lock is needed.
//!
//! ERROR HANDLING
//! ==============
//! A failed renewal rejects every waiter, clears the credential store, and
//! fires the session-lost hook. The flag is released by a drop guard, so a
//! renewal future that is dropped mid-flight cannot wedge the coordinator.

#[cfg(test)]
#[path = "refresh_test.rs"]
mod refresh_test;

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use futures::channel::oneshot;

use super::credentials::{CredentialPair, CredentialStore};
use crate::net::transport::Transport;
use crate::net::types::{ApiRequest, RenewalResponse};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum RefreshError {
    #[error("no refresh credential stored")]
    MissingRefreshToken,
    #[error("renewal rejected with status {status}")]
    Rejected { status: u16 },
    #[error("renewal request failed: {0}")]
    Transport(String),
    #[error("renewal response unusable: {0}")]
    InvalidResponse(String),
    #[error("renewal abandoned before it completed")]
    Abandoned,
}

type Waiter = oneshot::Sender<Result<CredentialPair, RefreshError>>;

/// Called once per failed renewal, after the store has been cleared.
pub type SessionLostHook = Rc<dyn Fn(&RefreshError)>;

pub struct RefreshCoordinator {
    store: Rc<CredentialStore>,
    transport: Rc<dyn Transport>,
    endpoint: String,
    on_session_lost: SessionLostHook,
    in_progress: Cell<bool>,
    waiters: RefCell<VecDeque<Waiter>>,
}

impl RefreshCoordinator {
    pub fn new(
        store: Rc<CredentialStore>,
        transport: Rc<dyn Transport>,
        endpoint: impl Into<String>,
        on_session_lost: SessionLostHook,
    ) -> Self {
        Self {
            store,
            transport,
            endpoint: endpoint.into(),
            on_session_lost,
            in_progress: Cell::new(false),
            waiters: RefCell::new(VecDeque::new()),
        }
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_progress.get()
    }

    /// Callers currently parked behind the in-flight renewal.
    pub fn pending_len(&self) -> usize {
        self.waiters.borrow().len()
    }

    /// Obtain a renewed pair, joining the in-flight renewal if there is one.
    ///
    /// # Errors
    ///
    /// Returns the renewal failure shared by every caller of this cycle.
    pub async fn renew(&self) -> Result<CredentialPair, RefreshError> {
        if self.in_progress.get() {
            let (tx, rx) = oneshot::channel();
            self.waiters.borrow_mut().push_back(tx);
            return rx.await.unwrap_or(Err(RefreshError::Abandoned));
        }

        self.in_progress.set(true);
        let _guard = InProgressGuard { coordinator: self };
        log::debug!("credential renewal started");

        let outcome = self.issue_renewal().await;
        match &outcome {
            Ok(pair) => {
                self.store.set(Some(pair.clone()));
                log::debug!("credential renewal succeeded");
            }
            Err(e) => {
                self.store.clear();
                log::warn!("credential renewal failed, session lost: {e}");
            }
        }

        let waiters = std::mem::take(&mut *self.waiters.borrow_mut());
        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }

        if let Err(e) = &outcome {
            (self.on_session_lost)(e);
        }
        outcome
    }

    async fn issue_renewal(&self) -> Result<CredentialPair, RefreshError> {
        let refresh_token = self.store.refresh_token().ok_or(RefreshError::MissingRefreshToken)?;
        let request =
            ApiRequest::post(self.endpoint.as_str()).json(serde_json::json!({ "refreshToken": refresh_token }));

        let response = self
            .transport
            .send(&request)
            .await
            .map_err(|e| RefreshError::Transport(e.to_string()))?;
        if !response.ok() {
            return Err(RefreshError::Rejected { status: response.status });
        }

        let renewed: RenewalResponse = serde_json::from_str(&response.body)
            .map_err(|e| RefreshError::InvalidResponse(e.to_string()))?;
        let next_refresh = renewed.refresh_token.unwrap_or(refresh_token);
        CredentialPair::new(renewed.access_token, next_refresh)
            .ok_or_else(|| RefreshError::InvalidResponse("empty credential".to_owned()))
    }
}

struct InProgressGuard<'a> {
    coordinator: &'a RefreshCoordinator,
}

impl Drop for InProgressGuard<'_> {
    fn drop(&mut self) {
        self.coordinator.in_progress.set(false);
        // Non-empty only when the renewal future was dropped before settling.
        let stranded = std::mem::take(&mut *self.coordinator.waiters.borrow_mut());
        for waiter in stranded {
            let _ = waiter.send(Err(RefreshError::Abandoned));
        }
    }
}
