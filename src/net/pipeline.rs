//! Decorated call dispatcher used for every remote call.
//!
//! ARCHITECTURE
//! ============
//! Each call is wrapped in a `Dispatch { request, attempt }` value. The
//! outgoing copy gets the current access credential; a 401 on the first
//! attempt hands off to the refresh coordinator and replays once.
//!
//! TRADE-OFFS
//! ==========
//! Only 401 is recovered. Every other non-2xx status is returned to the caller
//! untouched; retry policy for business errors belongs to the caller.

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod pipeline_test;

use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::types::{ApiRequest, ApiResponse};
use crate::session::SessionManager;

/// Replays allowed per original call after a 401.
pub const MAX_AUTH_RETRIES: u8 = 1;

/// A caller's request plus how many times it has been replayed.
#[derive(Clone, Debug, PartialEq)]
pub struct Dispatch {
    pub request: ApiRequest,
    pub attempt: u8,
}

impl Dispatch {
    pub fn new(request: ApiRequest) -> Self {
        Self { request, attempt: 0 }
    }

    pub fn can_retry(&self) -> bool {
        self.attempt < MAX_AUTH_RETRIES
    }

    #[must_use]
    pub fn retried(self) -> Self {
        Self { request: self.request, attempt: self.attempt + 1 }
    }
}

#[derive(Clone)]
pub struct ApiClient {
    session: Rc<SessionManager>,
}

impl ApiClient {
    pub fn new(session: Rc<SessionManager>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Send `request` with the current credential, recovering once from expiry.
    ///
    /// # Errors
    ///
    /// - `ApiError::Status` for any non-2xx answer, including a 401 that
    ///   survived renewal or whose renewal failed.
    /// - `ApiError::Transport` when no answer arrived.
    pub async fn dispatch(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let mut call = Dispatch::new(request);
        loop {
            let sent_with = self.session.credentials().access_token();
            let outgoing = call.request.with_bearer(sent_with.as_deref());
            let response = self.session.transport().send(&outgoing).await?;

            if !response.is_unauthorized() {
                return response.into_result();
            }
            if !call.can_retry() {
                log::debug!("{} still unauthorized after retry", call.request.path);
                return response.into_result();
            }
            call = call.retried();

            // A sibling call may already have renewed, or lost the session,
            // while this one was in flight.
            let current = self.session.credentials().access_token();
            if current != sent_with {
                if current.is_some() {
                    continue;
                }
                log::debug!("{} not replayed: session already lost", call.request.path);
                return response.into_result();
            }

            if let Err(e) = self.session.refresh().renew().await {
                log::debug!("{} not replayed: {e}", call.request.path);
                return response.into_result();
            }
        }
    }

    /// # Errors
    ///
    /// See [`ApiClient::dispatch`]; also `ApiError::Decode` for an unexpected body.
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        self.dispatch(request).await?.json()
    }

    /// # Errors
    ///
    /// See [`ApiClient::send_json`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send_json(ApiRequest::get(path)).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::send_json`].
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let body = serde_json::to_value(body).map_err(|e| ApiError::Encode(e.to_string()))?;
        self.send_json(ApiRequest::post(path).json(body)).await
    }
}
