//! Auth endpoint helpers built on the request pipeline.
//!
//! ERROR HANDLING
//! ==============
//! Callers get `Result` outputs instead of panics so auth failures degrade UI
//! behavior without crashing the page. Login goes straight to the transport:
//! a 401 there means bad credentials, not an expired session.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use super::error::ApiError;
use super::pipeline::ApiClient;
use super::types::{ApiRequest, LoginRequest, LoginResponse, User};

impl ApiClient {
    /// Exchange operator credentials for a session and store the pair.
    ///
    /// Returns the user if the login response carried one.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` when the server rejects the login and
    /// `ApiError::InvalidCredentials` when it answers without a usable pair.
    pub async fn login(&self, username: &str, password: &str) -> Result<Option<User>, ApiError> {
        let session = self.session();
        let payload = LoginRequest { username: username.to_owned(), password: password.to_owned() };
        let body = serde_json::to_value(&payload).map_err(|e| ApiError::Encode(e.to_string()))?;
        let request = ApiRequest::post(session.config().endpoints.login.as_str()).json(body);

        let response = session.transport().send(&request).await?.into_result()?;
        let login: LoginResponse = response.json()?;
        let pair = login.credentials().ok_or(ApiError::InvalidCredentials)?;
        session.set_credentials(Some(pair));
        Ok(login.user)
    }

    /// Fetch the operator behind the stored session from the session endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is invalid or the server is unreachable.
    pub async fn fetch_current_user(&self) -> Result<User, ApiError> {
        let path = self.session().config().endpoints.session.clone();
        self.get(&path).await
    }

    /// Verify the stored session. Any failure clears the local credentials.
    ///
    /// # Errors
    ///
    /// Returns the verification failure after the session has been cleared.
    pub async fn verify_session(&self) -> Result<User, ApiError> {
        match self.fetch_current_user().await {
            Ok(user) => Ok(user),
            Err(e) => {
                log::warn!("session verification failed: {e}");
                self.session().clear_session();
                Err(e)
            }
        }
    }

    /// Notify the server (best-effort) and drop the local session.
    pub async fn logout(&self) {
        let path = self.session().config().endpoints.logout.clone();
        if self.session().credentials().has_session() {
            if let Err(e) = self.dispatch(ApiRequest::post(path)).await {
                log::debug!("logout request failed: {e}");
            }
        }
        self.session().clear_session();
    }
}
