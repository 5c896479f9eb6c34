//! Test doubles for the session seams.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;

use crate::config::SessionConfig;
use crate::net::error::TransportError;
use crate::net::pipeline::ApiClient;
use crate::net::transport::Transport;
use crate::net::types::{ApiRequest, ApiResponse};
use crate::session::credentials::CredentialPair;
use crate::session::storage::MemoryStorage;
use crate::session::{Navigator, SessionManager};

pub(crate) const USER_BODY: &str = r#"{"id":"u1","name":"Night Manager","email":null}"#;

/// What the fake renewal endpoint does when called.
#[derive(Clone, Debug)]
pub(crate) enum Renewal {
    /// Issue a new pair. `accept` controls whether business endpoints honor it.
    Issue { access: &'static str, refresh: Option<&'static str>, accept: bool },
    Reject(u16),
    NetworkDown,
}

/// In-process API: business endpoints accept exactly one bearer token.
pub(crate) struct FakeApi {
    config: SessionConfig,
    valid_token: RefCell<String>,
    renewal: RefCell<Renewal>,
    status_overrides: RefCell<HashMap<String, u16>>,
    slow_paths: RefCell<HashMap<String, usize>>,
    pub requests: RefCell<Vec<ApiRequest>>,
    pub renewals: Cell<usize>,
}

impl FakeApi {
    pub fn new(valid_token: &str, renewal: Renewal) -> Rc<Self> {
        Rc::new(Self {
            config: SessionConfig::default(),
            valid_token: RefCell::new(valid_token.to_owned()),
            renewal: RefCell::new(renewal),
            status_overrides: RefCell::new(HashMap::new()),
            slow_paths: RefCell::new(HashMap::new()),
            requests: RefCell::new(Vec::new()),
            renewals: Cell::new(0),
        })
    }

    pub fn override_status(&self, path: &str, status: u16) {
        self.status_overrides.borrow_mut().insert(path.to_owned(), status);
    }

    /// Hold answers for `path` back by `yields` extra scheduler turns.
    pub fn slow_path(&self, path: &str, yields: usize) {
        self.slow_paths.borrow_mut().insert(path.to_owned(), yields);
    }

    /// Bearer tokens sent to `path`, in the order the requests arrived.
    pub fn tokens_sent_to(&self, path: &str) -> Vec<Option<String>> {
        self.requests
            .borrow()
            .iter()
            .filter(|r| r.path == path)
            .map(|r| r.bearer_token().map(str::to_owned))
            .collect()
    }

    fn renew(&self) -> Result<ApiResponse, TransportError> {
        self.renewals.set(self.renewals.get() + 1);
        match self.renewal.borrow().clone() {
            Renewal::Issue { access, refresh, accept } => {
                if accept {
                    *self.valid_token.borrow_mut() = access.to_owned();
                }
                let body = match refresh {
                    Some(refresh) => serde_json::json!({ "accessToken": access, "refreshToken": refresh }),
                    None => serde_json::json!({ "accessToken": access }),
                };
                Ok(ApiResponse::new(200, body.to_string()))
            }
            Renewal::Reject(status) => Ok(ApiResponse::new(status, r#"{"error":"invalid_grant"}"#)),
            Renewal::NetworkDown => Err(TransportError::Network("connection reset".to_owned())),
        }
    }
}

#[async_trait(?Send)]
impl Transport for FakeApi {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        // Every call is a suspension point, like a real fetch.
        tokio::task::yield_now().await;
        self.requests.borrow_mut().push(request.clone());
        let delay = self.slow_paths.borrow().get(&request.path).copied().unwrap_or(0);
        for _ in 0..delay {
            tokio::task::yield_now().await;
        }

        if request.path == self.config.endpoints.refresh {
            // Stay in flight long enough for sibling 401s to pile up.
            tokio::task::yield_now().await;
            tokio::task::yield_now().await;
            return self.renew();
        }
        if let Some(status) = self.status_overrides.borrow().get(&request.path) {
            return Ok(ApiResponse::new(*status, "overridden"));
        }
        if request.path == self.config.endpoints.login {
            return Ok(ApiResponse::new(
                200,
                format!(r#"{{"accessToken":"A1","refreshToken":"R1","user":{USER_BODY}}}"#),
            ));
        }
        if request.bearer_token() == Some(self.valid_token.borrow().as_str()) {
            Ok(ApiResponse::new(200, USER_BODY))
        } else {
            Ok(ApiResponse::new(401, r#"{"error":"token_expired"}"#))
        }
    }
}

#[derive(Default)]
pub(crate) struct RecordingNavigator {
    pub visits: RefCell<Vec<String>>,
    /// Reported as the page being shown; `None` by default.
    pub location: RefCell<Option<String>>,
}

impl Navigator for RecordingNavigator {
    fn hard_navigate(&self, href: &str) {
        self.visits.borrow_mut().push(href.to_owned());
    }

    fn current_location(&self) -> Option<String> {
        self.location.borrow().clone()
    }
}

pub(crate) struct Harness {
    pub api: Rc<FakeApi>,
    pub navigator: Rc<RecordingNavigator>,
    pub storage: MemoryStorage,
    pub client: ApiClient,
}

impl Harness {
    pub fn new(api: Rc<FakeApi>) -> Self {
        Self::with_storage(api, MemoryStorage::new())
    }

    pub fn with_storage(api: Rc<FakeApi>, storage: MemoryStorage) -> Self {
        let navigator = Rc::new(RecordingNavigator::default());
        let session = SessionManager::new(
            SessionConfig::default(),
            Box::new(storage.clone()),
            Rc::clone(&api) as Rc<dyn Transport>,
            Rc::clone(&navigator) as Rc<dyn Navigator>,
        );
        Self { api, navigator, storage, client: ApiClient::new(Rc::new(session)) }
    }

    pub fn logged_in(self, access: &str, refresh: &str) -> Self {
        self.client.session().set_credentials(CredentialPair::new(access, refresh));
        self
    }

    pub fn session(&self) -> &SessionManager {
        self.client.session()
    }
}

pub(crate) fn pair(access: &str, refresh: &str) -> CredentialPair {
    CredentialPair::new(access, refresh).expect("test pair must be non-empty")
}
