//! Session ownership: credentials, renewal, and the collaborators they need.
//!
//! ARCHITECTURE
//! ============
//! One `SessionManager` is built per page and passed by `Rc` to whatever
//! needs it. It owns the credential store and the refresh coordinator and
//! holds the injected storage, transport, and navigation seams, so there is
//! no hidden global session state and every piece can be driven by test
//! doubles.
//!
//! Only the refresh coordinator and the manager's own login/logout paths
//! write the credential store. Everything else reads.

pub mod credentials;
pub mod refresh;
pub mod storage;


use std::rc::Rc;

use self::credentials::{CredentialPair, CredentialStore};
use self::refresh::{RefreshCoordinator, RefreshError, SessionLostHook};
use self::storage::KeyValueStorage;
use crate::config::SessionConfig;
use crate::net::transport::Transport;
use crate::util::redirect::login_href;

/// Full-page navigation, used when the session is lost and in-memory state
/// must not survive.
pub trait Navigator {
    fn hard_navigate(&self, href: &str);

    /// Path plus query of the page being shown, if known.
    fn current_location(&self) -> Option<String> {
        None
    }
}

#[cfg(feature = "csr")]
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserNavigator;

#[cfg(feature = "csr")]
impl Navigator for BrowserNavigator {
    fn hard_navigate(&self, href: &str) {
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Err(e) = window.location().set_href(href) {
            log::warn!("hard navigation to {href} failed: {e:?}");
        }
    }

    fn current_location(&self) -> Option<String> {
        let location = web_sys::window()?.location();
        let pathname = location.pathname().ok()?;
        let search = location.search().unwrap_or_default();
        Some(crate::util::redirect::path_with_query(&pathname, &search))
    }
}

pub struct SessionManager {
    config: SessionConfig,
    credentials: Rc<CredentialStore>,
    transport: Rc<dyn Transport>,
    refresh: RefreshCoordinator,
}

impl SessionManager {
    /// Build a manager whose session-lost reaction is a hard redirect to the
    /// login route, carrying the current page as the return target.
    pub fn new(
        config: SessionConfig,
        storage: Box<dyn KeyValueStorage>,
        transport: Rc<dyn Transport>,
        navigator: Rc<dyn Navigator>,
    ) -> Self {
        let login_path = config.login_path.clone();
        let on_session_lost: SessionLostHook = Rc::new(move |_: &RefreshError| {
            let here = navigator.current_location();
            navigator.hard_navigate(&login_href(&login_path, here.as_deref()));
        });
        Self::with_session_lost_hook(config, storage, transport, on_session_lost)
    }

    /// Build a manager with a custom session-lost reaction.
    pub fn with_session_lost_hook(
        config: SessionConfig,
        storage: Box<dyn KeyValueStorage>,
        transport: Rc<dyn Transport>,
        on_session_lost: SessionLostHook,
    ) -> Self {
        let credentials = Rc::new(CredentialStore::new(storage, config.storage_keys.clone()));
        // Hydrate before any request can be dispatched.
        credentials.hydrate();
        let refresh = RefreshCoordinator::new(
            Rc::clone(&credentials),
            Rc::clone(&transport),
            config.endpoints.refresh.clone(),
            on_session_lost,
        );
        Self { config, credentials, transport, refresh }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub fn refresh(&self) -> &RefreshCoordinator {
        &self.refresh
    }

    pub fn set_credentials(&self, pair: Option<CredentialPair>) {
        self.credentials.set(pair);
    }

    pub fn get_credentials(&self) -> Option<CredentialPair> {
        self.credentials.get()
    }

    /// Drop the local session. Used by logout and failed verification.
    pub fn clear_session(&self) {
        self.credentials.clear();
    }
}

#[cfg(feature = "csr")]
impl SessionManager {
    /// Manager wired to `localStorage`, `gloo-net`, and `window.location`.
    pub fn browser(config: SessionConfig) -> Self {
        use crate::net::transport::GlooTransport;

        let transport = Rc::new(GlooTransport::new(config.clone()));
        Self::new(config, Box::new(storage::BrowserStorage), transport, Rc::new(BrowserNavigator))
    }
}
