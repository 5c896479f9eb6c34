//! Root application component with routing and context providers.

use std::rc::Rc;

use leptos::prelude::*;
use leptos_meta::{Stylesheet, Title, provide_meta_context};
use leptos_router::{
    StaticSegment,
    components::{Route, Router, Routes},
};

use crate::components::require_auth::RequireAuth;
use crate::config::SessionConfig;
use crate::net::pipeline::ApiClient;
use crate::pages::{dashboard::DashboardPage, login::LoginPage};
use crate::session::SessionManager;
use crate::state::auth::AuthState;

/// Shared request pipeline. Local storage: the client holds `Rc` state.
pub type ApiHandle = StoredValue<ApiClient, LocalStorage>;

/// The request pipeline provided by `App`.
///
/// # Panics
///
/// Panics when called outside the `App` tree.
pub fn use_api_client() -> ApiHandle {
    expect_context::<ApiHandle>()
}

/// Root application component.
///
/// Builds the session manager, provides it and the auth state to every
/// route, and wraps protected routes in `RequireAuth`.
#[component]
pub fn App(config: SessionConfig) -> impl IntoView {
    provide_meta_context();

    let session = Rc::new(session_manager(config));
    let auth = RwSignal::new(AuthState::initial(session.credentials().has_session()));
    provide_context::<ApiHandle>(StoredValue::new_local(ApiClient::new(session)));
    provide_context(auth);

    view! {
        <Stylesheet id="leptos" href="/pkg/hotelops-console.css"/>
        <Title text="HotelOps Console"/>

        <Router>
            <Routes fallback=|| "Page not found.".into_view()>
                <Route path=StaticSegment("login") view=LoginPage/>
                <Route
                    path=StaticSegment("")
                    view=|| view! { <RequireAuth><DashboardPage/></RequireAuth> }
                />
            </Routes>
        </Router>
    }
}

#[cfg(feature = "csr")]
fn session_manager(config: SessionConfig) -> SessionManager {
    SessionManager::browser(config)
}

/// Outside the browser: in-memory storage and a transport that never connects.
#[cfg(not(feature = "csr"))]
fn session_manager(config: SessionConfig) -> SessionManager {
    use crate::net::error::TransportError;
    use crate::net::transport::Transport;
    use crate::net::types::{ApiRequest, ApiResponse};
    use crate::session::Navigator;
    use crate::session::storage::MemoryStorage;

    struct Offline;

    #[async_trait::async_trait(?Send)]
    impl Transport for Offline {
        async fn send(&self, _request: &ApiRequest) -> Result<ApiResponse, TransportError> {
            Err(TransportError::Network("no browser transport in this build".to_owned()))
        }
    }

    impl Navigator for Offline {
        fn hard_navigate(&self, href: &str) {
            log::debug!("hard navigation to {href} skipped outside the browser");
        }
    }

    SessionManager::new(config, Box::new(MemoryStorage::new()), Rc::new(Offline), Rc::new(Offline))
}
