//! Route guard wrapper for protected views.
//!
//! SYSTEM CONTEXT
//! ==============
//! Each protected route renders `<RequireAuth>` around its page. The wrapper
//! feeds `RouteGuard` from auth state, credential presence, the initial-load
//! timer and the current location, then performs what the guard asks for:
//! one session verification, or one redirect to login.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::{use_location, use_navigate};

use crate::app::use_api_client;
use crate::state::auth::AuthState;
use crate::state::guard::{GuardAction, GuardInput, GuardView, RouteGuard};
use crate::util::redirect::path_with_query;

/// Render `children` only for an authenticated operator.
#[component]
pub fn RequireAuth(children: ChildrenFn) -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let api = use_api_client();
    let location = use_location();
    let navigate = use_navigate();

    let (login_path, initial_window) = api.with_value(|client| {
        let config = client.session().config();
        (config.login_path.clone(), config.initial_load_window)
    });
    let guard = StoredValue::new(RouteGuard::new(login_path));
    let view_state = RwSignal::new(GuardView::Blank);

    // No redirect decision until the initial-load window has passed.
    let window_elapsed = RwSignal::new(false);
    #[cfg(feature = "csr")]
    {
        let millis = u32::try_from(initial_window.as_millis()).unwrap_or(u32::MAX);
        gloo_timers::callback::Timeout::new(millis, move || {
            let _ = window_elapsed.try_set(true);
        })
        .forget();
    }
    #[cfg(not(feature = "csr"))]
    let _ = initial_window;

    Effect::new(move || {
        let state = auth.get();
        let elapsed = window_elapsed.get();
        let path = path_with_query(&location.pathname.get(), &location.search.get());
        // The store is not reactive. Every path that clears it also changes
        // `auth` (logout, failed verification) or hard-navigates (lost
        // renewal), and either of those re-runs this effect.
        let has_credentials = api.with_value(|client| client.session().credentials().has_session());

        let input = GuardInput {
            auth: state.status,
            has_credentials,
            initial_window_elapsed: elapsed,
            verification_outstanding: state.verifying,
            path: &path,
        };
        let Some(decision) = guard.try_update_value(|g| g.evaluate(&input)) else {
            return;
        };
        view_state.set(decision.view);

        match decision.action {
            Some(GuardAction::Verify) => {
                auth.update(AuthState::begin_verification);
                let client = api.get_value();
                leptos::task::spawn_local(async move {
                    match client.verify_session().await {
                        Ok(user) => {
                            let _ = auth.try_update(|a| a.authenticate(Some(user)));
                        }
                        Err(_) => {
                            let _ = auth.try_update(AuthState::deauthenticate);
                        }
                    }
                });
            }
            Some(GuardAction::Redirect(href)) => {
                navigate(&href, NavigateOptions { replace: true, ..NavigateOptions::default() });
            }
            None => {}
        }
    });

    move || match view_state.get() {
        GuardView::Content => children().into_any(),
        GuardView::Loading => view! { <div class="guard-loading">"Checking session..."</div> }.into_any(),
        GuardView::Blank => ().into_any(),
    }
}
