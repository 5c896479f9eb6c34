//! Login page: operator username + password.
//!
//! After a successful sign-in the page hard-navigates to the `redirect` query
//! target the route guard attached, so every protected view starts from a
//! fresh load with the new session.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use leptos::prelude::*;
use leptos_router::hooks::use_query_map;

use crate::app::use_api_client;
use crate::net::error::ApiError;
use crate::state::auth::AuthState;
use crate::util::redirect::{REDIRECT_PARAM, login_return_target};

#[component]
pub fn LoginPage() -> impl IntoView {
    let api = use_api_client();
    let auth = expect_context::<RwSignal<AuthState>>();
    let query = use_query_map();

    let username = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let (username_value, password_value) = match validate_login_input(&username.get(), &password.get()) {
            Ok(values) => values,
            Err(message) => {
                info.set(message.to_owned());
                return;
            }
        };
        let target = login_return_target(query.with_untracked(|q| q.get(REDIRECT_PARAM)).as_deref());
        busy.set(true);
        info.set("Signing in...".to_owned());

        #[cfg(feature = "csr")]
        {
            let client = api.get_value();
            leptos::task::spawn_local(async move {
                match client.login(&username_value, &password_value).await {
                    Ok(user) => {
                        auth.update(|a| a.authenticate(user));
                        if let Some(window) = web_sys::window() {
                            let _ = window.location().set_href(&target);
                        }
                    }
                    Err(e) => {
                        info.set(login_error_message(&e));
                        busy.set(false);
                    }
                }
            });
        }
        #[cfg(not(feature = "csr"))]
        let _ = (api, auth, username_value, password_value, target);
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"HotelOps"</h1>
                <p class="login-card__subtitle">"Operations Console"</p>
                <form class="login-form" on:submit=on_submit>
                    <input
                        class="login-input"
                        type="text"
                        autocomplete="username"
                        placeholder="Username"
                        prop:value=move || username.get()
                        on:input=move |ev| username.set(event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="password"
                        autocomplete="current-password"
                        placeholder="Password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        "Sign In"
                    </button>
                </form>
                <Show when=move || !info.get().is_empty()>
                    <p class="login-message">{move || info.get()}</p>
                </Show>
            </div>
        </div>
    }
}

fn validate_login_input(username: &str, password: &str) -> Result<(String, String), &'static str> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err("Enter both username and password.");
    }
    Ok((username.to_owned(), password.to_owned()))
}

fn login_error_message(error: &ApiError) -> String {
    match error.status() {
        Some(401 | 403) => "Invalid username or password.".to_owned(),
        Some(status) => format!("Sign-in failed (status {status})."),
        None => format!("Sign-in failed: {error}"),
    }
}
