//! Dashboard page: operator landing with a live activity feed.
//!
//! SYSTEM CONTEXT
//! ==============
//! Rendered inside `RequireAuth`. The feed refreshes through `use_polling`,
//! so it pauses while the tab is hidden and never stacks slow requests.

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod dashboard_test;

use std::time::Duration;

use leptos::prelude::*;
use serde::Deserialize;

use crate::app::use_api_client;
use crate::state::auth::AuthState;
use crate::state::polling::PollingOptions;
use crate::util::use_polling::use_polling;

const ACTIVITY_PATH: &str = "/api/activity";
const ACTIVITY_INTERVAL: Duration = Duration::from_secs(15);

/// One line of the property activity feed.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: String,
    pub summary: String,
    #[serde(default)]
    pub occurred_at: Option<String>,
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let api = use_api_client();
    let auth = expect_context::<RwSignal<AuthState>>();

    let activity = RwSignal::new(Vec::<ActivityEntry>::new());
    let feed_error = RwSignal::new(None::<String>);

    let poll = use_polling(
        move || {
            let client = api.try_get_value();
            async move {
                let Some(client) = client else {
                    return Ok(());
                };
                match client.get::<Vec<ActivityEntry>>(ACTIVITY_PATH).await {
                    Ok(items) => {
                        let _ = activity.try_set(items);
                        let _ = feed_error.try_set(None);
                        Ok(())
                    }
                    Err(e) => {
                        let _ = feed_error.try_set(Some(e.to_string()));
                        Err(e)
                    }
                }
            }
        },
        Signal::stored(PollingOptions::every(ACTIVITY_INTERVAL)),
    );

    let operator_name = move || operator_label(&auth.get());

    let on_logout = move |_| {
        #[cfg(feature = "csr")]
        {
            let client = api.get_value();
            leptos::task::spawn_local(async move {
                client.logout().await;
                auth.update(AuthState::deauthenticate);
                if let Some(w) = web_sys::window() {
                    let _ = w.location().set_href(&client.session().config().login_path);
                }
            });
        }
    };

    view! {
        <div class="dashboard-page">
            <header class="dashboard-page__header toolbar">
                <span class="toolbar__title">"Front Desk"</span>
                <span class="toolbar__spacer"></span>
                <span class="toolbar__self">{operator_name}</span>
                <button class="btn toolbar__logout" on:click=on_logout title="Logout">
                    "Logout"
                </button>
            </header>

            <section class="dashboard-page__feed">
                <div class="feed__header">
                    <h2>"Activity"</h2>
                    <span class="feed__status">
                        {move || refresh_status_label(poll.is_running.get(), poll.last_run_at.get())}
                    </span>
                    <button
                        class="btn"
                        disabled=move || poll.is_running.get()
                        on:click=move |_| poll.run_now.run(())
                    >
                        "Refresh"
                    </button>
                </div>
                <Show when=move || feed_error.get().is_some()>
                    <p class="feed__error">{move || feed_error.get().unwrap_or_default()}</p>
                </Show>
                <ul class="feed__items">
                    {move || {
                        activity
                            .get()
                            .into_iter()
                            .map(|entry| {
                                view! {
                                    <li class="feed__item">
                                        <span class="feed__time">
                                            {entry.occurred_at.unwrap_or_default()}
                                        </span>
                                        <span class="feed__summary">{entry.summary}</span>
                                    </li>
                                }
                            })
                            .collect::<Vec<_>>()
                    }}
                </ul>
            </section>
        </div>
    }
}

fn operator_label(state: &AuthState) -> String {
    state
        .user
        .as_ref()
        .map_or_else(|| "operator".to_owned(), |user| user.name.clone())
}

fn refresh_status_label(is_running: bool, last_run_at: Option<f64>) -> &'static str {
    match (is_running, last_run_at) {
        (true, _) => "Refreshing...",
        (false, Some(_)) => "Up to date",
        (false, None) => "Not loaded yet",
    }
}
