//! `use_polling`: Leptos hook around the polling driver.
//!
//! SYSTEM CONTEXT
//! ==============
//! Pages that refresh data on a timer call this instead of hand-rolling a
//! sleep loop. The hook wires document visibility and reactive options into
//! a `Poller` and tears it down when the calling view is cleaned up.

use std::fmt::Display;
use std::future::Future;

use leptos::prelude::*;

use crate::state::polling::PollingOptions;

/// Reactive view of one polling instance.
#[derive(Clone, Copy)]
pub struct PollingHandle {
    pub is_running: ReadSignal<bool>,
    /// Epoch milliseconds of the last settled run.
    pub last_run_at: ReadSignal<Option<f64>>,
    /// Run once now unless a run is already in flight.
    pub run_now: Callback<()>,
}

/// Run `callback` every `options.interval` while the view is mounted.
///
/// Errors returned by the callback are logged and do not stop polling.
/// Outside the browser (`csr` disabled) the handle is inert.
pub fn use_polling<F, Fut, E>(callback: F, options: impl Into<Signal<PollingOptions>>) -> PollingHandle
where
    F: Fn() -> Fut + 'static,
    Fut: Future<Output = Result<(), E>> + 'static,
    E: Display + 'static,
{
    let options = options.into();
    let (is_running, set_is_running) = signal(false);
    let (last_run_at, set_last_run_at) = signal(None::<f64>);

    #[cfg(feature = "csr")]
    {
        let run_now = browser::install(callback, options, set_is_running, set_last_run_at);
        PollingHandle { is_running, last_run_at, run_now }
    }

    #[cfg(not(feature = "csr"))]
    {
        let _ = (callback, options, set_is_running, set_last_run_at);
        PollingHandle { is_running, last_run_at, run_now: Callback::new(|()| {}) }
    }
}

#[cfg(feature = "csr")]
mod browser {
    use std::fmt::Display;
    use std::future::Future;
    use std::rc::Rc;

    use leptos::prelude::*;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::closure::Closure;

    use crate::state::polling::PollingOptions;
    use crate::util::poller::{BrowserPollHost, PollCallback, Poller};

    const VISIBILITY_EVENT: &str = "visibilitychange";

    fn document_visible() -> bool {
        web_sys::window().and_then(|w| w.document()).is_none_or(|d| !d.hidden())
    }

    pub(super) fn install<F, Fut, E>(
        callback: F,
        options: Signal<PollingOptions>,
        set_is_running: WriteSignal<bool>,
        set_last_run_at: WriteSignal<Option<f64>>,
    ) -> Callback<()>
    where
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = Result<(), E>> + 'static,
        E: Display + 'static,
    {
        let callback: PollCallback = Rc::new(move || {
            let run = callback();
            Box::pin(async move { run.await.map_err(|e| e.to_string()) })
        });

        let poller = Poller::new(BrowserPollHost, callback, options.get_untracked());
        poller.on_change(move |running, at| {
            set_is_running.set(running);
            set_last_run_at.set(at);
        });
        let stored = StoredValue::new_local(poller.clone());

        let on_visibility: js_sys::Function = Closure::<dyn FnMut()>::new(move || {
            let visible = document_visible();
            let _ = stored.try_with_value(|p| p.set_visible(visible));
        })
        .into_js_value()
        .unchecked_into();
        if let Some(document) = web_sys::window().and_then(|w| w.document()) {
            let _ = document.add_event_listener_with_callback(VISIBILITY_EVENT, &on_visibility);
        }
        let listener = StoredValue::new_local(on_visibility);

        poller.set_visible(document_visible());
        poller.start();

        Effect::new(move || {
            let next = options.get();
            let _ = stored.try_with_value(|p| p.configure(next));
        });

        on_cleanup(move || {
            let _ = stored.try_with_value(|p| p.teardown());
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                let _ = listener.try_with_value(|f| {
                    document.remove_event_listener_with_callback(VISIBILITY_EVENT, f)
                });
            }
        });

        Callback::new(move |()| {
            let _ = stored.try_with_value(|p| p.run_now());
        })
    }
}
