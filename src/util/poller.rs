//! Polling driver: applies `PollingScheduler` commands to a real host.
//!
//! ARCHITECTURE
//! ============
//! The scheduler decides, the driver acts. Every host signal (timer tick,
//! visibility change, option change, run completion) becomes a `PollEvent`;
//! the resulting commands arm or drop the host interval and spawn the
//! callback as a local task.
//!
//! Timer closures and spawned runs hold only a `Weak` back-reference, so
//! dropping the last `Poller` handle cancels the interval and lets an
//! in-flight run finish without touching freed state.
//!
//! ERROR HANDLING
//! ==============
//! Callback errors are logged at `warn` and otherwise swallowed; the next
//! tick still fires.

#[cfg(test)]
#[path = "poller_test.rs"]
mod poller_test;

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use futures::future::LocalBoxFuture;

use crate::state::polling::{PollCommand, PollEvent, PollingOptions, PollingScheduler};

/// One polling execution. `Err` carries a message for the log.
pub type PollCallback = Rc<dyn Fn() -> LocalBoxFuture<'static, Result<(), String>>>;

type StatusListener = Box<dyn Fn(bool, Option<f64>)>;

/// Timers, task spawning and clock for the driver.
pub trait PollHost {
    /// Live periodic timer; dropping it cancels the timer.
    type Interval;

    fn start_interval(&self, period: Duration, tick: Box<dyn Fn()>) -> Self::Interval;
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
    /// Milliseconds since the epoch.
    fn now_ms(&self) -> f64;
}

pub struct Poller<H: PollHost + 'static> {
    inner: Rc<Inner<H>>,
}

impl<H: PollHost + 'static> Clone for Poller<H> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

struct Inner<H: PollHost> {
    host: H,
    callback: PollCallback,
    scheduler: RefCell<PollingScheduler>,
    interval: RefCell<Option<H::Interval>>,
    listener: RefCell<Option<StatusListener>>,
    reported: Cell<(bool, Option<f64>)>,
}

impl<H: PollHost + 'static> Poller<H> {
    pub fn new(host: H, callback: PollCallback, options: PollingOptions) -> Self {
        Self {
            inner: Rc::new(Inner {
                host,
                callback,
                scheduler: RefCell::new(PollingScheduler::new(options)),
                interval: RefCell::new(None),
                listener: RefCell::new(None),
                reported: Cell::new((false, None)),
            }),
        }
    }

    /// Called with `(is_running, last_run_at)` whenever either changes.
    pub fn on_change(&self, listener: impl Fn(bool, Option<f64>) + 'static) {
        *self.inner.listener.borrow_mut() = Some(Box::new(listener));
    }

    pub fn start(&self) {
        self.inner.dispatch(PollEvent::Start);
    }

    pub fn run_now(&self) {
        self.inner.dispatch(PollEvent::RunNow);
    }

    pub fn set_visible(&self, visible: bool) {
        self.inner.dispatch(PollEvent::VisibilityChanged { visible });
    }

    pub fn configure(&self, options: PollingOptions) {
        self.inner.dispatch(PollEvent::Configure(options));
    }

    pub fn teardown(&self) {
        self.inner.dispatch(PollEvent::Teardown);
    }

    pub fn is_running(&self) -> bool {
        self.inner.scheduler.borrow().is_running()
    }

    pub fn last_run_at(&self) -> Option<f64> {
        self.inner.scheduler.borrow().last_run_at()
    }

    pub fn has_timer(&self) -> bool {
        self.inner.interval.borrow().is_some()
    }
}

impl<H: PollHost + 'static> Inner<H> {
    fn dispatch(self: &Rc<Self>, event: PollEvent) {
        // Scheduler borrow must end before commands run; callbacks may re-enter.
        let commands = self.scheduler.borrow_mut().handle(event);
        for command in commands {
            match command {
                PollCommand::ArmTimer(period) => self.arm(period),
                PollCommand::DisarmTimer => {
                    let dropped = self.interval.borrow_mut().take();
                    drop(dropped);
                }
                PollCommand::Invoke => self.invoke(),
            }
        }
        self.report();
    }

    fn arm(self: &Rc<Self>, period: Duration) {
        let weak = Rc::downgrade(self);
        let interval = self.host.start_interval(
            period,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.dispatch(PollEvent::Tick);
                }
            }),
        );
        let replaced = self.interval.borrow_mut().replace(interval);
        drop(replaced);
    }

    fn invoke(self: &Rc<Self>) {
        let run = (self.callback)();
        let weak: Weak<Self> = Rc::downgrade(self);
        self.host.spawn(Box::pin(async move {
            if let Err(e) = run.await {
                log::warn!("poll callback failed: {e}");
            }
            if let Some(inner) = weak.upgrade() {
                let at_ms = inner.host.now_ms();
                inner.dispatch(PollEvent::RunFinished { at_ms });
            }
        }));
    }

    fn report(&self) {
        let status = {
            let scheduler = self.scheduler.borrow();
            (scheduler.is_running(), scheduler.last_run_at())
        };
        if self.reported.replace(status) == status {
            return;
        }
        if let Some(listener) = self.listener.borrow().as_ref() {
            listener(status.0, status.1);
        }
    }
}

/// Browser host: gloo interval timers, `spawn_local`, `Date.now()`.
#[cfg(feature = "csr")]
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserPollHost;

#[cfg(feature = "csr")]
impl PollHost for BrowserPollHost {
    type Interval = gloo_timers::callback::Interval;

    fn start_interval(&self, period: Duration, tick: Box<dyn Fn()>) -> Self::Interval {
        let millis = u32::try_from(period.as_millis()).unwrap_or(u32::MAX);
        gloo_timers::callback::Interval::new(millis, move || tick())
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }

    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }
}
