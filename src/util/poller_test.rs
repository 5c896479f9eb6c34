use std::collections::VecDeque;

use futures::channel::oneshot;
use tokio::task::LocalSet;

use super::*;

const FIVE_SECS: Duration = Duration::from_secs(5);

// =============================================================================
// fakes
// =============================================================================

struct Timer {
    id: u64,
    period: Duration,
    tick: Rc<dyn Fn()>,
}

/// Host whose timers fire only when the test says so.
#[derive(Clone, Default)]
struct FakeHost {
    timers: Rc<RefCell<Vec<Timer>>>,
    next_id: Rc<Cell<u64>>,
    clock: Rc<Cell<f64>>,
}

struct FakeInterval {
    id: u64,
    timers: Weak<RefCell<Vec<Timer>>>,
}

impl Drop for FakeInterval {
    fn drop(&mut self) {
        if let Some(timers) = self.timers.upgrade() {
            timers.borrow_mut().retain(|t| t.id != self.id);
        }
    }
}

impl FakeHost {
    fn fire(&self) {
        let ticks: Vec<Rc<dyn Fn()>> = self.timers.borrow().iter().map(|t| Rc::clone(&t.tick)).collect();
        for tick in ticks {
            tick();
        }
    }

    fn armed(&self) -> Vec<Duration> {
        self.timers.borrow().iter().map(|t| t.period).collect()
    }

    fn advance(&self, ms: f64) {
        self.clock.set(self.clock.get() + ms);
    }
}

impl PollHost for FakeHost {
    type Interval = FakeInterval;

    fn start_interval(&self, period: Duration, tick: Box<dyn Fn()>) -> FakeInterval {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.timers.borrow_mut().push(Timer { id, period, tick: Rc::from(tick) });
        FakeInterval { id, timers: Rc::downgrade(&self.timers) }
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        tokio::task::spawn_local(task);
    }

    fn now_ms(&self) -> f64 {
        self.clock.get()
    }
}

/// Callback that parks every run until the test releases it.
#[derive(Default)]
struct Gate {
    calls: Cell<usize>,
    active: Cell<usize>,
    max_active: Cell<usize>,
    pending: RefCell<VecDeque<oneshot::Sender<Result<(), String>>>>,
}

impl Gate {
    fn callback(self: &Rc<Self>) -> PollCallback {
        let gate = Rc::clone(self);
        Rc::new(move || {
            let gate = Rc::clone(&gate);
            let (tx, rx) = oneshot::channel();
            gate.pending.borrow_mut().push_back(tx);
            gate.calls.set(gate.calls.get() + 1);
            gate.active.set(gate.active.get() + 1);
            gate.max_active.set(gate.max_active.get().max(gate.active.get()));
            Box::pin(async move {
                let result = rx.await.unwrap_or(Ok(()));
                gate.active.set(gate.active.get() - 1);
                result
            })
        })
    }

    fn release(&self, result: Result<(), String>) {
        if let Some(tx) = self.pending.borrow_mut().pop_front() {
            let _ = tx.send(result);
        }
    }
}

async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

fn poller(options: PollingOptions) -> (Poller<FakeHost>, FakeHost, Rc<Gate>) {
    let host = FakeHost::default();
    let gate = Rc::new(Gate::default());
    let poller = Poller::new(host.clone(), gate.callback(), options);
    (poller, host, gate)
}

// =============================================================================
// overlap
// =============================================================================

#[tokio::test]
async fn slow_callback_never_runs_concurrently() {
    LocalSet::new()
        .run_until(async {
            let (poller, host, gate) = poller(PollingOptions::every(FIVE_SECS));
            poller.start();
            assert_eq!(gate.calls.get(), 1);
            assert!(poller.is_running());

            for _ in 0..4 {
                host.fire();
                poller.run_now();
                settle().await;
            }
            assert_eq!(gate.calls.get(), 1);

            gate.release(Ok(()));
            settle().await;
            assert!(!poller.is_running());

            host.fire();
            assert_eq!(gate.calls.get(), 2);
            gate.release(Ok(()));
            settle().await;

            assert_eq!(gate.max_active.get(), 1);
        })
        .await;
}

#[tokio::test]
async fn callback_error_does_not_stop_ticks() {
    LocalSet::new()
        .run_until(async {
            let (poller, host, gate) = poller(PollingOptions::every(FIVE_SECS));
            poller.start();
            gate.release(Err("upstream 503".to_owned()));
            settle().await;

            assert!(!poller.is_running());
            assert_eq!(host.armed(), vec![FIVE_SECS]);
            host.fire();
            assert_eq!(gate.calls.get(), 2);
        })
        .await;
}

#[tokio::test]
async fn last_run_at_comes_from_host_clock() {
    LocalSet::new()
        .run_until(async {
            let (poller, host, gate) = poller(PollingOptions::every(FIVE_SECS));
            let seen = Rc::new(RefCell::new(Vec::new()));
            let sink = Rc::clone(&seen);
            poller.on_change(move |running, at| sink.borrow_mut().push((running, at)));

            host.advance(1_000.0);
            poller.start();
            gate.release(Ok(()));
            settle().await;

            assert_eq!(poller.last_run_at(), Some(1_000.0));
            assert_eq!(*seen.borrow(), vec![(true, None), (false, Some(1_000.0))]);
        })
        .await;
}

// =============================================================================
// visibility / options
// =============================================================================

#[tokio::test]
async fn hidden_tab_accrues_no_ticks() {
    LocalSet::new()
        .run_until(async {
            let (poller, host, gate) = poller(PollingOptions::every(FIVE_SECS));
            poller.start();
            gate.release(Ok(()));
            settle().await;

            poller.set_visible(false);
            assert!(host.armed().is_empty());
            host.fire();
            assert_eq!(gate.calls.get(), 1);

            poller.set_visible(true);
            assert_eq!(gate.calls.get(), 2, "visible again runs immediately");
            assert_eq!(host.armed(), vec![FIVE_SECS]);
        })
        .await;
}

#[tokio::test]
async fn disable_and_enable_toggle_timer() {
    LocalSet::new()
        .run_until(async {
            let options = PollingOptions::every(FIVE_SECS);
            let (poller, host, gate) = poller(options);
            poller.start();
            gate.release(Ok(()));
            settle().await;

            poller.configure(PollingOptions { enabled: false, ..options });
            assert!(!poller.has_timer());
            assert!(host.armed().is_empty());

            poller.configure(options);
            assert_eq!(gate.calls.get(), 2);
            assert_eq!(host.armed(), vec![FIVE_SECS]);
        })
        .await;
}

#[tokio::test]
async fn interval_change_replaces_timer() {
    LocalSet::new()
        .run_until(async {
            let (poller, host, _gate) = poller(PollingOptions::every(FIVE_SECS));
            poller.start();
            poller.configure(PollingOptions::every(Duration::from_secs(1)));
            assert_eq!(host.armed(), vec![Duration::from_secs(1)]);
        })
        .await;
}

// =============================================================================
// teardown
// =============================================================================

#[tokio::test]
async fn teardown_cancels_timer_and_in_flight_run_settles() {
    LocalSet::new()
        .run_until(async {
            let (poller, host, gate) = poller(PollingOptions::every(FIVE_SECS));
            poller.start();
            poller.teardown();
            assert!(host.armed().is_empty());

            gate.release(Ok(()));
            settle().await;
            assert!(!poller.is_running());
            poller.run_now();
            assert_eq!(gate.calls.get(), 1);
        })
        .await;
}

#[tokio::test]
async fn dropping_poller_cancels_interval() {
    LocalSet::new()
        .run_until(async {
            let (poller, host, gate) = poller(PollingOptions::every(FIVE_SECS));
            poller.start();
            drop(poller);
            assert!(host.armed().is_empty());

            gate.release(Ok(()));
            settle().await;
        })
        .await;
}
