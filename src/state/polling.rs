//! Polling scheduler state machine.
//!
//! DESIGN
//! ======
//! Pure state: events in, timer/execution commands out. The `Poller` driver
//! in `util::poller` owns the real timer and task spawning and feeds events
//! back in, so overlap and visibility behavior can be tested by feeding
//! synthetic events.
//!
//! INVARIANTS
//! ==========
//! - At most one execution in flight; a tick during a run is dropped, not queued.
//! - No timer is armed while disabled, torn down, or hidden with
//!   `pause_when_hidden` set.
//! - After teardown only `RunFinished` is still accepted, so a run that was
//!   in flight settles the status it reports.

#[cfg(test)]
#[path = "polling_test.rs"]
mod polling_test;

use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollingOptions {
    pub interval: Duration,
    pub enabled: bool,
    pub pause_when_hidden: bool,
}

impl Default for PollingOptions {
    fn default() -> Self {
        Self { interval: DEFAULT_POLL_INTERVAL, enabled: true, pause_when_hidden: true }
    }
}

impl PollingOptions {
    pub fn every(interval: Duration) -> Self {
        Self { interval, ..Self::default() }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollPhase {
    /// No timer armed, nothing running.
    Stopped,
    /// Timer armed, waiting for the next tick.
    Scheduled,
    /// Callback in flight.
    Running,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PollEvent {
    /// Hosting view mounted.
    Start,
    Tick,
    RunNow,
    VisibilityChanged { visible: bool },
    Configure(PollingOptions),
    RunFinished { at_ms: f64 },
    /// Hosting view unmounted.
    Teardown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollCommand {
    /// (Re)arm the periodic timer, replacing any armed one.
    ArmTimer(Duration),
    DisarmTimer,
    /// Run the callback; report `RunFinished` when it settles.
    Invoke,
}

#[derive(Clone, Debug)]
pub struct PollingScheduler {
    options: PollingOptions,
    visible: bool,
    started: bool,
    torn_down: bool,
    timer_armed: bool,
    running: bool,
    last_run_at: Option<f64>,
}

impl PollingScheduler {
    pub fn new(options: PollingOptions) -> Self {
        Self {
            options,
            visible: true,
            started: false,
            torn_down: false,
            timer_armed: false,
            running: false,
            last_run_at: None,
        }
    }

    pub fn options(&self) -> PollingOptions {
        self.options
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn last_run_at(&self) -> Option<f64> {
        self.last_run_at
    }

    pub fn phase(&self) -> PollPhase {
        if self.running {
            PollPhase::Running
        } else if self.timer_armed {
            PollPhase::Scheduled
        } else {
            PollPhase::Stopped
        }
    }

    pub fn handle(&mut self, event: PollEvent) -> Vec<PollCommand> {
        if self.torn_down && !matches!(event, PollEvent::RunFinished { .. }) {
            return Vec::new();
        }
        match event {
            PollEvent::Start => {
                self.started = true;
                if self.active() { self.restart() } else { Vec::new() }
            }
            PollEvent::Tick => {
                if !self.timer_armed {
                    return Vec::new();
                }
                if self.running {
                    log::debug!("poll tick dropped, previous run still in flight");
                    return Vec::new();
                }
                self.begin_run()
            }
            PollEvent::RunNow => {
                if self.running {
                    return Vec::new();
                }
                self.begin_run()
            }
            PollEvent::VisibilityChanged { visible } => {
                let was_active = self.active();
                self.visible = visible;
                self.transition(was_active, false)
            }
            PollEvent::Configure(options) => {
                let was_active = self.active();
                let interval_changed = options.interval != self.options.interval;
                self.options = options;
                self.transition(was_active, interval_changed)
            }
            PollEvent::RunFinished { at_ms } => {
                self.running = false;
                self.last_run_at = Some(at_ms);
                Vec::new()
            }
            PollEvent::Teardown => {
                self.torn_down = true;
                self.disarm()
            }
        }
    }

    fn active(&self) -> bool {
        self.started && self.options.enabled && (self.visible || !self.options.pause_when_hidden)
    }

    fn transition(&mut self, was_active: bool, interval_changed: bool) -> Vec<PollCommand> {
        match (was_active, self.active()) {
            (true, false) => self.disarm(),
            (false, true) => self.restart(),
            (true, true) if interval_changed => {
                self.timer_armed = true;
                vec![PollCommand::DisarmTimer, PollCommand::ArmTimer(self.options.interval)]
            }
            _ => Vec::new(),
        }
    }

    /// Immediate run (unless one is in flight) followed by a fresh timer.
    fn restart(&mut self) -> Vec<PollCommand> {
        let mut commands = if self.running { Vec::new() } else { self.begin_run() };
        self.timer_armed = true;
        commands.push(PollCommand::ArmTimer(self.options.interval));
        commands
    }

    fn begin_run(&mut self) -> Vec<PollCommand> {
        self.running = true;
        vec![PollCommand::Invoke]
    }

    fn disarm(&mut self) -> Vec<PollCommand> {
        if !self.timer_armed {
            return Vec::new();
        }
        self.timer_armed = false;
        vec![PollCommand::DisarmTimer]
    }
}
