//! Pomodoro session cycle and its tokio driver.
//!
//! [`PomodoroCycle`] is the synchronous model: which session is running, how
//! many focus sessions have finished, and the countdown for the current one.
//! [`PomodoroHandle::spawn`] runs a cycle on a background task that ticks
//! once per period and takes commands over a channel.

use crate::error::{AppError, AppResult};
use crate::timer::{Countdown, Tick, format_clock};
use crate::types::PomodoroSettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info};

/// Focus sessions between long breaks.
pub const SESSIONS_PER_LONG_BREAK: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionType {
    #[default]
    Work,
    ShortBreak,
    LongBreak,
}

impl SessionType {
    pub fn label(&self) -> &'static str {
        match self {
            SessionType::Work => "Focus",
            SessionType::ShortBreak => "Short Break",
            SessionType::LongBreak => "Long Break",
        }
    }

    /// Session length in seconds under `settings`.
    pub fn duration_secs(&self, settings: &PomodoroSettings) -> u32 {
        let minutes = match self {
            SessionType::Work => settings.work,
            SessionType::ShortBreak => settings.short_break,
            SessionType::LongBreak => settings.long_break,
        };
        minutes.saturating_mul(60)
    }
}

/// Snapshot of the pomodoro for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PomodoroStatus {
    pub session_type: SessionType,
    pub label: &'static str,
    pub remaining: u32,
    pub clock: String,
    pub duration: u32,
    pub active: bool,
    /// Elapsed fraction of the current session, 0.0 to 1.0.
    pub progress: f64,
    pub session_number: u32,
    pub completed_work_sessions: u32,
    pub settings: PomodoroSettings,
}

/// Work / break rotation driven by a countdown.
#[derive(Debug, Clone)]
pub struct PomodoroCycle {
    settings: PomodoroSettings,
    session_type: SessionType,
    completed_work: u32,
    countdown: Countdown,
}

impl PomodoroCycle {
    pub fn new(settings: PomodoroSettings) -> Self {
        let session_type = SessionType::Work;
        Self {
            settings,
            session_type,
            completed_work: 0,
            countdown: Countdown::new(session_type.duration_secs(&settings)),
        }
    }

    pub fn session_type(&self) -> SessionType {
        self.session_type
    }

    pub fn is_active(&self) -> bool {
        self.countdown.is_active()
    }

    pub fn start(&mut self) {
        self.countdown.start();
    }

    pub fn pause(&mut self) {
        self.countdown.pause();
    }

    /// Restart the current session from its full duration.
    pub fn reset(&mut self) {
        self.countdown.reset(None);
    }

    /// Switch to `session_type` and reset to its duration.
    pub fn select(&mut self, session_type: SessionType) {
        self.session_type = session_type;
        let secs = session_type.duration_secs(&self.settings);
        self.countdown.set_default(secs);
        self.countdown.reset(Some(secs));
    }

    /// Adopt new durations; the current session restarts with its new length.
    pub fn apply_settings(&mut self, settings: PomodoroSettings) {
        self.settings = settings;
        self.select(self.session_type);
    }

    /// Advance one second. Returns the session that just finished, if any;
    /// the cycle has then already moved on to the next session (inactive).
    pub fn tick(&mut self) -> Option<SessionType> {
        match self.countdown.tick() {
            Tick::Completed => {
                let finished = self.session_type;
                let next = match finished {
                    SessionType::Work => {
                        self.completed_work += 1;
                        if self.completed_work % SESSIONS_PER_LONG_BREAK == 0 {
                            SessionType::LongBreak
                        } else {
                            SessionType::ShortBreak
                        }
                    }
                    SessionType::ShortBreak | SessionType::LongBreak => SessionType::Work,
                };
                self.select(next);
                Some(finished)
            }
            Tick::Running(_) | Tick::Idle => None,
        }
    }

    pub fn status(&self) -> PomodoroStatus {
        let duration = self.session_type.duration_secs(&self.settings);
        let remaining = self.countdown.remaining();
        let progress = if duration == 0 {
            0.0
        } else {
            f64::from(duration.saturating_sub(remaining)) / f64::from(duration)
        };
        let session_number = match self.session_type {
            SessionType::Work => self.completed_work + 1,
            SessionType::ShortBreak | SessionType::LongBreak => self.completed_work,
        };
        PomodoroStatus {
            session_type: self.session_type,
            label: self.session_type.label(),
            remaining,
            clock: format_clock(remaining),
            duration,
            active: self.countdown.is_active(),
            progress,
            session_number,
            completed_work_sessions: self.completed_work,
            settings: self.settings,
        }
    }

    fn handle(&mut self, command: PomodoroCommand) {
        match command {
            PomodoroCommand::Start => self.start(),
            PomodoroCommand::Pause => self.pause(),
            PomodoroCommand::Reset => self.reset(),
            PomodoroCommand::Select(session_type) => self.select(session_type),
            PomodoroCommand::ApplySettings(settings) => self.apply_settings(settings),
        }
    }
}

/// Commands accepted by the pomodoro driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PomodoroCommand {
    Start,
    Pause,
    Reset,
    Select(SessionType),
    ApplySettings(PomodoroSettings),
}

type Request = (PomodoroCommand, oneshot::Sender<PomodoroStatus>);

/// Handle to a running pomodoro driver. Cloneable; the driver stops when the
/// last handle is dropped.
#[derive(Clone)]
pub struct PomodoroHandle {
    commands: mpsc::Sender<Request>,
    status: watch::Receiver<PomodoroStatus>,
}

impl PomodoroHandle {
    /// Spawn a driver ticking once per `period` (one second in production).
    pub fn spawn(settings: PomodoroSettings, period: Duration) -> Self {
        let cycle = PomodoroCycle::new(settings);
        let (status_tx, status_rx) = watch::channel(cycle.status());
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        tokio::spawn(run_driver(cycle, cmd_rx, status_tx, period));
        Self {
            commands: cmd_tx,
            status: status_rx,
        }
    }

    /// Latest published status.
    pub fn status(&self) -> PomodoroStatus {
        self.status.borrow().clone()
    }

    /// Receiver notified on every status change.
    pub fn subscribe(&self) -> watch::Receiver<PomodoroStatus> {
        self.status.clone()
    }

    /// Send a command and wait for the status after it was applied.
    pub async fn send(&self, command: PomodoroCommand) -> AppResult<PomodoroStatus> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send((command, reply_tx))
            .await
            .map_err(|_| AppError::internal("Pomodoro driver has stopped"))?;
        reply_rx
            .await
            .map_err(|_| AppError::internal("Pomodoro driver dropped the reply"))
    }
}

async fn run_driver(
    mut cycle: PomodoroCycle,
    mut commands: mpsc::Receiver<Request>,
    status: watch::Sender<PomodoroStatus>,
    period: Duration,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            request = commands.recv() => {
                let Some((command, reply)) = request else {
                    debug!("Pomodoro driver stopping: all handles dropped");
                    break;
                };
                let was_active = cycle.is_active();
                cycle.handle(command);
                if !was_active && cycle.is_active() {
                    // A fresh start gets a full period before its first tick.
                    ticker.reset();
                }
                debug!(?command, "Pomodoro command applied");
                let current = cycle.status();
                status.send_replace(current.clone());
                let _ = reply.send(current);
            }
            _ = ticker.tick() => {
                if !cycle.is_active() {
                    continue;
                }
                if let Some(finished) = cycle.tick() {
                    info!(
                        finished = finished.label(),
                        next = cycle.session_type().label(),
                        "Pomodoro session complete"
                    );
                }
                status.send_replace(cycle.status());
            }
        }
    }
}
