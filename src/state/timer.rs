use std::{fmt, time::Duration};

use thiserror::Error;
use tokio::time::Instant;

/// Authoritative state of the run timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerPhase {
    /// Not started; the only state from which runs may be switched.
    #[default]
    Stopped,
    /// Clock is ticking.
    Running,
    /// Clock frozen, pause interval is excluded from elapsed time.
    Paused,
    /// Every participant has a completion time.
    Finished,
}

impl fmt::Display for TimerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimerPhase::Stopped => "Stopped",
            TimerPhase::Running => "Running",
            TimerPhase::Paused => "Paused",
            TimerPhase::Finished => "Finished",
        };
        f.write_str(name)
    }
}

/// Commands that are gated on the timer phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start the clock from zero.
    Start,
    /// Freeze the clock.
    Pause,
    /// Continue after a pause, or restart after a finish.
    Resume,
    /// Stop the clock and finish every remaining participant.
    Finish,
    /// Clear the clock and every completion record.
    Reset,
    /// Finish a single participant.
    PlayerFinish,
    /// Move the run progression to another run.
    SwitchRun,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Command::Start => "start",
            Command::Pause => "pause",
            Command::Resume => "resume",
            Command::Finish => "finish",
            Command::Reset => "reset",
            Command::PlayerFinish => "playerFinish",
            Command::SwitchRun => "switchRun",
        };
        f.write_str(name)
    }
}

/// A command was issued while the timer was in a phase that forbids it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{command} not allowed while state is {from}")]
pub struct InvalidStateTransition {
    /// The rejected command.
    pub command: Command,
    /// Phase the timer was in when the command arrived.
    pub from: TimerPhase,
}

/// How a resume was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeKind {
    /// Continued from a pause; elapsed time carries on.
    Continued,
    /// Restarted from a finish; elapsed time and completion records start over.
    Restarted,
}

/// Point-in-time copy of the timer, used for broadcasts and queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerSnapshot {
    /// Current phase.
    pub phase: TimerPhase,
    /// Elapsed running time.
    pub elapsed: Duration,
}

/// Run clock with pause splicing.
///
/// All methods take the current instant explicitly; the caller owns the
/// clock and the tick task.
#[derive(Debug, Clone, Default)]
pub struct Timer {
    phase: TimerPhase,
    elapsed: Duration,
    start_reference: Option<Instant>,
    paused_at: Option<Instant>,
}

impl Timer {
    /// Create a stopped timer at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    /// Last stored elapsed value.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Copy of the externally visible fields.
    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            phase: self.phase,
            elapsed: self.elapsed,
        }
    }

    /// Elapsed time as of `now`; frozen outside of [`TimerPhase::Running`].
    pub fn elapsed_at(&self, now: Instant) -> Duration {
        match (self.phase, self.start_reference) {
            (TimerPhase::Running, Some(start)) => now.saturating_duration_since(start),
            _ => self.elapsed,
        }
    }

    /// Check the transition table without mutating anything.
    pub fn ensure(&self, command: Command) -> Result<(), InvalidStateTransition> {
        let allowed = match command {
            Command::Start | Command::SwitchRun => self.phase == TimerPhase::Stopped,
            Command::Pause | Command::Finish | Command::PlayerFinish => {
                self.phase == TimerPhase::Running
            }
            Command::Resume | Command::Reset => {
                matches!(self.phase, TimerPhase::Paused | TimerPhase::Finished)
            }
        };

        if allowed {
            Ok(())
        } else {
            Err(InvalidStateTransition {
                command,
                from: self.phase,
            })
        }
    }

    /// Stopped → Running.
    pub fn start(&mut self, now: Instant) -> Result<(), InvalidStateTransition> {
        self.ensure(Command::Start)?;
        self.start_reference = Some(now);
        self.paused_at = None;
        self.elapsed = Duration::ZERO;
        self.phase = TimerPhase::Running;
        Ok(())
    }

    /// Running → Paused.
    pub fn pause(&mut self, now: Instant) -> Result<(), InvalidStateTransition> {
        self.ensure(Command::Pause)?;
        self.elapsed = self.elapsed_at(now);
        self.paused_at = Some(now);
        self.phase = TimerPhase::Paused;
        Ok(())
    }

    /// Paused → Running (continue) or Finished → Running (restart from zero).
    pub fn resume(&mut self, now: Instant) -> Result<ResumeKind, InvalidStateTransition> {
        self.ensure(Command::Resume)?;
        let kind = match self.phase {
            TimerPhase::Finished => {
                self.start_reference = Some(now);
                self.elapsed = Duration::ZERO;
                ResumeKind::Restarted
            }
            _ => {
                let paused_for = self
                    .paused_at
                    .map(|paused| now.saturating_duration_since(paused))
                    .unwrap_or_default();
                self.start_reference = self.start_reference.map(|start| start + paused_for);
                ResumeKind::Continued
            }
        };
        self.paused_at = None;
        self.phase = TimerPhase::Running;
        Ok(kind)
    }

    /// Running → Finished, returning the elapsed time frozen at `now`.
    pub fn finish(&mut self, now: Instant) -> Result<Duration, InvalidStateTransition> {
        self.ensure(Command::Finish)?;
        self.elapsed = self.elapsed_at(now);
        self.phase = TimerPhase::Finished;
        Ok(self.elapsed)
    }

    /// Finished/Paused → Stopped with elapsed cleared.
    pub fn reset(&mut self) -> Result<(), InvalidStateTransition> {
        self.ensure(Command::Reset)?;
        self.elapsed = Duration::ZERO;
        self.start_reference = None;
        self.paused_at = None;
        self.phase = TimerPhase::Stopped;
        Ok(())
    }

    /// Periodic update; returns the new elapsed value when running.
    pub fn tick(&mut self, now: Instant) -> Option<Duration> {
        if self.phase != TimerPhase::Running {
            return None;
        }
        self.elapsed = self.elapsed_at(now);
        Some(self.elapsed)
    }
}
