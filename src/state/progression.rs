use std::fmt;

use serde::Deserialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::state::run::Run;

/// Direction of a run switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Advance to the following run.
    Next,
    /// Go back to the preceding run.
    Previous,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Next => f.write_str("next"),
            Direction::Previous => f.write_str("previous"),
        }
    }
}

/// A switch would move past either end of the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no {0} run")]
pub struct BoundaryError(pub Direction);

/// Read-only copy of the (previous, current, next) pointers.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveTriple {
    /// Run before the current one, or the empty sentinel.
    pub prev: Run,
    /// Active run.
    pub current: Run,
    /// Run after the current one, or the empty sentinel.
    pub next: Run,
}

/// Position in the schedule plus cached run pointers.
///
/// `up_next` only follows `next` on [`RunProgression::refresh_announced_next`].
#[derive(Debug, Clone)]
pub struct RunProgression {
    index: usize,
    prev: Run,
    current: Run,
    next: Run,
    up_next: Run,
    notice: String,
}

impl RunProgression {
    /// Progression for an empty schedule; `current` carries `notice`.
    pub fn new(notice: impl Into<String>) -> Self {
        let notice = notice.into();
        Self {
            index: 0,
            prev: Run::empty(),
            current: Run::placeholder(notice.clone()),
            next: Run::empty(),
            up_next: Run::empty(),
            notice,
        }
    }

    /// Current schedule position.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Active run.
    pub fn current(&self) -> &Run {
        &self.current
    }

    /// Active run, for completion record writes.
    pub fn current_mut(&mut self) -> &mut Run {
        &mut self.current
    }

    /// Run announced on stream as coming up.
    pub fn up_next(&self) -> &Run {
        &self.up_next
    }

    /// Snapshot of the (previous, current, next) pointers.
    pub fn active_triple(&self) -> ActiveTriple {
        ActiveTriple {
            prev: self.prev.clone(),
            current: self.current.clone(),
            next: self.next.clone(),
        }
    }

    /// Index a switch in `direction` would land on, given `count` runs.
    pub fn target_index(&self, direction: Direction, count: usize) -> Result<usize, BoundaryError> {
        match direction {
            Direction::Next if self.index + 1 < count => Ok(self.index + 1),
            Direction::Previous if self.index > 0 && count > 0 => {
                Ok((self.index - 1).min(count - 1))
            }
            _ => Err(BoundaryError(direction)),
        }
    }

    /// Install freshly read pointers around `index`.
    ///
    /// `None` neighbours become the empty sentinel; a `None` current means the
    /// schedule is empty and the placeholder is kept.
    pub fn apply(&mut self, index: usize, prev: Option<Run>, current: Option<Run>, next: Option<Run>) {
        match current {
            Some(current) => {
                self.index = index;
                self.current = current;
            }
            None => {
                self.index = 0;
                self.current = Run::placeholder(self.notice.clone());
            }
        }
        self.prev = prev.unwrap_or_else(Run::empty);
        self.next = next.unwrap_or_else(Run::empty);
    }

    /// Copy `next` into the announced-next slot.
    pub fn refresh_announced_next(&mut self) -> &Run {
        self.up_next = self.next.clone();
        &self.up_next
    }
}
