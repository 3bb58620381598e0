//! The progress hook a search reports to, and cooperative cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use scentgrid_core::{Grid, Point};

/// What just happened in a search.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Step {
    /// A cell was popped from the frontier and its neighbors relaxed.
    Expanded(Point),
    /// A cell of the final path was traced, walking back from the end.
    Traced(Point),
}

impl Step {
    #[inline]
    pub fn pos(self) -> Point {
        match self {
            Self::Expanded(p) | Self::Traced(p) => p,
        }
    }
}

/// Receives a callback after every meaningful change a search makes.
///
/// `on_step` is called synchronously from inside
/// [`PathSearch::run`](crate::PathSearch::run): once per frontier expansion
/// and once per traced path cell. The grid passed in reflects the marks
/// written so far. A slow observer slows the search down by exactly that
/// much.
///
/// Closures `FnMut(&Grid, Step)` implement this trait.
pub trait StepObserver {
    fn on_step(&mut self, grid: &Grid, step: Step);

    /// Polled once per search iteration, before the next frontier pop.
    fn cancelled(&self) -> bool {
        false
    }
}

impl<F> StepObserver for F
where
    F: FnMut(&Grid, Step),
{
    #[inline]
    fn on_step(&mut self, grid: &Grid, step: Step) {
        self(grid, step)
    }
}

/// Ignores every step.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl StepObserver for NoopObserver {
    #[inline]
    fn on_step(&mut self, _grid: &Grid, _step: Step) {}
}

/// Keeps every step it sees, optionally asking for cancellation once a
/// number of steps has been seen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordingObserver {
    steps: Vec<Step>,
    cancel_after: Option<usize>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation after `n` steps (builder).
    pub fn with_cancel_after(mut self, n: usize) -> Self {
        self.cancel_after = Some(n);
        self
    }

    #[inline]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn expanded(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, Step::Expanded(_)))
            .count()
    }

    pub fn traced(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, Step::Traced(_)))
            .count()
    }

    pub fn clear(&mut self) {
        self.steps.clear();
    }
}

impl StepObserver for RecordingObserver {
    fn on_step(&mut self, _grid: &Grid, step: Step) {
        self.steps.push(step);
    }

    fn cancelled(&self) -> bool {
        self.cancel_after.is_some_and(|n| self.steps.len() >= n)
    }
}

// ---------------------------------------------------------------------------
// CancelToken
// ---------------------------------------------------------------------------

/// A cooperative-cancellation flag backed by an [`AtomicBool`].
///
/// Clones share the same flag, so one clone can be handed to whatever
/// decides to abort (a key handler, another thread) while the search holds
/// another.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether cancellation has been requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Request cancellation.
    #[inline]
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Clear a previous request so the token can be reused.
    #[inline]
    pub fn reset(&self) {
        self.flag.store(false, Ordering::Relaxed);
    }
}
