//! Scent diffusion and scent-weighted best-first search.
//!
//! - [`ScentField`] spreads a decaying intensity outward from source cells
//!   through the passable neighbor graph.
//! - [`PathSearch`] runs a best-first (A*-family) search whose cost is the
//!   Manhattan heuristic plus a penalty proportional to the scent of each
//!   cell, so the path bends away from scented regions.
//! - [`StepObserver`] is the hook a caller supplies to watch a search as it
//!   runs (redraw, record, cancel).
//!
//! Both algorithms keep their scratch buffers between calls, so repeated
//! runs on the same grid do not reallocate.
//!
//! The search is not guaranteed to be optimal: every move costs
//! 1 (diagonals included), the Manhattan estimate overshoots under
//! 8-directional movement, and the scent term is added on top.

mod distance;
mod frontier;
mod observer;
mod scent;
mod search;

pub use distance::manhattan;
pub use observer::{CancelToken, NoopObserver, RecordingObserver, Step, StepObserver};
pub use scent::{ScentConfig, ScentField};
pub use search::{Expansion, Path, PathResult, PathSearch, SearchConfig};
