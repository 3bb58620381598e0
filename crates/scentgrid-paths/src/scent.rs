//! Scent diffusion from source cells.
//!
//! A source holds a fixed seed intensity. Propagation walks the cached
//! neighbor lists breadth-first, halving the intensity at every hop; a
//! neighbor is raised by `candidate - floor` when the halved value is at
//! least the relay floor and at least what the neighbor already holds. Each
//! cell relays once per propagation, so a stronger value reaching it later in
//! the same pass is not forwarded again. Passes from further sources only
//! ever add scent.

use std::collections::VecDeque;

use log::{debug, trace};
use scentgrid_core::{Error, Grid, Point, Result};

/// Diffusion constants.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScentConfig {
    /// Intensity written on a source cell.
    pub seed: f64,
    /// Smallest halved intensity that still spreads.
    pub relay_floor: f64,
}

impl Default for ScentConfig {
    fn default() -> Self {
        Self {
            seed: 8.0,
            relay_floor: 1.0,
        }
    }
}

impl ScentConfig {
    /// Scent normalized to `[0, 1]` against the seed, for display gradients.
    #[inline]
    pub fn heat(&self, scent: f64) -> f64 {
        if self.seed <= 0.0 {
            return 0.0;
        }
        (scent / self.seed).clamp(0.0, 1.0)
    }
}

/// Spreads scent over a [`Grid`].
///
/// Holds only reusable scratch space; the scent values themselves live in
/// the grid's cells.
#[derive(Debug, Default)]
pub struct ScentField {
    config: ScentConfig,
    visited: Vec<u32>,
    generation: u32,
    queue: VecDeque<(usize, f64)>,
    nbuf: Vec<Point>,
}

impl ScentField {
    pub fn new(config: ScentConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[inline]
    pub fn config(&self) -> &ScentConfig {
        &self.config
    }

    /// Make `p` a source holding the seed intensity and spread from it.
    ///
    /// Wall, Start and End cells are rejected. Marking an existing source
    /// does nothing. Returns the number of neighbor raises performed.
    pub fn mark_source(&mut self, grid: &mut Grid, p: Point) -> Result<usize> {
        if !grid.add_source(p, self.config.seed)? {
            debug!("{p} is already a scent source");
            return Ok(0);
        }
        self.propagate(grid, p)
    }

    /// Spread the scent currently held by `source` through the grid.
    ///
    /// Uses the grid's cached neighbor lists, so the result depends on the
    /// adjacency mode in effect. Returns the number of neighbor raises.
    pub fn propagate(&mut self, grid: &mut Grid, source: Point) -> Result<usize> {
        let si = grid.index(source).ok_or(Error::OutOfBounds {
            pos: source,
            size: grid.size(),
        })?;
        let generation = self.next_generation(grid.cell_count());
        let floor = self.config.relay_floor;

        self.queue.clear();
        self.queue.push_back((si, grid.cells()[si].scent()));

        let mut nbuf = std::mem::take(&mut self.nbuf);
        let mut raised = 0;

        while let Some((ci, incoming)) = self.queue.pop_front() {
            if self.visited[ci] == generation || incoming < floor {
                continue;
            }
            self.visited[ci] = generation;

            let candidate = incoming / 2.0;
            if candidate < floor {
                continue;
            }

            nbuf.clear();
            nbuf.extend_from_slice(grid.neighbors(grid.point(ci)));

            for &np in nbuf.iter() {
                let Some(ni) = grid.index(np) else {
                    continue;
                };
                let cell = &grid.cells()[ni];
                if cell.role().blocks_scent() || candidate < cell.scent() {
                    continue;
                }
                grid.raise_scent(np, candidate - floor);
                trace!("scent at {np} raised to {}", grid.cells()[ni].scent());
                raised += 1;
                self.queue.push_back((ni, candidate));
            }
        }

        self.nbuf = nbuf;
        debug!("scent from {source}: {raised} raises");
        Ok(raised)
    }

    /// See [`ScentConfig::heat`].
    #[inline]
    pub fn heat(&self, scent: f64) -> f64 {
        self.config.heat(scent)
    }

    /// Bump the visit generation, resizing the stamp buffer to `len`.
    fn next_generation(&mut self, len: usize) -> u32 {
        if self.visited.len() != len {
            self.visited.clear();
            self.visited.resize(len, 0);
            self.generation = 0;
        }
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            self.visited.fill(0);
            self.generation = 1;
        }
        self.generation
    }
}
