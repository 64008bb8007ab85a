use std::collections::HashMap;

use crate::{agent::Agent, options::TrackerType};

use super::tracker::Tracker;

/// Uses a spatial hashing space division method: agents are bucketed into
/// square cells whose side is the largest distance a query must cover, so every
/// agent within reach lies in the home cell or one of its 8 neighbours.
///
/// Cells are keyed by their integer coordinates, which keeps agents that left
/// the world rectangle (boundaries off) addressable without clamping.
///
/// Uses a Θ(n) algorithm for finding the agent's neighbours on evenly spread
/// flocks.
#[derive(Debug, Default)]
pub struct SpatHashTracker {
    /// environment units per cell, along both axes
    cell_size: f32,
    table: HashMap<(i32, i32), Vec<usize>>,
    /// For each agent, records its cell.
    /// Indexes are positions in the snapshot the table was built from.
    index: Vec<(i32, i32)>,
}

/// cells are a touch wider than the reach so rounding in the division never
/// pushes an in-range neighbour two cells away
const CELL_SLACK: f32 = 1.001;

#[rustfmt::skip]
const LOOKUP: [(i32, i32); 9] = [
    (-1, 1), (0, 1), (1, 1),
    (-1, 0), (0, 0), (1, 0),
    (-1, -1), (0, -1), (1, -1),
];

impl SpatHashTracker {
    /// Returns the cell containing the point `(p_x, p_y)` for cells of side `cell_size`.
    ///
    /// `as` casts saturate, so points far outside the world collapse into the
    /// outermost representable cells instead of overflowing.
    pub fn get_cell(p_x: f32, p_y: f32, cell_size: f32) -> (i32, i32) {
        ((p_x / cell_size).floor() as i32, (p_y / cell_size).floor() as i32)
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn cell_count(&self) -> usize {
        self.table.len()
    }
}

impl Tracker for SpatHashTracker {
    fn rebuild(&mut self, agents: &[Agent], reach: f32) {
        // a zero reach still needs a usable cell, nothing can be closer than 0 anyway
        self.cell_size = if reach > f32::EPSILON {
            reach * CELL_SLACK
        } else {
            1.
        };

        // keep the per-cell allocations around between frames
        self.table.values_mut().for_each(|cell| cell.clear());
        self.index.clear();

        for (i, agent) in agents.iter().enumerate() {
            let position = agent.position();
            let cell = SpatHashTracker::get_cell(position.x, position.y, self.cell_size);
            self.table.entry(cell).or_default().push(i);
            self.index.push(cell);
        }

        self.table.retain(|_, cell| !cell.is_empty());
    }

    fn get_neighbours(&self, index: usize, agents: &[Agent], out: &mut Vec<usize>) {
        let home = match self.index.get(index) {
            Some(cell) => *cell,
            // not indexed (table built from another snapshot), fall back to a full scan
            None => {
                out.extend((0..agents.len()).filter(|&other| other != index));
                return;
            }
        };

        let start = out.len();

        LOOKUP
            .iter()
            .map(|(dx, dy)| (home.0.saturating_add(*dx), home.1.saturating_add(*dy)))
            .filter_map(|cell| self.table.get(&cell))
            .flatten()
            .filter(|&&other| other != index)
            .for_each(|&other| out.push(other));

        // visiting candidates in index order makes the rule sums identical to the naive scan
        out[start..].sort_unstable();
        // saturated edge cells can be looked up twice
        out.dedup();
    }

    fn tracker_type(&self) -> TrackerType {
        TrackerType::SpatHash
    }
}
