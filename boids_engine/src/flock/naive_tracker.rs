use crate::{agent::Agent, options::TrackerType};

use super::tracker::Tracker;

/// A naive implementation of agent tracking, which uses an O(N^2) algorithm for
/// finding agent's neighbours.
#[derive(Debug, Default)]
pub struct NaiveTracker;

impl Tracker for NaiveTracker {
    fn rebuild(&mut self, _: &[Agent], _: f32) {
        // nothing to index
    }

    fn get_neighbours(&self, index: usize, agents: &[Agent], out: &mut Vec<usize>) {
        out.extend((0..agents.len()).filter(|&other| other != index));
    }

    fn tracker_type(&self) -> TrackerType {
        TrackerType::Naive
    }
}
