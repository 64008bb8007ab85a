use crate::{agent::Agent, options::TrackerType};

// a tracker answers "who could be near agent i" for one frame's snapshot of the
// flock; the rules still check the actual distance, so a tracker may return a
// superset of the true neighbours but never miss one

pub trait Tracker: Send + Sync {
    /// Re-indexes `agents`, queries until the next rebuild are answered for
    /// this snapshot. `reach` is the largest distance a query has to cover.
    fn rebuild(&mut self, agents: &[Agent], reach: f32);
    /// Pushes indices of candidate neighbours of `agents[index]` into `out`,
    /// in ascending order and without `index` itself.
    fn get_neighbours(&self, index: usize, agents: &[Agent], out: &mut Vec<usize>);
    fn tracker_type(&self) -> TrackerType;
}

pub fn get_tracker(tracker_type: TrackerType) -> Box<dyn Tracker> {
    match tracker_type {
        TrackerType::Naive => Box::new(super::naive_tracker::NaiveTracker::default()),
        TrackerType::SpatHash => Box::new(super::spathash_tracker::SpatHashTracker::default()),
    }
}
