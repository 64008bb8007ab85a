use serde::{Deserialize, Serialize};

use crate::error::FlockError;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub world: WorldSize,
    /// seed for agent placement, `None` draws one from entropy
    pub seed: Option<u64>,
    pub tracker_type: TrackerType,
    pub update_order: UpdateOrder,
    pub sample_rate: u64,
    pub save_options: SaveOptions,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            world: WorldSize {
                width: 1920.,
                height: 1080.,
            },
            seed: None,
            tracker_type: TrackerType::Naive,
            update_order: UpdateOrder::Snapshot,
            sample_rate: 1,
            save_options: SaveOptions {
                save_locations: false,
                save_locations_path: Some("./".to_owned()),
                save_locations_timestamp: true,
            },
        }
    }
}

/// World rectangle, spanning `[0, width] x [0, height]`.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct WorldSize {
    pub width: f32,
    pub height: f32,
}

impl WorldSize {
    pub fn new(width: f32, height: f32) -> Result<Self, FlockError> {
        let world = WorldSize { width, height };
        world.validate()?;
        Ok(world)
    }

    pub fn validate(&self) -> Result<(), FlockError> {
        if self.width.is_finite() && self.height.is_finite() && self.width > 0. && self.height > 0.
        {
            Ok(())
        } else {
            Err(FlockError::InvalidWorld {
                width: self.width,
                height: self.height,
            })
        }
    }
}

/// Per-frame switches read by [`crate::flock::Flock::update`].
///
/// Held and mutated by the caller and passed by value every frame.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Toggles {
    pub check_boundaries: bool,
    pub horizontal_cyclic_boundary: bool,
    pub vertical_cyclic_boundary: bool,
    pub separation_active: bool,
    pub alignment_active: bool,
    pub cohesion_active: bool,
    pub horizontal_wall_active: bool,
    pub vertical_wall_active: bool,
}

impl Default for Toggles {
    fn default() -> Self {
        Toggles {
            check_boundaries: true,
            horizontal_cyclic_boundary: false,
            vertical_cyclic_boundary: true,
            separation_active: true,
            alignment_active: false,
            cohesion_active: true,
            horizontal_wall_active: true,
            vertical_wall_active: true,
        }
    }
}

impl Toggles {
    /// All switches off, handy as a starting point for isolating a single rule.
    pub fn none() -> Self {
        Toggles {
            check_boundaries: false,
            horizontal_cyclic_boundary: false,
            vertical_cyclic_boundary: false,
            separation_active: false,
            alignment_active: false,
            cohesion_active: false,
            horizontal_wall_active: false,
            vertical_wall_active: false,
        }
    }

    /// true when at least one rule or wall contributes to the velocity
    pub fn any_steering(&self) -> bool {
        self.separation_active
            || self.alignment_active
            || self.cohesion_active
            || self.horizontal_wall_active
            || self.vertical_wall_active
    }

    pub fn any_rule(&self) -> bool {
        self.separation_active || self.alignment_active || self.cohesion_active
    }

    pub fn get(&self, flag: ToggleFlag) -> bool {
        match flag {
            ToggleFlag::CheckBoundaries => self.check_boundaries,
            ToggleFlag::HorizontalCyclicBoundary => self.horizontal_cyclic_boundary,
            ToggleFlag::VerticalCyclicBoundary => self.vertical_cyclic_boundary,
            ToggleFlag::Separation => self.separation_active,
            ToggleFlag::Alignment => self.alignment_active,
            ToggleFlag::Cohesion => self.cohesion_active,
            ToggleFlag::HorizontalWall => self.horizontal_wall_active,
            ToggleFlag::VerticalWall => self.vertical_wall_active,
        }
    }

    /// Flips a single switch and returns its new value.
    pub fn flip(&mut self, flag: ToggleFlag) -> bool {
        let slot = match flag {
            ToggleFlag::CheckBoundaries => &mut self.check_boundaries,
            ToggleFlag::HorizontalCyclicBoundary => &mut self.horizontal_cyclic_boundary,
            ToggleFlag::VerticalCyclicBoundary => &mut self.vertical_cyclic_boundary,
            ToggleFlag::Separation => &mut self.separation_active,
            ToggleFlag::Alignment => &mut self.alignment_active,
            ToggleFlag::Cohesion => &mut self.cohesion_active,
            ToggleFlag::HorizontalWall => &mut self.horizontal_wall_active,
            ToggleFlag::VerticalWall => &mut self.vertical_wall_active,
        };
        *slot = !*slot;
        *slot
    }
}

#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub enum ToggleFlag {
    CheckBoundaries,
    HorizontalCyclicBoundary,
    VerticalCyclicBoundary,
    Separation,
    Alignment,
    Cohesion,
    HorizontalWall,
    VerticalWall,
}

#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
// {"type": "SpatHash"}
pub enum TrackerType {
    /// all-pairs neighbour scan
    Naive,
    /// uniform hash grid sized by the largest active rule range
    SpatHash,
}

/// How the per-agent pass observes the rest of the flock.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UpdateOrder {
    /// Every agent reads the same pre-update snapshot; results do not depend
    /// on the order of the agent collection.
    Snapshot,
    /// Agents are updated in place, one after another, so later agents see
    /// the already-updated velocities of earlier ones.
    Sequential,
}

#[derive(Debug, Clone)]
pub struct SaveOptions {
    pub save_locations: bool,
    pub save_locations_path: Option<String>,
    pub save_locations_timestamp: bool,
}
