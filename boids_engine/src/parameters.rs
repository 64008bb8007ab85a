use serde::{Deserialize, Serialize};

use crate::error::FlockError;

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct SpeedRange {
    pub low: f32,
    pub high: f32,
}

/// Tunable coefficients as produced by a configuration surface.
///
/// The surface writes fields and calls [`ParameterSet::mark_changed`]; the
/// flock consumes the record through
/// [`crate::flock::Flock::apply_parameters`] and clears the flag.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterSet {
    /// number of agents created on start or reset
    pub agent_count: usize,
    /// rendering size of an agent
    pub agent_scale: f32,
    /// speed band, multiplied by `speed_scale`
    pub speed_range: SpeedRange,
    pub speed_scale: f32,
    pub avoid_range: f32,
    pub avoid_factor: f32,
    pub align_range: f32,
    pub align_factor: f32,
    pub cohesion_range: f32,
    pub cohesion_factor: f32,
    /// distance from a world edge within which the wall nudge applies
    pub turn_margin: f32,
    pub turn_factor: f32,

    #[serde(skip)]
    pub(crate) changed: bool,
}

impl Default for ParameterSet {
    fn default() -> Self {
        ParameterSet {
            agent_count: 1300,
            agent_scale: 2.,
            speed_range: SpeedRange { low: 1., high: 2. },
            speed_scale: 200.,
            avoid_range: 15.,
            avoid_factor: 2.,
            align_range: 100.,
            align_factor: 0.08,
            cohesion_range: 50.,
            cohesion_factor: 0.005,
            turn_margin: 80.,
            turn_factor: 20.,
            changed: false,
        }
    }
}

impl ParameterSet {
    pub fn mark_changed(&mut self) {
        self.changed = true;
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Clears the dirty flag, returning whether it was set.
    pub fn take_changed(&mut self) -> bool {
        std::mem::replace(&mut self.changed, false)
    }
}

/// Validated snapshot of the tunables a flock runs with.
///
/// Never mutated in place; a flock swaps the whole value when a changed
/// [`ParameterSet`] is applied.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct FlockParameters {
    pub speed_min: f32,
    pub speed_max: f32,
    pub speed_scale: f32,
    pub agent_scale: f32,
    pub avoid_range: f32,
    pub avoid_factor: f32,
    pub align_range: f32,
    pub align_factor: f32,
    pub cohesion_range: f32,
    pub cohesion_factor: f32,
    pub turn_margin: f32,
    pub turn_factor: f32,
}

impl FlockParameters {
    /// Speed a freshly created agent caches, the speed scale fitted into the band.
    pub fn initial_speed(&self) -> f32 {
        self.speed_scale.clamp(self.speed_min, self.speed_max)
    }
}

impl TryFrom<&ParameterSet> for FlockParameters {
    type Error = FlockError;

    fn try_from(set: &ParameterSet) -> Result<Self, Self::Error> {
        let speed_min = set.speed_range.low * set.speed_scale;
        let speed_max = set.speed_range.high * set.speed_scale;

        if !(speed_min.is_finite() && speed_max.is_finite()) || speed_min <= 0. || speed_max <= 0. {
            return Err(FlockError::NonPositiveSpeed {
                min: speed_min,
                max: speed_max,
            });
        }

        if speed_min > speed_max {
            return Err(FlockError::InvertedSpeedRange {
                min: speed_min,
                max: speed_max,
            });
        }

        non_negative("agent_scale", set.agent_scale)?;
        non_negative("avoid_range", set.avoid_range)?;
        non_negative("align_range", set.align_range)?;
        non_negative("cohesion_range", set.cohesion_range)?;
        non_negative("turn_margin", set.turn_margin)?;
        finite("avoid_factor", set.avoid_factor)?;
        finite("align_factor", set.align_factor)?;
        finite("cohesion_factor", set.cohesion_factor)?;
        finite("turn_factor", set.turn_factor)?;

        Ok(FlockParameters {
            speed_min,
            speed_max,
            speed_scale: set.speed_scale,
            agent_scale: set.agent_scale,
            avoid_range: set.avoid_range,
            avoid_factor: set.avoid_factor,
            align_range: set.align_range,
            align_factor: set.align_factor,
            cohesion_range: set.cohesion_range,
            cohesion_factor: set.cohesion_factor,
            turn_margin: set.turn_margin,
            turn_factor: set.turn_factor,
        })
    }
}

fn finite(name: &'static str, value: f32) -> Result<(), FlockError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(FlockError::InvalidParameter { name, value })
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), FlockError> {
    finite(name, value)?;
    if value < 0. {
        Err(FlockError::InvalidParameter { name, value })
    } else {
        Ok(())
    }
}
