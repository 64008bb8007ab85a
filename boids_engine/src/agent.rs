use glam::f32::Vec2;

use crate::{
    math_helpers::{clamp_coordinate, distance_agent, heading_of, heading_unit, wrap_coordinate},
    options::{Toggles, WorldSize},
    parameters::FlockParameters,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Agent {
    // sequential id starting from 0
    pub id: usize,
    position: Vec2,
    velocity: Vec2,
    /// cached heading, survives a stop so that motion resumes in the same direction
    heading: f32,
    /// cached magnitude of velocity, survives a stop
    speed: f32,
    scale: f32,
}

impl Agent {
    /// Creates a new [`Agent`] at rest, facing `angle` and remembering `speed`
    /// for when motion starts.
    pub fn new(id: usize, position: Vec2, angle: f32, scale: f32, speed: f32) -> Self {
        Agent {
            id,
            position,
            velocity: Vec2::ZERO,
            heading: angle,
            speed,
            scale,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Orientation for rendering, in radians.
    pub fn heading(&self) -> f32 {
        self.heading
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Sets the velocity, keeping its magnitude inside `[min_speed, max_speed]`.
    ///
    /// The direction of `(vx, vy)` is preserved. A zero or non-finite vector has
    /// no usable direction, in that case the agent keeps its heading and moves
    /// at `min_speed`.
    pub fn set_velocity_clamped(&mut self, vx: f32, vy: f32, min_speed: f32, max_speed: f32) {
        let raw = Vec2::new(vx, vy);
        let raw_speed = raw.length();

        if raw_speed == 0. || !raw.is_finite() {
            self.velocity = heading_unit(self.heading) * min_speed;
            self.speed = min_speed;
            return;
        }

        self.heading = heading_of(vx, vy);

        self.velocity = if raw_speed >= max_speed {
            // |raw| overflows f32 past ~1.8e19, scale down before normalising
            (raw / raw.abs().max_element()).normalize() * max_speed
        } else if raw_speed < min_speed {
            raw / raw_speed * min_speed
        } else {
            raw
        };

        self.speed = if raw_speed >= max_speed {
            max_speed
        } else if raw_speed < min_speed {
            min_speed
        } else {
            raw_speed
        };
    }

    /// Resumes motion along the cached heading at the cached speed.
    pub fn accelerate(&mut self) {
        self.velocity = heading_unit(self.heading) * self.speed;
    }

    /// Halts the agent, remembering its speed.
    pub fn stop(&mut self) {
        // `speed` already holds |velocity|, every velocity write keeps it in step,
        // so stopping twice does not lose it
        self.velocity = Vec2::ZERO;
    }

    /// Brings the cached speed back into `[min_speed, max_speed]` after the band
    /// changed. Moving agents are re-clamped along their current direction.
    pub fn fit_speed(&mut self, min_speed: f32, max_speed: f32) {
        if self.velocity == Vec2::ZERO {
            self.speed = self.speed.clamp(min_speed, max_speed);
        } else if self.speed < min_speed || self.speed > max_speed {
            self.set_velocity_clamped(self.velocity.x, self.velocity.y, min_speed, max_speed);
        }
    }

    /// Keeps the position inside the world.
    ///
    /// Cyclic axes wrap onto `[0, bound)`, the others are clamped to
    /// `[0, bound]`. Velocity is never touched.
    pub fn apply_boundary(
        &mut self,
        width: f32,
        height: f32,
        cyclic_horizontal: bool,
        cyclic_vertical: bool,
    ) {
        self.position.x = if cyclic_horizontal {
            wrap_coordinate(self.position.x, width)
        } else {
            clamp_coordinate(self.position.x, width)
        };

        self.position.y = if cyclic_vertical {
            wrap_coordinate(self.position.y, height)
        } else {
            clamp_coordinate(self.position.y, height)
        };
    }

    // Actually shifts the individual's location
    pub fn advance(&mut self, dt: f32) {
        self.position += self.velocity * dt;
    }

    /// Computes the raw (unclamped) velocity for the next frame.
    ///
    /// `neighbours` may contain the agent itself and agents out of range, both
    /// are filtered here. Only rules switched on in `toggles` contribute.
    pub fn run_rules<'a, I>(
        &self,
        neighbours: I,
        params: &FlockParameters,
        toggles: &Toggles,
        world: &WorldSize,
    ) -> Vec2
    where
        I: IntoIterator<Item = &'a Agent>,
    {
        let mut neighbourhood = Neighbourhood::default();

        if toggles.any_rule() {
            for other in neighbours {
                if other.id == self.id {
                    continue;
                }
                neighbourhood.observe(self, other, params, toggles);
            }
        }

        let mut sum = self.velocity;

        if toggles.separation_active {
            sum += neighbourhood.separation(params);
        }

        if toggles.alignment_active {
            sum += neighbourhood.alignment(self, params);
        }

        if toggles.cohesion_active {
            sum += neighbourhood.cohesion(self, params);
        }

        sum + self.wall_repulsion(params, toggles, world)
    }

    /// Constant nudge away from world edges the agent is within `turn_margin` of.
    pub fn wall_repulsion(&self, params: &FlockParameters, toggles: &Toggles, world: &WorldSize) -> Vec2 {
        let mut res = Vec2::ZERO;

        if toggles.horizontal_wall_active {
            res.x = edge_nudge(self.position.x, world.width, params);
        }

        if toggles.vertical_wall_active {
            res.y = edge_nudge(self.position.y, world.height, params);
        }

        res
    }
}

fn edge_nudge(coordinate: f32, bound: f32, params: &FlockParameters) -> f32 {
    if coordinate < params.turn_margin {
        params.turn_factor
    } else if coordinate > bound - params.turn_margin {
        -params.turn_factor
    } else {
        0.
    }
}

/// Sums gathered in a single pass over an agent's neighbours.
#[derive(Debug, Default, Clone, Copy)]
pub struct Neighbourhood {
    close: Vec2,
    velocity_sum: Vec2,
    align_count: usize,
    position_sum: Vec2,
    cohesion_count: usize,
}

impl Neighbourhood {
    pub fn observe(&mut self, agent: &Agent, other: &Agent, params: &FlockParameters, toggles: &Toggles) {
        let distance = distance_agent(agent, other);

        if toggles.separation_active && distance < params.avoid_range {
            self.close += agent.position - other.position;
        }

        if toggles.alignment_active && distance < params.align_range {
            self.velocity_sum += other.velocity;
            self.align_count += 1;
        }

        if toggles.cohesion_active && distance < params.cohesion_range {
            self.position_sum += other.position;
            self.cohesion_count += 1;
        }
    }

    /// Raw positional offsets from every agent inside `avoid_range`, summed
    /// without normalisation.
    pub fn separation(&self, params: &FlockParameters) -> Vec2 {
        self.close * params.avoid_factor
    }

    pub fn alignment(&self, agent: &Agent, params: &FlockParameters) -> Vec2 {
        if self.align_count > 0 {
            let avg = self.velocity_sum / self.align_count as f32;
            (avg - agent.velocity) * params.align_factor
        } else {
            Vec2::ZERO
        }
    }

    pub fn cohesion(&self, agent: &Agent, params: &FlockParameters) -> Vec2 {
        if self.cohesion_count > 0 {
            let center = self.position_sum / self.cohesion_count as f32;
            (center - agent.position) * params.cohesion_factor
        } else {
            Vec2::ZERO
        }
    }

    pub fn align_count(&self) -> usize {
        self.align_count
    }

    pub fn cohesion_count(&self) -> usize {
        self.cohesion_count
    }
}
