use std::f32::consts::TAU;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::{debug, warn};

use crate::agent::Agent;
use crate::error::FlockError;
use crate::math_helpers::max_f32;
use crate::options::{RunOptions, Toggles, TrackerType, UpdateOrder, WorldSize};
use crate::parameters::{FlockParameters, ParameterSet};

use self::tracker::{get_tracker, Tracker};

pub mod naive_tracker;
pub mod spathash_tracker;
pub mod tracker;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MotionState {
    Stopped,
    Moving,
}

/// Owns the agents and the tunables they are updated with.
///
/// Agents only change through [`Flock::update`], [`Flock::advance`], the motion
/// switches, [`Flock::reset`] and [`Flock::create_agents`]; tunables only
/// through [`Flock::apply_parameters`].
pub struct Flock {
    agents: Vec<Agent>,
    /// number of agents `reset` recreates
    agent_count: usize,
    world: WorldSize,
    parameters: FlockParameters,
    motion: MotionState,
    update_order: UpdateOrder,
    tracker: Box<dyn Tracker>,
    rng: Xoshiro256PlusPlus,
}

impl Flock {
    /// Builds a stopped flock of `parameter_set.agent_count` randomly placed agents.
    pub fn new(run_options: &RunOptions, parameter_set: &ParameterSet) -> Result<Self, FlockError> {
        run_options.world.validate()?;
        let parameters = FlockParameters::try_from(parameter_set)?;

        let rng = match run_options.seed {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };

        let mut flock = Flock {
            agents: Vec::new(),
            agent_count: 0,
            world: run_options.world,
            parameters,
            motion: MotionState::Stopped,
            update_order: run_options.update_order,
            tracker: get_tracker(run_options.tracker_type),
            rng,
        };
        flock.create_agents(parameter_set.agent_count);

        debug!(
            agents = flock.agent_count,
            width = flock.world.width,
            height = flock.world.height,
            tracker = ?run_options.tracker_type,
            order = ?run_options.update_order,
            "flock created"
        );

        Ok(flock)
    }

    /// Replaces the agents with `n` new ones at uniformly random positions and
    /// headings. `n` becomes the count used by [`Flock::reset`].
    pub fn create_agents(&mut self, n: usize) {
        let speed = self.parameters.initial_speed();
        let scale = self.parameters.agent_scale;
        let WorldSize { width, height } = self.world;
        let rng = &mut self.rng;

        self.agents = (0..n)
            .map(|id| {
                // x in [0, width), y in [0, height)
                let x = rng.gen_range(0. ..width);
                let y = rng.gen_range(0. ..height);
                let angle = rng.gen_range(0. ..TAU);

                Agent::new(id, Vec2::new(x, y), angle, scale, speed)
            })
            .collect();
        self.agent_count = n;

        if self.motion == MotionState::Moving {
            self.agents.iter_mut().for_each(Agent::accelerate);
        }
    }

    /// Replaces the agents with ones at the given `(position, heading)` pairs.
    pub fn place_agents(&mut self, placements: &[(Vec2, f32)]) {
        let speed = self.parameters.initial_speed();
        let scale = self.parameters.agent_scale;

        self.agents = placements
            .iter()
            .enumerate()
            .map(|(id, (position, angle))| Agent::new(id, *position, *angle, scale, speed))
            .collect();
        self.agent_count = self.agents.len();

        if self.motion == MotionState::Moving {
            self.agents.iter_mut().for_each(Agent::accelerate);
        }
    }

    /// Discards every agent and recreates the stored count from scratch.
    /// Tunables and the motion state are kept.
    pub fn reset(&mut self) {
        self.create_agents(self.agent_count);
        debug!(agents = self.agent_count, "flock reset");
    }

    pub fn start_motion(&mut self) {
        if self.motion == MotionState::Moving {
            return;
        }

        self.agents.iter_mut().for_each(Agent::accelerate);
        self.motion = MotionState::Moving;
        debug!(agents = self.agents.len(), "motion started");
    }

    pub fn stop_motion(&mut self) {
        if self.motion == MotionState::Stopped {
            return;
        }

        self.agents.iter_mut().for_each(Agent::stop);
        self.motion = MotionState::Stopped;
        debug!(agents = self.agents.len(), "motion stopped");
    }

    /// Starts a stopped flock or stops a moving one, returning the new state.
    pub fn toggle_motion(&mut self) -> MotionState {
        match self.motion {
            MotionState::Stopped => self.start_motion(),
            MotionState::Moving => self.stop_motion(),
        }
        self.motion
    }

    /// Swaps in the tunables of `parameter_set` if it is marked as changed.
    ///
    /// Returns `Ok(true)` when applied and `Ok(false)` when the record was not
    /// dirty. The dirty flag is cleared either way, so a rejected record is not
    /// retried every frame. The agent count is not applied here, agents are
    /// only ever recreated through [`Flock::create_agents`].
    pub fn apply_parameters(&mut self, parameter_set: &mut ParameterSet) -> Result<bool, FlockError> {
        if !parameter_set.take_changed() {
            return Ok(false);
        }

        let parameters = match FlockParameters::try_from(&*parameter_set) {
            Ok(parameters) => parameters,
            Err(err) => {
                warn!(%err, "rejected parameter update, keeping current parameters");
                return Err(err);
            }
        };

        if parameter_set.agent_count != self.agent_count {
            warn!(
                requested = parameter_set.agent_count,
                current = self.agent_count,
                "agent count is fixed until agents are recreated"
            );
        }

        self.parameters = parameters;

        let FlockParameters {
            speed_min,
            speed_max,
            ..
        } = self.parameters;
        self.agents
            .iter_mut()
            .for_each(|agent| agent.fit_speed(speed_min, speed_max));

        debug!(?parameters, "parameters applied");
        Ok(true)
    }

    /// Runs one frame of the flocking rules. Does nothing unless moving.
    pub fn update(&mut self, toggles: Toggles) {
        if self.motion != MotionState::Moving {
            return;
        }

        match self.update_order {
            UpdateOrder::Snapshot => self.update_snapshot(&toggles),
            UpdateOrder::Sequential => self.update_sequential(&toggles),
        }
    }

    /// Moves every agent along its velocity for `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        self.agents.iter_mut().for_each(|agent| agent.advance(dt));
    }

    fn update_snapshot(&mut self, toggles: &Toggles) {
        // boundary phase, each agent only touches its own position
        if toggles.check_boundaries {
            self.apply_boundaries(toggles);
        }

        if !toggles.any_steering() {
            return;
        }

        if toggles.any_rule() {
            let reach = self.reach(toggles);
            self.tracker.rebuild(&self.agents, reach);
        }

        // read phase against one snapshot, then write phase
        let velocities = self.compute_velocities(toggles);

        let FlockParameters {
            speed_min,
            speed_max,
            ..
        } = self.parameters;
        self.agents
            .iter_mut()
            .zip(velocities.iter())
            .for_each(|(agent, v)| agent.set_velocity_clamped(v.x, v.y, speed_min, speed_max));
    }

    /// The in-place pass: agent `i` sees the boundary-adjusted positions and
    /// updated velocities of agents `0..i`.
    fn update_sequential(&mut self, toggles: &Toggles) {
        let FlockParameters {
            speed_min,
            speed_max,
            ..
        } = self.parameters;
        let WorldSize { width, height } = self.world;

        for i in 0..self.agents.len() {
            if toggles.check_boundaries {
                self.agents[i].apply_boundary(
                    width,
                    height,
                    toggles.horizontal_cyclic_boundary,
                    toggles.vertical_cyclic_boundary,
                );
            }

            if !toggles.any_steering() {
                continue;
            }

            let v = self.agents[i].run_rules(self.agents.iter(), &self.parameters, toggles, &self.world);
            self.agents[i].set_velocity_clamped(v.x, v.y, speed_min, speed_max);
        }
    }

    fn apply_boundaries(&mut self, toggles: &Toggles) {
        let WorldSize { width, height } = self.world;

        self.agents.iter_mut().for_each(|agent| {
            agent.apply_boundary(
                width,
                height,
                toggles.horizontal_cyclic_boundary,
                toggles.vertical_cyclic_boundary,
            )
        });
    }

    #[cfg(not(feature = "parallel"))]
    fn compute_velocities(&self, toggles: &Toggles) -> Vec<Vec2> {
        let mut neighbours: Vec<usize> = Vec::with_capacity(64);

        self.agents
            .iter()
            .enumerate()
            .map(|(i, agent)| self.steer(i, agent, toggles, &mut neighbours))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn compute_velocities(&self, toggles: &Toggles) -> Vec<Vec2> {
        use rayon::prelude::*;

        self.agents
            .par_iter()
            .enumerate()
            .map_init(
                || Vec::with_capacity(64),
                |neighbours, (i, agent)| self.steer(i, agent, toggles, neighbours),
            )
            .collect()
    }

    fn steer(&self, i: usize, agent: &Agent, toggles: &Toggles, neighbours: &mut Vec<usize>) -> Vec2 {
        neighbours.clear();
        if toggles.any_rule() {
            self.tracker.get_neighbours(i, &self.agents, neighbours);
        }

        agent.run_rules(
            neighbours.iter().map(|&other| &self.agents[other]),
            &self.parameters,
            toggles,
            &self.world,
        )
    }

    /// Largest range among the active rules.
    fn reach(&self, toggles: &Toggles) -> f32 {
        let p = &self.parameters;
        let ranges = [
            (toggles.separation_active, p.avoid_range),
            (toggles.alignment_active, p.align_range),
            (toggles.cohesion_active, p.cohesion_range),
        ];

        max_f32(ranges.iter().filter(|(on, _)| *on).map(|(_, range)| *range)).unwrap_or(0.)
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent_count(&self) -> usize {
        self.agent_count
    }

    pub fn world(&self) -> WorldSize {
        self.world
    }

    pub fn parameters(&self) -> &FlockParameters {
        &self.parameters
    }

    pub fn motion(&self) -> MotionState {
        self.motion
    }

    pub fn is_moving(&self) -> bool {
        self.motion == MotionState::Moving
    }

    pub fn tracker_type(&self) -> TrackerType {
        self.tracker.tracker_type()
    }

    pub fn update_order(&self) -> UpdateOrder {
        self.update_order
    }
}
