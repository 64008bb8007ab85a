use std::{
    collections::VecDeque,
    thread,
    time::{Duration, Instant},
};

use anyhow::Result;
use boids_engine::{
    birdwatcher::{AgentData, Birdwatcher},
    flock::Flock,
    options::{RunOptions, SaveOptions, Toggles},
    parameters::ParameterSet,
};
use tracing::{debug, info, warn};

use crate::script::{Command, ScheduledCommand};

/// Drives a [`Flock`] at a fixed timestep, feeding it the parameter record
/// and toggles every frame the way an interactive front end would.
pub struct SimulationLoop {
    flock: Flock,
    parameter_set: ParameterSet,
    toggles: Toggles,
    script: VecDeque<ScheduledCommand>,
    bird_watcher: Birdwatcher,
    save_options: SaveOptions,
    dt: f32,
    realtime: bool,
    frame: u64,
}

#[derive(Debug)]
pub struct RunSummary {
    pub frames: u64,
    pub samples: Vec<AgentData>,
    pub rejected_updates: usize,
    pub elapsed: Duration,
}

impl SimulationLoop {
    pub fn new(
        run_options: &RunOptions,
        parameter_set: ParameterSet,
        toggles: Toggles,
        script: VecDeque<ScheduledCommand>,
        dt: f32,
    ) -> Result<Self> {
        let flock = Flock::new(run_options, &parameter_set)?;

        Ok(SimulationLoop {
            flock,
            parameter_set,
            toggles,
            script,
            bird_watcher: Birdwatcher::new(run_options.sample_rate),
            save_options: run_options.save_options.clone(),
            dt,
            realtime: false,
            frame: 0,
        })
    }

    /// Sleep between frames so the run takes `frames * dt` wall time.
    pub fn with_realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    pub fn flock(&self) -> &Flock {
        &self.flock
    }

    pub fn flock_mut(&mut self) -> &mut Flock {
        &mut self.flock
    }

    pub fn toggles(&self) -> Toggles {
        self.toggles
    }

    /// Runs `frames` frames and saves the samples as configured.
    pub fn run(&mut self, frames: u64) -> Result<RunSummary> {
        let started = Instant::now();
        let mut rejected_updates = 0;

        for _ in 0..frames {
            let frame_started = Instant::now();

            if !self.step() {
                rejected_updates += 1;
            }

            let spent = frame_started.elapsed();
            debug!(frame = self.frame, micros = spent.as_micros() as u64, "frame done");

            if self.realtime {
                if let Some(rest) = Duration::from_secs_f32(self.dt).checked_sub(spent) {
                    thread::sleep(rest);
                }
            }
        }

        let samples = self.bird_watcher.pop_data_save(&self.save_options)?;
        let elapsed = started.elapsed();

        info!(
            frames,
            agents = self.flock.agents().len(),
            samples = samples.len(),
            rejected_updates,
            elapsed_ms = elapsed.as_millis() as u64,
            "simulation finished"
        );

        Ok(RunSummary {
            frames,
            samples,
            rejected_updates,
            elapsed,
        })
    }

    /// One frame: scheduled commands, parameter record, rules, integration,
    /// sampling. Returns `false` if a parameter update was rejected.
    pub fn step(&mut self) -> bool {
        self.run_commands();

        let accepted = self.flock.apply_parameters(&mut self.parameter_set).is_ok();
        if !accepted {
            warn!(frame = self.frame, "parameter update ignored");
        }

        self.flock.update(self.toggles);
        self.flock.advance(self.dt);
        self.bird_watcher.watch(&self.flock);
        self.frame += 1;

        accepted
    }

    fn run_commands(&mut self) {
        while let Some(scheduled) = self.script.pop_front() {
            if scheduled.frame > self.frame {
                self.script.push_front(scheduled);
                break;
            }
            self.execute(scheduled.command);
        }
    }

    fn execute(&mut self, command: Command) {
        debug!(frame = self.frame, ?command, "executing command");

        match command {
            Command::ToggleMotion => {
                let state = self.flock.toggle_motion();
                info!(frame = self.frame, ?state, "motion toggled");
            }
            Command::Toggle { flag } => {
                let on = self.toggles.flip(flag);
                info!(frame = self.frame, ?flag, on, "toggle flipped");
            }
            Command::Reset => self.flock.reset(),
            Command::CreateAgents { count } => {
                self.parameter_set.agent_count = count;
                self.flock.create_agents(count);
            }
            Command::SetParameters(patch) => patch.apply_to(&mut self.parameter_set),
        }
    }
}
