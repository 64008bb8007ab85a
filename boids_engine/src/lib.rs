use tracing::info;

use birdwatcher::{AgentData, Birdwatcher};
use error::RunError;
use flock::Flock;
use options::{RunOptions, Toggles};
use parameters::ParameterSet;

pub mod agent;
pub mod flock;

pub mod birdwatcher;
pub mod error;
pub mod math_helpers;
pub mod options;
pub mod parameters;

/// Step length, in seconds, of one headless frame.
pub const FRAME_DT: f32 = 1. / 30.;

/// Runs a moving flock for `no_iter` frames without any front end and returns
/// the sampled agent data, saving it as CSV when the run options ask for it.
pub fn flock_base(
    no_iter: u64,
    run_options: &RunOptions,
    parameter_set: &ParameterSet,
    toggles: Toggles,
) -> Result<Vec<AgentData>, RunError> {
    let mut flock = Flock::new(run_options, parameter_set)?;
    let mut bird_watcher = Birdwatcher::new(run_options.sample_rate);

    flock.start_motion();
    (0..no_iter).for_each(|_| {
        flock.update(toggles);
        flock.advance(FRAME_DT);
        bird_watcher.watch(&flock);
    });

    let data = bird_watcher.pop_data_save(&run_options.save_options)?;
    info!(frames = no_iter, samples = data.len(), "headless run finished");

    Ok(data)
}
