use std::{collections::VecDeque, fs, path::Path};

use anyhow::{Context, Result};
use clap_serde_derive::{clap::Parser, ClapSerde};
use tracing::{debug, info};

mod cliargs;
mod script;
mod sim_loop;

use cliargs::{Args, Config};
use script::load_script;
use sim_loop::SimulationLoop;

fn main() -> Result<()> {
    init_tracing();

    let mut args = Args::parse();
    let config = load_config(&args.config_path, &mut args.config)?;

    if let Ok(dump) = serde_yaml::to_string(&config) {
        debug!("effective configuration:\n{dump}");
    }

    let script = match &args.script_path {
        Some(path) => load_script(path)?,
        None => VecDeque::new(),
    };

    let run_options = config.run_options()?;
    let mut sim = SimulationLoop::new(
        &run_options,
        config.parameter_set(),
        config.toggles(),
        script,
        config.frame_dt(),
    )?
    .with_realtime(config.realtime);

    if config.moving {
        sim.flock_mut().start_motion();
    }

    info!(
        agents = config.agents,
        frames = config.frames,
        tracker = ?run_options.tracker_type,
        order = ?run_options.update_order,
        "starting simulation"
    );
    sim.run(config.frames)?;

    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Merges the command line over the config file, if there is one.
fn load_config(path: &Path, cli: &mut <Config as ClapSerde>::Opt) -> Result<Config> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            debug!(path = %path.display(), %err, "no config file, using defaults and arguments");
            return Ok(Config::from(cli));
        }
    };

    let is_toml = path.extension().map_or(false, |ext| ext == "toml");
    let file_config: <Config as ClapSerde>::Opt = if is_toml {
        toml::from_str(&text).with_context(|| format!("error in configuration file {}", path.display()))?
    } else {
        serde_yaml::from_str(&text).with_context(|| format!("error in configuration file {}", path.display()))?
    };

    Ok(Config::from(file_config).merge(cli))
}
