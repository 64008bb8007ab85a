use std::path::PathBuf;

use anyhow::Result;
use boids_engine::{
    options::{RunOptions, SaveOptions, Toggles, TrackerType, UpdateOrder, WorldSize},
    parameters::{ParameterSet, SpeedRange},
};
use clap_serde_derive::{
    clap::{self, Parser},
    serde::Serialize,
    ClapSerde,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
/// Headless fixed-timestep driver for the boids (Reynolds '86) flocking engine.
pub struct Args {
    /// Config file, YAML or TOML (by extension)
    #[arg(short, long = "config", default_value = "config.yaml")]
    pub config_path: PathBuf,

    /// YAML list of frame-scheduled commands
    #[arg(long = "script")]
    pub script_path: Option<PathBuf>,

    /// Rest of arguments
    #[command(flatten)]
    pub config: <Config as ClapSerde>::Opt,
}

#[derive(ClapSerde, Serialize)]
/// Programatic configuration
///
/// Uses defaults, which can be overwritten by specifying a filepath for the `-c` or `--config` arg option
pub struct Config {
    #[default(1920.)]
    #[arg(short = 'x', long)]
    pub width: f32,

    #[default(1080.)]
    #[arg(short = 'y', long)]
    pub height: f32,

    #[default(1300)]
    #[arg(short = 'n', long)]
    /// number of agents
    pub agents: usize,

    #[default(600)]
    #[arg(short = 'f', long)]
    /// frames to simulate
    pub frames: u64,

    #[default(30)]
    #[arg(long)]
    /// frame rate, sets the step length
    pub fps: u32,

    #[default(false)]
    #[arg(long)]
    /// sleep between frames to run at `fps`
    pub realtime: bool,

    #[default(0)]
    #[arg(long)]
    /// placement seed, 0 draws one from entropy
    pub seed: u64,

    #[default(false)]
    #[arg(long)]
    /// start with the flock moving, otherwise wait for a `ToggleMotion` command
    pub moving: bool,

    #[default(false)]
    #[arg(long = "spathash")]
    /// use the spatial hash neighbour lookup
    pub spatial_hash: bool,

    #[default(false)]
    #[arg(long = "sequential")]
    /// in-place update, later agents see earlier agents' new velocities
    pub sequential_order: bool,

    #[default(2.)]
    #[arg(long)]
    pub agent_scale: f32,
    #[default(1.)]
    #[arg(long)]
    pub speed_low: f32,
    #[default(2.)]
    #[arg(long)]
    pub speed_high: f32,
    #[default(200.)]
    #[arg(long)]
    pub speed_scale: f32,
    #[default(15.)]
    #[arg(long)]
    pub avoid_range: f32,
    #[default(2.)]
    #[arg(long)]
    pub avoid_factor: f32,
    #[default(100.)]
    #[arg(long)]
    pub align_range: f32,
    #[default(0.08)]
    #[arg(long)]
    pub align_factor: f32,
    #[default(50.)]
    #[arg(long)]
    pub cohesion_range: f32,
    #[default(0.005)]
    #[arg(long)]
    pub cohesion_factor: f32,
    #[default(80.)]
    #[arg(long)]
    pub turn_margin: f32,
    #[default(20.)]
    #[arg(long)]
    pub turn_factor: f32,

    #[default(true)]
    #[arg(long)]
    pub check_boundaries: bool,
    #[default(false)]
    #[arg(long = "h_cyclic")]
    pub horizontal_cyclic_boundary: bool,
    #[default(true)]
    #[arg(long = "v_cyclic")]
    pub vertical_cyclic_boundary: bool,
    #[default(true)]
    #[arg(long = "separation")]
    pub separation_active: bool,
    #[default(false)]
    #[arg(long = "alignment")]
    pub alignment_active: bool,
    #[default(true)]
    #[arg(long = "cohesion")]
    pub cohesion_active: bool,
    #[default(true)]
    #[arg(long = "h_wall")]
    pub horizontal_wall_active: bool,
    #[default(true)]
    #[arg(long = "v_wall")]
    pub vertical_wall_active: bool,

    #[default(4)]
    #[arg(short = 'r', long)]
    /// ratio of frames/samples, e.g. 4 = sample every 4th frame
    pub sample_rate: u64,

    #[default(false)]
    #[arg(short = 's', long)]
    pub save: bool,

    #[default(false)]
    #[arg(short = 't', long)]
    pub save_timestamp: bool,

    #[default("./".to_owned())]
    #[arg(long)]
    pub save_path: String,
}

impl Config {
    pub fn run_options(&self) -> Result<RunOptions> {
        Ok(RunOptions {
            world: WorldSize::new(self.width, self.height)?,
            seed: (self.seed != 0).then_some(self.seed),
            tracker_type: if self.spatial_hash {
                TrackerType::SpatHash
            } else {
                TrackerType::Naive
            },
            update_order: if self.sequential_order {
                UpdateOrder::Sequential
            } else {
                UpdateOrder::Snapshot
            },
            sample_rate: self.sample_rate,
            save_options: SaveOptions {
                save_locations: self.save,
                save_locations_path: Some(self.save_path.clone()),
                save_locations_timestamp: self.save_timestamp,
            },
        })
    }

    pub fn parameter_set(&self) -> ParameterSet {
        let mut set = ParameterSet::default();

        set.agent_count = self.agents;
        set.agent_scale = self.agent_scale;
        set.speed_range = SpeedRange {
            low: self.speed_low,
            high: self.speed_high,
        };
        set.speed_scale = self.speed_scale;
        set.avoid_range = self.avoid_range;
        set.avoid_factor = self.avoid_factor;
        set.align_range = self.align_range;
        set.align_factor = self.align_factor;
        set.cohesion_range = self.cohesion_range;
        set.cohesion_factor = self.cohesion_factor;
        set.turn_margin = self.turn_margin;
        set.turn_factor = self.turn_factor;

        set
    }

    pub fn toggles(&self) -> Toggles {
        Toggles {
            check_boundaries: self.check_boundaries,
            horizontal_cyclic_boundary: self.horizontal_cyclic_boundary,
            vertical_cyclic_boundary: self.vertical_cyclic_boundary,
            separation_active: self.separation_active,
            alignment_active: self.alignment_active,
            cohesion_active: self.cohesion_active,
            horizontal_wall_active: self.horizontal_wall_active,
            vertical_wall_active: self.vertical_wall_active,
        }
    }

    /// Step length in seconds.
    pub fn frame_dt(&self) -> f32 {
        1. / self.fps.max(1) as f32
    }
}
