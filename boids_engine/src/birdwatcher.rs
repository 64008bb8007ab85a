use std::{fs::OpenOptions, mem, path::PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{error::RecordError, flock::Flock, options::SaveOptions};

/// One sampled agent, one CSV row.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct AgentData {
    pub id: usize,
    pub x: f32,
    pub y: f32,
    pub heading: f32,
    pub speed: f32,
    /// sample index, frames divided by the sample rate
    pub time: u64,
}

/// Accumulates agent samples every `sample_rate` frames.
pub struct Birdwatcher {
    locations: Vec<AgentData>,
    frame_ticker: u64,
    sample_rate: u64,
}

const PREFIX: &str = "boids-data";

impl Birdwatcher {
    /// A `sample_rate` of 0 is treated as 1.
    pub fn new(sample_rate: u64) -> Self {
        Birdwatcher {
            locations: Vec::new(),
            frame_ticker: 0,
            sample_rate: sample_rate.max(1),
        }
    }

    /// Triggers data collection
    pub fn watch(&mut self, flock: &Flock) {
        if !self.should_sample() {
            return;
        }

        let time = self.frame_ticker / self.sample_rate;
        self.locations.extend(flock.agents().iter().map(|agent| AgentData {
            id: agent.id,
            x: agent.position().x,
            y: agent.position().y,
            heading: agent.heading(),
            speed: agent.speed(),
            time,
        }));
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn pop_data(&mut self) -> Vec<AgentData> {
        mem::take(&mut self.locations)
    }

    /// Saves the latest data in CSV format, then returns it while emptying the birdwatcher's memory
    ///
    /// Depending on save options, either overwrites `boids-data.csv` or writes a new timestamped file.
    pub fn pop_data_save(&mut self, save_options: &SaveOptions) -> Result<Vec<AgentData>, RecordError> {
        let data = self.pop_data();

        if !save_options.save_locations {
            return Ok(data);
        }

        if let Some(path) = &save_options.save_locations_path {
            let file_path =
                PathBuf::from(path).join(Birdwatcher::get_dataset_name(save_options, Utc::now()));
            debug!(path = %file_path.display(), rows = data.len(), "writing agent samples");

            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&file_path)?;
            let mut wtr = csv::Writer::from_writer(file);

            for row in data.iter() {
                wtr.serialize(row)?;
            }
            wtr.flush()?;

            info!(path = %file_path.display(), rows = data.len(), "agent samples saved");
        }

        Ok(data)
    }

    fn get_dataset_name(save_options: &SaveOptions, now: DateTime<Utc>) -> String {
        match save_options.save_locations_timestamp {
            true => format!("{PREFIX}_{}.csv", now.timestamp_millis()),
            false => format!("{PREFIX}.csv"),
        }
    }

    fn should_sample(&mut self) -> bool {
        self.frame_ticker += 1;
        self.frame_ticker % self.sample_rate == 0
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{AgentData, Birdwatcher};
    use crate::{
        flock::Flock,
        options::{RunOptions, SaveOptions},
        parameters::ParameterSet,
    };

    fn save_options(path: &str, timestamp: bool) -> SaveOptions {
        SaveOptions {
            save_locations: true,
            save_locations_path: Some(path.to_owned()),
            save_locations_timestamp: timestamp,
        }
    }

    fn small_flock() -> Flock {
        let set = ParameterSet {
            agent_count: 4,
            ..Default::default()
        };
        let options = RunOptions {
            seed: Some(3),
            ..Default::default()
        };
        Flock::new(&options, &set).unwrap()
    }

    #[test]
    fn test_name_timestamped() {
        let expected = "boids-data_1668038059490.csv";
        let dt = Utc.with_ymd_and_hms(2022, 11, 9, 23, 54, 19).unwrap()
            + chrono::Duration::milliseconds(490);
        let actual = Birdwatcher::get_dataset_name(&save_options("", true), dt);

        assert_eq!(actual, expected)
    }

    #[test]
    fn test_name_overwrite() {
        let expected = "boids-data.csv";
        let dt = Utc.with_ymd_and_hms(2022, 11, 9, 23, 54, 19).unwrap();
        let actual = Birdwatcher::get_dataset_name(&save_options("", false), dt);

        assert_eq!(actual, expected)
    }

    #[test]
    fn samples_every_nth_frame() {
        let flock = small_flock();
        let mut watcher = Birdwatcher::new(3);

        for _ in 0..7 {
            watcher.watch(&flock);
        }

        // frames 3 and 6
        let data = watcher.pop_data();
        assert_eq!(data.len(), 8);
        assert_eq!(data[0].time, 1);
        assert_eq!(data[7].time, 2);
        assert!(watcher.is_empty());
    }

    #[test]
    fn zero_sample_rate_samples_every_frame() {
        let flock = small_flock();
        let mut watcher = Birdwatcher::new(0);

        watcher.watch(&flock);
        watcher.watch(&flock);

        assert_eq!(watcher.len(), 8);
    }

    #[test]
    fn saves_csv_that_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let flock = small_flock();
        let mut watcher = Birdwatcher::new(1);
        watcher.watch(&flock);

        let options = save_options(dir.path().to_str().unwrap(), false);
        let data = watcher.pop_data_save(&options).unwrap();

        let mut reader = csv::Reader::from_path(dir.path().join("boids-data.csv")).unwrap();
        let rows: Vec<AgentData> = reader.deserialize().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[2].id, data[2].id);
        assert_eq!(rows[2].x, data[2].x);
    }

    #[test]
    fn nothing_written_when_saving_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let flock = small_flock();
        let mut watcher = Birdwatcher::new(1);
        watcher.watch(&flock);

        let mut options = save_options(dir.path().to_str().unwrap(), false);
        options.save_locations = false;
        let data = watcher.pop_data_save(&options).unwrap();

        assert_eq!(data.len(), 4);
        assert!(!dir.path().join("boids-data.csv").exists());
    }
}
