use std::{
    collections::{BTreeMap, VecDeque},
    fs,
    path::Path,
};

use anyhow::{bail, Context, Result};
use boids_engine::{options::ToggleFlag, parameters::ParameterSet};
use serde::Deserialize;

/// Something the loop does at the start of a given frame, standing in for the
/// key presses and slider drags of an interactive front end.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScheduledCommand {
    pub frame: u64,
    #[serde(flatten)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "command")]
pub enum Command {
    /// start or stop the flock
    ToggleMotion,
    Toggle { flag: ToggleFlag },
    /// recreate the agents, keeping the count
    Reset,
    /// recreate the agents with a new count
    CreateAgents { count: usize },
    SetParameters(ParameterPatch),
}

/// Partial update of a [`ParameterSet`], missing fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParameterPatch {
    pub agent_count: Option<usize>,
    pub agent_scale: Option<f32>,
    pub speed_low: Option<f32>,
    pub speed_high: Option<f32>,
    pub speed_scale: Option<f32>,
    pub avoid_range: Option<f32>,
    pub avoid_factor: Option<f32>,
    pub align_range: Option<f32>,
    pub align_factor: Option<f32>,
    pub cohesion_range: Option<f32>,
    pub cohesion_factor: Option<f32>,
    pub turn_margin: Option<f32>,
    pub turn_factor: Option<f32>,

    /// keys that match no field, kept so typos can be reported
    #[serde(flatten)]
    pub unknown_fields: BTreeMap<String, serde_yaml::Value>,
}

impl ParameterPatch {
    /// true when no field would be written
    pub fn is_empty(&self) -> bool {
        self.agent_count.is_none()
            && [
                self.agent_scale,
                self.speed_low,
                self.speed_high,
                self.speed_scale,
                self.avoid_range,
                self.avoid_factor,
                self.align_range,
                self.align_factor,
                self.cohesion_range,
                self.cohesion_factor,
                self.turn_margin,
                self.turn_factor,
            ]
            .iter()
            .all(Option::is_none)
    }

    /// Writes the present fields into `set` and marks it changed.
    pub fn apply_to(&self, set: &mut ParameterSet) {
        fn put<T: Copy>(slot: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *slot = value;
            }
        }

        put(&mut set.agent_count, self.agent_count);
        put(&mut set.agent_scale, self.agent_scale);
        put(&mut set.speed_range.low, self.speed_low);
        put(&mut set.speed_range.high, self.speed_high);
        put(&mut set.speed_scale, self.speed_scale);
        put(&mut set.avoid_range, self.avoid_range);
        put(&mut set.avoid_factor, self.avoid_factor);
        put(&mut set.align_range, self.align_range);
        put(&mut set.align_factor, self.align_factor);
        put(&mut set.cohesion_range, self.cohesion_range);
        put(&mut set.cohesion_factor, self.cohesion_factor);
        put(&mut set.turn_margin, self.turn_margin);
        put(&mut set.turn_factor, self.turn_factor);

        set.mark_changed();
    }
}

/// Parses a YAML list of scheduled commands, ordered by frame.
///
/// Commands sharing a frame keep their file order. Parameter patches with
/// unknown keys or without any field are rejected.
pub fn parse_script(text: &str) -> Result<VecDeque<ScheduledCommand>> {
    let mut commands: Vec<ScheduledCommand> =
        serde_yaml::from_str(text).context("invalid command script")?;

    for scheduled in commands.iter() {
        if let Command::SetParameters(patch) = &scheduled.command {
            if !patch.unknown_fields.is_empty() {
                let keys: Vec<&str> = patch.unknown_fields.keys().map(String::as_str).collect();
                bail!(
                    "unknown parameter(s) {} in SetParameters at frame {}",
                    keys.join(", "),
                    scheduled.frame
                );
            }
            if patch.is_empty() {
                bail!("SetParameters at frame {} sets no parameter", scheduled.frame);
            }
        }
    }

    commands.sort_by_key(|c| c.frame);
    Ok(commands.into())
}

pub fn load_script(path: &Path) -> Result<VecDeque<ScheduledCommand>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("can't read command script {}", path.display()))?;
    parse_script(&text)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use boids_engine::{options::ToggleFlag, parameters::ParameterSet};

    use super::{parse_script, Command, ParameterPatch};

    const SCRIPT: &str = r#"
- frame: 120
  command: Toggle
  flag: Alignment
- frame: 0
  command: ToggleMotion
- frame: 200
  command: SetParameters
  avoid_factor: 3.5
  speed_high: 2.5
- frame: 120
  command: Reset
- frame: 300
  command: CreateAgents
  count: 40
"#;

    #[test]
    fn parses_and_orders_commands() {
        let script = parse_script(SCRIPT).unwrap();
        let frames: Vec<u64> = script.iter().map(|c| c.frame).collect();

        assert_eq!(frames, vec![0, 120, 120, 200, 300]);
        assert_eq!(script[0].command, Command::ToggleMotion);
        assert_eq!(
            script[1].command,
            Command::Toggle {
                flag: ToggleFlag::Alignment
            }
        );
        assert_eq!(script[2].command, Command::Reset);
        assert_eq!(script[4].command, Command::CreateAgents { count: 40 });

        match &script[3].command {
            Command::SetParameters(patch) => {
                assert_eq!(patch.avoid_factor, Some(3.5));
                assert_eq!(patch.speed_high, Some(2.5));
                assert_eq!(patch.align_range, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_command() {
        assert!(parse_script("- frame: 1\n  command: Explode\n").is_err());
    }

    #[test]
    fn rejects_misspelled_parameter() {
        let err = parse_script("- frame: 3\n  command: SetParameters\n  avoid_factr: 3.0\n").unwrap_err();

        assert!(err.to_string().contains("avoid_factr"), "{err}");
    }

    #[test]
    fn rejects_empty_parameter_patch() {
        assert!(parse_script("- frame: 3\n  command: SetParameters\n").is_err());
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut set = ParameterSet::default();
        let before = set.clone();
        let patch = ParameterPatch {
            cohesion_factor: Some(0.25),
            speed_low: Some(0.5),
            ..Default::default()
        };

        patch.apply_to(&mut set);

        assert!(set.is_changed());
        assert_relative_eq!(set.cohesion_factor, 0.25);
        assert_relative_eq!(set.speed_range.low, 0.5);
        assert_relative_eq!(set.speed_range.high, before.speed_range.high);
        assert_relative_eq!(set.avoid_factor, before.avoid_factor);
        assert_eq!(set.agent_count, before.agent_count);
    }
}
