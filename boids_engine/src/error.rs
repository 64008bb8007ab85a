use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum FlockError {
    #[error("minimum speed {min} exceeds maximum speed {max}")]
    InvertedSpeedRange { min: f32, max: f32 },

    #[error("speed bounds must be positive, got [{min}, {max}]")]
    NonPositiveSpeed { min: f32, max: f32 },

    #[error("parameter `{name}` has invalid value {value}")]
    InvalidParameter { name: &'static str, value: f32 },

    #[error("world size must be positive and finite, got {width}x{height}")]
    InvalidWorld { width: f32, height: f32 },
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("can't open data file: {0}")]
    Io(#[from] std::io::Error),

    #[error("can't serialize data point: {0}")]
    Csv(#[from] csv::Error),
}

/// Failure of a whole headless run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Flock(#[from] FlockError),

    #[error(transparent)]
    Record(#[from] RecordError),
}
