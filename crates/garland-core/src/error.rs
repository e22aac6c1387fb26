//! Configuration errors surfaced at construction.

use thiserror::Error;

/// Rejected configuration, reported once at construction time.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("kind mix weights must be finite and non-negative, got {weight} for {ornament}")]
    InvalidWeight { ornament: &'static str, weight: f32 },
    #[error("kind mix weights must not all be zero")]
    EmptyKindMix,
    #[error("{knob} bounds are inverted: floor {floor} > ceiling {ceiling}")]
    InvertedBounds {
        knob: &'static str,
        floor: f32,
        ceiling: f32,
    },
    #[error("{knob} initial value {value} lies outside [{floor}, {ceiling}]")]
    InitialOutOfBounds {
        knob: &'static str,
        value: f32,
        floor: f32,
        ceiling: f32,
    },
    #[error("active fraction floor {0} is below the registry minimum")]
    FractionFloorTooLow(f32),
    #[error("sample window must hold at least one sample")]
    EmptyWindow,
    #[error("minimum sample count {min_samples} must be in 1..={window}")]
    MinSamples { min_samples: usize, window: usize },
    #[error("fps thresholds must be ordered emergency <= downgrade <= upgrade")]
    UnorderedThresholds,
    #[error("procedural particles cannot be created after media has been added")]
    RegistrySealed,
}
