//! Choreography and governor tuning constants.
//!
//! These constants express intended behavior (spans, rates, thresholds,
//! cooldowns) and keep magic numbers out of the code. Per-frame rates and
//! angular speeds are defined against a 60 Hz reference frame.
use std::time::Duration;

// Reference frame used to define every per-frame rate
pub const REFERENCE_FPS: f32 = 60.0;
pub const REFERENCE_FRAME_SEC: f32 = 1.0 / REFERENCE_FPS;
pub const MAX_FRAME_DT_SEC: f32 = 0.1; // longer gaps (tab resume) are clamped

// Assembled (cone/helix) layout
pub const HOME_HEIGHT_SPAN: f32 = 26.0; // total cone height, centered on y = 0
pub const HOME_RADIUS_MAX: f32 = 10.0; // base radius of the cone
pub const HOME_DENSITY_EXPONENT: f32 = 0.7; // <1 biases density toward the base
pub const HOME_SPIRAL_TIGHTNESS: f32 = 50.0; // helix turns = K / 2 over the full height
pub const HOME_JITTER: f32 = 1.5; // per-axis jitter amplitude for non-ambient kinds
pub const AMBIENT_HOME_SPREAD: f32 = 1.5; // ambient motes scale the whole home vector

// Dispersed (cylindrical shell) layout
pub const SCATTER_RADIUS_BASE: f32 = 12.0;
pub const SCATTER_RADIUS_SPREAD: f32 = 20.0; // shell covers 12..32
pub const SCATTER_RADIAL_EXPONENT: f32 = 0.6; // <1 favors the outer shell
pub const SCATTER_RADIAL_JITTER: f32 = 0.06; // relative radius jitter
pub const SCATTER_HEIGHT_MIN: f32 = -8.0;
pub const SCATTER_HEIGHT_MAX: f32 = 8.0;
pub const AMBIENT_SCATTER_RADIUS_MIN: f32 = 18.0;
pub const AMBIENT_SCATTER_RADIUS_SPREAD: f32 = 18.0; // ambient layer covers 18..36
pub const AMBIENT_SCATTER_HEIGHT_MIN: f32 = -6.0;
pub const AMBIENT_SCATTER_HEIGHT_MAX: f32 = 12.0;

// Creation-time state
pub const SPAWN_CUBE_HALF_EXTENT: f32 = 25.0; // procedural particles start inside this cube
pub const MEDIA_SPAWN_POSITION: [f32; 3] = [0.0, 0.0, 40.0]; // runtime media fly in from here
pub const SPIN_MAX_PER_FRAME: f32 = 0.025; // per-axis spin magnitude (rad / reference frame)

// Smoothing rates (fraction of the remaining distance per reference frame)
pub const RATE_ASSEMBLED: f32 = 0.05;
pub const RATE_DISPERSED: f32 = 0.18;
pub const RATE_FOCUS_TARGET: f32 = 0.18;
pub const RATE_FOCUS_BACKGROUND: f32 = 0.16;
pub const RATE_SCALE: f32 = 0.1;
pub const RATE_GROUP_YAW: f32 = 0.08;
pub const RATE_GROUP_PITCH: f32 = 0.05;

// Global motion
pub const IDLE_YAW_PER_FRAME: f32 = 0.003;
pub const ORBIT_ANGLE_PER_FRAME: f32 = 0.0055;
pub const WOBBLE_FREQUENCY: f32 = 0.7; // relative to the orbit angle
pub const WOBBLE_AMPLITUDE: f32 = 0.6;
pub const GROUP_SCALE: f32 = 1.2;

// Focus presentation
pub const FOCUS_DISTANCE: f32 = 15.0; // distance in front of the viewer
pub const FOCUS_SCALE: f32 = 4.5;

// Governor sampling
pub const GOVERNOR_WINDOW: usize = 90;
pub const GOVERNOR_MIN_SAMPLES: usize = 30;
pub const GOVERNOR_MAX_PLAUSIBLE_FPS: f32 = 180.0;
pub const GOVERNOR_ADJUST_INTERVAL: Duration = Duration::from_millis(1500);
pub const GOVERNOR_EMERGENCY_COOLDOWN: Duration = Duration::from_millis(3500);

// Governor policy thresholds (mean fps)
pub const FPS_EMERGENCY: f32 = 45.0;
pub const FPS_DOWNGRADE: f32 = 55.0;
pub const FPS_UPGRADE: f32 = 65.0;

// Governor knobs
pub const PIXEL_SCALE_FLOOR: f32 = 1.05;
pub const PIXEL_SCALE_CAP: f32 = 1.6; // ceiling never exceeds this, whatever the display
pub const PIXEL_SCALE_INITIAL_FACTOR: f32 = 0.95; // start just under native density
pub const PIXEL_SCALE_STEP_DOWN: f32 = 0.08;
pub const PIXEL_SCALE_STEP_UP: f32 = 0.04;
pub const FRACTION_CEILING: f32 = 1.0;
pub const FRACTION_EMERGENCY_FLOOR: f32 = 0.75;
pub const FRACTION_DOWNGRADE_FLOOR: f32 = 0.8;
pub const FRACTION_EMERGENCY_DROP: f32 = 0.15;
pub const FRACTION_STEP_DOWN: f32 = 0.1;
pub const FRACTION_STEP_UP: f32 = 0.04;

// Registry clamp for the active fraction
pub const ACTIVE_FRACTION_MIN: f32 = 0.5;
pub const ACTIVE_FRACTION_MAX: f32 = 1.0;
