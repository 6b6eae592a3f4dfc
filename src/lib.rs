//! Pika Volley Sim - deterministic two-player volleyball engine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (ball physics, characters, AI, serves)
//! - `rng`: The seeded and live random streams
//! - `replay`: Input packing and replay reconstruction
//! - `settings`: Match and computer-player configuration

pub mod replay;
pub mod rng;
pub mod settings;
pub mod sim;

pub use replay::{ReplayError, ReplayLog, ReplayRecorder};
pub use rng::{RandStream, Rng};
pub use settings::{AiConfig, AiPreset, ConfigError, DefensePolicy, ServeOrder, SimConfig};

/// Game configuration constants
///
/// All simulation arithmetic is integer. Y grows downward; the top of the
/// screen is 0.
pub mod consts {
    /// Court width
    pub const GROUND_WIDTH: i32 = 432;
    /// Court center, also the net X
    pub const GROUND_HALF_WIDTH: i32 = GROUND_WIDTH / 2;

    /// Character hit box (square)
    pub const PLAYER_LENGTH: i32 = 64;
    pub const PLAYER_HALF_LENGTH: i32 = PLAYER_LENGTH / 2;
    /// Character center Y while standing
    pub const PLAYER_TOUCHING_GROUND_Y: i32 = 244;

    /// Ball radius
    pub const BALL_RADIUS: i32 = 20;
    /// Ground line for the ball center
    pub const BALL_TOUCHING_GROUND_Y: i32 = 252;

    /// Net pillar
    pub const NET_PILLAR_HALF_WIDTH: i32 = 25;
    pub const NET_PILLAR_TOP_TOP_Y: i32 = 176;
    pub const NET_PILLAR_TOP_BOTTOM_Y: i32 = 192;

    /// Character movement
    pub const PLAYER_WALK_SPEED: i32 = 6;
    pub const PLAYER_DIVE_SPEED: i32 = 8;
    pub const PLAYER_JUMP_VELOCITY: i32 = -16;
    pub const PLAYER_DIVE_VELOCITY: i32 = -5;
    /// Lying-down countdown armed when a dive lands
    pub const LYING_DOWN_TICKS: i32 = 3;

    /// Ball response to a character
    pub const MIN_BOUNCE_SPEED: i32 = 15;
    pub const POWER_HIT_STEP: i32 = 10;
    /// Fastest horizontal speed a power hit produces
    pub const MAX_POWER_HIT_SPEED: i32 = 2 * POWER_HIT_STEP;

    /// Forward simulation iteration cap
    pub const PREDICTION_LOOP_LIMIT: usize = 1000;
    /// Path entries that get branch predictions
    pub const BRANCH_HORIZON: usize = 34;

    /// Random streams produce values in `0..=RAND_MAX`
    pub const RAND_MAX: i32 = 32767;
}
