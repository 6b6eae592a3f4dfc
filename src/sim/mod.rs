//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Integer arithmetic only
//! - One logical tick per call, no wall-clock time
//! - Seeded RNG for anything a replay has to reproduce
//! - Fixed side order (left, then right)
//! - No rendering, audio or platform dependencies

pub mod ai;
pub mod collision;
pub mod game;
pub mod player;
pub mod predict;
pub mod serve;
pub mod state;
pub mod tick;

pub use ai::{AiPlanner, DirectionCode, HitVariant, Plan};
pub use collision::{advance_ball, ball_overlaps_player, hit_ball, power_hit_velocity};
pub use game::{Match, MatchEvent, MatchPhase, StepReport};
pub use predict::{BallSnapshot, Branch, BranchSet, landing_point, update_prediction};
pub use serve::{ServeAction, ServeMachine, ServeSkill};
pub use state::{Ball, Player, PlayerState, Side, UserInput};
pub use tick::tick;
