//! Ball, player and input state
//!
//! Ball and players are created once per match and reinitialized in place at
//! the start of every round.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::ai::AiPlanner;
use super::predict::{BallSnapshot, BranchSet};
use super::serve::ServeMachine;
use crate::consts::*;
use crate::rng::Rng;

/// Which half of the court a player owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// X sign pointing at the net from this side
    #[inline]
    pub fn toward_net(self) -> i32 {
        match self {
            Side::Left => 1,
            Side::Right => -1,
        }
    }

    /// Reachable range of a player center on this side
    pub fn x_range(self) -> (i32, i32) {
        match self {
            Side::Left => (PLAYER_HALF_LENGTH, GROUND_HALF_WIDTH - PLAYER_HALF_LENGTH),
            Side::Right => (
                GROUND_HALF_WIDTH + PLAYER_HALF_LENGTH,
                GROUND_WIDTH - PLAYER_HALF_LENGTH,
            ),
        }
    }

    /// Whether a ball center at `x` is over this half
    #[inline]
    pub fn owns_x(self, x: i32) -> bool {
        match self {
            Side::Left => x < GROUND_HALF_WIDTH,
            Side::Right => x >= GROUND_HALF_WIDTH,
        }
    }

    /// Whether a landing X counts as a point scored against this side
    #[inline]
    pub fn loses_on(self, landing_x: i32) -> bool {
        match self {
            Side::Left => landing_x < GROUND_HALF_WIDTH,
            Side::Right => landing_x >= GROUND_HALF_WIDTH,
        }
    }
}

/// Resolved per-tick input for one side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserInput {
    /// -1 left, 0 none, 1 right
    pub x_direction: i32,
    /// -1 up, 0 none, 1 down
    pub y_direction: i32,
    /// 1 on the tick the hit key went down, 0 otherwise
    pub power_hit: i32,
}

impl UserInput {
    pub const NONE: UserInput = UserInput {
        x_direction: 0,
        y_direction: 0,
        power_hit: 0,
    };

    pub fn new(x_direction: i32, y_direction: i32, power_hit: i32) -> Self {
        Self {
            x_direction,
            y_direction,
            power_hit,
        }
    }
}

/// Ground-touch / power-hit punch sprite
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunchEffect {
    pub x: i32,
    pub y: i32,
    pub radius: i32,
}

/// Level-triggered ball sounds, read and cleared once per tick by the audio side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallSounds {
    pub power_hit: bool,
    pub ground_touch: bool,
}

impl BallSounds {
    /// Read and clear
    pub fn take(&mut self) -> BallSounds {
        std::mem::take(self)
    }
}

/// The ball
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: IVec2,
    pub vel: IVec2,
    /// 0..=50; 50 survives the wrap and shows as rotation 5
    pub fine_rotation: i32,
    /// Sprite index 0..=5 (5 is the "hyper ball")
    pub rotation: i32,
    /// Where the ball lands if nobody touches it
    pub expected_landing_x: i32,
    pub punch_effect: PunchEffect,
    /// Trail positions for effect rendering
    pub previous: IVec2,
    pub previous_previous: IVec2,
    pub is_power_hit: bool,
    pub sound: BallSounds,
    /// Forward simulation starting at the current state
    #[serde(skip)]
    pub path: Vec<BallSnapshot>,
    /// Power-hit branches for the first path entries
    #[serde(skip)]
    pub branches: Vec<BranchSet>,
}

impl Default for Ball {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Ball {
    pub fn new(is_player2_serve: bool) -> Self {
        let mut ball = Self {
            pos: IVec2::ZERO,
            vel: IVec2::ZERO,
            fine_rotation: 0,
            rotation: 0,
            expected_landing_x: 0,
            punch_effect: PunchEffect::default(),
            previous: IVec2::ZERO,
            previous_previous: IVec2::ZERO,
            is_power_hit: false,
            sound: BallSounds::default(),
            path: Vec::new(),
            branches: Vec::new(),
        };
        ball.reset_for_round(is_player2_serve);
        ball
    }

    /// Place the ball above the serving side
    pub fn reset_for_round(&mut self, is_player2_serve: bool) {
        let x = if is_player2_serve {
            GROUND_WIDTH - 56
        } else {
            56
        };
        self.pos = IVec2::new(x, 0);
        self.vel = IVec2::new(0, 1);
        self.punch_effect.radius = 0;
        self.is_power_hit = false;
    }

    /// Position and velocity only
    pub fn snapshot(&self) -> BallSnapshot {
        BallSnapshot {
            pos: self.pos,
            vel: self.vel,
        }
    }
}

/// Discrete character state; the numeric order matters to the movement rules
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PlayerState {
    #[default]
    Normal = 0,
    Jump = 1,
    JumpSmash = 2,
    Dive = 3,
    LyingDown = 4,
    Win = 5,
    Lose = 6,
}

impl PlayerState {
    /// Airborne states that can still steer, jump-check and smash
    #[inline]
    pub fn is_controllable(self) -> bool {
        self < PlayerState::Dive
    }

    /// Frames available to the renderer for this state
    pub fn frame_count(self) -> i32 {
        match self {
            PlayerState::Dive => 2,
            PlayerState::LyingDown => 1,
            _ => 5,
        }
    }
}

/// Level-triggered character sounds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSounds {
    pub jump_or_dive: bool,
    pub smash: bool,
    pub win: bool,
}

impl PlayerSounds {
    /// Read and clear
    pub fn take(&mut self) -> PlayerSounds {
        std::mem::take(self)
    }
}

/// One character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub side: Side,
    pub is_computer: bool,
    pub pos: IVec2,
    pub vel_y: i32,
    pub state: PlayerState,
    pub frame: i32,
    /// Per-state animation cadence counter
    pub delay_before_next_frame: i32,
    /// +1/-1 while idling
    pub arm_swing_direction: i32,
    pub diving_direction: i32,
    pub lying_down_left: i32,
    /// True while overlapping the ball; impulses only fire on the rising edge
    pub collided_with_ball: bool,
    /// Per-round random temperament, 0..=4
    pub boldness: i32,
    pub is_winner: bool,
    pub game_ended: bool,
    pub sound: PlayerSounds,
    pub ai: AiPlanner,
    pub serve: ServeMachine,
}

impl Player {
    pub fn new(side: Side, is_computer: bool) -> Self {
        Self {
            side,
            is_computer,
            pos: IVec2::new(Self::start_x(side), PLAYER_TOUCHING_GROUND_Y),
            vel_y: 0,
            state: PlayerState::Normal,
            frame: 0,
            delay_before_next_frame: 0,
            arm_swing_direction: 1,
            diving_direction: 0,
            lying_down_left: -1,
            collided_with_ball: false,
            boldness: 0,
            is_winner: false,
            game_ended: false,
            sound: PlayerSounds::default(),
            ai: AiPlanner::default(),
            serve: ServeMachine::default(),
        }
    }

    fn start_x(side: Side) -> i32 {
        match side {
            Side::Left => 36,
            Side::Right => GROUND_WIDTH - 36,
        }
    }

    /// Reinitialize for a new rally. Draws boldness from the seeded stream.
    pub fn reset_for_round(&mut self, rng: &mut Rng) {
        self.pos = IVec2::new(Self::start_x(self.side), PLAYER_TOUCHING_GROUND_Y);
        self.vel_y = 0;
        self.collided_with_ball = false;
        self.state = PlayerState::Normal;
        self.frame = 0;
        self.arm_swing_direction = 1;
        self.delay_before_next_frame = 0;
        self.boldness = rng.seeded() % 5;
        self.ai.reset();
    }

    #[inline]
    pub fn is_on_ground(&self) -> bool {
        self.pos.y == PLAYER_TOUCHING_GROUND_Y
    }

    /// Sprite selector: 5 frames each for Normal/Jump/JumpSmash, 2 for Dive,
    /// 1 for LyingDown, 5 each for Win/Lose
    pub fn sprite_index(&self) -> i32 {
        let state = self.state as i32;
        match self.state {
            PlayerState::Normal
            | PlayerState::Jump
            | PlayerState::JumpSmash
            | PlayerState::Dive => 5 * state + self.frame,
            PlayerState::LyingDown => 17 + self.frame,
            PlayerState::Win | PlayerState::Lose => 18 + 5 * (state - 5) + self.frame,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ball_round_reset_positions() {
        let mut ball = Ball::new(false);
        assert_eq!(ball.pos, IVec2::new(56, 0));
        assert_eq!(ball.vel, IVec2::new(0, 1));

        ball.is_power_hit = true;
        ball.punch_effect.radius = BALL_RADIUS;
        ball.reset_for_round(true);
        assert_eq!(ball.pos, IVec2::new(376, 0));
        assert!(!ball.is_power_hit);
        assert_eq!(ball.punch_effect.radius, 0);
    }

    #[test]
    fn test_player_reset_draws_boldness_in_range() {
        let mut rng = Rng::deterministic(3);
        let mut player = Player::new(Side::Right, true);
        for _ in 0..50 {
            player.pos.x = 300;
            player.state = PlayerState::Lose;
            player.reset_for_round(&mut rng);
            assert!((0..5).contains(&player.boldness));
            assert_eq!(player.pos, IVec2::new(396, PLAYER_TOUCHING_GROUND_Y));
            assert_eq!(player.state, PlayerState::Normal);
        }
    }

    #[test]
    fn test_sprite_index_table() {
        let mut player = Player::new(Side::Left, false);
        player.state = PlayerState::Jump;
        player.frame = 2;
        assert_eq!(player.sprite_index(), 7);
        player.state = PlayerState::Dive;
        player.frame = 1;
        assert_eq!(player.sprite_index(), 16);
        player.state = PlayerState::LyingDown;
        player.frame = 0;
        assert_eq!(player.sprite_index(), 17);
        player.state = PlayerState::Lose;
        player.frame = 4;
        assert_eq!(player.sprite_index(), 27);
    }

    #[test]
    fn test_sounds_clear_on_read() {
        let mut sounds = PlayerSounds {
            smash: true,
            ..Default::default()
        };
        assert!(sounds.take().smash);
        assert!(!sounds.take().smash);
    }

    #[test]
    fn test_side_ranges_are_mirrored() {
        let (l0, l1) = Side::Left.x_range();
        let (r0, r1) = Side::Right.x_range();
        assert_eq!(l0 + r1, GROUND_WIDTH);
        assert_eq!(l1 + r0, GROUND_WIDTH);
    }
}
