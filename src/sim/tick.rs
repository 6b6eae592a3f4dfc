//! Fixed timestep simulation tick
//!
//! One call is exactly one logical tick; callers choose the cadence.

use super::ai;
use super::collision::{advance_ball, ball_overlaps_player, hit_ball};
use super::player;
use super::predict::update_prediction;
use super::state::{Ball, Player, UserInput};
use crate::rng::Rng;
use crate::settings::AiConfig;

/// Advance ball and both players by one tick.
///
/// Computer-controlled sides overwrite their slot in `inputs`, so after the
/// call `inputs` holds exactly what a replay needs to store. Returns true on
/// the tick the ball touches the ground.
pub fn tick(
    player1: &mut Player,
    player2: &mut Player,
    ball: &mut Ball,
    inputs: &mut [UserInput; 2],
    rng: &mut Rng,
    config: &AiConfig,
) -> bool {
    let ground_touch = advance_ball(ball);

    // Branches stay populated whenever a computer side is playing
    let extended = player1.is_computer || player2.is_computer;
    drive_player(player1, player2, ball, &mut inputs[0], rng, config, extended);
    drive_player(player2, player1, ball, &mut inputs[1], rng, config, extended);

    resolve_contact(player1, ball, inputs[0], rng);
    resolve_contact(player2, ball, inputs[1], rng);

    ground_touch
}

fn drive_player(
    me: &mut Player,
    opponent: &Player,
    ball: &mut Ball,
    input: &mut UserInput,
    rng: &mut Rng,
    config: &AiConfig,
    extended: bool,
) {
    update_prediction(ball, extended);
    if me.is_computer {
        ai::decide(me, ball, opponent, config, rng, input);
    }
    player::advance(me, *input);
}

/// Apply the contact impulse on the rising edge of an overlap only
fn resolve_contact(player: &mut Player, ball: &mut Ball, input: UserInput, rng: &mut Rng) {
    let overlapping = ball_overlaps_player(ball.pos, player.pos);
    if overlapping && !player.collided_with_ball {
        hit_ball(ball, player.pos.x, input, player.state, rng);
        update_prediction(ball, true);
    }
    player.collided_with_ball = overlapping;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::state::{PlayerState, Side};
    use glam::IVec2;

    fn humans() -> (Player, Player, Ball, Rng) {
        (
            Player::new(Side::Left, false),
            Player::new(Side::Right, false),
            Ball::new(false),
            Rng::deterministic(9),
        )
    }

    #[test]
    fn test_jump_smash_contact_through_orchestrator() {
        let (mut p1, mut p2, mut ball, mut rng) = humans();
        let config = AiConfig::default();
        p1.pos = IVec2::new(100, 150);
        p1.state = PlayerState::JumpSmash;
        p1.delay_before_next_frame = 5;
        p1.vel_y = 0;
        // Ends the world step right beside the player
        ball.pos = IVec2::new(115, 140);
        ball.vel = IVec2::new(0, 8);

        let mut inputs = [UserInput::new(1, 1, 0), UserInput::NONE];
        let touched = tick(&mut p1, &mut p2, &mut ball, &mut inputs, &mut rng, &config);
        assert!(!touched);
        assert!(p1.collided_with_ball);
        assert!(ball.is_power_hit);
        // Incoming vy 9 is floored to 15, doubled, pushed down
        assert_eq!(ball.vel, IVec2::new(2 * POWER_HIT_STEP, 2 * MIN_BOUNCE_SPEED));
        assert!(ball.sound.power_hit);
        assert_eq!(ball.path[0], ball.snapshot());
        assert!(!ball.branches.is_empty());
    }

    #[test]
    fn test_plain_contact_reflects() {
        let (mut p1, mut p2, mut ball, mut rng) = humans();
        let config = AiConfig::default();
        p1.pos.x = 100;
        ball.pos = IVec2::new(121, 210);
        ball.vel = IVec2::new(0, 5);

        let mut inputs = [UserInput::NONE; 2];
        tick(&mut p1, &mut p2, &mut ball, &mut inputs, &mut rng, &config);
        assert_eq!(ball.vel, IVec2::new(7, -MIN_BOUNCE_SPEED));
        assert!(!ball.is_power_hit);
    }

    #[test]
    fn test_contact_fires_on_rising_edge_only() {
        let (mut p1, mut p2, mut ball, mut rng) = humans();
        let config = AiConfig::default();
        p1.pos.x = 100;
        ball.pos = IVec2::new(100, 215);
        ball.vel = IVec2::new(0, 1);

        let mut inputs = [UserInput::NONE; 2];
        tick(&mut p1, &mut p2, &mut ball, &mut inputs, &mut rng, &config);
        assert!(p1.collided_with_ball);
        // Zero horizontal offset takes the seeded tie break
        assert!((-1..=1).contains(&ball.vel.x));
        assert_eq!(ball.vel.y, -MIN_BOUNCE_SPEED);

        // Still overlapping next tick: no second impulse
        ball.vel = IVec2::new(0, 3);
        ball.pos = IVec2::new(100, 220);
        tick(&mut p1, &mut p2, &mut ball, &mut inputs, &mut rng, &config);
        assert!(p1.collided_with_ball);
        assert_eq!(ball.vel, IVec2::new(0, 4));
    }

    #[test]
    fn test_ground_touch_reported() {
        let (mut p1, mut p2, mut ball, mut rng) = humans();
        let config = AiConfig::default();
        ball.pos = IVec2::new(200, 250);
        ball.vel = IVec2::new(0, 5);
        let mut inputs = [UserInput::NONE; 2];
        assert!(tick(&mut p1, &mut p2, &mut ball, &mut inputs, &mut rng, &config));
    }

    #[test]
    fn test_human_inputs_pass_through_untouched() {
        let (mut p1, mut p2, mut ball, mut rng) = humans();
        let config = AiConfig::default();
        let mut inputs = [UserInput::new(1, 0, 0), UserInput::new(-1, -1, 0)];
        tick(&mut p1, &mut p2, &mut ball, &mut inputs, &mut rng, &config);
        assert_eq!(inputs, [UserInput::new(1, 0, 0), UserInput::new(-1, -1, 0)]);
        assert_eq!(p1.pos.x, 36 + PLAYER_WALK_SPEED);
        assert_eq!(p2.state, PlayerState::Jump);
    }

    #[test]
    fn test_computer_side_writes_its_input() {
        let (mut p1, mut p2, mut ball, mut rng) = humans();
        let config = AiConfig::default();
        p2.is_computer = true;
        let mut inputs = [UserInput::NONE, UserInput::new(1, 1, 1)];
        tick(&mut p1, &mut p2, &mut ball, &mut inputs, &mut rng, &config);
        assert_ne!(inputs[1], UserInput::new(1, 1, 1));
        assert!(!ball.branches.is_empty());
    }

    #[test]
    fn test_branches_survive_a_human_right_side() {
        let (mut p1, mut p2, mut ball, mut rng) = humans();
        let config = AiConfig::default();
        p1.is_computer = true;
        let mut inputs = [UserInput::NONE; 2];
        for _ in 0..5 {
            tick(&mut p1, &mut p2, &mut ball, &mut inputs, &mut rng, &config);
            assert!(!ball.branches.is_empty());
            assert_eq!(ball.branches.len(), ball.path.len().min(BRANCH_HORIZON));
        }
    }

    #[test]
    fn test_humans_only_skip_branches() {
        let (mut p1, mut p2, mut ball, mut rng) = humans();
        let config = AiConfig::default();
        let mut inputs = [UserInput::NONE; 2];
        tick(&mut p1, &mut p2, &mut ball, &mut inputs, &mut rng, &config);
        assert!(ball.branches.is_empty());
        assert!(!ball.path.is_empty());
    }
}
