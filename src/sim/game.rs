//! Match and round lifecycle
//!
//! Owns the ball, both players and the random streams, and wraps the
//! per-tick step with scoring, round restarts and the game-over handoff.

use serde::{Deserialize, Serialize};

use super::state::{Ball, Player, Side, UserInput};
use super::tick::tick;
use crate::rng::Rng;
use crate::settings::SimConfig;

/// Ticks between the rally-ending ground touch and the next serve
pub const ROUND_END_TICKS: u32 = 30;
/// Leading part of the round end the caller may show in slow motion
pub const SLOW_MOTION_TICKS: u32 = 6;

/// Match phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Rally in progress
    Playing,
    /// Rally over, ball still bouncing
    RoundEnd { ticks_left: u32 },
    /// Someone reached the winning score
    GameOver,
}

/// Events for UI, audio and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchEvent {
    RoundStarted { serving: Side },
    PointScored { side: Side, scores: [u32; 2] },
    GameOver { winner: Side },
}

/// What one step produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepReport {
    pub ground_touch: bool,
    /// Resolved inputs, computer sides included
    pub inputs: [UserInput; 2],
    /// The caller may slow this tick down
    pub slow_motion: bool,
    pub events: Vec<MatchEvent>,
}

/// A complete match
#[derive(Debug)]
pub struct Match {
    pub players: [Player; 2],
    pub ball: Ball,
    pub rng: Rng,
    pub config: SimConfig,
    pub scores: [u32; 2],
    pub is_player2_serve: bool,
    pub phase: MatchPhase,
    /// Ticks stepped since the match began
    pub ticks: u64,
}

impl Match {
    /// New match with an OS-seeded live stream
    pub fn new(seed: u64, config: SimConfig, computer: [bool; 2]) -> Self {
        Self::with_rng(Rng::new(seed), config, computer)
    }

    /// New match whose computer decisions also follow `seed`
    pub fn deterministic(seed: u64, config: SimConfig, computer: [bool; 2]) -> Self {
        Self::with_rng(Rng::deterministic(seed), config, computer)
    }

    pub fn with_rng(rng: Rng, config: SimConfig, computer: [bool; 2]) -> Self {
        let mut game = Self {
            players: [
                Player::new(Side::Left, computer[0]),
                Player::new(Side::Right, computer[1]),
            ],
            ball: Ball::new(false),
            rng,
            config,
            scores: [0, 0],
            is_player2_serve: false,
            phase: MatchPhase::Playing,
            ticks: 0,
        };
        game.start_round();
        game
    }

    pub fn serving_side(&self) -> Side {
        if self.is_player2_serve {
            Side::Right
        } else {
            Side::Left
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == MatchPhase::GameOver
    }

    pub fn winner(&self) -> Option<Side> {
        self.players.iter().find(|p| p.is_winner).map(|p| p.side)
    }

    /// Reset ball and players for a new rally and pick the serve.
    ///
    /// The serve draw happens for the serving side whether or not it is
    /// computer controlled, so a replay consumes the seeded stream the same way.
    pub fn start_round(&mut self) {
        for player in &mut self.players {
            player.reset_for_round(&mut self.rng);
            player.serve.stop();
        }
        self.ball.reset_for_round(self.is_player2_serve);

        let serving = self.serving_side();
        let server = &mut self.players[serving.index()];
        let skill = server.serve.select(&self.config.ai, &mut self.rng);
        if let Some(skill) = skill.filter(|_| server.is_computer) {
            log::debug!("{:?} serves {:?}", serving, skill);
            server.serve.start(skill);
        }

        self.phase = MatchPhase::Playing;
        log::info!(
            "Round start: {} - {}, {:?} serving",
            self.scores[0],
            self.scores[1],
            serving
        );
    }

    /// Step one tick with the human sides' inputs. Computer sides ignore
    /// their slot and report what they chose instead.
    pub fn step(&mut self, inputs: [UserInput; 2]) -> StepReport {
        let mut report = StepReport {
            inputs,
            ..Default::default()
        };

        let [player1, player2] = &mut self.players;
        report.ground_touch = tick(
            player1,
            player2,
            &mut self.ball,
            &mut report.inputs,
            &mut self.rng,
            &self.config.ai,
        );
        self.ticks += 1;

        match self.phase {
            MatchPhase::Playing if report.ground_touch => self.end_rally(&mut report.events),
            MatchPhase::RoundEnd { ticks_left } if ticks_left <= 1 => {
                self.start_round();
                report.events.push(MatchEvent::RoundStarted {
                    serving: self.serving_side(),
                });
            }
            MatchPhase::RoundEnd { ticks_left } => {
                self.phase = MatchPhase::RoundEnd {
                    ticks_left: ticks_left - 1,
                };
            }
            _ => {}
        }

        report.slow_motion = matches!(
            self.phase,
            MatchPhase::RoundEnd { ticks_left } if ticks_left > ROUND_END_TICKS - SLOW_MOTION_TICKS
        );
        report
    }

    /// Score the rally: a ball landing on the left half is a point for the right
    fn end_rally(&mut self, events: &mut Vec<MatchEvent>) {
        let scorer = if Side::Left.loses_on(self.ball.pos.x) {
            Side::Right
        } else {
            Side::Left
        };
        self.scores[scorer.index()] += 1;
        self.is_player2_serve = scorer == Side::Right;
        events.push(MatchEvent::PointScored {
            side: scorer,
            scores: self.scores,
        });
        log::info!(
            "Point {:?} at x={}: {} - {}",
            scorer,
            self.ball.pos.x,
            self.scores[0],
            self.scores[1]
        );

        if self.scores[scorer.index()] >= self.config.winning_score {
            for player in &mut self.players {
                player.game_ended = true;
                player.is_winner = player.side == scorer;
            }
            self.phase = MatchPhase::GameOver;
            events.push(MatchEvent::GameOver { winner: scorer });
            log::info!("Game over: {:?} wins {} - {}", scorer, self.scores[0], self.scores[1]);
        } else {
            self.phase = MatchPhase::RoundEnd {
                ticks_left: ROUND_END_TICKS,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::AiPreset;
    use crate::sim::state::PlayerState;
    use glam::IVec2;

    fn humans(config: SimConfig) -> Match {
        Match::deterministic(21, config, [false, false])
    }

    fn drop_ball_at(game: &mut Match, x: i32) {
        game.ball.pos = IVec2::new(x, 250);
        game.ball.vel = IVec2::new(0, 5);
    }

    #[test]
    fn test_computer_serve_follows_table() {
        let mut game = Match::deterministic(4, SimConfig::default(), [true, false]);
        let skill = game.players[0].serve.skill().expect("computer server picks a serve");

        for s in skill.table() {
            for _ in 0..s.duration {
                let report = game.step([UserInput::NONE; 2]);
                assert_eq!(report.inputs[0], s.action.to_input(Side::Left));
                assert_eq!(report.inputs[1], UserInput::NONE);
            }
        }
        game.step([UserInput::NONE; 2]);
        assert!(!game.players[0].serve.is_running());
    }

    #[test]
    fn test_human_server_draws_but_does_not_run_script() {
        let game = humans(SimConfig::default());
        assert!(!game.players[0].serve.is_running());
        assert!(!game.players[1].serve.is_running());
    }

    #[test]
    fn test_point_goes_to_the_other_side_and_serve_follows() {
        let mut game = humans(SimConfig::default());
        drop_ball_at(&mut game, 100);
        let report = game.step([UserInput::NONE; 2]);
        assert!(report.ground_touch);
        assert!(report.slow_motion);
        assert_eq!(game.scores, [0, 1]);
        assert!(game.is_player2_serve);
        assert_eq!(
            report.events,
            vec![MatchEvent::PointScored {
                side: Side::Right,
                scores: [0, 1]
            }]
        );

        // Further bounces during the round end do not score
        let mut started = false;
        for i in 1..=ROUND_END_TICKS {
            let report = game.step([UserInput::NONE; 2]);
            assert_eq!(report.slow_motion, i < SLOW_MOTION_TICKS);
            started = report
                .events
                .contains(&MatchEvent::RoundStarted { serving: Side::Right });
        }
        assert!(started);
        assert_eq!(game.scores, [0, 1]);
        assert_eq!(game.phase, MatchPhase::Playing);
        assert_eq!(game.ball.pos, IVec2::new(376, 0));
    }

    #[test]
    fn test_ball_on_right_half_scores_left() {
        let mut game = humans(SimConfig::default());
        drop_ball_at(&mut game, 300);
        game.step([UserInput::NONE; 2]);
        assert_eq!(game.scores, [1, 0]);
        assert!(!game.is_player2_serve);
    }

    #[test]
    fn test_game_over_sets_winner_and_plays_end_animation() {
        let config = SimConfig {
            winning_score: 1,
            ..SimConfig::default()
        };
        let mut game = humans(config);
        drop_ball_at(&mut game, 300);
        let report = game.step([UserInput::NONE; 2]);
        assert!(game.is_game_over());
        assert_eq!(game.winner(), Some(Side::Left));
        assert!(report.events.contains(&MatchEvent::GameOver { winner: Side::Left }));

        for _ in 0..10 {
            game.step([UserInput::NONE; 2]);
        }
        assert_eq!(game.players[0].state, PlayerState::Win);
        assert_eq!(game.players[1].state, PlayerState::Lose);
        assert_eq!(game.scores, [1, 0]);
    }

    #[test]
    fn test_rookie_computers_score_points() {
        for seed in 1..=3 {
            let config = SimConfig::from_preset(AiPreset::Rookie);
            let mut game = Match::deterministic(seed, config, [true, true]);
            for _ in 0..3000 {
                game.step([UserInput::NONE; 2]);
            }
            let points: u32 = game.scores.iter().sum();
            assert!(points >= 5, "seed {} scored only {:?}", seed, game.scores);
        }
    }
}
