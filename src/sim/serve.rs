//! Scripted serves
//!
//! A computer-controlled server plays one fixed action table per round. The
//! tables are side-relative ("forward" means toward the net) and mirrored at
//! input resolution, so both sides serve the same sequences.

use serde::{Deserialize, Serialize};

use super::state::{Side, UserInput};
use crate::rng::Rng;
use crate::settings::{AiConfig, ServeOrder};

/// One tick's scripted action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServeAction {
    Wait,
    Forward,
    Backward,
    Jump,
    JumpForward,
    SmashUp,
    SmashLevel,
    SmashDown,
    SmashForwardUp,
    SmashForward,
    SmashForwardDown,
    /// Emitted forever once the table is exhausted
    Done,
}

impl ServeAction {
    /// Resolve to an input for the given side
    pub fn to_input(self, side: Side) -> UserInput {
        let fwd = side.toward_net();
        match self {
            ServeAction::Wait | ServeAction::Done => UserInput::NONE,
            ServeAction::Forward => UserInput::new(fwd, 0, 0),
            ServeAction::Backward => UserInput::new(-fwd, 0, 0),
            ServeAction::Jump => UserInput::new(0, -1, 0),
            ServeAction::JumpForward => UserInput::new(fwd, -1, 0),
            ServeAction::SmashUp => UserInput::new(0, -1, 1),
            ServeAction::SmashLevel => UserInput::new(0, 0, 1),
            ServeAction::SmashDown => UserInput::new(0, 1, 1),
            ServeAction::SmashForwardUp => UserInput::new(fwd, -1, 1),
            ServeAction::SmashForward => UserInput::new(fwd, 0, 1),
            ServeAction::SmashForwardDown => UserInput::new(fwd, 1, 1),
        }
    }
}

/// An action held for `duration` ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServeStep {
    pub action: ServeAction,
    pub duration: u32,
}

const fn step(action: ServeAction, duration: u32) -> ServeStep {
    ServeStep { action, duration }
}

use ServeAction::*;

const FLOAT: &[ServeStep] = &[step(Wait, 24)];

const FORWARD_FLOAT: &[ServeStep] = &[step(Forward, 3), step(Wait, 21)];

const JUMP_SPIKE: &[ServeStep] = &[
    step(Wait, 2),
    step(Jump, 1),
    step(Forward, 2),
    step(Wait, 7),
    step(SmashForward, 1),
    step(Wait, 8),
];

const JUMP_LOB: &[ServeStep] = &[
    step(Wait, 2),
    step(Jump, 1),
    step(Forward, 2),
    step(Wait, 7),
    step(SmashForwardUp, 1),
    step(Wait, 8),
];

const JUKE_SPIKE: &[ServeStep] = &[
    step(Wait, 2),
    step(JumpForward, 1),
    step(Backward, 1),
    step(Forward, 2),
    step(Wait, 6),
    step(SmashDown, 1),
    step(Wait, 8),
];

const LATE_DROP: &[ServeStep] = &[
    step(Wait, 5),
    step(Jump, 1),
    step(Wait, 8),
    step(SmashForwardDown, 1),
    step(Wait, 6),
];

/// Named serve sequences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServeSkill {
    Float,
    ForwardFloat,
    JumpSpike,
    JumpLob,
    JukeSpike,
    LateDrop,
}

impl ServeSkill {
    pub const ALL: [ServeSkill; 6] = [
        ServeSkill::Float,
        ServeSkill::ForwardFloat,
        ServeSkill::JumpSpike,
        ServeSkill::JumpLob,
        ServeSkill::JukeSpike,
        ServeSkill::LateDrop,
    ];

    pub fn table(self) -> &'static [ServeStep] {
        match self {
            ServeSkill::Float => FLOAT,
            ServeSkill::ForwardFloat => FORWARD_FLOAT,
            ServeSkill::JumpSpike => JUMP_SPIKE,
            ServeSkill::JumpLob => JUMP_LOB,
            ServeSkill::JukeSpike => JUKE_SPIKE,
            ServeSkill::LateDrop => LATE_DROP,
        }
    }

    /// Total ticks before the table runs out
    pub fn duration(self) -> u32 {
        self.table().iter().map(|s| s.duration).sum()
    }
}

/// Per-side serve selection and playback
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServeMachine {
    skill: Option<ServeSkill>,
    phase: usize,
    frames_left: u32,
    /// Remaining skills of the current shuffle
    bag: Vec<ServeSkill>,
    rotation: usize,
}

impl ServeMachine {
    /// Pick the next serve. Shuffle draws from the seeded stream.
    pub fn select(&mut self, config: &AiConfig, rng: &mut Rng) -> Option<ServeSkill> {
        let enabled = &config.serve_skills;
        if enabled.is_empty() {
            return None;
        }

        match config.serve_order {
            ServeOrder::Shuffle => {
                self.bag.retain(|s| enabled.contains(s));
                if self.bag.is_empty() {
                    self.bag.extend_from_slice(enabled);
                    for i in (1..self.bag.len()).rev() {
                        let j = rng.seeded() as usize % (i + 1);
                        self.bag.swap(i, j);
                    }
                }
                self.bag.pop()
            }
            ServeOrder::Rotate => {
                let skill = enabled[self.rotation % enabled.len()];
                self.rotation = self.rotation.wrapping_add(1);
                Some(skill)
            }
        }
    }

    /// Begin playing `skill` from its first step
    pub fn start(&mut self, skill: ServeSkill) {
        self.skill = Some(skill);
        self.phase = 0;
        self.frames_left = skill.table().first().map_or(0, |s| s.duration);
    }

    pub fn stop(&mut self) {
        self.skill = None;
        self.phase = 0;
        self.frames_left = 0;
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.skill.is_some()
    }

    pub fn skill(&self) -> Option<ServeSkill> {
        self.skill
    }

    /// Action for this tick
    pub fn next_action(&mut self) -> ServeAction {
        let Some(skill) = self.skill else {
            return ServeAction::Done;
        };
        let table = skill.table();
        let Some(current) = table.get(self.phase) else {
            return ServeAction::Done;
        };

        self.frames_left = self.frames_left.saturating_sub(1);
        if self.frames_left == 0 {
            self.phase += 1;
            if let Some(next) = table.get(self.phase) {
                self.frames_left = next.duration;
            }
        }
        current.action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::AiConfig;

    #[test]
    fn test_tables_are_well_formed() {
        for skill in ServeSkill::ALL {
            let table = skill.table();
            assert!(!table.is_empty());
            assert!(table.iter().all(|s| s.duration >= 1 && s.action != ServeAction::Done));
            assert!(skill.duration() <= 40, "{:?} too long", skill);
        }
    }

    #[test]
    fn test_playback_matches_table_then_done() {
        let mut machine = ServeMachine::default();
        machine.start(ServeSkill::JukeSpike);
        for s in ServeSkill::JukeSpike.table() {
            for _ in 0..s.duration {
                assert_eq!(machine.next_action(), s.action);
            }
        }
        for _ in 0..10 {
            assert_eq!(machine.next_action(), ServeAction::Done);
        }
        assert!(machine.is_running());
        machine.stop();
        assert!(!machine.is_running());
    }

    #[test]
    fn test_actions_are_mirrored_per_side() {
        let left = ServeAction::SmashForward.to_input(Side::Left);
        let right = ServeAction::SmashForward.to_input(Side::Right);
        assert_eq!(left, UserInput::new(1, 0, 1));
        assert_eq!(right, UserInput::new(-1, 0, 1));
        assert_eq!(ServeAction::Backward.to_input(Side::Right), UserInput::new(1, 0, 0));
        assert_eq!(ServeAction::Done.to_input(Side::Left), UserInput::NONE);
    }

    #[test]
    fn test_shuffle_uses_each_skill_once_per_bag() {
        let config = AiConfig::default();
        let mut rng = Rng::deterministic(11);
        let mut machine = ServeMachine::default();
        let n = config.serve_skills.len();

        let mut first: Vec<ServeSkill> = (0..n).filter_map(|_| machine.select(&config, &mut rng)).collect();
        first.sort_by_key(|s| *s as u8);
        let mut expected = config.serve_skills.clone();
        expected.sort_by_key(|s| *s as u8);
        assert_eq!(first, expected);
    }

    #[test]
    fn test_shuffle_is_seed_reproducible() {
        let config = AiConfig::default();
        let run = || {
            let mut rng = Rng::new(42);
            let mut machine = ServeMachine::default();
            (0..20).filter_map(|_| machine.select(&config, &mut rng)).collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_rotate_cycles_in_order() {
        let config = AiConfig {
            serve_order: ServeOrder::Rotate,
            serve_skills: vec![ServeSkill::Float, ServeSkill::JumpSpike],
            ..AiConfig::default()
        };
        let mut rng = Rng::deterministic(0);
        let mut machine = ServeMachine::default();
        let picks: Vec<_> = (0..4).filter_map(|_| machine.select(&config, &mut rng)).collect();
        assert_eq!(
            picks,
            vec![ServeSkill::Float, ServeSkill::JumpSpike, ServeSkill::Float, ServeSkill::JumpSpike]
        );
    }

    #[test]
    fn test_no_enabled_skills_selects_nothing() {
        let config = AiConfig {
            serve_skills: Vec::new(),
            ..AiConfig::default()
        };
        let mut rng = Rng::deterministic(0);
        assert_eq!(ServeMachine::default().select(&config, &mut rng), None);
    }
}
