//! Input recording and replay
//!
//! A replay stores the seed, the match settings and one packed `u16` per
//! tick holding both sides' resolved inputs. Playing it back runs both sides
//! as humans with the seeded stream reset, which reproduces the match tick
//! for tick.
//!
//! Packing per side: `x + 1` in bits 0-1, `y + 1` in bits 2-3, power hit in
//! bit 4. The right side sits 5 bits higher.

use serde::{Deserialize, Serialize};

use crate::settings::SimConfig;
use crate::sim::game::{Match, StepReport};
use crate::sim::state::UserInput;

/// Current replay format
pub const REPLAY_VERSION: u32 = 1;

const SIDE_BITS: u32 = 5;
const SIDE_MASK: u16 = 0b1_1111;

/// Replay errors
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("invalid packed input {0:#06x}")]
    InvalidInput(u16),
    #[error("unsupported replay version {0}")]
    Version(u32),
    #[error("invalid replay settings: {0}")]
    Config(#[from] crate::settings::ConfigError),
    #[error("failed to parse replay: {0}")]
    Json(#[from] serde_json::Error),
}

fn pack_side(input: UserInput) -> u16 {
    let x = (input.x_direction + 1) as u16 & 0b11;
    let y = (input.y_direction + 1) as u16 & 0b11;
    let power = (input.power_hit & 1) as u16;
    x | y << 2 | power << 4
}

fn unpack_side(bits: u16, packed: u16) -> Result<UserInput, ReplayError> {
    let x = bits & 0b11;
    let y = (bits >> 2) & 0b11;
    if x == 3 || y == 3 {
        return Err(ReplayError::InvalidInput(packed));
    }
    Ok(UserInput::new(
        i32::from(x) - 1,
        i32::from(y) - 1,
        i32::from((bits >> 4) & 1),
    ))
}

/// Pack one tick's inputs
pub fn pack_inputs(inputs: &[UserInput; 2]) -> u16 {
    pack_side(inputs[0]) | pack_side(inputs[1]) << SIDE_BITS
}

/// Unpack one tick's inputs; a direction field of 3 is rejected
pub fn unpack_inputs(packed: u16) -> Result<[UserInput; 2], ReplayError> {
    if packed >> (2 * SIDE_BITS) != 0 {
        return Err(ReplayError::InvalidInput(packed));
    }
    Ok([
        unpack_side(packed & SIDE_MASK, packed)?,
        unpack_side((packed >> SIDE_BITS) & SIDE_MASK, packed)?,
    ])
}

/// A recorded match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayLog {
    pub version: u32,
    pub seed: u64,
    pub config: SimConfig,
    pub inputs: Vec<u16>,
}

impl ReplayLog {
    pub fn new(seed: u64, config: SimConfig) -> Self {
        Self {
            version: REPLAY_VERSION,
            seed,
            config,
            inputs: Vec::new(),
        }
    }

    /// Ticks recorded
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn to_json(&self) -> Result<String, ReplayError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        let log: ReplayLog = serde_json::from_str(json)?;
        if log.version != REPLAY_VERSION {
            return Err(ReplayError::Version(log.version));
        }
        log.config.validate()?;
        Ok(log)
    }
}

/// Collects resolved inputs as a match runs
#[derive(Debug, Clone)]
pub struct ReplayRecorder {
    log: ReplayLog,
}

impl ReplayRecorder {
    /// Start recording a match created with `seed` and `config`
    pub fn new(seed: u64, config: SimConfig) -> Self {
        Self {
            log: ReplayLog::new(seed, config),
        }
    }

    /// Record a match from its current state; it must not have stepped yet
    pub fn for_match(game: &Match) -> Self {
        Self::new(game.rng.seed(), game.config.clone())
    }

    pub fn record(&mut self, report: &StepReport) {
        self.log.inputs.push(pack_inputs(&report.inputs));
    }

    pub fn log(&self) -> &ReplayLog {
        &self.log
    }

    pub fn finish(self) -> ReplayLog {
        self.log
    }
}

/// Play a replay to the end, calling `observe` after every tick
pub fn play_with(
    recording: &ReplayLog,
    mut observe: impl FnMut(&Match, &StepReport),
) -> Result<Match, ReplayError> {
    let mut game = Match::new(recording.seed, recording.config.clone(), [false, false]);
    for (tick, &packed) in recording.inputs.iter().enumerate() {
        let inputs = unpack_inputs(packed).inspect_err(|_| {
            log::warn!("Replay input {:#06x} at tick {} is invalid", packed, tick);
        })?;
        let report = game.step(inputs);
        observe(&game, &report);
    }
    log::info!(
        "Replay finished after {} ticks: {} - {}",
        recording.len(),
        game.scores[0],
        game.scores[1]
    );
    Ok(game)
}

/// Play a replay to the end
pub fn play(recording: &ReplayLog) -> Result<Match, ReplayError> {
    play_with(recording, |_, _| {})
}
