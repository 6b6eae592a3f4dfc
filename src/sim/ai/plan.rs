//! Planning record for the computer player

use serde::{Deserialize, Serialize};

use crate::sim::state::Side;

/// Hit direction as a signed code in `-5..=5`.
///
/// `|code| / 2` selects the vertical direction (0 up, 1 level, 2 down) and
/// an odd code adds a horizontal component whose sign is relative to the net
/// (positive toward it). Negating a code mirrors only that horizontal part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectionCode(i8);

impl DirectionCode {
    pub fn new(code: i8) -> Option<Self> {
        (-5..=5).contains(&code).then_some(Self(code))
    }

    /// Code for a power hit pressed with `(|x|, y)`
    pub fn from_pair(x_abs: i32, y_direction: i32) -> Self {
        let vertical = (y_direction.clamp(-1, 1) + 1) * 2;
        Self((vertical + x_abs.clamp(0, 1)) as i8)
    }

    #[inline]
    pub fn value(self) -> i8 {
        self.0
    }

    pub fn flipped(self) -> Self {
        Self(-self.0)
    }

    /// `(x_direction, y_direction)` for a player on `side`
    pub fn to_input(self, side: Side) -> (i32, i32) {
        let magnitude = i32::from(self.0.unsigned_abs());
        let y = magnitude / 2 - 1;
        let x = if magnitude % 2 == 1 {
            i32::from(self.0.signum()) * side.toward_net()
        } else {
            0
        };
        (x, y)
    }
}

/// Kind of planned touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitVariant {
    Plain,
    /// Presses the mirrored horizontal direction; the ball flies the same
    Juke,
    /// Leaves the ground as late as the contact allows
    Fancy,
    /// Spike after a set; no further set is planned
    SecondJump,
    /// Soft touch straight up for a follow-up spike
    Set,
    /// Soft touch that just keeps the ball alive
    Receive,
}

impl HitVariant {
    #[inline]
    pub fn is_power_hit(self) -> bool {
        !matches!(self, HitVariant::Set | HitVariant::Receive)
    }
}

/// Pending action
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Plan {
    #[default]
    NoPlan,
    PendingHit {
        /// Ticks until contact, 0 on the contact tick
        ticks_left: i32,
        /// Where to stand at contact
        target_x: i32,
        direction: DirectionCode,
        variant: HitVariant,
        /// Ticks until the jump key goes down
        jump_in: Option<i32>,
    },
}

impl Plan {
    /// Advance the countdowns by one tick, dropping an expired plan
    pub fn tick(&mut self) {
        if let Plan::PendingHit {
            ticks_left, jump_in, ..
        } = self
        {
            *ticks_left -= 1;
            *jump_in = jump_in.map(|n| n - 1).filter(|n| *n >= 0);
            if *ticks_left < 0 {
                *self = Plan::NoPlan;
            }
        }
    }
}

/// Per-player decision state, cleared every round
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiPlanner {
    /// The next planned touch
    pub goodtime: Plan,
    /// While set, a set has been played and the follow-up spike is armed
    pub second_attack: Option<i32>,
    /// Cached defensive position for the current trajectory
    pub defense_x: Option<i32>,
    /// Landing point the current plan was made for
    pub observed_landing: Option<i32>,
}

impl AiPlanner {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[inline]
    pub fn combo_armed(&self) -> bool {
        self.second_attack.is_some()
    }

    /// Drop everything tied to the previous trajectory
    pub fn invalidate(&mut self, landing_x: i32) {
        self.goodtime = Plan::NoPlan;
        self.defense_x = None;
        self.observed_landing = Some(landing_x);
    }

    /// Per-tick countdowns
    pub fn tick(&mut self) {
        self.goodtime.tick();
        self.second_attack = self.second_attack.map(|n| n - 1).filter(|n| *n > 0);
    }
}
