//! Match and computer-player settings
//!
//! Passed explicitly into the AI controller and the serve engine; nothing in
//! the simulation reads ambient configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::sim::serve::ServeSkill;

/// Errors loading or validating settings
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse settings: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// How a computer server picks its next serve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ServeOrder {
    /// Every enabled serve once, in seeded random order, then reshuffle
    #[default]
    Shuffle,
    /// Enabled serves in listed order
    Rotate,
}

/// Where a computer player waits while the opponent plays the ball
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DefensePolicy {
    /// Mirror the opponent's X across the net
    Mirror,
    /// Hang back near the own back line
    FarLine,
    /// Randomly trust the raw landing point, otherwise mirror
    #[default]
    Random,
}

/// Computer-player strength presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AiPreset {
    Rookie,
    #[default]
    Standard,
    Ace,
}

impl AiPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiPreset::Rookie => "Rookie",
            AiPreset::Standard => "Standard",
            AiPreset::Ace => "Ace",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "rookie" | "easy" => Some(AiPreset::Rookie),
            "standard" | "normal" => Some(AiPreset::Standard),
            "ace" | "hard" => Some(AiPreset::Ace),
            _ => None,
        }
    }
}

/// Computer-player capabilities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub serve_order: ServeOrder,
    /// Serves the computer may choose from; empty disables scripted serves
    pub serve_skills: Vec<ServeSkill>,
    pub defense: DefensePolicy,

    // === Capabilities ===
    /// Pick the fastest spike the opponent cannot reach. Off, spikes go in a
    /// random direction that lands on the opponent's court.
    pub branch_search: bool,
    /// Set the ball to itself for a second-touch spike
    pub second_attack: bool,
    /// Jump as late as the contact still allows
    pub fancy: bool,
    /// Press the mirrored horizontal direction on spikes
    pub juke: bool,
    /// Refuse power hits that would send a net ball into the own court
    pub safety_check: bool,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self::from_preset(AiPreset::Standard)
    }
}

impl AiConfig {
    pub fn from_preset(preset: AiPreset) -> Self {
        match preset {
            AiPreset::Rookie => Self {
                serve_order: ServeOrder::Rotate,
                serve_skills: vec![ServeSkill::Float, ServeSkill::ForwardFloat],
                defense: DefensePolicy::Mirror,
                branch_search: false,
                second_attack: false,
                fancy: false,
                juke: false,
                safety_check: true,
            },
            AiPreset::Standard => Self {
                serve_order: ServeOrder::Shuffle,
                serve_skills: ServeSkill::ALL.to_vec(),
                defense: DefensePolicy::Random,
                branch_search: true,
                second_attack: true,
                fancy: false,
                juke: false,
                safety_check: true,
            },
            AiPreset::Ace => Self {
                serve_order: ServeOrder::Shuffle,
                serve_skills: ServeSkill::ALL.to_vec(),
                defense: DefensePolicy::Random,
                branch_search: true,
                second_attack: true,
                fancy: true,
                juke: true,
                safety_check: true,
            },
        }
    }
}

/// Match settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Points needed to win
    pub winning_score: u32,
    pub ai: AiConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            winning_score: 15,
            ai: AiConfig::default(),
        }
    }
}

impl SimConfig {
    /// Default match with the computer players set to a preset
    pub fn from_preset(preset: AiPreset) -> Self {
        Self {
            ai: AiConfig::from_preset(preset),
            ..Self::default()
        }
    }

    /// Parse and validate JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.winning_score == 0 {
            return Err(ConfigError::Invalid("winning_score must be at least 1".into()));
        }
        let skills = &self.ai.serve_skills;
        for (i, skill) in skills.iter().enumerate() {
            if skills[..i].contains(skill) {
                return Err(ConfigError::Invalid(format!("serve skill {:?} listed twice", skill)));
            }
        }
        Ok(())
    }
}
