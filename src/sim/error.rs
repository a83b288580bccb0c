//! Combat action refusals

use thiserror::Error;

/// Why a combat action (shot, skill, energy spend) was refused
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CombatError {
    /// Shot cooldown has not elapsed
    #[error("shot on cooldown")]
    ShotCooldown,
    /// Skill cooldown has not elapsed
    #[error("skill on cooldown: {remaining_ms}ms remaining")]
    SkillCooldown { remaining_ms: f64 },
    /// Not enough energy for the action
    #[error("not enough energy: have {available}, need {required}")]
    InsufficientEnergy { available: f32, required: f32 },
    /// Aim vector has zero length
    #[error("no aim direction")]
    NoAimDirection,
    /// Projectile collection is full
    #[error("projectile limit of {limit} reached")]
    ProjectileCap { limit: usize },
    /// A skill is already running
    #[error("a skill is already active")]
    SkillActive,
}

/// Result type for combat operations
pub type CombatResult<T> = Result<T, CombatError>;

impl CombatError {
    /// Player-facing notice for this refusal, or `None` when it is silent
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            CombatError::InsufficientEnergy { .. } => Some("Not enough energy!"),
            CombatError::SkillCooldown { .. } => Some("Skill is cooling down!"),
            CombatError::ShotCooldown
            | CombatError::NoAimDirection
            | CombatError::ProjectileCap { .. }
            | CombatError::SkillActive => None,
        }
    }
}
