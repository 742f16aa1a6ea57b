//! Data-driven game balance
//!
//! The defaults reproduce the classic Pixel Dash feel. Any field can be
//! overridden from JSON; fields left out keep their default value.

use rand::Rng;
use rand::distr::Uniform;
use serde::{Deserialize, Serialize};

use crate::sim::EntityKind;

/// Vertical spawn position for a rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnY {
    /// Always spawn at this height
    Fixed(f32),
    /// Uniform in `[min, max]`
    Uniform { min: f32, max: f32 },
}

impl SpawnY {
    /// Draw a spawn height. `None` if the range is empty, not finite or too
    /// wide to sample.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Option<f32> {
        match *self {
            SpawnY::Fixed(y) => y.is_finite().then_some(y),
            SpawnY::Uniform { min, max } if min == max => min.is_finite().then_some(min),
            SpawnY::Uniform { min, max } => {
                let dist = Uniform::new_inclusive(min, max).ok()?;
                Some(rng.sample(dist))
            }
        }
    }

    fn is_usable(&self) -> bool {
        match *self {
            SpawnY::Fixed(y) => y.is_finite(),
            SpawnY::Uniform { min, max } => Uniform::new_inclusive(min, max).is_ok(),
        }
    }
}

/// One row of the spawn table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnRule {
    pub kind: EntityKind,
    /// Repeat interval of the spawn timer
    pub interval_ms: u32,
    /// Constant horizontal velocity (negative = leftward)
    pub velocity_x: f32,
    pub spawn_y: SpawnY,
    /// Whether gravity pulls the entity down to the ground
    #[serde(default)]
    pub falls: bool,
}

/// What happens when a power-up is collected while the shield is already up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShieldStacking {
    /// Cancel the pending expiry and restart the full duration
    #[default]
    Restart,
    /// Every pickup schedules its own expiry and none is cancelled, so the
    /// earliest one ends the shield
    Independent,
}

/// Game balance table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub spawn_rules: Vec<SpawnRule>,
    /// Points per collected bit
    pub bit_points: u64,
    /// Points per simulated Playing frame
    pub frame_points: u64,
    pub shield_duration_ms: u32,
    /// Live entity cap; spawns beyond it are dropped
    pub max_entities: usize,
    pub shield_stacking: ShieldStacking,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            spawn_rules: vec![
                SpawnRule {
                    kind: EntityKind::Bit,
                    interval_ms: 1000,
                    velocity_x: -200.0,
                    spawn_y: SpawnY::Uniform {
                        min: 300.0,
                        max: 500.0,
                    },
                    falls: true,
                },
                SpawnRule {
                    kind: EntityKind::Obstacle,
                    interval_ms: 2000,
                    velocity_x: -250.0,
                    spawn_y: SpawnY::Fixed(500.0),
                    falls: false,
                },
                SpawnRule {
                    kind: EntityKind::PowerUp,
                    interval_ms: 5000,
                    velocity_x: -200.0,
                    spawn_y: SpawnY::Fixed(500.0),
                    falls: false,
                },
            ],
            bit_points: 10,
            frame_points: 1,
            shield_duration_ms: 5000,
            max_entities: 64,
            shield_stacking: ShieldStacking::Restart,
        }
    }
}

impl Tuning {
    /// Parse a tuning table from JSON, dropping rules that could never be
    /// scheduled
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tuning: Tuning = serde_json::from_str(json)?;
        Ok(tuning.validated())
    }

    /// Remove spawn rules with a zero interval or an unusable spawn height
    pub fn validated(mut self) -> Self {
        self.spawn_rules.retain(|rule| {
            if rule.interval_ms == 0 {
                log::warn!("Ignoring {:?} spawn rule with zero interval", rule.kind);
                false
            } else if !rule.spawn_y.is_usable() {
                log::warn!(
                    "Ignoring {:?} spawn rule with unusable spawn_y {:?}",
                    rule.kind,
                    rule.spawn_y
                );
                false
            } else {
                true
            }
        });
        self
    }
}
