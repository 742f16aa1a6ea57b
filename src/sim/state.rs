//! Game state and core simulation types
//!
//! Everything a run needs lives in [`GameState`], which is passed by `&mut`
//! into each step. There is no global state.

use std::collections::VecDeque;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::physics::Aabb;
use super::timer::{TimerAction, TimerId, Timers};
use crate::consts::*;
use crate::tuning::Tuning;

/// Current scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Scene {
    /// Title screen, waiting for activation
    #[default]
    Menu,
    /// Active run
    Playing,
    /// Run ended with this final score
    GameOver { score: u64 },
}

/// Per-run scoring and shield state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Session {
    pub score: u64,
    pub shield_active: bool,
    pub scene: Scene,
}

/// Entity categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Score pickup
    Bit,
    /// Ends the run unless shielded
    Obstacle,
    /// Grants a temporary shield
    PowerUp,
}

impl EntityKind {
    /// Collision box half extents
    pub fn half_extents(self) -> Vec2 {
        match self {
            EntityKind::Bit => Vec2::new(8.0, 8.0),
            EntityKind::Obstacle => Vec2::new(24.0, 36.0),
            EntityKind::PowerUp => Vec2::new(10.0, 10.0),
        }
    }

    /// Sprite tint applied at spawn
    pub fn tint(self) -> Option<u32> {
        match self {
            EntityKind::PowerUp => Some(POWER_UP_TINT),
            _ => None,
        }
    }
}

/// A transient entity scrolling toward the player
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Gravity applies (comes to rest on the ground)
    pub falls: bool,
    pub tint: Option<u32>,
}

impl Entity {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.kind.half_extents())
    }
}

/// The auto-running player
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Resting on the ground after the last physics step
    pub touching_ground: bool,
    /// Descend key held
    pub descending: bool,
    /// Visible marker (green while shielded)
    pub tint: Option<u32>,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec2::new(PLAYER_X, PLAYER_START_Y),
            vel: Vec2::ZERO,
            touching_ground: false,
            descending: false,
            tint: None,
        }
    }
}

impl Player {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, Vec2::new(PLAYER_HALF_WIDTH, PLAYER_HALF_HEIGHT))
    }
}

/// One-shot sounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sound {
    Jump,
    Hit,
    Collect,
    ShieldUp,
    ShieldDown,
}

/// Audio requests produced by the simulation, drained by the front end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCue {
    StartMusic,
    StopMusic,
    Play(Sound),
}

/// Events handled in order during a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Pointer press or activation key
    Activate,
    /// Player overlaps a bit
    BitOverlap { id: u32 },
    /// Player overlaps a power-up
    PowerUpOverlap { id: u32 },
    /// Player collides with an obstacle
    ObstacleCollision { id: u32 },
    /// A timer came due
    Timer { id: TimerId, action: TimerAction },
}

impl GameEvent {
    /// Contact event for an entity of the given kind
    pub fn contact(kind: EntityKind, id: u32) -> Self {
        match kind {
            EntityKind::Bit => GameEvent::BitOverlap { id },
            EntityKind::Obstacle => GameEvent::ObstacleCollision { id },
            EntityKind::PowerUp => GameEvent::PowerUpOverlap { id },
        }
    }
}

/// Complete game state (deterministic for a given seed and input sequence)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    /// Balance table, fixed for the lifetime of the state
    pub tuning: Tuning,
    pub session: Session,
    /// Simulation clock (microseconds of Playing time)
    pub time_us: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub player: Player,
    /// Live entities (sorted by id)
    pub entities: Vec<Entity>,
    pub timers: Timers,
    /// Pending shield expiry, if any
    pub shield_timer: Option<TimerId>,
    /// Events waiting for the current step's drain
    pub events: VecDeque<GameEvent>,
    /// Audio cues not yet consumed by the front end
    pub audio: Vec<AudioCue>,
    /// Background scroll offset
    pub scroll_x: f32,
    next_id: u32,
}

impl GameState {
    /// Create a new game state with the given seed and default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            session: Session::default(),
            time_us: 0,
            time_ticks: 0,
            player: Player::default(),
            entities: Vec::new(),
            timers: Timers::default(),
            shield_timer: None,
            events: VecDeque::new(),
            audio: Vec::new(),
            scroll_x: 0.0,
            next_id: 1,
        }
    }

    pub fn scene(&self) -> Scene {
        self.session.scene
    }

    pub fn rng_mut(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add an entity unless the pool is full
    pub fn spawn_entity(
        &mut self,
        kind: EntityKind,
        pos: Vec2,
        velocity_x: f32,
        falls: bool,
    ) -> Option<u32> {
        if self.entities.len() >= self.tuning.max_entities {
            log::debug!("Entity cap reached, dropping {:?} spawn", kind);
            return None;
        }
        let id = self.next_entity_id();
        self.entities.push(Entity {
            id,
            kind,
            pos,
            vel: Vec2::new(velocity_x, 0.0),
            falls,
            tint: kind.tint(),
        });
        Some(id)
    }

    /// Remove a live entity. Returns false if it was already gone.
    pub fn destroy_entity(&mut self, id: u32) -> bool {
        match self.entities.iter().position(|e| e.id == id) {
            Some(index) => {
                self.entities.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn entity(&self, id: u32) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push_back(event);
    }

    /// Take all pending audio cues
    pub fn take_audio(&mut self) -> Vec<AudioCue> {
        std::mem::take(&mut self.audio)
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.entities.sort_by_key(|e| e.id);
    }
}
