//! Arcade physics host
//!
//! Gravity, constant entity velocities, ground contact and box overlap
//! reporting. Contacts are reported, never resolved: the gameplay response
//! belongs to the collision resolver.

use glam::Vec2;

use super::state::{Entity, GameEvent, Player};
use crate::consts::*;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    pub half: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, half: Vec2) -> Self {
        Self { center, half }
    }

    pub fn min(&self) -> Vec2 {
        self.center - self.half
    }

    pub fn max(&self) -> Vec2 {
        self.center + self.half
    }

    /// Strict overlap (touching edges do not count)
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        a_min.x < b_max.x && b_min.x < a_max.x && a_min.y < b_max.y && b_min.y < a_max.y
    }
}

/// Start a jump if the player is on the ground
pub fn jump(player: &mut Player) -> bool {
    if !player.touching_ground {
        return false;
    }
    player.vel.y = JUMP_VELOCITY;
    player.touching_ground = false;
    true
}

/// Integrate the player: gravity, descend, ground and world bounds
pub fn step_player(player: &mut Player, dt: f32) {
    if player.descending && !player.touching_ground {
        player.vel.y = player.vel.y.max(DESCEND_VELOCITY);
    }

    player.vel.y += GRAVITY * dt;
    player.pos += player.vel * dt;

    // The runner never moves horizontally; the world scrolls past it
    player.pos.x = player.pos.x.clamp(PLAYER_HALF_WIDTH, WORLD_WIDTH - PLAYER_HALF_WIDTH);

    if player.pos.y - PLAYER_HALF_HEIGHT < 0.0 {
        player.pos.y = PLAYER_HALF_HEIGHT;
        player.vel.y = player.vel.y.max(0.0);
    }

    if player.pos.y + PLAYER_HALF_HEIGHT >= GROUND_Y {
        player.pos.y = GROUND_Y - PLAYER_HALF_HEIGHT;
        if player.vel.y > 0.0 {
            let bounced = -player.vel.y * PLAYER_BOUNCE;
            player.vel.y = if bounced.abs() < REST_SPEED { 0.0 } else { bounced };
        }
        player.touching_ground = true;
    } else {
        player.touching_ground = false;
    }
}

/// Move entities by their velocity; falling ones land on the ground
pub fn step_entities(entities: &mut [Entity], dt: f32) {
    for entity in entities.iter_mut() {
        if entity.falls {
            entity.vel.y += GRAVITY * dt;
        }
        entity.pos += entity.vel * dt;

        if entity.falls {
            let half_h = entity.kind.half_extents().y;
            if entity.pos.y + half_h >= GROUND_Y {
                entity.pos.y = GROUND_Y - half_h;
                entity.vel.y = 0.0;
            }
        }
    }
}

/// Report a contact event for every entity overlapping the player, in
/// entity order
pub fn detect_contacts(player: &Player, entities: &[Entity]) -> Vec<GameEvent> {
    let bounds = player.bounds();
    entities
        .iter()
        .filter(|e| bounds.overlaps(&e.bounds()))
        .map(|e| GameEvent::contact(e.kind, e.id))
        .collect()
}
