//! Timed entity spawning
//!
//! Each spawn rule gets a repeating timer when a run starts. When it fires,
//! one entity appears past the right edge with the rule's velocity; the
//! physics host does the rest.

use glam::Vec2;

use super::state::GameState;
use super::timer::TimerAction;
use crate::consts::SPAWN_X;
use crate::ms_to_us;

/// Schedule one repeating timer per spawn rule
pub fn start(state: &mut GameState) {
    let now = state.time_us;
    for (rule, spawn_rule) in state.tuning.spawn_rules.iter().enumerate() {
        state
            .timers
            .every(now, ms_to_us(spawn_rule.interval_ms), TimerAction::Spawn { rule });
    }
}

/// Spawn one entity for the rule at `rule`. Returns the new entity id, or
/// `None` if the rule does not exist, its height cannot be sampled or the
/// pool is full.
pub fn spawn(state: &mut GameState, rule: usize) -> Option<u32> {
    let spawn_rule = *state.tuning.spawn_rules.get(rule)?;
    let Some(y) = spawn_rule.spawn_y.sample(state.rng_mut()) else {
        log::debug!(
            "Dropping {:?} spawn: bad spawn_y {:?}",
            spawn_rule.kind,
            spawn_rule.spawn_y
        );
        return None;
    };
    let id = state.spawn_entity(
        spawn_rule.kind,
        Vec2::new(SPAWN_X, y),
        spawn_rule.velocity_x,
        spawn_rule.falls,
    )?;
    log::debug!("Spawned {:?} #{} at y={:.0}", spawn_rule.kind, id, y);
    Some(id)
}
