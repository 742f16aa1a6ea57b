//! Per-frame score and entity lifecycle

use super::state::{Entity, GameState};
use crate::consts::{DESPAWN_X, SCROLL_PER_FRAME};

/// Once per Playing frame: distance score, background scroll, off-screen sweep
pub fn frame(state: &mut GameState) {
    state.session.score = state.session.score.saturating_add(state.tuning.frame_points);
    state.scroll_x += SCROLL_PER_FRAME;
    sweep(&mut state.entities);
}

/// Destroy entities that scrolled past the left edge. Returns how many.
pub fn sweep(entities: &mut Vec<Entity>) -> usize {
    let before = entities.len();
    entities.retain(|e| e.pos.x >= DESPAWN_X);
    before - entities.len()
}
