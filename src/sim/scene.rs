//! Scene controller
//!
//! Three scenes, three edges:
//! - Menu --activate--> Playing
//! - Playing --unshielded obstacle hit--> GameOver { score }
//! - GameOver --activate--> Menu
//!
//! Any other request is ignored.

use super::spawner;
use super::state::{AudioCue, GameState, Player, Scene, Session, Sound};

/// Inputs that may move the scene machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneTrigger {
    /// Pointer press or activation key
    Activate,
    /// Player hit an obstacle
    ObstacleHit,
}

/// Transition table. `None` means the trigger is ignored in this scene.
pub fn next_scene(session: &Session, trigger: SceneTrigger) -> Option<Scene> {
    match (session.scene, trigger) {
        (Scene::Menu, SceneTrigger::Activate) => Some(Scene::Playing),
        (Scene::Playing, SceneTrigger::ObstacleHit) if !session.shield_active => {
            Some(Scene::GameOver {
                score: session.score,
            })
        }
        (Scene::GameOver { .. }, SceneTrigger::Activate) => Some(Scene::Menu),
        _ => None,
    }
}

/// Apply a trigger to the game. Returns true if the scene changed.
pub fn request(state: &mut GameState, trigger: SceneTrigger) -> bool {
    match next_scene(&state.session, trigger) {
        Some(next) => {
            enter(state, next);
            true
        }
        None => {
            log::trace!("Ignoring {:?} in {:?}", trigger, state.session.scene);
            false
        }
    }
}

/// Run exit effects of the current scene and entry effects of `next`
fn enter(state: &mut GameState, next: Scene) {
    let previous = state.session.scene;
    log::info!("Scene {:?} -> {:?}", previous, next);

    if previous == Scene::Playing {
        // Nothing from the finished run may fire later
        state.timers.clear();
        state.shield_timer = None;
        state.events.clear();
    }

    match next {
        Scene::Menu => {
            state.session = Session::default();
        }
        Scene::Playing => {
            state.session = Session {
                scene: Scene::Playing,
                ..Session::default()
            };
            state.entities.clear();
            state.player = Player::default();
            state.scroll_x = 0.0;
            state.timers.clear();
            state.shield_timer = None;
            spawner::start(state);
            state.audio.push(AudioCue::StartMusic);
            log::info!("Run started (seed {})", state.seed);
        }
        Scene::GameOver { score } => {
            state.session.scene = next;
            state.player.tint = None;
            state.audio.push(AudioCue::StopMusic);
            state.audio.push(AudioCue::Play(Sound::Hit));
            log::info!("Game over with score {}", score);
        }
    }
}
