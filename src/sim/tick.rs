//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically. Each step:
//! 1. queue the activation input
//! 2. (Playing only) advance the clock, queue due timers, step physics,
//!    queue contacts
//! 3. drain the event queue through the handlers
//! 4. (Playing only) score the frame and sweep off-screen entities

use super::collision;
use super::physics;
use super::scene::{self, SceneTrigger};
use super::spawner;
use super::state::{AudioCue, EntityKind, GameEvent, GameState, Scene, Sound};
use super::timer::{TimerAction, TimerId};
use super::tracker;
use crate::consts::SHIELD_TINT;
use crate::tuning::ShieldStacking;
use crate::{ms_to_us, secs_to_us};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer press / Space / Enter (one-shot)
    pub activate: bool,
    /// Descend key held
    pub descend: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.activate {
        state.push_event(GameEvent::Activate);
    }
    state.player.descending = input.descend;

    let was_playing = state.scene() == Scene::Playing;
    if was_playing {
        state.time_ticks += 1;
        state.time_us += secs_to_us(dt);

        for (id, action) in state.timers.fire_due(state.time_us) {
            state.push_event(GameEvent::Timer { id, action });
        }

        physics::step_player(&mut state.player, dt);
        physics::step_entities(&mut state.entities, dt);
        for contact in physics::detect_contacts(&state.player, &state.entities) {
            state.push_event(contact);
        }
    }

    while let Some(event) = state.events.pop_front() {
        handle_event(state, event);
    }

    // Only frames that started and ended in Playing score, so the GameOver
    // payload is the score at the moment of the hit
    if was_playing && state.scene() == Scene::Playing {
        tracker::frame(state);
    }

    // Ensure deterministic ordering
    state.normalize_order();
}

/// Dispatch one event for the current scene
pub fn handle_event(state: &mut GameState, event: GameEvent) {
    let playing = state.scene() == Scene::Playing;
    match event {
        GameEvent::Activate if playing => {
            if physics::jump(&mut state.player) {
                state.audio.push(AudioCue::Play(Sound::Jump));
            }
        }
        GameEvent::Activate => {
            scene::request(state, SceneTrigger::Activate);
        }
        _ if !playing => {
            log::trace!("Dropping {:?} outside Playing", event);
        }
        GameEvent::BitOverlap { id } => on_contact(state, id, EntityKind::Bit),
        GameEvent::PowerUpOverlap { id } => on_contact(state, id, EntityKind::PowerUp),
        GameEvent::ObstacleCollision { id } => on_contact(state, id, EntityKind::Obstacle),
        GameEvent::Timer {
            action: TimerAction::Spawn { rule },
            ..
        } => {
            spawner::spawn(state, rule);
        }
        GameEvent::Timer {
            id,
            action: TimerAction::ShieldExpire,
        } => expire_shield(state, id),
    }
}

fn on_contact(state: &mut GameState, id: u32, kind: EntityKind) {
    // Consumed earlier in this step
    if state.entity(id).is_none() {
        return;
    }

    let res = collision::resolve(state.session, kind, &state.tuning);
    state.session = res.session;

    if res.consume {
        state.destroy_entity(id);
        if kind == EntityKind::Bit {
            state.audio.push(AudioCue::Play(Sound::Collect));
        }
    }
    if res.shield_granted {
        grant_shield(state);
    }
    if res.run_over {
        scene::request(state, SceneTrigger::ObstacleHit);
    }
}

fn grant_shield(state: &mut GameState) {
    state.player.tint = Some(SHIELD_TINT);

    if state.tuning.shield_stacking == ShieldStacking::Restart {
        if let Some(previous) = state.shield_timer.take() {
            state.timers.cancel(previous);
        }
    }
    let delay = ms_to_us(state.tuning.shield_duration_ms);
    let id = state.timers.after(state.time_us, delay, TimerAction::ShieldExpire);
    state.shield_timer = Some(id);

    state.audio.push(AudioCue::Play(Sound::ShieldUp));
    log::debug!("Shield up until {}us", state.time_us + delay);
}

fn expire_shield(state: &mut GameState, id: TimerId) {
    if state.tuning.shield_stacking == ShieldStacking::Restart && state.shield_timer != Some(id) {
        return;
    }
    if state.shield_timer == Some(id) {
        state.shield_timer = None;
    }
    if !state.session.shield_active {
        return;
    }

    state.session = collision::expire_shield(state.session);
    state.player.tint = None;
    state.audio.push(AudioCue::Play(Sound::ShieldDown));
    log::debug!("Shield expired at {}us", state.time_us);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::tuning::Tuning;
    use glam::Vec2;
    use proptest::prelude::*;

    /// State with no spawn timers, so tests place every entity themselves
    fn quiet_state() -> GameState {
        GameState::with_tuning(
            7,
            Tuning {
                spawn_rules: Vec::new(),
                ..Default::default()
            },
        )
    }

    fn activate() -> TickInput {
        TickInput {
            activate: true,
            ..Default::default()
        }
    }

    fn step(state: &mut GameState) {
        tick(state, &TickInput::default(), SIM_DT);
    }

    fn run(state: &mut GameState, ticks: u32) {
        for _ in 0..ticks {
            step(state);
        }
    }

    /// Put a motionless entity right on top of the player
    fn place(state: &mut GameState, kind: EntityKind) -> u32 {
        let pos = state.player.pos;
        state.spawn_entity(kind, pos, 0.0, false).unwrap()
    }

    fn start(state: &mut GameState) {
        tick(state, &activate(), SIM_DT);
        assert_eq!(state.scene(), Scene::Playing);
        assert_eq!(state.session.score, 0);
    }

    #[test]
    fn test_menu_waits_for_activation() {
        let mut state = GameState::new(1);
        run(&mut state, 100);
        assert_eq!(state.scene(), Scene::Menu);
        assert_eq!(state.time_ticks, 0);
        assert_eq!(state.session.score, 0);

        tick(&mut state, &activate(), SIM_DT);
        assert_eq!(state.scene(), Scene::Playing);
        assert_eq!(state.take_audio(), vec![AudioCue::StartMusic]);
    }

    #[test]
    fn test_obstacle_lives_until_past_left_edge() {
        let mut state = quiet_state();
        start(&mut state);
        // Flies well above the runner, so it never touches the player
        let id = state
            .spawn_entity(EntityKind::Obstacle, Vec2::new(SPAWN_X, 100.0), -250.0, false)
            .unwrap();

        let mut last_x = SPAWN_X;
        let mut ticks = 0;
        loop {
            step(&mut state);
            ticks += 1;
            match state.entity(id) {
                Some(obstacle) => {
                    assert!(obstacle.pos.x >= DESPAWN_X);
                    assert!(obstacle.pos.x < last_x);
                    last_x = obstacle.pos.x;
                }
                None => {
                    // Swept on the first tick it crossed the edge
                    assert!(last_x - 250.0 * SIM_DT < DESPAWN_X);
                    break;
                }
            }
            assert!(ticks < 1000, "obstacle never swept");
        }

        // 850 units at 250/s
        assert!((204..=206).contains(&ticks));
        assert_eq!(state.scene(), Scene::Playing);
        assert!(state.entities.is_empty());
    }

    #[test]
    fn test_score_counts_frames() {
        let mut state = quiet_state();
        start(&mut state);
        run(&mut state, 120);
        assert_eq!(state.session.score, 120);
        assert_eq!(state.scroll_x, 120.0 * SCROLL_PER_FRAME);
    }

    #[test]
    fn test_collect_three_bits_then_crash() {
        let mut state = quiet_state();
        start(&mut state);

        let mut frames = 0;
        for _ in 0..3 {
            let id = place(&mut state, EntityKind::Bit);
            step(&mut state);
            frames += 1;
            assert!(state.entity(id).is_none(), "bit consumed");
            run(&mut state, 10);
            frames += 10;
        }
        assert_eq!(state.session.score, 30 + frames);

        let expected = state.session.score;
        place(&mut state, EntityKind::Obstacle);
        step(&mut state);

        assert_eq!(state.scene(), Scene::GameOver { score: expected });
        let audio = state.take_audio();
        assert_eq!(
            audio.iter().filter(|c| **c == AudioCue::Play(Sound::Collect)).count(),
            3
        );
        assert!(audio.ends_with(&[AudioCue::StopMusic, AudioCue::Play(Sound::Hit)]));
    }

    #[test]
    fn test_shield_absorbs_then_expires() {
        let mut state = quiet_state();
        start(&mut state);
        let dt_us = secs_to_us(SIM_DT);

        let power_up = place(&mut state, EntityKind::PowerUp);
        step(&mut state);
        let picked_at = state.time_us;
        assert!(state.entity(power_up).is_none());
        assert!(state.session.shield_active);
        assert_eq!(state.player.tint, Some(SHIELD_TINT));

        // Immediate collision is absorbed and the obstacle stays
        let obstacle = place(&mut state, EntityKind::Obstacle);
        step(&mut state);
        assert_eq!(state.scene(), Scene::Playing);
        assert!(state.entity(obstacle).is_some());
        state.destroy_entity(obstacle);

        // Last tick before expiry is still shielded
        while state.time_us + 2 * dt_us < picked_at + 5_000_000 {
            step(&mut state);
        }
        let obstacle = place(&mut state, EntityKind::Obstacle);
        step(&mut state);
        assert!(state.time_us < picked_at + 5_000_000);
        assert_eq!(state.scene(), Scene::Playing);
        state.destroy_entity(obstacle);

        // Wait out the shield (5001ms)
        while state.time_us < picked_at + 5_001_000 {
            step(&mut state);
        }
        assert!(!state.session.shield_active);
        assert_eq!(state.player.tint, None);

        let score = state.session.score;
        place(&mut state, EntityKind::Obstacle);
        step(&mut state);
        assert_eq!(state.scene(), Scene::GameOver { score });
    }

    #[test]
    fn test_shield_restart_on_recollect() {
        let mut state = quiet_state();
        start(&mut state);

        place(&mut state, EntityKind::PowerUp);
        step(&mut state);
        let first = state.time_us;

        // Second pickup three seconds later restarts the five seconds
        while state.time_us < first + 3_000_000 {
            step(&mut state);
        }
        place(&mut state, EntityKind::PowerUp);
        step(&mut state);
        let second = state.time_us;

        while state.time_us < first + 6_000_000 {
            step(&mut state);
        }
        assert!(state.session.shield_active, "second pickup extends the shield");
        assert_eq!(state.timers.len(), 1);

        while state.time_us < second + 5_000_000 {
            step(&mut state);
        }
        assert!(!state.session.shield_active);
        assert!(state.shield_timer.is_none());
    }

    #[test]
    fn test_shield_independent_expiry() {
        let mut state = GameState::with_tuning(
            7,
            Tuning {
                spawn_rules: Vec::new(),
                shield_stacking: ShieldStacking::Independent,
                ..Default::default()
            },
        );
        start(&mut state);

        place(&mut state, EntityKind::PowerUp);
        step(&mut state);
        let first = state.time_us;

        while state.time_us < first + 3_000_000 {
            step(&mut state);
        }
        place(&mut state, EntityKind::PowerUp);
        step(&mut state);
        assert_eq!(state.timers.len(), 2);

        // The first pickup's timer ends the shield early
        while state.time_us < first + 5_000_000 {
            step(&mut state);
        }
        assert!(!state.session.shield_active);
        assert_eq!(state.timers.len(), 1);
    }

    #[test]
    fn test_game_over_to_menu_to_playing() {
        let mut state = quiet_state();
        start(&mut state);
        run(&mut state, 30);
        place(&mut state, EntityKind::Obstacle);
        step(&mut state);
        assert!(matches!(state.scene(), Scene::GameOver { score: 30 }));

        // Frozen while in GameOver
        let ticks = state.time_ticks;
        run(&mut state, 50);
        assert_eq!(state.time_ticks, ticks);
        assert!(state.timers.is_empty());
        assert!(state.events.is_empty());

        tick(&mut state, &activate(), SIM_DT);
        assert_eq!(state.scene(), Scene::Menu);

        tick(&mut state, &activate(), SIM_DT);
        assert_eq!(state.scene(), Scene::Playing);
        assert_eq!(state.session.score, 0);
        assert!(state.entities.is_empty());
    }

    #[test]
    fn test_activate_while_playing_jumps() {
        let mut state = quiet_state();
        start(&mut state);
        state.take_audio();

        // Let the player land
        run(&mut state, 90);
        assert!(state.player.touching_ground);

        tick(&mut state, &activate(), SIM_DT);
        assert_eq!(state.scene(), Scene::Playing);
        assert!(state.player.vel.y < 0.0);
        assert_eq!(state.take_audio(), vec![AudioCue::Play(Sound::Jump)]);

        // Mid-air activation does nothing
        tick(&mut state, &activate(), SIM_DT);
        assert!(state.take_audio().is_empty());
    }

    #[test]
    fn test_descend_input_reaches_player() {
        let mut state = quiet_state();
        start(&mut state);
        tick(
            &mut state,
            &TickInput {
                descend: true,
                ..Default::default()
            },
            SIM_DT,
        );
        assert!(state.player.descending);
        step(&mut state);
        assert!(!state.player.descending);
    }

    #[test]
    fn test_spawners_run_while_playing() {
        let mut state = GameState::new(99);
        start(&mut state);
        // First bit spawns on tick 60 and moves on tick 61
        run(&mut state, 61);

        let bits = state.entities.iter().filter(|e| e.kind == EntityKind::Bit).count();
        assert_eq!(bits, 1);
        assert!(state.entities.iter().all(|e| e.pos.x < SPAWN_X));

        run(&mut state, 60);
        assert!(state.entities.iter().any(|e| e.kind == EntityKind::Obstacle));
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut state1 = GameState::new(12345);
        let mut state2 = GameState::new(12345);

        for i in 0..900 {
            let input = TickInput {
                activate: i % 45 == 0,
                descend: i % 7 == 0,
            };
            tick(&mut state1, &input, SIM_DT);
            tick(&mut state2, &input, SIM_DT);
        }

        assert_eq!(state1.scene(), state2.scene());
        assert_eq!(state1.session, state2.session);
        assert_eq!(state1.entities, state2.entities);
        assert_eq!(state1.player, state2.player);
    }

    fn is_legal_edge(from: Scene, to: Scene) -> bool {
        matches!(
            (from, to),
            (Scene::Menu, Scene::Playing)
                | (Scene::Playing, Scene::GameOver { .. })
                | (Scene::GameOver { .. }, Scene::Menu)
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_run_invariants(
            seed in any::<u64>(),
            inputs in prop::collection::vec((prop::bool::weighted(0.04), prop::bool::weighted(0.1)), 1..1500),
        ) {
            let mut state = GameState::new(seed);
            let mut collected = 0u64;

            for (activate, descend) in inputs {
                let before = state.scene();
                let score_before = state.session.score;

                tick(&mut state, &TickInput { activate, descend }, SIM_DT);
                let after = state.scene();

                if before != after {
                    prop_assert!(is_legal_edge(before, after), "{:?} -> {:?}", before, after);
                }
                if after == Scene::Playing && before != Scene::Playing {
                    collected = 0;
                }
                collected += state
                    .take_audio()
                    .iter()
                    .filter(|c| **c == AudioCue::Play(Sound::Collect))
                    .count() as u64;

                if before == Scene::Playing && after == Scene::Playing {
                    prop_assert!(state.session.score > score_before);
                    prop_assert!(state.session.score >= 10 * collected);
                }
                if let Scene::GameOver { score } = after {
                    prop_assert!(score >= 10 * collected);
                }
                prop_assert!(state.entities.iter().all(|e| e.pos.x >= DESPAWN_X));
                prop_assert!(state.entities.len() <= state.tuning.max_entities);
            }
        }

        #[test]
        fn prop_shield_window(gap_ticks in 0u32..600) {
            let mut state = quiet_state();
            start(&mut state);

            place(&mut state, EntityKind::PowerUp);
            step(&mut state);
            let picked_at = state.time_us;

            run(&mut state, gap_ticks);
            place(&mut state, EntityKind::Obstacle);
            step(&mut state);

            let elapsed = state.time_us - picked_at;
            let over = matches!(state.scene(), Scene::GameOver { .. });
            prop_assert_eq!(over, elapsed >= 5_000_000, "elapsed {}us", elapsed);
        }
    }
}
