//! Pixel Dash entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use serde::de::DeserializeOwned;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, KeyboardEvent, PointerEvent};

    use pixel_dash::audio::AudioManager;
    use pixel_dash::consts::*;
    use pixel_dash::renderer::CanvasRenderer;
    use pixel_dash::sim::{GameState, TickInput, tick};
    use pixel_dash::{Settings, Tuning};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        renderer: Option<CanvasRenderer>,
        audio: AudioManager,
        settings: Settings,
        accumulator: f32,
        last_time: f64,
        input: TickInput,
        /// Tab hidden: the clock stops
        suspended: bool,
    }

    impl Game {
        fn new(seed: u64, tuning: Tuning, settings: Settings) -> Self {
            let mut audio = AudioManager::new();
            audio.apply_settings(&settings);
            Self {
                state: GameState::with_tuning(seed, tuning),
                renderer: None,
                audio,
                settings,
                accumulator: 0.0,
                last_time: 0.0,
                input: TickInput::default(),
                suspended: false,
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            if self.suspended {
                return;
            }
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.input.clone();
                tick(&mut self.state, &input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.input.activate = false;
            }

            for cue in self.state.take_audio() {
                self.audio.play_cue(cue);
            }
        }

        /// Render the current frame
        fn render(&self) {
            if let Some(renderer) = &self.renderer {
                if let Err(e) = renderer.render(&self.state, &self.settings) {
                    log::warn!("Render error: {:?}", e);
                }
            }
        }

        fn set_suspended(&mut self, suspended: bool) {
            self.suspended = suspended;
            if suspended {
                if self.settings.mute_on_blur {
                    self.audio.suspend();
                }
            } else {
                // Don't count the hidden time as one huge frame
                self.last_time = 0.0;
                self.accumulator = 0.0;
                self.audio.resume();
            }
        }
    }

    /// Read an optional JSON config block embedded in the page
    fn load_json_config<T: DeserializeOwned + Default>(document: &Document, id: &str) -> T {
        let Some(text) = document.get_element_by_id(id).and_then(|el| el.text_content()) else {
            return T::default();
        };
        match serde_json::from_str(&text) {
            Ok(value) => {
                log::info!("Loaded #{} config", id);
                value
            }
            Err(e) => {
                log::warn!("Ignoring invalid #{} config: {}", id, e);
                T::default()
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Pixel Dash starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let tuning = load_json_config::<Tuning>(&document, "tuning").validated();
        let settings = load_json_config::<Settings>(&document, "settings");

        // Initialize game
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, tuning, settings)));
        log::info!("Game initialized with seed: {}", seed);

        match CanvasRenderer::new(canvas.clone()) {
            Some(renderer) => {
                let dpr = window.device_pixel_ratio();
                let width = (canvas.client_width() as f64 * dpr) as u32;
                let height = (canvas.client_height() as f64 * dpr) as u32;
                renderer.resize(width, height);
                game.borrow_mut().renderer = Some(renderer);
            }
            None => log::warn!("No 2D canvas context - rendering disabled"),
        }

        setup_input_handlers(&canvas, game.clone());
        setup_auto_suspend(game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Pixel Dash running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Pointer (mouse, touch, pen)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                g.audio.resume();
                g.input.activate = true;
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        let window = web_sys::window().unwrap();

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    " " | "Enter" if !event.repeat() => {
                        event.prevent_default();
                        g.audio.resume();
                        g.input.activate = true;
                    }
                    "ArrowDown" | "s" | "S" => g.input.descend = true,
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if matches!(event.key().as_str(), "ArrowDown" | "s" | "S") {
                    game.borrow_mut().input.descend = false;
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.render();
        }

        request_animation_frame(game);
    }

    fn setup_auto_suspend(game: Rc<RefCell<Game>>) {
        let document = web_sys::window().unwrap().document().unwrap();
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let hidden = document_clone.visibility_state() == web_sys::VisibilityState::Hidden;
            game.borrow_mut().set_suspended(hidden);
            log::info!("{}", if hidden { "Suspended (tab hidden)" } else { "Resumed" });
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Pixel Dash (native) starting...");
    log::info!("Native mode runs a headless demo - run with `trunk serve` for the web version");

    demo::run(2024);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless self-playing run
#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use pixel_dash::consts::*;
    use pixel_dash::sim::{AudioCue, EntityKind, GameState, Scene, Sound, TickInput, tick};

    /// Jump when an unshielded obstacle is this close ahead
    const LOOKAHEAD: f32 = 90.0;
    /// Give up after a minute of play
    const MAX_TICKS: u32 = 60 * 60;

    fn obstacle_ahead(state: &GameState) -> bool {
        let player_x = state.player.pos.x;
        state.entities.iter().any(|e| {
            e.kind == EntityKind::Obstacle && e.pos.x > player_x && e.pos.x - player_x < LOOKAHEAD
        })
    }

    pub fn run(seed: u64) {
        let mut state = GameState::new(seed);
        let mut bits = 0u32;
        let mut shields = 0u32;

        let start = TickInput {
            activate: true,
            ..Default::default()
        };
        tick(&mut state, &start, SIM_DT);

        let mut ticks = 0;
        while state.scene() == Scene::Playing && ticks < MAX_TICKS {
            let input = TickInput {
                activate: !state.session.shield_active && obstacle_ahead(&state),
                ..Default::default()
            };
            tick(&mut state, &input, SIM_DT);
            ticks += 1;

            for cue in state.take_audio() {
                match cue {
                    AudioCue::Play(Sound::Collect) => bits += 1,
                    AudioCue::Play(Sound::ShieldUp) => shields += 1,
                    _ => {}
                }
            }
        }

        let seconds = ticks as f32 * SIM_DT;
        match state.scene() {
            Scene::GameOver { score } => {
                println!(
                    "Crashed after {:.1}s: score {}, {} bits, {} shields",
                    seconds, score, bits, shields
                );
            }
            _ => {
                println!(
                    "Survived {:.1}s: score {}, {} bits, {} shields",
                    seconds, state.session.score, bits, shields
                );
            }
        }
    }
}
