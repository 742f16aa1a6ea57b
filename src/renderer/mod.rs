//! Canvas 2D rendering
//!
//! Draws the world in 800x600 world units, letterboxed into the canvas.
//! Everything is a primitive: rectangles, circles and text.

use std::f64::consts::TAU;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::consts::*;
use crate::settings::Settings;
use crate::sim::{EntityKind, GameState, Scene};

const SKY: &str = "#1b2440";
const SKYLINE: &str = "#2c3a63";
const GROUND: &str = "#3b2f2f";
const PLAYER: &str = "#f0c040";
const BIT: &str = "#3fa9ff";
const OBSTACLE: &str = "#8a8a8a";
const TEXT: &str = "#ffffff";
const GAME_OVER: &str = "#ff0000";

/// Skyline building spacing (world units)
const SKYLINE_PERIOD: f32 = 80.0;

fn css_color(tint: u32) -> String {
    format!("#{:06x}", tint & 0x00ff_ffff)
}

/// Canvas renderer
pub struct CanvasRenderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasRenderer {
    /// Returns `None` if the canvas has no 2D context
    pub fn new(canvas: HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()??
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(Self { canvas, ctx })
    }

    pub fn resize(&self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    /// Draw one frame
    pub fn render(&self, state: &GameState, settings: &Settings) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        let width = self.canvas.width() as f64;
        let height = self.canvas.height() as f64;

        ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
        ctx.set_fill_style_str("#000000");
        ctx.fill_rect(0.0, 0.0, width, height);

        // Letterbox the world into the canvas
        let scale = (width / WORLD_WIDTH as f64).min(height / WORLD_HEIGHT as f64);
        let offset_x = (width - WORLD_WIDTH as f64 * scale) / 2.0;
        let offset_y = (height - WORLD_HEIGHT as f64 * scale) / 2.0;
        ctx.set_transform(scale, 0.0, 0.0, scale, offset_x, offset_y)?;

        let scroll = if settings.reduced_motion { 0.0 } else { state.scroll_x };
        self.draw_background(scroll);

        match state.scene() {
            Scene::Menu => self.draw_menu()?,
            Scene::Playing => self.draw_playing(state)?,
            Scene::GameOver { score } => self.draw_game_over(score)?,
        }
        Ok(())
    }

    fn draw_background(&self, scroll: f32) {
        let ctx = &self.ctx;
        ctx.set_fill_style_str(SKY);
        ctx.fill_rect(0.0, 0.0, WORLD_WIDTH as f64, WORLD_HEIGHT as f64);

        // Repeating skyline scrolls with the run
        ctx.set_fill_style_str(SKYLINE);
        let shift = scroll % SKYLINE_PERIOD;
        let count = (WORLD_WIDTH / SKYLINE_PERIOD) as i32 + 2;
        for i in 0..count {
            let x = i as f32 * SKYLINE_PERIOD - shift;
            // Vary heights by building index in world space
            let index = ((scroll / SKYLINE_PERIOD) as i32 + i).rem_euclid(5);
            let top = 300.0 + index as f32 * 30.0;
            ctx.fill_rect(
                x as f64,
                top as f64,
                (SKYLINE_PERIOD - 12.0) as f64,
                (GROUND_Y - top) as f64,
            );
        }

        ctx.set_fill_style_str(GROUND);
        ctx.fill_rect(
            0.0,
            GROUND_Y as f64,
            WORLD_WIDTH as f64,
            (WORLD_HEIGHT - GROUND_Y) as f64,
        );
    }

    fn draw_playing(&self, state: &GameState) -> Result<(), JsValue> {
        let ctx = &self.ctx;

        for entity in &state.entities {
            let half = entity.kind.half_extents();
            let color = entity.tint.map(css_color);
            match entity.kind {
                EntityKind::Obstacle => {
                    ctx.set_fill_style_str(color.as_deref().unwrap_or(OBSTACLE));
                    ctx.fill_rect(
                        (entity.pos.x - half.x) as f64,
                        (entity.pos.y - half.y) as f64,
                        (half.x * 2.0) as f64,
                        (half.y * 2.0) as f64,
                    );
                }
                EntityKind::Bit | EntityKind::PowerUp => {
                    ctx.set_fill_style_str(color.as_deref().unwrap_or(BIT));
                    ctx.begin_path();
                    ctx.arc(entity.pos.x as f64, entity.pos.y as f64, half.x as f64, 0.0, TAU)?;
                    ctx.fill();
                }
            }
        }

        let player = &state.player;
        let color = player.tint.map(css_color);
        ctx.set_fill_style_str(color.as_deref().unwrap_or(PLAYER));
        ctx.fill_rect(
            (player.pos.x - PLAYER_HALF_WIDTH) as f64,
            (player.pos.y - PLAYER_HALF_HEIGHT) as f64,
            (PLAYER_HALF_WIDTH * 2.0) as f64,
            (PLAYER_HALF_HEIGHT * 2.0) as f64,
        );

        // HUD
        ctx.set_fill_style_str(TEXT);
        ctx.set_font("32px monospace");
        ctx.set_text_align("left");
        ctx.set_text_baseline("top");
        ctx.fill_text(&format!("Score: {}", state.session.score), 16.0, 16.0)?;
        Ok(())
    }

    fn draw_menu(&self) -> Result<(), JsValue> {
        self.centered_text("Pixel Dash Pro", 200.0, 64, TEXT)?;
        self.centered_text("Tap to start", 300.0, 32, TEXT)
    }

    fn draw_game_over(&self, score: u64) -> Result<(), JsValue> {
        self.centered_text("Game Over", 200.0, 64, GAME_OVER)?;
        self.centered_text(&format!("Score: {}", score), 300.0, 32, TEXT)?;
        self.centered_text("Tap to restart", 400.0, 32, TEXT)
    }

    fn centered_text(&self, text: &str, y: f64, size: u32, color: &str) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        ctx.set_fill_style_str(color);
        ctx.set_font(&format!("{}px monospace", size));
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        ctx.fill_text(text, WORLD_WIDTH as f64 / 2.0, y)
    }
}
