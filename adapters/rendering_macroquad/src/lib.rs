#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Monster Kong.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! Sprites are drawn as flat colored rectangles keyed by texture, so the
//! adapter runs without any image assets on disk.

use anyhow::Result;
use glam::Vec2;
use macroquad::input::{is_key_down, is_key_pressed, KeyCode};
use monster_kong_core::{Aabb, SpriteKey};
use monster_kong_rendering::{
    Color, FrameInput, Presentation, RenderingBackend, Scene, SceneSprite,
};
use std::time::Duration;

const COLLIDER_OUTLINE: Color = Color::new(0.0, 1.0, 0.3, 1.0);
const FADE_COLOR: Color = Color::new(0.0, 0.0, 0.0, 1.0);

/// Rendering backend implemented on top of macroquad.
#[derive(Clone, Copy, Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_colliders: bool,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether collider outlines are drawn over the sprites.
    #[must_use]
    pub fn with_collider_outlines(mut self, enabled: bool) -> Self {
        self.show_colliders = enabled;
        self
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_colliders,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let viewport = scene.camera.viewport();
        let mut config = macroquad::window::Conf {
            window_title,
            window_width: viewport.x.round() as i32,
            window_height: viewport.y.round() as i32,
            window_resizable: false,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut show_colliders = show_colliders;

            loop {
                let input = poll_frame_input();
                if input.quit {
                    break;
                }
                if is_key_pressed(KeyCode::F1) {
                    show_colliders = !show_colliders;
                }

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                update_scene(frame_dt, input, &mut scene);

                macroquad::window::clear_background(background);
                let layout = ViewLayout::fit(
                    scene.camera.viewport(),
                    Vec2::new(
                        macroquad::window::screen_width(),
                        macroquad::window::screen_height(),
                    ),
                );

                for sprite in &scene.sprites {
                    draw_sprite(sprite, &scene, &layout);
                }
                if show_colliders {
                    for collider in &scene.colliders {
                        draw_outline(collider, &scene, &layout);
                    }
                }
                if scene.fade_alpha > 0.0 {
                    let size = scene.camera.viewport() * layout.scale;
                    let overlay = FADE_COLOR.with_alpha(scene.fade_alpha.clamp(0.0, 1.0));
                    macroquad::shapes::draw_rectangle(
                        layout.origin.x,
                        layout.origin.y,
                        size.x,
                        size.y,
                        to_macroquad_color(overlay),
                    );
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn poll_frame_input() -> FrameInput {
    FrameInput {
        left: is_key_down(KeyCode::Left),
        right: is_key_down(KeyCode::Right),
        up: is_key_down(KeyCode::Up),
        space: is_key_down(KeyCode::Space),
        quit: is_key_pressed(KeyCode::Escape),
    }
}

/// Uniform scale and letterbox offset mapping the logical viewport onto the screen.
#[derive(Clone, Copy, Debug, PartialEq)]
struct ViewLayout {
    scale: f32,
    origin: Vec2,
}

impl ViewLayout {
    fn fit(viewport: Vec2, screen: Vec2) -> Self {
        let scale = (screen.x / viewport.x).min(screen.y / viewport.y).max(0.0);
        let origin = (screen - viewport * scale) * 0.5;
        Self { scale, origin }
    }

    fn project(&self, scene: &Scene, world: Vec2) -> Vec2 {
        self.origin + scene.camera.to_view(world) * self.scale
    }
}

fn draw_sprite(sprite: &SceneSprite, scene: &Scene, layout: &ViewLayout) {
    let color = sprite_tint(sprite);
    let size = sprite.size * layout.scale;
    for tile in 0..sprite.tiles {
        let corner = sprite.position + Vec2::new(sprite.size.x * tile as f32, 0.0);
        let screen = layout.project(scene, corner);
        macroquad::shapes::draw_rectangle(screen.x, screen.y, size.x, size.y, color);
    }

    // The spritesheet faces left, so the marker sits on the leading edge.
    if sprite.key == SpriteKey::Player {
        let edge = if sprite.flip_x { sprite.size.x * 0.8 } else { 0.0 };
        let screen = layout.project(scene, sprite.position + Vec2::new(edge, 0.0));
        macroquad::shapes::draw_rectangle(
            screen.x,
            screen.y + size.y * 0.2,
            size.x * 0.2,
            size.y * 0.3,
            to_macroquad_color(Color::new(1.0, 1.0, 1.0, 0.6)),
        );
    }
}

fn draw_outline(collider: &Aabb, scene: &Scene, layout: &ViewLayout) {
    let corner = layout.project(scene, collider.min());
    let size = collider.size() * layout.scale;
    macroquad::shapes::draw_rectangle_lines(
        corner.x,
        corner.y,
        size.x,
        size.y,
        1.0,
        to_macroquad_color(COLLIDER_OUTLINE),
    );
}

/// Flat color for a sprite, darkened slightly on odd frames so animations show.
fn sprite_tint(sprite: &SceneSprite) -> macroquad::color::Color {
    let base = Color::for_sprite(sprite.key);
    let shade = if sprite.frame % 2 == 1 { 0.8 } else { 1.0 };
    to_macroquad_color(Color::new(
        base.red * shade,
        base.green * shade,
        base.blue * shade,
        base.alpha,
    ))
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
