#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Monster Kong adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use monster_kong_core::{Aabb, SpriteKey};
use std::time::Duration;
use thiserror::Error;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the same color with its alpha channel replaced.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }

    /// Flat color standing in for the texture of `key`.
    #[must_use]
    pub const fn for_sprite(key: SpriteKey) -> Self {
        match key {
            SpriteKey::Ground => Self::from_rgb_u8(0x6b, 0x4a, 0x2b),
            SpriteKey::Platform => Self::from_rgb_u8(0xc4, 0x3d, 0x2f),
            SpriteKey::Block => Self::from_rgb_u8(0x8d, 0x8d, 0x8d),
            SpriteKey::Goal => Self::from_rgb_u8(0x5b, 0x3a, 0x1e),
            SpriteKey::Barrel => Self::from_rgb_u8(0xa8, 0x6a, 0x32),
            SpriteKey::Player => Self::from_rgb_u8(0x2f, 0x6f, 0xd8),
            SpriteKey::Fire => Self::from_rgb_u8(0xff, 0x9f, 0x1c),
        }
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Left arrow held.
    pub left: bool,
    /// Right arrow held.
    pub right: bool,
    /// Up arrow held.
    pub up: bool,
    /// Space bar held.
    pub space: bool,
    /// Whether the adapter detected a request to close the game this frame.
    pub quit: bool,
}

/// Single sprite drawn in world space, anchored at its top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneSprite {
    /// Texture the sprite is cut from.
    pub key: SpriteKey,
    /// Top-left corner in world units.
    pub position: Vec2,
    /// Size of one frame in world units.
    pub size: Vec2,
    /// Spritesheet frame to show.
    pub frame: u8,
    /// Whether the sprite is mirrored horizontally.
    pub flip_x: bool,
    /// Number of times the frame repeats to the right.
    pub tiles: u32,
}

impl SceneSprite {
    /// Creates an unflipped single-tile sprite showing frame 0.
    #[must_use]
    pub fn new(key: SpriteKey, position: Vec2) -> Self {
        Self {
            key,
            position,
            size: key.frame_size(),
            frame: 0,
            flip_x: false,
            tiles: 1,
        }
    }

    /// Centers the sprite on `center` instead of anchoring it at its corner.
    #[must_use]
    pub fn centered(key: SpriteKey, center: Vec2) -> Self {
        Self::new(key, center - key.frame_size() * 0.5)
    }

    /// Shows the provided spritesheet frame.
    #[must_use]
    pub fn with_frame(mut self, frame: u8) -> Self {
        self.frame = frame;
        self
    }

    /// Mirrors the sprite horizontally.
    #[must_use]
    pub fn with_flip_x(mut self, flip_x: bool) -> Self {
        self.flip_x = flip_x;
        self
    }

    /// Repeats the frame `tiles` times to the right.
    #[must_use]
    pub fn with_tiles(mut self, tiles: u32) -> Self {
        self.tiles = tiles;
        self
    }

    /// Area covered by every tile of the sprite.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_min_size(
            self.position,
            Vec2::new(self.size.x * self.tiles as f32, self.size.y),
        )
    }
}

/// Viewport that follows a target while staying inside the world bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    viewport: Vec2,
    offset: Vec2,
}

impl Camera {
    /// Creates a camera with the provided logical viewport size.
    pub fn new(viewport: Vec2) -> Result<Self, RenderingError> {
        let valid = viewport.x.is_finite()
            && viewport.y.is_finite()
            && viewport.x > 0.0
            && viewport.y > 0.0;
        if !valid {
            return Err(RenderingError::InvalidViewport {
                width: viewport.x,
                height: viewport.y,
            });
        }

        Ok(Self {
            viewport,
            offset: Vec2::ZERO,
        })
    }

    /// Logical viewport size.
    #[must_use]
    pub const fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// World position of the viewport's top-left corner.
    #[must_use]
    pub const fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Centers the viewport on `target`, clamped so it never leaves the world.
    ///
    /// A world smaller than the viewport along an axis pins that axis to 0.
    pub fn follow(&mut self, target: Vec2, world_size: Vec2) {
        let limit = (world_size - self.viewport).max(Vec2::ZERO);
        self.offset = (target - self.viewport * 0.5).clamp(Vec2::ZERO, limit);
    }

    /// Converts a world position into viewport coordinates.
    #[must_use]
    pub fn to_view(&self, world: Vec2) -> Vec2 {
        world - self.offset
    }
}

/// Scene description for one frame of the level.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Camera used to project world positions.
    pub camera: Camera,
    /// Sprites in draw order.
    pub sprites: Vec<SceneSprite>,
    /// Opacity of the black fade overlay in 0.0..=1.0.
    pub fade_alpha: f32,
    /// Collider outlines drawn when debugging is enabled.
    pub colliders: Vec<Aabb>,
}

impl Scene {
    /// Creates an empty scene viewed through `camera`.
    #[must_use]
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            sprites: Vec::new(),
            fade_alpha: 0.0,
            colliders: Vec::new(),
        }
    }

    /// Drops every sprite and outline, keeping the camera.
    pub fn clear(&mut self) {
        self.sprites.clear();
        self.colliders.clear();
        self.fade_alpha = 0.0;
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Monster Kong scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// keys held this frame, and rebuilds the scene before it is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, Error, PartialEq)]
pub enum RenderingError {
    /// The viewport must have positive, finite dimensions.
    #[error("viewport must be positive (received {width}x{height})")]
    InvalidViewport {
        /// Requested width.
        width: f32,
        /// Requested height.
        height: f32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(Vec2::new(360.0, 640.0)).expect("valid viewport")
    }

    #[test]
    fn camera_rejects_degenerate_viewport() {
        let error = Camera::new(Vec2::new(0.0, 640.0)).expect_err("zero width");
        assert_eq!(
            error,
            RenderingError::InvalidViewport {
                width: 0.0,
                height: 640.0
            }
        );
        assert_eq!(
            error.to_string(),
            "viewport must be positive (received 0x640)"
        );
    }

    #[test]
    fn camera_follows_target_inside_tall_world() {
        let mut camera = camera();
        camera.follow(Vec2::new(100.0, 500.0), Vec2::new(360.0, 1_000.0));
        assert_eq!(camera.offset(), Vec2::new(0.0, 180.0));
        assert_eq!(camera.to_view(Vec2::new(100.0, 500.0)), Vec2::new(100.0, 320.0));
    }

    #[test]
    fn camera_is_clamped_to_world_bounds() {
        let mut camera = camera();
        let world = Vec2::new(360.0, 1_000.0);

        camera.follow(Vec2::new(10.0, 10.0), world);
        assert_eq!(camera.offset(), Vec2::ZERO);

        camera.follow(Vec2::new(350.0, 990.0), world);
        assert_eq!(camera.offset(), Vec2::new(0.0, 360.0));
    }

    #[test]
    fn small_world_pins_camera() {
        let mut camera = camera();
        camera.follow(Vec2::new(100.0, 100.0), Vec2::new(200.0, 300.0));
        assert_eq!(camera.offset(), Vec2::ZERO);
    }

    #[test]
    fn centered_sprite_is_anchored_at_corner() {
        let sprite = SceneSprite::centered(SpriteKey::Goal, Vec2::new(300.0, 100.0));
        assert_eq!(sprite.position, Vec2::new(279.0, 75.0));
        assert_eq!(sprite.size, Vec2::new(42.0, 50.0));
    }

    #[test]
    fn tiled_sprite_bounds_cover_every_tile() {
        let sprite = SceneSprite::new(SpriteKey::Platform, Vec2::new(10.0, 20.0)).with_tiles(4);
        assert_eq!(sprite.bounds().size(), Vec2::new(144.0, 15.0));
    }

    #[test]
    fn clearing_scene_keeps_camera() {
        let mut scene = Scene::new(camera());
        scene.sprites.push(SceneSprite::new(SpriteKey::Fire, Vec2::ZERO));
        scene.fade_alpha = 0.5;
        scene.clear();

        assert!(scene.sprites.is_empty());
        assert_eq!(scene.fade_alpha, 0.0);
        assert_eq!(scene.camera, camera());
    }
}
