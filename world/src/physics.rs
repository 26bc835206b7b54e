//! Arcade-style body integration and separation against static platforms.
//!
//! There is no broad phase: the level holds a handful of platforms and every
//! moving body is checked against each of them.

use glam::Vec2;
use monster_kong_core::{Aabb, ContactFlags};

/// Slack allowed when deciding which face of a platform a body came from.
const CONTACT_TOLERANCE: f32 = 1e-3;

/// Dynamic axis-aligned body driven by velocity and gravity.
#[derive(Clone, Debug)]
pub(crate) struct Body {
    min: Vec2,
    previous_min: Vec2,
    size: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) enabled: bool,
    bounce: Vec2,
    collide_world_bounds: bool,
    contact: ContactFlags,
}

impl Body {
    /// Creates an enabled body centered on the provided point.
    pub(crate) fn dynamic(center: Vec2, size: Vec2) -> Self {
        let min = center - size * 0.5;
        Self {
            min,
            previous_min: min,
            size,
            velocity: Vec2::ZERO,
            enabled: true,
            bounce: Vec2::ZERO,
            collide_world_bounds: false,
            contact: ContactFlags::default(),
        }
    }

    pub(crate) fn with_bounce(mut self, bounce: Vec2) -> Self {
        self.bounce = bounce;
        self
    }

    pub(crate) fn with_world_bounds(mut self) -> Self {
        self.collide_world_bounds = true;
        self
    }

    pub(crate) fn aabb(&self) -> Aabb {
        Aabb::from_min_size(self.min, self.size)
    }

    pub(crate) fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    /// Moves the body without sweeping, clearing motion and contact state.
    pub(crate) fn reset_at(&mut self, center: Vec2) {
        self.min = center - self.size * 0.5;
        self.previous_min = self.min;
        self.velocity = Vec2::ZERO;
        self.contact = ContactFlags::default();
    }

    pub(crate) fn contact(&self) -> ContactFlags {
        self.contact
    }

    /// Applies gravity and velocity for `dt` seconds, then clamps to the world bounds.
    pub(crate) fn integrate(&mut self, dt: f32, gravity: f32, world_size: Vec2) {
        self.contact = ContactFlags::default();
        if !self.enabled {
            return;
        }

        self.previous_min = self.min;
        self.velocity.y += gravity * dt;
        self.min += self.velocity * dt;

        if self.collide_world_bounds {
            self.clamp_to_world(world_size);
        }
    }

    fn clamp_to_world(&mut self, world_size: Vec2) {
        let limit = world_size - self.size;

        if self.min.x < 0.0 {
            self.min.x = 0.0;
            self.velocity.x = self.velocity.x.abs() * self.bounce.x;
        } else if self.min.x > limit.x {
            self.min.x = limit.x;
            self.velocity.x = -self.velocity.x.abs() * self.bounce.x;
        }

        if self.min.y < 0.0 {
            self.min.y = 0.0;
            self.velocity.y = self.velocity.y.abs() * self.bounce.y;
        } else if self.min.y > limit.y {
            self.min.y = limit.y;
            self.velocity.y = -self.velocity.y.abs() * self.bounce.y;
            self.contact.blocked_down = true;
        }
    }

    /// Pushes the body out of a static solid it overlaps.
    pub(crate) fn separate_from(&mut self, solid: &Aabb) {
        if !self.enabled || !self.aabb().intersects(solid) {
            return;
        }

        match self.entry_face(solid) {
            Face::Top => {
                self.min.y = solid.min().y - self.size.y;
                self.velocity.y = -self.velocity.y.max(0.0) * self.bounce.y;
                self.contact.blocked_down = true;
                self.contact.touching_down = true;
            }
            Face::Bottom => {
                self.min.y = solid.max().y;
                self.velocity.y = -self.velocity.y.min(0.0) * self.bounce.y;
            }
            Face::Left => {
                self.min.x = solid.min().x - self.size.x;
                self.velocity.x = -self.velocity.x.max(0.0) * self.bounce.x;
            }
            Face::Right => {
                self.min.x = solid.max().x;
                self.velocity.x = -self.velocity.x.min(0.0) * self.bounce.x;
            }
        }
    }

    /// Face of `solid` the body crossed during the last integration.
    fn entry_face(&self, solid: &Aabb) -> Face {
        let previous_max = self.previous_min + self.size;
        if previous_max.y <= solid.min().y + CONTACT_TOLERANCE {
            return Face::Top;
        }
        if self.previous_min.y >= solid.max().y - CONTACT_TOLERANCE {
            return Face::Bottom;
        }
        if previous_max.x <= solid.min().x + CONTACT_TOLERANCE {
            return Face::Left;
        }
        if self.previous_min.x >= solid.max().x - CONTACT_TOLERANCE {
            return Face::Right;
        }

        // Already overlapping before the step: leave through the shallowest face.
        let body = self.aabb();
        let candidates = [
            (Face::Top, body.max().y - solid.min().y),
            (Face::Bottom, solid.max().y - body.min().y),
            (Face::Left, body.max().x - solid.min().x),
            (Face::Right, solid.max().x - body.min().x),
        ];
        candidates
            .into_iter()
            .fold((Face::Top, f32::INFINITY), |best, candidate| {
                if candidate.1 < best.1 {
                    candidate
                } else {
                    best
                }
            })
            .0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Face {
    Top,
    Bottom,
    Left,
    Right,
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORLD: Vec2 = Vec2::new(360.0, 640.0);
    const DT: f32 = 0.1;

    fn floor() -> Aabb {
        Aabb::from_min_size(Vec2::new(0.0, 125.0), Vec2::new(360.0, 30.0))
    }

    #[test]
    fn falling_body_lands_on_platform() {
        let mut body = Body::dynamic(Vec2::new(300.0, 100.0), Vec2::new(42.0, 50.0));

        for _ in 0..5 {
            body.integrate(DT, 1000.0, WORLD);
            body.separate_from(&floor());
        }

        assert_eq!(body.center(), Vec2::new(300.0, 100.0));
        assert_eq!(body.velocity.y, 0.0);
        assert!(body.contact().blocked_down);
        assert!(body.contact().touching_down);
    }

    #[test]
    fn world_floor_blocks_without_touching() {
        let mut body =
            Body::dynamic(Vec2::new(100.0, 620.0), Vec2::new(28.0, 30.0)).with_world_bounds();

        body.integrate(DT, 1000.0, WORLD);

        assert_eq!(body.aabb().max().y, 640.0);
        assert!(body.contact().blocked_down);
        assert!(!body.contact().touching_down);
    }

    #[test]
    fn world_edges_reflect_bouncy_bodies() {
        let mut body = Body::dynamic(Vec2::new(15.0, 100.0), Vec2::new(20.0, 20.0))
            .with_bounce(Vec2::new(1.0, 0.1))
            .with_world_bounds();
        body.velocity.x = -100.0;

        body.integrate(DT, 0.0, WORLD);

        assert_eq!(body.aabb().min().x, 0.0);
        assert_eq!(body.velocity.x, 100.0);
    }

    #[test]
    fn rising_body_is_stopped_by_underside() {
        let ceiling = Aabb::from_min_size(Vec2::new(0.0, 0.0), Vec2::new(360.0, 30.0));
        let mut body = Body::dynamic(Vec2::new(100.0, 50.0), Vec2::new(28.0, 30.0));
        body.velocity.y = -600.0;

        body.integrate(DT, 1000.0, WORLD);
        body.separate_from(&ceiling);

        assert_eq!(body.aabb().min().y, 30.0);
        assert_eq!(body.velocity.y, 0.0);
        assert!(!body.contact().on_ground());
    }

    #[test]
    fn side_contact_stops_horizontal_motion() {
        let wall = Aabb::from_min_size(Vec2::new(200.0, 0.0), Vec2::new(36.0, 300.0));
        let mut body = Body::dynamic(Vec2::new(180.0, 100.0), Vec2::new(28.0, 30.0));
        body.velocity.x = 150.0;

        body.integrate(DT, 0.0, WORLD);
        body.separate_from(&wall);

        assert_eq!(body.aabb().max().x, 200.0);
        assert_eq!(body.velocity.x, 0.0);
    }

    #[test]
    fn disabled_body_neither_moves_nor_collides() {
        let mut body = Body::dynamic(Vec2::new(100.0, 130.0), Vec2::new(20.0, 20.0));
        body.enabled = false;
        body.velocity.x = 50.0;

        body.integrate(DT, 1000.0, WORLD);
        body.separate_from(&floor());

        assert_eq!(body.center(), Vec2::new(100.0, 130.0));
        assert!(!body.contact().on_ground());
    }
}
