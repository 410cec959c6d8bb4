//! Geometry helpers for circles and axis-aligned boxes
//!
//! Screen orientation: `top` is the smaller y of a box.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned box stored as center + half extents
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub center: Vec2,
    pub half: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, half: Vec2) -> Self {
        Self { center, half }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.center.x - self.half.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.center.x + self.half.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.center.y - self.half.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.center.y + self.half.y
    }

    /// Inclusive point containment
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// Region a circle center of radius `r` must enter to touch this box.
    ///
    /// Grown by `r` on the left, right and top only: anything reaching the
    /// underside has already been stopped by the floor.
    pub fn contact_zone(&self, r: f32) -> Aabb {
        let left = self.left() - r;
        let right = self.right() + r;
        let top = self.top() - r;
        let bottom = self.bottom();
        Aabb::new(
            Vec2::new((left + right) * 0.5, (top + bottom) * 0.5),
            Vec2::new((right - left) * 0.5, (bottom - top) * 0.5),
        )
    }

    /// Whether the horizontal extents of a circle at `x` overlap this box
    pub fn spans_x(&self, x: f32, r: f32) -> bool {
        x + r >= self.left() && x - r <= self.right()
    }
}

/// Strict circle-circle overlap
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance(b) < ra + rb
}

/// Strict circle-box overlap using the closest point on the box
pub fn circle_aabb_overlap(c: Vec2, r: f32, aabb: &Aabb) -> bool {
    let closest = Vec2::new(
        c.x.clamp(aabb.left(), aabb.right()),
        c.y.clamp(aabb.top(), aabb.bottom()),
    );
    c.distance_squared(closest) < r * r
}

/// Direction angle of a vector (radians, screen orientation)
#[inline]
pub fn heading(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

/// Pull `point` onto the circle of radius `max` around `origin` if it lies outside
pub fn clamp_to_radius(origin: Vec2, point: Vec2, max: f32) -> Vec2 {
    let offset = point - origin;
    let dist = offset.length();
    if dist > max {
        let angle = heading(offset);
        origin + Vec2::new(angle.cos(), angle.sin()) * max
    } else {
        point
    }
}
