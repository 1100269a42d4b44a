//! Axis-aligned bounding boxes
//!
//! Screen coordinates: x grows right, y grows down. `pos` is the top-left corner.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Strict overlap test: boxes that only touch along an edge do not overlap
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Grow the box by `dx` on each horizontal side and `dy` on each vertical side
    pub fn expanded(&self, dx: f32, dy: f32) -> Aabb {
        Aabb {
            pos: self.pos - Vec2::new(dx, dy),
            size: self.size + Vec2::new(dx * 2.0, dy * 2.0),
        }
    }

    /// True when every component is finite and position/size are non-negative
    pub fn is_valid(&self) -> bool {
        self.pos.is_finite()
            && self.size.is_finite()
            && self.pos.x >= 0.0
            && self.pos.y >= 0.0
            && self.size.x >= 0.0
            && self.size.y >= 0.0
    }
}

/// Position correction for a box moving along x that overlaps `solid`.
///
/// Returns the corrected x, or `None` when the velocity sign gives no side.
pub fn resolve_x(mover: &Aabb, solid: &Aabb, vx: f32) -> Option<f32> {
    if vx > 0.0 {
        Some(solid.left() - mover.size.x)
    } else if vx < 0.0 {
        Some(solid.right())
    } else {
        None
    }
}

/// Which face a vertical resolution pushed the mover out of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalContact {
    /// Landed on top (grounding contact)
    Top,
    /// Bumped the underside
    Bottom,
}

/// Position correction for a box moving along y that overlaps `solid`
pub fn resolve_y(mover: &Aabb, solid: &Aabb, vy: f32) -> Option<(f32, VerticalContact)> {
    if vy > 0.0 {
        Some((solid.top() - mover.size.y, VerticalContact::Top))
    } else if vy < 0.0 {
        Some((solid.bottom(), VerticalContact::Bottom))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_and_touching() {
        let a = Aabb::new(0.0, 0.0, 10.0, 10.0);
        let b = Aabb::new(5.0, 5.0, 10.0, 10.0);
        let touching = Aabb::new(10.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&touching));
    }

    #[test]
    fn test_expanded_keeps_center() {
        let a = Aabb::new(10.0, 10.0, 4.0, 4.0);
        let grown = a.expanded(3.0, 1.0);
        assert_eq!(grown.center(), a.center());
        assert_eq!(grown.size, Vec2::new(10.0, 6.0));
    }

    #[test]
    fn test_validity() {
        assert!(Aabb::new(0.0, 0.0, 1.0, 1.0).is_valid());
        assert!(!Aabb::new(f32::NAN, 0.0, 1.0, 1.0).is_valid());
        assert!(!Aabb::new(0.0, -5.0, 1.0, 1.0).is_valid());
        assert!(!Aabb::new(0.0, 0.0, f32::INFINITY, 1.0).is_valid());
    }

    #[test]
    fn test_resolve_by_velocity_sign() {
        let solid = Aabb::new(100.0, 100.0, 50.0, 20.0);
        let mover = Aabb::new(90.0, 95.0, 20.0, 20.0);

        assert_eq!(resolve_x(&mover, &solid, 2.0), Some(80.0));
        assert_eq!(resolve_x(&mover, &solid, -2.0), Some(150.0));
        assert_eq!(resolve_x(&mover, &solid, 0.0), None);

        assert_eq!(resolve_y(&mover, &solid, 3.0), Some((80.0, VerticalContact::Top)));
        assert_eq!(resolve_y(&mover, &solid, -3.0), Some((120.0, VerticalContact::Bottom)));
    }
}
