//! Boundary shapes for overlap and containment tests
//!
//! A [`BoundaryShape`] is an immutable descriptor attached to an actor
//! definition. Evaluating it at a world position yields a
//! [`PositionedBoundary`], which is only meant to live for one query.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::*;
use crate::error::{Error, Result};

/// Shape descriptor bound to an origin offset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BoundaryShape {
    Circle {
        radius: f32,
        origin_x: f32,
        origin_y: f32,
    },
    Rect {
        width: f32,
        height: f32,
        origin_x: f32,
        origin_y: f32,
    },
}

impl BoundaryShape {
    /// Circle whose center sits on the instance position
    pub fn circle(radius: f32) -> Self {
        Self::Circle {
            radius,
            origin_x: 0.0,
            origin_y: 0.0,
        }
    }

    /// Rectangle whose top-left corner sits on the instance position
    pub fn rect(width: f32, height: f32) -> Result<Self> {
        Self::rect_with_origin(width, height, 0.0, 0.0)
    }

    /// Rectangle offset so that `(origin_x, origin_y)` inside it lands on the
    /// instance position
    pub fn rect_with_origin(width: f32, height: f32, origin_x: f32, origin_y: f32) -> Result<Self> {
        if !(width > 0.0 && height > 0.0) {
            return Err(Error::InvalidRect { width, height });
        }
        Ok(Self::Rect {
            width,
            height,
            origin_x,
            origin_y,
        })
    }

    /// Move the origin of a shape
    pub fn with_origin(self, x: f32, y: f32) -> Self {
        match self {
            Self::Circle { radius, .. } => Self::Circle {
                radius,
                origin_x: x,
                origin_y: y,
            },
            Self::Rect { width, height, .. } => Self::Rect {
                width,
                height,
                origin_x: x,
                origin_y: y,
            },
        }
    }

    fn origin(&self) -> Vec2 {
        match *self {
            Self::Circle {
                origin_x, origin_y, ..
            }
            | Self::Rect {
                origin_x, origin_y, ..
            } => Vec2::new(origin_x, origin_y),
        }
    }

    /// Evaluate the shape at a world position
    pub fn at(&self, x: f32, y: f32) -> PositionedBoundary {
        PositionedBoundary {
            shape: *self,
            origin: Vec2::new(x, y) - self.origin(),
        }
    }
}

/// Axis-aligned box used for camera follow and culling
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// A shape evaluated at an absolute origin
///
/// For rectangles the origin is the top-left corner; for circles it is the
/// center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionedBoundary {
    pub shape: BoundaryShape,
    pub origin: Vec2,
}

impl PositionedBoundary {
    /// Overlap test dispatched on the pair of concrete shapes
    pub fn collides_with(&self, other: &PositionedBoundary) -> bool {
        let (a, b) = (self.origin, other.origin);
        match (self.shape, other.shape) {
            (
                BoundaryShape::Circle { radius: ar, .. },
                BoundaryShape::Circle { radius: br, .. },
            ) => circle_intersects_circle(a.x, a.y, ar, b.x, b.y, br),
            (
                BoundaryShape::Circle { radius, .. },
                BoundaryShape::Rect { width, height, .. },
            ) => rect_intersects_circle(b.x, b.y, width, height, a.x, a.y, radius),
            (
                BoundaryShape::Rect { width, height, .. },
                BoundaryShape::Circle { radius, .. },
            ) => rect_intersects_circle(a.x, a.y, width, height, b.x, b.y, radius),
            (
                BoundaryShape::Rect {
                    width: aw,
                    height: ah,
                    ..
                },
                BoundaryShape::Rect {
                    width: bw,
                    height: bh,
                    ..
                },
            ) => rect_intersects_rect(a.x, a.y, aw, ah, b.x, b.y, bw, bh),
        }
    }

    /// Whether a world point lies inside the boundary
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        let o = self.origin;
        match self.shape {
            BoundaryShape::Circle { radius, .. } => circle_contains_point(o.x, o.y, radius, x, y),
            BoundaryShape::Rect { width, height, .. } => {
                rect_contains_point(o.x, o.y, width, height, x, y)
            }
        }
    }

    /// Enclosing axis-aligned box
    pub fn bounds(&self) -> Bounds {
        let o = self.origin;
        match self.shape {
            BoundaryShape::Circle { radius, .. } => Bounds {
                x: o.x - radius,
                y: o.y - radius,
                width: radius * 2.0,
                height: radius * 2.0,
            },
            BoundaryShape::Rect { width, height, .. } => Bounds {
                x: o.x,
                y: o.y,
                width,
                height,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_rejects_non_positive_dimensions() {
        assert!(matches!(
            BoundaryShape::rect(0.0, 10.0),
            Err(Error::InvalidRect { .. })
        ));
        assert!(BoundaryShape::rect(10.0, -1.0).is_err());
        assert!(BoundaryShape::rect(f32::NAN, 5.0).is_err());
        assert!(BoundaryShape::rect(1.0, 1.0).is_ok());
    }

    #[test]
    fn test_rect_tie_break_cases() {
        let small = BoundaryShape::rect(10.0, 10.0).unwrap();
        let large = BoundaryShape::rect(12.0, 12.0).unwrap();

        assert!(!small.at(50.0, 50.0).collides_with(&large.at(60.0, 60.0)));
        assert!(small.at(50.0, 50.0).collides_with(&large.at(45.0, 45.0)));
    }

    #[test]
    fn test_origin_offsets_position() {
        let centered = BoundaryShape::rect_with_origin(20.0, 10.0, 10.0, 5.0).unwrap();
        let positioned = centered.at(100.0, 100.0);
        assert_eq!(positioned.origin, Vec2::new(90.0, 95.0));
        assert!(positioned.contains_point(90.0, 95.0));
        assert!(positioned.contains_point(110.0, 105.0));
        assert!(!positioned.contains_point(111.0, 100.0));
    }

    #[test]
    fn test_mixed_pairs_are_symmetric() {
        let rect = BoundaryShape::rect(10.0, 10.0).unwrap().at(0.0, 0.0);
        let near = BoundaryShape::circle(5.0).at(14.0, 5.0);
        let far = BoundaryShape::circle(5.0).at(16.0, 5.0);

        assert!(rect.collides_with(&near));
        assert!(near.collides_with(&rect));
        assert!(!rect.collides_with(&far));
        assert!(!far.collides_with(&rect));
    }

    #[test]
    fn test_circle_bounds() {
        let b = BoundaryShape::circle(4.0).at(10.0, 10.0).bounds();
        assert_eq!(
            b,
            Bounds {
                x: 6.0,
                y: 6.0,
                width: 8.0,
                height: 8.0
            }
        );
        assert!(!BoundaryShape::circle(4.0).at(0.0, 0.0).contains_point(4.0, 0.0));
    }
}
