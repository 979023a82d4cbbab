// Copyright 2026 the Trestle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Affine, Point, Vec2};

/// Similarity transform from a layer's local pixel space into reference space.
///
/// A point `p` maps to `scale · R(rotation) · p + translation`, where `R(θ)` is
/// the standard counter-clockwise rotation matrix `[[cosθ, -sinθ], [sinθ, cosθ]]`.
/// Rotation is in radians. No shear or perspective is representable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Similarity {
    /// Translation applied after scaling and rotating.
    pub translation: Vec2,
    /// Uniform scale factor.
    pub scale: f64,
    /// Rotation in radians.
    pub rotation: f64,
}

impl Default for Similarity {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Similarity {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        translation: Vec2::ZERO,
        scale: 1.0,
        rotation: 0.0,
    };

    /// Creates a transform from a translation, a uniform scale, and a rotation in radians.
    #[must_use]
    pub fn new(translation: impl Into<Vec2>, scale: f64, rotation: f64) -> Self {
        Self {
            translation: translation.into(),
            scale,
            rotation,
        }
    }

    /// Maps a single point.
    #[must_use]
    pub fn map_point(&self, p: Point) -> Point {
        let (sin, cos) = self.rotation.sin_cos();
        Point::new(
            self.scale * (p.x * cos - p.y * sin) + self.translation.x,
            self.scale * (p.x * sin + p.y * cos) + self.translation.y,
        )
    }

    /// Maps every vertex of a polygon, preserving order and count.
    #[must_use]
    pub fn map_polygon(&self, vertices: &[Point]) -> Vec<Point> {
        vertices.iter().map(|&p| self.map_point(p)).collect()
    }

    /// Returns the inverse transform.
    ///
    /// The inverse is only meaningful for a nonzero scale; a zero scale yields
    /// non-finite components.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let inv_scale = 1.0 / self.scale;
        let rotation = -self.rotation;
        let back = Self {
            translation: Vec2::ZERO,
            scale: inv_scale,
            rotation,
        }
        .map_point(self.translation.to_point());
        Self {
            translation: -back.to_vec2(),
            scale: inv_scale,
            rotation,
        }
    }

    /// Expresses this transform as a [`kurbo::Affine`].
    ///
    /// The result is equivalent to translating, then rotating, then scaling the
    /// drawing context, which is the order a 2D canvas applies them in.
    #[must_use]
    pub fn to_affine(&self) -> Affine {
        Affine::translate(self.translation)
            * Affine::rotate(self.rotation)
            * Affine::scale(self.scale)
    }
}

#[cfg(test)]
mod tests {
    use core::f64::consts::{FRAC_PI_2, PI};

    use kurbo::{Point, Vec2};

    use super::Similarity;

    fn assert_close(a: Point, b: Point) {
        assert!(
            (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9,
            "expected {b:?}, got {a:?}"
        );
    }

    #[test]
    fn identity_leaves_points_alone() {
        let p = Point::new(3.5, -2.0);
        assert_close(Similarity::IDENTITY.map_point(p), p);
    }

    #[test]
    fn quarter_turn_then_scale_then_translate() {
        let t = Similarity::new((10.0, 20.0), 2.0, FRAC_PI_2);
        // (1, 0) rotates to (0, 1), scales to (0, 2), translates to (10, 22).
        assert_close(t.map_point(Point::new(1.0, 0.0)), Point::new(10.0, 22.0));
        // (0, 1) rotates to (-1, 0).
        assert_close(t.map_point(Point::new(0.0, 1.0)), Point::new(8.0, 20.0));
    }

    #[test]
    fn inverse_round_trips() {
        let transforms = [
            Similarity::new((0.0, 0.0), 1.0, 0.0),
            Similarity::new((125.5, -40.25), 0.37, 0.3),
            Similarity::new((-3.0, 9.0), 4.0, -2.1),
            Similarity::new((1e4, 2e4), 1e-3, PI),
        ];
        let points = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(-250.0, 1024.0),
            Point::new(4096.0, 3072.0),
        ];
        for t in transforms {
            let inv = t.inverse();
            for p in points {
                let back = inv.map_point(t.map_point(p));
                let tolerance = 1e-6 * (1.0 + p.to_vec2().hypot());
                assert!(
                    (back.x - p.x).abs() < tolerance && (back.y - p.y).abs() < tolerance,
                    "{t:?} did not round-trip {p:?}, got {back:?}"
                );
            }
        }
    }

    #[test]
    fn map_polygon_preserves_count_and_order() {
        let t = Similarity::new(Vec2::new(5.0, 5.0), 3.0, 0.0);
        let poly = [
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(2.0, 1.0),
            Point::new(0.0, 1.0),
            Point::new(-1.0, 0.5),
        ];
        let mapped = t.map_polygon(&poly);
        assert_eq!(mapped.len(), poly.len());
        for (src, dst) in poly.iter().zip(&mapped) {
            assert_close(*dst, t.map_point(*src));
        }
        assert!(t.map_polygon(&[]).is_empty());
    }

    #[test]
    fn affine_matches_point_mapping() {
        let t = Similarity::new((7.0, -3.0), 1.5, 0.8);
        let affine = t.to_affine();
        for p in [Point::new(0.0, 0.0), Point::new(10.0, 4.0), Point::new(-6.0, 2.5)] {
            assert_close(affine * p, t.map_point(p));
        }
    }
}
