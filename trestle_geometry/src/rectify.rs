// Copyright 2026 the Trestle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

use kurbo::{Point, Size};

use crate::Similarity;

/// Rescales raw footprint vertices from the pixel space of the image they were
/// authored against (`base`) into the pixel space of the image actually shown
/// (`displayed`).
///
/// X and Y are scaled independently. If either base dimension is not positive
/// the input is returned unchanged, which covers images whose size is not yet
/// known.
#[must_use]
pub fn scale_to_image(raw: &[Point], base: Size, displayed: Size) -> Vec<Point> {
    if base.width <= 0.0 || base.height <= 0.0 {
        return raw.to_vec();
    }
    let sx = displayed.width / base.width;
    let sy = displayed.height / base.height;
    raw.iter()
        .map(|p| Point::new(p.x * sx, p.y * sy))
        .collect()
}

/// Rescales raw vertices with [`scale_to_image`] and then places them into
/// reference space with `placement`.
///
/// Callers only need this when the polygon's base image differs from the
/// displayed one; otherwise the vertices mapped at resolution time are already
/// correct.
#[must_use]
pub fn rectify(raw: &[Point], base: Size, displayed: Size, placement: &Similarity) -> Vec<Point> {
    if base == displayed {
        return placement.map_polygon(raw);
    }
    placement.map_polygon(&scale_to_image(raw, base, displayed))
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Size};

    use super::{rectify, scale_to_image};
    use crate::Similarity;

    #[test]
    fn doubling_resolution_doubles_vertices() {
        let raw = [
            Point::new(10.0, 20.0),
            Point::new(790.0, 20.0),
            Point::new(790.0, 580.0),
            Point::new(10.0, 580.0),
        ];
        let scaled = scale_to_image(&raw, Size::new(800.0, 600.0), Size::new(1600.0, 1200.0));
        for (r, s) in raw.iter().zip(&scaled) {
            assert_eq!(s.x, r.x * 2.0, "x must double exactly");
            assert_eq!(s.y, r.y * 2.0, "y must double exactly");
        }
    }

    #[test]
    fn axes_scale_independently() {
        let scaled = scale_to_image(
            &[Point::new(100.0, 100.0)],
            Size::new(200.0, 100.0),
            Size::new(100.0, 300.0),
        );
        assert_eq!(scaled, [Point::new(50.0, 300.0)], "x halves, y triples");
    }

    #[test]
    fn unknown_base_size_is_passthrough() {
        let raw = [Point::new(1.0, 2.0), Point::new(3.0, 4.0)];
        for base in [Size::ZERO, Size::new(0.0, 10.0), Size::new(10.0, -1.0)] {
            assert_eq!(
                scale_to_image(&raw, base, Size::new(50.0, 50.0)),
                raw,
                "base {base:?} must leave vertices untouched"
            );
        }
    }

    #[test]
    fn rectify_applies_placement_after_scaling() {
        let placement = Similarity::new((5.0, 7.0), 0.5, 0.0);
        let out = rectify(
            &[Point::new(100.0, 50.0)],
            Size::new(800.0, 600.0),
            Size::new(1600.0, 1200.0),
            &placement,
        );
        // (100, 50) doubles to (200, 100), halves back, then translates.
        assert_eq!(out, [Point::new(105.0, 57.0)], "scaled then placed");
    }
}
