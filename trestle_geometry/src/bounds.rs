// Copyright 2026 the Trestle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Point, Rect};

/// Axis-aligned extents of a vertex set.
///
/// An empty input yields [`Rect::ZERO`]. A single vertex yields a zero-area
/// rectangle at that vertex.
#[must_use]
pub fn bounding_box(vertices: &[Point]) -> Rect {
    bounding_box_of(vertices.iter().copied())
}

/// Like [`bounding_box`], but over any sequence of points.
///
/// Useful for the union of several polygons without collecting them first.
#[must_use]
pub fn bounding_box_of(vertices: impl IntoIterator<Item = Point>) -> Rect {
    let mut iter = vertices.into_iter();
    let Some(first) = iter.next() else {
        return Rect::ZERO;
    };
    iter.fold(Rect::from_points(first, first), |acc, p| {
        Rect::new(
            acc.x0.min(p.x),
            acc.y0.min(p.y),
            acc.x1.max(p.x),
            acc.y1.max(p.y),
        )
    })
}
