// Copyright 2026 the Trestle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trestle Geometry: the pure geometry under drawing overlays.
//!
//! Construction drawings for one space are authored per discipline and per
//! revision, often against raster images of different native resolutions.
//! To show them together, every layer is mapped into a shared *reference
//! space* and the assembly is fitted into a viewport. This crate provides the
//! stateless pieces of that pipeline:
//!
//! - [`Similarity`]: a uniform scale + rotation + translation, applied to
//!   points and polygons (`p' = s · R(θ) · p + t`).
//! - [`bounding_box`]: axis-aligned extents of a vertex set, with the empty
//!   set mapping to [`Rect::ZERO`](kurbo::Rect::ZERO).
//! - [`scale_to_image`] / [`rectify`]: proportional rescaling of footprint
//!   vertices that were authored against a different base raster than the one
//!   being displayed.
//! - [`ReferenceFrame::fit`]: a padded, aspect-preserving fit of reference
//!   space into a viewport, shared by all layers of one draw pass.
//!
//! It does **not** own images, drawing surfaces, or project data. Callers
//! resolve which transform and polygon apply to a layer (see
//! `trestle_project`) and hand the results to a compositor.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Point, Size};
//! use trestle_geometry::{FitOptions, ReferenceFrame, Similarity};
//!
//! // A layer placed at (100, 50), half-size, unrotated.
//! let placement = Similarity::new((100.0, 50.0), 0.5, 0.0);
//! let footprint = [
//!     Point::new(0.0, 0.0),
//!     Point::new(400.0, 0.0),
//!     Point::new(400.0, 300.0),
//!     Point::new(0.0, 300.0),
//! ];
//! let in_reference = placement.map_polygon(&footprint);
//!
//! let frame = ReferenceFrame::fit(&in_reference, Size::new(800.0, 600.0), FitOptions::default());
//! let device = frame.to_view(in_reference[0]);
//! assert!((device.x - frame.padding()).abs() < 1e-9);
//! ```
//!
//! This crate is `no_std`.

#![no_std]

extern crate alloc;

mod bounds;
mod frame;
mod rectify;
mod similarity;

pub use bounds::{bounding_box, bounding_box_of};
pub use frame::{FitMode, FitOptions, ReferenceFrame};
pub use rectify::{rectify, scale_to_image};
pub use similarity::Similarity;

/// Minimum number of vertices for a footprint polygon to be usable.
///
/// Polygons with fewer vertices are treated as absent everywhere.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Returns `true` if `vertices` describes a usable footprint polygon.
#[inline]
#[must_use]
pub fn is_valid_polygon(vertices: &[kurbo::Point]) -> bool {
    vertices.len() >= MIN_POLYGON_VERTICES
}
