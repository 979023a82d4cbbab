// Copyright 2026 the Trestle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Point;
use trestle_geometry::{Similarity, is_valid_polygon};
use trestle_project::{
    ImageTransform, OverlayLayerSpec, ProjectGraph, placement_transform, polygon_for_revision,
    resolve_image,
};

/// One raster layer of a composite.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositeLayer {
    /// URL of the raster image, as understood by the image source.
    pub image: String,
    /// Placement of the image in reference space.
    pub placement: Similarity,
    /// Footprint in reference space. Drawing is clipped to its interior.
    pub polygon: Option<Vec<Point>>,
    /// Group opacity in `[0, 1]`.
    pub opacity: f64,
}

impl CompositeLayer {
    /// An opaque, unclipped layer placed by `placement`.
    pub fn new(image: impl Into<String>, placement: Similarity) -> Self {
        Self {
            image: image.into(),
            placement,
            polygon: None,
            opacity: 1.0,
        }
    }

    /// Sets the footprint polygon.
    #[must_use]
    pub fn with_polygon(mut self, vertices: Vec<Point>) -> Self {
        self.polygon = Some(vertices);
        self
    }

    /// Sets the opacity, clamped to `[0, 1]`.
    #[must_use]
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// The footprint, if it has at least three vertices.
    pub fn valid_polygon(&self) -> Option<&[Point]> {
        self.polygon.as_deref().filter(|v| is_valid_polygon(v))
    }

    /// Resolves one overlay layer of `drawing` against the project.
    ///
    /// `None` when no image resolves. A missing placement is the identity.
    pub fn from_spec(graph: &ProjectGraph, drawing: &str, spec: &OverlayLayerSpec) -> Option<Self> {
        let key = spec.discipline_key.as_str();
        let version = spec.revision_version.as_deref();
        let image = resolve_image(graph, drawing, key, version)?;
        let placement = placement_transform(graph, drawing, key, version)
            .map(ImageTransform::to_similarity)
            .unwrap_or_default();
        let polygon = polygon_for_revision(graph, drawing, key, version).map(|p| p.vertices);
        Some(Self {
            image: image.to_owned(),
            placement,
            polygon,
            opacity: spec.opacity.clamp(0.0, 1.0),
        })
    }
}

/// Resolves the visible layers of an overlay, in order.
///
/// Hidden layers and layers without an image are left out.
pub fn overlay_layers(
    graph: &ProjectGraph,
    drawing: &str,
    specs: &[OverlayLayerSpec],
) -> Vec<CompositeLayer> {
    specs
        .iter()
        .filter(|s| s.visible)
        .filter_map(|s| CompositeLayer::from_spec(graph, drawing, s))
        .collect()
}
