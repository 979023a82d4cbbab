// Copyright 2026 the Trestle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resolution of a (drawing, discipline, revision) choice into an image,
//! a placement, and a footprint polygon.
//!
//! Every lookup here is total: missing data produces `None`, never an error.
//! Revision data is sparse in practice, and callers render whatever resolves.
//!
//! A `version` of `None` is the *base* selection. It prefers the discipline's
//! own data and falls back to the latest revision (see [`latest`]).

use kurbo::Point;
use trestle_geometry::Similarity;

use crate::{
    DisciplineEntry, FootprintPolygon, ImageTransform, ProjectGraph, Revision, Selection, latest,
};

/// An image selected for display.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedImage {
    /// Drawing the image belongs to.
    pub drawing_id: String,
    /// Effective discipline key.
    pub discipline_key: String,
    /// Requested revision, `None` for the base selection.
    pub revision_version: Option<String>,
    /// Raster filename.
    pub image: String,
    /// Placement in reference space, when one resolves.
    pub placement: Option<Similarity>,
}

/// Raw footprint data needed to rescale a polygon authored against a
/// different raster than the one displayed.
#[derive(Clone, Debug, PartialEq)]
pub struct Rectification {
    /// The polygon's vertices before any transform.
    pub raw_vertices: Vec<Point>,
    /// Raster the raw vertices were authored against.
    pub base_image: String,
}

/// A footprint polygon placed in reference space.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedPolygon {
    /// Vertices in reference space.
    pub vertices: Vec<Point>,
    /// Placement of the layer's image.
    pub placement: Similarity,
    /// Transform that mapped the raw vertices into reference space.
    pub polygon_transform: Similarity,
    /// Present when the polygon's base raster differs from the displayed one.
    pub rectification: Option<Rectification>,
}

/// Everything that resolves for one selection.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    /// Raster filename to display.
    pub image: Option<String>,
    /// Image placement.
    pub placement: Option<Similarity>,
    /// Footprint polygon.
    pub polygon: Option<ResolvedPolygon>,
}

/// The raster filename to display.
///
/// With a version, the matching revision's image, or `None` if there is no
/// such revision. Without one, the entry's base image, else the latest
/// revision's image.
#[must_use]
pub fn resolve_image<'g>(
    graph: &'g ProjectGraph,
    drawing: &str,
    key: &str,
    version: Option<&str>,
) -> Option<&'g str> {
    entry_image(graph.entry(drawing, key)?, version)
}

/// The placement transform of the layer's image.
///
/// With a version, the revision's transform, else the entry's. Without one,
/// the entry's transform, else the latest revision's.
#[must_use]
pub fn placement_transform<'g>(
    graph: &'g ProjectGraph,
    drawing: &str,
    key: &str,
    version: Option<&str>,
) -> Option<&'g ImageTransform> {
    entry_placement(graph.entry(drawing, key)?, version)
}

/// The footprint polygon of a layer, placed in reference space.
///
/// `None` when no candidate polygon has at least three vertices, or when no
/// image placement or polygon transform resolves.
#[must_use]
pub fn polygon_for_revision(
    graph: &ProjectGraph,
    drawing: &str,
    key: &str,
    version: Option<&str>,
) -> Option<ResolvedPolygon> {
    entry_polygon(graph.entry(drawing, key)?, version)
}

/// Resolves image, placement, and polygon in one go.
///
/// `None` only when the drawing has no entry for `key`.
#[must_use]
pub fn resolve(
    graph: &ProjectGraph,
    drawing: &str,
    key: &str,
    version: Option<&str>,
) -> Option<Resolution> {
    let entry = graph.entry(drawing, key)?;
    Some(Resolution {
        image: entry_image(entry, version).map(str::to_owned),
        placement: entry_placement(entry, version).map(ImageTransform::to_similarity),
        polygon: entry_polygon(entry, version),
    })
}

/// Resolves the image for a [`Selection`].
///
/// A selection without a discipline uses the drawing's first top-level
/// discipline.
#[must_use]
pub fn resolve_selection(graph: &ProjectGraph, selection: &Selection) -> Option<ResolvedImage> {
    let (drawing, key) = selection_target(graph, selection)?;
    let version = selection.revision_version.as_deref();
    let entry = graph.entry(drawing, key)?;
    Some(ResolvedImage {
        drawing_id: drawing.to_owned(),
        discipline_key: key.to_owned(),
        revision_version: version.map(str::to_owned),
        image: entry_image(entry, version)?.to_owned(),
        placement: entry_placement(entry, version).map(ImageTransform::to_similarity),
    })
}

/// Resolves the footprint polygon for a [`Selection`].
#[must_use]
pub fn resolve_polygon(graph: &ProjectGraph, selection: &Selection) -> Option<ResolvedPolygon> {
    let (drawing, key) = selection_target(graph, selection)?;
    polygon_for_revision(graph, drawing, key, selection.revision_version.as_deref())
}

fn selection_target<'s>(graph: &'s ProjectGraph, selection: &'s Selection) -> Option<(&'s str, &'s str)> {
    let drawing = selection.drawing_id.as_deref()?;
    let key = match selection.discipline_key.as_deref() {
        Some(key) => key,
        None => graph.default_discipline(drawing)?,
    };
    Some((drawing, key))
}

fn entry_image<'e>(entry: &'e DisciplineEntry, version: Option<&str>) -> Option<&'e str> {
    match version {
        Some(v) => entry.revision(v).map(|r| r.image.as_str()),
        None => entry
            .image
            .as_deref()
            .or_else(|| latest(&entry.revisions).map(|r| r.image.as_str())),
    }
}

fn entry_placement<'e>(entry: &'e DisciplineEntry, version: Option<&str>) -> Option<&'e ImageTransform> {
    match version {
        Some(v) => entry
            .revision(v)
            .and_then(|r| r.image_transform.as_ref())
            .or(entry.image_transform.as_ref()),
        None => entry
            .image_transform
            .as_ref()
            .or_else(|| latest(&entry.revisions)?.image_transform.as_ref()),
    }
}

fn entry_polygon(entry: &DisciplineEntry, version: Option<&str>) -> Option<ResolvedPolygon> {
    let placement = entry_placement(entry, version)?;
    let rev = version.and_then(|v| entry.revision(v));
    let newest = latest(&entry.revisions);

    let (polygon, relative_to) = winning_polygon(entry, rev, newest)?;
    let polygon_transform = rev
        .and_then(|r| r.polygon_transform.as_ref().or(r.image_transform.as_ref()))
        .or(polygon.polygon_transform.as_ref())
        .or(entry.image_transform.as_ref())
        .or_else(|| newest.and_then(|l| l.polygon_transform.as_ref().or(l.image_transform.as_ref())))?
        .to_similarity();

    let displayed = entry_image(entry, version);
    let rectification = match (relative_to, displayed) {
        (Some(base), Some(shown)) if base != shown => Some(Rectification {
            raw_vertices: polygon.vertices.clone(),
            base_image: base.to_owned(),
        }),
        _ => None,
    };

    Some(ResolvedPolygon {
        vertices: polygon_transform.map_polygon(&polygon.vertices),
        placement: placement.to_similarity(),
        polygon_transform,
        rectification,
    })
}

/// First valid polygon among revision, entry, and latest revision, paired
/// with the raster it was authored against.
fn winning_polygon<'e>(
    entry: &'e DisciplineEntry,
    rev: Option<&'e Revision>,
    newest: Option<&'e Revision>,
) -> Option<(&'e FootprintPolygon, Option<&'e str>)> {
    let entry_base = entry.relative_to.as_deref();
    let from_revision = |r: &'e Revision| {
        r.polygon
            .as_ref()
            .map(|p| (p, r.relative_to.as_deref().or(entry_base)))
    };
    [
        rev.and_then(from_revision),
        entry.polygon.as_ref().map(|p| (p, entry_base)),
        newest.and_then(from_revision),
    ]
    .into_iter()
    .flatten()
    .find(|(p, _)| p.is_valid())
}
