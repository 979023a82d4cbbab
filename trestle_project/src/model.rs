// Copyright 2026 the Trestle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Serde model of the project data files.
//!
//! Field names follow the camelCase JSON written by the drawing pipeline.

use kurbo::Point;
use serde::{Deserialize, Deserializer};
use trestle_geometry::{Similarity, is_valid_polygon};

/// Project name and drawing unit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ProjectInfo {
    /// Display name of the project.
    pub name: String,
    /// Length unit the drawings are measured in.
    #[serde(default)]
    pub unit: String,
}

/// A discipline known to the project.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisciplineDef {
    /// Discipline key as used in `discipline_revisions.json`.
    pub name: String,
    /// Human-readable name, if different from the key.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Similarity transform as stored on disk.
///
/// Maps a layer's local pixel coordinates into the reference space it shares
/// with its parent and siblings.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageTransform {
    /// Translation along X.
    pub x: f64,
    /// Translation along Y.
    pub y: f64,
    /// Uniform scale.
    pub scale: f64,
    /// Rotation in radians.
    pub rotation: f64,
    /// Raster image the target space is anchored to.
    #[serde(default)]
    pub relative_to: Option<String>,
}

impl ImageTransform {
    /// The transform as a [`Similarity`].
    #[must_use]
    pub fn to_similarity(&self) -> Similarity {
        Similarity::new((self.x, self.y), self.scale, self.rotation)
    }
}

impl From<&ImageTransform> for Similarity {
    fn from(t: &ImageTransform) -> Self {
        t.to_similarity()
    }
}

/// Footprint of a layer in raw pixel coordinates of some base image.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FootprintPolygon {
    /// Raw vertices, in order.
    #[serde(default, deserialize_with = "deserialize_vertices")]
    pub vertices: Vec<Point>,
    /// Transform that places this particular polygon, when it differs from
    /// the image placement.
    #[serde(default)]
    pub polygon_transform: Option<ImageTransform>,
}

impl FootprintPolygon {
    /// Returns `true` if the polygon has enough vertices to be used.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        is_valid_polygon(&self.vertices)
    }
}

/// Where a child drawing sits on its parent.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionOnParent {
    /// Footprint of the child in the parent's pixel space.
    #[serde(deserialize_with = "deserialize_vertices")]
    pub vertices: Vec<Point>,
    /// Placement of the child's image on the parent.
    pub image_transform: ImageTransform,
}

/// A node of the space hierarchy.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drawing {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Parent drawing, `None` for a root.
    #[serde(default)]
    pub parent: Option<String>,
    /// Footprint on the parent drawing, if known.
    #[serde(default)]
    pub position: Option<PositionOnParent>,
    /// Sibling order.
    #[serde(default)]
    pub order: i64,
}

/// One dated revision of a discipline's drawing.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Revision {
    /// Version label. Not guaranteed to be sortable.
    pub version: String,
    /// Raster filename.
    pub image: String,
    /// ISO-like date; only the first ten characters are significant.
    #[serde(default)]
    pub date: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Change notes.
    #[serde(default)]
    pub changes: Vec<String>,
    /// Revision-specific placement.
    #[serde(default)]
    pub image_transform: Option<ImageTransform>,
    /// Revision-specific footprint.
    #[serde(default)]
    pub polygon: Option<FootprintPolygon>,
    /// Transform for the revision's footprint.
    #[serde(default)]
    pub polygon_transform: Option<ImageTransform>,
    /// Raster image the revision's footprint was authored against.
    #[serde(default)]
    pub relative_to: Option<String>,
}

/// Everything known about one discipline of one drawing.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisciplineEntry {
    /// Display name, falling back to the key when absent.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Base raster filename.
    #[serde(default)]
    pub image: Option<String>,
    /// Raster image the base footprint was authored against.
    #[serde(default)]
    pub relative_to: Option<String>,
    /// Base placement.
    #[serde(default)]
    pub image_transform: Option<ImageTransform>,
    /// Base footprint.
    #[serde(default)]
    pub polygon: Option<FootprintPolygon>,
    /// Revisions in storage order.
    #[serde(default)]
    pub revisions: Vec<Revision>,
}

impl DisciplineEntry {
    /// Looks up a revision by exact version label.
    #[must_use]
    pub fn revision(&self, version: &str) -> Option<&Revision> {
        self.revisions.iter().find(|r| r.version == version)
    }

    /// Display label: the display name, or `key` when there is none.
    #[must_use]
    pub fn label<'a>(&'a self, key: &'a str) -> &'a str {
        self.display_name.as_deref().unwrap_or(key)
    }
}

/// The user's current choice of drawing, discipline, and revision.
///
/// All parts are optional. A missing revision selects the base image.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    /// Selected drawing.
    pub drawing_id: Option<String>,
    /// Selected discipline key; the first undotted key is used when absent.
    pub discipline_key: Option<String>,
    /// Selected revision; `None` is the base selection.
    pub revision_version: Option<String>,
}

impl Selection {
    /// Selects a drawing with its default discipline and base revision.
    #[must_use]
    pub fn drawing(id: impl Into<String>) -> Self {
        Self {
            drawing_id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Sets the discipline key.
    #[must_use]
    pub fn with_discipline(mut self, key: impl Into<String>) -> Self {
        self.discipline_key = Some(key.into());
        self
    }

    /// Sets the revision version.
    #[must_use]
    pub fn with_revision(mut self, version: impl Into<String>) -> Self {
        self.revision_version = Some(version.into());
        self
    }
}

fn deserialize_vertices<'de, D>(deserializer: D) -> Result<Vec<Point>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<[f64; 2]>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|[x, y]| Point::new(x, y)).collect())
}
