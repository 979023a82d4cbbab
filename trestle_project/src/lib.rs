// Copyright 2026 the Trestle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trestle Project: the drawing/discipline/revision graph and the lookups
//! that turn a user's selection into something drawable.
//!
//! A project is a hierarchy of drawings (site, building, floor, ...). Each
//! drawing has discipline entries (architecture, structure, fire protection,
//! ...), and each entry has a base image plus dated revisions. Entries and
//! revisions may carry a placement into a shared reference space and a
//! footprint polygon.
//!
//! - [`load_dir`] reads a [`ProjectGraph`] from `project.json`,
//!   `drawings.json`, and `discipline_revisions.json`.
//! - [`latest`] ranks revisions by date, then version label.
//! - [`resolve`], [`resolve_selection`], and [`resolve_polygon`] walk the
//!   precedence rules for image, placement, and footprint.
//! - The [`catalog`] functions list drawings, disciplines, overlay layers, and
//!   comparison panels.
//!
//! Missing data is never an error here. Lookups return `None` and callers
//! degrade to a plain or empty rendering.
//!
//! ```rust
//! use trestle_project::{Selection, load_str, resolve_selection};
//!
//! let graph = load_str(
//!     r#"{ "project": { "name": "Demo", "unit": "mm" } }"#,
//!     r#"{ "drawings": { "01": { "id": "01", "name": "Tower", "parent": null, "order": 0 } } }"#,
//!     r#"{ "01": { "건축": { "revisions": [
//!         { "version": "R1", "image": "a1.png", "date": "2024-01-01" },
//!         { "version": "R2", "image": "a2.png", "date": "2024-03-01" }
//!     ] } } }"#,
//! )
//! .unwrap();
//!
//! let image = resolve_selection(&graph, &Selection::drawing("01")).unwrap();
//! assert_eq!(image.image, "a2.png");
//! ```

pub mod catalog;
mod graph;
mod key;
mod loader;
mod model;
mod resolve;
mod revision;

pub use catalog::{
    BASE_LABEL, ComparePanel, ComparePanels, DisciplineOption, ImageEntry, ImageGroup,
    OverlayDefaults, OverlayLayerSpec, OverlayableDiscipline, RecentUpdate,
};
pub use graph::{DisciplineMap, ProjectGraph};
pub use key::{DisciplineKey, is_region_key};
pub use loader::{DRAWINGS_FILE, LoadError, PROJECT_FILE, REVISIONS_FILE, load_dir, load_str};
pub use model::{
    DisciplineDef, DisciplineEntry, Drawing, FootprintPolygon, ImageTransform, PositionOnParent,
    ProjectInfo, Revision, Selection,
};
pub use resolve::{
    Rectification, Resolution, ResolvedImage, ResolvedPolygon, placement_transform,
    polygon_for_revision, resolve, resolve_image, resolve_polygon, resolve_selection,
};
pub use revision::{by_recency, compare_labels, compare_recency, latest, revision_timestamp};
