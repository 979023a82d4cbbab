// Copyright 2026 the Trestle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Listings over a [`ProjectGraph`] for pickers, overlay setup, and revision
//! comparison.

use time::Date;

use crate::{
    DisciplineKey, ProjectGraph, Revision, by_recency, compare_labels, is_region_key, latest,
    resolve_image, revision_timestamp,
};

/// Label shown for the base (non-revision) selection.
pub const BASE_LABEL: &str = "기본";

/// A top-level discipline of a drawing, as offered to a picker.
#[derive(Clone, Debug, PartialEq)]
pub struct DisciplineOption<'g> {
    /// Raw discipline key.
    pub key: &'g str,
    /// Display label.
    pub label: &'g str,
    /// Revisions in storage order.
    pub revisions: &'g [Revision],
    /// Region suffixes of `key` (`"A"` for `"구조.A"`), in storage order.
    pub region_keys: Vec<&'g str>,
}

impl DisciplineOption<'_> {
    /// Returns `true` if the discipline is split into regions.
    #[must_use]
    pub fn has_regions(&self) -> bool {
        !self.region_keys.is_empty()
    }
}

/// A discipline that has something to draw in an overlay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverlayableDiscipline<'g> {
    /// Raw discipline key.
    pub key: &'g str,
    /// Display label.
    pub label: &'g str,
}

/// Opacity and visibility defaults for a fresh overlay.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayDefaults {
    /// Discipline shown initially.
    pub primary_discipline: String,
    /// Opacity of the primary discipline.
    pub primary_opacity: f64,
    /// Opacity of every other discipline.
    pub secondary_opacity: f64,
}

impl Default for OverlayDefaults {
    fn default() -> Self {
        Self {
            primary_discipline: "건축".to_owned(),
            primary_opacity: 0.8,
            secondary_opacity: 0.6,
        }
    }
}

/// One layer of an overlay as chosen by the user.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayLayerSpec {
    /// Discipline key.
    pub discipline_key: String,
    /// Display label.
    pub label: String,
    /// Revision to show, `None` for the base selection.
    pub revision_version: Option<String>,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Whether the layer is drawn.
    pub visible: bool,
}

/// One side of a revision comparison.
#[derive(Clone, Debug, PartialEq)]
pub struct ComparePanel {
    /// Raster filename, if one resolves.
    pub image: Option<String>,
    /// Version label, or [`BASE_LABEL`].
    pub label: String,
    /// Revision date.
    pub date: Option<String>,
    /// Revision description.
    pub description: Option<String>,
    /// Change notes.
    pub changes: Vec<String>,
}

/// Left and right sides of a revision comparison.
#[derive(Clone, Debug, PartialEq)]
pub struct ComparePanels {
    /// Left panel.
    pub left: ComparePanel,
    /// Right panel.
    pub right: ComparePanel,
}

/// An image that can be shown for a drawing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageEntry<'g> {
    /// Raster filename.
    pub image: &'g str,
    /// Discipline key.
    pub discipline_key: &'g str,
    /// Revision, `None` for the base image.
    pub revision_version: Option<&'g str>,
    /// Display label.
    pub label: String,
    /// Revision date, if any.
    pub date: Option<&'g str>,
    /// Whether this is the latest image of its discipline.
    pub is_latest: bool,
}

/// The images of one discipline, with its regions nested below it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageGroup<'g> {
    /// Raw discipline key.
    pub discipline_key: &'g str,
    /// Display label; regions use their short name (`"A"` for `"구조.A"`).
    pub label: &'g str,
    /// Images of this key, as listed by [`image_entries`].
    pub entries: Vec<ImageEntry<'g>>,
    /// Region groups sorted by key, leaving out regions without images.
    pub regions: Vec<ImageGroup<'g>>,
}

/// The discipline whose latest revision is dated closest to a given day.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecentUpdate<'g> {
    /// Drawing the discipline belongs to.
    pub drawing_id: &'g str,
    /// Name of that drawing, or its id when it is not in the hierarchy.
    pub drawing_name: &'g str,
    /// Name of the space the drawing sits in: its ancestor directly below a
    /// root, or the drawing itself.
    pub space_name: &'g str,
    /// Raw discipline key.
    pub discipline_key: &'g str,
    /// Display label of the discipline.
    pub discipline_label: &'g str,
    /// The latest revision's version.
    pub revision_version: &'g str,
    /// The revision ranked right after it, if any.
    pub previous_version: Option<&'g str>,
    /// The latest revision's date string.
    pub date: &'g str,
    /// The latest revision's change notes.
    pub changes: &'g [String],
}

/// Drawing ids sorted by their `order`, stable for equal orders.
#[must_use]
pub fn drawing_ids_in_order(graph: &ProjectGraph) -> Vec<&str> {
    let mut drawings: Vec<_> = graph.drawings().collect();
    drawings.sort_by_key(|d| d.order);
    drawings.into_iter().map(|d| d.id.as_str()).collect()
}

/// Children of `parent` in drawing order.
#[must_use]
pub fn child_drawing_ids<'g>(graph: &'g ProjectGraph, parent: &str) -> Vec<&'g str> {
    drawing_ids_in_order(graph)
        .into_iter()
        .filter(|id| {
            graph
                .drawing(id)
                .is_some_and(|d| d.parent.as_deref() == Some(parent))
        })
        .collect()
}

/// Top-level disciplines of a drawing, in storage order.
#[must_use]
pub fn discipline_options<'g>(graph: &'g ProjectGraph, drawing: &str) -> Vec<DisciplineOption<'g>> {
    let Some(entries) = graph.entries(drawing) else {
        return Vec::new();
    };
    let parsed: Vec<(&str, DisciplineKey)> = entries
        .keys()
        .map(|k| (k.as_str(), DisciplineKey::parse(k)))
        .collect();

    entries
        .iter()
        .filter(|(key, _)| !is_region_key(key))
        .map(|(key, entry)| {
            let region_keys = parsed
                .iter()
                .filter_map(|(raw, parsed_key)| match parsed_key {
                    DisciplineKey::Regioned { prefix, .. } if prefix == key => {
                        raw.get(key.len() + 1..)
                    }
                    _ => None,
                })
                .collect();
            DisciplineOption {
                key,
                label: entry.label(key),
                revisions: &entry.revisions,
                region_keys,
            }
        })
        .collect()
}

/// Top-level disciplines with a base image or at least one revision, sorted
/// by label.
#[must_use]
pub fn overlayable_disciplines<'g>(
    graph: &'g ProjectGraph,
    drawing: &str,
) -> Vec<OverlayableDiscipline<'g>> {
    let Some(entries) = graph.entries(drawing) else {
        return Vec::new();
    };
    let mut result: Vec<_> = entries
        .iter()
        .filter(|(key, entry)| {
            !is_region_key(key) && (entry.image.is_some() || !entry.revisions.is_empty())
        })
        .map(|(key, entry)| OverlayableDiscipline {
            key,
            label: entry.label(key),
        })
        .collect();
    result.sort_by(|a, b| compare_labels(a.label, b.label));
    result
}

/// The layers a fresh overlay starts with: one per overlayable discipline at
/// its latest revision, with only the primary discipline visible.
#[must_use]
pub fn initial_overlay_layers(
    graph: &ProjectGraph,
    drawing: &str,
    defaults: &OverlayDefaults,
) -> Vec<OverlayLayerSpec> {
    overlayable_disciplines(graph, drawing)
        .into_iter()
        .map(|d| {
            let primary = d.key == defaults.primary_discipline;
            let revision_version = graph
                .entry(drawing, d.key)
                .and_then(|e| latest(&e.revisions))
                .map(|r| r.version.clone());
            OverlayLayerSpec {
                discipline_key: d.key.to_owned(),
                label: d.label.to_owned(),
                revision_version,
                opacity: if primary {
                    defaults.primary_opacity
                } else {
                    defaults.secondary_opacity
                },
                visible: primary,
            }
        })
        .collect()
}

/// Builds both sides of a revision comparison.
#[must_use]
pub fn revision_compare_panels(
    graph: &ProjectGraph,
    drawing: &str,
    key: &str,
    left: Option<&str>,
    right: Option<&str>,
) -> ComparePanels {
    let panel = |version: Option<&str>| {
        let rev = version
            .zip(graph.entry(drawing, key))
            .and_then(|(v, e)| e.revision(v));
        ComparePanel {
            image: resolve_image(graph, drawing, key, version).map(str::to_owned),
            label: version.unwrap_or(BASE_LABEL).to_owned(),
            date: rev.map(|r| r.date.clone()),
            description: rev.map(|r| r.description.clone()),
            changes: rev.map(|r| r.changes.clone()).unwrap_or_default(),
        }
    };
    ComparePanels {
        left: panel(left),
        right: panel(right),
    }
}

/// Default version for the right side of a comparison: the latest revision,
/// else the first in storage order.
#[must_use]
pub fn default_compare_version(revisions: &[Revision]) -> Option<&str> {
    latest(revisions)
        .or_else(|| revisions.first())
        .map(|r| r.version.as_str())
}

fn find_revision<'g>(
    graph: &'g ProjectGraph,
    drawing: &str,
    key: Option<&str>,
    version: Option<&str>,
) -> Option<&'g Revision> {
    graph.entry(drawing, key?)?.revision(version?)
}

/// Change notes of a revision, empty when it does not resolve.
#[must_use]
pub fn revision_changes<'g>(
    graph: &'g ProjectGraph,
    drawing: &str,
    key: Option<&str>,
    version: Option<&str>,
) -> &'g [String] {
    find_revision(graph, drawing, key, version)
        .map(|r| r.changes.as_slice())
        .unwrap_or_default()
}

/// Description of a revision.
#[must_use]
pub fn revision_description<'g>(
    graph: &'g ProjectGraph,
    drawing: &str,
    key: Option<&str>,
    version: Option<&str>,
) -> Option<&'g str> {
    find_revision(graph, drawing, key, version).map(|r| r.description.as_str())
}

/// Date string of a revision.
#[must_use]
pub fn revision_date<'g>(
    graph: &'g ProjectGraph,
    drawing: &str,
    key: Option<&str>,
    version: Option<&str>,
) -> Option<&'g str> {
    find_revision(graph, drawing, key, version).map(|r| r.date.as_str())
}

/// Every image a drawing can show, grouped by discipline in storage order.
///
/// A discipline with revisions lists its base image first (if any), then each
/// revision. A discipline with only a base image lists it as latest.
#[must_use]
pub fn image_entries<'g>(graph: &'g ProjectGraph, drawing: &str) -> Vec<ImageEntry<'g>> {
    let Some(entries) = graph.entries(drawing) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for (key, entry) in entries {
        let label = entry.label(key);
        let newest = latest(&entry.revisions);
        if let Some(image) = entry.image.as_deref() {
            out.push(ImageEntry {
                image,
                discipline_key: key,
                revision_version: None,
                label: format!("{label} ({BASE_LABEL})"),
                date: None,
                is_latest: entry.revisions.is_empty(),
            });
        }
        for rev in &entry.revisions {
            out.push(ImageEntry {
                image: &rev.image,
                discipline_key: key,
                revision_version: Some(&rev.version),
                label: format!("{label} {}", rev.version),
                date: Some(&rev.date),
                is_latest: newest.is_some_and(|l| l.version == rev.version),
            });
        }
    }
    out
}

/// [`image_entries`] grouped per top-level discipline, sorted by label.
///
/// Region keys (`"구조.A"`) become sub-groups of their prefix, labelled by
/// the part after the last ` > ` of their display name, else after the last
/// dot of the key. Regions whose prefix has no entry are left out.
#[must_use]
pub fn image_entries_grouped<'g>(graph: &'g ProjectGraph, drawing: &str) -> Vec<ImageGroup<'g>> {
    let Some(entries) = graph.entries(drawing) else {
        return Vec::new();
    };
    let images = image_entries(graph, drawing);
    let images_of = |key: &str| -> Vec<ImageEntry<'g>> {
        images
            .iter()
            .filter(|e| e.discipline_key == key)
            .cloned()
            .collect()
    };

    let mut groups: Vec<ImageGroup<'g>> = entries
        .iter()
        .filter(|(key, _)| !is_region_key(key))
        .map(|(key, entry)| {
            let mut region_keys: Vec<&'g str> = entries
                .keys()
                .map(String::as_str)
                .filter(|raw| DisciplineKey::parse(raw).region().is_some())
                .filter(|raw| DisciplineKey::parse(raw).prefix() == key.as_str())
                .collect();
            region_keys.sort_by(|a, b| compare_labels(a, b));
            let regions = region_keys
                .into_iter()
                .filter_map(|raw| {
                    let region_entries = images_of(raw);
                    if region_entries.is_empty() {
                        return None;
                    }
                    Some(ImageGroup {
                        discipline_key: raw,
                        label: region_label(raw, entries.get(raw)?.display_name.as_deref()),
                        entries: region_entries,
                        regions: Vec::new(),
                    })
                })
                .collect();
            ImageGroup {
                discipline_key: key,
                label: entry.label(key),
                entries: images_of(key),
                regions,
            }
        })
        .collect();
    groups.sort_by(|a, b| compare_labels(a.label, b.label));
    groups
}

fn region_label<'g>(key: &'g str, display_name: Option<&'g str>) -> &'g str {
    match display_name.and_then(|name| name.rsplit_once(" > ")) {
        Some((_, short)) => short,
        None => key.rsplit('.').next().unwrap_or(key),
    }
}

/// The discipline, across all drawings, whose latest revision is dated
/// closest to `today` (UTC midnight).
///
/// Disciplines without revisions are ignored. On equal distance the first in
/// storage order wins. The previous version is the next one in
/// [`by_recency`] order.
#[must_use]
pub fn recent_revision_update(graph: &ProjectGraph, today: Date) -> Option<RecentUpdate<'_>> {
    let today = today.midnight().assume_utc().unix_timestamp();
    let mut best: Option<(i64, RecentUpdate<'_>)> = None;
    for (drawing_id, entries) in graph.entries_by_drawing() {
        for (key, entry) in entries {
            let Some(newest) = latest(&entry.revisions) else {
                continue;
            };
            let distance = (revision_timestamp(&newest.date) - today).abs();
            if best.as_ref().is_some_and(|(d, _)| *d <= distance) {
                continue;
            }
            let ranked = by_recency(&entry.revisions);
            let previous_version = ranked
                .iter()
                .position(|r| core::ptr::eq(*r, newest))
                .and_then(|i| ranked.get(i + 1))
                .map(|r| r.version.as_str());
            let update = RecentUpdate {
                drawing_id,
                drawing_name: graph
                    .drawing(drawing_id)
                    .map_or(drawing_id, |d| d.name.as_str()),
                space_name: space_name(graph, drawing_id),
                discipline_key: key,
                discipline_label: entry.label(key),
                revision_version: &newest.version,
                previous_version,
                date: &newest.date,
                changes: &newest.changes,
            };
            best = Some((distance, update));
        }
    }
    best.map(|(_, update)| update)
}

fn space_name<'g>(graph: &'g ProjectGraph, drawing: &'g str) -> &'g str {
    let path = graph.breadcrumb(drawing);
    let space = path.get(1).or(path.first()).copied().unwrap_or(drawing);
    graph.drawing(space).map_or(space, |d| d.name.as_str())
}
