// Copyright 2026 the Trestle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use indexmap::IndexMap;

use crate::{DisciplineDef, DisciplineEntry, Drawing, LoadError, ProjectInfo, is_region_key};

/// Disciplines of one drawing, keyed by raw discipline key in storage order.
pub type DisciplineMap = IndexMap<String, DisciplineEntry>;

/// The in-memory project: drawings, their hierarchy, and per-discipline
/// revision data.
///
/// A graph is immutable once built. Every non-root drawing's parent exists and
/// the parent links are acyclic.
#[derive(Clone, Debug, Default)]
pub struct ProjectGraph {
    project: ProjectInfo,
    disciplines: Vec<DisciplineDef>,
    drawings: IndexMap<String, Drawing>,
    revisions: IndexMap<String, DisciplineMap>,
}

impl ProjectGraph {
    /// Builds a graph from already parsed parts, checking the parent links.
    pub fn from_parts(
        project: ProjectInfo,
        disciplines: Vec<DisciplineDef>,
        drawings: IndexMap<String, Drawing>,
        revisions: IndexMap<String, DisciplineMap>,
    ) -> Result<Self, LoadError> {
        for drawing in drawings.values() {
            if let Some(parent) = &drawing.parent
                && !drawings.contains_key(parent)
            {
                return Err(LoadError::UnknownParent {
                    drawing: drawing.id.clone(),
                    parent: parent.clone(),
                });
            }
        }
        for id in drawings.keys() {
            // A walk longer than the drawing count must revisit a node.
            let mut steps = 0;
            let mut cursor = drawings.get(id).and_then(|d| d.parent.as_deref());
            while let Some(parent) = cursor {
                steps += 1;
                if steps > drawings.len() {
                    return Err(LoadError::ParentCycle {
                        drawing: id.clone(),
                    });
                }
                cursor = drawings.get(parent).and_then(|d| d.parent.as_deref());
            }
        }
        Ok(Self {
            project,
            disciplines,
            drawings,
            revisions,
        })
    }

    /// Project name and unit.
    #[must_use]
    pub fn project(&self) -> &ProjectInfo {
        &self.project
    }

    /// Disciplines declared by the project.
    #[must_use]
    pub fn disciplines(&self) -> &[DisciplineDef] {
        &self.disciplines
    }

    /// All drawings in storage order.
    pub fn drawings(&self) -> impl Iterator<Item = &Drawing> {
        self.drawings.values()
    }

    /// Number of drawings.
    #[must_use]
    pub fn drawing_count(&self) -> usize {
        self.drawings.len()
    }

    /// Looks up a drawing.
    #[must_use]
    pub fn drawing(&self, id: &str) -> Option<&Drawing> {
        self.drawings.get(id)
    }

    /// Discipline entries of every drawing, in storage order.
    pub fn entries_by_drawing(&self) -> impl Iterator<Item = (&str, &DisciplineMap)> {
        self.revisions.iter().map(|(id, map)| (id.as_str(), map))
    }

    /// All discipline entries of a drawing.
    #[must_use]
    pub fn entries(&self, drawing: &str) -> Option<&DisciplineMap> {
        self.revisions.get(drawing)
    }

    /// One discipline entry.
    #[must_use]
    pub fn entry(&self, drawing: &str, key: &str) -> Option<&DisciplineEntry> {
        self.revisions.get(drawing)?.get(key)
    }

    /// The first top-level discipline key of a drawing in storage order.
    #[must_use]
    pub fn default_discipline(&self, drawing: &str) -> Option<&str> {
        self.entries(drawing)?
            .keys()
            .map(String::as_str)
            .find(|k| !is_region_key(k))
    }

    /// Ancestors of `drawing` from the root down, ending with `drawing` itself.
    ///
    /// Unknown ids yield just the id.
    #[must_use]
    pub fn breadcrumb<'a>(&'a self, drawing: &'a str) -> Vec<&'a str> {
        let mut path = Vec::new();
        let mut cursor = Some(drawing);
        while let Some(id) = cursor {
            path.push(id);
            cursor = self.drawings.get(id).and_then(|d| d.parent.as_deref());
        }
        path.reverse();
        path
    }

    /// Number of discipline entries across all drawings.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.revisions.values().map(IndexMap::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::ProjectGraph;
    use crate::{DisciplineEntry, Drawing, LoadError, ProjectInfo};

    fn drawing(id: &str, parent: Option<&str>) -> (String, Drawing) {
        (
            id.to_owned(),
            Drawing {
                id: id.to_owned(),
                name: id.to_owned(),
                parent: parent.map(str::to_owned),
                position: None,
                order: 0,
            },
        )
    }

    #[test]
    fn rejects_unknown_parent() {
        let drawings = IndexMap::from([drawing("00", None), drawing("01", Some("99"))]);
        let err = ProjectGraph::from_parts(ProjectInfo::default(), vec![], drawings, IndexMap::new())
            .unwrap_err();
        assert!(
            matches!(err, LoadError::UnknownParent { ref drawing, ref parent } if drawing == "01" && parent == "99"),
            "got {err:?}"
        );
    }

    #[test]
    fn rejects_cycles() {
        let drawings = IndexMap::from([drawing("a", Some("b")), drawing("b", Some("a"))]);
        let err = ProjectGraph::from_parts(ProjectInfo::default(), vec![], drawings, IndexMap::new())
            .unwrap_err();
        assert!(matches!(err, LoadError::ParentCycle { .. }), "got {err:?}");
    }

    #[test]
    fn breadcrumb_and_default_discipline() {
        let drawings = IndexMap::from([
            drawing("00", None),
            drawing("01", Some("00")),
            drawing("01-1", Some("01")),
        ]);
        let disciplines = IndexMap::from([
            ("구조.A".to_owned(), DisciplineEntry::default()),
            ("구조".to_owned(), DisciplineEntry::default()),
            ("건축".to_owned(), DisciplineEntry::default()),
        ]);
        let revisions = IndexMap::from([("01-1".to_owned(), disciplines)]);
        let graph =
            ProjectGraph::from_parts(ProjectInfo::default(), vec![], drawings, revisions).unwrap();
        assert_eq!(graph.breadcrumb("01-1"), ["00", "01", "01-1"], "root first");
        assert_eq!(graph.default_discipline("01-1"), Some("구조"), "region keys skipped");
        assert_eq!(graph.default_discipline("00"), None, "no disciplines");
        assert_eq!(graph.entry_count(), 3, "three entries");
    }
}
