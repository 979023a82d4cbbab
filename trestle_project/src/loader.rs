// Copyright 2026 the Trestle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::info;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::{DisciplineDef, DisciplineMap, Drawing, ProjectGraph, ProjectInfo};

/// File holding project info and discipline definitions.
pub const PROJECT_FILE: &str = "project.json";
/// File holding the drawing hierarchy.
pub const DRAWINGS_FILE: &str = "drawings.json";
/// File holding per-drawing discipline and revision data.
pub const REVISIONS_FILE: &str = "discipline_revisions.json";

/// Errors raised while loading a project graph.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A data file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// A data file is not valid JSON for its schema.
    #[error("failed to parse {}: {source}", path.display())]
    Json {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },
    /// A drawing names a parent that does not exist.
    #[error("drawing `{drawing}` has unknown parent `{parent}`")]
    UnknownParent {
        /// The child drawing.
        drawing: String,
        /// The missing parent id.
        parent: String,
    },
    /// Following parent links from a drawing never reaches a root.
    #[error("drawing `{drawing}` is part of a parent cycle")]
    ParentCycle {
        /// A drawing on or leading into the cycle.
        drawing: String,
    },
}

#[derive(Deserialize)]
struct ProjectFile {
    project: ProjectInfo,
    #[serde(default)]
    disciplines: Vec<DisciplineDef>,
}

#[derive(Deserialize)]
struct DrawingsFile {
    drawings: IndexMap<String, Drawing>,
}

type RevisionsFile = IndexMap<String, DisciplineMap>;

/// Loads a project graph from the three JSON files in `dir`.
pub fn load_dir(dir: impl AsRef<Path>) -> Result<ProjectGraph, LoadError> {
    let dir = dir.as_ref();
    let project: ProjectFile = read_json(&dir.join(PROJECT_FILE))?;
    let drawings: DrawingsFile = read_json(&dir.join(DRAWINGS_FILE))?;
    let revisions: RevisionsFile = read_json(&dir.join(REVISIONS_FILE))?;
    build(project, drawings, revisions)
}

/// Loads a project graph from the contents of the three JSON files.
pub fn load_str(project: &str, drawings: &str, revisions: &str) -> Result<ProjectGraph, LoadError> {
    let project = parse_json(project, Path::new(PROJECT_FILE))?;
    let drawings = parse_json(drawings, Path::new(DRAWINGS_FILE))?;
    let revisions = parse_json(revisions, Path::new(REVISIONS_FILE))?;
    build(project, drawings, revisions)
}

fn build(
    project: ProjectFile,
    drawings: DrawingsFile,
    revisions: RevisionsFile,
) -> Result<ProjectGraph, LoadError> {
    let graph = ProjectGraph::from_parts(
        project.project,
        project.disciplines,
        drawings.drawings,
        revisions,
    )?;
    info!(
        project = graph.project().name.as_str(),
        drawings = graph.drawing_count(),
        entries = graph.entry_count();
        "Loaded project graph"
    );
    Ok(graph)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_owned(),
        source,
    })?;
    parse_json(&text, path)
}

fn parse_json<T: DeserializeOwned>(text: &str, path: &Path) -> Result<T, LoadError> {
    serde_json::from_str(text).map_err(|source| LoadError::Json {
        path: path.to_owned(),
        source,
    })
}
