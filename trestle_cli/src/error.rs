// Copyright 2026 the Trestle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use trestle_project::LoadError;

/// Everything that can stop the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// The project could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The configuration file is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading or writing a file failed.
    #[error("Failed to access `{path}`")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The output PNG could not be encoded.
    #[error("Failed to encode PNG")]
    Encode(#[from] png::EncodingError),

    /// A command-line value could not be understood.
    #[error("Invalid argument: {0}")]
    Usage(String),

    /// The selection names nothing that can be drawn.
    #[error("Nothing to draw for discipline `{discipline}` of drawing `{drawing}`")]
    Unresolved {
        /// Requested drawing.
        drawing: String,
        /// Requested discipline, or the drawing's default one.
        discipline: String,
    },
}
