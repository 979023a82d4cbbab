// Copyright 2026 the Trestle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trestle CLI library
//!
//! The headless front end of the Trestle viewer: it loads a project from its
//! JSON files, composites one drawing with the CPU backend, and writes the
//! result as a PNG.
//!
//! - `trestle single` draws one discipline (optionally one revision) clipped
//!   to its footprint polygon.
//! - `trestle overlay` registers several disciplines on a shared frame with
//!   per-layer opacity.
//! - `trestle list` prints a drawing's disciplines and revisions.

mod args;
mod config;
mod error;
mod render;

pub use args::{Args, Command, OverlayArgs, SingleArgs, SurfaceArgs, TargetArgs};
pub use config::{RenderConfig, load_config, parse_config};
pub use error::CliError;
pub use render::{
    describe_drawing, load_graph, parse_layer, render_overlay, render_single, write_png,
};

use log::info;

/// Run the Trestle CLI application
///
/// Loads the configuration, then executes the selected subcommand.
///
/// # Errors
///
/// Returns [`CliError`] for:
/// - Configuration loading errors
/// - Project loading errors
/// - Invalid command-line values
/// - PNG writing errors
pub fn run(args: &Args) -> Result<(), CliError> {
    let config = load_config(args.config.as_ref())?;

    match &args.command {
        Command::Single(single) => {
            info!(
                data = single.target.data.display().to_string(),
                drawing = single.target.drawing;
                "Processing single view"
            );
            render_single(single, &config)?;
        }
        Command::Overlay(overlay) => {
            info!(
                data = overlay.target.data.display().to_string(),
                drawing = overlay.target.drawing;
                "Processing overlay"
            );
            render_overlay(overlay, &config)?;
        }
        Command::List(target) => {
            let graph = load_graph(target)?;
            print!("{}", describe_drawing(&graph, &target.drawing)?);
        }
    }

    Ok(())
}
