// Copyright 2026 the Trestle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Command-line argument definitions for the Trestle CLI.
//!
//! [`Args`] is parsed with [`clap`]. Every subcommand reads a project from a
//! data directory; the render subcommands write a PNG.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

/// Command-line arguments for the Trestle renderer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// What to do
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render one discipline of a drawing, clipped to its footprint
    Single(SingleArgs),
    /// Render several disciplines of a drawing registered on top of each other
    Overlay(OverlayArgs),
    /// List the disciplines and revisions of a drawing
    List(TargetArgs),
}

/// Which project and drawing to work on.
#[derive(ClapArgs, Debug, Clone)]
pub struct TargetArgs {
    /// Directory holding project.json, drawings.json and discipline_revisions.json
    #[arg(long)]
    pub data: PathBuf,

    /// Drawing id
    #[arg(long)]
    pub drawing: String,
}

/// Output surface.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct SurfaceArgs {
    /// Path to the output PNG file
    #[arg(short, long, default_value = "out.png")]
    pub output: PathBuf,

    /// Surface width in pixels, overriding the configuration
    #[arg(long)]
    pub width: Option<u16>,

    /// Surface height in pixels, overriding the configuration
    #[arg(long)]
    pub height: Option<u16>,
}

/// Arguments of `trestle single`.
#[derive(ClapArgs, Debug, Clone)]
pub struct SingleArgs {
    /// Project and drawing
    #[command(flatten)]
    pub target: TargetArgs,

    /// Discipline key; defaults to the drawing's first discipline
    #[arg(long)]
    pub discipline: Option<String>,

    /// Revision version; defaults to the base selection
    #[arg(long)]
    pub revision: Option<String>,

    /// Output surface
    #[command(flatten)]
    pub surface: SurfaceArgs,
}

/// Arguments of `trestle overlay`.
#[derive(ClapArgs, Debug, Clone)]
pub struct OverlayArgs {
    /// Project and drawing
    #[command(flatten)]
    pub target: TargetArgs,

    /// Layer as `<key>[@<version>][=<opacity>]`, repeatable, drawn in order.
    /// Without any, the primary discipline's latest revision is drawn.
    #[arg(long = "layer", value_name = "LAYER")]
    pub layers: Vec<String>,

    /// Output surface
    #[command(flatten)]
    pub surface: SurfaceArgs,
}
