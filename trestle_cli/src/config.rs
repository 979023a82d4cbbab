// Copyright 2026 the Trestle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Configuration file loading for the CLI
//!
//! This module finds and loads the TOML configuration file from an explicit
//! path, the local directory, or the platform config directory.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use log::{debug, info};
use serde::Deserialize;
use trestle_compositor::CompositorOptions;
use trestle_geometry::FitOptions;
use trestle_imaging::Color;
use trestle_project::OverlayDefaults;

use crate::CliError;

/// Rendering configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    render: RenderSection,
    data: DataSection,
    overlay: OverlaySection,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
struct RenderSection {
    width: u16,
    height: u16,
    padding_fraction: f64,
    max_scale: f64,
    background: Option<String>,
}

impl Default for RenderSection {
    fn default() -> Self {
        let fit = FitOptions::default();
        Self {
            width: 1024,
            height: 768,
            padding_fraction: fit.padding_fraction,
            max_scale: fit.max_scale,
            background: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
struct DataSection {
    drawings_dir: PathBuf,
}

impl Default for DataSection {
    fn default() -> Self {
        Self {
            drawings_dir: PathBuf::from("drawings"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
struct OverlaySection {
    primary_discipline: String,
    primary_opacity: f64,
    secondary_opacity: f64,
}

impl Default for OverlaySection {
    fn default() -> Self {
        let defaults = OverlayDefaults::default();
        Self {
            primary_discipline: defaults.primary_discipline,
            primary_opacity: defaults.primary_opacity,
            secondary_opacity: defaults.secondary_opacity,
        }
    }
}

impl RenderConfig {
    /// Surface width in pixels.
    pub fn width(&self) -> u16 {
        self.render.width
    }

    /// Surface height in pixels.
    pub fn height(&self) -> u16 {
        self.render.height
    }

    /// Directory holding the raster images, relative to the data directory
    /// unless absolute.
    pub fn drawings_dir(&self) -> &Path {
        &self.data.drawings_dir
    }

    /// Fitting parameters for the shared frame.
    pub fn fit_options(&self) -> FitOptions {
        FitOptions {
            padding_fraction: self.render.padding_fraction,
            max_scale: self.render.max_scale,
            ..FitOptions::default()
        }
    }

    /// Parsed background color.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Config`] unless the color is `#rrggbb`.
    pub fn background(&self) -> Result<Option<Color>, CliError> {
        self.render
            .background
            .as_deref()
            .map(parse_hex_color)
            .transpose()
    }

    /// Compositor options derived from the `[render]` section.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Config`] for an invalid background color.
    pub fn compositor_options(&self) -> Result<CompositorOptions, CliError> {
        Ok(CompositorOptions {
            fit: self.fit_options(),
            background: self.background()?,
        })
    }

    /// Initial overlay layer defaults.
    pub fn overlay_defaults(&self) -> OverlayDefaults {
        OverlayDefaults {
            primary_discipline: self.overlay.primary_discipline.clone(),
            primary_opacity: self.overlay.primary_opacity,
            secondary_opacity: self.overlay.secondary_opacity,
        }
    }
}

fn parse_hex_color(raw: &str) -> Result<Color, CliError> {
    let invalid = || CliError::Config(format!("background `{raw}` is not a #rrggbb color"));
    let hex = raw.strip_prefix('#').ok_or_else(invalid)?;
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    Ok(Color::from_rgb8(channel(0)?, channel(2)?, channel(4)?))
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (trestle/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<RenderConfig, CliError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("trestle/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "trestle", "trestle") {
        let system_config = proj_dirs.config_dir().join("config.toml");
        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }
        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(RenderConfig::default())
}

fn load_config_file(path: impl AsRef<Path>) -> Result<RenderConfig, CliError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(CliError::Config(format!(
            "missing configuration file {}",
            path.display()
        )));
    }
    let content = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

/// Parses a configuration file's contents.
///
/// # Errors
///
/// Returns [`CliError::Config`] for invalid TOML or unknown value types.
pub fn parse_config(content: &str) -> Result<RenderConfig, CliError> {
    let config: RenderConfig =
        toml::from_str(content).map_err(|e| CliError::Config(e.to_string()))?;
    config.background()?;
    Ok(config)
}
