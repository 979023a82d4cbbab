// Copyright 2026 the Trestle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The CLI subcommands.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use kurbo::Size;
use log::info;
use png::{BitDepth, ColorType, Encoder};
use trestle_compositor::{
    LayerCompositor, PassScheduler, PngDirectorySource, RenderOutcome, overlay_layers,
};
use trestle_imaging_vello_cpu::render_rgba8;
use trestle_project::{
    BASE_LABEL, OverlayDefaults, OverlayLayerSpec, ProjectGraph, Selection, by_recency, catalog,
    latest, load_dir, resolve_polygon, resolve_selection,
};

use crate::{CliError, OverlayArgs, RenderConfig, SingleArgs, SurfaceArgs, TargetArgs};

/// Renders `trestle single` and writes the PNG.
///
/// # Errors
///
/// Fails when the project cannot be loaded, nothing resolves for the
/// selection, or the output cannot be written.
pub fn render_single(args: &SingleArgs, config: &RenderConfig) -> Result<RenderOutcome, CliError> {
    let graph = load_graph(&args.target)?;
    let drawing = args.target.drawing.as_str();

    let mut selection = Selection::drawing(drawing);
    if let Some(key) = &args.discipline {
        selection = selection.with_discipline(key);
    }
    if let Some(version) = &args.revision {
        selection = selection.with_revision(version);
    }
    let Some(image) = resolve_selection(&graph, &selection) else {
        let discipline = selection
            .discipline_key
            .as_deref()
            .or_else(|| graph.default_discipline(drawing))
            .unwrap_or_default();
        return Err(CliError::Unresolved {
            drawing: drawing.to_owned(),
            discipline: discipline.to_owned(),
        });
    };
    let polygon = resolve_polygon(&graph, &selection);
    info!(
        drawing = drawing,
        discipline = image.discipline_key.as_str(),
        image = image.image.as_str(),
        footprint = polygon.is_some();
        "Rendering single view"
    );

    let compositor = LayerCompositor::new(
        image_source(&args.target, config),
        config.compositor_options()?,
    );
    let (width, height) = surface_size(&args.surface, config)?;
    let token = PassScheduler::new().begin();
    let mut outcome = RenderOutcome::Superseded;
    let pixels = render_rgba8(width, height, |backend| {
        outcome = pollster::block_on(compositor.render_single(
            backend,
            &image,
            polygon.as_ref(),
            viewport(width, height),
            &token,
        ));
    });
    write_png(&args.surface.output, width, height, &pixels)?;
    log_outcome(&outcome, &args.surface.output);
    Ok(outcome)
}

/// Renders `trestle overlay` and writes the PNG.
///
/// # Errors
///
/// Fails when the project cannot be loaded, a `--layer` value is malformed,
/// or the output cannot be written.
pub fn render_overlay(
    args: &OverlayArgs,
    config: &RenderConfig,
) -> Result<RenderOutcome, CliError> {
    let graph = load_graph(&args.target)?;
    let drawing = args.target.drawing.as_str();
    let defaults = config.overlay_defaults();

    let specs = if args.layers.is_empty() {
        catalog::initial_overlay_layers(&graph, drawing, &defaults)
    } else {
        args.layers
            .iter()
            .map(|raw| parse_layer(raw, &graph, drawing, &defaults))
            .collect::<Result<Vec<_>, _>>()?
    };
    let layers = overlay_layers(&graph, drawing, &specs);
    info!(drawing = drawing, layers = layers.len(); "Rendering overlay");

    let compositor = LayerCompositor::new(
        image_source(&args.target, config),
        config.compositor_options()?,
    );
    let (width, height) = surface_size(&args.surface, config)?;
    let token = PassScheduler::new().begin();
    let mut outcome = RenderOutcome::Superseded;
    let pixels = render_rgba8(width, height, |backend| {
        outcome = pollster::block_on(compositor.render_overlay(
            backend,
            &layers,
            viewport(width, height),
            &token,
        ));
    });
    write_png(&args.surface.output, width, height, &pixels)?;
    log_outcome(&outcome, &args.surface.output);
    Ok(outcome)
}

/// Describes a drawing's disciplines and revisions for `trestle list`.
///
/// # Errors
///
/// Returns [`CliError::Usage`] for an unknown drawing.
pub fn describe_drawing(graph: &ProjectGraph, drawing: &str) -> Result<String, CliError> {
    let Some(node) = graph.drawing(drawing) else {
        return Err(CliError::Usage(format!("unknown drawing `{drawing}`")));
    };
    let path: Vec<&str> = graph
        .breadcrumb(drawing)
        .into_iter()
        .map(|id| graph.drawing(id).map_or(id, |d| d.name.as_str()))
        .collect();

    let mut lines = vec![
        format!("{} ({})", node.name, node.id),
        format!("  {}", path.join(" > ")),
    ];
    for option in catalog::discipline_options(graph, drawing) {
        if option.label == option.key {
            lines.push(option.key.to_owned());
        } else {
            lines.push(format!("{} ({})", option.key, option.label));
        }
        if let Some(image) = graph
            .entry(drawing, option.key)
            .and_then(|e| e.image.as_deref())
        {
            lines.push(format!("  {BASE_LABEL}  {image}"));
        }
        let newest = latest(option.revisions).map(|r| r.version.as_str());
        for rev in by_recency(option.revisions) {
            let marker = if newest == Some(rev.version.as_str()) {
                "  (latest)"
            } else {
                ""
            };
            lines.push(format!("  {}  {}  {}{marker}", rev.version, rev.date, rev.image));
        }
        if option.has_regions() {
            lines.push(format!("  regions: {}", option.region_keys.join(", ")));
        }
    }
    lines.push(String::new());
    Ok(lines.join("\n"))
}

/// Parses a `--layer` value: `<key>[@<version>][=<opacity>]`.
///
/// Without an opacity, the primary discipline gets the primary opacity and
/// every other discipline the secondary one.
///
/// # Errors
///
/// Returns [`CliError::Usage`] for an empty key, an empty version, or an
/// opacity outside `[0, 1]`.
pub fn parse_layer(
    raw: &str,
    graph: &ProjectGraph,
    drawing: &str,
    defaults: &OverlayDefaults,
) -> Result<OverlayLayerSpec, CliError> {
    let usage = |why: &str| CliError::Usage(format!("layer `{raw}`: {why}"));

    let (rest, opacity) = match raw.rsplit_once('=') {
        Some((rest, value)) => {
            let opacity: f64 = value
                .trim()
                .parse()
                .map_err(|_| usage("opacity is not a number"))?;
            if !(0.0..=1.0).contains(&opacity) {
                return Err(usage("opacity must be within [0, 1]"));
            }
            (rest, Some(opacity))
        }
        None => (raw, None),
    };
    let (key, version) = match rest.split_once('@') {
        Some((_, "")) => return Err(usage("empty revision after `@`")),
        Some((key, version)) => (key, Some(version)),
        None => (rest, None),
    };
    if key.is_empty() {
        return Err(usage("missing discipline key"));
    }

    let opacity = opacity.unwrap_or(if key == defaults.primary_discipline {
        defaults.primary_opacity
    } else {
        defaults.secondary_opacity
    });
    let label = graph
        .entry(drawing, key)
        .map_or(key, |e| e.label(key))
        .to_owned();
    Ok(OverlayLayerSpec {
        discipline_key: key.to_owned(),
        label,
        revision_version: version.map(str::to_owned),
        opacity,
        visible: true,
    })
}

/// Loads the project named by `target`.
///
/// # Errors
///
/// Returns [`CliError::Load`] when the project files cannot be read.
pub fn load_graph(target: &TargetArgs) -> Result<ProjectGraph, CliError> {
    Ok(load_dir(&target.data)?)
}

fn image_source(target: &TargetArgs, config: &RenderConfig) -> PngDirectorySource {
    PngDirectorySource::new(target.data.join(config.drawings_dir()))
}

fn surface_size(surface: &SurfaceArgs, config: &RenderConfig) -> Result<(u16, u16), CliError> {
    let width = surface.width.unwrap_or(config.width());
    let height = surface.height.unwrap_or(config.height());
    if width == 0 || height == 0 {
        return Err(CliError::Usage(format!(
            "surface size {width}x{height} is empty"
        )));
    }
    Ok((width, height))
}

fn viewport(width: u16, height: u16) -> Size {
    Size::new(f64::from(width), f64::from(height))
}

fn log_outcome(outcome: &RenderOutcome, output: &Path) {
    if let Some(report) = outcome.report() {
        info!(
            output = output.display().to_string(),
            mode:? = report.mode,
            drawn = report.drawn,
            skipped = report.skipped.len();
            "PNG written"
        );
    }
}

/// Writes straight-alpha RGBA8 rows as a PNG.
///
/// # Errors
///
/// Returns [`CliError::Io`] or [`CliError::Encode`] when writing fails.
pub fn write_png(path: &Path, width: u16, height: u16, pixels: &[u8]) -> Result<(), CliError> {
    let file = File::create(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut encoder = Encoder::new(BufWriter::new(file), u32::from(width), u32::from(height));
    encoder.set_color(ColorType::Rgba);
    encoder.set_depth(BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(pixels)?;
    writer.finish()?;
    Ok(())
}
