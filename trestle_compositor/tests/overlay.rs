// Copyright 2026 the Trestle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlays resolved from a project and rasterized with `vello_cpu`.

use kurbo::{Point, Size};
use trestle_compositor::{
    CompositeLayer, CompositorOptions, DrawMode, LayerCompositor, MemoryImageSource,
    PassScheduler, RasterImage, overlay_layers,
};
use trestle_geometry::{FitOptions, Similarity};
use trestle_imaging::Color;
use trestle_imaging_ref::RefBackend;
use trestle_imaging_vello_cpu::render_rgba8;
use trestle_project::{OverlayDefaults, catalog, load_str};

const SIZE: u16 = 100;

fn pixel(bytes: &[u8], x: usize, y: usize) -> [u8; 4] {
    let i = (y * usize::from(SIZE) + x) * 4;
    [bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]
}

fn half(x0: f64) -> Vec<Point> {
    vec![
        Point::new(x0, 0.0),
        Point::new(x0 + 5.0, 0.0),
        Point::new(x0 + 5.0, 10.0),
        Point::new(x0, 10.0),
    ]
}

#[test]
fn footprints_clip_each_layer() {
    let source = MemoryImageSource::new()
        .with("red.png", RasterImage::solid(10, 10, [255, 0, 0, 255]))
        .with("blue.png", RasterImage::solid(10, 10, [0, 0, 255, 255]));
    let options = CompositorOptions {
        fit: FitOptions {
            padding_fraction: 0.0,
            ..FitOptions::default()
        },
        background: Some(Color::WHITE),
    };
    let compositor = LayerCompositor::new(source, options);
    // Both images cover the whole 10x10 reference square; the footprints
    // split it into a left and a right half.
    let layers = [
        CompositeLayer::new("red.png", Similarity::IDENTITY).with_polygon(half(0.0)),
        CompositeLayer::new("blue.png", Similarity::IDENTITY).with_polygon(half(5.0)),
    ];
    let token = PassScheduler::new().begin();

    let mut report = None;
    let bytes = render_rgba8(SIZE, SIZE, |backend| {
        let outcome = pollster::block_on(compositor.render_overlay(
            backend,
            &layers,
            Size::new(100.0, 100.0),
            &token,
        ));
        report = outcome.report().cloned();
    });

    let report = report.unwrap();
    assert_eq!(report.mode, DrawMode::Registered, "registered");
    assert_eq!(report.frame.unwrap().scale(), 10.0, "10x10 square fills 100x100");
    assert_eq!(pixel(&bytes, 20, 50), [255, 0, 0, 255], "left half is red");
    assert_eq!(pixel(&bytes, 80, 50), [0, 0, 255, 255], "right half is blue");
}

#[test]
fn translucent_layer_shows_background() {
    let source = MemoryImageSource::new().with("black.png", RasterImage::solid(2, 2, [0, 0, 0, 255]));
    let options = CompositorOptions {
        background: Some(Color::WHITE),
        ..CompositorOptions::default()
    };
    let compositor = LayerCompositor::new(source, options);
    let layers = [CompositeLayer::new("black.png", Similarity::IDENTITY)
        .with_polygon(vec![
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(2.0, 2.0),
            Point::new(0.0, 2.0),
        ])
        .with_opacity(0.5)];
    let token = PassScheduler::new().begin();

    let bytes = render_rgba8(SIZE, SIZE, |backend| {
        pollster::block_on(compositor.render_overlay(
            backend,
            &layers,
            Size::new(100.0, 100.0),
            &token,
        ));
    });

    // Scale is capped at 10, so the 2x2 square covers 2..22 after padding.
    let [r, _, _, a] = pixel(&bytes, 10, 10);
    assert_eq!(a, 255, "opaque over the background");
    assert!((120..=136).contains(&r), "half black over white, got {r}");
    assert_eq!(pixel(&bytes, 60, 60), [255, 255, 255, 255], "outside the capped footprint");
}

const PROJECT: &str = r#"{ "project": { "name": "Tower", "unit": "mm" } }"#;
const DRAWINGS: &str =
    r#"{ "drawings": { "01": { "id": "01", "name": "L1", "parent": null, "order": 0 } } }"#;
const REVISIONS: &str = r#"{ "01": {
    "건축": { "revisions": [
        {
            "version": "R1", "image": "arch_r1.png", "date": "2024-01-01",
            "imageTransform": { "x": 0, "y": 0, "scale": 1, "rotation": 0 },
            "polygon": { "vertices": [[0, 0], [10, 0], [10, 10], [0, 10]] }
        },
        {
            "version": "R2", "image": "arch_r2.png", "date": "2024-03-01",
            "imageTransform": { "x": 0, "y": 0, "scale": 0.5, "rotation": 0 },
            "polygon": { "vertices": [[0, 0], [20, 0], [20, 20], [0, 20]] }
        }
    ] },
    "구조": {
        "image": "struct.png",
        "imageTransform": { "x": 5, "y": 5, "scale": 1, "rotation": 0 },
        "polygon": { "vertices": [[0, 0], [10, 0], [10, 10], [0, 10]] }
    }
} }"#;

#[test]
fn initial_layers_draw_latest_primary_only() {
    let graph = load_str(PROJECT, DRAWINGS, REVISIONS).unwrap();
    let specs = catalog::initial_overlay_layers(&graph, "01", &OverlayDefaults::default());
    let layers = overlay_layers(&graph, "01", &specs);
    assert_eq!(layers.len(), 1, "only the primary discipline is visible");
    assert_eq!(layers[0].image, "arch_r2.png", "latest revision");

    let source = MemoryImageSource::new()
        .with("arch_r2.png", RasterImage::solid(20, 20, [0, 0, 0, 255]))
        .with("struct.png", RasterImage::solid(10, 10, [0, 0, 0, 255]));
    let compositor = LayerCompositor::new(source, CompositorOptions::default());
    let token = PassScheduler::new().begin();
    let mut backend = RefBackend::default();
    let outcome = pollster::block_on(compositor.render_overlay(
        &mut backend,
        &layers,
        Size::new(400.0, 400.0),
        &token,
    ));
    let frame = outcome.report().unwrap().frame.unwrap();
    assert_eq!(frame.bounds().max_x(), 10.0, "R2 footprint halved by its placement");
}

#[test]
fn all_layers_share_the_frame_when_shown() {
    let graph = load_str(PROJECT, DRAWINGS, REVISIONS).unwrap();
    let mut specs = catalog::initial_overlay_layers(&graph, "01", &OverlayDefaults::default());
    for spec in &mut specs {
        spec.visible = true;
    }
    let layers = overlay_layers(&graph, "01", &specs);
    assert_eq!(layers.len(), 2, "both disciplines");

    let source = MemoryImageSource::new()
        .with("arch_r2.png", RasterImage::solid(20, 20, [0, 0, 0, 255]))
        .with("struct.png", RasterImage::solid(10, 10, [0, 0, 0, 255]));
    let compositor = LayerCompositor::new(source, CompositorOptions::default());
    let token = PassScheduler::new().begin();
    let mut backend = RefBackend::default();
    let outcome = pollster::block_on(compositor.render_overlay(
        &mut backend,
        &layers,
        Size::new(400.0, 400.0),
        &token,
    ));
    let frame = outcome.report().unwrap().frame.unwrap();
    assert_eq!(frame.bounds().max_x(), 15.0, "structure footprint is offset by 5");
    assert_eq!(outcome.report().unwrap().drawn, 2, "both drawn");
}
