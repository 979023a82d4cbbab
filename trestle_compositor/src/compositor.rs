// Copyright 2026 the Trestle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::iter;

use futures::future::join_all;
use kurbo::{Affine, Point, Rect, Size};
use log::{debug, warn};
use trestle_geometry::{FitOptions, ReferenceFrame, bounding_box_of, is_valid_polygon, rectify};
use trestle_imaging::{
    Color, DrawOp, ImageSampler, ImagingBackend, ImagingBackendExt, PathDesc, StateOp,
};
use trestle_project::{ResolvedImage, ResolvedPolygon};

use crate::{CompositeLayer, ImageCache, ImageLoadError, PassState, PassToken, RasterImage};

/// Presentation parameters shared by every pass.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct CompositorOptions {
    /// How the shared reference frame is fitted into the viewport.
    pub fit: FitOptions,
    /// Fill drawn under all layers. `None` leaves the surface as is.
    pub background: Option<Color>,
}

/// How a pass ended up drawing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DrawMode {
    /// Every layer was clipped to its footprint in one shared frame.
    Registered,
    /// Some layer had no usable footprint, so each image was centered and
    /// fitted on its own.
    Unregistered,
    /// A single image without a footprint, drawn unclipped.
    Plain,
    /// There was nothing to draw.
    Empty,
}

/// What a finished pass drew.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawReport {
    /// Drawing mode of the pass.
    pub mode: DrawMode,
    /// Number of layers drawn.
    pub drawn: usize,
    /// Image URLs of layers skipped because their image did not load.
    pub skipped: Vec<String>,
    /// The shared frame, for registered passes.
    pub frame: Option<ReferenceFrame>,
}

impl DrawReport {
    fn new(mode: DrawMode, frame: Option<ReferenceFrame>) -> Self {
        Self {
            mode,
            drawn: 0,
            skipped: Vec::new(),
            frame,
        }
    }
}

/// Result of a render pass.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderOutcome {
    /// The pass drew.
    Drawn(DrawReport),
    /// A newer pass started while this one was waiting; nothing was drawn.
    Superseded,
}

impl RenderOutcome {
    /// The draw report, unless the pass was superseded.
    pub fn report(&self) -> Option<&DrawReport> {
        match self {
            Self::Drawn(report) => Some(report),
            Self::Superseded => None,
        }
    }

    /// Whether the pass was superseded.
    pub fn is_superseded(&self) -> bool {
        matches!(self, Self::Superseded)
    }
}

/// Draws raster layers into one reference frame.
///
/// A pass first waits for every image it needs, so the shared scale is
/// computed once and does not jitter as images arrive. Each distinct URL is
/// requested once per pass; successfully loaded images are kept for later
/// passes. Before drawing, the pass checks that its [`PassToken`] is still
/// current and draws nothing otherwise.
#[derive(Debug)]
pub struct LayerCompositor<C> {
    cache: C,
    options: CompositorOptions,
    images: RefCell<HashMap<String, RasterImage>>,
    state: Cell<PassState>,
}

impl<C: ImageCache> LayerCompositor<C> {
    /// A compositor loading images from `cache`.
    pub fn new(cache: C, options: CompositorOptions) -> Self {
        Self {
            cache,
            options,
            images: RefCell::new(HashMap::new()),
            state: Cell::new(PassState::Idle),
        }
    }

    /// The presentation options.
    pub fn options(&self) -> &CompositorOptions {
        &self.options
    }

    /// Replaces the presentation options for later passes.
    pub fn set_options(&mut self, options: CompositorOptions) {
        self.options = options;
    }

    /// The image source.
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Lifecycle state of the most recent pass.
    pub fn state(&self) -> PassState {
        self.state.get()
    }

    /// Number of images kept from earlier passes.
    pub fn cached_images(&self) -> usize {
        self.images.borrow().len()
    }

    /// Forgets every loaded image.
    pub fn clear_cache(&self) {
        self.images.borrow_mut().clear();
    }

    /// Draws an overlay of `layers`, in order, into a `viewport`-sized surface.
    ///
    /// When every layer has a footprint, all footprints are fitted into one
    /// frame and each layer is clipped to its own. Otherwise every image is
    /// centered and fitted on its own, unclipped. Layers whose image fails to
    /// load are skipped.
    pub async fn render_overlay<B: ImagingBackend + ?Sized>(
        &self,
        backend: &mut B,
        layers: &[CompositeLayer],
        viewport: Size,
        token: &PassToken,
    ) -> RenderOutcome {
        self.enter(token, PassState::AwaitingImages);
        let images = self
            .load(layers.iter().map(|l| l.image.as_str()), token)
            .await;
        if !token.is_current() {
            return superseded(token);
        }

        self.enter(token, PassState::Fitting);
        let registered = layers.iter().all(|l| l.valid_polygon().is_some());
        let (mode, frame) = if layers.is_empty() {
            (DrawMode::Empty, None)
        } else if registered {
            let vertices = layers
                .iter()
                .filter_map(CompositeLayer::valid_polygon)
                .flatten()
                .copied();
            let bounds = bounding_box_of(vertices);
            let frame = ReferenceFrame::fit_rect(bounds, viewport, self.options.fit);
            (DrawMode::Registered, Some(frame))
        } else {
            debug!(layers = layers.len(); "Overlay has layers without footprints, drawing unregistered");
            (DrawMode::Unregistered, None)
        };

        self.enter(token, PassState::Drawing);
        self.draw_background(backend, viewport);
        let mut report = DrawReport::new(mode, frame);
        for layer in layers {
            let Some(image) = images.get(&layer.image) else {
                report.skipped.push(layer.image.clone());
                continue;
            };
            match (&frame, layer.valid_polygon()) {
                (Some(frame), Some(polygon)) => draw_clipped(
                    backend,
                    image,
                    polygon,
                    layer.placement.to_affine(),
                    frame,
                    layer.opacity,
                ),
                _ => draw_centered(backend, image, viewport, layer.opacity),
            }
            report.drawn += 1;
        }
        backend.state(StateOp::SetTransform(Affine::IDENTITY));
        RenderOutcome::Drawn(report)
    }

    /// Draws one resolved image, clipped to its footprint when it has one.
    ///
    /// When the footprint was authored against a different raster, both
    /// rasters are loaded; if their pixel sizes differ the footprint is
    /// rescaled to the displayed raster first. Without a usable footprint the
    /// image is drawn plain, centered and fitted.
    pub async fn render_single<B: ImagingBackend + ?Sized>(
        &self,
        backend: &mut B,
        image: &ResolvedImage,
        polygon: Option<&ResolvedPolygon>,
        viewport: Size,
        token: &PassToken,
    ) -> RenderOutcome {
        self.enter(token, PassState::AwaitingImages);
        let polygon = polygon.filter(|p| is_valid_polygon(&p.vertices));
        let rectification = polygon.and_then(|p| p.rectification.as_ref());
        let urls = iter::once(image.image.as_str())
            .chain(rectification.map(|r| r.base_image.as_str()));
        let images = self.load(urls, token).await;
        if !token.is_current() {
            return superseded(token);
        }

        self.enter(token, PassState::Fitting);
        let Some(raster) = images.get(&image.image) else {
            self.enter(token, PassState::Drawing);
            self.draw_background(backend, viewport);
            let mut report = DrawReport::new(DrawMode::Empty, None);
            report.skipped.push(image.image.clone());
            return RenderOutcome::Drawn(report);
        };

        let Some(polygon) = polygon else {
            debug!(image = image.image.as_str(); "No footprint, drawing plain");
            self.enter(token, PassState::Drawing);
            self.draw_background(backend, viewport);
            draw_centered(backend, raster, viewport, 1.0);
            let mut report = DrawReport::new(DrawMode::Plain, None);
            report.drawn = 1;
            return RenderOutcome::Drawn(report);
        };

        let base = rectification.and_then(|r| Some((r, images.get(&r.base_image)?)));
        let vertices = match base {
            Some((r, base)) if base.size() != raster.size() => rectify(
                &r.raw_vertices,
                base.size(),
                raster.size(),
                &polygon.placement,
            ),
            _ => polygon.vertices.clone(),
        };
        let frame = ReferenceFrame::fit(&vertices, viewport, self.options.fit);

        self.enter(token, PassState::Drawing);
        self.draw_background(backend, viewport);
        draw_clipped(
            backend,
            raster,
            &vertices,
            polygon.placement.to_affine(),
            &frame,
            1.0,
        );
        backend.state(StateOp::SetTransform(Affine::IDENTITY));
        let mut report = DrawReport::new(DrawMode::Registered, Some(frame));
        report.drawn = 1;
        RenderOutcome::Drawn(report)
    }

    /// Loads each distinct URL once, reusing images from earlier passes.
    ///
    /// Failed loads are logged and left out of the result.
    async fn load<'a>(
        &self,
        urls: impl IntoIterator<Item = &'a str>,
        token: &PassToken,
    ) -> HashMap<String, RasterImage> {
        let mut ready = HashMap::new();
        let mut pending: Vec<&str> = Vec::new();
        {
            let memo = self.images.borrow();
            for url in urls {
                if let Some(image) = memo.get(url) {
                    ready.insert(url.to_owned(), image.clone());
                } else if !pending.contains(&url) {
                    pending.push(url);
                }
            }
        }

        let results = join_all(pending.iter().map(|&url| async move {
            if !token.is_current() {
                return Err(ImageLoadError::Cancelled {
                    url: url.to_owned(),
                });
            }
            self.cache.request(url).await
        }))
        .await;

        let mut memo = self.images.borrow_mut();
        for (url, result) in pending.into_iter().zip(results) {
            match result {
                Ok(image) => {
                    memo.insert(url.to_owned(), image.clone());
                    ready.insert(url.to_owned(), image);
                }
                Err(err) if err.is_cancelled() => {
                    debug!(url = url; "Image load abandoned");
                }
                Err(err) => warn!(url = url, err:err; "Image unavailable, skipping its layer"),
            }
        }
        ready
    }

    /// Records `state` for the pass holding `token`, unless a newer pass owns
    /// the state.
    fn enter(&self, token: &PassToken, state: PassState) {
        if token.is_current() {
            self.state.set(state);
        }
    }

    fn draw_background<B: ImagingBackend + ?Sized>(&self, backend: &mut B, viewport: Size) {
        if let Some(color) = self.options.background {
            backend.state(StateOp::SetTransform(Affine::IDENTITY));
            backend.draw(DrawOp::FillRect {
                x0: 0.0,
                y0: 0.0,
                x1: viewport.width,
                y1: viewport.height,
                color,
            });
        }
    }
}

fn superseded(token: &PassToken) -> RenderOutcome {
    debug!(generation = token.generation(); "Render pass superseded, dropping its draws");
    RenderOutcome::Superseded
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "opacity is clamped to [0, 1] first"
)]
fn layer_opacity(opacity: f64) -> f32 {
    opacity.clamp(0.0, 1.0) as f32
}

/// Draws `image` placed by `placement` inside `frame`, clipped to the
/// reference-space `polygon`.
fn draw_clipped<B: ImagingBackend + ?Sized>(
    backend: &mut B,
    image: &RasterImage,
    polygon: &[Point],
    placement: Affine,
    frame: &ReferenceFrame,
    opacity: f64,
) {
    let image_id = backend.create_image(image.desc(), image.pixels());
    let clip = backend.create_path(PathDesc::polygon(polygon));
    backend.state(StateOp::SetTransform(frame.transform()));
    backend.with_clipped_opacity(clip, layer_opacity(opacity), |b| {
        b.draw(DrawOp::DrawImage {
            image: image_id,
            transform: placement,
            sampler: ImageSampler::default(),
        });
    });
    backend.destroy_path(clip);
    backend.destroy_image(image_id);
}

/// Draws `image` centered and fitted into the viewport, unclipped.
fn draw_centered<B: ImagingBackend + ?Sized>(
    backend: &mut B,
    image: &RasterImage,
    viewport: Size,
    opacity: f64,
) {
    let bounds = Rect::from_origin_size(Point::ZERO, image.size());
    let frame = ReferenceFrame::fit_rect(bounds, viewport, FitOptions::centered());
    let image_id = backend.create_image(image.desc(), image.pixels());
    backend.state(StateOp::SetTransform(frame.transform()));
    let draw = |b: &mut B| {
        b.draw(DrawOp::DrawImage {
            image: image_id,
            transform: Affine::IDENTITY,
            sampler: ImageSampler::default(),
        });
    };
    if opacity < 1.0 {
        backend.with_opacity_layer(layer_opacity(opacity), draw);
    } else {
        draw(&mut *backend);
    }
    backend.state(StateOp::SetTransform(Affine::IDENTITY));
    backend.destroy_image(image_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;

    use trestle_geometry::Similarity;
    use trestle_imaging_ref::{Event, RefBackend};
    use trestle_project::Rectification;

    use crate::{MemoryImageSource, PassScheduler};

    /// Counts requests that reach the underlying source.
    #[derive(Default)]
    struct Counting {
        inner: MemoryImageSource,
        requests: Cell<usize>,
    }

    impl ImageCache for Counting {
        fn request(
            &self,
            url: &str,
        ) -> impl Future<Output = Result<RasterImage, ImageLoadError>> {
            self.requests.set(self.requests.get() + 1);
            self.inner.request(url)
        }
    }

    fn square(x0: f64, y0: f64, side: f64) -> Vec<Point> {
        vec![
            Point::new(x0, y0),
            Point::new(x0 + side, y0),
            Point::new(x0 + side, y0 + side),
            Point::new(x0, y0 + side),
        ]
    }

    fn source() -> MemoryImageSource {
        MemoryImageSource::new()
            .with("a.png", RasterImage::solid(4, 4, [255, 0, 0, 255]))
            .with("b.png", RasterImage::solid(8, 2, [0, 0, 255, 255]))
    }

    fn viewport() -> Size {
        Size::new(200.0, 100.0)
    }

    fn image_draws(backend: &RefBackend) -> Vec<(Affine, &trestle_imaging_ref::StateSnapshot)> {
        backend
            .draws()
            .filter_map(|(op, state)| match op {
                DrawOp::DrawImage { transform, .. } => Some((*transform, state)),
                DrawOp::FillRect { .. } => None,
            })
            .collect()
    }

    #[test]
    fn registered_overlay_shares_one_frame() {
        let compositor = LayerCompositor::new(source(), CompositorOptions::default());
        let token = PassScheduler::new().begin();
        let layers = [
            CompositeLayer::new("a.png", Similarity::IDENTITY)
                .with_polygon(square(0.0, 0.0, 4.0))
                .with_opacity(0.8),
            CompositeLayer::new("b.png", Similarity::new((10.0, 0.0), 0.5, 0.0))
                .with_polygon(square(10.0, 0.0, 4.0))
                .with_opacity(0.6),
        ];

        let mut backend = RefBackend::default();
        let outcome =
            pollster::block_on(compositor.render_overlay(&mut backend, &layers, viewport(), &token));
        let report = outcome.report().unwrap();
        assert_eq!(report.mode, DrawMode::Registered, "every layer has a footprint");
        assert_eq!(report.drawn, 2, "both layers");
        let frame = report.frame.unwrap();
        assert_eq!(frame.bounds(), Rect::new(0.0, 0.0, 14.0, 4.0), "union of footprints");
        assert_eq!(compositor.state(), PassState::Drawing, "terminal state");

        let draws = image_draws(&backend);
        assert_eq!(draws.len(), 2, "one image draw per layer");
        for ((transform, state), (layer, opacity)) in draws.iter().zip([(0, 0.8_f32), (1, 0.6)]) {
            assert_eq!(state.transform, frame.transform(), "shared fit transform");
            assert_eq!(*transform, layers[layer].placement.to_affine(), "own placement");
            let top = state.layer_top.as_ref().unwrap();
            assert!(top.clip.is_some(), "clipped to the footprint");
            assert!((top.opacity.unwrap() - opacity).abs() < 1e-6, "layer opacity");
        }
        assert_eq!(backend.live_images(), 0, "images released");
        assert_eq!(backend.live_paths(), 0, "clip paths released");
    }

    #[test]
    fn missing_footprint_degrades_to_centered_layers() {
        let compositor = LayerCompositor::new(source(), CompositorOptions::default());
        let token = PassScheduler::new().begin();
        let layers = [
            CompositeLayer::new("a.png", Similarity::IDENTITY).with_polygon(square(0.0, 0.0, 4.0)),
            CompositeLayer::new("b.png", Similarity::IDENTITY)
                .with_polygon(vec![Point::ZERO, Point::new(1.0, 1.0)]),
        ];

        let mut backend = RefBackend::default();
        let outcome =
            pollster::block_on(compositor.render_overlay(&mut backend, &layers, viewport(), &token));
        let report = outcome.report().unwrap();
        assert_eq!(report.mode, DrawMode::Unregistered, "one footprint is too short");
        assert!(report.frame.is_none(), "no shared frame");

        let draws = image_draws(&backend);
        assert_eq!(draws.len(), 2, "both drawn");
        for (_, state) in &draws {
            assert!(state.layer_top.is_none(), "opaque layers are not wrapped");
        }
        // a.png is 4x4 in a 200x100 viewport: scale 25, centered horizontally.
        assert_eq!(
            draws[0].1.transform,
            Affine::translate((50.0, 0.0)) * Affine::scale(25.0),
            "centered best fit"
        );
    }

    #[test]
    fn failed_image_skips_only_its_layer() {
        let compositor = LayerCompositor::new(source(), CompositorOptions::default());
        let token = PassScheduler::new().begin();
        let layers = [
            CompositeLayer::new("missing.png", Similarity::IDENTITY)
                .with_polygon(square(0.0, 0.0, 50.0)),
            CompositeLayer::new("a.png", Similarity::IDENTITY).with_polygon(square(0.0, 0.0, 4.0)),
        ];

        let mut backend = RefBackend::default();
        let outcome =
            pollster::block_on(compositor.render_overlay(&mut backend, &layers, viewport(), &token));
        let report = outcome.report().unwrap();
        assert_eq!(report.drawn, 1, "surviving layer drawn");
        assert_eq!(report.skipped, ["missing.png"], "failed layer skipped");
        assert_eq!(
            report.frame.unwrap().bounds(),
            Rect::new(0.0, 0.0, 50.0, 50.0),
            "frame still covers the skipped footprint"
        );
    }

    #[test]
    fn shared_urls_load_once_and_are_kept() {
        let counting = Counting {
            inner: source(),
            ..Counting::default()
        };
        let compositor = LayerCompositor::new(counting, CompositorOptions::default());
        let scheduler = PassScheduler::new();
        let layers = [
            CompositeLayer::new("a.png", Similarity::IDENTITY).with_polygon(square(0.0, 0.0, 4.0)),
            CompositeLayer::new("a.png", Similarity::IDENTITY).with_polygon(square(4.0, 0.0, 4.0)),
        ];

        let mut backend = RefBackend::default();
        let token = scheduler.begin();
        pollster::block_on(compositor.render_overlay(&mut backend, &layers, viewport(), &token));
        assert_eq!(compositor.cache().requests.get(), 1, "deduplicated within a pass");

        let token = scheduler.begin();
        pollster::block_on(compositor.render_overlay(&mut backend, &layers, viewport(), &token));
        assert_eq!(compositor.cache().requests.get(), 1, "kept across passes");
        assert_eq!(compositor.cached_images(), 1, "one image kept");

        compositor.clear_cache();
        let token = scheduler.begin();
        pollster::block_on(compositor.render_overlay(&mut backend, &layers, viewport(), &token));
        assert_eq!(compositor.cache().requests.get(), 2, "reloaded after clearing");
    }

    #[test]
    fn superseded_pass_draws_nothing() {
        let counting = Counting {
            inner: source(),
            ..Counting::default()
        };
        let compositor = LayerCompositor::new(counting, CompositorOptions::default());
        let scheduler = PassScheduler::new();
        let stale = scheduler.begin();
        let _newer = scheduler.begin();
        let layers =
            [CompositeLayer::new("a.png", Similarity::IDENTITY).with_polygon(square(0.0, 0.0, 4.0))];

        let mut backend = RefBackend::default();
        let outcome =
            pollster::block_on(compositor.render_overlay(&mut backend, &layers, viewport(), &stale));
        assert!(outcome.is_superseded(), "stale pass");
        assert!(backend.events().is_empty(), "no draws");
        assert_eq!(compositor.cache().requests.get(), 0, "loads abandoned");
        assert_eq!(compositor.state(), PassState::Idle, "state untouched");
    }

    #[test]
    fn stale_pass_keeps_the_newer_state() {
        let compositor = LayerCompositor::new(source(), CompositorOptions::default());
        let scheduler = PassScheduler::new();
        let stale = scheduler.begin();
        let newer = scheduler.begin();
        let layers =
            [CompositeLayer::new("a.png", Similarity::IDENTITY).with_polygon(square(0.0, 0.0, 4.0))];

        let mut backend = RefBackend::default();
        let stale_pass = compositor.render_overlay(&mut backend, &layers, viewport(), &stale);
        let mut newer_backend = RefBackend::default();
        let outcome = pollster::block_on(compositor.render_overlay(
            &mut newer_backend,
            &layers,
            viewport(),
            &newer,
        ));
        assert!(!outcome.is_superseded(), "newer pass draws");
        assert_eq!(compositor.state(), PassState::Drawing, "newer pass finished");

        assert!(pollster::block_on(stale_pass).is_superseded(), "stale pass");
        assert_eq!(compositor.state(), PassState::Drawing, "not overwritten by the stale pass");

        let image = resolved("a.png");
        let single = pollster::block_on(compositor.render_single(
            &mut backend,
            &image,
            None,
            viewport(),
            &stale,
        ));
        assert!(single.is_superseded(), "stale single view");
        assert_eq!(compositor.state(), PassState::Drawing, "single view leaves it too");
    }

    #[test]
    fn empty_overlay_only_clears() {
        let options = CompositorOptions {
            background: Some(Color::WHITE),
            ..CompositorOptions::default()
        };
        let compositor = LayerCompositor::new(source(), options);
        let token = PassScheduler::new().begin();

        let mut backend = RefBackend::default();
        let outcome =
            pollster::block_on(compositor.render_overlay(&mut backend, &[], viewport(), &token));
        assert_eq!(outcome.report().unwrap().mode, DrawMode::Empty, "no layers");
        let fills: Vec<_> = backend.draws().collect();
        assert_eq!(fills.len(), 1, "background only");
        assert!(
            matches!(fills[0].0, DrawOp::FillRect { x1, y1, .. } if *x1 == 200.0 && *y1 == 100.0),
            "covers the viewport"
        );
    }

    fn resolved(image: &str) -> ResolvedImage {
        ResolvedImage {
            drawing_id: "01".into(),
            discipline_key: "구조".into(),
            revision_version: None,
            image: image.into(),
            placement: None,
        }
    }

    #[test]
    fn single_view_rectifies_across_resolutions() {
        let source = MemoryImageSource::new()
            .with("lo.png", RasterImage::solid(8, 6, [0, 0, 0, 255]))
            .with("hi.png", RasterImage::solid(16, 12, [0, 0, 0, 255]));
        let compositor = LayerCompositor::new(source, CompositorOptions::default());
        let token = PassScheduler::new().begin();
        let placement = Similarity::new((0.0, 0.0), 0.5, 0.0);
        let polygon = ResolvedPolygon {
            vertices: vec![
                Point::ZERO,
                Point::new(4.0, 0.0),
                Point::new(4.0, 3.0),
                Point::new(0.0, 3.0),
            ],
            placement,
            polygon_transform: placement,
            rectification: Some(Rectification {
                raw_vertices: vec![
                    Point::ZERO,
                    Point::new(8.0, 0.0),
                    Point::new(8.0, 6.0),
                    Point::new(0.0, 6.0),
                ],
                base_image: "lo.png".into(),
            }),
        };

        let mut backend = RefBackend::default();
        let outcome = pollster::block_on(compositor.render_single(
            &mut backend,
            &resolved("hi.png"),
            Some(&polygon),
            viewport(),
            &token,
        ));
        let report = outcome.report().unwrap();
        assert_eq!(report.mode, DrawMode::Registered, "footprint available");
        assert_eq!(
            report.frame.unwrap().bounds(),
            Rect::new(0.0, 0.0, 8.0, 6.0),
            "raw footprint doubled, then halved by the placement"
        );
        assert_eq!(compositor.cached_images(), 2, "both rasters loaded");
    }

    #[test]
    fn single_view_without_base_raster_uses_placed_vertices() {
        let compositor = LayerCompositor::new(source(), CompositorOptions::default());
        let token = PassScheduler::new().begin();
        let polygon = ResolvedPolygon {
            vertices: square(1.0, 1.0, 2.0),
            placement: Similarity::IDENTITY,
            polygon_transform: Similarity::IDENTITY,
            rectification: Some(Rectification {
                raw_vertices: square(0.0, 0.0, 100.0),
                base_image: "gone.png".into(),
            }),
        };

        let mut backend = RefBackend::default();
        let outcome = pollster::block_on(compositor.render_single(
            &mut backend,
            &resolved("a.png"),
            Some(&polygon),
            viewport(),
            &token,
        ));
        assert_eq!(
            outcome.report().unwrap().frame.unwrap().bounds(),
            Rect::new(1.0, 1.0, 3.0, 3.0),
            "precomputed vertices"
        );
    }

    #[test]
    fn single_view_without_footprint_is_plain() {
        let compositor = LayerCompositor::new(source(), CompositorOptions::default());
        let token = PassScheduler::new().begin();

        let mut backend = RefBackend::default();
        let outcome = pollster::block_on(compositor.render_single(
            &mut backend,
            &resolved("b.png"),
            None,
            viewport(),
            &token,
        ));
        let report = outcome.report().unwrap();
        assert_eq!(report.mode, DrawMode::Plain, "no footprint");
        let events = backend.events();
        assert!(
            events.iter().all(|e| !matches!(e, Event::State { op: StateOp::PushLayer(_), .. })),
            "unclipped"
        );
        assert_eq!(image_draws(&backend).len(), 1, "one draw");
    }

    #[test]
    fn single_view_with_missing_image_draws_nothing() {
        let compositor = LayerCompositor::new(source(), CompositorOptions::default());
        let token = PassScheduler::new().begin();

        let mut backend = RefBackend::default();
        let outcome = pollster::block_on(compositor.render_single(
            &mut backend,
            &resolved("nope.png"),
            None,
            viewport(),
            &token,
        ));
        let report = outcome.report().unwrap();
        assert_eq!(report.mode, DrawMode::Empty, "nothing to draw");
        assert_eq!(report.skipped, ["nope.png"], "reported as skipped");
        assert!(backend.draws().next().is_none(), "no draws");
    }
}
