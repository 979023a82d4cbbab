// Copyright 2026 the Trestle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trestle Compositor: draws drawing layers, registered into one frame.
//!
//! Each layer is a raster image with a placement into reference space and,
//! usually, a footprint polygon. [`LayerCompositor`] loads every image a pass
//! needs through an [`ImageCache`], fits the union of all footprints into the
//! viewport with [`ReferenceFrame`](trestle_geometry::ReferenceFrame), and
//! emits [`trestle_imaging`] operations: per layer, a clip to its footprint,
//! its opacity, and its image under its own placement.
//!
//! Passes are asynchronous only while waiting for images. A
//! [`PassScheduler`] hands out [`PassToken`]s; a pass whose token has been
//! superseded by the time its images arrive draws nothing. A
//! [`ViewportObserver`] turns content-rect observations into "a new pass is
//! due" signals.
//!
//! Nothing here is fatal. Missing images skip their layer, missing
//! footprints degrade to unregistered drawing, and the [`DrawReport`] says
//! what happened.
//!
//! ```rust
//! use kurbo::{Point, Size};
//! use trestle_compositor::{
//!     CompositeLayer, CompositorOptions, DrawMode, LayerCompositor, MemoryImageSource,
//!     PassScheduler, RasterImage,
//! };
//! use trestle_geometry::Similarity;
//! use trestle_imaging_ref::RefBackend;
//!
//! let source = MemoryImageSource::new().with("a.png", RasterImage::solid(4, 4, [255, 0, 0, 255]));
//! let compositor = LayerCompositor::new(source, CompositorOptions::default());
//! let layer = CompositeLayer::new("a.png", Similarity::IDENTITY).with_polygon(vec![
//!     Point::new(0.0, 0.0),
//!     Point::new(4.0, 0.0),
//!     Point::new(4.0, 4.0),
//! ]);
//!
//! let scheduler = PassScheduler::new();
//! let mut backend = RefBackend::default();
//! let outcome = pollster::block_on(compositor.render_overlay(
//!     &mut backend,
//!     &[layer],
//!     Size::new(100.0, 100.0),
//!     &scheduler.begin(),
//! ));
//! assert_eq!(outcome.report().unwrap().mode, DrawMode::Registered);
//! ```

mod compositor;
mod image;
mod layer;
mod pass;
mod source;

pub use compositor::{CompositorOptions, DrawMode, DrawReport, LayerCompositor, RenderOutcome};
pub use image::{ImageLoadError, RasterImage};
pub use layer::{CompositeLayer, overlay_layers};
pub use pass::{PassScheduler, PassState, PassToken, ViewportObserver};
pub use source::{ImageCache, MemoryImageSource, PngDirectorySource, decode_png};
