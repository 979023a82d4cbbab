// Copyright 2026 the Trestle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trestle Imaging: a backend-agnostic imaging IR for layered drawings.
//!
//! This crate defines the small set of drawing operations that drawing
//! overlays need, and the traits that rendering backends implement to consume
//! them. It sits between the compositor, which decides *what* to draw, and
//! concrete renderers such as the `vello_cpu` software rasterizer.
//!
//! # Core concepts
//!
//! - **Resources**: opaque handles ([`PathId`], [`ImageId`]) whose lifetimes
//!   are managed through [`ResourceBackend`].
//! - **Operations**: [`StateOp`] mutates the current transform and layer
//!   stack; [`DrawOp`] produces pixels under that state.
//! - **Layers**: [`LayerOp`] scopes a clip path and a group opacity. Everything
//!   drawn between a push and its matching pop is clipped to the path and then
//!   composited with the opacity.
//!
//! Clip paths are interpreted under the transform that is current when the
//! layer is pushed. Image draws are placed by their own transform on top of
//! the current transform.
//!
//! # Example
//!
//! ```ignore
//! # use trestle_imaging::*;
//! # use kurbo::Point;
//! let mut backend = MyBackend::new();
//! let clip = backend.create_path(PathDesc::polygon(&[
//!     Point::new(0.0, 0.0),
//!     Point::new(100.0, 0.0),
//!     Point::new(100.0, 100.0),
//! ]));
//! let image = backend.create_image(desc, &pixels);
//!
//! backend.state(StateOp::SetTransform(Affine::scale(2.0)));
//! backend.with_clipped_opacity(clip, 0.8, |b| {
//!     b.draw(DrawOp::DrawImage {
//!         image,
//!         transform: Affine::translate((10.0, 10.0)),
//!         sampler: ImageSampler::default(),
//!     });
//! });
//! ```

#![no_std]

extern crate alloc;

use alloc::boxed::Box;
use alloc::vec::Vec;

use kurbo::{BezPath, Point};
pub use peniko::{Color, Fill as FillRule, ImageAlphaType, ImageFormat, ImageSampler};

/// Identifier for a path resource.
///
/// Stable for the lifetime of the resource.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PathId(pub u32);

/// Identifier for an image resource.
///
/// Stable for the lifetime of the resource. Images are typically created once
/// per pass and destroyed when the pass ends.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ImageId(pub u32);

/// Affine transform type used by the imaging IR.
pub type Affine = kurbo::Affine;

/// A clip attached to a pushed layer.
#[derive(Clone, Debug, PartialEq)]
pub struct ClipOp {
    /// Path whose interior is kept.
    pub path: PathId,
    /// Fill rule deciding the interior.
    pub fill_rule: FillRule,
}

/// Parameters for a pushed layer.
///
/// Draws inside a layer composite normally (`SrcOver`) within it; the layer
/// as a whole is then composited into its parent with `opacity`.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct LayerOp {
    /// Optional clip applied to this layer's contents.
    pub clip: Option<ClipOp>,
    /// Optional group opacity in `[0, 1]`.
    pub opacity: Option<f32>,
}

impl LayerOp {
    /// Returns true if this layer has no effect at all.
    #[inline]
    pub fn is_noop(&self) -> bool {
        self.clip.is_none() && self.opacity.is_none()
    }
}

/// State operations that mutate the current imaging state.
#[derive(Clone, Debug, PartialEq)]
pub enum StateOp {
    /// Set the current transform matrix.
    SetTransform(Affine),
    /// Push a new layer onto the layer stack.
    ///
    /// Layers must be well-nested: every `PushLayer` must eventually be
    /// matched by a [`StateOp::PopLayer`].
    PushLayer(LayerOp),
    /// Pop the most recently pushed layer.
    PopLayer,
}

/// Draw operations that produce pixels given the current state.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// Fill an axis-aligned rectangle with a solid color.
    FillRect {
        /// Minimum X coordinate.
        x0: f64,
        /// Minimum Y coordinate.
        y0: f64,
        /// Maximum X coordinate.
        x1: f64,
        /// Maximum Y coordinate.
        y1: f64,
        /// Fill color.
        color: Color,
    },
    /// Draw an image at its native origin, placed by `transform`.
    ///
    /// The image covers `(0, 0)..(width, height)` in its own pixel space.
    DrawImage {
        /// Image resource to draw.
        image: ImageId,
        /// Transform applied to the image, on top of the current transform.
        transform: Affine,
        /// Parameters that specify how to sample the image.
        sampler: ImageSampler,
    },
}

/// Description of a path resource.
#[derive(Clone, Debug, PartialEq)]
pub struct PathDesc {
    /// Command buffer describing the path geometry.
    pub commands: Box<[PathCmd]>,
}

impl PathDesc {
    /// A closed polygon through `vertices`.
    ///
    /// An empty slice yields an empty path.
    pub fn polygon(vertices: &[Point]) -> Self {
        let mut commands = Vec::with_capacity(vertices.len() + 1);
        let mut iter = vertices.iter();
        if let Some(first) = iter.next() {
            commands.push(PathCmd::MoveTo {
                x: first.x,
                y: first.y,
            });
            commands.extend(iter.map(|p| PathCmd::LineTo { x: p.x, y: p.y }));
            commands.push(PathCmd::Close);
        }
        Self {
            commands: commands.into_boxed_slice(),
        }
    }

    /// Converts the command buffer into a [`BezPath`].
    pub fn to_bez_path(&self) -> BezPath {
        let mut path = BezPath::new();
        for cmd in &self.commands {
            match *cmd {
                PathCmd::MoveTo { x, y } => path.move_to((x, y)),
                PathCmd::LineTo { x, y } => path.line_to((x, y)),
                PathCmd::Close => path.close_path(),
            }
        }
        path
    }
}

/// Path command enumeration.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PathCmd {
    /// Move the current point without drawing.
    MoveTo {
        /// X coordinate of the new point.
        x: f64,
        /// Y coordinate of the new point.
        y: f64,
    },
    /// Draw a line from the current point to the given point.
    LineTo {
        /// X coordinate of the line end.
        x: f64,
        /// Y coordinate of the line end.
        y: f64,
    },
    /// Close the current subpath.
    Close,
}

/// Description of an image resource.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageDesc {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Pixel format of the image buffer.
    pub format: ImageFormat,
    /// Alpha encoding of the pixels (straight vs premultiplied).
    pub alpha_type: ImageAlphaType,
}

impl ImageDesc {
    /// Straight-alpha RGBA8 image of the given size.
    pub fn rgba8(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            format: ImageFormat::Rgba8,
            alpha_type: ImageAlphaType::Alpha,
        }
    }
}

/// Resource lifetime interface.
///
/// Implementations must keep an ID valid and referring to the same resource
/// until the corresponding `destroy_*` call.
pub trait ResourceBackend {
    /// Create a path resource.
    fn create_path(&mut self, desc: PathDesc) -> PathId;
    /// Destroy a previously created path.
    fn destroy_path(&mut self, id: PathId);

    /// Create an image resource from raw pixels.
    ///
    /// `pixels` is tightly packed, row-major data in the format named by
    /// `desc`.
    fn create_image(&mut self, desc: ImageDesc, pixels: &[u8]) -> ImageId;
    /// Destroy a previously created image.
    fn destroy_image(&mut self, id: ImageId);
}

/// Minimal imaging backend trait.
pub trait ImagingBackend: ResourceBackend {
    /// Apply a state operation.
    fn state(&mut self, op: StateOp);

    /// Apply a draw operation.
    fn draw(&mut self, op: DrawOp);

    /// Push a new layer onto the layer stack.
    ///
    /// This is equivalent to `self.state(StateOp::PushLayer(op))`.
    #[inline]
    fn layer_push(&mut self, op: LayerOp) {
        self.state(StateOp::PushLayer(op));
    }

    /// Pop the most recently pushed layer.
    ///
    /// This is equivalent to `self.state(StateOp::PopLayer)`.
    #[inline]
    fn layer_pop(&mut self) {
        self.state(StateOp::PopLayer);
    }
}

/// Convenience helpers for `ImagingBackend` implementations and callers.
///
/// Kept separate from [`ImagingBackend`] so that `&mut dyn ImagingBackend`
/// stays usable.
pub trait ImagingBackendExt: ImagingBackend {
    /// Run `f` inside a pushed layer, popping it afterwards.
    ///
    /// Note: if `f` panics, the layer will not be popped.
    #[inline]
    fn with_layer<R>(&mut self, op: LayerOp, f: impl FnOnce(&mut Self) -> R) -> R {
        self.layer_push(op);
        let out = f(self);
        self.layer_pop();
        out
    }

    /// Run `f` inside an opacity layer.
    #[inline]
    fn with_opacity_layer<R>(&mut self, opacity: f32, f: impl FnOnce(&mut Self) -> R) -> R {
        self.with_layer(
            LayerOp {
                clip: None,
                opacity: Some(opacity),
            },
            f,
        )
    }

    /// Run `f` inside a layer clipped to a `FillRule::NonZero` path and
    /// composited with `opacity`.
    #[inline]
    fn with_clipped_opacity<R>(
        &mut self,
        path: PathId,
        opacity: f32,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        self.with_layer(
            LayerOp {
                clip: Some(ClipOp {
                    path,
                    fill_rule: FillRule::NonZero,
                }),
                opacity: Some(opacity),
            },
            f,
        )
    }
}

impl<B: ImagingBackend + ?Sized> ImagingBackendExt for B {}
