// Copyright 2026 the Trestle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vello CPU–backed implementation of the imaging backend.
//!
//! This crate implements [`ImagingBackend`] on top of the sparse-strips
//! [`vello_cpu::RenderContext`], so drawing overlays can be rasterized
//! without a GPU. [`render_rgba8`] wraps the context setup and readback for
//! callers that only want straight-alpha RGBA8 bytes.

#![deny(unsafe_code)]
#![no_std]

extern crate alloc;

use alloc::vec::Vec;
use core::fmt;

use kurbo::Affine;
use peniko::{Fill, ImageData};
use trestle_imaging::{
    ClipOp, DrawOp, FillRule, ImageDesc, ImageId, ImagingBackend, LayerOp, PathDesc,
    PathId, ResourceBackend, StateOp,
};
use vello_cpu::kurbo::{Affine as CpuAffine, BezPath, Rect};
use vello_cpu::{
    Image as CpuImage, ImageSource, Pixmap, RenderContext, RenderMode, RenderSettings,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum StackEntry {
    Noop,
    Pushed,
}

/// CPU-backed implementation of the imaging backend using `vello_cpu`.
pub struct VelloCpuImagingBackend<'ctx> {
    /// Underlying Vello CPU render context to draw into.
    pub ctx: &'ctx mut RenderContext,
    paths: Vec<Option<BezPath>>,
    images: Vec<Option<ImageData>>,

    stack: Vec<StackEntry>,
    current_fill_rule: FillRule,
    current_transform: Affine,
}

impl fmt::Debug for VelloCpuImagingBackend<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VelloCpuImagingBackend { .. }")
    }
}

impl<'ctx> VelloCpuImagingBackend<'ctx> {
    /// Create a new backend that renders into the given CPU render context.
    pub fn new(ctx: &'ctx mut RenderContext) -> Self {
        Self {
            ctx,
            paths: Vec::new(),
            images: Vec::new(),
            stack: Vec::new(),
            current_fill_rule: FillRule::NonZero,
            current_transform: Affine::IDENTITY,
        }
    }

    /// The transform most recently set through [`StateOp::SetTransform`].
    pub fn transform(&self) -> Affine {
        self.current_transform
    }

    fn affine_to_cpu(xf: Affine) -> CpuAffine {
        CpuAffine::new(xf.as_coeffs())
    }

    fn set_fill_rule(&mut self, rule: FillRule) {
        self.current_fill_rule = rule;
        let fill = match rule {
            FillRule::NonZero => Fill::NonZero,
            FillRule::EvenOdd => Fill::EvenOdd,
        };
        self.ctx.set_fill_rule(fill);
    }

    fn push_layer(&mut self, layer: LayerOp) {
        if layer.is_noop() {
            self.stack.push(StackEntry::Noop);
            return;
        }
        let LayerOp { clip, opacity } = layer;
        let clip = clip.and_then(|ClipOp { path, fill_rule }| {
            let idx = path.0 as usize;
            let bez = self.paths.get(idx)?.as_ref()?.clone();
            Some((bez, fill_rule))
        });

        // The clip path may have been destroyed.
        if clip.is_none() && opacity.is_none() {
            self.stack.push(StackEntry::Noop);
            return;
        }

        let saved = self.current_fill_rule;
        let clip_path = clip.map(|(bez, rule)| {
            if rule != saved {
                self.set_fill_rule(rule);
            }
            bez
        });
        self.ctx
            .push_layer(clip_path.as_ref(), None, opacity, None, None);
        if self.current_fill_rule != saved {
            self.set_fill_rule(saved);
        }
        self.stack.push(StackEntry::Pushed);
    }

    fn draw_image(&mut self, image: ImageId, transform: Affine, sampler: peniko::ImageSampler) {
        let Some(Some(image_data)) = self.images.get(image.0 as usize) else {
            return;
        };
        let rect = Rect::new(
            0.0,
            0.0,
            f64::from(image_data.width),
            f64::from(image_data.height),
        );
        let image_paint = CpuImage {
            image: ImageSource::from_peniko_image_data(image_data),
            sampler,
        };

        let saved_transform = *self.ctx.transform();
        let saved_paint = self.ctx.paint().clone();

        self.ctx.set_paint(image_paint);
        self.ctx
            .set_transform(saved_transform * Self::affine_to_cpu(transform));
        self.ctx.fill_rect(&rect);

        self.ctx.set_transform(saved_transform);
        self.ctx.set_paint(saved_paint);
    }
}

impl ResourceBackend for VelloCpuImagingBackend<'_> {
    fn create_path(&mut self, desc: PathDesc) -> PathId {
        let p = desc.to_bez_path();
        let id = u32::try_from(self.paths.len())
            .expect("VelloCpuImagingBackend: too many paths for u32 PathId");
        self.paths.push(Some(p));
        PathId(id)
    }

    fn destroy_path(&mut self, id: PathId) {
        if let Some(slot) = self.paths.get_mut(id.0 as usize) {
            *slot = None;
        }
    }

    fn create_image(&mut self, desc: ImageDesc, pixels: &[u8]) -> ImageId {
        let ImageDesc {
            width,
            height,
            format,
            alpha_type,
        } = desc;
        let id = u32::try_from(self.images.len())
            .expect("VelloCpuImagingBackend: too many images for u32 ImageId");
        self.images.push(Some(ImageData {
            data: peniko::Blob::from(pixels.to_vec()),
            format,
            alpha_type,
            width,
            height,
        }));
        ImageId(id)
    }

    fn destroy_image(&mut self, id: ImageId) {
        if let Some(slot) = self.images.get_mut(id.0 as usize) {
            *slot = None;
        }
    }
}

impl ImagingBackend for VelloCpuImagingBackend<'_> {
    fn state(&mut self, op: StateOp) {
        match op {
            StateOp::SetTransform(xf) => {
                self.current_transform = xf;
                self.ctx.set_transform(Self::affine_to_cpu(xf));
            }
            StateOp::PushLayer(layer) => self.push_layer(layer),
            StateOp::PopLayer => match self.stack.pop() {
                Some(StackEntry::Noop) => {}
                Some(StackEntry::Pushed) => self.ctx.pop_layer(),
                None => panic!("PopLayer with empty stack"),
            },
        }
    }

    fn draw(&mut self, op: DrawOp) {
        match op {
            DrawOp::FillRect {
                x0,
                y0,
                x1,
                y1,
                color,
            } => {
                let saved_paint = self.ctx.paint().clone();
                self.ctx.set_paint(color);
                self.ctx.fill_rect(&Rect::new(x0, y0, x1, y1));
                self.ctx.set_paint(saved_paint);
            }
            DrawOp::DrawImage {
                image,
                transform,
                sampler,
            } => self.draw_image(image, transform, sampler),
        }
    }
}

/// Rasterizes whatever `build` draws into a `width` × `height` surface.
///
/// Returns tightly packed, straight-alpha RGBA8 rows.
pub fn render_rgba8(
    width: u16,
    height: u16,
    build: impl FnOnce(&mut VelloCpuImagingBackend<'_>),
) -> Vec<u8> {
    let settings = RenderSettings {
        // Pin the u8 pipeline so output does not depend on enabled features.
        render_mode: RenderMode::OptimizeSpeed,
        ..RenderSettings::default()
    };
    let mut ctx = RenderContext::new_with(width, height, settings);
    let mut backend = VelloCpuImagingBackend::new(&mut ctx);
    build(&mut backend);

    let mut pixmap = Pixmap::new(width, height);
    backend.ctx.flush();
    backend.ctx.render_to_pixmap(&mut pixmap);

    let unpremul = pixmap.take_unpremultiplied();
    let mut bytes = Vec::with_capacity(unpremul.len() * 4);
    for p in unpremul {
        bytes.extend_from_slice(&[p.r, p.g, p.b, p.a]);
    }
    bytes
}
