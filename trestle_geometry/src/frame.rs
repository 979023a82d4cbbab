// Copyright 2026 the Trestle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Affine, Point, Rect, Size, Vec2};

use crate::bounding_box;

/// How fitted content is positioned inside the viewport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FitMode {
    /// Place the minimum corner of the content at `(padding, padding)`.
    ///
    /// This is what overlays use: every layer shares a frame anchored at the
    /// top-left of the padded viewport.
    #[default]
    AlignMin,
    /// Center the fitted content within the viewport.
    Center,
}

/// Parameters for [`ReferenceFrame::fit`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitOptions {
    /// Padding as a fraction of `min(viewport width, viewport height)`.
    pub padding_fraction: f64,
    /// Upper bound on the fitted scale, so tiny polygons are not blown up.
    pub max_scale: f64,
    /// Placement of the fitted content.
    pub mode: FitMode,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            padding_fraction: 0.02,
            max_scale: 10.0,
            mode: FitMode::AlignMin,
        }
    }
}

impl FitOptions {
    /// Unpadded, uncapped, centered fit.
    ///
    /// Used to draw one image on its own when there is no shared frame.
    #[must_use]
    pub fn centered() -> Self {
        Self {
            padding_fraction: 0.0,
            max_scale: f64::INFINITY,
            mode: FitMode::Center,
        }
    }
}

/// A fitted mapping from reference space into viewport (device) space.
///
/// All layers drawn in one pass share the same frame, so their relative
/// proportions in reference space are preserved on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReferenceFrame {
    bounds: Rect,
    scale: f64,
    padding: f64,
    offset: Vec2,
}

impl ReferenceFrame {
    /// Fits the bounding box of `vertices` into `viewport`.
    ///
    /// The box extents are floored at 1 so a single point or a degenerate line
    /// still yields a finite scale. Empty input fits the zero rectangle.
    #[must_use]
    pub fn fit(vertices: &[Point], viewport: Size, options: FitOptions) -> Self {
        Self::fit_rect(bounding_box(vertices), viewport, options)
    }

    /// Fits an already computed reference-space rectangle into `viewport`.
    #[must_use]
    pub fn fit_rect(bounds: Rect, viewport: Size, options: FitOptions) -> Self {
        let bounds = bounds.abs();
        let ref_w = bounds.width().max(1.0);
        let ref_h = bounds.height().max(1.0);
        let padding = options.padding_fraction * viewport.width.min(viewport.height);
        let sx = (viewport.width - 2.0 * padding) / ref_w;
        let sy = (viewport.height - 2.0 * padding) / ref_h;
        let scale = sx.min(sy).min(options.max_scale);

        let min = bounds.origin().to_vec2();
        let offset = match options.mode {
            FitMode::AlignMin => Vec2::new(padding, padding) - min * scale,
            FitMode::Center => {
                let view_center = Vec2::new(viewport.width * 0.5, viewport.height * 0.5);
                view_center - bounds.center().to_vec2() * scale
            }
        };

        Self {
            bounds,
            scale,
            padding,
            offset,
        }
    }

    /// The reference-space rectangle that was fitted.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Uniform reference-to-viewport scale.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Padding in viewport pixels.
    #[must_use]
    pub fn padding(&self) -> f64 {
        self.padding
    }

    /// Viewport position of the reference-space origin.
    #[must_use]
    pub fn origin(&self) -> Point {
        self.offset.to_point()
    }

    /// Reference-to-viewport transform.
    #[must_use]
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    /// Maps a reference-space point into the viewport.
    #[must_use]
    pub fn to_view(&self, p: Point) -> Point {
        (p.to_vec2() * self.scale + self.offset).to_point()
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Rect, Size};

    use super::{FitOptions, ReferenceFrame};

    const UNIT_SQUARE: [Point; 4] = [
        Point::new(0.0, 0.0),
        Point::new(1.0, 0.0),
        Point::new(1.0, 1.0),
        Point::new(0.0, 1.0),
    ];

    #[test]
    fn unit_square_is_capped() {
        let frame = ReferenceFrame::fit(&UNIT_SQUARE, Size::new(100.0, 100.0), FitOptions::default());
        // Uncapped this would be 100 - 2 * 2 = 96.
        assert_eq!(frame.scale(), 10.0, "scale must respect the cap");
        assert!((frame.padding() - 2.0).abs() < 1e-12, "2% of 100");
    }

    #[test]
    fn unit_square_without_cap_nearly_fills() {
        let options = FitOptions {
            max_scale: f64::INFINITY,
            ..FitOptions::default()
        };
        let frame = ReferenceFrame::fit(&UNIT_SQUARE, Size::new(100.0, 100.0), options);
        let pad = frame.padding();
        assert!((frame.scale() - (100.0 - 2.0 * pad)).abs() < 1e-9, "fills minus padding");
    }

    #[test]
    fn min_corner_lands_on_padding() {
        let verts = [
            Point::new(100.0, 200.0),
            Point::new(500.0, 200.0),
            Point::new(500.0, 400.0),
            Point::new(100.0, 400.0),
        ];
        let frame = ReferenceFrame::fit(&verts, Size::new(800.0, 600.0), FitOptions::default());
        let pad: f64 = 0.02 * 600.0;
        let expected = ((800.0 - 2.0 * pad) / 400.0).min((600.0 - 2.0 * pad) / 200.0);
        assert!((frame.scale() - expected).abs() < 1e-12, "limited by the tighter axis");

        let min = frame.to_view(Point::new(100.0, 200.0));
        assert!((min.x - pad).abs() < 1e-9 && (min.y - pad).abs() < 1e-9, "got {min:?}");

        let via_affine = frame.transform() * Point::new(500.0, 400.0);
        let direct = frame.to_view(Point::new(500.0, 400.0));
        assert!((via_affine - direct).hypot() < 1e-9, "affine and direct agree");
        assert!(direct.x <= 800.0 - pad + 1e-9 && direct.y <= 600.0 - pad + 1e-9, "fits inside");
    }

    #[test]
    fn single_point_has_finite_scale() {
        let frame = ReferenceFrame::fit(&[Point::new(5.0, 5.0)], Size::new(50.0, 80.0), FitOptions::default());
        assert!(frame.scale().is_finite(), "degenerate box is floored at 1");
        assert_eq!(frame.scale(), 10.0, "and then capped");
    }

    #[test]
    fn centered_fit_centers_content() {
        let frame = ReferenceFrame::fit_rect(
            Rect::new(0.0, 0.0, 200.0, 100.0),
            Size::new(400.0, 400.0),
            FitOptions::centered(),
        );
        assert_eq!(frame.scale(), 2.0, "width is the binding axis");
        let center = frame.to_view(Point::new(100.0, 50.0));
        assert_eq!(center, Point::new(200.0, 200.0), "content center maps to view center");
        assert_eq!(frame.origin(), Point::new(0.0, 100.0), "letterboxed vertically");
    }
}
