// Copyright 2026 the Trestle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render pass bookkeeping: which pass is current, and when a new one is due.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use kurbo::Size;

/// Where a render pass is in its lifecycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PassState {
    /// No pass has been requested since the last one finished.
    #[default]
    Idle,
    /// Waiting for every relevant image to load or fail.
    AwaitingImages,
    /// Computing the shared reference frame.
    Fitting,
    /// Issuing draws. Terminal for the pass.
    Drawing,
}

/// Hands out [`PassToken`]s and knows which one is current.
///
/// Starting a pass supersedes every earlier one. Clones share the same
/// counter.
#[derive(Clone, Debug, Default)]
pub struct PassScheduler {
    generation: Arc<AtomicU64>,
}

impl PassScheduler {
    /// A scheduler with no passes started.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new pass, superseding all earlier ones.
    pub fn begin(&self) -> PassToken {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        PassToken {
            generation,
            current: Arc::clone(&self.generation),
        }
    }

    /// Supersedes every outstanding pass without starting a new one.
    pub fn cancel_all(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Generation of the most recent pass.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

/// Identifies one render pass.
///
/// A pass may only draw while its token is current.
#[derive(Clone, Debug)]
pub struct PassToken {
    generation: u64,
    current: Arc<AtomicU64>,
}

impl PassToken {
    /// Whether no newer pass has started.
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::Acquire) == self.generation
    }

    /// This pass's generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Debounces content-rect observations of the drawing surface.
#[derive(Clone, Debug, Default)]
pub struct ViewportObserver {
    last: Option<Size>,
}

impl ViewportObserver {
    /// An observer that has seen nothing yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an observed content size.
    ///
    /// Sizes are floored to whole pixels. Returns the new size when a pass
    /// should be scheduled; non-positive sizes and repeats of the last size
    /// return `None`.
    pub fn observe(&mut self, width: f64, height: f64) -> Option<Size> {
        let size = Size::new(width.floor(), height.floor());
        // NaN fails both comparisons.
        if !(size.width > 0.0 && size.height > 0.0) {
            return None;
        }
        if self.last == Some(size) {
            return None;
        }
        self.last = Some(size);
        Some(size)
    }

    /// The last accepted size.
    pub fn size(&self) -> Option<Size> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_pass_supersedes_older() {
        let scheduler = PassScheduler::new();
        let first = scheduler.begin();
        assert!(first.is_current(), "only pass");

        let second = scheduler.begin();
        assert!(!first.is_current(), "superseded");
        assert!(second.is_current(), "newest");
        assert!(second.generation() > first.generation(), "monotonic");

        scheduler.cancel_all();
        assert!(!second.is_current(), "cancelled");
    }

    #[test]
    fn clones_share_generation() {
        let scheduler = PassScheduler::new();
        let token = scheduler.begin();
        let _ = scheduler.clone().begin();
        assert!(!token.is_current(), "clone started a newer pass");
    }

    #[test]
    fn viewport_floors_and_debounces() {
        let mut observer = ViewportObserver::new();
        assert_eq!(observer.observe(640.7, 480.2), Some(Size::new(640.0, 480.0)), "floored");
        assert_eq!(observer.observe(640.9, 480.9), None, "same whole-pixel size");
        assert_eq!(observer.observe(0.0, 480.0), None, "zero width ignored");
        assert_eq!(observer.observe(-5.0, 10.0), None, "negative ignored");
        assert_eq!(observer.observe(0.5, 10.0), None, "floors to zero");
        assert_eq!(observer.observe(f64::NAN, 10.0), None, "NaN ignored");
        assert_eq!(observer.size(), Some(Size::new(640.0, 480.0)), "last accepted size kept");
        assert_eq!(observer.observe(800.0, 600.0), Some(Size::new(800.0, 600.0)), "resize");
    }
}
