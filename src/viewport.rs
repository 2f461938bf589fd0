// Mapping from reference coordinates to screen pixels for one window
use crate::block::AlignmentBlock;

/// The reference window being displayed and its width in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub start: u64,
    pub end: u64,
    pub width: usize,
}

impl Viewport {
    pub fn new(start: u64, end: u64, width: usize) -> Self {
        Self { start, end, width }
    }

    /// Pixels per base
    pub fn scale(&self) -> f64 {
        let span = self.end.saturating_sub(self.start);
        if span == 0 {
            return 0.0;
        }
        self.width as f64 / span as f64
    }

    /// On-screen size of a reference extent, before clipping
    pub fn apparent_size(&self, start: u64, end: u64) -> f64 {
        self.scale() * (end as f64 - start as f64)
    }

    /// Pixel columns `x1..x2` covered by a block, clipped to the window.
    /// Blocks outside the window map to the empty span `0..0`.
    pub fn pixel_span(&self, block: &AlignmentBlock) -> (usize, usize) {
        if !block.intersects(self.start, self.end) {
            return (0, 0);
        }
        let scale = self.scale();
        let start = block.ref_start.max(self.start);
        let end = block.ref_end.min(self.end);
        let x1 = ((start - self.start) as f64 * scale).round() as usize;
        let x2 = ((end - self.start) as f64 * scale).round() as usize;
        (x1, x2.max(x1))
    }
}
