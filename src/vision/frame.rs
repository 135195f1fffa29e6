//! One capture tick worth of pixels

use image::RgbImage;
use std::time::Instant;

/// Immutable pixel buffer for a single capture tick.
///
/// Frames are owned by exactly one processing iteration and dropped at its end.
#[derive(Debug, Clone)]
pub struct Frame {
    seq: u64,
    captured_at: Instant,
    image: RgbImage,
}

impl Frame {
    pub fn new(seq: u64, image: RgbImage) -> Self {
        Self {
            seq,
            captured_at: Instant::now(),
            image,
        }
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn captured_at(&self) -> Instant {
        self.captured_at
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// RGB value at a frame coordinate, `None` when outside the buffer
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        self.image.get_pixel_checked(x, y).map(|p| p.0)
    }
}
