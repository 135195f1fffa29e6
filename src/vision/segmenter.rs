//! Dark-band blob detection for dense groups of one enemy class
//!
//! Runs on the critical sub-region only. Template matching cannot separate
//! overlapping units of the same uniform colour, so this pass thresholds the
//! grayscale band of that colour, cleans the mask with an opening followed by
//! a closing, and reports each connected component as a detection.

use super::{bbox::BBox, detection::RawDetection, region::RegionCrop};
use crate::config::SegmenterConfig;
use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::morphology::{close, open};
use imageproc::region_labelling::{Connectivity, connected_components};
use std::collections::BTreeMap;

const FOREGROUND: u8 = 255;

/// Pixel extent and area of one connected component, in crop coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blob {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
    pub area: u32,
}

impl Blob {
    fn seed(x: u32, y: u32) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
            area: 0,
        }
    }

    fn include(&mut self, x: u32, y: u32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
        self.area += 1;
    }

    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    pub fn bbox(&self) -> BBox {
        BBox::new(
            self.min_x as i32,
            self.min_y as i32,
            self.width() as i32,
            self.height() as i32,
        )
    }
}

pub struct ColorSegmenter {
    config: SegmenterConfig,
}

impl ColorSegmenter {
    pub fn new(config: SegmenterConfig) -> Self {
        Self { config }
    }

    /// Detect blobs in the critical crop. Boxes are returned in frame coordinates.
    /// Zero blobs is a normal outcome, not an error.
    pub fn detect(&self, critical: &RegionCrop) -> Vec<RawDetection> {
        if !self.config.enabled {
            return Vec::new();
        }

        let gray = image::DynamicImage::ImageRgb8(critical.image.clone()).to_luma8();
        let mask = self.clean_mask(&self.band_mask(&gray));

        let detections: Vec<RawDetection> = extract_blobs(&mask)
            .into_iter()
            .filter(|blob| self.keep_blob(blob))
            .map(|blob| {
                RawDetection::color(
                    critical.to_frame(blob.bbox()),
                    self.confidence(&blob),
                    self.config.shape_id.clone(),
                )
            })
            .collect();

        if detections.is_empty() {
            log::trace!("No color blobs in critical region");
        } else {
            log::debug!("🟫 Color segmenter found {} blobs", detections.len());
        }
        detections
    }

    /// Binary mask of pixels inside the configured gray band
    pub fn band_mask(&self, gray: &GrayImage) -> GrayImage {
        let (lo, hi) = (self.config.gray_min, self.config.gray_max);
        GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
            let value = gray.get_pixel(x, y)[0];
            if value >= lo && value <= hi {
                Luma([FOREGROUND])
            } else {
                Luma([0])
            }
        })
    }

    /// Opening removes speckle, closing merges fragments of one unit
    pub fn clean_mask(&self, mask: &GrayImage) -> GrayImage {
        let mut cleaned = mask.clone();
        if self.config.open_radius > 0 {
            cleaned = open(&cleaned, Norm::LInf, self.config.open_radius);
        }
        if self.config.close_radius > 0 {
            cleaned = close(&cleaned, Norm::LInf, self.config.close_radius);
        }
        cleaned
    }

    fn keep_blob(&self, blob: &Blob) -> bool {
        let (w, h) = (blob.width(), blob.height());
        let min = self.config.min_blob_size;

        // Speckle
        if w < min && h < min {
            return false;
        }

        // Dead units lie flat
        if w > self.config.corpse_min_width && h < self.config.corpse_max_height {
            return false;
        }

        true
    }

    fn confidence(&self, blob: &Blob) -> f32 {
        if self.config.expected_blob_area <= 0.0 {
            return 1.0;
        }
        (blob.area as f32 / self.config.expected_blob_area).clamp(0.0, 1.0)
    }
}

/// Eight-connected components of the foreground, ordered by label
pub fn extract_blobs(mask: &GrayImage) -> Vec<Blob> {
    let labels = connected_components(mask, Connectivity::Eight, Luma([0u8]));

    let mut blobs: BTreeMap<u32, Blob> = BTreeMap::new();
    for (x, y, label) in labels.enumerate_pixels() {
        let label = label[0];
        if label == 0 {
            continue;
        }
        blobs
            .entry(label)
            .or_insert_with(|| Blob::seed(x, y))
            .include(x, y);
    }

    blobs.into_values().collect()
}
