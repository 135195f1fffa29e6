//! Multi-template matching over the processing ROI

use super::{
    bbox::BBox,
    detection::RawDetection,
    region::RegionCrop,
    template::{TemplateAsset, TemplateSet},
};
use crate::config::DetectorConfig;
use image::{GrayImage, ImageBuffer, Luma};
use imageproc::template_matching::{MatchTemplateMethod, match_template};

/// A score-map location that cleared the asset threshold, in crop coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchCandidate {
    pub x: u32,
    pub y: u32,
    pub score: f32,
}

/// Runs every template against the ROI and collapses overlapping same-template hits.
pub struct TemplateDetector {
    templates: TemplateSet,
    config: DetectorConfig,
}

impl TemplateDetector {
    pub fn new(templates: TemplateSet, config: DetectorConfig) -> Self {
        Self { templates, config }
    }

    /// Detect all templates inside the ROI crop. Boxes are returned in frame coordinates.
    pub fn detect(&self, roi: &RegionCrop) -> Vec<RawDetection> {
        let roi_gray = image::DynamicImage::ImageRgb8(roi.image.clone()).to_luma8();
        self.detect_gray(&roi_gray, roi.offset_x, roi.offset_y)
    }

    pub fn detect_gray(&self, roi_gray: &GrayImage, offset_x: u32, offset_y: u32) -> Vec<RawDetection> {
        let mut detections = Vec::new();

        for (i, template) in self.templates.assets().iter().enumerate() {
            log::trace!(
                "🔍 Processing template {}/{}: {}",
                i + 1,
                self.templates.len(),
                template.name
            );

            let candidates = self.match_single(roi_gray, template);
            if !candidates.is_empty() {
                log::debug!(
                    "✅ Found {} matches for template '{}'",
                    candidates.len(),
                    template.name
                );
            }

            detections.extend(candidates.into_iter().map(|c| {
                let bbox = BBox::new(
                    (offset_x + c.x) as i32 - template.box_offset_x,
                    (offset_y + c.y) as i32 - template.box_offset_y,
                    template.box_width as i32,
                    template.box_height as i32,
                );
                RawDetection::template(bbox, c.score, template.name.clone())
            }));
        }

        detections
    }

    /// Thresholded, suppressed matches of one template in crop coordinates
    pub fn match_single(&self, roi_gray: &GrayImage, template: &TemplateAsset) -> Vec<MatchCandidate> {
        if template.width() == 0
            || template.height() == 0
            || template.width() > roi_gray.width()
            || template.height() > roi_gray.height()
        {
            log::debug!(
                "⚠️ Skipping template '{}' - {}x{} does not fit region {}x{}",
                template.name,
                template.width(),
                template.height(),
                roi_gray.width(),
                roi_gray.height()
            );
            return Vec::new();
        }

        let template_pixels = template.width() as u64 * template.height() as u64;
        if template_pixels > self.config.max_template_pixels {
            log::warn!(
                "⚠️ Skipping oversized template '{}' ({}x{})",
                template.name,
                template.width(),
                template.height()
            );
            return Vec::new();
        }

        let scores = match_template(
            roi_gray,
            &template.image,
            MatchTemplateMethod::CrossCorrelationNormalized,
        );

        let mut candidates = threshold_scores(&scores, template.threshold);
        candidates = suppress_nearby(candidates, template.nms_radius_x, template.nms_radius_y);
        candidates.truncate(self.config.max_matches_per_template);
        candidates
    }
}

fn threshold_scores(scores: &ImageBuffer<Luma<f32>, Vec<f32>>, threshold: f32) -> Vec<MatchCandidate> {
    scores
        .enumerate_pixels()
        .filter_map(|(x, y, pixel)| {
            let score = pixel[0];
            (score.is_finite() && score >= threshold).then_some(MatchCandidate { x, y, score })
        })
        .collect()
}

/// Greedy non-maximum suppression by distance.
///
/// Candidates are visited from the highest score down; one is kept only if no
/// already-kept candidate lies within `radius_x` and `radius_y` of it. The
/// output is sorted by score and running it through again returns it unchanged.
pub fn suppress_nearby(mut candidates: Vec<MatchCandidate>, radius_x: u32, radius_y: u32) -> Vec<MatchCandidate> {
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.y.cmp(&b.y))
            .then_with(|| a.x.cmp(&b.x))
    });

    let mut kept: Vec<MatchCandidate> = Vec::new();
    for candidate in candidates {
        let near_kept = kept
            .iter()
            .any(|k| k.x.abs_diff(candidate.x) < radius_x && k.y.abs_diff(candidate.y) < radius_y);
        if !near_kept {
            kept.push(candidate);
        }
    }
    kept
}
