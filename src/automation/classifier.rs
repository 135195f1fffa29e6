//! Fuses both detection streams and classifies the survivors

use super::types::{ClassifiedEnemy, EnemyType, ThreatTier};
use crate::config::SegmenterConfig;
use crate::vision::{BBox, DetectionSource, RawDetection, TemplateSet};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyProfile {
    pub enemy_type: EnemyType,
    pub tier: ThreatTier,
}

/// Fixed lookup `(source, template/shape id) -> profile`, built once at startup
#[derive(Debug, Clone, Default)]
pub struct ClassificationTable {
    entries: HashMap<(DetectionSource, String), EnemyProfile>,
}

impl ClassificationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(templates: &TemplateSet, segmenter: &SegmenterConfig) -> Self {
        let mut table = Self::new();
        for asset in templates.assets() {
            table.insert(
                DetectionSource::TemplateMatch,
                &asset.name,
                EnemyProfile {
                    enemy_type: asset.enemy_type,
                    tier: asset.tier,
                },
            );
        }
        table.insert(
            DetectionSource::ColorSegment,
            &segmenter.shape_id,
            EnemyProfile {
                enemy_type: segmenter.enemy_type,
                tier: segmenter.enemy_type.default_tier(),
            },
        );
        table
    }

    pub fn insert(&mut self, source: DetectionSource, id: &str, profile: EnemyProfile) {
        self.entries.insert((source, id.to_string()), profile);
    }

    pub fn lookup(&self, source: DetectionSource, id: &str) -> Option<EnemyProfile> {
        self.entries.get(&(source, id.to_string())).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Merges template and colour detections without double counting.
///
/// Template detections are authoritative: they are considered first, and a
/// candidate is dropped when it overlaps an already accepted detection above
/// the IoU threshold. Within a source, higher confidence wins.
pub struct DetectionFuser {
    table: ClassificationTable,
    iou_threshold: f64,
    base_point: (f32, f32),
}

impl DetectionFuser {
    pub fn new(table: ClassificationTable, iou_threshold: f64, base_point: (f32, f32)) -> Self {
        Self {
            table,
            iou_threshold,
            base_point,
        }
    }

    pub fn fuse(&self, template_hits: Vec<RawDetection>, color_hits: Vec<RawDetection>) -> Vec<ClassifiedEnemy> {
        let mut template_hits = self.classifiable(template_hits);
        let mut color_hits = self.classifiable(color_hits);
        sort_by_confidence(&mut template_hits);
        sort_by_confidence(&mut color_hits);

        let mut accepted: Vec<(RawDetection, EnemyProfile)> = Vec::new();
        let mut dropped = 0usize;
        for (detection, profile) in template_hits.into_iter().chain(color_hits) {
            if self.is_duplicate(&detection.bbox, &accepted) {
                dropped += 1;
                continue;
            }
            accepted.push((detection, profile));
        }

        if dropped > 0 {
            log::debug!("🔁 Fuser dropped {dropped} duplicate detections");
        }

        accepted
            .into_iter()
            .map(|(detection, profile)| self.classify_with(&detection, profile))
            .collect()
    }

    /// Classify one detection, `None` when the table has no entry for it
    pub fn classify(&self, detection: &RawDetection) -> Option<ClassifiedEnemy> {
        self.table
            .lookup(detection.source, &detection.shape_id)
            .map(|profile| self.classify_with(detection, profile))
    }

    /// Horizontal offset to the base line plus vertical offset to the base point.
    /// The horizontal term goes negative past the base, so the value keeps
    /// growing with vertical offset on both sides.
    pub fn distance_to_base(&self, bbox: &BBox) -> f32 {
        let (cx, cy) = bbox.center();
        let (bx, by) = self.base_point;
        (bx - cx) + (cy - by).abs()
    }

    fn classify_with(&self, detection: &RawDetection, profile: EnemyProfile) -> ClassifiedEnemy {
        ClassifiedEnemy {
            bbox: detection.bbox,
            enemy_type: profile.enemy_type,
            tier: profile.tier,
            distance_to_base: self.distance_to_base(&detection.bbox),
            confidence: detection.confidence,
        }
    }

    fn classifiable(&self, detections: Vec<RawDetection>) -> Vec<(RawDetection, EnemyProfile)> {
        detections
            .into_iter()
            .filter_map(|detection| match self.table.lookup(detection.source, &detection.shape_id) {
                Some(profile) => Some((detection, profile)),
                None => {
                    log::warn!(
                        "❓ No classification for {} detection '{}', dropped",
                        detection.source,
                        detection.shape_id
                    );
                    None
                }
            })
            .collect()
    }

    fn is_duplicate(&self, bbox: &BBox, accepted: &[(RawDetection, EnemyProfile)]) -> bool {
        accepted
            .iter()
            .any(|(kept, _)| kept.bbox.overlaps(bbox, self.iou_threshold))
    }
}

fn sort_by_confidence(detections: &mut [(RawDetection, EnemyProfile)]) {
    detections.sort_by(|(a, _), (b, _)| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
