//! Per-frame perception: ROI -> detections -> classified enemies -> target pool

use super::classifier::{ClassificationTable, DetectionFuser};
use super::prioritizer::ThreatPrioritizer;
use super::types::{ClassifiedEnemy, EnemyType};
use crate::config::BotConfig;
use crate::error::BotResult;
use crate::vision::{ColorSegmenter, Frame, RoiExtractor, TemplateDetector, TemplateSet};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct FrameAnalysis {
    pub seq: u64,
    /// Every classified enemy in priority order
    pub ranked: Vec<ClassifiedEnemy>,
    pub pool: Vec<ClassifiedEnemy>,
    pub template_hits: usize,
    pub color_hits: usize,
    pub processing_time: Duration,
}

impl FrameAnalysis {
    pub fn count_by_type(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for enemy in &self.ranked {
            *counts.entry(enemy.enemy_type.label()).or_insert(0) += 1;
        }
        counts
    }

    pub fn count_of(&self, enemy_type: EnemyType) -> usize {
        self.ranked.iter().filter(|e| e.enemy_type == enemy_type).count()
    }
}

/// Stages 1-5, rebuilt from scratch for every frame
pub struct FramePipeline {
    extractor: RoiExtractor,
    detector: TemplateDetector,
    segmenter: ColorSegmenter,
    fuser: DetectionFuser,
    prioritizer: ThreatPrioritizer,
}

impl FramePipeline {
    pub fn new(
        extractor: RoiExtractor,
        detector: TemplateDetector,
        segmenter: ColorSegmenter,
        fuser: DetectionFuser,
        prioritizer: ThreatPrioritizer,
    ) -> Self {
        Self {
            extractor,
            detector,
            segmenter,
            fuser,
            prioritizer,
        }
    }

    /// Assemble the pipeline from validated configuration and loaded templates
    pub fn from_config(config: &BotConfig, templates: TemplateSet) -> BotResult<Self> {
        let extractor = RoiExtractor::new(
            config.processing_region,
            config.critical_region,
            config.capture.width,
            config.capture.height,
        )?;
        let table = ClassificationTable::build(&templates, &config.segmenter);
        let [bx, by] = config.targeting.base_point;

        Ok(Self::new(
            extractor,
            TemplateDetector::new(templates, config.detector.clone()),
            ColorSegmenter::new(config.segmenter.clone()),
            DetectionFuser::new(table, config.fusion.iou_threshold, (bx, by)),
            ThreatPrioritizer::new(
                config.targeting.pool_size,
                config.targeting.distance_tie_band,
            ),
        ))
    }

    pub fn process(&self, frame: &Frame) -> BotResult<FrameAnalysis> {
        let start = Instant::now();

        let crops = self.extractor.extract(frame)?;
        let template_hits = self.detector.detect(&crops.roi);
        let color_hits = self.segmenter.detect(&crops.critical);
        let (template_count, color_count) = (template_hits.len(), color_hits.len());

        let enemies = self.fuser.fuse(template_hits, color_hits);
        let (ranked, pool) = self.prioritizer.prioritize(enemies);

        let analysis = FrameAnalysis {
            seq: frame.seq(),
            ranked,
            pool,
            template_hits: template_count,
            color_hits: color_count,
            processing_time: start.elapsed(),
        };

        log::debug!(
            "🔍 Frame {}: {} template + {} color hits -> {} enemies, pool {} ({}ms, {}ms since capture)",
            analysis.seq,
            template_count,
            color_count,
            analysis.ranked.len(),
            analysis.pool.len(),
            analysis.processing_time.as_millis(),
            frame.captured_at().elapsed().as_millis()
        );

        Ok(analysis)
    }
}
