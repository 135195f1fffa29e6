//! Per-frame detections before classification

use super::bbox::BBox;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionSource {
    TemplateMatch,
    ColorSegment,
}

impl fmt::Display for DetectionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectionSource::TemplateMatch => f.write_str("template"),
            DetectionSource::ColorSegment => f.write_str("color"),
        }
    }
}

/// One detection in frame coordinates. Produced fresh every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    pub bbox: BBox,
    pub confidence: f32,
    pub source: DetectionSource,
    /// Template name for template matches, shape id for color blobs
    pub shape_id: String,
}

impl RawDetection {
    pub fn template(bbox: BBox, confidence: f32, template_name: impl Into<String>) -> Self {
        Self {
            bbox,
            confidence,
            source: DetectionSource::TemplateMatch,
            shape_id: template_name.into(),
        }
    }

    pub fn color(bbox: BBox, confidence: f32, shape_id: impl Into<String>) -> Self {
        Self {
            bbox,
            confidence,
            source: DetectionSource::ColorSegment,
            shape_id: shape_id.into(),
        }
    }
}
