//! Image side of the pipeline
//!
//! Region extraction, multi-template matching over the processing ROI and
//! colour segmentation of the critical sub-region. Everything here is
//! frame-scoped and rebuilt from scratch every tick.

pub mod bbox;
pub mod detection;
pub mod detector;
pub mod frame;
pub mod region;
pub mod segmenter;
pub mod template;

#[cfg(test)]
mod tests;

// Re-export main types and functions
pub use bbox::BBox;
pub use detection::{DetectionSource, RawDetection};
pub use detector::{MatchCandidate, TemplateDetector, suppress_nearby};
pub use frame::Frame;
pub use region::{Region, RegionCrop, RoiCrops, RoiExtractor};
pub use segmenter::{Blob, ColorSegmenter, extract_blobs};
pub use template::{TemplateAsset, TemplateSet};
