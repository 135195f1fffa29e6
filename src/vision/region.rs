//! Processing regions and ROI extraction

use super::bbox::BBox;
use super::frame::Frame;
use crate::error::{BotError, BotResult};
use image::RgbImage;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in frame coordinates, loaded once from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check if this region is valid (non-zero dimensions)
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn fits_within(&self, bound_width: u32, bound_height: u32) -> bool {
        self.is_valid()
            && self.x.saturating_add(self.width) <= bound_width
            && self.y.saturating_add(self.height) <= bound_height
    }

    fn ensure_within(&self, name: &str, bound_width: u32, bound_height: u32) -> BotResult<()> {
        if self.fits_within(bound_width, bound_height) {
            Ok(())
        } else {
            Err(BotError::RegionOutOfBounds {
                name: name.to_string(),
                x: self.x,
                y: self.y,
                width: self.width,
                height: self.height,
                bound_width,
                bound_height,
            })
        }
    }
}

/// A cropped sub-buffer plus the offset needed to map its coordinates back
/// into the full frame.
#[derive(Debug, Clone)]
pub struct RegionCrop {
    pub image: RgbImage,
    pub offset_x: u32,
    pub offset_y: u32,
}

impl RegionCrop {
    /// Map a box expressed in crop coordinates into frame coordinates
    pub fn to_frame(&self, bbox: BBox) -> BBox {
        bbox.translate(self.offset_x as i32, self.offset_y as i32)
    }
}

/// Both processing windows of one frame
#[derive(Debug, Clone)]
pub struct RoiCrops {
    pub roi: RegionCrop,
    pub critical: RegionCrop,
}

/// Crops each frame to the processing ROI and the critical sub-region.
#[derive(Debug, Clone)]
pub struct RoiExtractor {
    roi: Region,
    critical: Region,
    frame_width: u32,
    frame_height: u32,
}

impl RoiExtractor {
    /// Validates both regions against the expected capture size.
    /// Any region outside the capture bounds is a startup error.
    pub fn new(roi: Region, critical: Region, frame_width: u32, frame_height: u32) -> BotResult<Self> {
        roi.ensure_within("processing", frame_width, frame_height)?;
        critical.ensure_within("critical", frame_width, frame_height)?;
        Ok(Self {
            roi,
            critical,
            frame_width,
            frame_height,
        })
    }

    pub fn extract(&self, frame: &Frame) -> BotResult<RoiCrops> {
        if frame.width() != self.frame_width || frame.height() != self.frame_height {
            return Err(BotError::FrameSizeMismatch {
                seq: frame.seq(),
                width: frame.width(),
                height: frame.height(),
                expected_width: self.frame_width,
                expected_height: self.frame_height,
            });
        }

        Ok(RoiCrops {
            roi: Self::crop(frame, &self.roi),
            critical: Self::crop(frame, &self.critical),
        })
    }

    fn crop(frame: &Frame, region: &Region) -> RegionCrop {
        let view = image::imageops::crop_imm(
            frame.image(),
            region.x,
            region.y,
            region.width,
            region.height,
        );
        RegionCrop {
            image: view.to_image(),
            offset_x: region.x,
            offset_y: region.y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_region_rejected_outside_capture() {
        let roi = Region::new(0, 50, 500, 350);
        let critical = Region::new(600, 200, 150, 200);

        let err = RoiExtractor::new(roi, critical, 650, 520).unwrap_err();
        assert!(matches!(err, BotError::RegionOutOfBounds { ref name, .. } if name == "critical"));
        assert!(err.is_startup_fatal());
    }

    #[test]
    fn test_zero_sized_region_is_invalid() {
        let roi = Region::new(0, 0, 0, 10);
        assert!(!roi.is_valid());
        assert!(RoiExtractor::new(roi, Region::new(0, 0, 5, 5), 10, 10).is_err());
    }

    #[test]
    fn test_extract_records_offsets() {
        let mut image = RgbImage::new(40, 30);
        image.put_pixel(12, 7, Rgb([9, 9, 9]));
        let frame = Frame::new(1, image);

        let extractor =
            RoiExtractor::new(Region::new(10, 5, 20, 20), Region::new(0, 0, 8, 8), 40, 30).unwrap();
        let crops = extractor.extract(&frame).unwrap();

        assert_eq!(crops.roi.image.dimensions(), (20, 20));
        assert_eq!(crops.roi.image.get_pixel(2, 2).0, [9, 9, 9]);
        assert_eq!(crops.critical.image.dimensions(), (8, 8));
        assert_eq!(
            crops.roi.to_frame(BBox::new(2, 2, 4, 4)),
            BBox::new(12, 7, 4, 4)
        );
    }

    #[test]
    fn test_extract_rejects_wrong_frame_size() {
        let extractor =
            RoiExtractor::new(Region::new(0, 0, 10, 10), Region::new(0, 0, 5, 5), 40, 30).unwrap();
        let frame = Frame::new(3, RgbImage::new(20, 20));
        assert!(matches!(
            extractor.extract(&frame),
            Err(BotError::FrameSizeMismatch { seq: 3, .. })
        ));
    }
}
