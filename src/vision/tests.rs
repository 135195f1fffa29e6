use super::*;
use crate::automation::types::EnemyType;
use crate::config::{DetectorConfig, SegmenterConfig};
use image::{GrayImage, Luma, Rgb, RgbImage};

const UNIT: u8 = 50;

/// 6x6 marker: 4x4 white square with a one pixel black border
fn badge() -> GrayImage {
    GrayImage::from_fn(6, 6, |x, y| {
        if (1..5).contains(&x) && (1..5).contains(&y) {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

fn paint_rect(image: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, value: u8) {
    for py in y..y + h {
        for px in x..x + w {
            image.put_pixel(px, py, Rgb([value; 3]));
        }
    }
}

/// Unit body with the badge two pixels above it, badge centred horizontally
fn paint_badged_unit(image: &mut RgbImage, ux: u32, uy: u32) {
    paint_rect(image, ux, uy, 10, 28, UNIT);
    paint_rect(image, ux + 2, uy - 8, 6, 6, 0);
    paint_rect(image, ux + 3, uy - 7, 4, 4, 255);
}

fn badge_asset() -> TemplateAsset {
    TemplateAsset::new("soldier", EnemyType::Soldier, 0.9, badge()).with_box(10, 28, 2, -8)
}

fn unit_segmenter() -> SegmenterConfig {
    SegmenterConfig {
        gray_min: 40,
        gray_max: 60,
        ..SegmenterConfig::default()
    }
}

fn crowd_extractor() -> RoiExtractor {
    RoiExtractor::new(
        Region::new(0, 50, 500, 350),
        Region::new(350, 200, 150, 200),
        650,
        520,
    )
    .unwrap()
}

#[test]
fn test_template_found_at_pasted_location() {
    let mut roi = GrayImage::new(40, 40);
    for (x, y, pixel) in badge().enumerate_pixels() {
        roi.put_pixel(12 + x, 20 + y, *pixel);
    }

    let detector = TemplateDetector::new(
        TemplateSet::from_assets(vec![badge_asset()]),
        DetectorConfig::default(),
    );
    let hits = detector.detect_gray(&roi, 100, 50);

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].source, DetectionSource::TemplateMatch);
    assert_eq!(hits[0].shape_id, "soldier");
    assert_eq!(hits[0].bbox, BBox::new(100 + 12 - 2, 50 + 20 + 8, 10, 28));
    assert!(hits[0].confidence >= 0.99);
}

#[test]
fn test_template_larger_than_region_skipped() {
    let detector = TemplateDetector::new(
        TemplateSet::from_assets(vec![badge_asset()]),
        DetectorConfig::default(),
    );
    assert!(detector.detect_gray(&GrayImage::new(4, 4), 0, 0).is_empty());
}

#[test]
fn test_oversized_template_skipped() {
    let config = DetectorConfig {
        max_template_pixels: 10,
        ..DetectorConfig::default()
    };
    let detector = TemplateDetector::new(TemplateSet::from_assets(vec![badge_asset()]), config);
    let mut roi = GrayImage::new(20, 20);
    for (x, y, pixel) in badge().enumerate_pixels() {
        roi.put_pixel(x, y, *pixel);
    }
    assert!(detector.detect_gray(&roi, 0, 0).is_empty());
}

#[test]
fn test_suppression_collapses_cluster() {
    let cluster = vec![
        MatchCandidate { x: 10, y: 10, score: 0.91 },
        MatchCandidate { x: 11, y: 10, score: 0.97 },
        MatchCandidate { x: 12, y: 11, score: 0.93 },
        MatchCandidate { x: 40, y: 10, score: 0.90 },
    ];

    let kept = suppress_nearby(cluster, 5, 5);
    assert_eq!(kept.len(), 2);
    assert_eq!((kept[0].x, kept[0].y), (11, 10));
    assert_eq!((kept[1].x, kept[1].y), (40, 10));
}

#[test]
fn test_suppression_is_idempotent() {
    let candidates: Vec<MatchCandidate> = (0..30)
        .map(|i| MatchCandidate {
            x: (i * 7) % 50,
            y: (i * 13) % 40,
            score: 0.8 + (i % 9) as f32 * 0.02,
        })
        .collect();

    let once = suppress_nearby(candidates, 6, 6);
    let twice = suppress_nearby(once.clone(), 6, 6);
    assert_eq!(once, twice);
    for (i, a) in once.iter().enumerate() {
        for b in &once[i + 1..] {
            assert!(a.x.abs_diff(b.x) >= 6 || a.y.abs_diff(b.y) >= 6);
        }
    }
}

#[test]
fn test_segmenter_empty_region_has_no_blobs() {
    let crop = RegionCrop {
        image: RgbImage::from_pixel(150, 200, Rgb([120, 140, 90])),
        offset_x: 350,
        offset_y: 200,
    };
    assert!(ColorSegmenter::new(SegmenterConfig::default()).detect(&crop).is_empty());
}

#[test]
fn test_segmenter_filters_speckle_and_corpses() {
    let mut image = RgbImage::from_pixel(150, 200, Rgb([120, 120, 120]));
    // Standing unit
    paint_rect(&mut image, 10, 20, 10, 28, 4);
    // Speckle: survives the opening but both sides are under 10
    paint_rect(&mut image, 60, 20, 6, 6, 4);
    // Corpse: wide and flat
    paint_rect(&mut image, 60, 100, 30, 8, 4);

    let crop = RegionCrop {
        image,
        offset_x: 350,
        offset_y: 200,
    };
    let hits = ColorSegmenter::new(SegmenterConfig::default()).detect(&crop);

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].source, DetectionSource::ColorSegment);
    assert_eq!(hits[0].bbox, BBox::new(360, 220, 10, 28));
    assert!((hits[0].confidence - 1.0).abs() < 1e-6);
}

fn segment_crop(image: RgbImage) -> Vec<RawDetection> {
    let crop = RegionCrop {
        image,
        offset_x: 350,
        offset_y: 200,
    };
    ColorSegmenter::new(SegmenterConfig::default()).detect(&crop)
}

#[test]
fn test_touching_units_merge_into_one_blob() {
    let mut image = RgbImage::from_pixel(150, 200, Rgb([120, 120, 120]));
    paint_rect(&mut image, 10, 20, 10, 28, 4);
    paint_rect(&mut image, 20, 20, 10, 28, 4);

    let hits = segment_crop(image);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].bbox, BBox::new(360, 220, 20, 28));
    assert!((hits[0].confidence - 1.0).abs() < 1e-6);
}

#[test]
fn test_closing_bridges_one_pixel_gap_between_units() {
    let mut image = RgbImage::from_pixel(150, 200, Rgb([120, 120, 120]));
    paint_rect(&mut image, 10, 20, 10, 28, 4);
    paint_rect(&mut image, 21, 20, 10, 28, 4);

    let hits = segment_crop(image);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].bbox, BBox::new(360, 220, 21, 28));
}

#[test]
fn test_units_three_pixels_apart_stay_separate() {
    let mut image = RgbImage::from_pixel(150, 200, Rgb([120, 120, 120]));
    paint_rect(&mut image, 10, 20, 10, 28, 4);
    paint_rect(&mut image, 23, 20, 10, 28, 4);

    let hits = segment_crop(image);
    assert_eq!(hits.len(), 2);
    let mut boxes: Vec<BBox> = hits.iter().map(|h| h.bbox).collect();
    boxes.sort_by_key(|b| b.x);
    assert_eq!(boxes, vec![BBox::new(360, 220, 10, 28), BBox::new(373, 220, 10, 28)]);
}

#[test]
fn test_opening_removes_single_pixel_noise() {
    let segmenter = ColorSegmenter::new(SegmenterConfig::default());
    let mut gray = GrayImage::from_pixel(30, 30, Luma([200]));
    gray.put_pixel(5, 5, Luma([0]));
    gray.put_pixel(20, 7, Luma([3]));

    let mask = segmenter.clean_mask(&segmenter.band_mask(&gray));
    assert!(extract_blobs(&mask).is_empty());
}

#[test]
fn test_disabled_segmenter_reports_nothing() {
    let mut image = RgbImage::from_pixel(50, 50, Rgb([120, 120, 120]));
    paint_rect(&mut image, 10, 10, 10, 28, 0);
    let config = SegmenterConfig {
        enabled: false,
        ..SegmenterConfig::default()
    };
    let crop = RegionCrop {
        image,
        offset_x: 0,
        offset_y: 0,
    };
    assert!(ColorSegmenter::new(config).detect(&crop).is_empty());
}

#[test]
fn test_crowd_in_critical_region_seen_by_both_detectors() {
    let mut image = RgbImage::new(650, 520);
    let xs = [355, 380, 405, 430, 455];
    for (i, &x) in xs.iter().enumerate() {
        if i < 2 {
            paint_badged_unit(&mut image, x, 250);
        } else {
            paint_rect(&mut image, x, 250, 10, 28, UNIT);
        }
    }

    let crops = crowd_extractor().extract(&Frame::new(1, image)).unwrap();
    let detector = TemplateDetector::new(
        TemplateSet::from_assets(vec![badge_asset()]),
        DetectorConfig::default(),
    );
    let template_hits = detector.detect(&crops.roi);
    let color_hits = ColorSegmenter::new(unit_segmenter()).detect(&crops.critical);

    assert_eq!(template_hits.len(), 2);
    assert_eq!(color_hits.len(), 5);
    for hit in &template_hits {
        assert!(
            color_hits.iter().any(|c| c.bbox == hit.bbox),
            "template box {:?} should coincide with a blob",
            hit.bbox
        );
    }
}

#[test]
fn test_wrong_frame_size_rejected() {
    let err = crowd_extractor()
        .extract(&Frame::new(9, RgbImage::new(640, 480)))
        .unwrap_err();
    assert!(matches!(
        err,
        crate::error::BotError::FrameSizeMismatch { seq: 9, .. }
    ));
}
