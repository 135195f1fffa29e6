//! Session configuration, loaded once before the frame loop starts

use crate::automation::types::{AutoStop, EnemyType};
use crate::error::{BotError, BotResult};
use crate::vision::Region;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub capture: CaptureConfig,
    /// Full processing ROI, frame coordinates
    pub processing_region: Region,
    /// Sub-region where colour segmentation runs
    pub critical_region: Region,
    pub templates: TemplateSetConfig,
    pub detector: DetectorConfig,
    pub segmenter: SegmenterConfig,
    pub fusion: FusionConfig,
    pub targeting: TargetingConfig,
    pub fire: FireConfig,
    pub menus: MenuSignalConfig,
    pub reload: ReloadSignalConfig,
    /// Log an engagement summary every N processed frames, 0 disables it
    pub summary_interval_frames: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            capture: CaptureConfig::default(),
            processing_region: Region::new(0, 50, 500, 350),
            critical_region: Region::new(350, 200, 150, 200),
            templates: TemplateSetConfig::default(),
            detector: DetectorConfig::default(),
            segmenter: SegmenterConfig::default(),
            fusion: FusionConfig::default(),
            targeting: TargetingConfig::default(),
            fire: FireConfig::default(),
            menus: MenuSignalConfig::default(),
            reload: ReloadSignalConfig::default(),
            summary_interval_frames: 300,
        }
    }
}

impl BotConfig {
    /// Load a JSON config file. Missing keys fall back to defaults.
    pub fn load(path: &Path) -> BotResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| BotError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: BotConfig =
            serde_json::from_str(&content).map_err(|source| BotError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        log::info!("✓ Loaded config from: {}", path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> BotResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| BotError::InvalidConfig {
            description: format!("config not serializable: {e}"),
        })
    }

    /// Static checks run once at startup
    pub fn validate(&self) -> BotResult<()> {
        let (w, h) = (self.capture.width, self.capture.height);
        if w == 0 || h == 0 {
            return invalid(format!("capture size {w}x{h} is empty"));
        }

        for (name, region) in [
            ("processing", &self.processing_region),
            ("critical", &self.critical_region),
        ] {
            if !region.fits_within(w, h) {
                return Err(BotError::RegionOutOfBounds {
                    name: name.to_string(),
                    x: region.x,
                    y: region.y,
                    width: region.width,
                    height: region.height,
                    bound_width: w,
                    bound_height: h,
                });
            }
        }

        if self.targeting.pool_size == 0 {
            return invalid("targeting.pool_size must be at least 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.fusion.iou_threshold) {
            return invalid(format!(
                "fusion.iou_threshold {} outside [0, 1]",
                self.fusion.iou_threshold
            ));
        }
        if self.segmenter.gray_min > self.segmenter.gray_max {
            return invalid(format!(
                "segmenter gray band [{}, {}] is empty",
                self.segmenter.gray_min, self.segmenter.gray_max
            ));
        }
        if self.capture.frame_interval_ms == 0 {
            return invalid("capture.frame_interval_ms must be positive".to_string());
        }

        let mut names = HashSet::new();
        for asset in &self.templates.assets {
            if !(0.0..=1.0).contains(&asset.threshold) {
                return invalid(format!(
                    "template '{}' threshold {} outside [0, 1]",
                    asset.name, asset.threshold
                ));
            }
            if !names.insert(asset.name.as_str()) {
                return invalid(format!("duplicate template name '{}'", asset.name));
            }
        }
        if names.contains(self.segmenter.shape_id.as_str()) {
            return invalid(format!(
                "segmenter shape id '{}' collides with a template name",
                self.segmenter.shape_id
            ));
        }

        Ok(())
    }
}

fn invalid(description: String) -> BotResult<()> {
    Err(BotError::InvalidConfig { description })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub monitor: u32,
    /// Screen position of the game window's top-left corner
    pub window_origin: [i32; 2],
    pub width: u32,
    pub height: u32,
    pub frame_interval_ms: u64,
    /// Directory of PNG frames replayed by the bundled capture provider
    pub replay_dir: Option<PathBuf>,
    pub loop_replay: bool,
    pub retry: RetryConfig,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            monitor: 2,
            window_origin: [10, 130],
            width: 650,
            height: 520,
            frame_interval_ms: 33,
            replay_dir: None,
            loop_replay: false,
            retry: RetryConfig::default(),
        }
    }
}

impl CaptureConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

/// Bounded reconnect policy for a lost capture provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff_ms: 200,
            max_backoff_ms: 3_000,
        }
    }
}

impl RetryConfig {
    /// Delay before the given 1-based attempt, doubling up to the cap
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(16);
        Duration::from_millis(
            self.initial_backoff_ms
                .saturating_mul(factor)
                .min(self.max_backoff_ms),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSetConfig {
    pub directory: PathBuf,
    pub assets: Vec<TemplateAssetConfig>,
}

impl Default for TemplateSetConfig {
    fn default() -> Self {
        let asset = |name: &str,
                     enemy_type: EnemyType,
                     threshold: f32,
                     box_size: [u32; 2],
                     box_offset: [i32; 2]| TemplateAssetConfig {
            name: name.to_string(),
            file: format!("{name}_template.png"),
            enemy_type,
            tier: None,
            threshold,
            box_size: Some(box_size),
            box_offset,
            nms_radius: None,
        };

        Self {
            directory: PathBuf::from("template_images"),
            assets: vec![
                asset("soldier", EnemyType::Soldier, 0.85, [10, 28], [0, 0]),
                asset("gunner", EnemyType::Gunner, 0.85, [12, 28], [2, 0]),
                asset("jeep", EnemyType::Jeep, 0.80, [77, 35], [52, 12]),
                asset("flyer", EnemyType::FlyingSoldier, 0.80, [14, 38], [0, 0]),
                asset("flame_thrower", EnemyType::FlameThrower, 0.75, [22, 42], [10, 0]),
                asset("apache", EnemyType::Apache, 0.96, [120, 30], [80, 15]),
                asset("tank", EnemyType::Tank, 0.86, [145, 55], [75, 2]),
                asset("robot", EnemyType::Robot, 0.98, [85, 130], [20, 8]),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateAssetConfig {
    pub name: String,
    /// File name relative to the template directory
    pub file: String,
    pub enemy_type: EnemyType,
    /// Overrides the enemy type's default threat tier
    #[serde(default)]
    pub tier: Option<u8>,
    pub threshold: f32,
    /// Hit-box size; the template's own size when absent
    #[serde(default)]
    pub box_size: Option<[u32; 2]>,
    #[serde(default)]
    pub box_offset: [i32; 2],
    /// Same-template suppression radius; half the template size when absent
    #[serde(default)]
    pub nms_radius: Option<[u32; 2]>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub max_matches_per_template: usize,
    pub max_template_pixels: u64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            max_matches_per_template: 32,
            max_template_pixels: 40_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    pub enabled: bool,
    /// Inclusive gray band isolating the unit colour
    pub gray_min: u8,
    pub gray_max: u8,
    /// Square structuring element radius, 1 => 3x3
    pub open_radius: u8,
    pub close_radius: u8,
    /// Blobs with both sides under this are speckle
    pub min_blob_size: u32,
    /// Blobs wider than this and shorter than `corpse_max_height` are dead units
    pub corpse_min_width: u32,
    pub corpse_max_height: u32,
    /// Area of one unit; blob area over this gives the synthetic confidence
    pub expected_blob_area: f32,
    pub shape_id: String,
    pub enemy_type: EnemyType,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            gray_min: 0,
            gray_max: 8,
            open_radius: 1,
            close_radius: 1,
            min_blob_size: 10,
            corpse_min_width: 10,
            corpse_max_height: 20,
            expected_blob_area: 280.0,
            shape_id: "dark_blob".to_string(),
            enemy_type: EnemyType::Soldier,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Detections overlapping above this IoU count as the same enemy
    pub iou_threshold: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self { iou_threshold: 0.3 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetingConfig {
    /// Maximum target pool size K
    pub pool_size: usize,
    /// Pool members must also lie within this distance of the nearest top-tier enemy
    pub distance_tie_band: Option<f32>,
    /// Defended base point in frame coordinates
    pub base_point: [f32; 2],
    /// Fixed selector seed; entropy when absent
    pub seed: Option<u64>,
    pub stickiness: StickinessConfig,
}

impl Default for TargetingConfig {
    fn default() -> Self {
        Self {
            pool_size: 4,
            distance_tie_band: None,
            base_point: [500.0, 175.0],
            seed: None,
            stickiness: StickinessConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StickinessConfig {
    pub enabled: bool,
    /// Pool members within this many pixels of last frame's target are preferred
    pub radius: f32,
}

impl Default for StickinessConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            radius: 12.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FireConfig {
    pub min_fire_delay_ms: u64,
}

impl Default for FireConfig {
    fn default() -> Self {
        Self {
            min_fire_delay_ms: 200,
        }
    }
}

impl FireConfig {
    pub fn min_fire_delay(&self) -> Duration {
        Duration::from_millis(self.min_fire_delay_ms)
    }
}

/// Single sample pixel compared with known menu colours
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuSignalConfig {
    pub enabled: bool,
    pub point: [u32; 2],
    pub signatures: Vec<MenuSignature>,
}

impl Default for MenuSignalConfig {
    fn default() -> Self {
        let signature = |kind, rgb, debounce_frames| MenuSignature {
            kind,
            rgb,
            tolerance: 0,
            debounce_frames,
        };
        Self {
            enabled: true,
            point: [5, 220],
            signatures: vec![
                signature(AutoStop::DayEnd, [182, 178, 175], 0),
                signature(AutoStop::PauseMenu, [132, 126, 120], 2),
                signature(AutoStop::DeathMenu, [108, 64, 58], 2),
                signature(AutoStop::ShopMenu, [104, 102, 101], 2),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuSignature {
    pub kind: AutoStop,
    pub rgb: [u8; 3],
    #[serde(default)]
    pub tolerance: u8,
    /// Signal fires once the colour has been seen on more than this many consecutive frames
    #[serde(default)]
    pub debounce_frames: u32,
}

/// Ammunition bar sample pixels
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReloadSignalConfig {
    pub enabled: bool,
    pub start_point: [u32; 2],
    pub end_point: [u32; 2],
    /// Colour of an empty bar slot
    pub empty_rgb: [u8; 3],
    pub tolerance: u8,
}

impl Default for ReloadSignalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            start_point: [8, 10],
            end_point: [208, 10],
            empty_rgb: [46, 34, 38],
            tolerance: 20,
        }
    }
}
