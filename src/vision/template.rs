//! Template assets: reference images plus enemy metadata

use crate::automation::types::{EnemyType, ThreatTier};
use crate::config::{TemplateAssetConfig, TemplateSetConfig};
use crate::error::{BotError, BotResult};
use image::GrayImage;
use std::path::Path;

/// Immutable reference image with the metadata needed to turn a match into a hit box.
#[derive(Debug, Clone)]
pub struct TemplateAsset {
    pub name: String,
    pub enemy_type: EnemyType,
    pub tier: ThreatTier,
    pub threshold: f32,
    pub image: GrayImage,
    /// Hit-box size reported for a match
    pub box_width: u32,
    pub box_height: u32,
    /// Subtracted from the match location to get the hit-box origin
    pub box_offset_x: i32,
    pub box_offset_y: i32,
    /// Same-template matches closer than this on both axes collapse into one
    pub nms_radius_x: u32,
    pub nms_radius_y: u32,
}

impl TemplateAsset {
    /// Build an asset from an in-memory image. Box size defaults to the image
    /// size and the suppression radius to half of it.
    pub fn new(name: impl Into<String>, enemy_type: EnemyType, threshold: f32, image: GrayImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            name: name.into(),
            enemy_type,
            tier: enemy_type.default_tier(),
            threshold,
            image,
            box_width: width,
            box_height: height,
            box_offset_x: 0,
            box_offset_y: 0,
            nms_radius_x: (width / 2).max(1),
            nms_radius_y: (height / 2).max(1),
        }
    }

    pub fn with_box(mut self, width: u32, height: u32, offset_x: i32, offset_y: i32) -> Self {
        self.box_width = width;
        self.box_height = height;
        self.box_offset_x = offset_x;
        self.box_offset_y = offset_y;
        self
    }

    pub fn with_tier(mut self, tier: ThreatTier) -> Self {
        self.tier = tier;
        self
    }

    pub fn load(config: &TemplateAssetConfig, directory: &Path) -> BotResult<Self> {
        let path = directory.join(&config.file);
        let image = image::open(&path)
            .map_err(|source| BotError::TemplateAsset {
                name: config.name.clone(),
                path: path.clone(),
                source,
            })?
            .to_luma8();

        let mut asset = Self::new(config.name.clone(), config.enemy_type, config.threshold, image);
        if let Some(tier) = config.tier {
            asset.tier = ThreatTier(tier);
        }
        if let Some([w, h]) = config.box_size {
            asset.box_width = w;
            asset.box_height = h;
        }
        [asset.box_offset_x, asset.box_offset_y] = config.box_offset;
        if let Some([rx, ry]) = config.nms_radius {
            asset.nms_radius_x = rx.max(1);
            asset.nms_radius_y = ry.max(1);
        }

        log::debug!(
            "📐 Template '{}' loaded: {}x{} -> {} box {}x{} offset ({},{}) threshold {:.2}",
            asset.name,
            asset.width(),
            asset.height(),
            asset.enemy_type,
            asset.box_width,
            asset.box_height,
            asset.box_offset_x,
            asset.box_offset_y,
            asset.threshold
        );

        Ok(asset)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Fixed collection of assets loaded at startup
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    assets: Vec<TemplateAsset>,
}

impl TemplateSet {
    pub fn from_assets(assets: Vec<TemplateAsset>) -> Self {
        Self { assets }
    }

    /// Load every configured asset. A single missing or unreadable file is fatal.
    pub fn load(config: &TemplateSetConfig) -> BotResult<Self> {
        let directory = config.directory.as_path();
        if !directory.is_dir() {
            return Err(BotError::TemplateDirectory {
                path: directory.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            });
        }

        let assets = config
            .assets
            .iter()
            .map(|asset| TemplateAsset::load(asset, directory))
            .collect::<BotResult<Vec<_>>>()?;

        log::info!(
            "✅ Loaded {} templates from {}",
            assets.len(),
            directory.display()
        );
        Ok(Self { assets })
    }

    pub fn assets(&self) -> &[TemplateAsset] {
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use std::path::PathBuf;

    fn template_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("storm-sentry-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        GrayImage::from_pixel(12, 8, Luma([200]))
            .save(dir.join("tank_template.png"))
            .unwrap();
        dir
    }

    fn tank_config() -> TemplateAssetConfig {
        TemplateAssetConfig {
            name: "tank".to_string(),
            file: "tank_template.png".to_string(),
            enemy_type: EnemyType::Tank,
            tier: None,
            threshold: 0.8,
            box_size: None,
            box_offset: [0, 0],
            nms_radius: None,
        }
    }

    #[test]
    fn test_load_applies_overrides() {
        let dir = template_dir("asset-overrides");
        let config = TemplateAssetConfig {
            tier: Some(9),
            box_size: Some([20, 30]),
            box_offset: [3, -4],
            nms_radius: Some([0, 5]),
            ..tank_config()
        };

        let asset = TemplateAsset::load(&config, &dir).unwrap();
        assert_eq!(asset.name, "tank");
        assert_eq!(asset.enemy_type, EnemyType::Tank);
        assert_eq!(asset.tier, ThreatTier(9));
        assert_eq!((asset.width(), asset.height()), (12, 8));
        assert_eq!((asset.box_width, asset.box_height), (20, 30));
        assert_eq!((asset.box_offset_x, asset.box_offset_y), (3, -4));
        assert_eq!((asset.nms_radius_x, asset.nms_radius_y), (1, 5));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_defaults_follow_image_size() {
        let dir = template_dir("asset-defaults");

        let asset = TemplateAsset::load(&tank_config(), &dir).unwrap();
        assert_eq!(asset.tier, EnemyType::Tank.default_tier());
        assert_eq!((asset.box_width, asset.box_height), (12, 8));
        assert_eq!((asset.box_offset_x, asset.box_offset_y), (0, 0));
        assert_eq!((asset.nms_radius_x, asset.nms_radius_y), (6, 4));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_missing_file_is_fatal() {
        let dir = template_dir("asset-missing");
        let config = TemplateAssetConfig {
            file: "apache_template.png".to_string(),
            ..tank_config()
        };

        let err = TemplateAsset::load(&config, &dir).unwrap_err();
        assert!(matches!(&err, BotError::TemplateAsset { name, .. } if name == "tank"));
        assert!(err.is_startup_fatal());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_set_load_checks_directory() {
        let missing = TemplateSetConfig {
            directory: std::env::temp_dir().join("storm-sentry-no-such-templates"),
            assets: vec![tank_config()],
        };
        let err = TemplateSet::load(&missing).unwrap_err();
        assert!(matches!(err, BotError::TemplateDirectory { .. }));
        assert!(err.is_startup_fatal());

        let dir = template_dir("set-load");
        let config = TemplateSetConfig {
            directory: dir.clone(),
            assets: vec![tank_config()],
        };
        let set = TemplateSet::load(&config).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.assets()[0].name, "tank");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
