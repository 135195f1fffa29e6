//! Pixel samples for day-end/menu screens and the ammunition bar

use super::types::AutoStop;
use crate::config::{MenuSignalConfig, ReloadSignalConfig};
use crate::vision::Frame;

fn color_close(a: [u8; 3], b: [u8; 3], tolerance: u8) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| x.abs_diff(*y) <= tolerance)
}

/// Polled once per frame to decide on an automatic stop.
///
/// Explosions can flash a menu colour for a frame or two, so each signature
/// only fires after its colour has been seen on more than `debounce_frames`
/// consecutive frames. The counter resets as soon as no signature matches.
pub struct MenuDetector {
    config: MenuSignalConfig,
    streak: Option<(AutoStop, u32)>,
}

impl MenuDetector {
    pub fn new(config: MenuSignalConfig) -> Self {
        Self {
            config,
            streak: None,
        }
    }

    pub fn reset(&mut self) {
        self.streak = None;
    }

    pub fn poll(&mut self, frame: &Frame) -> Option<AutoStop> {
        if !self.config.enabled {
            return None;
        }

        let [x, y] = self.config.point;
        let Some(pixel) = frame.pixel(x, y) else {
            log::warn!("⚠️ Menu sample pixel ({x},{y}) outside frame {}", frame.seq());
            return None;
        };

        let Some(signature) = self
            .config
            .signatures
            .iter()
            .find(|s| color_close(pixel, s.rgb, s.tolerance))
        else {
            self.streak = None;
            return None;
        };

        let count = match self.streak {
            Some((kind, count)) if kind == signature.kind => count + 1,
            _ => 1,
        };

        if count > signature.debounce_frames {
            log::info!(
                "🛑 {:?} detected at sample pixel ({x},{y}) = {:?}",
                signature.kind,
                pixel
            );
            self.streak = None;
            Some(signature.kind)
        } else {
            self.streak = Some((signature.kind, count));
            None
        }
    }
}

/// Tracks whether the weapon is reloading from two ammunition-bar sample pixels
pub struct ReloadMonitor {
    config: ReloadSignalConfig,
    reloading: bool,
}

impl ReloadMonitor {
    pub fn new(config: ReloadSignalConfig) -> Self {
        Self {
            config,
            reloading: false,
        }
    }

    pub fn is_reloading(&self) -> bool {
        self.reloading
    }

    /// Update from a frame and return the current reloading flag
    pub fn update(&mut self, frame: &Frame) -> bool {
        if !self.config.enabled {
            return false;
        }

        let [sx, sy] = self.config.start_point;
        let [ex, ey] = self.config.end_point;
        let empty = self.config.empty_rgb;
        let tolerance = self.config.tolerance;

        if !self.reloading {
            if let Some(start) = frame.pixel(sx, sy)
                && !color_close(start, empty, tolerance)
            {
                log::debug!("🔄 Reloading");
                self.reloading = true;
            }
        } else if let Some(end) = frame.pixel(ex, ey)
            && color_close(end, empty, tolerance)
        {
            log::debug!("🔄 Reloaded");
            self.reloading = false;
        }

        self.reloading
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MenuSignature;
    use image::{Rgb, RgbImage};

    fn frame_with(point: (u32, u32), rgb: [u8; 3]) -> Frame {
        let mut image = RgbImage::from_pixel(64, 64, Rgb([30, 90, 30]));
        image.put_pixel(point.0, point.1, Rgb(rgb));
        Frame::new(0, image)
    }

    fn menu_config() -> MenuSignalConfig {
        MenuSignalConfig {
            enabled: true,
            point: [5, 20],
            signatures: vec![
                MenuSignature {
                    kind: AutoStop::DayEnd,
                    rgb: [182, 178, 175],
                    tolerance: 0,
                    debounce_frames: 0,
                },
                MenuSignature {
                    kind: AutoStop::PauseMenu,
                    rgb: [132, 126, 120],
                    tolerance: 0,
                    debounce_frames: 2,
                },
            ],
        }
    }

    #[test]
    fn test_day_end_fires_immediately() {
        let mut detector = MenuDetector::new(menu_config());
        assert_eq!(
            detector.poll(&frame_with((5, 20), [182, 178, 175])),
            Some(AutoStop::DayEnd)
        );
    }

    #[test]
    fn test_pause_menu_debounced() {
        let mut detector = MenuDetector::new(menu_config());
        let pause = frame_with((5, 20), [132, 126, 120]);

        assert_eq!(detector.poll(&pause), None);
        assert_eq!(detector.poll(&pause), None);
        assert_eq!(detector.poll(&pause), Some(AutoStop::PauseMenu));
    }

    #[test]
    fn test_flash_resets_streak() {
        let mut detector = MenuDetector::new(menu_config());
        let pause = frame_with((5, 20), [132, 126, 120]);
        let battle = frame_with((5, 20), [30, 90, 30]);

        assert_eq!(detector.poll(&pause), None);
        assert_eq!(detector.poll(&pause), None);
        assert_eq!(detector.poll(&battle), None);
        assert_eq!(detector.poll(&pause), None);
        assert_eq!(detector.poll(&pause), None);
        assert_eq!(detector.poll(&pause), Some(AutoStop::PauseMenu));
    }

    #[test]
    fn test_reload_cycle() {
        let config = ReloadSignalConfig {
            enabled: true,
            start_point: [8, 10],
            end_point: [40, 10],
            empty_rgb: [46, 34, 38],
            tolerance: 20,
        };
        let mut monitor = ReloadMonitor::new(config);

        let mut full = RgbImage::from_pixel(64, 64, Rgb([46, 34, 38]));
        assert!(!monitor.update(&Frame::new(0, full.clone())));

        // Bar drained: start slot no longer has the bar colour
        full.put_pixel(8, 10, Rgb([200, 200, 200]));
        full.put_pixel(40, 10, Rgb([200, 200, 200]));
        assert!(monitor.update(&Frame::new(1, full.clone())));
        assert!(monitor.is_reloading());

        // Refill reaches the end slot
        full.put_pixel(40, 10, Rgb([50, 30, 40]));
        assert!(!monitor.update(&Frame::new(2, full)));
    }
}
