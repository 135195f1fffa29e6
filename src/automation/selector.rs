//! Per-frame target pick from the pool

use super::types::{ClassifiedEnemy, SelectedTarget};
use crate::config::StickinessConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Picks one pool member uniformly at random.
///
/// With stickiness enabled, a pool member within `radius` of last frame's
/// target is preferred (the nearest one). Only the position hint survives
/// between frames.
pub struct TargetSelector<R: Rng = StdRng> {
    rng: R,
    stickiness: StickinessConfig,
    last_hint: Option<(f32, f32)>,
}

impl TargetSelector<StdRng> {
    /// Seeded when a seed is given, entropy otherwise
    pub fn from_seed(seed: Option<u64>, stickiness: StickinessConfig) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(rng, stickiness)
    }
}

impl<R: Rng> TargetSelector<R> {
    pub fn with_rng(rng: R, stickiness: StickinessConfig) -> Self {
        Self {
            rng,
            stickiness,
            last_hint: None,
        }
    }

    pub fn last_hint(&self) -> Option<(f32, f32)> {
        self.last_hint
    }

    pub fn select(&mut self, pool: &[ClassifiedEnemy]) -> Option<SelectedTarget> {
        if pool.is_empty() {
            self.last_hint = None;
            return None;
        }

        let index = self
            .sticky_index(pool)
            .unwrap_or_else(|| self.rng.gen_range(0..pool.len()));

        let target = SelectedTarget::new(pool[index].clone());
        self.last_hint = Some(target.position_hint);
        Some(target)
    }

    fn sticky_index(&self, pool: &[ClassifiedEnemy]) -> Option<usize> {
        if !self.stickiness.enabled {
            return None;
        }
        let (hx, hy) = self.last_hint?;

        pool.iter()
            .enumerate()
            .map(|(i, enemy)| {
                let (cx, cy) = enemy.center();
                (i, ((cx - hx).powi(2) + (cy - hy).powi(2)).sqrt())
            })
            .filter(|(_, d)| *d <= self.stickiness.radius)
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| i)
    }
}
