//! Threat ordering and target-pool construction

use super::types::ClassifiedEnemy;
use std::cmp::Ordering;

/// Threat tier descending, then distance to base ascending
pub fn priority_order(a: &ClassifiedEnemy, b: &ClassifiedEnemy) -> Ordering {
    b.tier.cmp(&a.tier).then_with(|| {
        a.distance_to_base
            .partial_cmp(&b.distance_to_base)
            .unwrap_or(Ordering::Equal)
    })
}

pub struct ThreatPrioritizer {
    pool_size: usize,
    distance_tie_band: Option<f32>,
}

impl ThreatPrioritizer {
    pub fn new(pool_size: usize, distance_tie_band: Option<f32>) -> Self {
        Self {
            pool_size: pool_size.max(1),
            distance_tie_band,
        }
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Sort in place by priority
    pub fn rank(&self, enemies: &mut [ClassifiedEnemy]) {
        enemies.sort_by(priority_order);
    }

    /// Prefix of the ranked list that shares the top tier (and, when a band is
    /// configured, lies within it of the nearest top-tier enemy), capped at K.
    pub fn build_pool(&self, ranked: &[ClassifiedEnemy]) -> Vec<ClassifiedEnemy> {
        let Some(top) = ranked.first() else {
            return Vec::new();
        };

        ranked
            .iter()
            .take_while(|enemy| enemy.tier == top.tier)
            .take_while(|enemy| match self.distance_tie_band {
                Some(band) => enemy.distance_to_base - top.distance_to_base <= band,
                None => true,
            })
            .take(self.pool_size)
            .cloned()
            .collect()
    }

    /// Rank the frame's enemies and return `(ranked, pool)`
    pub fn prioritize(&self, mut enemies: Vec<ClassifiedEnemy>) -> (Vec<ClassifiedEnemy>, Vec<ClassifiedEnemy>) {
        self.rank(&mut enemies);
        let pool = self.build_pool(&enemies);
        (enemies, pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::types::{EnemyType, ThreatTier};
    use crate::vision::BBox;

    fn enemy(enemy_type: EnemyType, distance: f32) -> ClassifiedEnemy {
        ClassifiedEnemy {
            bbox: BBox::new(distance as i32, 0, 10, 10),
            enemy_type,
            tier: enemy_type.default_tier(),
            distance_to_base: distance,
            confidence: 0.9,
        }
    }

    #[test]
    fn test_airborne_outranks_closer_ground_units() {
        let prioritizer = ThreatPrioritizer::new(4, None);
        let (ranked, pool) = prioritizer.prioritize(vec![
            enemy(EnemyType::Soldier, 20.0),
            enemy(EnemyType::Soldier, 35.0),
            enemy(EnemyType::Apache, 300.0),
            enemy(EnemyType::Soldier, 10.0),
        ]);

        assert_eq!(ranked[0].enemy_type, EnemyType::Apache);
        assert_eq!(ranked[1].distance_to_base, 10.0);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].enemy_type, EnemyType::Apache);
    }

    #[test]
    fn test_pool_capped_at_k() {
        let prioritizer = ThreatPrioritizer::new(3, None);
        let enemies = (0..6)
            .map(|i| enemy(EnemyType::Gunner, 100.0 - i as f32 * 10.0))
            .collect();
        let (_, pool) = prioritizer.prioritize(enemies);

        assert_eq!(pool.len(), 3);
        assert_eq!(
            pool.iter().map(|e| e.distance_to_base).collect::<Vec<_>>(),
            vec![50.0, 60.0, 70.0]
        );
    }

    #[test]
    fn test_pool_is_non_increasing_and_in_top_band() {
        let prioritizer = ThreatPrioritizer::new(8, Some(25.0));
        let (_, pool) = prioritizer.prioritize(vec![
            enemy(EnemyType::Tank, 80.0),
            enemy(EnemyType::Tank, 40.0),
            enemy(EnemyType::Tank, 60.0),
            enemy(EnemyType::Tank, 64.0),
            enemy(EnemyType::Jeep, 1.0),
        ]);

        assert_eq!(pool.len(), 3);
        let top = &pool[0];
        for pair in pool.windows(2) {
            assert_ne!(priority_order(&pair[0], &pair[1]), Ordering::Greater);
        }
        for member in &pool {
            assert_eq!(member.tier, top.tier);
            assert!(member.distance_to_base - top.distance_to_base <= 25.0);
        }
    }

    #[test]
    fn test_negative_distance_first() {
        let prioritizer = ThreatPrioritizer::new(4, None);
        let (ranked, _) = prioritizer.prioritize(vec![
            enemy(EnemyType::Soldier, 5.0),
            enemy(EnemyType::Soldier, -12.0),
        ]);
        assert_eq!(ranked[0].distance_to_base, -12.0);
    }

    #[test]
    fn test_past_base_nearest_to_base_row_first() {
        use crate::automation::classifier::{ClassificationTable, DetectionFuser, EnemyProfile};
        use crate::vision::{DetectionSource, RawDetection};

        let mut table = ClassificationTable::new();
        table.insert(
            DetectionSource::TemplateMatch,
            "soldier",
            EnemyProfile {
                enemy_type: EnemyType::Soldier,
                tier: EnemyType::Soldier.default_tier(),
            },
        );
        let fuser = DetectionFuser::new(table, 0.3, (500.0, 225.0));

        // Centres (501, 400) and (502, 226): both past the base line
        let far_off_row = RawDetection::template(BBox::new(496, 386, 10, 28), 0.9, "soldier");
        let on_row = RawDetection::template(BBox::new(497, 212, 10, 28), 0.9, "soldier");
        let enemies = fuser.fuse(vec![far_off_row, on_row], Vec::new());

        let (ranked, pool) = ThreatPrioritizer::new(1, None).prioritize(enemies);
        assert_eq!(ranked[0].center(), (502.0, 226.0));
        assert!(ranked[0].distance_to_base < ranked[1].distance_to_base);
        assert_eq!(pool[0].center(), (502.0, 226.0));
    }

    #[test]
    fn test_empty_frame_gives_empty_pool() {
        let prioritizer = ThreatPrioritizer::new(4, None);
        let (ranked, pool) = prioritizer.prioritize(Vec::new());
        assert!(ranked.is_empty());
        assert!(pool.is_empty());
    }

    #[test]
    fn test_custom_tier_respected() {
        let prioritizer = ThreatPrioritizer::new(4, None);
        let mut gunner = enemy(EnemyType::Gunner, 90.0);
        gunner.tier = ThreatTier(200);
        let (_, pool) = prioritizer.prioritize(vec![enemy(EnemyType::Robot, 1.0), gunner]);
        assert_eq!(pool[0].enemy_type, EnemyType::Gunner);
    }
}
