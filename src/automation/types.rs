// Types and enums for target engagement
use crate::vision::BBox;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Enemy classes that appear on the battlefield
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyType {
    Soldier,
    Gunner,
    Jeep,
    FlyingSoldier,
    FlameThrower,
    Apache,
    Tank,
    Robot,
}

impl EnemyType {
    pub const ALL: [EnemyType; 8] = [
        EnemyType::Soldier,
        EnemyType::Gunner,
        EnemyType::Jeep,
        EnemyType::FlyingSoldier,
        EnemyType::FlameThrower,
        EnemyType::Apache,
        EnemyType::Tank,
        EnemyType::Robot,
    ];

    /// Default threat ranking. Higher outranks lower regardless of distance.
    pub fn default_tier(self) -> ThreatTier {
        ThreatTier(match self {
            EnemyType::Soldier => 0,
            EnemyType::Gunner => 1,
            EnemyType::Jeep => 2,
            EnemyType::FlameThrower => 3,
            EnemyType::FlyingSoldier => 4,
            EnemyType::Apache => 5,
            EnemyType::Tank => 6,
            EnemyType::Robot => 7,
        })
    }

    pub fn is_airborne(self) -> bool {
        matches!(self, EnemyType::FlyingSoldier | EnemyType::Apache)
    }

    pub fn label(self) -> &'static str {
        match self {
            EnemyType::Soldier => "soldier",
            EnemyType::Gunner => "gunner",
            EnemyType::Jeep => "jeep",
            EnemyType::FlyingSoldier => "flying_soldier",
            EnemyType::FlameThrower => "flame_thrower",
            EnemyType::Apache => "apache",
            EnemyType::Tank => "tank",
            EnemyType::Robot => "robot",
        }
    }
}

impl fmt::Display for EnemyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordinal danger ranking, higher is more dangerous
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ThreatTier(pub u8);

/// A detection after classification, in frame coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedEnemy {
    pub bbox: BBox,
    pub enemy_type: EnemyType,
    pub tier: ThreatTier,
    /// Manhattan distance from the hit-box centre to the base point,
    /// negative once the enemy has crossed the base line.
    pub distance_to_base: f32,
    pub confidence: f32,
}

impl ClassifiedEnemy {
    pub fn center(&self) -> (f32, f32) {
        self.bbox.center()
    }
}

/// The enemy chosen for this frame plus an identity hint for the next one
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedTarget {
    pub enemy: ClassifiedEnemy,
    pub position_hint: (f32, f32),
}

impl SelectedTarget {
    pub fn new(enemy: ClassifiedEnemy) -> Self {
        let position_hint = enemy.center();
        Self {
            enemy,
            position_hint,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerState {
    Idle,
    Shooting,
    HoldFire,
}

/// Discrete operator input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Start,
    Stop,
    HoldToggle,
}

/// Screens that end an engagement without operator input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoStop {
    DayEnd,
    PauseMenu,
    DeathMenu,
    ShopMenu,
}

/// Logical calls against the actuator provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActuatorCommand {
    MoveTo { x: i32, y: i32 },
    FirePulse,
    FireHold(bool),
}

impl ActuatorCommand {
    pub fn is_fire(&self) -> bool {
        matches!(self, ActuatorCommand::FirePulse | ActuatorCommand::FireHold(true))
    }
}
