use super::types::Actuator;
use crate::error::BotResult;

/// Logs every call instead of injecting input
#[derive(Debug, Default)]
pub struct DryRunActuator {
    moves: u64,
    pulses: u64,
    holding: bool,
}

impl DryRunActuator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pulses(&self) -> u64 {
        self.pulses
    }

    pub fn moves(&self) -> u64 {
        self.moves
    }

    pub fn is_holding(&self) -> bool {
        self.holding
    }
}

impl Actuator for DryRunActuator {
    async fn move_pointer_to(&mut self, x: i32, y: i32) -> BotResult<()> {
        self.moves += 1;
        log::debug!("🖱️ [dry-run] move to ({x}, {y})");
        Ok(())
    }

    async fn fire_pulse(&mut self) -> BotResult<()> {
        self.pulses += 1;
        log::debug!("💥 [dry-run] fire pulse #{}", self.pulses);
        Ok(())
    }

    async fn fire_hold(&mut self, engaged: bool) -> BotResult<()> {
        if self.holding != engaged {
            log::debug!(
                "🔫 [dry-run] fire button {}",
                if engaged { "down" } else { "up" }
            );
        }
        self.holding = engaged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dry_run_counts_calls() {
        let mut actuator = DryRunActuator::new();
        actuator.move_pointer_to(10, 20).await.unwrap();
        actuator.fire_pulse().await.unwrap();
        actuator.fire_pulse().await.unwrap();
        actuator.fire_hold(true).await.unwrap();

        assert_eq!(actuator.moves(), 1);
        assert_eq!(actuator.pulses(), 2);
        assert!(actuator.is_holding());
    }
}
