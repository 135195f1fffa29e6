// Finite state machine converting a selected target into actuator calls
use super::types::{ActuatorCommand, AutoStop, ControllerState, SelectedTarget, Trigger};
use std::time::{Duration, Instant};

/// Why the controller changed state, for the transition log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionCause {
    Trigger(Trigger),
    AutoStop(AutoStop),
    Shutdown,
}

/// Owns the single `ControllerState` of the process.
///
/// Transitions only happen through [`handle_trigger`](Self::handle_trigger),
/// [`auto_stop`](Self::auto_stop) and [`shutdown`](Self::shutdown). Every
/// method returns the actuator calls to issue; the controller never talks to
/// the actuator itself.
pub struct TargetingController {
    state: ControllerState,
    window_origin: (i32, i32),
    min_fire_delay: Duration,
    last_fire: Option<Instant>,
    hold_engaged: bool,
}

impl TargetingController {
    pub fn new(window_origin: (i32, i32), min_fire_delay: Duration) -> Self {
        Self {
            state: ControllerState::Idle,
            window_origin,
            min_fire_delay,
            last_fire: None,
            hold_engaged: false,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != ControllerState::Idle
    }

    pub fn is_hold_engaged(&self) -> bool {
        self.hold_engaged
    }

    pub fn handle_trigger(&mut self, trigger: Trigger) -> Vec<ActuatorCommand> {
        use ControllerState::*;

        let next = match (self.state, trigger) {
            (Idle, Trigger::Start) => Shooting,
            (Idle | Shooting, Trigger::HoldToggle) => HoldFire,
            (HoldFire, Trigger::HoldToggle) => Shooting,
            (Shooting | HoldFire, Trigger::Stop) => Idle,
            (state, trigger) => {
                log::debug!("🎮 Trigger {:?} ignored in state {:?}", trigger, state);
                return Vec::new();
            }
        };

        self.change_state(next, TransitionCause::Trigger(trigger))
    }

    /// Day-end and menu screens end any engagement
    pub fn auto_stop(&mut self, reason: AutoStop) -> Vec<ActuatorCommand> {
        if !self.is_active() {
            return Vec::new();
        }
        self.change_state(ControllerState::Idle, TransitionCause::AutoStop(reason))
    }

    /// Release everything before the process exits
    pub fn shutdown(&mut self) -> Vec<ActuatorCommand> {
        if !self.is_active() && !self.hold_engaged {
            return Vec::new();
        }
        self.change_state(ControllerState::Idle, TransitionCause::Shutdown)
    }

    /// Actuator calls for this frame.
    ///
    /// Nothing is issued while Idle or when no target was selected. In
    /// Shooting, the pointer follows the target and one pulse fires per frame
    /// once the minimum inter-fire delay has elapsed. In HoldFire, the fire
    /// button is pressed once and stays down until the state is left, empty
    /// frames included.
    pub fn on_frame(&mut self, target: Option<&SelectedTarget>, now: Instant) -> Vec<ActuatorCommand> {
        let mut commands = Vec::new();

        let Some(target) = target else {
            return commands;
        };

        match self.state {
            ControllerState::Idle => {}
            ControllerState::Shooting => {
                commands.push(self.aim(target));
                if self.fire_ready(now) {
                    self.last_fire = Some(now);
                    commands.push(ActuatorCommand::FirePulse);
                }
            }
            ControllerState::HoldFire => {
                commands.push(self.aim(target));
                if !self.hold_engaged {
                    self.hold_engaged = true;
                    commands.push(ActuatorCommand::FireHold(true));
                }
            }
        }

        commands
    }

    /// The OS layer rejected a call: forget the hold so it is re-issued
    pub fn on_actuator_failure(&mut self) {
        self.hold_engaged = false;
    }

    /// Screen position of the target's hit-box centre
    pub fn screen_point(&self, target: &SelectedTarget) -> (i32, i32) {
        let (cx, cy) = target.enemy.center();
        (
            self.window_origin.0 + cx.round() as i32,
            self.window_origin.1 + cy.round() as i32,
        )
    }

    fn aim(&self, target: &SelectedTarget) -> ActuatorCommand {
        let (x, y) = self.screen_point(target);
        ActuatorCommand::MoveTo { x, y }
    }

    fn fire_ready(&self, now: Instant) -> bool {
        match self.last_fire {
            Some(last) => now.saturating_duration_since(last) >= self.min_fire_delay,
            None => true,
        }
    }

    fn change_state(&mut self, new_state: ControllerState, cause: TransitionCause) -> Vec<ActuatorCommand> {
        let mut commands = Vec::new();

        if new_state != ControllerState::HoldFire && self.hold_engaged {
            self.hold_engaged = false;
            commands.push(ActuatorCommand::FireHold(false));
        }

        if self.state != new_state {
            log::info!(
                "🎮 Controller state: {:?} -> {:?} ({:?})",
                self.state,
                new_state,
                cause
            );
            self.state = new_state;
        }

        commands
    }
}
