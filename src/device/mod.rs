// Device module - the external collaborators around the pipeline
// Capture providers supply frames, actuators receive pointer/fire calls and
// trigger sources turn operator input into controller events.

pub mod dry_run;
pub mod replay;
pub mod triggers;
pub mod types;

// Re-export the main types and functions for easy access
pub use dry_run::DryRunActuator;
pub use replay::DirectoryCapture;
pub use triggers::{parse_trigger, spawn_stdin_triggers};
pub use types::{Actuator, CaptureProvider};
