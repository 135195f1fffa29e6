// Automation module - decision side of the perception-to-action pipeline
// Classification, threat ordering, target selection and the targeting
// controller, plus the engine loop that wires them to the devices.

pub mod channels;
pub mod classifier;
pub mod controller;
pub mod engine;
pub mod pipeline;
pub mod prioritizer;
pub mod selector;
pub mod signals;
pub mod types;


// Re-export the main types and functions for easy access
pub use channels::{FrameReceiver, FrameSender, create_frame_channel, create_trigger_channel};
pub use classifier::{ClassificationTable, DetectionFuser, EnemyProfile};
pub use controller::{TargetingController, TransitionCause};
pub use engine::{EngagementStats, SentryEngine, reconnect_with_backoff, run_capture};
pub use pipeline::{FrameAnalysis, FramePipeline};
pub use prioritizer::{ThreatPrioritizer, priority_order};
pub use selector::TargetSelector;
pub use signals::{MenuDetector, ReloadMonitor};
pub use types::*;
