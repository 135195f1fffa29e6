pub mod args;
pub mod automation;
pub mod config;
pub mod device;
pub mod error;
pub mod vision;

pub use automation::{SentryEngine, TargetingController};
pub use config::BotConfig;
pub use error::{BotError, BotResult};
