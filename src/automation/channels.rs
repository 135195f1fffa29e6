// Communication channels between capture, triggers and the engine
use super::types::Trigger;
use crate::vision::Frame;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Latest captured frame; a newer frame replaces one that was never read
pub type FrameSender = watch::Sender<Option<Arc<Frame>>>;
pub type FrameReceiver = watch::Receiver<Option<Arc<Frame>>>;

/// Helper function to create the trigger channel
pub fn create_trigger_channel() -> (mpsc::Sender<Trigger>, mpsc::Receiver<Trigger>) {
    mpsc::channel(32)
}

/// Helper function to create the single-slot frame hand-off
pub fn create_frame_channel() -> (FrameSender, FrameReceiver) {
    watch::channel(None)
}
