// Traits at the seams to screen capture and input injection
use crate::error::BotResult;
use crate::vision::Frame;
use std::future::Future;

/// Supplies frames in a stable coordinate frame.
pub trait CaptureProvider: Send {
    /// Establish (or re-establish) the connection to the frame source
    fn connect(&mut self) -> impl Future<Output = BotResult<()>> + Send;

    /// Next available frame. `Ok(None)` means nothing new this tick.
    fn next_frame(&mut self) -> impl Future<Output = BotResult<Option<Frame>>> + Send;

    /// True once a finite source has nothing more to deliver
    fn is_exhausted(&self) -> bool {
        false
    }

    fn describe(&self) -> String;
}

/// Pointer and fire primitives. Coordinates are screen coordinates.
pub trait Actuator: Send {
    fn move_pointer_to(&mut self, x: i32, y: i32) -> impl Future<Output = BotResult<()>> + Send;

    fn fire_pulse(&mut self) -> impl Future<Output = BotResult<()>> + Send;

    fn fire_hold(&mut self, engaged: bool) -> impl Future<Output = BotResult<()>> + Send;
}
