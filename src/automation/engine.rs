// Engine loop: consumes the latest frame, drives the controller, issues actuator calls
use super::channels::{FrameReceiver, FrameSender};
use super::controller::TargetingController;
use super::pipeline::{FrameAnalysis, FramePipeline};
use super::selector::TargetSelector;
use super::signals::{MenuDetector, ReloadMonitor};
use super::types::{ActuatorCommand, ControllerState, Trigger};
use crate::config::{BotConfig, RetryConfig};
use crate::device::{Actuator, CaptureProvider};
use crate::error::{BotError, BotResult};
use crate::vision::{Frame, TemplateSet};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, sleep};

/// Counters reported in the periodic summary and at exit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngagementStats {
    pub frames_processed: u64,
    pub frames_skipped: u64,
    /// Frames replaced in the hand-off slot before the engine read them
    pub frames_dropped: u64,
    pub shots_fired: u64,
    /// Pulses issued while the weapon was reloading; not counted as shots
    pub pulses_while_reloading: u64,
    pub actuator_failures: u64,
    pub auto_stops: u64,
    pub last_counts: BTreeMap<&'static str, usize>,
}

pub struct SentryEngine<A: Actuator> {
    pipeline: FramePipeline,
    selector: TargetSelector,
    controller: TargetingController,
    menus: MenuDetector,
    reload: ReloadMonitor,
    actuator: A,
    stats: EngagementStats,
    summary_interval: u64,
    last_seq: Option<u64>,
}

impl<A: Actuator> SentryEngine<A> {
    pub fn new(config: &BotConfig, templates: TemplateSet, actuator: A) -> BotResult<Self> {
        let pipeline = FramePipeline::from_config(config, templates)?;
        let [ox, oy] = config.capture.window_origin;

        Ok(Self {
            pipeline,
            selector: TargetSelector::from_seed(
                config.targeting.seed,
                config.targeting.stickiness.clone(),
            ),
            controller: TargetingController::new((ox, oy), config.fire.min_fire_delay()),
            menus: MenuDetector::new(config.menus.clone()),
            reload: ReloadMonitor::new(config.reload.clone()),
            actuator,
            stats: EngagementStats::default(),
            summary_interval: config.summary_interval_frames,
            last_seq: None,
        })
    }

    pub fn state(&self) -> ControllerState {
        self.controller.state()
    }

    pub fn stats(&self) -> &EngagementStats {
        &self.stats
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub async fn handle_trigger(&mut self, trigger: Trigger) {
        let commands = self.controller.handle_trigger(trigger);
        if trigger == Trigger::Start || trigger == Trigger::HoldToggle {
            self.menus.reset();
        }
        self.execute(commands, false).await;
    }

    /// One engine tick for one frame.
    ///
    /// Returns the analysis, or `None` when the frame had to be skipped.
    pub async fn process_frame(&mut self, frame: &Frame) -> Option<FrameAnalysis> {
        // Sequence numbers start at 1
        let last = self.last_seq.unwrap_or(0);
        if frame.seq() > last + 1 {
            self.stats.frames_dropped += frame.seq() - last - 1;
        }
        self.last_seq = Some(frame.seq());

        let analysis = match self.pipeline.process(frame) {
            Ok(analysis) => analysis,
            Err(e) => {
                log::warn!("⚠️ Skipping frame {}: {}", frame.seq(), e);
                self.stats.frames_skipped += 1;
                return None;
            }
        };
        self.stats.frames_processed += 1;
        self.stats.last_counts = analysis.count_by_type();

        let reloading = self.reload.update(frame);

        if self.controller.is_active() {
            if let Some(reason) = self.menus.poll(frame) {
                self.stats.auto_stops += 1;
                let commands = self.controller.auto_stop(reason);
                self.execute(commands, reloading).await;
                self.maybe_log_summary();
                return Some(analysis);
            }
        } else {
            self.menus.reset();
        }

        let target = self.selector.select(&analysis.pool);
        let commands = self.controller.on_frame(target.as_ref(), Instant::now());
        self.execute(commands, reloading).await;

        self.maybe_log_summary();
        Some(analysis)
    }

    /// Release every held input before exit
    pub async fn shutdown(&mut self) {
        let commands = self.controller.shutdown();
        self.execute(commands, false).await;
    }

    /// Run until the shutdown future resolves or the capture side closes.
    ///
    /// Triggers and frames are served as they arrive. A trigger source that
    /// closes only stops trigger handling.
    pub async fn run(
        &mut self,
        mut frames: FrameReceiver,
        mut triggers: mpsc::Receiver<Trigger>,
        shutdown: impl Future<Output = ()>,
    ) -> EngagementStats {
        tokio::pin!(shutdown);
        let mut triggers_open = true;

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    log::info!("🛑 Shutdown requested");
                    break;
                }
                trigger = triggers.recv(), if triggers_open => match trigger {
                    Some(trigger) => self.handle_trigger(trigger).await,
                    None => {
                        log::debug!("Trigger source closed");
                        triggers_open = false;
                    }
                },
                changed = frames.changed() => {
                    if changed.is_err() {
                        log::info!("📼 Capture ended");
                        break;
                    }
                    let frame = frames.borrow_and_update().clone();
                    if let Some(frame) = frame {
                        self.process_frame(&frame).await;
                    }
                }
            }
        }

        self.shutdown().await;
        self.log_summary();
        self.stats.clone()
    }

    async fn execute(&mut self, commands: Vec<ActuatorCommand>, reloading: bool) {
        for command in commands {
            let result = match command {
                ActuatorCommand::MoveTo { x, y } => self.actuator.move_pointer_to(x, y).await,
                ActuatorCommand::FirePulse => self.actuator.fire_pulse().await,
                ActuatorCommand::FireHold(engaged) => self.actuator.fire_hold(engaged).await,
            };

            if let Err(e) = result {
                log::warn!("⚠️ Actuator rejected {:?}: {}", command, e);
                self.stats.actuator_failures += 1;
                self.controller.on_actuator_failure();
                return;
            }

            if command == ActuatorCommand::FirePulse {
                if reloading {
                    self.stats.pulses_while_reloading += 1;
                } else {
                    self.stats.shots_fired += 1;
                }
            }
        }
    }

    fn maybe_log_summary(&self) {
        if self.summary_interval > 0 && self.stats.frames_processed % self.summary_interval == 0 {
            self.log_summary();
        }
    }

    fn log_summary(&self) {
        let counts = self
            .stats
            .last_counts
            .iter()
            .map(|(label, count)| format!("{label}={count}"))
            .collect::<Vec<_>>()
            .join(" ");
        log::info!(
            "📊 {:?} | frames {} (skipped {}, dropped {}) | shots {}{} | enemies [{}]",
            self.controller.state(),
            self.stats.frames_processed,
            self.stats.frames_skipped,
            self.stats.frames_dropped,
            self.stats.shots_fired,
            if self.reload.is_reloading() { " (reloading)" } else { "" },
            counts
        );
    }
}

/// Re-establish a lost capture connection with bounded exponential backoff
pub async fn reconnect_with_backoff<C: CaptureProvider>(capture: &mut C, retry: &RetryConfig) -> BotResult<()> {
    let mut last_error = String::new();
    for attempt in 1..=retry.max_attempts {
        let delay = retry.backoff(attempt);
        log::warn!(
            "🔌 Reconnecting to {} (attempt {}/{}, in {}ms)",
            capture.describe(),
            attempt,
            retry.max_attempts,
            delay.as_millis()
        );
        sleep(delay).await;

        match capture.connect().await {
            Ok(()) => {
                log::info!("🔌 Capture reconnected");
                return Ok(());
            }
            Err(e) => last_error = e.to_string(),
        }
    }

    Err(BotError::CaptureUnavailable {
        attempts: retry.max_attempts,
        description: last_error,
    })
}

/// Capture loop: polls the provider at `interval` and publishes each frame.
///
/// Ends when the provider is exhausted or the engine stops listening. A
/// lost connection that cannot be re-established is returned as an error.
pub async fn run_capture<C: CaptureProvider>(
    mut capture: C,
    frames: FrameSender,
    interval: Duration,
    retry: RetryConfig,
) -> BotResult<()> {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        if frames.is_closed() {
            return Ok(());
        }

        match capture.next_frame().await {
            Ok(Some(frame)) => {
                frames.send_replace(Some(Arc::new(frame)));
            }
            Ok(None) if capture.is_exhausted() => {
                log::info!("📼 {} has no more frames", capture.describe());
                return Ok(());
            }
            Ok(None) => {}
            Err(e) if e.is_connection_lost() => {
                log::warn!("🔌 Capture lost: {e}");
                reconnect_with_backoff(&mut capture, &retry).await?;
            }
            Err(e) => log::warn!("⚠️ Frame skipped: {e}"),
        }
    }
}
