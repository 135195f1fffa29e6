use std::path::PathBuf;
use std::time::Duration;
use storm_sentry::args::Args;
use storm_sentry::automation::{SentryEngine, create_frame_channel, create_trigger_channel, run_capture};
use storm_sentry::config::BotConfig;
use storm_sentry::device::{CaptureProvider, DirectoryCapture, DryRunActuator, spawn_stdin_triggers};
use storm_sentry::error::{BotError, BotResult};
use storm_sentry::vision::TemplateSet;

fn main() {
    let Some(args) = Args::parse() else {
        return;
    };

    let default_filter = if args.debug_mode { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    if let Err(e) = run(args) {
        log::error!("❌ {e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> BotResult<()> {
    let mut config = match &args.config_path {
        Some(path) => BotConfig::load(path)?,
        None => BotConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.targeting.seed = Some(seed);
    }
    if let Some(dir) = args.frames_dir.clone() {
        config.capture.replay_dir = Some(dir);
    }
    config.validate()?;

    if args.dump_config {
        println!("{}", config.to_json()?);
        return Ok(());
    }

    let Some(replay_dir) = config.capture.replay_dir.clone() else {
        return Err(BotError::CaptureUnavailable {
            attempts: 0,
            description: "no capture source configured (use --frames=DIR or capture.replay_dir)".to_string(),
        });
    };
    let templates = TemplateSet::load(&config.templates)?;

    log::info!(
        "🚀 Storm Sentry v{} - window {}x{} at ({}, {}) on monitor {}",
        env!("APP_VERSION_DISPLAY"),
        config.capture.width,
        config.capture.height,
        config.capture.window_origin[0],
        config.capture.window_origin[1],
        config.capture.monitor
    );

    let rt = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    let result = rt.block_on(run_engine(config, templates, replay_dir, args.timeout_secs));
    // stdin reader sits on a blocking thread until the next line arrives
    rt.shutdown_timeout(Duration::from_millis(200));
    result
}

async fn run_engine(
    config: BotConfig,
    templates: TemplateSet,
    replay_dir: PathBuf,
    timeout_secs: Option<u64>,
) -> BotResult<()> {
    let mut capture = DirectoryCapture::new(replay_dir, config.capture.loop_replay)
        .with_expected_size(config.capture.width, config.capture.height);
    capture.connect().await?;

    let mut engine = SentryEngine::new(&config, templates, DryRunActuator::new())?;

    let (frame_tx, frame_rx) = create_frame_channel();
    let (trigger_tx, trigger_rx) = create_trigger_channel();

    let capture_task = tokio::spawn(run_capture(
        capture,
        frame_tx,
        config.capture.frame_interval(),
        config.capture.retry.clone(),
    ));
    let _triggers = spawn_stdin_triggers(trigger_tx);
    log::info!("⌨️ Waiting for triggers on stdin (1=start, 0=stop, 2=hold)");

    let shutdown = async move {
        match timeout_secs {
            Some(secs) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = tokio::time::sleep(Duration::from_secs(secs)) => {
                        log::info!("⏰ Timeout of {secs}s reached");
                    }
                }
            }
            None => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    };

    let stats = engine.run(frame_rx, trigger_rx, shutdown).await;
    drop(engine);

    log::info!(
        "✅ Done: {} frames, {} shots ({} while reloading), {} actuator failures",
        stats.frames_processed,
        stats.shots_fired,
        stats.pulses_while_reloading,
        stats.actuator_failures
    );

    match capture_task.await {
        Ok(result) => result,
        Err(e) => {
            log::warn!("⚠️ Capture task ended abnormally: {e}");
            Ok(())
        }
    }
}
