//! Live spectrogram of the microphone input.
//!
//! Drives the refresh loop: input, debounced resizes, frame pacing, painting
//! and drawing. An external SIGUSR1 resets the cursor the same way the sync key
//! does.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::audio::{Analyser, MicrophoneStream, SampleTap, TAP_CAPACITY};
use crate::config::{ConfigStore, RenderPolicyKind, SgramConfig};
use crate::spectrogram::{Debounce, FrameClock, Session, Tick};
use crate::ui::{report, SpectrogramTui, ViewCommand};

/// Frames between debug log lines with the measured frame rate.
const FPS_LOG_INTERVAL: u64 = 100;

/// Command-line overrides for a run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub policy: Option<RenderPolicyKind>,
    pub device: Option<String>,
}

/// Opens the microphone and renders its spectrogram until the user quits.
///
/// # Errors
/// - If the configuration is invalid
/// - If the microphone cannot be opened; nothing is rendered in that case
/// - If the terminal cannot be driven
pub async fn handle_run(options: RunOptions) -> anyhow::Result<()> {
    tracing::info!("=== sgram started ===");

    let mut config = match SgramConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Failed to load configuration: {err}");
            report(
                "Configuration Error",
                &format!("{err}\n\nPlease check your ~/.config/sgram/sgram.toml file and try again."),
            )?;
            return Err(anyhow::anyhow!("Configuration error: {err}"));
        }
    };
    if let Some(policy) = options.policy {
        config.display.policy = policy;
    }
    if let Some(device) = options.device {
        config.audio.device = device;
    }

    tracing::info!(
        "Configuration loaded: device={}, policy={}, fft_size={}, frame_rate={}",
        config.audio.device,
        config.display.policy,
        config.analysis.fft_size,
        config.display.frame_rate
    );

    let tap = SampleTap::new(TAP_CAPACITY);
    let analyser = Analyser::new(tap.clone(), &config.analysis);

    let mut tui = SpectrogramTui::new(config.display.pixel_ratio, true)?;
    let store = ConfigStore::new(config.analysis.clone(), config.display.clone());
    let mut session = Session::new(store, analyser, config.display.policy, tui.viewport()?);
    session.reset_cursor();
    tui.draw(&session, None)?;

    let _stream = match MicrophoneStream::open(&config.audio.device, config.audio.sample_rate, tap) {
        Ok(stream) => {
            tracing::info!(
                "Capturing from '{}' at {}Hz ({} channels)",
                stream.device_name(),
                stream.sample_rate(),
                stream.device_channels()
            );
            stream
        }
        Err(err) => {
            tracing::error!("Failed to open microphone: {}", err);
            tui.cleanup()?;
            report(
                "Microphone Error",
                &format!("{err}\n\nUse 'sgram list-devices' to check your audio input."),
            )?;
            return Err(err.into());
        }
    };

    let sync = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGUSR1, sync.clone())
        .map_err(|e| anyhow::anyhow!("Failed to register signal handler: {e}"))?;

    let refresh = Duration::from_millis(config.display.refresh_interval_ms);
    let mut resize = Debounce::new(Duration::from_millis(config.display.resize_debounce_ms));
    let mut clock = FrameClock::new(config.display.frame_rate);
    let epoch = Instant::now();
    let now_ms = || epoch.elapsed().as_secs_f64() * 1000.0;
    clock.start(now_ms());

    tracing::debug!("Entering render loop. Press 'q' or Escape to quit.");
    loop {
        if sync.swap(false, Ordering::Relaxed) {
            tracing::info!("Received SIGUSR1: resetting cursor");
            session.reset_cursor();
        }

        match tui.handle_input(refresh)? {
            ViewCommand::Continue => {}
            ViewCommand::Quit => clock.stop(),
            ViewCommand::Sync => session.reset_cursor(),
            ViewCommand::Adjust(key, direction) => {
                session.adjust(key, direction);
            }
            ViewCommand::TogglePanel => {
                if resize.is_pending() {
                    tracing::debug!("Dropping pending resize, panel toggle resizes now");
                    resize.cancel();
                }
                session.resize(tui.viewport()?);
            }
            ViewCommand::Resize => resize.schedule(Instant::now()),
        }

        if resize.fire(Instant::now()) {
            session.resize(tui.viewport()?);
        }

        let now = now_ms();
        match clock.tick(now) {
            Tick::Stopped => break,
            Tick::Idle => {}
            Tick::Render => {
                session.render_frame()?;
                if clock.frame_count() % FPS_LOG_INTERVAL == 0 {
                    tracing::debug!(
                        "Rendered {} frames, {:.2} fps",
                        clock.frame_count(),
                        clock.measured_fps(now)
                    );
                }
            }
        }

        let fps = config.display.show_fps.then(|| clock.measured_fps(now));
        tui.draw(&session, fps)?;
    }

    tui.cleanup()?;
    tracing::info!("=== sgram exited after {} frames ===", clock.frame_count());
    Ok(())
}
