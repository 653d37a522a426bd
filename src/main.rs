use std::{
    path::PathBuf,
    sync::mpsc,
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ct363_touch::{
    config::{Config, SourceConfig},
    ct363::{ContactEvent, ControllerError, Ct363Controller, Timestamp, DEVICE_INFO},
    transport::{PacketSource, ReplaySource, TransportError, UsbSource},
};

#[derive(Parser)]
#[command(name = "ct363-touch", version)]
#[command(about = "Decode VTL CT363 touchscreen packets into per-slot contact events")]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "ct363.yml")]
    config: PathBuf,

    /// Replay a capture file instead of the configured source
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy)]
enum ControlMessage {
    Contact(ContactEvent),
    Sync { timestamp: Timestamp },
}

/// Outcome of one pass through the poll loop.
#[derive(Debug)]
enum Step {
    Continue,
    Finished,
    Failed(ControllerError),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("ct363_touch={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = match (&cli.replay, Config::load(&cli.config)) {
        (Some(path), Ok(config)) => Config {
            source: Config::replay(path).source,
            ..config
        },
        (Some(path), Err(err)) => {
            debug!("ignoring configuration: {err}");
            Config::replay(path)
        }
        (None, loaded) => loaded?,
    };

    info!(
        "{} ({}, {}): {} slots",
        DEVICE_INFO.name, DEVICE_INFO.i2c_id, DEVICE_INFO.compatible, DEVICE_INFO.slots
    );
    for axis in &DEVICE_INFO.axes {
        debug!("axis {:?}: {}..={}", axis.axis, axis.min, axis.max);
    }

    let poll_interval = config.poll_interval();
    match &config.source {
        SourceConfig::Usb(usb) => {
            let source = UsbSource::connect(usb).context("failed to open USB source")?;
            run(source, poll_interval)
        }
        SourceConfig::Replay(replay) => {
            let source = ReplaySource::open(&replay.path)
                .with_context(|| format!("failed to load {}", replay.path.display()))?;
            run(source, poll_interval)
        }
    }
}

fn run<S: PacketSource>(source: S, poll_interval: Duration) -> Result<()> {
    let mut controller = Ct363Controller::new(source);
    let rx = forward_events(&mut controller);

    let app_start = Instant::now();
    let mut frame: Vec<ContactEvent> = Vec::new();
    let mut frames: u64 = 0;

    loop {
        let outcome = step(&mut controller);

        // Drain controller events.
        while let Ok(message) = rx.try_recv() {
            match message {
                ControlMessage::Contact(event) => frame.push(event),
                ControlMessage::Sync { timestamp } => {
                    frames += 1;
                    log_frame(frames, &frame, timestamp, &app_start);
                    frame.clear();
                }
            }
        }

        match outcome {
            Step::Continue => thread::sleep(poll_interval),
            Step::Finished => {
                info!(
                    "replay finished after {} packets, {} frames",
                    controller.packets(),
                    frames
                );
                return Ok(());
            }
            Step::Failed(err) => return Err(err.into()),
        }
    }
}

/// Route controller callbacks into a channel drained by the poll loop.
fn forward_events<S: PacketSource>(
    controller: &mut Ct363Controller<S>,
) -> mpsc::Receiver<ControlMessage> {
    let (tx, rx) = mpsc::channel::<ControlMessage>();
    let contact_tx = tx.clone();
    controller.set_contact_callback(move |event, _| {
        let _ = contact_tx.send(ControlMessage::Contact(event));
    });
    controller.set_sync_callback(move |timestamp| {
        let _ = tx.send(ControlMessage::Sync { timestamp });
    });
    rx
}

/// Poll once. When the source ends or fails, every held slot is released
/// first so the sink never keeps a stuck finger.
fn step<S: PacketSource>(controller: &mut Ct363Controller<S>) -> Step {
    match controller.poll_once() {
        Ok(_) => Step::Continue,
        Err(ControllerError::Transport(TransportError::Exhausted)) => {
            controller.release_all();
            Step::Finished
        }
        Err(err) => {
            let held = controller.tracker().press_mask().len();
            if held > 0 {
                warn!("releasing {held} held contacts after error: {err}");
            }
            controller.release_all();
            Step::Failed(err)
        }
    }
}

fn log_frame(index: u64, events: &[ContactEvent], timestamp: Timestamp, app_start: &Instant) {
    let elapsed_ms = timestamp
        .checked_duration_since(*app_start)
        .map(|d| d.as_millis())
        .unwrap_or(0);

    let summary = events
        .iter()
        .map(ContactEvent::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    info!("frame {index} @ {elapsed_ms} ms: {summary}");
}
