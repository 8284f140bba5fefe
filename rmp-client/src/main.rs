//! Radio Management Panel Client
//!
//! Keeps a cockpit radio management panel on a serial port in step with the
//! simulator's COM1 radio, and relays the panel's knobs and buttons back.
//!
//! The simulator side is served by the virtual cockpit. With
//! `--virtual-panel` the panel is simulated too, which exercises the whole
//! loop without hardware.

mod serial_io;
mod settings;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rmp_sim::{VirtualCockpit, VirtualPanel};
use rmp_sync::{PanelDevice, Session, StepReport};
use serial_io::SerialPanel;
use settings::Settings;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Bridge a flight simulator's COM1 radio to a radio management panel.
#[derive(Parser, Debug)]
#[command(name = "rmp-client", version, about)]
struct Cli {
    /// The panel's serial port. Usually COM1 on Windows, and /dev/ttyACM0 on Linux.
    #[arg(long, conflicts_with = "virtual_panel")]
    serial_port: Option<String>,

    /// Simulate the panel instead of opening a serial port.
    #[arg(long)]
    virtual_panel: bool,

    /// Serial baud rate.
    #[arg(long)]
    baud: Option<u32>,

    /// The factor to scale the pedestal lighting by.
    #[arg(long, value_name = "LEVEL", value_parser = clap::value_parser!(u8).range(0..=7))]
    scale_brightness: Option<u8>,

    /// Loop cadence in milliseconds.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    tick_ms: Option<u64>,

    /// Sync frequencies only, without lamp test, lighting or power.
    #[arg(long, conflicts_with = "scale_brightness")]
    legacy: bool,

    /// Settings file. Defaults to settings.json in the config directory.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG is set.
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Apply command line overrides on top of file settings
    fn apply(&self, settings: &mut Settings) {
        if let Some(port) = &self.serial_port {
            settings.serial_port = Some(port.clone());
        }
        if let Some(baud) = self.baud {
            settings.baud_rate = baud;
        }
        if let Some(tick_ms) = self.tick_ms {
            settings.tick_ms = tick_ms;
        }
        if self.legacy {
            settings.sync.self_test = None;
            settings.sync.brightness = None;
            settings.sync.power = None;
        }
        if let Some(scale) = self.scale_brightness {
            settings.sync = settings.sync.clone().with_brightness_scale(scale);
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "rmp_client={level},rmp_protocol={level},rmp_sync={level},rmp_sim={level}"
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut settings = Settings::load(cli.config.as_deref())?;
    cli.apply(&mut settings);
    settings.validate()?;

    info!("Starting RMP client");
    let cockpit = VirtualCockpit::new(&settings.sync);

    if cli.virtual_panel {
        info!("Using a virtual panel");
        let session = Session::open(settings.sync.clone(), cockpit, VirtualPanel::new())?;
        run(session, settings.tick()).await
    } else {
        let Some(port) = settings.serial_port.as_deref() else {
            bail!("no serial port configured; pass --serial-port or --virtual-panel");
        };
        let panel = SerialPanel::open(port, settings.baud_rate, settings.read_timeout())
            .with_context(|| format!("failed to open panel on {}", port))?;
        info!("Panel connected on {}", panel.name());
        let session = Session::open(settings.sync.clone(), cockpit, panel)?;
        run(session, settings.tick()).await
    }
}

/// Drive the session until Ctrl-C
///
/// The session is dropped on return, which closes both links.
async fn run<D: PanelDevice>(
    mut session: Session<VirtualCockpit, D>,
    tick: Duration,
) -> Result<()> {
    let mut interval = tokio::time::interval(tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = &mut shutdown => {
                result.context("failed to listen for Ctrl-C")?;
                info!("Shutting down");
                return Ok(());
            }
            _ = interval.tick() => {
                let report = session.step();
                log_step(&report);
            }
        }
    }
}

fn log_step(report: &StepReport) {
    if report.had_reset() {
        info!("Panel announced a reset");
    }
    if report.tick.changed() {
        debug!(
            "Sync pass sent {} frames ({} unchanged)",
            report.tick.sent.len(),
            report.tick.unchanged.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("rmp-client").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_flags_override_settings() {
        let cli = parse(&[
            "--serial-port",
            "/dev/ttyACM0",
            "--baud",
            "19200",
            "--scale-brightness",
            "5",
        ]);
        let mut settings = Settings::default();
        cli.apply(&mut settings);

        assert_eq!(settings.serial_port.as_deref(), Some("/dev/ttyACM0"));
        assert_eq!(settings.baud_rate, 19200);
        assert_eq!(settings.sync.brightness.as_ref().map(|b| b.scale), Some(5));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_file_values_survive_without_flags() {
        let cli = parse(&["--virtual-panel"]);
        let mut settings = Settings {
            serial_port: Some("COM3".to_string()),
            tick_ms: 25,
            ..Settings::default()
        };
        cli.apply(&mut settings);

        assert_eq!(settings.serial_port.as_deref(), Some("COM3"));
        assert_eq!(settings.tick_ms, 25);
    }

    #[test]
    fn test_legacy_drops_optional_channels() {
        let cli = parse(&["--legacy", "--virtual-panel"]);
        let mut settings = Settings::default();
        cli.apply(&mut settings);

        assert!(settings.sync.self_test.is_none());
        assert!(settings.sync.brightness.is_none());
        assert!(settings.sync.power.is_none());
        assert!(settings.sync.active_frequency.is_some());
    }

    #[test]
    fn test_rejected_arguments() {
        let try_parse = |args: &[&str]| {
            Cli::try_parse_from(std::iter::once("rmp-client").chain(args.iter().copied()))
        };

        assert!(try_parse(&["--scale-brightness", "8"]).is_err());
        assert!(try_parse(&["--tick-ms", "0"]).is_err());
        assert!(try_parse(&["--serial-port", "COM1", "--virtual-panel"]).is_err());
        assert!(try_parse(&["--legacy", "--scale-brightness", "3"]).is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
