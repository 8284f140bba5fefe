//! Cooperative bridge loop
//!
//! [`Bridge::step`] is the body of the main loop: it first drains pending
//! panel input, then runs one sync pass. [`Session`] owns the two links
//! for the lifetime of a run and tears them down when dropped, including
//! on error and shutdown paths.

use tracing::{debug, info, warn};

use crate::config::SyncConfig;
use crate::dispatch::{Dispatched, InputDispatcher};
use crate::engine::{SyncEngine, TickReport};
use crate::error::SyncError;
use crate::io::{PanelDevice, Telemetry};

/// Outcome of one loop iteration
#[derive(Debug, Default)]
pub struct StepReport {
    /// Panel lines handled successfully
    pub inputs: Vec<Dispatched>,
    /// Panel lines that matched no token
    pub rejected: Vec<String>,
    /// Transport error that stopped input handling
    pub input_error: Option<SyncError>,
    /// The sync pass
    pub tick: TickReport,
}

impl StepReport {
    /// Returns true if a reset was processed this step
    pub fn had_reset(&self) -> bool {
        self.inputs.contains(&Dispatched::Reset)
    }

    /// Returns true if nothing went wrong this step
    pub fn is_success(&self) -> bool {
        self.input_error.is_none() && self.rejected.is_empty() && self.tick.is_success()
    }
}

/// Input dispatcher and sync engine driven in strict sequence
#[derive(Debug)]
pub struct Bridge {
    engine: SyncEngine,
    dispatcher: InputDispatcher,
    max_lines: usize,
}

impl Bridge {
    /// Create a bridge from configuration
    pub fn new(config: SyncConfig) -> Result<Self, SyncError> {
        let dispatcher = InputDispatcher::new(config.commands.clone());
        let max_lines = config.max_input_lines_per_tick;
        let engine = SyncEngine::new(config)?;
        Ok(Self {
            engine,
            dispatcher,
            max_lines,
        })
    }

    /// Get the sync engine
    pub fn engine(&self) -> &SyncEngine {
        &self.engine
    }

    /// Run one loop iteration: drain input, then sync
    pub fn step<T, D>(&mut self, telemetry: &mut T, device: &mut D) -> StepReport
    where
        T: Telemetry + ?Sized,
        D: PanelDevice + ?Sized,
    {
        let mut report = StepReport::default();
        self.drain_input(telemetry, device, &mut report);
        report.tick = self.engine.tick(telemetry, device);
        report
    }

    fn drain_input<T, D>(&mut self, telemetry: &mut T, device: &mut D, report: &mut StepReport)
    where
        T: Telemetry + ?Sized,
        D: PanelDevice + ?Sized,
    {
        for _ in 0..self.max_lines {
            let line = match device.read_line() {
                Ok(Some(line)) => line,
                Ok(None) => return,
                Err(e) => {
                    warn!("Reading panel input failed: {}", e);
                    report.input_error = Some(e.into());
                    return;
                }
            };

            match self.dispatcher.dispatch(&line, telemetry) {
                Ok(Dispatched::Reset) => {
                    self.engine.reset();
                    report.inputs.push(Dispatched::Reset);
                }
                Ok(dispatched) => report.inputs.push(dispatched),
                Err(e) if e.is_unrecognized_input() => {
                    warn!("Unrecognized panel line {:?}", line.trim_end());
                    report.rejected.push(line.trim_end().to_string());
                }
                Err(e) => {
                    warn!("Dispatching panel input failed: {}", e);
                    report.input_error = Some(e);
                    return;
                }
            }
        }
        debug!("Input limit of {} lines reached, deferring the rest", self.max_lines);
    }
}

/// An open bridge run owning both links
///
/// Dropping the session shuts down the telemetry subscription and closes
/// the panel device.
pub struct Session<T: Telemetry, D: PanelDevice> {
    bridge: Bridge,
    telemetry: T,
    device: D,
}

impl<T: Telemetry, D: PanelDevice> Session<T, D> {
    /// Take ownership of both links and subscribe every registered channel
    ///
    /// Both links are torn down if opening fails.
    pub fn open(config: SyncConfig, mut telemetry: T, mut device: D) -> Result<Self, SyncError> {
        let bridge = match Bridge::new(config) {
            Ok(bridge) => bridge,
            Err(e) => {
                telemetry.shutdown();
                device.close();
                return Err(e);
            }
        };
        let mut session = Self {
            bridge,
            telemetry,
            device,
        };

        // On failure the partially built session is dropped, which tears
        // down whatever was already subscribed.
        let channels: Vec<String> = session
            .bridge
            .engine()
            .config()
            .telemetry_channels()
            .into_iter()
            .map(str::to_string)
            .collect();
        for channel in &channels {
            session.telemetry.subscribe(channel)?;
        }

        info!("Session open, {} telemetry channels subscribed", channels.len());
        Ok(session)
    }

    /// Run one loop iteration
    pub fn step(&mut self) -> StepReport {
        self.bridge.step(&mut self.telemetry, &mut self.device)
    }

    /// Get the bridge
    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    /// Get the telemetry link
    pub fn telemetry(&self) -> &T {
        &self.telemetry
    }

    /// Get the telemetry link mutably
    pub fn telemetry_mut(&mut self) -> &mut T {
        &mut self.telemetry
    }

    /// Get the panel device
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Get the panel device mutably
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }
}

impl<T: Telemetry, D: PanelDevice> Drop for Session<T, D> {
    fn drop(&mut self) {
        self.telemetry.shutdown();
        self.device.close();
        info!("Session closed");
    }
}

impl<T: Telemetry, D: PanelDevice> std::fmt::Debug for Session<T, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("bridge", &self.bridge)
            .field("telemetry", &"<telemetry>")
            .field("device", &"<device>")
            .finish()
    }
}
