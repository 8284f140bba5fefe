//! Radio Management Panel Sync Engine
//!
//! This crate keeps a cockpit radio management panel in step with the
//! flight simulator's radio state and relays the panel's knobs and buttons
//! back to the simulator.
//!
//! # Architecture
//!
//! The bridge runs a single cooperative loop. Each iteration:
//!
//! - **Input dispatch**: drains pending panel lines, issuing a simulator
//!   command per control event or clearing the cache on `reset`
//! - **Sync pass**: reads telemetry, converts it with the frequency codec,
//!   compares against the device state cache, and writes frames for
//!   changed channels only, followed by a single flush
//!
//! The simulator and panel links are abstracted behind the [`Telemetry`]
//! and [`PanelDevice`] traits.
//!
//! # Example
//!
//! ```rust,no_run
//! use rmp_sync::{Session, SyncConfig, PanelDevice, Telemetry};
//!
//! fn run<T: Telemetry, D: PanelDevice>(telemetry: T, device: D) -> Result<(), rmp_sync::SyncError> {
//!     let mut session = Session::open(SyncConfig::default(), telemetry, device)?;
//!     loop {
//!         let report = session.step();
//!         if report.tick.changed() {
//!             println!("sent {} frames", report.tick.sent.len());
//!         }
//!     }
//! }
//! ```

pub mod bridge;
pub mod cache;
pub mod channel;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod io;

pub use bridge::{Bridge, Session, StepReport};
pub use cache::DeviceStateCache;
pub use channel::{ChannelId, ChannelValue};
pub use config::{BrightnessSource, CommandMap, PowerSource, SelfTestSource, SyncConfig};
pub use dispatch::{Dispatched, InputDispatcher};
pub use engine::{scale_brightness, SyncEngine, TickReport};
pub use error::{SyncError, TransportError};
pub use io::{PanelDevice, Telemetry};
