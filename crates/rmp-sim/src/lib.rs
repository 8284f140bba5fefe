//! RMP Simulation Library
//!
//! This crate provides a simulation layer for exercising the RMP bridge
//! without a flight simulator or panel hardware. It includes:
//!
//! - **VirtualCockpit**: Simulates the aircraft radio stack behind the
//!   telemetry link, including knob tuning and the lamp test
//! - **VirtualPanel**: Simulates the panel firmware, decoding frames into a
//!   display and queueing control events
//!
//! # Example
//!
//! ```rust
//! use rmp_protocol::{ControlEvent, Frequency};
//! use rmp_sim::{VirtualCockpit, VirtualPanel};
//! use rmp_sync::{Session, SyncConfig};
//!
//! let config = SyncConfig::default();
//! let cockpit = VirtualCockpit::new(&config);
//! let mut session = Session::open(config, cockpit, VirtualPanel::new()).unwrap();
//!
//! session.step();
//! assert_eq!(session.device().display().active, Some(Frequency::new(118, 300)));
//!
//! session.device_mut().press(ControlEvent::Swap);
//! session.step();
//! assert_eq!(session.device().display().active, Some(Frequency::new(121, 500)));
//! ```

pub mod cockpit;
pub mod panel;

pub use cockpit::{VirtualCockpit, VirtualCockpitConfig};
pub use panel::{PanelDisplay, VirtualPanel};
