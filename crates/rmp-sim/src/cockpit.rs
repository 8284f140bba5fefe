//! Virtual cockpit
//!
//! Provides a simulated aircraft radio stack that answers telemetry reads
//! and reacts to the RMP tuning commands the way the real aircraft does.

use std::collections::HashSet;

use rmp_protocol::{ControlEvent, Frequency, PREFIX_MAX, PREFIX_MIN, SUFFIX_MAX};
use rmp_sync::{SyncConfig, Telemetry, TransportError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Annunciator switch in BRT
const ANNUNCIATOR_BRIGHT: f64 = 1.0;

/// Configuration for creating a virtual cockpit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualCockpitConfig {
    /// Initial active frequency
    pub active: Frequency,
    /// Initial standby frequency
    pub standby: Frequency,
    /// Initial pedestal lighting (0.0..=1.0)
    pub brightness: f64,
    /// Initial RMP power switch state
    pub powered: bool,
}

impl Default for VirtualCockpitConfig {
    fn default() -> Self {
        Self {
            active: Frequency::new(118, 300),
            standby: Frequency::new(121, 500),
            brightness: 0.8,
            powered: true,
        }
    }
}

/// A simulated radio stack implementing [`Telemetry`]
#[derive(Debug)]
pub struct VirtualCockpit {
    sync: SyncConfig,
    active: Frequency,
    standby: Frequency,
    brightness: f64,
    powered: bool,
    annunciator: f64,
    /// Frequencies read as zero until the aircraft has loaded
    loaded: bool,
    subscribed: HashSet<String>,
    commands: Vec<String>,
    fail_reads: bool,
    shut_down: bool,
}

impl VirtualCockpit {
    /// Create a cockpit answering to the channel and command names in `sync`
    pub fn new(sync: &SyncConfig) -> Self {
        Self::from_config(sync, VirtualCockpitConfig::default())
    }

    /// Create a cockpit with explicit initial state
    pub fn from_config(sync: &SyncConfig, config: VirtualCockpitConfig) -> Self {
        Self {
            sync: sync.clone(),
            active: config.active,
            standby: config.standby,
            brightness: config.brightness,
            powered: config.powered,
            annunciator: ANNUNCIATOR_BRIGHT,
            loaded: true,
            subscribed: HashSet::new(),
            commands: Vec::new(),
            fail_reads: false,
            shut_down: false,
        }
    }

    /// Current active frequency
    pub fn active(&self) -> Frequency {
        self.active
    }

    /// Current standby frequency
    pub fn standby(&self) -> Frequency {
        self.standby
    }

    /// Tune the active frequency directly
    pub fn set_active(&mut self, freq: Frequency) {
        self.active = freq;
    }

    /// Tune the standby frequency directly
    pub fn set_standby(&mut self, freq: Frequency) {
        self.standby = freq;
    }

    /// Set pedestal lighting
    pub fn set_brightness(&mut self, level: f64) {
        self.brightness = level;
    }

    /// Flip the RMP power switch
    pub fn set_powered(&mut self, on: bool) {
        self.powered = on;
    }

    /// Hold the annunciator switch in TEST
    pub fn set_lamp_test(&mut self, active: bool) {
        self.annunciator = match &self.sync.self_test {
            Some(test) if active => test.active_value,
            _ => ANNUNCIATOR_BRIGHT,
        };
    }

    /// Simulate aircraft loading; unloaded radios report zero
    pub fn set_loaded(&mut self, loaded: bool) {
        self.loaded = loaded;
    }

    /// Make every subsequent read fail until cleared
    pub fn set_fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    /// Commands received, oldest first
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Returns true if `channel` is currently subscribed
    pub fn is_subscribed(&self, channel: &str) -> bool {
        self.subscribed.contains(channel)
    }

    /// Returns true once [`Telemetry::shutdown`] has been called
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Apply a panel control as the aircraft would
    pub fn apply(&mut self, event: ControlEvent) {
        let (prefix, suffix) = (self.standby.prefix(), self.standby.suffix());
        self.standby = match event {
            ControlEvent::OuterUp => Frequency::new(step_prefix(prefix, true), suffix),
            ControlEvent::OuterDown => Frequency::new(step_prefix(prefix, false), suffix),
            ControlEvent::InnerUp => Frequency::new(prefix, step_suffix(suffix, true)),
            ControlEvent::InnerDown => Frequency::new(prefix, step_suffix(suffix, false)),
            ControlEvent::Swap => {
                std::mem::swap(&mut self.active, &mut self.standby);
                return;
            }
        };
    }

    fn frequency_reading(&self, freq: Frequency) -> f64 {
        if self.loaded {
            f64::from(freq.as_khz())
        } else {
            0.0
        }
    }

    fn value_of(&self, channel: &str) -> Option<f64> {
        let sync = &self.sync;
        if sync.active_frequency.as_deref() == Some(channel) {
            return Some(self.frequency_reading(self.active));
        }
        if sync.standby_frequency.as_deref() == Some(channel) {
            return Some(self.frequency_reading(self.standby));
        }
        if sync.self_test.as_ref().is_some_and(|t| t.channel == channel) {
            return Some(self.annunciator);
        }
        if sync.brightness.as_ref().is_some_and(|b| b.channel == channel) {
            return Some(self.brightness);
        }
        if let Some(power) = sync.power.as_ref().filter(|p| p.channel == channel) {
            return Some(if self.powered { power.on_value } else { 0.0 });
        }
        None
    }
}

impl Telemetry for VirtualCockpit {
    fn subscribe(&mut self, channel: &str) -> Result<(), TransportError> {
        if self.shut_down {
            return Err(TransportError::Closed);
        }
        self.subscribed.insert(channel.to_string());
        Ok(())
    }

    fn read(&mut self, channel: &str) -> Result<Option<f64>, TransportError> {
        if self.shut_down {
            return Err(TransportError::Closed);
        }
        if self.fail_reads {
            return Err(TransportError::Telemetry("simulated read failure".into()));
        }
        if !self.subscribed.contains(channel) {
            return Ok(None);
        }
        Ok(self.value_of(channel))
    }

    fn send_command(&mut self, command: &str) -> Result<(), TransportError> {
        if self.shut_down {
            return Err(TransportError::Closed);
        }
        self.commands.push(command.to_string());

        let event = ControlEvent::ALL
            .into_iter()
            .find(|&event| self.sync.commands.command_for(event) == command);
        match event {
            Some(event) => self.apply(event),
            None => debug!("Virtual cockpit ignoring unknown command {}", command),
        }
        Ok(())
    }

    fn shutdown(&mut self) {
        self.subscribed.clear();
        self.shut_down = true;
    }
}

/// Step the MHz part, wrapping within the COM band
pub fn step_prefix(prefix: u16, up: bool) -> u16 {
    match (up, prefix) {
        (true, p) if p >= PREFIX_MAX => PREFIX_MIN,
        (true, p) => p + 1,
        (false, p) if p <= PREFIX_MIN => PREFIX_MAX,
        (false, p) => p - 1,
    }
}

/// Returns true if `suffix` is a valid 8.33 kHz channel name
///
/// Channel names repeat every 25 kHz as .x00, .x05, .x10, .x15.
pub fn is_channel_suffix(suffix: u16) -> bool {
    suffix <= SUFFIX_MAX && matches!(suffix % 25, 0 | 5 | 10 | 15)
}

/// Step the kHz part to the next 8.33 kHz channel, wrapping at 1 MHz
pub fn step_suffix(suffix: u16, up: bool) -> u16 {
    let modulus = SUFFIX_MAX + 1;
    let mut next = suffix.min(SUFFIX_MAX);
    loop {
        next = if up {
            (next + 1) % modulus
        } else {
            (next + SUFFIX_MAX) % modulus
        };
        if is_channel_suffix(next) {
            return next;
        }
    }
}
