//! Sync engine configuration
//!
//! Each display channel is an optional registration naming the simulator
//! telemetry channel it is fed from. Leaving a registration out drops that
//! channel from the sync pass entirely.

use rmp_protocol::ControlEvent;
use serde::{Deserialize, Serialize};

use crate::channel::ChannelId;
use crate::error::SyncError;

/// COM1 active frequency in 8.33 kHz units (e.g. 118300)
pub const DEFAULT_ACTIVE_FREQUENCY: &str = "sim/cockpit2/radios/actuators/com1_frequency_hz_833";
/// COM1 standby frequency in 8.33 kHz units
pub const DEFAULT_STANDBY_FREQUENCY: &str =
    "sim/cockpit2/radios/actuators/com1_standby_frequency_hz_833";
/// Annunciator test switch (0 = dim, 1 = bright, 2 = test)
pub const DEFAULT_SELF_TEST: &str = "AirbusFBW/AnnunMode";
/// Pedestal panel lighting (0.0..=1.0)
pub const DEFAULT_BRIGHTNESS: &str = "AirbusFBW/PanelBrightnessLevel";
/// RMP1 power switch
pub const DEFAULT_POWER: &str = "AirbusFBW/RMP1Switch";

/// Highest accepted brightness scale factor
pub const MAX_BRIGHTNESS_SCALE: u8 = 7;

/// Self-test (lamp check) source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfTestSource {
    /// Telemetry channel to watch
    pub channel: String,
    /// Raw value meaning "test active"
    pub active_value: f64,
}

impl Default for SelfTestSource {
    fn default() -> Self {
        Self {
            channel: DEFAULT_SELF_TEST.to_string(),
            active_value: 2.0,
        }
    }
}

/// Backlight source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrightnessSource {
    /// Telemetry channel to read
    pub channel: String,
    /// Multiplier applied to the raw reading (0..=7)
    pub scale: u8,
}

impl Default for BrightnessSource {
    fn default() -> Self {
        Self {
            channel: DEFAULT_BRIGHTNESS.to_string(),
            scale: 3,
        }
    }
}

/// Panel power source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerSource {
    /// Telemetry channel to read
    pub channel: String,
    /// Raw value meaning "powered"
    pub on_value: f64,
}

impl Default for PowerSource {
    fn default() -> Self {
        Self {
            channel: DEFAULT_POWER.to_string(),
            on_value: 1.0,
        }
    }
}

/// Simulator commands issued for each panel control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandMap {
    /// Outer knob clockwise (MHz up)
    pub outer_up: String,
    /// Outer knob counter-clockwise (MHz down)
    pub outer_down: String,
    /// Inner knob clockwise (kHz up)
    pub inner_up: String,
    /// Inner knob counter-clockwise (kHz down)
    pub inner_down: String,
    /// Transfer button
    pub swap: String,
}

impl Default for CommandMap {
    fn default() -> Self {
        Self {
            outer_up: "AirbusFBW/RMP1FreqUpLrg".to_string(),
            outer_down: "AirbusFBW/RMP1FreqDownLrg".to_string(),
            inner_up: "AirbusFBW/RMP1FreqUpSml".to_string(),
            inner_down: "AirbusFBW/RMP1FreqDownSml".to_string(),
            swap: "AirbusFBW/RMPSwapCapt".to_string(),
        }
    }
}

impl CommandMap {
    /// Simulator command for a panel control
    pub fn command_for(&self, event: ControlEvent) -> &str {
        match event {
            ControlEvent::OuterUp => &self.outer_up,
            ControlEvent::OuterDown => &self.outer_down,
            ControlEvent::InnerUp => &self.inner_up,
            ControlEvent::InnerDown => &self.inner_down,
            ControlEvent::Swap => &self.swap,
        }
    }
}

/// Sync engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Telemetry channel for the active window
    pub active_frequency: Option<String>,
    /// Telemetry channel for the standby window
    pub standby_frequency: Option<String>,
    /// Lamp-test override for both frequency windows
    pub self_test: Option<SelfTestSource>,
    /// Backlight channel
    pub brightness: Option<BrightnessSource>,
    /// Power channel
    pub power: Option<PowerSource>,
    /// Panel control to simulator command mapping
    pub commands: CommandMap,
    /// Upper bound on panel lines handled before each sync pass
    pub max_input_lines_per_tick: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            active_frequency: Some(DEFAULT_ACTIVE_FREQUENCY.to_string()),
            standby_frequency: Some(DEFAULT_STANDBY_FREQUENCY.to_string()),
            self_test: Some(SelfTestSource::default()),
            brightness: Some(BrightnessSource::default()),
            power: Some(PowerSource::default()),
            commands: CommandMap::default(),
            max_input_lines_per_tick: 16,
        }
    }
}

impl SyncConfig {
    /// Frequencies only: no lamp test, backlight or power channels
    pub fn legacy() -> Self {
        Self {
            self_test: None,
            brightness: None,
            power: None,
            ..Self::default()
        }
    }

    /// Set the brightness scale, registering the default source if needed
    pub fn with_brightness_scale(mut self, scale: u8) -> Self {
        self.brightness.get_or_insert_with(BrightnessSource::default).scale = scale;
        self
    }

    /// Check invariants that serde cannot express
    pub fn validate(&self) -> Result<(), SyncError> {
        if let Some(brightness) = &self.brightness {
            if brightness.scale > MAX_BRIGHTNESS_SCALE {
                return Err(SyncError::InvalidConfig(format!(
                    "brightness scale {} exceeds {}",
                    brightness.scale, MAX_BRIGHTNESS_SCALE
                )));
            }
        }
        if self.max_input_lines_per_tick == 0 {
            return Err(SyncError::InvalidConfig(
                "max_input_lines_per_tick must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Telemetry channel feeding a display channel, if registered
    pub fn source(&self, channel: ChannelId) -> Option<&str> {
        match channel {
            ChannelId::ActiveFrequency => self.active_frequency.as_deref(),
            ChannelId::StandbyFrequency => self.standby_frequency.as_deref(),
            ChannelId::Brightness => self.brightness.as_ref().map(|b| b.channel.as_str()),
            ChannelId::Power => self.power.as_ref().map(|p| p.channel.as_str()),
        }
    }

    /// Display channels with a registered source, in sync order
    pub fn registered_channels(&self) -> Vec<ChannelId> {
        ChannelId::ALL
            .into_iter()
            .filter(|&channel| self.source(channel).is_some())
            .collect()
    }

    /// Every telemetry channel that must be subscribed
    pub fn telemetry_channels(&self) -> Vec<&str> {
        let mut channels: Vec<&str> = Vec::new();
        if let Some(test) = &self.self_test {
            channels.push(&test.channel);
        }
        for channel in ChannelId::ALL {
            if let Some(source) = self.source(channel) {
                if !channels.contains(&source) {
                    channels.push(source);
                }
            }
        }
        channels
    }
}
