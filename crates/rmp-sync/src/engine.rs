//! Sync engine
//!
//! One call to [`SyncEngine::tick`] is one synchronization pass:
//!
//! 1. Read every registered telemetry channel (plus the lamp-test switch).
//! 2. Turn each reading into a [`ChannelValue`], or mark it unavailable.
//! 3. Compare against the [`DeviceStateCache`] and write a frame for every
//!    channel whose value changed.
//! 4. Flush the device once if anything was written.
//!
//! A telemetry failure abandons the pass before anything is written. A
//! write failure stops the pass at the failing channel; frames already
//! written are still flushed. A failed flush forgets every channel written
//! this pass. In all cases the cache only holds values the panel received,
//! so the next pass retries naturally.

use std::collections::HashMap;

use rmp_protocol::{Frequency, ProtocolError, WireFrame};
use tracing::{debug, info, warn};

use crate::cache::DeviceStateCache;
use crate::channel::{ChannelId, ChannelValue};
use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::io::{PanelDevice, Telemetry};

/// Result of reading one channel
#[derive(Debug)]
enum Reading {
    /// No usable data yet
    Unavailable,
    /// Data converted to a display value
    Value(ChannelValue),
    /// Data present but not convertible
    Invalid(ProtocolError),
}

/// Outcome of a single sync pass
#[derive(Debug, Default)]
pub struct TickReport {
    /// Frames written this pass, in write order
    pub sent: Vec<(ChannelId, WireFrame)>,
    /// Channels whose value matched the cache
    pub unchanged: Vec<ChannelId>,
    /// Channels with no data yet
    pub unavailable: Vec<ChannelId>,
    /// Channels whose value could not be converted or encoded
    pub failed: Vec<(ChannelId, ProtocolError)>,
    /// Transport error that cut the pass short
    pub aborted: Option<SyncError>,
    /// Whether the device was flushed
    pub flushed: bool,
}

impl TickReport {
    /// Returns true if every registered channel was processed without error
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.aborted.is_none()
    }

    /// Returns true if at least one frame was written
    pub fn changed(&self) -> bool {
        !self.sent.is_empty()
    }

    /// Frames written this pass
    pub fn frames(&self) -> impl Iterator<Item = &WireFrame> {
        self.sent.iter().map(|(_, frame)| frame)
    }

    /// Frame written for a specific channel, if any
    pub fn frame_for(&self, channel: ChannelId) -> Option<&WireFrame> {
        self.sent
            .iter()
            .find(|(ch, _)| *ch == channel)
            .map(|(_, frame)| frame)
    }

    /// Channels that failed conversion or encoding
    pub fn failed_channels(&self) -> Vec<ChannelId> {
        self.failed.iter().map(|(ch, _)| *ch).collect()
    }
}

/// Change-detecting synchronizer from telemetry to panel
#[derive(Debug)]
pub struct SyncEngine {
    config: SyncConfig,
    cache: DeviceStateCache,
    /// Last logged failure per channel, to keep repeated failures quiet
    last_failures: HashMap<ChannelId, ProtocolError>,
}

impl SyncEngine {
    /// Create an engine with an empty cache
    pub fn new(config: SyncConfig) -> Result<Self, SyncError> {
        config.validate()?;
        Ok(Self {
            config,
            cache: DeviceStateCache::new(),
            last_failures: HashMap::new(),
        })
    }

    /// Get the current configuration
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// What the engine believes the panel is showing
    pub fn cache(&self) -> &DeviceStateCache {
        &self.cache
    }

    /// Forget the panel state so every channel is resent on the next pass
    pub fn reset(&mut self) {
        info!("Panel reset, resending all channels");
        self.cache.clear_all();
        self.last_failures.clear();
    }

    /// Run one synchronization pass
    pub fn tick<T, D>(&mut self, telemetry: &mut T, device: &mut D) -> TickReport
    where
        T: Telemetry + ?Sized,
        D: PanelDevice + ?Sized,
    {
        let mut report = TickReport::default();

        let readings = match self.read_channels(telemetry) {
            Ok(readings) => readings,
            Err(e) => {
                warn!("Telemetry read failed, skipping sync pass: {}", e);
                report.aborted = Some(e);
                return report;
            }
        };

        for (channel, reading) in readings {
            let value = match reading {
                Reading::Unavailable => {
                    report.unavailable.push(channel);
                    continue;
                }
                Reading::Invalid(e) => {
                    self.record_failure(channel, e, &mut report);
                    continue;
                }
                Reading::Value(value) => value,
            };

            if !self.cache.is_stale(channel, &value) {
                self.last_failures.remove(&channel);
                report.unchanged.push(channel);
                continue;
            }

            let frame = match value.to_frame(channel) {
                Ok(frame) => frame,
                Err(e) => {
                    self.record_failure(channel, e, &mut report);
                    continue;
                }
            };

            if let Err(e) = device.write(&frame.to_bytes()) {
                warn!("Write to panel failed on {}: {}", channel.name(), e);
                report.aborted = Some(e.into());
                break;
            }

            debug!("Sent {} {:?}", channel.name(), value);
            self.cache.set(channel, value);
            self.last_failures.remove(&channel);
            report.sent.push((channel, frame));
        }

        if report.changed() {
            match device.flush() {
                Ok(()) => report.flushed = true,
                Err(e) => {
                    warn!("Flushing panel failed: {}", e);
                    for (channel, _) in &report.sent {
                        self.cache.forget(*channel);
                    }
                    if report.aborted.is_none() {
                        report.aborted = Some(e.into());
                    }
                }
            }
        }

        report
    }

    fn read_channels<T>(&self, telemetry: &mut T) -> Result<Vec<(ChannelId, Reading)>, SyncError>
    where
        T: Telemetry + ?Sized,
    {
        let testing = match &self.config.self_test {
            Some(test) => telemetry.read(&test.channel)? == Some(test.active_value),
            None => false,
        };

        let mut readings = Vec::with_capacity(ChannelId::ALL.len());
        for channel in ChannelId::ALL {
            let Some(source) = self.config.source(channel) else {
                continue;
            };

            let reading = match channel {
                ChannelId::ActiveFrequency | ChannelId::StandbyFrequency if testing => {
                    Reading::Value(ChannelValue::Frequency(Frequency::TEST))
                }
                ChannelId::ActiveFrequency | ChannelId::StandbyFrequency => {
                    frequency_reading(telemetry.read(source)?)
                }
                ChannelId::Brightness => {
                    let scale = self.config.brightness.as_ref().map_or(0, |b| b.scale);
                    match telemetry.read(source)? {
                        Some(raw) => Reading::Value(ChannelValue::Level(scale_brightness(raw, scale))),
                        None => Reading::Unavailable,
                    }
                }
                ChannelId::Power => {
                    let on_value = self.config.power.as_ref().map_or(1.0, |p| p.on_value);
                    match telemetry.read(source)? {
                        Some(raw) => Reading::Value(ChannelValue::Switch(raw == on_value)),
                        None => Reading::Unavailable,
                    }
                }
            };
            readings.push((channel, reading));
        }

        Ok(readings)
    }

    fn record_failure(&mut self, channel: ChannelId, error: ProtocolError, report: &mut TickReport) {
        if self.last_failures.get(&channel) == Some(&error) {
            debug!("Still cannot update {}: {}", channel.name(), error);
        } else {
            warn!("Cannot update {}: {}", channel.name(), error);
            self.last_failures.insert(channel, error.clone());
        }
        report.failed.push((channel, error));
    }
}

/// Raw frequency reading to display value; `0` means "not reported yet"
fn frequency_reading(raw: Option<f64>) -> Reading {
    match raw {
        None => Reading::Unavailable,
        Some(raw) if raw == 0.0 => Reading::Unavailable,
        Some(raw) => match Frequency::from_reading(raw) {
            Ok(freq) => Reading::Value(ChannelValue::Frequency(freq)),
            Err(e) => Reading::Invalid(e),
        },
    }
}

/// Scale a 0.0..=1.0 lighting level to the panel's backlight steps
pub fn scale_brightness(raw: f64, scale: u8) -> u8 {
    (raw * f64::from(scale)).round().clamp(0.0, f64::from(u8::MAX)) as u8
}
