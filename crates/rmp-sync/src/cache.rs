//! Device state cache
//!
//! Tracks what the panel is currently showing, i.e. the last value written
//! to each channel. A missing entry means "unknown": the next tick with data
//! for that channel will send it unconditionally.

use std::collections::HashMap;

use crate::channel::{ChannelId, ChannelValue};

/// Last value successfully written to the panel, per channel
#[derive(Debug, Clone, Default)]
pub struct DeviceStateCache {
    values: HashMap<ChannelId, ChannelValue>,
}

impl DeviceStateCache {
    /// Create an empty cache (every channel unknown)
    pub fn new() -> Self {
        Self::default()
    }

    /// Last value written to `channel`, if known
    pub fn get(&self, channel: ChannelId) -> Option<&ChannelValue> {
        self.values.get(&channel)
    }

    /// Record a value written to `channel`
    pub fn set(&mut self, channel: ChannelId, value: ChannelValue) {
        self.values.insert(channel, value);
    }

    /// Forget one channel so it is resent on the next pass
    pub fn forget(&mut self, channel: ChannelId) {
        self.values.remove(&channel);
    }

    /// Forget every channel
    pub fn clear_all(&mut self) {
        self.values.clear();
    }

    /// Returns true if `value` differs from what the panel shows
    pub fn is_stale(&self, channel: ChannelId, value: &ChannelValue) -> bool {
        self.get(channel) != Some(value)
    }

    /// Number of known channels
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no channel is known
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
