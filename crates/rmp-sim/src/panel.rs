//! Virtual radio management panel
//!
//! Simulates the panel firmware: frames written by the host are decoded
//! into display state once flushed, and knob/button presses are queued as
//! input lines for the host to read.

use std::collections::VecDeque;

use rmp_protocol::{ControlEvent, FrameCodec, FrameCommand, Frequency, PanelInput, WireFrame};
use rmp_sync::{PanelDevice, TransportError};
use tracing::{debug, warn};

/// What the panel is currently showing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PanelDisplay {
    /// Active window
    pub active: Option<Frequency>,
    /// Standby window
    pub standby: Option<Frequency>,
    /// Backlight level
    pub brightness: Option<u8>,
    /// Power state
    pub powered: Option<bool>,
}

impl PanelDisplay {
    fn apply(&mut self, frame: &WireFrame) {
        let [value, _] = frame.payload();
        match frame.command() {
            FrameCommand::SetActiveFrequency | FrameCommand::SetStandbyFrequency => {
                let freq = match Frequency::decode(frame.payload()) {
                    Ok(freq) => freq,
                    Err(e) => {
                        warn!("Virtual panel rejected frequency frame: {}", e);
                        return;
                    }
                };
                if frame.command() == FrameCommand::SetActiveFrequency {
                    self.active = Some(freq);
                } else {
                    self.standby = Some(freq);
                }
            }
            FrameCommand::SetBrightness => self.brightness = Some(value),
            FrameCommand::SetPower => self.powered = Some(value != 0),
        }
    }
}

/// A simulated panel implementing [`PanelDevice`]
#[derive(Debug, Default)]
pub struct VirtualPanel {
    codec: FrameCodec,
    /// Bytes written but not yet flushed
    pending: Vec<u8>,
    /// Frames received since the last `take_frames`
    frames: Vec<WireFrame>,
    display: PanelDisplay,
    input: VecDeque<String>,
    flushes: usize,
    fail_writes: bool,
    closed: bool,
}

impl VirtualPanel {
    /// Create a blank panel
    pub fn new() -> Self {
        Self::default()
    }

    /// Current display contents
    pub fn display(&self) -> PanelDisplay {
        self.display
    }

    /// Take every frame received since the last call
    pub fn take_frames(&mut self) -> Vec<WireFrame> {
        std::mem::take(&mut self.frames)
    }

    /// Number of flushes seen
    pub fn flushes(&self) -> usize {
        self.flushes
    }

    /// Returns true once the host has closed the link
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Operate a knob or button
    pub fn press(&mut self, event: ControlEvent) {
        self.queue_input(PanelInput::Control(event));
    }

    /// Reboot the panel: the display blanks and a reset is announced
    pub fn reboot(&mut self) {
        self.display = PanelDisplay::default();
        self.codec.clear();
        self.queue_input(PanelInput::Reset);
    }

    /// Queue a raw line (without terminator) for the host
    pub fn push_line(&mut self, line: &str) {
        self.input.push_back(format!("{}\n", line));
    }

    /// Make every subsequent write fail until cleared
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    fn queue_input(&mut self, input: PanelInput) {
        self.push_line(&input.to_string());
    }
}

impl PanelDevice for VirtualPanel {
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        if self.fail_writes {
            return Err(TransportError::Device("simulated write failure".into()));
        }
        self.pending.extend_from_slice(bytes);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.flushes += 1;
        self.codec.push_bytes(&self.pending);
        self.pending.clear();

        while let Some(frame) = self.codec.next_frame() {
            debug!("Virtual panel received {:?}", frame);
            self.display.apply(&frame);
            self.frames.push(frame);
        }
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>, TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        Ok(self.input.pop_front())
    }

    fn close(&mut self) {
        self.closed = true;
        self.pending.clear();
    }
}
