//! Collaborator interfaces
//!
//! The engine never touches a socket or serial port directly. The simulator
//! side is reached through [`Telemetry`] and the panel through
//! [`PanelDevice`]; both are implemented outside this crate.

use crate::error::TransportError;

/// Simulator data and command channel
pub trait Telemetry {
    /// Ask the simulator to start reporting a channel
    fn subscribe(&mut self, _channel: &str) -> Result<(), TransportError> {
        Ok(())
    }

    /// Latest value of a channel, or `None` if it has never been reported
    fn read(&mut self, channel: &str) -> Result<Option<f64>, TransportError>;

    /// Fire-and-forget simulator command
    fn send_command(&mut self, command: &str) -> Result<(), TransportError>;

    /// Tear down every subscription
    fn shutdown(&mut self) {}
}

/// Serial link to the panel hardware
pub trait PanelDevice {
    /// Queue raw bytes for the panel
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    /// Push queued bytes onto the wire
    fn flush(&mut self) -> Result<(), TransportError>;

    /// Next complete input line, without blocking
    ///
    /// Returns `Ok(None)` when no full line is available yet.
    fn read_line(&mut self) -> Result<Option<String>, TransportError>;

    /// Release the link
    fn close(&mut self) {}
}

impl<T: Telemetry + ?Sized> Telemetry for Box<T> {
    fn subscribe(&mut self, channel: &str) -> Result<(), TransportError> {
        (**self).subscribe(channel)
    }

    fn read(&mut self, channel: &str) -> Result<Option<f64>, TransportError> {
        (**self).read(channel)
    }

    fn send_command(&mut self, command: &str) -> Result<(), TransportError> {
        (**self).send_command(command)
    }

    fn shutdown(&mut self) {
        (**self).shutdown();
    }
}

impl<D: PanelDevice + ?Sized> PanelDevice for Box<D> {
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        (**self).write(bytes)
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        (**self).flush()
    }

    fn read_line(&mut self) -> Result<Option<String>, TransportError> {
        (**self).read_line()
    }

    fn close(&mut self) {
        (**self).close();
    }
}
