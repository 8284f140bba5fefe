//! Serial I/O handling for the panel connection

use std::io::{Read, Write};
use std::time::Duration;

use rmp_sync::{PanelDevice, TransportError};
use serialport::{ClearBuffer, SerialPort};
use tracing::{debug, warn};

/// Longest input line kept before the buffer is discarded
const MAX_LINE_LEN: usize = 256;

/// Assembles newline-terminated text lines from raw serial reads
#[derive(Debug, Default)]
pub struct LineBuffer {
    buffer: Vec<u8>,
}

impl LineBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw bytes
    pub fn push_bytes(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
        if self.buffer.len() > MAX_LINE_LEN && !self.buffer.contains(&b'\n') {
            warn!(
                "Discarding {} bytes of panel input without a line break",
                self.buffer.len()
            );
            self.buffer.clear();
        }
    }

    /// Take the next complete line, without its terminator
    pub fn next_line(&mut self) -> Option<String> {
        let end = self.buffer.iter().position(|&b| b == b'\n')?;
        let line: Vec<u8> = self.buffer.drain(..=end).take(end).collect();
        Some(String::from_utf8_lossy(&line).into_owned())
    }

    /// Drop any partial line
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

/// Panel connected over a serial port
pub struct SerialPanel {
    /// Port name, for logging
    name: String,
    /// Serial port
    port: Box<dyn SerialPort>,
    /// Partial input line
    lines: LineBuffer,
    /// Read buffer
    buffer: Vec<u8>,
    closed: bool,
}

impl SerialPanel {
    /// Open the panel's serial port
    pub fn open(name: &str, baud_rate: u32, timeout: Duration) -> Result<Self, serialport::Error> {
        let port = serialport::new(name, baud_rate).timeout(timeout).open()?;
        // Drop anything the panel printed before we were listening
        port.clear(ClearBuffer::All)?;
        debug!("Opened panel on {} at {} baud", name, baud_rate);

        Ok(Self {
            name: name.to_string(),
            port,
            lines: LineBuffer::new(),
            buffer: vec![0; 256],
            closed: false,
        })
    }

    /// Port name
    pub fn name(&self) -> &str {
        &self.name
    }

    fn check_open(&self) -> Result<(), TransportError> {
        if self.closed {
            Err(TransportError::Closed)
        } else {
            Ok(())
        }
    }
}

impl PanelDevice for SerialPanel {
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.check_open()?;
        self.port.write_all(bytes)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        self.check_open()?;
        self.port.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>, TransportError> {
        self.check_open()?;
        if let Some(line) = self.lines.next_line() {
            return Ok(Some(line));
        }

        let available = self
            .port
            .bytes_to_read()
            .map_err(|e| TransportError::Device(e.to_string()))?;
        if available == 0 {
            return Ok(None);
        }

        let want = (available as usize).min(self.buffer.len());
        match self.port.read(&mut self.buffer[..want]) {
            Ok(n) => {
                debug!("Read {} bytes from panel on {}", n, self.name);
                self.lines.push_bytes(&self.buffer[..n]);
            }
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {}
            Err(e) => return Err(e.into()),
        }
        Ok(self.lines.next_line())
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.port.flush() {
            warn!("Flushing {} on close failed: {}", self.name, e);
        }
        self.lines.clear();
        self.closed = true;
        debug!("Closed panel on {}", self.name);
    }
}
