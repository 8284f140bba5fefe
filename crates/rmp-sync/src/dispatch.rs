//! Panel input dispatch
//!
//! Maps each line received from the panel to either a simulator command or
//! a reset request. The dispatcher is stateless; clearing the cache on a
//! reset is left to the owner of the [`crate::SyncEngine`].

use rmp_protocol::{ControlEvent, PanelInput};
use tracing::debug;

use crate::config::CommandMap;
use crate::error::SyncError;
use crate::io::Telemetry;

/// What a dispatched line did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    /// The panel rebooted; the caller must reset the engine
    Reset,
    /// A simulator command was issued
    Command {
        /// Control that was operated
        event: ControlEvent,
        /// Simulator command sent for it
        command: String,
    },
}

/// Lookup table from panel lines to simulator commands
#[derive(Debug, Clone, Default)]
pub struct InputDispatcher {
    commands: CommandMap,
}

impl InputDispatcher {
    /// Create a dispatcher using the given command mapping
    pub fn new(commands: CommandMap) -> Self {
        Self { commands }
    }

    /// Get the command mapping
    pub fn commands(&self) -> &CommandMap {
        &self.commands
    }

    /// Handle one panel line
    ///
    /// Unknown lines fail with [`rmp_protocol::ProtocolError::UnrecognizedInput`]
    /// and have no side effects.
    pub fn dispatch<T>(&self, line: &str, telemetry: &mut T) -> Result<Dispatched, SyncError>
    where
        T: Telemetry + ?Sized,
    {
        match PanelInput::parse_line(line)? {
            PanelInput::Reset => Ok(Dispatched::Reset),
            PanelInput::Control(event) => {
                let command = self.commands.command_for(event);
                debug!("Panel {} -> {}", event.token(), command);
                telemetry.send_command(command)?;
                Ok(Dispatched::Command {
                    event,
                    command: command.to_string(),
                })
            }
        }
    }
}
