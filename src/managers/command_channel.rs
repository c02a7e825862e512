//! Command Channel for tabhost.
//!
//! Carries one-shot [`Command`]s from a tab's controller to the host that is
//! attached at the moment of emission. Nothing is buffered for a host that
//! attaches later: commands emitted while detached are dropped.

use tokio::sync::mpsc::{self, error::{SendError, TryRecvError}};
use tracing::debug;

use crate::types::command::Command;

/// Sending half owned by the controller.
#[derive(Debug, Default)]
pub struct CommandChannel {
    sender: Option<mpsc::UnboundedSender<Command>>,
    dropped: u64,
}

/// Receiving half owned by the attached host.
#[derive(Debug)]
pub struct CommandReceiver {
    receiver: mpsc::UnboundedReceiver<Command>,
}

impl CommandChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a new receiver. Any previous receiver stops getting commands;
    /// nothing emitted before this call is delivered to the new one.
    pub fn attach(&mut self) -> CommandReceiver {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.sender = Some(sender);
        CommandReceiver { receiver }
    }

    pub fn detach(&mut self) {
        self.sender = None;
    }

    pub fn is_attached(&self) -> bool {
        self.sender.as_ref().is_some_and(|s| !s.is_closed())
    }

    /// Delivers to the attached receiver or drops the command.
    /// Returns whether it was handed over.
    pub fn emit(&mut self, command: Command) -> bool {
        let undelivered = match &self.sender {
            Some(sender) => match sender.send(command) {
                Ok(()) => return true,
                Err(SendError(command)) => command,
            },
            None => command,
        };

        // Receiver may have gone away without an explicit detach.
        self.sender = None;
        self.dropped += 1;
        debug!(command = ?undelivered, "dropping command: no attached host");
        false
    }

    /// Number of commands dropped because no host was attached.
    pub fn dropped_count(&self) -> u64 {
        self.dropped
    }
}

impl CommandReceiver {
    /// Next command in emission order, if one is waiting.
    pub fn try_next(&mut self) -> Option<Command> {
        match self.receiver.try_recv() {
            Ok(command) => Some(command),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Drains everything currently waiting, in order.
    pub fn drain(&mut self) -> Vec<Command> {
        let mut commands = Vec::new();
        while let Some(command) = self.try_next() {
            commands.push(command);
        }
        commands
    }
}
