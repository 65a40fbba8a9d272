//! Commands from the shortcut handler to the navigator
//!
//! The privileged side turns keyboard shortcuts into [`Command`]s and fires
//! them at the page side over an unbounded channel. Delivery is
//! fire-and-forget: a failed send is logged and reported once, never retried.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Commands the navigator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    #[serde(rename = "LLM_NAV_PREV_ANSWER")]
    PrevAnswer,
    #[serde(rename = "LLM_NAV_NEXT_ANSWER")]
    NextAnswer,
    #[serde(rename = "LLM_NAV_TOGGLE_UI")]
    ToggleOverlay,
    #[serde(rename = "LLM_NAV_TOGGLE_PIN")]
    TogglePin,
}

impl Command {
    pub const ALL: [Command; 4] = [
        Command::PrevAnswer,
        Command::NextAnswer,
        Command::ToggleOverlay,
        Command::TogglePin,
    ];

    /// Command bound to a keyboard shortcut name, e.g. `next-answer`.
    pub fn from_shortcut(name: &str) -> Option<Self> {
        match name {
            "prev-answer" => Some(Command::PrevAnswer),
            "next-answer" => Some(Command::NextAnswer),
            "toggle-ui" => Some(Command::ToggleOverlay),
            "toggle-pin" => Some(Command::TogglePin),
            _ => None,
        }
    }

    pub fn shortcut(self) -> &'static str {
        match self {
            Command::PrevAnswer => "prev-answer",
            Command::NextAnswer => "next-answer",
            Command::ToggleOverlay => "toggle-ui",
            Command::TogglePin => "toggle-pin",
        }
    }

    /// JSON message, e.g. `{"type":"LLM_NAV_NEXT_ANSWER"}`.
    pub fn to_wire(self) -> Result<String> {
        Ok(serde_json::to_string(&self)?)
    }

    pub fn from_wire(payload: &str) -> Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }
}

/// Sending half, held by the shortcut handler.
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: mpsc::UnboundedSender<Command>,
}

/// Receiving half, held by the page side.
#[derive(Debug)]
pub struct CommandReceiver {
    rx: mpsc::UnboundedReceiver<Command>,
}

/// Create a connected sender/receiver pair.
pub fn channel() -> (CommandSender, CommandReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (CommandSender { tx }, CommandReceiver { rx })
}

impl CommandSender {
    /// Fire a command. Fails only when the receiving side is gone.
    pub fn send(&self, command: Command) -> Result<()> {
        self.tx.send(command).map_err(|e| {
            warn!(command = ?e.0, "command not delivered, page side is gone");
            Error::Delivery(format!("{:?}", e.0))
        })
    }

    /// Send the command bound to a shortcut. Unknown shortcuts are ignored.
    pub fn dispatch_shortcut(&self, name: &str) -> Result<Option<Command>> {
        let Some(command) = Command::from_shortcut(name) else {
            debug!(shortcut = name, "ignoring unknown shortcut");
            return Ok(None);
        };
        self.send(command)?;
        Ok(Some(command))
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl CommandReceiver {
    /// Next pending command, if any, without blocking.
    pub fn try_recv(&mut self) -> Option<Command> {
        self.rx.try_recv().ok()
    }

    /// Every pending command, in send order.
    pub fn drain(&mut self) -> Vec<Command> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}
