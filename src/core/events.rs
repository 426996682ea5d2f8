//! Console events.
//!
//! Two families live here:
//! - Bevy messages carrying text into and out of the console
//! - [`ConEvent`]s sent through the console's [`Dispatcher`](super::Dispatcher)
//!   when a Cvar changes or a command is sent

use bevy::prelude::*;

use super::command::Command;
use super::cvar::Cvar;
use super::event::ConEvent;
use super::value::TypedValue;

/// Message carrying a line of text to be parsed by the console.
///
/// # Examples
///
/// ```ignore
/// fn submit_command(mut input: MessageWriter<ConsoleInputEvent>) {
///     input.write(ConsoleInputEvent::new("sv_gravity 600"));
/// }
/// ```
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct ConsoleInputEvent {
    /// The raw input line.
    pub command: String,
}

impl ConsoleInputEvent {
    /// Create a new input event.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

/// Message carrying a line of console output.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct ConsoleOutputEvent {
    /// The message text.
    pub message: String,
    /// The kind of output.
    pub level: ConsoleOutputLevel,
}

/// Kind of console output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleOutputLevel {
    /// General information.
    #[default]
    Info,
    /// Warning.
    Warn,
    /// Error.
    Error,
    /// Echo of the submitted input.
    Command,
    /// Response to the submitted input.
    Result,
}

impl ConsoleOutputEvent {
    /// Create a new output event.
    pub fn new(level: ConsoleOutputLevel, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level,
        }
    }

    /// Create an info message.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(ConsoleOutputLevel::Info, message)
    }

    /// Create a warning message.
    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(ConsoleOutputLevel::Warn, message)
    }

    /// Create an error message.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ConsoleOutputLevel::Error, message)
    }

    /// Create an input echo message.
    pub fn command(message: impl Into<String>) -> Self {
        Self::new(ConsoleOutputLevel::Command, message)
    }

    /// Create a result message.
    pub fn result(message: impl Into<String>) -> Self {
        Self::new(ConsoleOutputLevel::Result, message)
    }
}

/// Dispatched after a Cvar was successfully set.
#[derive(Debug, Clone, PartialEq)]
pub struct CvarChangedEvent {
    /// The Cvar after the change.
    pub cvar: Cvar,
    /// The value before the change.
    pub previous: TypedValue,
}

impl ConEvent for CvarChangedEvent {
    const NAME: &'static str = "cvar_changed";
}

/// Dispatched when a registered command is sent with an accepted argument count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSentEvent {
    /// The command as sent.
    pub command: Command,
}

impl ConEvent for CommandSentEvent {
    const NAME: &'static str = "command_sent";
}

/// Plugin that registers the console messages.
pub struct ConsoleEventsPlugin;

impl Plugin for ConsoleEventsPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<ConsoleInputEvent>()
            .add_message::<ConsoleOutputEvent>();
    }
}
