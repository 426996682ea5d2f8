//! Console configuration.

use bevy::prelude::*;

/// Configuration for the [`Console`](crate::core::Console).
///
/// # Examples
///
/// ```
/// use bevy_cvar_console::ConsoleConfig;
///
/// let config = ConsoleConfig::default().max_args(8).echo_input(false);
/// assert_eq!(config.max_args, 8);
/// assert!(config.log_output);
/// ```
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Maximum number of arguments collected for a command.
    pub max_args: usize,
    /// Echo submitted input to the output as a command line.
    pub echo_input: bool,
    /// Mirror console output into `bevy::log`.
    pub log_output: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            max_args: 256,
            echo_input: true,
            log_output: true,
        }
    }
}

impl ConsoleConfig {
    /// Set the maximum number of arguments collected for a command.
    pub fn max_args(mut self, max_args: usize) -> Self {
        self.max_args = max_args;
        self
    }

    /// Set whether submitted input is echoed.
    pub fn echo_input(mut self, echo_input: bool) -> Self {
        self.echo_input = echo_input;
        self
    }

    /// Set whether output is mirrored into the log.
    pub fn log_output(mut self, log_output: bool) -> Self {
        self.log_output = log_output;
        self
    }
}
