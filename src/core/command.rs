//! Console commands and the metadata describing registered ones.

use std::fmt;

use super::convert::{FloatPrecision, FromScalar, arithmetic_or_string_cast};
use super::tokenizer::{TokenBounds, is_whitespace};
use super::{ConsoleError, Result};

/// A command name with its arguments.
///
/// # Examples
///
/// ```
/// use bevy_cvar_console::core::Command;
///
/// let cmd = Command::parse("spawn crate 3").unwrap();
/// assert_eq!(cmd.name(), "spawn");
/// assert_eq!(cmd.get(0), Some("crate"));
/// assert_eq!(cmd.arg_as::<u32>(1).unwrap(), 3);
///
/// assert!(Command::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    name: Box<str>,
    args: Vec<String>,
}

impl Command {
    /// Maximum number of arguments kept by [`Command::parse`].
    pub const MAX_PARSED_ARGS: usize = 1000;

    /// Create a command from a name and arguments.
    pub fn new(name: impl Into<Box<str>>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// Split whitespace-separated text into a command.
    ///
    /// The first token is the name. Fails with
    /// [`ConsoleError::InvalidArgument`] if the text has no tokens.
    pub fn parse(text: &str) -> Result<Self> {
        let mut tokens = TokenBounds::new(text, is_whitespace).map(|range| &text[range]);
        let name = tokens.next().ok_or_else(|| {
            ConsoleError::InvalidArgument("command text contains no tokens".to_owned())
        })?;

        Ok(Self {
            name: name.into(),
            args: tokens.take(Self::MAX_PARSED_ARGS).map(str::to_owned).collect(),
        })
    }

    /// Get the command name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get all arguments.
    #[inline]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Get the number of arguments.
    #[inline]
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Check if there are no arguments.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Get an argument by index.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// Convert an argument with the same rules as a Cvar write.
    ///
    /// Fails with [`ConsoleError::NotFound`] if there is no argument at
    /// `index`, or with a conversion error if it does not convert.
    pub fn arg_as<T: FromScalar>(&self, index: usize) -> Result<T> {
        let arg = self.get(index).ok_or_else(|| {
            ConsoleError::NotFound(format!("argument {index} of command \"{}\"", self.name))
        })?;
        arithmetic_or_string_cast(arg, FloatPrecision::max())
    }

    /// Join all arguments with a separator.
    pub fn join(&self, separator: &str) -> String {
        self.args.join(separator)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// How many arguments a registered command takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamsCount {
    /// Any number of arguments.
    Any,
    /// Everything after the name, joined into one argument.
    ConcatenateArgs,
    /// Exactly this many arguments.
    Exactly(usize),
}

impl ParamsCount {
    /// Check if `count` arguments are acceptable.
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            ParamsCount::Any => true,
            ParamsCount::ConcatenateArgs => count == 1,
            ParamsCount::Exactly(expected) => count == expected,
        }
    }
}

impl fmt::Display for ParamsCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamsCount::Any => f.write_str("any number of arguments"),
            ParamsCount::ConcatenateArgs => f.write_str("one or more words"),
            ParamsCount::Exactly(1) => f.write_str("exactly 1 argument"),
            ParamsCount::Exactly(n) => write!(f, "exactly {n} arguments"),
        }
    }
}

/// Metadata for a registered command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInfo {
    name: Box<str>,
    params: ParamsCount,
    description: String,
}

impl CommandInfo {
    /// Describe a command called `name` taking `params`.
    pub fn new(name: impl Into<Box<str>>, params: ParamsCount) -> Self {
        Self {
            name: name.into(),
            params,
            description: String::new(),
        }
    }

    /// Set the description.
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Get the command name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the parameter count.
    #[inline]
    pub fn params(&self) -> ParamsCount {
        self.params
    }

    /// Get the description.
    #[inline]
    pub fn get_description(&self) -> &str {
        &self.description
    }

    /// Check if `count` arguments are acceptable.
    #[inline]
    pub fn accepts(&self, count: usize) -> bool {
        self.params.accepts(count)
    }
}
