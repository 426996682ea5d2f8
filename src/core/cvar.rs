//! Console variable (Cvar) implementation.
//!
//! Cvars are named, typed variables that can be read and written from the
//! console or from code. The kind of a Cvar is fixed when it is created; every
//! write is converted into that kind or rejected.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use bevy::log::debug;

use super::convert::{FloatPrecision, FromScalar, IntoScalar};
use super::value::{TypedValue, ValueKind};
use super::Result;

/// A named, described, typed runtime variable.
///
/// # Examples
///
/// ```
/// use bevy_cvar_console::core::{Cvar, ValueKind};
///
/// let mut gravity = Cvar::new("sv_gravity", ValueKind::Float, 800.0)
///     .unwrap()
///     .description("World gravity");
///
/// gravity.set("9.81").unwrap();
/// assert_eq!(gravity.get_as::<f32>().unwrap(), 9.81);
///
/// // Rejected writes leave the value alone
/// assert!(gravity.set("heavy").is_err());
/// assert_eq!(gravity.get_as_string(), "9.81");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Cvar {
    name: Box<str>,
    description: String,
    value: TypedValue,
}

impl Cvar {
    /// Create a Cvar of `kind` holding `initial`.
    ///
    /// Fails if `initial` cannot be converted into `kind`.
    pub fn new<V: IntoScalar>(name: impl Into<Box<str>>, kind: ValueKind, initial: V) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            description: String::new(),
            value: TypedValue::new(kind, initial)?,
        })
    }

    /// Create a Cvar of `kind` holding the kind's default value.
    pub fn with_default(name: impl Into<Box<str>>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            value: TypedValue::with_default(kind),
        }
    }

    /// Set the description.
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Get the name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the description.
    #[inline]
    pub fn get_description(&self) -> &str {
        &self.description
    }

    /// Replace the description.
    pub fn set_description(&mut self, desc: impl Into<String>) {
        self.description = desc.into();
    }

    /// Get the kind.
    #[inline]
    pub fn kind(&self) -> ValueKind {
        self.value.kind()
    }

    /// Get the stored value.
    #[inline]
    pub fn value(&self) -> &TypedValue {
        &self.value
    }

    /// Convert `value` into this Cvar's kind and store it.
    pub fn set<V: IntoScalar>(&mut self, value: V) -> Result<()> {
        self.value.set(value).inspect_err(|err| {
            debug!("Cvar '{}' rejected a write: {}", self.name, err);
        })
    }

    /// Read the value as `T`.
    pub fn get_as<T: FromScalar>(&self) -> Result<T> {
        self.value.get_as()
    }

    /// Read the value as `T` with an explicit float precision.
    pub fn get_as_with_precision<T: FromScalar>(&self, precision: FloatPrecision) -> Result<T> {
        self.value.get_as_with_precision(precision)
    }

    /// Render the value as text.
    pub fn get_as_string(&self) -> String {
        self.value.get_as_string()
    }
}

impl Display for Cvar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" = \"{}\"", self.name, self.value)?;
        if !self.description.is_empty() {
            write!(f, " - {}", self.description)?;
        }
        Ok(())
    }
}

/// Cvars keyed by name, iterated in name order.
pub type CvarCollection = BTreeMap<String, Cvar>;

/// Build a [`CvarCollection`], keeping the first Cvar of each name.
pub fn cvar_collection(cvars: impl IntoIterator<Item = Cvar>) -> CvarCollection {
    let mut collection = CvarCollection::new();
    for cvar in cvars {
        collection.entry(cvar.name().to_owned()).or_insert(cvar);
    }
    collection
}

/// A source of Cvars that can be merged into a running console.
///
/// # Examples
///
/// ```
/// use bevy_cvar_console::core::{Cvar, CvarCollection, CvarProvider, Result, ValueKind, cvar_collection};
///
/// struct Audio;
///
/// impl CvarProvider for Audio {
///     fn cvars() -> Result<CvarCollection> {
///         Ok(cvar_collection([
///             Cvar::new("volume", ValueKind::Float, 0.8)?,
///             Cvar::with_default("device", ValueKind::String),
///         ]))
///     }
/// }
///
/// assert_eq!(Audio::cvars().unwrap().len(), 2);
/// ```
pub trait CvarProvider {
    /// Build freshly constructed Cvars.
    fn cvars() -> Result<CvarCollection>;
}
