//! Core console types.
//!
//! This module provides the fundamental building blocks:
//! - [`Console`] - Cvars, commands and console objects behind `parse`
//! - [`Cvar`] - Named, typed, runtime-settable values
//! - [`TypedValue`] - Float/Integer/String storage with conversion on write
//! - [`Dispatcher`] - Type-keyed callback registry with owner tracking
//! - [`Command`] / [`CommandInfo`] - Commands and their registration metadata
//! - [`split`] / [`nth_token`] - Delimiter tokenizer
//! - Conversions between numbers and text used throughout

mod command;
mod console;
mod convert;
mod cvar;
mod dispatcher;
mod error;
mod event;
mod events;
mod ids;
mod tokenizer;
mod value;

pub use command::{Command, CommandInfo, ParamsCount};
pub use console::{Console, ConsoleObject, ObjectContext, ObjectId};
pub use convert::{
    Arithmetic, FloatPrecision, FloatType, FromScalar, IntoScalar, MAX_RENDER_DIGITS, Number,
    Scalar, ScalarType, arithmetic_or_string_cast, number_to_text, safe_numeric_cast, text_to_number,
};
pub use cvar::{Cvar, CvarCollection, CvarProvider, cvar_collection};
pub use dispatcher::{CallbackKey, Dispatcher, OwnerId};
pub use error::{ConsoleError, Result};
pub use event::{
    AnyCallback, Callback, CallbackFn, ConEvent, EventKind, EventMarker, IntoCallbackFn,
    NoEventMarker, Predicate,
};
pub use events::{
    CommandSentEvent, ConsoleEventsPlugin, ConsoleInputEvent, ConsoleOutputEvent,
    ConsoleOutputLevel, CvarChangedEvent,
};
pub use ids::{IdType, SequentialIdAllocator};
pub use tokenizer::{TokenBounds, is_whitespace, nth_token, split};
pub use value::{Float, Integer, TypedValue, ValueKind};
