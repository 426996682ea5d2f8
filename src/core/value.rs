//! The typed value stored inside a [`Cvar`](super::Cvar).

use std::fmt;

use super::convert::{FloatPrecision, FromScalar, IntoScalar, Number, Scalar, render_number};
use super::{ConsoleError, Result};

/// The float representation of a [`TypedValue`].
pub type Float = f64;

/// The integer representation of a [`TypedValue`].
pub type Integer = i64;

/// Which representation a [`TypedValue`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// A [`Float`].
    Float,
    /// An [`Integer`].
    Integer,
    /// Text.
    String,
}

impl ValueKind {
    /// Name used in diagnostics and console output.
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Float => "Float",
            ValueKind::Integer => "Integer",
            ValueKind::String => "String",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value whose kind is fixed at construction.
///
/// Writes and reads go through the conversion engine, so a Float value can be
/// set from text and read back as a `u8`, as long as every step is lossless
/// enough to pass the range checks. A failed write leaves the value untouched.
///
/// # Examples
///
/// ```
/// use bevy_cvar_console::core::{TypedValue, ValueKind};
///
/// let mut value = TypedValue::new(ValueKind::Integer, "41.5").unwrap();
/// assert_eq!(value.get_as_string(), "42");
///
/// assert!(value.set("not a number").is_err());
/// assert_eq!(value.get_as::<u8>().unwrap(), 42);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    /// A finite float.
    Float(Float),
    /// An integer.
    Integer(Integer),
    /// Text.
    String(String),
}

impl TypedValue {
    /// Precision used when a number is rendered as text without an explicit
    /// precision.
    pub const DEFAULT_PRECISION: FloatPrecision = FloatPrecision::Digits(4);

    /// Create a value of `kind` from `initial`.
    pub fn new<V: IntoScalar>(kind: ValueKind, initial: V) -> Result<Self> {
        let mut value = Self::with_default(kind);
        value.set(initial)?;
        Ok(value)
    }

    /// Create the default value of `kind`: zero or the empty string.
    pub fn with_default(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Float => TypedValue::Float(0.0),
            ValueKind::Integer => TypedValue::Integer(0),
            ValueKind::String => TypedValue::String(String::new()),
        }
    }

    /// The kind this value was created with.
    pub fn kind(&self) -> ValueKind {
        match self {
            TypedValue::Float(_) => ValueKind::Float,
            TypedValue::Integer(_) => ValueKind::Integer,
            TypedValue::String(_) => ValueKind::String,
        }
    }

    /// Convert `value` into this value's kind and store it.
    pub fn set<V: IntoScalar>(&mut self, value: V) -> Result<()> {
        self.set_with_precision(value, Self::DEFAULT_PRECISION)
    }

    /// Like [`TypedValue::set`], rendering numbers at `precision` when this is
    /// a String value.
    pub fn set_with_precision<V: IntoScalar>(
        &mut self,
        value: V,
        precision: FloatPrecision,
    ) -> Result<()> {
        let kind = self.kind();
        let converted = Self::convert(kind, value.into_scalar(), precision)
            .map_err(|err| ConsoleError::conversion(V::TYPE_NAME, kind.name(), err.reason()))?;
        *self = converted;
        Ok(())
    }

    fn convert(kind: ValueKind, scalar: Scalar, precision: FloatPrecision) -> Result<Self> {
        if let Scalar::Number(number) = scalar
            && kind != ValueKind::String
            && !number.is_finite()
        {
            return Err(ConsoleError::conversion(
                number.kind_name(),
                kind.name(),
                format!("{number} is not finite"),
            ));
        }

        Ok(match kind {
            ValueKind::Float => TypedValue::Float(Float::from_scalar(scalar, precision)?),
            ValueKind::Integer => {
                // Floats are rounded half away from zero, like text input.
                let scalar = match scalar {
                    Scalar::Number(Number::F32(value)) => {
                        Scalar::Number(Number::F64(f64::from(value).round()))
                    }
                    Scalar::Number(Number::F64(value)) => Scalar::Number(Number::F64(value.round())),
                    other => other,
                };
                TypedValue::Integer(Integer::from_scalar(scalar, precision)?)
            }
            ValueKind::String => TypedValue::String(String::from_scalar(scalar, precision)?),
        })
    }

    fn to_scalar(&self) -> Scalar {
        match self {
            TypedValue::Float(value) => Scalar::Number(Number::F64(*value)),
            TypedValue::Integer(value) => Scalar::Number(Number::Int(i128::from(*value))),
            TypedValue::String(value) => Scalar::Text(value.clone()),
        }
    }

    /// Read the value as `T`.
    pub fn get_as<T: FromScalar>(&self) -> Result<T> {
        self.get_as_with_precision(Self::DEFAULT_PRECISION)
    }

    /// Read the value as `T`, rendering floats at `precision` when `T` is text.
    pub fn get_as_with_precision<T: FromScalar>(&self, precision: FloatPrecision) -> Result<T> {
        T::from_scalar(self.to_scalar(), precision)
            .map_err(|err| ConsoleError::conversion(self.kind().name(), T::TYPE_NAME, err.reason()))
    }

    /// Render the value as text at the default precision.
    pub fn get_as_string(&self) -> String {
        match self {
            TypedValue::Float(value) => {
                render_number(Number::F64(*value), Self::DEFAULT_PRECISION)
            }
            TypedValue::Integer(value) => value.to_string(),
            TypedValue::String(value) => value.clone(),
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.get_as_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ScalarType;

    /// Stands in for a type the conversion engine cannot represent.
    struct Incompatible;

    impl ScalarType for Incompatible {
        const TYPE_NAME: &'static str = "Incompatible";
    }

    impl IntoScalar for Incompatible {
        fn into_scalar(self) -> Scalar {
            Scalar::Number(Number::F64(f64::NAN))
        }
    }

    #[test]
    fn test_defaults() {
        assert_eq!(TypedValue::with_default(ValueKind::Float).get_as_string(), "0");
        assert_eq!(TypedValue::with_default(ValueKind::Integer).get_as_string(), "0");
        assert_eq!(TypedValue::with_default(ValueKind::String).get_as_string(), "");
    }

    #[test]
    fn test_float_value() {
        let mut value = TypedValue::new(ValueKind::Float, 1.234f32).unwrap();
        assert_eq!(value.get_as_string(), "1.234");

        value.set("-3.14").unwrap();
        assert_eq!(value.get_as::<f64>().unwrap(), -3.14);
        assert_eq!(value.get_as::<i32>().unwrap(), -3);
        assert_eq!(value.kind(), ValueKind::Float);

        assert!(TypedValue::new(ValueKind::Float, "abc").is_err());
        assert!(value.set(f64::INFINITY).is_err());
        assert!(value.set("nan").is_err());
        assert_eq!(value.get_as::<f64>().unwrap(), -3.14);
    }

    #[test]
    fn test_integer_rounding() {
        let value = TypedValue::new(ValueKind::Integer, -0.49999999).unwrap();
        assert_eq!(value.get_as_string(), "0");

        let value = TypedValue::new(ValueKind::Integer, 0.5).unwrap();
        assert_eq!(value.get_as_string(), "1");

        let value = TypedValue::new(ValueKind::Integer, -2.5f32).unwrap();
        assert_eq!(value.get_as_string(), "-3");
    }

    #[test]
    fn test_integer_value() {
        let mut value = TypedValue::new(ValueKind::Integer, 300).unwrap();
        assert!(value.get_as::<u8>().is_err());
        assert_eq!(value.get_as::<u16>().unwrap(), 300);

        value.set(u64::MAX).unwrap_err();
        assert_eq!(value.get_as::<i64>().unwrap(), 300);

        value.set("1e3").unwrap();
        assert_eq!(value.get_as_string(), "1000");
        assert_eq!(value.get_as::<String>().unwrap(), "1000");
    }

    #[test]
    fn test_string_value() {
        let mut value = TypedValue::new(ValueKind::String, 50.5000).unwrap();
        assert_eq!(value.get_as_string(), "50.5");

        value.set("hello world").unwrap();
        assert!(value.get_as::<f32>().is_err());

        value.set("12.5").unwrap();
        assert_eq!(value.get_as::<f32>().unwrap(), 12.5);
        assert_eq!(value.get_as::<i32>().unwrap(), 13);

        value.set(f32::NEG_INFINITY).unwrap();
        assert_eq!(value.get_as_string(), "inf");
    }

    #[test]
    fn test_failed_set_keeps_previous() {
        let mut value = TypedValue::new(ValueKind::Float, 2.0).unwrap();
        let err = value.set(Incompatible).unwrap_err();
        assert!(err.is_conversion());
        assert_eq!(value, TypedValue::Float(2.0));

        let mut value = TypedValue::new(ValueKind::Integer, 7).unwrap();
        assert!(value.set(Incompatible).is_err());
        assert_eq!(value, TypedValue::Integer(7));
    }

    #[test]
    fn test_precision_aware_access() {
        let mut value = TypedValue::new(ValueKind::Float, 12.345678).unwrap();
        assert_eq!(value.get_as_string(), "12.35");

        let exact: String = value.get_as_with_precision(FloatPrecision::max()).unwrap();
        assert_eq!(exact.parse::<f64>().unwrap(), 12.345678);

        let mut text = TypedValue::with_default(ValueKind::String);
        text.set_with_precision(0.1f64, FloatPrecision::max()).unwrap();
        assert_eq!(text.get_as::<f64>().unwrap(), 0.1);

        value.set(0.1f32).unwrap();
        assert_eq!(value.get_as::<f32>().unwrap(), 0.1f32);
    }
}
