//! Arithmetic and string conversions with an explicit failure policy.
//!
//! Every conversion either preserves the value or fails with
//! [`ConsoleError::Conversion`]. NaN and infinity never reach a numeric
//! destination, out-of-range values are never truncated into range, and text
//! is never silently read as zero.
//!
//! The entry points are:
//! - [`safe_numeric_cast`] for number to number
//! - [`number_to_text`] and [`text_to_number`] for the string edges
//! - [`arithmetic_or_string_cast`] which picks one of the above

use std::fmt;

use super::{ConsoleError, Result};

/// How many significant digits to keep when rendering a float as text.
///
/// Results are rounded. [`FloatPrecision::max`] picks the digit count that
/// guarantees a float -> text -> float round trip for the float type in use,
/// and [`FloatPrecision::normal`] the count that text -> float -> text
/// preserves. Renderings never carry more than [`MAX_RENDER_DIGITS`]
/// significant digits, which covers the exact expansion of any `f64`.
///
/// # Examples
///
/// ```
/// use bevy_cvar_console::core::{FloatPrecision, number_to_text};
///
/// let two = FloatPrecision::new(2).unwrap();
/// assert_eq!(number_to_text(3.14159f64, two), "3.1");
/// assert_eq!(FloatPrecision::max().get::<f64>(), 17);
/// assert_eq!(FloatPrecision::normal().get::<f32>(), 6);
/// assert!(FloatPrecision::new(-1).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatPrecision {
    /// An explicit number of significant digits.
    Digits(usize),
    /// The round-trip digit count of the concrete float type.
    Max,
    /// The decimal digit count the concrete float type always preserves.
    Normal,
}

impl FloatPrecision {
    /// Create an explicit precision. Negative digit counts are rejected.
    pub fn new(digits: i32) -> Result<Self> {
        usize::try_from(digits)
            .map(FloatPrecision::Digits)
            .map_err(|_| {
                ConsoleError::InvalidArgument(format!(
                    "float precision must be non-negative, got {digits}"
                ))
            })
    }

    /// The round-trip preserving precision.
    #[inline]
    pub const fn max() -> Self {
        FloatPrecision::Max
    }

    /// The precision of the float type's decimal digits.
    #[inline]
    pub const fn normal() -> Self {
        FloatPrecision::Normal
    }

    /// Check if this is the round-trip preset.
    #[inline]
    pub const fn is_max(&self) -> bool {
        matches!(self, FloatPrecision::Max)
    }

    /// Resolve to a digit count for the float type `F`.
    #[inline]
    pub fn get<F: FloatType>(&self) -> usize {
        match *self {
            FloatPrecision::Digits(digits) => digits,
            FloatPrecision::Max => F::MAX_DIGITS10,
            FloatPrecision::Normal => F::DIGITS10,
        }
    }
}

/// A number lifted out of its concrete type.
///
/// Integers are widened to `i128`, which holds every supported integer type
/// exactly. Floats keep their width so that rendering can pick the right
/// round-trip precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Any integer.
    Int(i128),
    /// A single precision float.
    F32(f32),
    /// A double precision float.
    F64(f64),
}

impl Number {
    /// Check that the number is neither NaN nor infinite.
    pub fn is_finite(&self) -> bool {
        match *self {
            Number::Int(_) => true,
            Number::F32(value) => value.is_finite(),
            Number::F64(value) => value.is_finite(),
        }
    }

    /// Name of the underlying representation.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Number::Int(_) => "integer",
            Number::F32(_) => "f32",
            Number::F64(_) => "f64",
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(value) => write!(f, "{value}"),
            Number::F32(value) => write!(f, "{value}"),
            Number::F64(value) => write!(f, "{value}"),
        }
    }
}

/// A primitive integer or float usable with the conversion engine.
///
/// Implemented for `i8`..`i64`, `u8`..`u64`, `isize`, `usize`, `f32` and `f64`.
pub trait Arithmetic: Copy + PartialOrd + fmt::Debug + Send + Sync + 'static {
    /// Type name used in diagnostics.
    const NAME: &'static str;

    /// Lift the value into a [`Number`].
    fn to_number(self) -> Number;

    /// Range-checked construction from a finite [`Number`].
    ///
    /// Floats are truncated toward zero when the destination is an integer.
    /// Returns `None` when the value does not fit.
    fn from_number(number: Number) -> Option<Self>;

    /// Parse text into this type.
    fn parse_text(text: &str) -> Result<Self>;

    /// Return the number unchanged when it already has this exact type.
    fn identity(_number: Number) -> Option<Self> {
        None
    }
}

/// A float type with a known round-trip digit count.
pub trait FloatType: Arithmetic {
    /// Significant digits needed for an exact text round trip.
    const MAX_DIGITS10: usize;
    /// Decimal digits that survive a text -> float -> text round trip.
    const DIGITS10: usize;
}

/// Truncate a finite float toward zero into the `i128` range.
fn float_to_integer(value: f64) -> Option<i128> {
    if !value.is_finite() {
        return None;
    }
    let truncated = value.trunc();
    // i128::MIN is exactly -2^127; i128::MAX rounds up to 2^127.
    if truncated < i128::MIN as f64 || truncated >= i128::MAX as f64 {
        return None;
    }
    Some(truncated as i128)
}

fn not_a_number(text: &str, to: &'static str) -> ConsoleError {
    if text.is_empty() {
        ConsoleError::conversion("text", to, "empty input")
    } else {
        ConsoleError::conversion("text", to, format!("\"{text}\" is not a number"))
    }
}

fn out_of_range(number: Number, to: &'static str) -> ConsoleError {
    ConsoleError::conversion(number.kind_name(), to, format!("{number} is out of range"))
}

macro_rules! impl_integer {
    ($($t:ty),* $(,)?) => {$(
        impl Arithmetic for $t {
            const NAME: &'static str = stringify!($t);

            #[inline]
            fn to_number(self) -> Number {
                Number::Int(self as i128)
            }

            fn from_number(number: Number) -> Option<Self> {
                let wide = match number {
                    Number::Int(value) => value,
                    Number::F32(value) => float_to_integer(f64::from(value))?,
                    Number::F64(value) => float_to_integer(value)?,
                };
                <$t>::try_from(wide).ok()
            }

            fn parse_text(text: &str) -> Result<Self> {
                if let Ok(value) = text.parse::<$t>() {
                    return Ok(value);
                }

                // Fall back to reading a float and rounding half away from zero.
                let float: f64 = text.parse().map_err(|_| not_a_number(text, Self::NAME))?;
                if !float.is_finite() {
                    return Err(not_a_number(text, Self::NAME));
                }
                let rounded = Number::F64(float.round());
                Self::from_number(rounded).ok_or_else(|| out_of_range(rounded, Self::NAME))
            }
        }
    )*};
}

impl_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Arithmetic for f32 {
    const NAME: &'static str = "f32";

    #[inline]
    fn to_number(self) -> Number {
        Number::F32(self)
    }

    fn from_number(number: Number) -> Option<Self> {
        match number {
            // Every i128 magnitude is below f32::MAX, so this only rounds.
            Number::Int(value) => Some(value as f32),
            Number::F32(value) => value.is_finite().then_some(value),
            Number::F64(value) => {
                if !value.is_finite() || value.abs() > f64::from(f32::MAX) {
                    None
                } else {
                    Some(value as f32)
                }
            }
        }
    }

    fn parse_text(text: &str) -> Result<Self> {
        let value: f32 = text.parse().map_err(|_| not_a_number(text, Self::NAME))?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ConsoleError::conversion(
                "text",
                Self::NAME,
                format!("\"{text}\" is not a finite f32"),
            ))
        }
    }

    fn identity(number: Number) -> Option<Self> {
        match number {
            Number::F32(value) => Some(value),
            _ => None,
        }
    }
}

impl FloatType for f32 {
    const MAX_DIGITS10: usize = 9;
    const DIGITS10: usize = f32::DIGITS as usize;
}

impl Arithmetic for f64 {
    const NAME: &'static str = "f64";

    #[inline]
    fn to_number(self) -> Number {
        Number::F64(self)
    }

    fn from_number(number: Number) -> Option<Self> {
        match number {
            Number::Int(value) => Some(value as f64),
            Number::F32(value) => value.is_finite().then_some(f64::from(value)),
            Number::F64(value) => value.is_finite().then_some(value),
        }
    }

    fn parse_text(text: &str) -> Result<Self> {
        let value: f64 = text.parse().map_err(|_| not_a_number(text, Self::NAME))?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ConsoleError::conversion(
                "text",
                Self::NAME,
                format!("\"{text}\" is not a finite f64"),
            ))
        }
    }

    fn identity(number: Number) -> Option<Self> {
        match number {
            Number::F64(value) => Some(value),
            _ => None,
        }
    }
}

impl FloatType for f64 {
    const MAX_DIGITS10: usize = 17;
    const DIGITS10: usize = f64::DIGITS as usize;
}

/// Range-checked cast from one arithmetic type to another.
///
/// Fails when `from` is NaN or infinite, or when it lies outside the range of
/// `To`. Floats headed for an integer type are truncated toward zero.
///
/// # Examples
///
/// ```
/// use bevy_cvar_console::core::safe_numeric_cast;
///
/// assert_eq!(safe_numeric_cast::<i16, i32>(-32768).unwrap(), -32768);
/// assert!(safe_numeric_cast::<i8, i32>(500).is_err());
/// assert!(safe_numeric_cast::<f64, f64>(f64::NAN).is_err());
/// ```
pub fn safe_numeric_cast<To: Arithmetic, From: Arithmetic>(from: From) -> Result<To> {
    cast_number::<To>(from.to_number())
        .map_err(|err| ConsoleError::conversion(From::NAME, To::NAME, err.reason()))
}

fn cast_number<To: Arithmetic>(number: Number) -> Result<To> {
    if !number.is_finite() {
        return Err(ConsoleError::conversion(
            number.kind_name(),
            To::NAME,
            format!("{number} has no {} representation", To::NAME),
        ));
    }
    To::from_number(number).ok_or_else(|| out_of_range(number, To::NAME))
}

/// Render a number as text.
///
/// Floats use `precision` significant digits, switching to exponent notation
/// only when the exponent falls outside what that many digits can show, and
/// drop trailing zeros. NaN renders as `"nan"`, either infinity as `"inf"`.
/// Integers render exactly and ignore `precision`.
///
/// # Examples
///
/// ```
/// use bevy_cvar_console::core::{FloatPrecision, number_to_text};
///
/// let four = FloatPrecision::new(4).unwrap();
/// assert_eq!(number_to_text(50.5f64, four), "50.5");
/// assert_eq!(number_to_text(f32::NEG_INFINITY, four), "inf");
/// assert_eq!(number_to_text(-42i64, four), "-42");
/// ```
pub fn number_to_text<T: Arithmetic>(value: T, precision: FloatPrecision) -> String {
    render_number(value.to_number(), precision)
}

pub(crate) fn render_number(number: Number, precision: FloatPrecision) -> String {
    match number {
        Number::Int(value) => value.to_string(),
        Number::F32(value) => render_float(f64::from(value), precision.get::<f32>()),
        Number::F64(value) => render_float(value, precision.get::<f64>()),
    }
}

/// Upper bound on rendered significant digits.
///
/// The exact decimal expansion of an `f64` has at most 767 significant
/// digits, so larger precisions would only append zeros.
pub const MAX_RENDER_DIGITS: usize = 768;

fn render_float(value: f64, significant: usize) -> String {
    if value.is_nan() {
        return "nan".to_owned();
    }
    if value.is_infinite() {
        return "inf".to_owned();
    }

    let significant = significant.clamp(1, MAX_RENDER_DIGITS);
    let scientific = format!("{:.*e}", significant - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i64 = exponent.parse().unwrap_or_default();

    if exponent < -4 || exponent >= significant as i64 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", strip_trailing_zeros(mantissa), sign, exponent.abs())
    } else {
        let decimals = (significant as i64 - 1 - exponent) as usize;
        strip_trailing_zeros(&format!("{value:.decimals$}")).to_owned()
    }
}

fn strip_trailing_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

/// Parse text into an arithmetic type.
///
/// Floats accept the full range of the type and reject text that only parses
/// to NaN or infinity. Integers are parsed directly first; failing that, the
/// text is read as a float, rounded half away from zero and range-checked.
///
/// # Examples
///
/// ```
/// use bevy_cvar_console::core::text_to_number;
///
/// assert_eq!(text_to_number::<i32>("1.5").unwrap(), 2);
/// assert_eq!(text_to_number::<i32>("-1.5").unwrap(), -2);
/// assert!(text_to_number::<i16>("1000000.5").is_err());
/// assert!(text_to_number::<f32>("invalid").is_err());
/// ```
pub fn text_to_number<T: Arithmetic>(text: &str) -> Result<T> {
    T::parse_text(text)
}

/// A value on its way between an arithmetic type and text.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// A number.
    Number(Number),
    /// Text.
    Text(String),
}

/// Any type taking part in [`arithmetic_or_string_cast`].
pub trait ScalarType {
    /// Type name used in diagnostics.
    const TYPE_NAME: &'static str;
}

/// A source of a conversion: arithmetic types, `String` and `&str`.
pub trait IntoScalar: ScalarType {
    /// Lift the value into a [`Scalar`].
    fn into_scalar(self) -> Scalar;
}

/// A destination of a conversion: arithmetic types and `String`.
pub trait FromScalar: ScalarType + Sized {
    /// Convert a [`Scalar`] into this type.
    fn from_scalar(scalar: Scalar, precision: FloatPrecision) -> Result<Self>;
}

impl<T: Arithmetic> ScalarType for T {
    const TYPE_NAME: &'static str = <T as Arithmetic>::NAME;
}

impl<T: Arithmetic> IntoScalar for T {
    #[inline]
    fn into_scalar(self) -> Scalar {
        Scalar::Number(self.to_number())
    }
}

impl<T: Arithmetic> FromScalar for T {
    fn from_scalar(scalar: Scalar, _precision: FloatPrecision) -> Result<Self> {
        match scalar {
            Scalar::Number(number) => match T::identity(number) {
                Some(same) => Ok(same),
                None => cast_number(number),
            },
            Scalar::Text(text) => T::parse_text(&text),
        }
    }
}

impl ScalarType for String {
    const TYPE_NAME: &'static str = "String";
}

impl IntoScalar for String {
    #[inline]
    fn into_scalar(self) -> Scalar {
        Scalar::Text(self)
    }
}

impl FromScalar for String {
    fn from_scalar(scalar: Scalar, precision: FloatPrecision) -> Result<Self> {
        Ok(match scalar {
            Scalar::Number(number) => render_number(number, precision),
            Scalar::Text(text) => text,
        })
    }
}

impl ScalarType for &str {
    const TYPE_NAME: &'static str = "&str";
}

impl IntoScalar for &str {
    #[inline]
    fn into_scalar(self) -> Scalar {
        Scalar::Text(self.to_owned())
    }
}

impl ScalarType for &String {
    const TYPE_NAME: &'static str = "&String";
}

impl IntoScalar for &String {
    #[inline]
    fn into_scalar(self) -> Scalar {
        Scalar::Text(self.clone())
    }
}

/// Convert between arithmetic types and text.
///
/// - same type on both sides: the value is returned unchanged
/// - number to number: [`safe_numeric_cast`]
/// - number to text: [`number_to_text`] at `precision`
/// - text to number: [`text_to_number`]
///
/// Failures are reported with the source and destination type names.
///
/// # Examples
///
/// ```
/// use bevy_cvar_console::core::{arithmetic_or_string_cast, FloatPrecision};
///
/// let five = FloatPrecision::new(5).unwrap();
/// let text: String = arithmetic_or_string_cast(12.345678f64, five).unwrap();
/// assert_eq!(text, "12.346");
///
/// let number: u8 = arithmetic_or_string_cast("200", five).unwrap();
/// assert_eq!(number, 200);
///
/// assert!(arithmetic_or_string_cast::<i32, _>("1 invalid", five).is_err());
/// ```
pub fn arithmetic_or_string_cast<To, From>(value: From, precision: FloatPrecision) -> Result<To>
where
    To: FromScalar,
    From: IntoScalar,
{
    To::from_scalar(value.into_scalar(), precision).map_err(|err| {
        ConsoleError::conversion(From::TYPE_NAME, To::TYPE_NAME, err.reason())
    })
}
