//! Field values carried by a point.

/// A typed field value.
///
/// Each variant maps onto exactly one line protocol rendering, see
/// [`LineProtocolWriter`](crate::LineProtocolWriter) for the formatting rules.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    /// UTF-8 string, rendered quoted.
    String(String),

    /// Single character, rendered as a one-character quoted string.
    Char(char),

    /// Boolean, rendered as `t` or `f`.
    Bool(bool),

    /// 32-bit floating point.
    F32(f32),

    /// 64-bit floating point.
    F64(f64),

    /// Signed 8-bit integer.
    I8(i8),

    /// Signed 16-bit integer.
    I16(i16),

    /// Signed 32-bit integer.
    I32(i32),

    /// Signed 64-bit integer.
    I64(i64),

    /// Unsigned 8-bit integer.
    U8(u8),

    /// Unsigned 16-bit integer.
    U16(u16),

    /// Unsigned 32-bit integer.
    U32(u32),

    /// Unsigned 64-bit integer. Only values up to `i64::MAX` can be encoded.
    U64(u64),

    /// A value of some other type.
    ///
    /// With a text form it is written as a quoted string; without one, encoding fails with
    /// [`Error::UnsupportedType`](crate::Error::UnsupportedType).
    Other {
        /// Name of the original type, used in error messages.
        type_name: String,
        /// Text conversion of the value, if it has one.
        text: Option<String>,
    },
}

impl FieldValue {
    /// Wrap any displayable value as an [`FieldValue::Other`] with a text form.
    pub fn display<T: std::fmt::Display + ?Sized>(value: &T) -> Self {
        FieldValue::Other {
            type_name: std::any::type_name::<T>().to_string(),
            text: Some(value.to_string()),
        }
    }

    /// An [`FieldValue::Other`] of type `T` that has no text form.
    pub fn opaque<T: ?Sized>() -> Self {
        FieldValue::Other {
            type_name: std::any::type_name::<T>().to_string(),
            text: None,
        }
    }

    /// Short name of the value's kind.
    pub fn type_name(&self) -> &str {
        match self {
            FieldValue::String(_) => "string",
            FieldValue::Char(_) => "char",
            FieldValue::Bool(_) => "bool",
            FieldValue::F32(_) => "f32",
            FieldValue::F64(_) => "f64",
            FieldValue::I8(_) => "i8",
            FieldValue::I16(_) => "i16",
            FieldValue::I32(_) => "i32",
            FieldValue::I64(_) => "i64",
            FieldValue::U8(_) => "u8",
            FieldValue::U16(_) => "u16",
            FieldValue::U32(_) => "u32",
            FieldValue::U64(_) => "u64",
            FieldValue::Other { type_name, .. } => type_name,
        }
    }

    /// Returns the value as a string reference if it is a `String` variant.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as a bool if it is a `Bool` variant.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value widened to f64 if it is a floating point variant.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::F32(f) => Some(f64::from(*f)),
            FieldValue::F64(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the value widened to i64 if it is an integer variant that fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::I8(i) => Some(i64::from(*i)),
            FieldValue::I16(i) => Some(i64::from(*i)),
            FieldValue::I32(i) => Some(i64::from(*i)),
            FieldValue::I64(i) => Some(*i),
            FieldValue::U8(u) => Some(i64::from(*u)),
            FieldValue::U16(u) => Some(i64::from(*u)),
            FieldValue::U32(u) => Some(i64::from(*u)),
            FieldValue::U64(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(value: $ty) -> Self {
                    FieldValue::$variant(value)
                }
            }
        )*
    };
}

impl_from! {
    String => String,
    char => Char,
    bool => Bool,
    f32 => F32,
    f64 => F64,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<&String> for FieldValue {
    fn from(value: &String) -> Self {
        FieldValue::String(value.clone())
    }
}

/// JSON values map onto their natural field kind. Null, arrays and objects have no
/// line protocol form and become opaque [`FieldValue::Other`] values.
impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match value {
            Json::Bool(b) => FieldValue::Bool(b),
            Json::String(s) => FieldValue::String(s),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    FieldValue::I64(i)
                } else if let Some(u) = n.as_u64() {
                    FieldValue::U64(u)
                } else {
                    // serde_json numbers are always representable as f64 without
                    // arbitrary_precision
                    FieldValue::F64(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Json::Null => FieldValue::Other {
                type_name: "json null".to_string(),
                text: None,
            },
            Json::Array(_) => FieldValue::Other {
                type_name: "json array".to_string(),
                text: None,
            },
            Json::Object(_) => FieldValue::Other {
                type_name: "json object".to_string(),
                text: None,
            },
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Char(c) => write!(f, "{}", c),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::F32(v) => write!(f, "{}", v),
            FieldValue::F64(v) => write!(f, "{}", v),
            FieldValue::I8(v) => write!(f, "{}", v),
            FieldValue::I16(v) => write!(f, "{}", v),
            FieldValue::I32(v) => write!(f, "{}", v),
            FieldValue::I64(v) => write!(f, "{}", v),
            FieldValue::U8(v) => write!(f, "{}", v),
            FieldValue::U16(v) => write!(f, "{}", v),
            FieldValue::U32(v) => write!(f, "{}", v),
            FieldValue::U64(v) => write!(f, "{}", v),
            FieldValue::Other { text: Some(t), .. } => write!(f, "{}", t),
            FieldValue::Other { type_name, text: None } => write!(f, "<{}>", type_name),
        }
    }
}
