//! Plug value kinds and the values they carry.
//!
//! Every socket on a node is typed with one [`PlugType`] from a small closed
//! set. Output sockets hold a [`Value`] of their declared type; input sockets
//! read either a connected output's value or a literal synthesized from text
//! when the graph was built (see [`parse_literal`]).

use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The closed set of socket value kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlugType {
    /// Boolean switch.
    Bool,
    /// 32-bit signed integer.
    Int,
    /// Scalar float.
    Float,
    /// Float vector: a scalar or a buffer of samples.
    FloatVec,
    /// UTF-8 string.
    String,
    /// Discrete, edge-triggered event. Carries no value.
    Trigger,
    /// Polymorphic array of float channels.
    Channels,
}

impl PlugType {
    /// All plug types, in declaration order.
    pub const ALL: [PlugType; 7] = [
        PlugType::Bool,
        PlugType::Int,
        PlugType::Float,
        PlugType::FloatVec,
        PlugType::String,
        PlugType::Trigger,
        PlugType::Channels,
    ];

    /// Textual name used by type descriptors and graph documents.
    pub const fn name(self) -> &'static str {
        match self {
            PlugType::Bool => "bool",
            PlugType::Int => "int",
            PlugType::Float => "float",
            PlugType::FloatVec => "floatvec",
            PlugType::String => "string",
            PlugType::Trigger => "trigger",
            PlugType::Channels => "channels",
        }
    }

    /// Parses a textual type name. Case-insensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.name().eq_ignore_ascii_case(name))
    }

    /// The zero value of this type: what an unconnected input without a
    /// literal reads as, and what a fresh output holds.
    pub fn default_value(self) -> Value {
        match self {
            PlugType::Bool => Value::Bool(false),
            PlugType::Int => Value::Int(0),
            PlugType::Float => Value::Float(0.0),
            PlugType::FloatVec => Value::FloatVec(FloatBuffer::default()),
            PlugType::String => Value::String(String::new()),
            PlugType::Trigger => Value::Trigger,
            PlugType::Channels => Value::Channels(Channels::default()),
        }
    }

    /// Borrowed form of [`default_value`](Self::default_value), for readers
    /// that hand out references to input values.
    pub fn default_ref(self) -> &'static Value {
        static BOOL: Value = Value::Bool(false);
        static INT: Value = Value::Int(0);
        static FLOAT: Value = Value::Float(0.0);
        static FLOAT_VEC: Value = Value::FloatVec(FloatBuffer::Scalar(0.0));
        static STRING: Value = Value::String(String::new());
        static TRIGGER: Value = Value::Trigger;
        static CHANNELS: Value = Value::Channels(Channels {
            channels: Vec::new(),
        });

        match self {
            PlugType::Bool => &BOOL,
            PlugType::Int => &INT,
            PlugType::Float => &FLOAT,
            PlugType::FloatVec => &FLOAT_VEC,
            PlugType::String => &STRING,
            PlugType::Trigger => &TRIGGER,
            PlugType::Channels => &CHANNELS,
        }
    }

    /// Whether a literal of this type can be synthesized from text.
    pub const fn supports_literal(self) -> bool {
        matches!(
            self,
            PlugType::Bool
                | PlugType::Int
                | PlugType::Float
                | PlugType::FloatVec
                | PlugType::String
        )
    }
}

impl fmt::Display for PlugType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A float vector value: either a single scalar standing in for every sample,
/// or an explicit sample buffer.
///
/// Scalars are kept unexpanded so that constant control signals cost nothing
/// to pass around; [`sample`](Self::sample) reads both shapes uniformly.
#[derive(Clone, Debug, PartialEq)]
pub enum FloatBuffer {
    /// One value for every sample.
    Scalar(f32),
    /// Per-sample values.
    Samples(Vec<f32>),
}

impl Default for FloatBuffer {
    fn default() -> Self {
        FloatBuffer::Scalar(0.0)
    }
}

impl FloatBuffer {
    /// Returns true if this buffer holds a single scalar.
    pub fn is_scalar(&self) -> bool {
        matches!(self, FloatBuffer::Scalar(_))
    }

    /// Reads sample `index`. Scalars return their value for any index;
    /// buffers return 0.0 past their end.
    #[inline]
    pub fn sample(&self, index: usize) -> f32 {
        match self {
            FloatBuffer::Scalar(v) => *v,
            FloatBuffer::Samples(s) => s.get(index).copied().unwrap_or(0.0),
        }
    }

    /// Mean over all samples (the scalar itself for scalar buffers).
    pub fn mean(&self) -> f32 {
        match self {
            FloatBuffer::Scalar(v) => *v,
            FloatBuffer::Samples(s) if s.is_empty() => 0.0,
            FloatBuffer::Samples(s) => s.iter().sum::<f32>() / s.len() as f32,
        }
    }
}

/// An array of float channels, each with its own length.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Channels {
    channels: Vec<Vec<f32>>,
}

impl Channels {
    /// Creates a channel array from owned channel data.
    pub fn new(channels: Vec<Vec<f32>>) -> Self {
        Self { channels }
    }

    /// Number of channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Returns true if there are no channels.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Borrow channel `index`.
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// Iterate over all channels.
    pub fn iter(&self) -> impl Iterator<Item = &[f32]> {
        self.channels.iter().map(Vec::as_slice)
    }
}

/// A typed socket value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// See [`PlugType::Bool`].
    Bool(bool),
    /// See [`PlugType::Int`].
    Int(i32),
    /// See [`PlugType::Float`].
    Float(f32),
    /// See [`PlugType::FloatVec`].
    FloatVec(FloatBuffer),
    /// See [`PlugType::String`].
    String(String),
    /// See [`PlugType::Trigger`].
    Trigger,
    /// See [`PlugType::Channels`].
    Channels(Channels),
}

impl Value {
    /// The plug type this value belongs to.
    pub fn plug_type(&self) -> PlugType {
        match self {
            Value::Bool(_) => PlugType::Bool,
            Value::Int(_) => PlugType::Int,
            Value::Float(_) => PlugType::Float,
            Value::FloatVec(_) => PlugType::FloatVec,
            Value::String(_) => PlugType::String,
            Value::Trigger => PlugType::Trigger,
            Value::Channels(_) => PlugType::Channels,
        }
    }

    /// Returns the boolean, if this is a [`Value::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer, if this is a [`Value::Int`].
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the scalar, if this is a [`Value::Float`].
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the buffer, if this is a [`Value::FloatVec`].
    pub fn as_buffer(&self) -> Option<&FloatBuffer> {
        match self {
            Value::FloatVec(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the string slice, if this is a [`Value::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns the channels, if this is a [`Value::Channels`].
    pub fn as_channels(&self) -> Option<&Channels> {
        match self {
            Value::Channels(c) => Some(c),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::FloatVec(buf) => match buf {
                FloatBuffer::Scalar(v) => write!(f, "{v}"),
                FloatBuffer::Samples(s) => write!(f, "[{} samples, mean {}]", s.len(), buf.mean()),
            },
            Value::String(s) => write!(f, "{s:?}"),
            Value::Trigger => f.write_str("trigger"),
            Value::Channels(c) => write!(f, "[{} channels]", c.len()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f)
    }
}

impl From<FloatBuffer> for Value {
    fn from(b: FloatBuffer) -> Self {
        Value::FloatVec(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

/// Why a literal could not be synthesized exactly as written.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LiteralError {
    /// Literals of this kind cannot be written as text.
    #[error("cannot create a literal for plug type {ty}")]
    Unsupported {
        /// The plug type that was requested.
        ty: PlugType,
    },
    /// The text did not parse; `fallback` is the zero value of the type.
    #[error("malformed {ty} literal '{text}'")]
    Malformed {
        /// The plug type that was requested.
        ty: PlugType,
        /// The offending text.
        text: String,
        /// The value to use instead.
        fallback: Value,
    },
}

/// Synthesizes a literal of type `ty` from its textual form.
///
/// - `bool`: `1`, `true`, `yes`, `on` (any case) are true, anything else false
/// - `int` / `float`: trimmed decimal text; unparsable text is
///   [`LiteralError::Malformed`] carrying a zero fallback of the same type
/// - `floatvec`: a float, stored as a scalar buffer
/// - `string`: the text verbatim
/// - `trigger` / `channels`: [`LiteralError::Unsupported`]
pub fn parse_literal(ty: PlugType, text: &str) -> Result<Value, LiteralError> {
    let trimmed = text.trim();
    let malformed = || LiteralError::Malformed {
        ty,
        text: text.to_string(),
        fallback: ty.default_value(),
    };

    match ty {
        PlugType::Bool => Ok(Value::Bool(matches!(
            trimmed.to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ))),
        PlugType::Int => trimmed
            .parse::<i32>()
            .map(Value::Int)
            .map_err(|_| malformed()),
        PlugType::Float => parse_float(trimmed).map(Value::Float).ok_or_else(malformed),
        PlugType::FloatVec => parse_float(trimmed)
            .map(|v| Value::FloatVec(FloatBuffer::Scalar(v)))
            .ok_or_else(malformed),
        PlugType::String => Ok(Value::String(text.to_string())),
        PlugType::Trigger | PlugType::Channels => Err(LiteralError::Unsupported { ty }),
    }
}

fn parse_float(text: &str) -> Option<f32> {
    text.parse::<f32>().ok().filter(|v| v.is_finite())
}
