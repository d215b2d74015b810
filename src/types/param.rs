//! Parameter binding types.

use bytes::Bytes;
use std::fmt;
use std::io::Read;

/// Declared type of a bound parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParameterType {
    /// SQL NULL.
    Null,
    /// Integer, bound with an explicit numeric marker.
    Integer,
    /// Character data (the default).
    #[default]
    String,
    /// Large object, staged through a temporary file.
    LargeObject,
    /// Boolean, bound as text like every other scalar.
    Boolean,
    /// Binary string, bound as text.
    Binary,
}

/// Parameter position (1-based) or name.
///
/// Positions order before names; within each kind the natural order applies,
/// which is the order recorded bindings are sent in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParamSlot {
    /// 1-based marker position.
    Position(usize),
    /// Named marker, without the leading colon.
    Name(String),
}

impl From<usize> for ParamSlot {
    fn from(position: usize) -> Self {
        ParamSlot::Position(position)
    }
}

impl From<&str> for ParamSlot {
    fn from(name: &str) -> Self {
        ParamSlot::Name(name.trim_start_matches(':').to_string())
    }
}

impl From<String> for ParamSlot {
    fn from(name: String) -> Self {
        ParamSlot::from(name.as_str())
    }
}

impl fmt::Display for ParamSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamSlot::Position(p) => write!(f, "{}", p),
            ParamSlot::Name(n) => write!(f, ":{}", n),
        }
    }
}

/// Source of a large object parameter.
///
/// Text and byte buffers are written to the staging file in one call;
/// streams are copied until exhausted.
pub enum LobSource {
    /// Character data.
    Text(String),
    /// Binary data already in memory.
    Bytes(Bytes),
    /// A byte stream read at execute time.
    Stream(Box<dyn Read>),
}

impl LobSource {
    /// Wrap any reader as a LOB stream.
    pub fn stream(reader: impl Read + 'static) -> Self {
        LobSource::Stream(Box::new(reader))
    }

    /// Whether the source is a stream (copied rather than written).
    pub fn is_stream(&self) -> bool {
        matches!(self, LobSource::Stream(_))
    }
}

impl fmt::Debug for LobSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LobSource::Text(s) => write!(f, "Text({} bytes)", s.len()),
            LobSource::Bytes(b) => write!(f, "Bytes({} bytes)", b.len()),
            LobSource::Stream(_) => write!(f, "Stream"),
        }
    }
}

impl From<String> for LobSource {
    fn from(s: String) -> Self {
        LobSource::Text(s)
    }
}

impl From<&str> for LobSource {
    fn from(s: &str) -> Self {
        LobSource::Text(s.to_string())
    }
}

impl From<Vec<u8>> for LobSource {
    fn from(b: Vec<u8>) -> Self {
        LobSource::Bytes(Bytes::from(b))
    }
}

impl From<Bytes> for LobSource {
    fn from(b: Bytes) -> Self {
        LobSource::Bytes(b)
    }
}
