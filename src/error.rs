//! Error types

use crate::binary::read::ReadEof;
use std::fmt;

/// Errors that originate when parsing binary data
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum ParseError {
    BadEof,
    BadValue,
    BadVersion,
    BadOffset,
    BadIndex,
    LimitExceeded,
    MissingValue,
    Unsupported(Unsupported),
}

/// CFF features that are recognised but not decoded.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Unsupported {
    /// One of the predefined ISOAdobe, Expert or ExpertSubset charsets.
    PredefinedCharset,
    /// A charset format other than 1 or 2.
    CharsetFormat(u8),
    /// An Encoding given as an offset to a custom encoding subtable.
    CustomEncoding,
    /// A `CharstringType` other than 1 or 2.
    CharstringType(i32),
    /// A synthetic font (Top DICT begins with `SyntheticBase`).
    SyntheticFont,
    /// A CID-keyed font (Top DICT begins with `ROS`).
    CidFont,
}

/// Broad classification of a `ParseError`.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ErrorKind {
    /// The data is in a version of the format that is not understood.
    Format,
    /// The data is malformed.
    CorruptData,
    /// The data is well formed but uses a feature that is not implemented.
    Unsupported,
    /// A DICT value was requested that is neither present nor has a default.
    MissingDefault,
}

impl ParseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::BadVersion => ErrorKind::Format,
            ParseError::BadEof
            | ParseError::BadValue
            | ParseError::BadOffset
            | ParseError::BadIndex
            | ParseError::LimitExceeded => ErrorKind::CorruptData,
            ParseError::MissingValue => ErrorKind::MissingDefault,
            ParseError::Unsupported(_) => ErrorKind::Unsupported,
        }
    }
}

impl From<ReadEof> for ParseError {
    fn from(_error: ReadEof) -> Self {
        ParseError::BadEof
    }
}

impl From<std::num::TryFromIntError> for ParseError {
    fn from(_error: std::num::TryFromIntError) -> Self {
        ParseError::BadValue
    }
}

impl From<Unsupported> for ParseError {
    fn from(feature: Unsupported) -> Self {
        ParseError::Unsupported(feature)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::BadEof => write!(f, "end of data reached unexpectedly"),
            ParseError::BadValue => write!(f, "invalid value"),
            ParseError::BadVersion => write!(f, "unexpected data version"),
            ParseError::BadOffset => write!(f, "invalid data offset"),
            ParseError::BadIndex => write!(f, "invalid data index"),
            ParseError::LimitExceeded => write!(f, "limit exceeded"),
            ParseError::MissingValue => write!(f, "an expected data value was missing"),
            ParseError::Unsupported(feature) => write!(f, "unsupported feature: {}", feature),
        }
    }
}

impl fmt::Display for Unsupported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unsupported::PredefinedCharset => write!(f, "predefined charset"),
            Unsupported::CharsetFormat(format) => write!(f, "charset format {}", format),
            Unsupported::CustomEncoding => write!(f, "custom encoding"),
            Unsupported::CharstringType(ty) => write!(f, "charstring type {}", ty),
            Unsupported::SyntheticFont => write!(f, "synthetic font"),
            Unsupported::CidFont => write!(f, "CID-keyed font"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Errors that originate when writing binary data
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum WriteError {
    BadValue,
    NotImplemented,
    PlaceholderMismatch,
    /// A font in the set failed to decode and so cannot be written.
    FailedFont(ParseError),
}

impl From<std::num::TryFromIntError> for WriteError {
    fn from(_error: std::num::TryFromIntError) -> Self {
        WriteError::BadValue
    }
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteError::BadValue => write!(f, "write: bad value"),
            WriteError::NotImplemented => write!(f, "writing in this format is not implemented"),
            WriteError::PlaceholderMismatch => {
                write!(f, "data written to placeholder did not match expected size")
            }
            WriteError::FailedFont(err) => write!(f, "font failed to decode: {}", err),
        }
    }
}

impl std::error::Error for WriteError {}
