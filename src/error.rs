//! The two error families described in the crate's design notes: usage
//! errors (programming mistakes the caller should fix) and data errors
//! (malformed input, reported with position or schema-path context).

use std::fmt;
use thiserror::Error;

use crate::value::Type;

/// A programming-mistake error: calling a typed accessor on the wrong
/// [`Value`](crate::value::Value) variant, indexing out of bounds, or
/// handing a malformed string to [`Pointer::parse`](crate::pointer::Pointer::parse).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    /// A typed accessor (`.str()`, `.num()`, ...) was called on a value of
    /// a different type.
    #[error("expected a {expected} value, found {found}")]
    WrongType { expected: Type, found: Type },

    /// A read-only array index was out of bounds.
    #[error("array index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    /// A JSON Pointer string did not conform to RFC 6901.
    #[error("invalid JSON pointer: {0}")]
    InvalidPointer(String),

    /// Resolving a JSON Pointer against a value found nothing at some
    /// prefix of the pointer.
    #[error("JSON pointer segment not found: {0}")]
    PointerNotFound(String),
}

/// The stable identifiers from the tokenizer/parser error taxonomy.
///
/// Every variant here corresponds to exactly one `tk*`/`err_*` code in the
/// scanner this crate is modeled on; keep the names stable, they are part
/// of the public contract callers match against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    InvalidString,
    UnterminatedString,
    InvalidEscapeCode,
    InvalidUtf8,
    InvalidNumber,
    NumberOutOfRange,
    InvalidToken,
    UnexpectedCharacter,
    Eob,
    Io,
    Internal,
    MisplacedRightCurlyBracket,
    MisplacedRightBracket,
    MisplacedSeparator,
    MisplacedColon,
    ExpectedSeparatorOrRightBracket,
    ExpectedSeparatorOrRightCurlyBracket,
    ExpectedObjMemberName,
    ExpectedColon,
    DuplicateObjMember,
    UnterminatedArray,
    UnterminatedObject,
    MaxDepthExceeded,
    MaxArraySizeExceeded,
    MaxObjSizeExceeded,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParseErrorKind::InvalidString => "invalid_string",
            ParseErrorKind::UnterminatedString => "unterminated_string",
            ParseErrorKind::InvalidEscapeCode => "invalid_escape_code",
            ParseErrorKind::InvalidUtf8 => "invalid_utf8",
            ParseErrorKind::InvalidNumber => "invalid_number",
            ParseErrorKind::NumberOutOfRange => "number_out_of_range",
            ParseErrorKind::InvalidToken => "invalid_token",
            ParseErrorKind::UnexpectedCharacter => "unexpected_character",
            ParseErrorKind::Eob => "eob",
            ParseErrorKind::Io => "io",
            ParseErrorKind::Internal => "internal",
            ParseErrorKind::MisplacedRightCurlyBracket => "misplaced_right_curly_bracket",
            ParseErrorKind::MisplacedRightBracket => "misplaced_right_bracket",
            ParseErrorKind::MisplacedSeparator => "misplaced_separator",
            ParseErrorKind::MisplacedColon => "misplaced_colon",
            ParseErrorKind::ExpectedSeparatorOrRightBracket => {
                "expected_separator_or_right_bracket"
            }
            ParseErrorKind::ExpectedSeparatorOrRightCurlyBracket => {
                "expected_separator_or_right_curly_bracket"
            }
            ParseErrorKind::ExpectedObjMemberName => "expected_obj_member_name",
            ParseErrorKind::ExpectedColon => "expected_colon",
            ParseErrorKind::DuplicateObjMember => "duplicate_obj_member",
            ParseErrorKind::UnterminatedArray => "unterminated_array",
            ParseErrorKind::UnterminatedObject => "unterminated_object",
            ParseErrorKind::MaxDepthExceeded => "max_depth_exceeded",
            ParseErrorKind::MaxArraySizeExceeded => "max_array_size_exceeded",
            ParseErrorKind::MaxObjSizeExceeded => "max_obj_size_exceeded",
        };
        f.write_str(s)
    }
}

/// One parse failure, positioned at a 1-based `(row, col)` in the source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{file}:{row}:{col}: {message} ({kind})", file = self.file.as_deref().unwrap_or("<buffer>"))]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub row: usize,
    pub col: usize,
    pub message: String,
    pub file: Option<String>,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, row: usize, col: usize, message: impl Into<String>) -> Self {
        ParseError {
            kind,
            row,
            col,
            message: message.into(),
            file: None,
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

/// Raised while loading a schema document: an `(base_uri, pointer,
/// message)` triple, fail-fast per keyword-shape violation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{base_uri}#{pointer}: {message}")]
pub struct SchemaError {
    pub base_uri: String,
    pub pointer: String,
    pub message: String,
}

impl SchemaError {
    pub fn new(base_uri: impl Into<String>, pointer: impl Into<String>, message: impl Into<String>) -> Self {
        SchemaError {
            base_uri: base_uri.into(),
            pointer: pointer.into(),
            message: message.into(),
        }
    }
}
