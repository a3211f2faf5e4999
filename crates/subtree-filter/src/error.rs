//! Error types for subtree-filter

use std::fmt;
use thiserror::Error;

/// Position in XML source text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pos {
    pub offset: usize,
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.offset, self.line, self.col)
    }
}

impl Pos {
    pub const fn new(offset: usize, line: u32, col: u32) -> Self {
        Self { offset, line, col }
    }
}

/// Span representing a range in source text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub const fn new(start: Pos, end: Pos) -> Self {
        Self { start, end }
    }

    /// Span for errors that do not originate from source text
    pub const fn empty() -> Self {
        Self {
            start: Pos::new(0, 0, 0),
            end: Pos::new(0, 0, 0),
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.start.line == 0 && self.end.line == 0
    }
}

/// Error kind for detailed categorization
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidToken,
    UnexpectedEof,
    MismatchedTag { expected: String, found: String },
    DuplicateAttribute { name: String },
    InvalidEntity { entity: String },
    UnboundPrefix { prefix: String },
    /// Declaration that Namespaces in XML forbids
    InvalidNamespaceDeclaration { prefix: String, uri: String },
    MaxDepthExceeded { max: u16 },
    MaxSizeExceeded { max: usize },
    /// Non-whitespace text where only filter elements are allowed
    UnexpectedText { element: String },
    /// Element carrying both child elements and text
    MixedContent { element: String },
    EmptyFilter,
    EmptyLocalName,
    /// Content match value that is blank after trimming
    EmptyContent,
    /// Namespace-qualified content that is not a usable `prefix:local` value
    InvalidQualifiedContent { value: String },
    /// Not exactly one child element (of this name, when given) in `parent`
    UnexpectedElementCount {
        parent: String,
        name: Option<String>,
        count: usize,
    },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidToken => write!(f, "invalid token"),
            Self::UnexpectedEof => write!(f, "unexpected end of input"),
            Self::MismatchedTag { expected, found } => {
                write!(f, "mismatched closing tag: expected </{expected}>, found </{found}>")
            }
            Self::DuplicateAttribute { name } => write!(f, "duplicate attribute: {name}"),
            Self::InvalidEntity { entity } => write!(f, "invalid entity: &{entity};"),
            Self::UnboundPrefix { prefix } => {
                write!(f, "namespace prefix '{prefix}' is not bound")
            }
            Self::InvalidNamespaceDeclaration { prefix, uri } if prefix.is_empty() => {
                write!(f, "default namespace cannot be bound to '{uri}'")
            }
            Self::InvalidNamespaceDeclaration { prefix, uri } => {
                write!(f, "prefix '{prefix}' cannot be bound to '{uri}'")
            }
            Self::MaxDepthExceeded { max } => write!(f, "max depth exceeded: {max}"),
            Self::MaxSizeExceeded { max } => write!(f, "max size exceeded: {max}"),
            Self::UnexpectedText { element } => {
                write!(f, "unexpected text content in <{element}>")
            }
            Self::MixedContent { element } => {
                write!(f, "<{element}> mixes text with child elements")
            }
            Self::EmptyFilter => write!(f, "subtree filter has no top-level nodes"),
            Self::EmptyLocalName => write!(f, "local name must not be empty"),
            Self::EmptyContent => write!(f, "content match value must not be blank"),
            Self::InvalidQualifiedContent { value } => {
                write!(f, "'{value}' is not a qualified name usable as content")
            }
            Self::UnexpectedElementCount {
                parent,
                name: Some(name),
                count,
            } => write!(f, "expected exactly one <{name}> in <{parent}>, found {count}"),
            Self::UnexpectedElementCount {
                parent,
                name: None,
                count,
            } => write!(
                f,
                "expected exactly one child element in <{parent}>, found {count}"
            ),
        }
    }
}

/// Main error type for subtree-filter
#[derive(Error, Clone, Debug, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    span: Span,
    message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, span: Span) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            span,
            message,
        }
    }

    pub fn with_message(kind: ErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    /// Error with no source position, as raised on already-parsed trees
    pub fn structural(kind: ErrorKind) -> Self {
        Self::new(kind, Span::empty())
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Create error at specific position
    pub fn at(kind: ErrorKind, pos: Pos) -> Self {
        Self::new(kind, Span::new(pos, pos))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.span.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "error at {}: {}", self.span.start, self.message)
        }
    }
}

/// Result type alias for subtree-filter
pub type Result<T> = std::result::Result<T, Error>;
