//! Outcome types returned by the resolution engine.

use std::fmt;

use crate::value::ValueError;

/// Result of a parse call: the populated record or exactly one error kind.
pub type ParseResult<T> = Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Usage(#[from] UsageError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    UnknownArg(#[from] UnknownArgError),
}

impl Error {
    /// Whether this outcome came from a help token rather than bad input.
    pub fn is_help(&self) -> bool {
        matches!(self, Self::Usage(UsageError::HelpRequested { .. }))
    }
}

/// Help was requested, or a required argument never showed up.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UsageError {
    #[error("{usage}")]
    HelpRequested { usage: String },
    #[error("missing required argument: <{name}>")]
    MissingPositional { name: String },
    #[error("missing required flag: {flag}")]
    MissingFlag { flag: String },
}

/// Which kind of field failed to accept its value.
///
/// Both kinds surface as [`ParseError`], but precedence inside a resolution
/// pass treats them differently (flag failures win).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    Flag,
    Positional,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag => f.write_str("flag"),
            Self::Positional => f.write_str("argument"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} '{field}': {source}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Flag spelling for flags, display name for positionals.
    pub field: String,
    pub source: ValueError,
}

impl ParseError {
    pub(crate) fn flag(field: impl Into<String>, source: ValueError) -> Self {
        Self {
            kind: ParseErrorKind::Flag,
            field: field.into(),
            source,
        }
    }

    pub(crate) fn positional(field: impl Into<String>, source: ValueError) -> Self {
        Self {
            kind: ParseErrorKind::Positional,
            field: field.into(),
            source,
        }
    }
}

/// A token no field claimed, under the strict extra-argument policy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown argument: {token}")]
pub struct UnknownArgError {
    pub token: String,
}

/// A configuration type whose descriptors contradict each other.
///
/// These are programming errors in the configuration type, never parse
/// outcomes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("options declared for '{target}', which is not a field")]
    UnknownTarget { target: String },
    #[error("options declared more than once for '{target}'")]
    DuplicateOptions { target: String },
    #[error("field '{name}' is declared more than once")]
    DuplicateField { name: String },
    #[error("flag {spelling} maps to both '{first}' and '{second}'")]
    DuplicateFlag {
        spelling: String,
        first: String,
        second: String,
    },
}
