//! Resolve a flat argv into a typed configuration record.
//!
//! A configuration type lists its members (name, value slot, options) through
//! [`Args`], usually via `#[derive(Args)]`. The engine walks the tokens once,
//! offering each one to every member: flags match by spelling (`--name` or a
//! rename), positionals are filled in declaration order. The result is the
//! populated record or exactly one of [`UsageError`], [`ParseError`] or
//! [`UnknownArgError`].
//!
//! ```
//! use argbind::{Args, Error};
//!
//! #[derive(Args, Debug, Default)]
//! struct Resize {
//!     #[arg(positional)]
//!     image: String,
//!     width: u32,
//!     #[arg(rename = "-q")]
//!     quality: Option<u8>,
//! }
//!
//! let r: Resize = argbind::parse_args(&["resize", "cat.png", "--width", "640", "-q=90"]).unwrap();
//! assert_eq!((r.image.as_str(), r.width, r.quality), ("cat.png", 640, Some(90)));
//!
//! let err = argbind::parse_args::<Resize, _>(&["resize", "cat.png", "--width", "wide"]).unwrap_err();
//! assert!(matches!(err, Error::Parse(_)));
//! ```

// Lets `#[derive(Args)]` expand to `::argbind::..` paths inside this crate too.
extern crate self as argbind;

pub mod descriptor;
pub mod engine;
pub mod error;
pub mod help;
pub mod options;
pub mod value;

pub use descriptor::{Args, ArgsConfig, DEFAULT_HELP_ARGS, Descriptor, FieldRef, Slot};
pub use engine::{from_env, parse_args, parse_args_into, render_usage, validate_schema};
pub use error::{
    Error, ParseError, ParseErrorKind, ParseResult, SchemaError, UnknownArgError, UsageError,
};
pub use options::{FieldOptions, Registry};
pub use value::{ArgValue, ValueError};

#[cfg(feature = "derive")]
pub use argbind_derive::Args;
