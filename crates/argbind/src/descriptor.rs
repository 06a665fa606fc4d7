//! Field introspection: how a configuration type describes its members.

use crate::options::FieldOptions;
use crate::value::{ArgValue, ValueError};

/// Default spellings that trigger the usage text.
pub const DEFAULT_HELP_ARGS: [&str; 2] = ["--help", "--h"];

/// A writable value slot behind a field descriptor.
pub trait Slot {
    /// Record one occurrence parsed from the front of `tokens`, returning the
    /// number of tokens consumed. Leaves the slot untouched on failure.
    fn store(&mut self, tokens: &[&str]) -> Result<usize, ValueError>;
}

struct TypedSlot<'a, T>(&'a mut T);

impl<T: ArgValue> Slot for TypedSlot<'_, T> {
    fn store(&mut self, tokens: &[&str]) -> Result<usize, ValueError> {
        T::store(self.0, tokens)
    }
}

/// A named data member and the slot its value is written to.
pub struct FieldRef<'a> {
    pub name: &'a str,
    pub slot: Box<dyn Slot + 'a>,
}

impl std::fmt::Debug for FieldRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldRef").field("name", &self.name).finish_non_exhaustive()
    }
}

/// One entry of a configuration type's ordered member list.
#[derive(Debug)]
pub enum Descriptor<'a> {
    /// A data member that receives a value.
    Field(FieldRef<'a>),
    /// Options attached to the data member named `target`.
    Options {
        target: &'a str,
        options: FieldOptions,
    },
}

impl<'a> Descriptor<'a> {
    pub fn field<T: ArgValue>(name: &'a str, value: &'a mut T) -> Self {
        Self::slot(name, TypedSlot(value))
    }

    pub fn slot(name: &'a str, slot: impl Slot + 'a) -> Self {
        Self::Field(FieldRef {
            name,
            slot: Box::new(slot),
        })
    }

    pub fn options(target: &'a str, options: FieldOptions) -> Self {
        Self::Options { target, options }
    }
}

/// Type-level parser settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgsConfig {
    /// Tokens that print the usage line and stop the parse.
    pub help_args: Vec<String>,
    /// Skip tokens no field claims instead of failing with
    /// [`UnknownArgError`](crate::UnknownArgError).
    pub extra_args_ok: bool,
}

impl Default for ArgsConfig {
    fn default() -> Self {
        Self {
            help_args: DEFAULT_HELP_ARGS.iter().map(|s| s.to_string()).collect(),
            extra_args_ok: true,
        }
    }
}

impl ArgsConfig {
    pub fn is_help(&self, token: &str) -> bool {
        self.help_args.iter().any(|h| h == token)
    }
}

/// A configuration record that argv can be resolved into.
///
/// Usually derived with `#[derive(Args)]`; a hand-written impl just lists its
/// members in declaration order:
///
/// ```
/// use argbind::{Args, Descriptor, FieldOptions};
///
/// #[derive(Default)]
/// struct Transfer {
///     src: String,
///     dst: String,
///     retries: u32,
/// }
///
/// impl Args for Transfer {
///     fn descriptors(&mut self) -> Vec<Descriptor<'_>> {
///         vec![
///             Descriptor::field("src", &mut self.src),
///             Descriptor::options("src", FieldOptions::positional()),
///             Descriptor::field("dst", &mut self.dst),
///             Descriptor::options("dst", FieldOptions::positional()),
///             Descriptor::field("retries", &mut self.retries),
///         ]
///     }
/// }
///
/// let copy: Transfer = argbind::parse_args(&["cp", "a", "b", "--retries", "3"]).unwrap();
/// assert_eq!((copy.src.as_str(), copy.dst.as_str(), copy.retries), ("a", "b", 3));
/// ```
pub trait Args {
    fn config(&self) -> ArgsConfig {
        ArgsConfig::default()
    }

    /// Members in declaration order. Positional slots are assigned in this
    /// order, and flags are tried in this order.
    fn descriptors(&mut self) -> Vec<Descriptor<'_>>;
}
