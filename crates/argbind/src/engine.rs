//! The argument resolution engine.
//!
//! Each iteration of the main loop is one resolution pass: the token under
//! the pointer is offered to every field in declaration order. A field that
//! accepts it advances the pointer; a pass that leaves the pointer where it
//! was either reports the highest-priority error it collected or treats the
//! token as unknown.

use std::io::{self, Write};

use crate::descriptor::{Args, ArgsConfig, Descriptor, FieldRef};
use crate::error::{Error, ParseError, ParseResult, SchemaError, UnknownArgError, UsageError};
use crate::help;
use crate::options::{FieldOptions, Registry};
use crate::value::ValueError;

/// Positional bookkeeping.
///
/// `total_decoded` lives for the whole parse; `slot_index` restarts at zero
/// on every pass and counts the positional fields visited so far.
#[derive(Debug, Default)]
struct Cursor {
    total_decoded: usize,
    slot_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Filled,
    Active,
    Waiting,
}

impl Cursor {
    fn begin_pass(&mut self) {
        self.slot_index = 0;
    }

    fn visit(&mut self) -> SlotState {
        let index = self.slot_index;
        self.slot_index += 1;
        if index < self.total_decoded {
            SlotState::Filled
        } else if index == self.total_decoded {
            SlotState::Active
        } else {
            // An earlier positional is still open; only one may be active.
            SlotState::Waiting
        }
    }

    fn fill(&mut self) {
        self.total_decoded += 1;
    }
}

/// Outcome of offering the current token to one field.
#[derive(Debug)]
enum Resolution {
    /// No error. The field may or may not have consumed tokens.
    Satisfied,
    Usage(UsageError),
    FlagParse(ParseError),
    PositionalParse(ParseError),
}

fn resolve_positional(
    field: &mut FieldRef<'_>,
    options: &FieldOptions,
    config: &ArgsConfig,
    cursor: &mut Cursor,
    tokens: &[&str],
    pos: &mut usize,
) -> Resolution {
    if cursor.visit() != SlotState::Active {
        return Resolution::Satisfied;
    }
    let name = options.display_name(field.name);
    let rest = &tokens[*pos..];
    if rest.is_empty() {
        return Resolution::Usage(UsageError::MissingPositional {
            name: name.to_string(),
        });
    }
    // Left for the next pass, which short-circuits on it.
    if config.is_help(rest[0]) {
        return Resolution::Satisfied;
    }
    match field.slot.store(rest) {
        Ok(consumed) => {
            *pos = (*pos + consumed.max(1)).min(tokens.len());
            cursor.fill();
            Resolution::Satisfied
        }
        Err(err) => Resolution::PositionalParse(ParseError::positional(name, err)),
    }
}

fn resolve_flag(
    field: &mut FieldRef<'_>,
    options: &FieldOptions,
    occurrences: &mut usize,
    tokens: &[&str],
    pos: &mut usize,
) -> Resolution {
    let Some(&token) = tokens.get(*pos) else {
        return Resolution::Satisfied;
    };
    let spelling = options.flag_spelling(field.name);
    let inline = token
        .strip_prefix(spelling.as_str())
        .and_then(|rest| rest.strip_prefix('='));
    if token != spelling && inline.is_none() {
        return Resolution::Satisfied;
    }

    if options.disallow_multiflag && *occurrences > 0 {
        return Resolution::FlagParse(ParseError::flag(spelling, ValueError::Repeated));
    }

    let after = &tokens[*pos + 1..];
    let stored = match inline {
        // `--flag=value`: the remainder is the first value token and lives
        // inside the flag token itself.
        Some(value) => {
            let mut values = Vec::with_capacity(after.len() + 1);
            values.push(value);
            values.extend_from_slice(after);
            field.slot.store(&values).map(|consumed| consumed.max(1))
        }
        None => field.slot.store(after).map(|consumed| consumed + 1),
    };
    match stored {
        Ok(advance) => {
            *pos = (*pos + advance).min(tokens.len());
            *occurrences += 1;
            Resolution::Satisfied
        }
        Err(err) => Resolution::FlagParse(ParseError::flag(spelling, err)),
    }
}

/// Offer the token under `pos` to one descriptor.
fn resolve_descriptor(
    descriptor: &mut Descriptor<'_>,
    registry: &Registry<'_>,
    config: &ArgsConfig,
    cursor: &mut Cursor,
    occurrences: &mut usize,
    tokens: &[&str],
    pos: &mut usize,
) -> Resolution {
    let Descriptor::Field(field) = descriptor else {
        return Resolution::Satisfied;
    };
    let options = registry.get(field.name);
    if options.positional {
        resolve_positional(field, options, config, cursor, tokens, pos)
    } else {
        resolve_flag(field, options, occurrences, tokens, pos)
    }
}

/// Pick the error a stalled pass reports: usage, then flag, then positional.
fn stalled_pass_error(results: Vec<Resolution>) -> Option<Error> {
    let mut flag_error: Option<ParseError> = None;
    let mut positional_error: Option<ParseError> = None;
    for result in results {
        match result {
            Resolution::Satisfied => {}
            Resolution::Usage(err) => return Some(err.into()),
            Resolution::FlagParse(err) => {
                if let Some(prev) = flag_error.replace(err) {
                    panic!("two fields claimed the same flag token ({})", prev.field);
                }
            }
            Resolution::PositionalParse(err) => {
                if let Some(prev) = positional_error.replace(err) {
                    panic!("two positional fields were active at once ({})", prev.field);
                }
            }
        }
    }
    flag_error.or(positional_error).map(Error::from)
}

fn missing_positional(descriptors: &[Descriptor<'_>], registry: &Registry<'_>, index: usize) -> UsageError {
    let name = descriptors
        .iter()
        .filter_map(|d| match d {
            Descriptor::Field(field) if registry.get(field.name).positional => {
                Some(registry.get(field.name).display_name(field.name))
            }
            _ => None,
        })
        .nth(index)
        .unwrap_or_default();
    UsageError::MissingPositional {
        name: name.to_string(),
    }
}

fn missing_required_flag(
    descriptors: &[Descriptor<'_>],
    registry: &Registry<'_>,
    occurrences: &[usize],
) -> Option<UsageError> {
    descriptors.iter().zip(occurrences).find_map(|(d, &seen)| {
        let Descriptor::Field(field) = d else {
            return None;
        };
        let options = registry.get(field.name);
        (options.required && !options.positional && seen == 0).then(|| UsageError::MissingFlag {
            flag: options.flag_spelling(field.name),
        })
    })
}

fn run(
    config: &ArgsConfig,
    descriptors: &mut [Descriptor<'_>],
    registry: &Registry<'_>,
    program: &str,
    tokens: &[&str],
    out: &mut dyn Write,
) -> Result<(), Error> {
    let mut cursor = Cursor::default();
    let mut occurrences = vec![0usize; descriptors.len()];
    let mut pos = 0usize;

    while pos < tokens.len() {
        let token = tokens[pos];
        if config.is_help(token) {
            let usage = help::usage_line(program, descriptors, registry);
            if let Err(err) = out.write_all(usage.as_bytes()).and_then(|()| out.flush()) {
                tracing::warn!("failed to write usage text: {err}");
            }
            tracing::debug!(token, "help requested");
            return Err(UsageError::HelpRequested { usage }.into());
        }

        cursor.begin_pass();
        let start = pos;
        let results: Vec<Resolution> = descriptors
            .iter_mut()
            .zip(occurrences.iter_mut())
            .map(|(d, seen)| {
                resolve_descriptor(d, registry, config, &mut cursor, seen, tokens, &mut pos)
            })
            .collect();

        if pos != start {
            tracing::debug!(consumed = pos - start, "resolved {}", tokens[start..pos].join(" "));
            continue;
        }

        if let Some(err) = stalled_pass_error(results) {
            tracing::debug!(token, "resolution aborted: {err}");
            return Err(err);
        }
        if !config.extra_args_ok {
            return Err(UnknownArgError {
                token: token.to_string(),
            }
            .into());
        }
        tracing::trace!(token, "skipping unrecognized argument");
        pos += 1;
    }

    if cursor.total_decoded < registry.positional_slots() {
        return Err(missing_positional(descriptors, registry, cursor.total_decoded).into());
    }
    if let Some(err) = missing_required_flag(descriptors, registry, &occurrences) {
        return Err(err.into());
    }
    Ok(())
}

fn split_argv<S: AsRef<str>>(argv: &[S]) -> (&str, Vec<&str>) {
    let program = argv.first().map(|s| s.as_ref()).unwrap_or_default();
    let tokens = argv.iter().skip(1).map(|s| s.as_ref()).collect();
    (program, tokens)
}

fn build_registry<'a>(descriptors: &[Descriptor<'a>]) -> Registry<'a> {
    Registry::build(descriptors).unwrap_or_else(|err| panic!("invalid argument schema: {err}"))
}

/// Resolve `argv` into a fresh `T::default()`.
///
/// `argv[0]` is the program name; it is only used for the usage line, which
/// is written to stdout when a help token is seen.
///
/// # Panics
///
/// Panics if `T`'s descriptors are inconsistent (see [`validate_schema`]).
pub fn parse_args<T, S>(argv: &[S]) -> ParseResult<T>
where
    T: Args + Default,
    S: AsRef<str>,
{
    parse_args_into(T::default(), argv, &mut io::stdout().lock())
}

/// Resolve `argv` into `value`, writing any usage text to `out`.
///
/// Fields no token touches keep whatever `value` held on entry.
///
/// # Panics
///
/// Panics if `T`'s descriptors are inconsistent (see [`validate_schema`]).
pub fn parse_args_into<T, S>(mut value: T, argv: &[S], out: &mut dyn Write) -> ParseResult<T>
where
    T: Args,
    S: AsRef<str>,
{
    let (program, tokens) = split_argv(argv);
    let config = value.config();
    let outcome = {
        let mut descriptors = value.descriptors();
        let registry = build_registry(&descriptors);
        run(&config, &mut descriptors, &registry, program, &tokens, out)
    };
    outcome.map(|()| value)
}

/// Resolve the current process's arguments.
pub fn from_env<T: Args + Default>() -> ParseResult<T> {
    let argv: Vec<String> = std::env::args().collect();
    parse_args(&argv)
}

/// The usage line the help short-circuit prints for `value`.
///
/// # Panics
///
/// Panics if `T`'s descriptors are inconsistent (see [`validate_schema`]).
pub fn render_usage<T: Args>(program: &str, value: &mut T) -> String {
    let descriptors = value.descriptors();
    let registry = build_registry(&descriptors);
    help::usage_line(program, &descriptors, &registry)
}

/// Check that `value`'s descriptors can be resolved at all.
pub fn validate_schema<T: Args>(value: &mut T) -> Result<(), SchemaError> {
    let descriptors = value.descriptors();
    Registry::build(&descriptors).map(|_| ())
}
