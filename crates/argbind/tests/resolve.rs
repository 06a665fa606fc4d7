use argbind::{
    Args, Error, FieldOptions, ParseError, ParseErrorKind, ParseResult, UnknownArgError,
    UsageError, ValueError,
};

fn run<T: Args + Default>(argv: &[&str]) -> (ParseResult<T>, String) {
    let mut out = Vec::new();
    let result = argbind::parse_args_into(T::default(), argv, &mut out);
    (result, String::from_utf8(out).unwrap())
}

fn parse_error<T: Args + Default + std::fmt::Debug>(argv: &[&str]) -> ParseError {
    match run::<T>(argv).0 {
        Err(Error::Parse(err)) => err,
        other => panic!("expected a parse error, got: {other:?}"),
    }
}

#[derive(Args, Debug, Default, PartialEq)]
struct OnePositional {
    #[arg(positional)]
    positional: i32,
}

#[derive(Args, Debug, Default, PartialEq)]
struct OneFlag {
    flag: i32,
}

#[test]
fn positional_is_filled() {
    let (result, _) = run::<OnePositional>(&["filename", "10"]);
    assert_eq!(result.unwrap(), OnePositional { positional: 10 });
}

#[test]
fn missing_positional_is_a_usage_error() {
    let (result, out) = run::<OnePositional>(&["filename"]);
    assert_eq!(
        result.unwrap_err(),
        Error::Usage(UsageError::MissingPositional {
            name: "positional".to_string()
        })
    );
    assert!(out.is_empty());
}

#[test]
fn bad_positional_is_a_positional_parse_error() {
    let err = parse_error::<OnePositional>(&["filename", "x"]);
    assert_eq!(err.kind, ParseErrorKind::Positional);
    assert_eq!(err.field, "positional");
    assert_eq!(err.to_string(), "argument 'positional': invalid value 'x': not an integer");
}

#[test]
fn flag_value_is_stored() {
    let (result, _) = run::<OneFlag>(&["filename", "--flag", "10"]);
    assert_eq!(result.unwrap(), OneFlag { flag: 10 });
}

#[test]
fn absent_flag_keeps_its_default() {
    let (result, _) = run::<OneFlag>(&["filename"]);
    assert_eq!(result.unwrap(), OneFlag { flag: 0 });
}

#[test]
fn flag_without_value_is_a_flag_parse_error() {
    let err = parse_error::<OneFlag>(&["filename", "--flag"]);
    assert_eq!(err.kind, ParseErrorKind::Flag);
    assert_eq!(err.source, ValueError::Missing);
}

#[test]
fn flag_with_bad_value_is_a_flag_parse_error() {
    let err = parse_error::<OneFlag>(&["filename", "--flag", "not an int"]);
    assert_eq!(err.kind, ParseErrorKind::Flag);
    assert_eq!(err.field, "--flag");
}

#[derive(Args, Debug, Default, PartialEq)]
#[args(extra_args_ok = false)]
struct Renamed {
    #[arg(rename = "--new-flag")]
    flag: i32,
}

#[test]
fn renamed_flag_only_answers_to_the_new_spelling() {
    let (result, _) = run::<Renamed>(&["filename", "--new-flag", "10"]);
    assert_eq!(result.unwrap(), Renamed { flag: 10 });

    let (result, _) = run::<Renamed>(&["filename", "--flag", "10"]);
    assert_eq!(
        result.unwrap_err(),
        Error::UnknownArg(UnknownArgError {
            token: "--flag".to_string()
        })
    );
}

#[test]
fn help_prints_the_usage_line() {
    let (result, out) = run::<OnePositional>(&["filename", "--help"]);
    assert!(result.unwrap_err().is_help());
    assert_eq!(out, "Usage: filename <positional>\n");
}

#[derive(Args, Debug, Default, PartialEq)]
struct Mixed {
    level: u8,
    #[arg(positional)]
    first: i32,
    #[arg(positional)]
    second: i32,
}

#[test]
fn help_stops_resolution_where_it_is_seen() {
    let mut out = Vec::new();
    let result = argbind::parse_args_into(Mixed::default(), &["p", "--level", "2", "--h", "5"], &mut out);
    match result {
        Err(Error::Usage(UsageError::HelpRequested { usage })) => {
            assert_eq!(usage, "Usage: p <first> <second>\n");
        }
        other => panic!("expected help, got: {other:?}"),
    }
}

#[derive(Args, Debug, Default)]
struct CopyPaths {
    #[arg(positional)]
    src: String,
    #[arg(positional)]
    dst: String,
}

#[test]
fn help_is_not_consumed_as_a_positional_value() {
    let (result, out) = run::<CopyPaths>(&["cp", "a", "--help"]);
    assert!(result.unwrap_err().is_help());
    assert_eq!(out, "Usage: cp <src> <dst>\n");
}

#[test]
fn help_wins_over_a_later_bad_token() {
    let (result, _) = run::<OneFlag>(&["filename", "--help", "--flag", "nope"]);
    assert!(result.unwrap_err().is_help());
}

#[test]
fn positionals_fill_in_declaration_order() {
    let (result, _) = run::<Mixed>(&["p", "1", "2"]);
    assert_eq!(
        result.unwrap(),
        Mixed {
            level: 0,
            first: 1,
            second: 2
        }
    );
}

#[test]
fn flags_may_sit_between_positionals() {
    let (result, _) = run::<Mixed>(&["p", "1", "--level", "4", "2"]);
    assert_eq!(
        result.unwrap(),
        Mixed {
            level: 4,
            first: 1,
            second: 2
        }
    );
}

#[test]
fn repeated_parses_agree() {
    let argv = ["p", "7", "--level", "1", "8"];
    let (first, _) = run::<Mixed>(&argv);
    let (second, _) = run::<Mixed>(&argv);
    assert_eq!(first, second);
    assert_eq!(argv, ["p", "7", "--level", "1", "8"]);
}

#[derive(Args, Debug, Default, PartialEq)]
#[args(extra_args_ok = false)]
struct Strict {
    flag: i32,
}

#[test]
fn strict_mode_rejects_unrecognized_tokens() {
    let (result, _) = run::<Strict>(&["p", "--flag", "1", "extra"]);
    assert_eq!(
        result.unwrap_err(),
        Error::UnknownArg(UnknownArgError {
            token: "extra".to_string()
        })
    );
}

#[test]
fn permissive_mode_skips_unrecognized_tokens() {
    let (result, _) = run::<OneFlag>(&["p", "extra", "--flag", "1", "--other"]);
    assert_eq!(result.unwrap(), OneFlag { flag: 1 });
}

#[derive(Args, Debug, Default, PartialEq)]
struct Collect {
    #[arg(rename = "-I")]
    include: Vec<String>,
    #[arg(disallow_multiflag)]
    once: Option<u32>,
    last: i32,
}

#[test]
fn collections_accumulate_across_occurrences() {
    let (result, _) = run::<Collect>(&["cc", "-I", "a", "--last", "1", "-I=b", "--last", "2"]);
    let c = result.unwrap();
    assert_eq!(c.include, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(c.last, 2);
}

#[test]
fn single_assignment_flags_reject_a_second_occurrence() {
    let (result, _) = run::<Collect>(&["cc", "--once", "1"]);
    assert_eq!(result.unwrap().once, Some(1));

    let err = parse_error::<Collect>(&["cc", "--once", "1", "--once", "2"]);
    assert_eq!(err.kind, ParseErrorKind::Flag);
    assert_eq!(err.source, ValueError::Repeated);
}

#[test]
fn inline_values_split_on_the_first_equals() {
    #[derive(Args, Debug, Default)]
    struct Define {
        define: String,
    }
    let (result, _) = run::<Define>(&["p", "--define=key=value"]);
    assert_eq!(result.unwrap().define, "key=value");

    // A longer flag sharing the prefix is not an inline value.
    let (result, _) = run::<Define>(&["p", "--defined", "x"]);
    assert_eq!(result.unwrap().define, "");
}

#[derive(Args, Debug, Default)]
struct NeedsFlag {
    #[arg(positional)]
    input: String,
    #[arg(required, rename = "-o")]
    output: String,
}

#[test]
fn required_flags_are_checked_after_positionals() {
    let (result, _) = run::<NeedsFlag>(&["p"]);
    assert_eq!(
        result.unwrap_err(),
        Error::Usage(UsageError::MissingPositional {
            name: "input".to_string()
        })
    );

    let (result, _) = run::<NeedsFlag>(&["p", "in.txt"]);
    assert_eq!(
        result.unwrap_err(),
        Error::Usage(UsageError::MissingFlag {
            flag: "-o".to_string()
        })
    );

    let (result, _) = run::<NeedsFlag>(&["p", "in.txt", "-o", "out.txt"]);
    assert_eq!(result.unwrap().output, "out.txt");
}

#[derive(Args, Debug, Default)]
#[args(help = ["-?"], options_prefix = "opt_")]
struct Members {
    source: String,
    count: u16,
    #[arg(skip)]
    cache: Vec<u8>,
    opt_source: FieldOptions,
}

#[test]
fn options_members_configure_their_field() {
    let value = Members {
        opt_source: FieldOptions::positional().rename("SRC"),
        ..Members::default()
    };
    let mut out = Vec::new();
    let result = argbind::parse_args_into(value, &["m", "-?"], &mut out);
    assert!(result.unwrap_err().is_help());
    assert_eq!(String::from_utf8(out).unwrap(), "Usage: m <SRC>\n");

    let value = Members {
        opt_source: FieldOptions::positional(),
        ..Members::default()
    };
    let parsed = argbind::parse_args_into(value, &["m", "a.txt", "--count", "0x10"], &mut std::io::sink()).unwrap();
    assert_eq!(parsed.source, "a.txt");
    assert_eq!(parsed.count, 16);
}

#[test]
fn skipped_members_are_invisible() {
    let (result, _) = run::<Members>(&["m", "--cache", "1"]);
    assert!(result.unwrap().cache.is_empty());
}

#[test]
fn custom_help_spellings_replace_the_defaults() {
    let (result, out) = run::<Members>(&["m", "--help"]);
    assert!(result.is_ok());
    assert!(out.is_empty());
}

#[test]
fn derived_usage_matches_render_usage() {
    let mut value = Mixed::default();
    assert_eq!(argbind::render_usage("tool", &mut value), "Usage: tool <first> <second>\n");
    assert!(argbind::validate_schema(&mut value).is_ok());
}

#[test]
fn preset_values_survive_when_untouched() {
    let value = Mixed {
        level: 9,
        ..Mixed::default()
    };
    let parsed = argbind::parse_args_into(value, &["p", "1", "2"], &mut std::io::sink()).unwrap();
    assert_eq!(parsed.level, 9);
}
