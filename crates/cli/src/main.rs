mod schema_file;

use anyhow::{Context, Result};
use argbind::Error;
use argbind_schema::SchemaArgs;
use clap::{Parser, Subcommand};
use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};
use tracing_subscriber::{EnvFilter, fmt};

use crate::schema_file::{load_schema, write_starter_schema};

/// Exit status for usage, parse and unknown-argument outcomes.
const EXIT_USAGE: u8 = 2;

#[derive(Parser)]
#[command(name = "argbind")]
#[command(version, about = "Resolve command lines against a JSON argument schema", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve arguments against a schema and print the values as JSON
    Parse(ParseArgs),

    /// Print the usage line and field help for a schema
    Usage(UsageArgs),

    /// Write a starter argbind.json
    Init(InitArgs),
}

#[derive(Parser)]
struct ParseArgs {
    /// Path to the schema file
    #[arg(short, long, value_name = "FILE")]
    schema: PathBuf,

    /// Reject tokens no field claims, whatever the schema says
    #[arg(long)]
    strict: bool,

    /// Program name for the usage line (default: schema name)
    #[arg(long, value_name = "NAME")]
    program: Option<String>,

    /// Arguments to resolve
    #[arg(last = true, value_name = "ARGS")]
    args: Vec<String>,
}

#[derive(Parser)]
struct UsageArgs {
    /// Path to the schema file
    #[arg(short, long, value_name = "FILE")]
    schema: PathBuf,

    /// Program name for the usage line (default: schema name)
    #[arg(long, value_name = "NAME")]
    program: Option<String>,
}

#[derive(Parser)]
struct InitArgs {
    /// Directory to write into (default: current directory)
    #[arg(value_name = "DIR")]
    dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse(args) => parse(args),
        Commands::Usage(args) => usage(args).map(|()| ExitCode::SUCCESS),
        Commands::Init(args) => init(args).map(|()| ExitCode::SUCCESS),
    };
    result.unwrap_or_else(|err| {
        eprintln!("error: {err:#}");
        ExitCode::FAILURE
    })
}

fn parse(args: ParseArgs) -> Result<ExitCode> {
    tracing::debug!("executing parse command");

    let mut schema = load_schema(&args.schema)?;
    if args.strict {
        schema.extra_args_ok = Some(false);
    }
    let program = args.program.unwrap_or_else(|| schema.name.clone());
    let help_hint = schema.config().help_args.into_iter().next();
    let argv: Vec<&str> = std::iter::once(program.as_str())
        .chain(args.args.iter().map(String::as_str))
        .collect();

    let mut stdout = io::stdout().lock();
    match argbind::parse_args_into(SchemaArgs::new(schema), &argv, &mut stdout) {
        Ok(resolved) => {
            let json = serde_json::to_string_pretty(&resolved.values())
                .context("failed to serialize values")?;
            writeln!(stdout, "{json}").context("failed to write values")?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) if err.is_help() => Ok(ExitCode::SUCCESS),
        Err(err) => {
            report(&program, help_hint.as_deref(), &err);
            Ok(ExitCode::from(EXIT_USAGE))
        }
    }
}

fn report(program: &str, help_hint: Option<&str>, err: &Error) {
    eprintln!("{program}: {err}");
    if let (Error::Usage(_), Some(help)) = (err, help_hint) {
        eprintln!("Try '{program} {help}'.");
    }
}

fn usage(args: UsageArgs) -> Result<()> {
    let schema = load_schema(&args.schema)?;
    let program = args.program.unwrap_or_else(|| schema.name.clone());
    let field_help = schema.field_help();
    let line = argbind::render_usage(&program, &mut SchemaArgs::new(schema));
    print!("{line}");
    if !field_help.is_empty() {
        print!("\n{field_help}");
    }
    Ok(())
}

fn init(args: InitArgs) -> Result<()> {
    let dir = args.dir.unwrap_or_else(|| PathBuf::from("."));

    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create directory: {}", dir.display()))?;
    let path = write_starter_schema(&dir)?;

    eprintln!("Created: {}", path.display());
    eprintln!("\nNext steps:");
    eprintln!("  1. Edit {} to describe your command", path.display());
    eprintln!("  2. Run: argbind parse --schema {} -- <ARGS>", path.display());

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}
