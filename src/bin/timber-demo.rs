#![deny(unsafe_code)]

//! Plants trees described on the command line (or in `TIMBER_TREES`) and
//! logs one message through the global forest.

use std::process::ExitCode;

use clap::Parser;
use timber::{Arg, LogError, Severity};
use timber_sink::{ConfigError, ForestConfig, TreeSpec};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Log a message through timber trees.
///
/// Trees come from `--tree` options, then from the `TIMBER_TREES`
/// environment variable (comma-separated), and default to `stderr`.
#[derive(Parser, Debug)]
#[command(name = "timber-demo")]
#[command(version)]
struct Cli {
    /// Tree spec: stderr[:max], stdout[:max], file:<path>[:max],
    /// syslog[:facility[:ident]] or tracing. Repeatable.
    #[arg(long = "tree", value_name = "SPEC")]
    trees: Vec<TreeSpec>,

    /// Severity of the message (trace, debug, info, warn, error, fatal).
    #[arg(short, long, default_value = "info", conflicts_with = "priority")]
    severity: Severity,

    /// Raw backend priority instead of a severity.
    #[arg(short, long, allow_negative_numbers = true)]
    priority: Option<i32>,

    /// One-shot tag for the message; derived from the call site when omitted.
    #[arg(short, long)]
    tag: Option<String>,

    /// Number of times to log the message.
    #[arg(long, default_value_t = 1)]
    repeat: u32,

    /// Message template; printf-style placeholders are expanded when ARGS are given.
    message: String,

    /// Template arguments; integers and decimals are passed as numbers.
    args: Vec<String>,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn typed_arg(raw: &str) -> Arg<'_> {
    if let Ok(value) = raw.parse::<i64>() {
        Arg::Int(value)
    } else if let Ok(value) = raw.parse::<f64>() {
        Arg::Float(value)
    } else {
        Arg::Str(raw)
    }
}

fn forest_config(cli: &Cli) -> Result<ForestConfig, ConfigError> {
    if !cli.trees.is_empty() {
        return Ok(ForestConfig {
            trees: cli.trees.clone(),
        });
    }
    let config = ForestConfig::from_env()?;
    if config.is_empty() {
        return ForestConfig::from_tokens(["stderr"]);
    }
    Ok(config)
}

fn log_once(cli: &Cli, args: &[Arg<'_>]) -> Result<(), LogError> {
    if let Some(tag) = &cli.tag {
        timber::tag(tag);
    }
    match (cli.priority, cli.severity) {
        (Some(priority), _) => timber::log(priority, &cli.message, args),
        (None, Severity::Trace) => timber::trace(&cli.message, args),
        (None, Severity::Debug) => timber::debug(&cli.message, args),
        (None, Severity::Info) => timber::info(&cli.message, args),
        (None, Severity::Warn) => timber::warn(&cli.message, args),
        (None, Severity::Error) => timber::error(&cli.message, args),
        (None, Severity::Fatal) => timber::fatal(&cli.message, args),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let config = match forest_config(&cli) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("timber-demo: {error}");
            return ExitCode::from(2);
        }
    };
    match config.plant_into(timber::global()) {
        Ok(count) => tracing::debug!(trees = count, "planted trees"),
        Err(error) => {
            eprintln!("timber-demo: {error}");
            return ExitCode::from(2);
        }
    }

    let args: Vec<Arg<'_>> = cli.args.iter().map(|raw| typed_arg(raw)).collect();
    for _ in 0..cli.repeat {
        if let Err(error) = log_once(&cli, &args) {
            eprintln!("timber-demo: {error}");
            return ExitCode::FAILURE;
        }
    }

    timber::uproot_all();
    ExitCode::SUCCESS
}
