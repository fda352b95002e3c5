use clap::{Parser, ValueEnum};
use instance_group::parser::{parse_assignment, parse_literal};
use instance_group::{Arguments, GroupConfig, GroupError, Kwargs};
use serde_json::Value;
use tracing::Level;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    /// Check every handle supports the operation before invoking it.
    Execute,
    /// Let each handle resolve the operation itself; allows positional args.
    Call,
}

/// Run one operation on every handle of a group and print the results.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Group config JSON, or a path to it with --file.
    config: String,
    /// Operation to run on every handle.
    operation: String,
    /// Treat CONFIG as a file path.
    #[arg(long)]
    file: bool,
    /// Per-handle values, `name=[v0, v1, ...]`.
    #[arg(long = "apply", value_name = "NAME=JSON")]
    apply: Vec<String>,
    /// Common keyword argument for every handle, `name=json`.
    #[arg(long = "arg", value_name = "NAME=JSON")]
    args: Vec<String>,
    /// Positional argument (call mode only).
    #[arg(long = "pos", value_name = "JSON")]
    positional: Vec<String>,
    #[arg(long, value_enum, default_value = "execute")]
    mode: Mode,
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    // Parse CLI arguments.
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(out) => match serde_json::to_string_pretty(&out) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        },
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

fn run(args: &Args) -> Result<Vec<Value>, GroupError> {
    let text = if args.file {
        std::fs::read_to_string(&args.config)
            .map_err(|e| GroupError::Config(format!("{}: {e}", args.config)))?
    } else {
        args.config.clone()
    };
    let mut group = GroupConfig::from_json(&text)?.build()?;

    let apply = args
        .apply
        .iter()
        .map(|a| parse_assignment(a))
        .collect::<Result<Vec<_>, _>>()?;
    let common = args
        .args
        .iter()
        .map(|a| parse_assignment(a))
        .collect::<Result<Kwargs, _>>()?;

    let scope = group.apply(apply)?.scope();
    match args.mode {
        Mode::Execute => {
            if !args.positional.is_empty() {
                return Err(GroupError::Config("--pos needs --mode call".into()));
            }
            scope.execute(&args.operation, &common)
        }
        Mode::Call => {
            let positional = args
                .positional
                .iter()
                .map(|p| parse_literal(p))
                .collect::<Result<Vec<_>, _>>()?;
            let call = Arguments { positional, keywords: common };
            scope.call(&args.operation, &call)
        }
    }
}
