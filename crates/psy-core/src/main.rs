use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use psy_core::{EditRequest, EngineConfig, Record, RecordEditor};
use psy_model::{Clock, SystemClock};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Command::new("psydash")
        .version(psy_core::VERSION)
        .about("PsyDash record consistency and validation engine")
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Engine configuration (TOML)"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("check")
                .about("Load and sanitize a record, then print a summary")
                .arg(
                    Arg::new("record")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Record file (JSON)"),
                ),
        )
        .subcommand(
            Command::new("apply")
                .about("Replay edit requests against a record")
                .arg(
                    Arg::new("record")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Record file (JSON)"),
                )
                .arg(
                    Arg::new("edits")
                        .long("edits")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON array of edit requests"),
                )
                .arg(
                    Arg::new("out")
                        .long("out")
                        .value_parser(value_parser!(PathBuf))
                        .help("Write the resulting record here instead of stdout"),
                ),
        )
        .subcommand(Command::new("new").about("Print an empty record"));

    let matches = cli.get_matches();
    let config = load_config(matches.get_one::<PathBuf>("config"))?;
    init_tracing(&config, matches.get_flag("log-json"));

    match matches.subcommand() {
        Some(("check", args)) => check(args, &config),
        Some(("apply", args)) => apply(args, config),
        Some(("new", _)) => {
            let record = Record::new(config.palette.clone(), SystemClock.today());
            println!("{}", record.to_json_string(config.pretty_json)?);
            Ok(())
        }
        _ => Ok(()),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let source = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    EngineConfig::from_toml_str(&source).with_context(|| format!("parsing config {}", path.display()))
}

fn init_tracing(config: &EngineConfig, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_record(path: &Path, config: &EngineConfig) -> Result<Record> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("reading record {}", path.display()))?;
    Record::from_json_str(&source, config.palette.clone(), SystemClock.today())
        .with_context(|| format!("loading record {}", path.display()))
}

fn check(args: &ArgMatches, config: &EngineConfig) -> Result<()> {
    let path = args
        .get_one::<PathBuf>("record")
        .context("missing record path")?;
    let record = load_record(path, config)?;
    let columns = record.columns();

    println!("Record: {}", path.display());
    println!("  Client ID: {}", record.client.id);
    println!("  Measures: {}", columns.measures().join(", "));
    println!("  Practices: {}", columns.practices().join(", "));
    println!("  Sessions: {}", record.sessions.len());
    println!("  Empty: {}", record.is_default(SystemClock.today()));
    println!();
    println!("Columns:");
    for spec in record.column_specs() {
        match spec.header_tooltip {
            Some(tooltip) => println!("  {} ({tooltip})", spec.field),
            None => println!("  {}", spec.field),
        }
    }
    Ok(())
}

fn apply(args: &ArgMatches, config: EngineConfig) -> Result<()> {
    let path = args
        .get_one::<PathBuf>("record")
        .context("missing record path")?;
    let edits_path = args
        .get_one::<PathBuf>("edits")
        .context("missing edits path")?;

    let record = load_record(path, &config)?;
    let source = fs::read_to_string(edits_path)
        .with_context(|| format!("reading edits {}", edits_path.display()))?;
    let edits: Vec<EditRequest> = serde_json::from_str(&source)
        .with_context(|| format!("parsing edits {}", edits_path.display()))?;

    let pretty = config.pretty_json;
    let mut editor = RecordEditor::new(record, config);
    for (i, edit) in edits.into_iter().enumerate() {
        let kind = edit.label();
        let outcome = editor.apply(edit).outcome;
        match (outcome.is_error, outcome.message) {
            (true, Some(message)) => eprintln!("[{i}] {kind}: rejected: {message}"),
            (false, Some(message)) => eprintln!("[{i}] {kind}: ok: {message}"),
            (_, None) => eprintln!("[{i}] {kind}: ok"),
        }
    }

    let output = editor.record().to_json_string(pretty)?;
    match args.get_one::<PathBuf>("out") {
        Some(out) => {
            fs::write(out, output).with_context(|| format!("writing record {}", out.display()))?;
            tracing::info!(path = %out.display(), "record written");
        }
        None => println!("{output}"),
    }
    Ok(())
}
