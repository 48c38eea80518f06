//! Command-line interface for cmake-parser
//!
//! Usage:
//!   cmake-parser parse `<dir>` [--binary-dir `<dir>`] [--format `<format>`] [--config `<file>`]
//!   cmake-parser tokens `<file>` [--all]
//!   cmake-parser list-formats

use clap::{Arg, ArgAction, ArgMatches, Command};
use cmake_parser::cmake::tokens::{catalog, SKIPPED};
use cmake_parser::cmake::CMakeParser;
use cmake_parser::config::{Loader, Settings};
use cmake_parser::formats::FormatRegistry;
use cmake_parser::lexing::{Reader, Tokenizer};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// Looked up in the working directory when no `--config` is given
const LOCAL_CONFIG: &str = "cmake-parser.toml";

fn main() {
    let matches = Command::new("cmake-parser")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Interpret CMake build scripts and inspect their tokens")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("Settings file layered over the built-in defaults"),
        )
        .subcommand(
            Command::new("parse")
                .about("Interpret a source tree and print the resulting model")
                .arg(
                    Arg::new("source-dir")
                        .help("Directory holding the top-level script")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("binary-dir")
                        .long("binary-dir")
                        .short('B')
                        .help("Build directory (default: <source-dir>/build)"),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format")
                        .default_value("text"),
                ),
        )
        .subcommand(
            Command::new("tokens")
                .about("Print the tokens of a script")
                .arg(
                    Arg::new("file")
                        .help("Script to tokenize")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("all")
                        .long("all")
                        .help("Include whitespace, newlines and comments")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("list-formats").about("List available output formats"))
        .get_matches();

    let settings = load_settings(matches.get_one::<String>("config"));
    init_logging(&settings.logging.filter);

    match matches.subcommand() {
        Some(("parse", sub)) => handle_parse_command(settings, sub),
        Some(("tokens", sub)) => handle_tokens_command(sub),
        Some(("list-formats", _)) => handle_list_formats_command(),
        _ => unreachable!("clap requires a subcommand"),
    }
}

fn load_settings(config: Option<&String>) -> Settings {
    let loader = match config {
        Some(path) => Loader::new().with_file(path),
        None => Loader::new().with_optional_file(LOCAL_CONFIG),
    };
    loader.build().unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        process::exit(1);
    })
}

fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Handle the parse command
fn handle_parse_command(settings: Settings, matches: &ArgMatches) {
    let source_dir = PathBuf::from(
        matches
            .get_one::<String>("source-dir")
            .expect("source-dir is required"),
    );
    let binary_dir = matches
        .get_one::<String>("binary-dir")
        .map(PathBuf::from)
        .unwrap_or_else(|| source_dir.join("build"));
    let format = matches
        .get_one::<String>("format")
        .expect("format has a default");

    let registry = FormatRegistry::with_defaults();
    if !registry.has(format) {
        eprintln!("Unknown format '{}'", format);
        eprintln!("Available formats: {}", registry.list_formats().join(", "));
        process::exit(1);
    }

    let outcome = CMakeParser::new(settings).parse(&source_dir, binary_dir);
    match registry.format(&outcome.model, format) {
        Ok(output) => print!("{}", output),
        Err(e) => {
            eprintln!("Error formatting model: {}", e);
            process::exit(1);
        }
    }

    for error in &outcome.errors {
        eprintln!("error: {}", error);
    }
    if !outcome.success {
        process::exit(1);
    }
}

/// Handle the tokens command
fn handle_tokens_command(matches: &ArgMatches) {
    let path = matches.get_one::<String>("file").expect("file is required");
    let show_all = matches.get_flag("all");

    let file = File::open(path).unwrap_or_else(|e| {
        eprintln!("Cannot open {}: {}", path, e);
        process::exit(1);
    });
    let mut tokenizer = Tokenizer::new(catalog(), Reader::new(path, Box::new(BufReader::new(file))));
    let catalog = tokenizer.catalog();

    let mut failed = false;
    for token in tokenizer.collect_all() {
        if token.is_null() {
            break;
        }
        failed |= token.is_invalid();
        if !show_all && SKIPPED.contains(&token.kind()) {
            continue;
        }
        println!(
            "{}\t{}\t{:?}",
            token.begin(),
            catalog.name_of(token.kind()),
            token.text()
        );
    }
    if failed {
        process::exit(1);
    }
}

/// Handle the list-formats command
fn handle_list_formats_command() {
    let registry = FormatRegistry::with_defaults();
    println!("Available output formats:\n");
    for name in registry.list_formats() {
        if let Ok(formatter) = registry.get(&name) {
            println!("  {}", name);
            println!("    {}", formatter.description());
            println!();
        }
    }
}
