//! CLI entry point for waldo

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;
use std::rc::Rc;

use clap::{Parser, Subcommand, ValueEnum};
use regex::Regex;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use waldo::crawl::Composites;
use waldo::heap::format_number;
use waldo::output::preview;
use waldo::{
    ConsoleLogger, CrawlOptions, EnumerationMode, Environment, Finder, FinderConfig, Heap, Logger,
    NullLogger, ObjectId, Value, print_json,
};

/// Color output mode
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ColorMode {
    /// Auto-detect based on terminal and environment
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Determine whether to use color output based on mode and environment.
fn should_use_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            // Respect NO_COLOR environment variable (https://no-color.org/)
            if std::env::var_os("NO_COLOR").is_some() {
                return false;
            }
            if std::env::var_os("FORCE_COLOR").is_some() {
                return true;
            }
            if std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false) {
                return false;
            }
            std::io::stdout().is_terminal()
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "waldo")]
#[command(about = "Find properties anywhere in a JSON object graph")]
#[command(version)]
struct Args {
    /// JSON graph to search ({"$ref": "a.b"} links back into the graph)
    file: PathBuf,

    #[command(subcommand)]
    search: Search,

    /// Crawl the object at this dotted path instead of the whole graph
    #[arg(long = "at", value_name = "PATH", global = true)]
    at: Option<String>,

    /// Display name for the object given with --at
    #[arg(long = "path", value_name = "NAME", global = true)]
    path: Option<String>,

    /// Display name of the graph root
    #[arg(long = "root-name", value_name = "NAME", default_value = "global", global = true)]
    root_name: String,

    /// Only visit enumerable properties
    #[arg(long = "enumerable-only", global = true)]
    enumerable_only: bool,

    /// Descend into arrays, functions and host objects, not just plain objects
    #[arg(long = "all-composites", global = true)]
    all_composites: bool,

    /// Print matches as JSON
    #[arg(long = "json", global = true)]
    json: bool,

    /// Control color output: auto, always, never
    #[arg(long = "color", value_name = "WHEN", default_value = "auto", global = true)]
    color: ColorMode,

    /// Log crawl diagnostics to stderr
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Search {
    /// Find values by kind, class or typeof ("*" matches everything)
    Kind {
        #[arg(required_unless_present = "ctor")]
        kind: Option<String>,

        /// Find instances of the function at this path instead
        #[arg(long = "ctor", value_name = "PATH", conflicts_with = "kind")]
        ctor: Option<String>,
    },
    /// Find properties with this exact name
    Name { name: String },
    /// Find properties holding this value (JSON literal, NaN, Infinity, undefined)
    Value {
        #[arg(required_unless_present = "reference", allow_hyphen_values = true)]
        literal: Option<String>,

        /// Find references to the object at this path instead
        #[arg(long = "ref", value_name = "PATH", conflicts_with = "literal")]
        reference: Option<String>,
    },
    /// Find properties whose key and/or value match regular expressions
    Custom {
        /// Pattern the property key must match
        #[arg(long = "key", value_name = "REGEX")]
        key: Option<String>,

        /// Pattern the rendered value must match
        #[arg(long = "value", value_name = "REGEX")]
        value: Option<String>,
    },
}

/// Send crawl diagnostics to stderr. `RUST_LOG` directives still apply.
fn init_tracing(use_color: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(LevelFilter::DEBUG.into()))
        .with_writer(std::io::stderr)
        .with_ansi(use_color)
        .with_target(false)
        .init();
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("waldo: {}", message);
    process::exit(1);
}

/// Resolve a dotted path from the graph root.
fn lookup(heap: &Heap, root: ObjectId, path: &str) -> Value {
    heap.resolve_path(root, path)
        .unwrap_or_else(|| fail(format!("nothing at path '{}'", path)))
}

/// Parse a command-line literal. Input that is not JSON is taken as a string.
fn parse_literal(text: &str) -> Value {
    match text {
        "undefined" => return Value::Undefined,
        "NaN" => return Value::Number(f64::NAN),
        "Infinity" => return Value::Number(f64::INFINITY),
        "-Infinity" => return Value::Number(f64::NEG_INFINITY),
        _ => {}
    }
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(serde_json::Value::Null) => Value::Null,
        Ok(serde_json::Value::Bool(b)) => Value::Bool(b),
        Ok(serde_json::Value::Number(n)) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        Ok(serde_json::Value::String(s)) => Value::String(s),
        Ok(_) => fail("object and array literals never match; use --ref PATH"),
        Err(_) => Value::String(text.to_string()),
    }
}

fn compile(flag: &str, pattern: Option<&str>) -> Option<Regex> {
    pattern.map(|p| {
        Regex::new(p).unwrap_or_else(|e| fail(format!("invalid --{} pattern '{}': {}", flag, p, e)))
    })
}

fn main() {
    let args = Args::parse();

    let use_color = should_use_color(args.color);
    if args.verbose {
        init_tracing(use_color);
    }

    let mut heap = Heap::new();
    let root = waldo::load::load_file(&mut heap, &args.file)
        .unwrap_or_else(|e| fail(format!("{}: {}", args.file.display(), e)));
    debug!(objects = heap.len(), file = %args.file.display(), "graph loaded");

    let options = match &args.at {
        Some(at) => match lookup(&heap, root, at) {
            Value::Object(id) => CrawlOptions {
                object: Some(id),
                path: args.path.clone(),
            },
            _ => fail(format!("'{}' is not an object", at)),
        },
        None => CrawlOptions::default(),
    };

    let config = FinderConfig {
        debug: true,
        mode: if args.enumerable_only {
            EnumerationMode::EnumerableOnly
        } else {
            EnumerationMode::AllOwn
        },
        composites: if args.all_composites {
            Composites::All
        } else {
            Composites::Plain
        },
    };

    // JSON mode prints everything at the end, errors still go to stderr
    let logger: Rc<dyn Logger> = if args.json {
        Rc::new(JsonModeLogger)
    } else {
        Rc::new(ConsoleLogger::new(use_color))
    };

    let finder = Finder::new(&heap, Environment::new(root, args.root_name.as_str()))
        .with_config(config)
        .with_logger(logger);

    let result = match &args.search {
        Search::Kind { kind, ctor } => match (kind, ctor) {
            (_, Some(path)) => finder.by_kind(lookup(&heap, root, path), &options),
            (Some(kind), None) => finder.by_kind(kind.as_str(), &options),
            (None, None) => fail("kind or --ctor is required"),
        },
        Search::Name { name } => finder.by_name(name.as_str(), &options),
        Search::Value { literal, reference } => {
            let value = match (literal, reference) {
                (_, Some(path)) => lookup(&heap, root, path),
                (Some(text), None) => parse_literal(text),
                (None, None) => fail("a value or --ref is required"),
            };
            finder.by_value(value, &options)
        }
        Search::Custom { key, value } => {
            let key_re = compile("key", key.as_deref());
            let value_re = compile("value", value.as_deref());
            if key_re.is_none() && value_re.is_none() {
                // no predicate given: let the finder reject it
                finder.custom(Value::Undefined, &options)
            } else {
                finder.custom_fn(
                    move |cx| {
                        let key_ok = key_re.as_ref().is_none_or(|re| re.is_match(cx.key));
                        let value_ok = value_re.as_ref().is_none_or(|re| {
                            let text = match cx.value {
                                Value::String(s) => s.clone(),
                                Value::Number(n) => format_number(*n),
                                other => preview(cx.heap, other),
                            };
                            re.is_match(&text)
                        });
                        Ok(key_ok && value_ok)
                    },
                    &options,
                )
            }
        }
    };

    let matches = match result {
        Ok(Some(matches)) => matches,
        Ok(None) => Vec::new(),
        Err(_) => process::exit(2),
    };

    let written = if args.json {
        print_json(&heap, &matches)
    } else {
        print_summary(matches.len())
    };
    if let Err(e) = written {
        fail(format!("error writing output: {}", e));
    }
}

fn print_summary(count: usize) -> std::io::Result<()> {
    use std::io::Write;
    let mut out = std::io::stdout().lock();
    writeln!(out)?;
    writeln!(out, "{} {}", count, if count == 1 { "match" } else { "matches" })
}

/// Drops match lines, keeps errors on stderr.
struct JsonModeLogger;

impl Logger for JsonModeLogger {
    fn log(&self, severity: waldo::Severity, message: &str, detail: Option<&str>) {
        if severity == waldo::Severity::Error {
            ConsoleLogger::new(false).log(severity, message, detail);
        } else {
            NullLogger.log(severity, message, detail);
        }
    }
}
