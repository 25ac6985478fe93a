//! objtools - Structural object toolkit CLI
//!
//! A command line tool for querying, merging, diffing and syncing YAML/JSON
//! documents.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use objtools::fieldpath::{
    collapse_to_dotted_with, delete_path, get_path, set_path, CollapseOptions, Path,
};
use objtools::{
    diff_objects, from_file, from_yaml, match_dotted_object, match_object, merge, sync_object,
    SyncOptions, Value,
};

/// objtools - Structural operations on YAML/JSON documents
#[derive(Parser)]
#[command(name = "objtools", version)]
#[command(about = "Query, merge, diff and sync YAML/JSON documents")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Output location. Use '-' for stdout
    #[arg(short, long, global = true, default_value = "-")]
    output: String,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = Format::Json)]
    format: Format,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

#[derive(Subcommand)]
enum Command {
    /// Print the value at a dotted path
    Get {
        file: PathBuf,
        /// Dotted path; the whole document when omitted
        path: Option<String>,
        /// Step through single-element lists on non-numeric segments
        #[arg(long)]
        skip_arrays: bool,
    },
    /// Set the value at a dotted path, creating parents as needed
    Set {
        file: PathBuf,
        path: String,
        /// New value, parsed as YAML
        value: String,
    },
    /// Delete the value at a dotted path
    Delete { file: PathBuf, path: String },
    /// Flatten a document into dotted form
    Collapse {
        file: PathBuf,
        /// Also emit every intermediate level
        #[arg(long)]
        redundant: bool,
        /// Keep lists as leaf values
        #[arg(long)]
        stop_at_arrays: bool,
    },
    /// Check whether a document matches a query; exits non-zero otherwise
    Match {
        file: PathBuf,
        query: PathBuf,
        /// Compare dotted forms as given, without collapsing
        #[arg(long)]
        dotted: bool,
    },
    /// Deep merge sources into a destination, left to right
    Merge {
        destination: PathBuf,
        #[arg(required = true)]
        sources: Vec<PathBuf>,
    },
    /// Show the fields that differ across documents
    Diff {
        #[arg(num_args = 2.., required = true)]
        files: Vec<PathBuf>,
        /// Print only the dotted paths of differing fields
        #[arg(long)]
        dotted: bool,
    },
    /// Make a destination equal to a source, touching only what changed
    Sync {
        destination: PathBuf,
        source: PathBuf,
        /// Only sync fields under these dotted prefixes
        #[arg(long)]
        only: Vec<String>,
        /// Never touch fields under these dotted prefixes
        #[arg(long)]
        skip: Vec<String>,
        /// Print the changed paths instead of the result
        #[arg(long)]
        changes: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs to stderr, filtered by `RUST_LOG`.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut output: Box<dyn Write> = if cli.output == "-" {
        Box::new(io::stdout())
    } else {
        Box::new(
            fs::File::create(&cli.output)
                .map_err(|e| format!("Failed to create output file {:?}: {}", cli.output, e))?,
        )
    };
    let format = cli.format;

    match cli.command {
        Command::Get {
            file,
            path,
            skip_arrays,
        } => {
            let doc = from_file(&file)?;
            let value = get_path(&doc, path.as_deref(), skip_arrays)
                .ok_or_else(|| format!("No value at {:?}", path.unwrap_or_default()))?;
            emit(&mut output, value, format)?;
        }
        Command::Set { file, path, value } => {
            let mut doc = from_file(&file)?;
            set_path(&mut doc, &path, from_yaml(&value)?);
            emit(&mut output, &doc, format)?;
        }
        Command::Delete { file, path } => {
            let mut doc = from_file(&file)?;
            delete_path(&mut doc, &path);
            emit(&mut output, &doc, format)?;
        }
        Command::Collapse {
            file,
            redundant,
            stop_at_arrays,
        } => {
            let doc = from_file(&file)?;
            let options = CollapseOptions::default()
                .include_redundant_levels(redundant)
                .stop_at_arrays(stop_at_arrays);
            emit(&mut output, &collapse_to_dotted_with(&doc, options), format)?;
        }
        Command::Match {
            file,
            query,
            dotted,
        } => {
            let doc = from_file(&file)?;
            let query = from_file(&query)?;
            let matched = if dotted {
                match_dotted_object(&doc, &query)
            } else {
                match_object(&doc, &query)
            };
            writeln!(output, "{}", matched)?;
            if !matched {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Merge {
            destination,
            sources,
        } => {
            let mut doc = from_file(&destination)?;
            let sources = sources.iter().map(from_file).collect::<Result<Vec<_>, _>>()?;
            let sources: Vec<&Value> = sources.iter().collect();
            merge(&mut doc, &sources);
            emit(&mut output, &doc, format)?;
        }
        Command::Diff { files, dotted } => {
            let docs = files.iter().map(from_file).collect::<Result<Vec<_>, _>>()?;
            let docs: Vec<&Value> = docs.iter().collect();
            let tree = diff_objects(&docs);
            if dotted {
                for path in tree.paths() {
                    writeln!(output, "{}", path)?;
                }
            } else {
                emit(&mut output, &tree, format)?;
            }
        }
        Command::Sync {
            destination,
            source,
            only,
            skip,
            changes,
        } => {
            let mut doc = from_file(&destination)?;
            let source = from_file(&source)?;
            let only: Vec<Path> = only.iter().map(|p| Path::parse(p)).collect();
            let skip: Vec<Path> = skip.iter().map(|p| Path::parse(p)).collect();
            let mut changed = Vec::new();
            sync_object(
                &mut doc,
                &source,
                SyncOptions::new()
                    .on_field(|field| accepts(&Path::parse(field), &only, &skip))
                    .on_change(|field| changed.push(field.to_string())),
            );
            debug!(changes = changed.len(), "sync finished");
            if changes {
                for path in &changed {
                    writeln!(output, "{}", path)?;
                }
            } else {
                emit(&mut output, &doc, format)?;
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// A field is synced when it lies on the way to or below an `only` prefix and
/// not below a `skip` prefix.
fn accepts(field: &Path, only: &[Path], skip: &[Path]) -> bool {
    let wanted = only.is_empty()
        || only
            .iter()
            .any(|prefix| field.starts_with(prefix) || prefix.starts_with(field));
    wanted && !skip.iter().any(|prefix| field.starts_with(prefix))
}

fn emit<T: Serialize>(
    output: &mut dyn Write,
    value: &T,
    format: Format,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        Format::Json => writeln!(output, "{}", serde_json::to_string_pretty(value)?)?,
        Format::Yaml => write!(output, "{}", serde_yaml::to_string(value)?)?,
    }
    Ok(())
}
