//! efu - Read, write and build Everything EFU file lists.
//!
//! Usage:
//!   efu roundtrip <INPUT> <OUTPUT>   Decode and re-encode, then compare bytes
//!   efu objects <INPUT>              Print typed records as JSON
//!   efu scan <DIR> -o <OUTPUT>       Build an EFU file from a directory tree
//!   efu root [PATH]                  Show the root identity of a path
//!   efu --help                       Show help

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::{Context, Result};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use efu_core::{Document, Encoding, NewlineStyle, efu_to_objects, resolve_encoding};
use efu_root::Root;
use efu_scan::{RecordScanner, ScanConfig};

#[derive(Parser)]
#[command(
    name = "efu",
    version,
    about = "Read, write and build Everything EFU file lists",
    long_about = "efu reads and writes the CSV file lists exported by Everything.\n\n\
                  Files that follow the EFU quoting convention survive a decode and \
                  re-encode byte for byte."
)]
struct Cli {
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a file, write it back out and compare the bytes
    Roundtrip {
        /// EFU file to read
        input: PathBuf,

        /// Where to write the re-encoded file
        output: PathBuf,

        /// Text encoding label (e.g. "utf-8", "windows-1252")
        #[arg(short, long, default_value = "utf-8")]
        encoding: String,
    },

    /// Print the records of a file as JSON objects
    Objects {
        /// EFU file to read
        input: PathBuf,

        /// Text encoding label
        #[arg(short, long, default_value = "utf-8")]
        encoding: String,
    },

    /// Build an EFU file from a directory tree
    Scan {
        /// Directory to scan
        path: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Line ending of the written file (lf or crlf)
        #[arg(short, long, default_value = "lf")]
        newline: NewlineStyle,

        /// Maximum depth to descend
        #[arg(short, long)]
        depth: Option<u32>,

        /// Leave out the record for the scanned directory itself
        #[arg(long)]
        no_root: bool,

        /// Skip hidden files and directories
        #[arg(long)]
        no_hidden: bool,

        /// Skip entries whose name matches this glob (repeatable)
        #[arg(long = "ignore", value_name = "GLOB")]
        ignore: Vec<String>,

        /// Worker threads (0 = auto)
        #[arg(short, long, default_value = "0")]
        threads: usize,

        /// Text encoding label
        #[arg(short, long, default_value = "utf-8")]
        encoding: String,
    },

    /// Show the root identity (host and path) of a directory
    Root {
        /// Path to describe (defaults to current directory)
        path: Option<PathBuf>,

        /// Print the canonical JSON instead of the identifier
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Roundtrip {
            input,
            output,
            encoding,
        } => {
            run_roundtrip(&input, &output, encoding_for(&encoding)?)?;
        }
        Command::Objects { input, encoding } => {
            run_objects(&input, encoding_for(&encoding)?)?;
        }
        Command::Scan {
            path,
            output,
            newline,
            depth,
            no_root,
            no_hidden,
            ignore,
            threads,
            encoding,
        } => {
            let encoding = encoding_for(&encoding)?;
            let path = path.canonicalize().context("Invalid path")?;
            let root_id = Root::new(Some(&path)).id()?;

            let config = ScanConfig::builder()
                .root(path)
                .include_root(!no_root)
                .include_hidden(!no_hidden)
                .max_depth(depth)
                .ignore_patterns(ignore)
                .threads(threads)
                .root_id(Some(root_id))
                .build()
                .context("Invalid scan options")?;

            run_scan(&config, &output, newline, encoding)?;
        }
        Command::Root { path, json } => {
            run_root(path.as_deref(), json)?;
        }
    }

    Ok(())
}

/// Install the stderr subscriber. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn encoding_for(label: &str) -> Result<&'static Encoding> {
    resolve_encoding(label).with_context(|| format!("Unsupported encoding {label:?}"))
}

/// Decode, re-encode with the detected newline style and compare bytes.
fn run_roundtrip(input: &Path, output: &Path, encoding: &'static Encoding) -> Result<()> {
    let doc = Document::read(input, encoding)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    info!(
        columns = doc.header.len(),
        rows = doc.rows.len(),
        newline = %doc.newline,
        "decoded {}",
        input.display()
    );
    for (index, row) in doc.ragged_rows() {
        debug!(row = index, fields = row.len(), "row width differs from header");
    }

    doc.write(output, encoding)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let original =
        std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let written =
        std::fs::read(output).with_context(|| format!("Failed to read {}", output.display()))?;

    if original == written {
        println!("Round-trip successful: files are identical");
    } else {
        warn!(
            original = original.len(),
            written = written.len(),
            "re-encoded bytes differ from the source"
        );
        println!("Round-trip failed: files differ");
    }

    Ok(())
}

/// Print the typed objects of a file.
fn run_objects(input: &Path, encoding: &'static Encoding) -> Result<()> {
    let objects = efu_to_objects(input, encoding)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    println!("{}", serde_json::to_string_pretty(&objects)?);

    Ok(())
}

/// Scan a tree and write its records.
fn run_scan(
    config: &ScanConfig,
    output: &Path,
    newline: NewlineStyle,
    encoding: &'static Encoding,
) -> Result<()> {
    eprintln!("Scanning {}...", config.root.display());

    let report = RecordScanner::new().scan(config).context("Scan failed")?;

    // An empty tree still gets a header line.
    let doc = if report.records.is_empty() {
        Document::new(config.columns.clone(), Vec::new(), newline)
    } else {
        report.records.to_document(newline)?
    };

    doc.write(output, encoding)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    eprintln!(
        "Wrote {} records to {} in {:.2}s",
        doc.rows.len(),
        output.display(),
        report.duration.as_secs_f64()
    );
    if report.has_warnings() {
        eprintln!("{} warning(s) during scan", report.warnings.len());
    }

    Ok(())
}

/// Print the root identity of a path.
fn run_root(path: Option<&Path>, json: bool) -> Result<()> {
    let path = match path {
        Some(path) => Some(path.canonicalize().context("Invalid path")?),
        None => None,
    };
    let root = Root::new(path.as_deref());

    if json {
        println!("{}", root.to_json()?);
    } else {
        println!("{}", root.id()?);
    }

    Ok(())
}
