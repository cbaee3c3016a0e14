//! Kriptomatte: decode Cryptomatte object-ID channels.
//!
//! Cryptomatte images store, per pixel, a ranked list of (object ID,
//! coverage) pairs in extra float channels, plus a manifest mapping object
//! names to IDs. Kriptomatte turns that data into one coverage mask per
//! object, combined label maps, and colored previews.
//!
//! # Modules
//!
//! - [`matte`]: The decode engine (hashing, manifests, masks, labels, palettes)
//! - [`source`]: The image source boundary, OpenEXR and in-memory sources
//! - [`sink`]: The image sink boundary, PNG and in-memory sinks
//! - [`extract`]: Mask extraction from a source into a sink
//! - [`error`]: Error types for kriptomatte operations

pub mod error;
pub mod extract;
pub mod matte;
pub mod sink;
pub mod source;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::Level;

pub use error::CryptomatteError;

/// The kriptomatte CLI application.
#[derive(Parser)]
#[command(name = "kriptomatte")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Decode every Cryptomatte layer of an EXR file into mask PNGs.
    Extract(ExtractArgs),
    /// Hash object names to their Cryptomatte IDs.
    Hash(HashArgs),
    /// Inspect a sidecar manifest and check its IDs against the name hashes.
    Manifest(ManifestArgs),
}

/// Arguments for the extract subcommand.
#[derive(clap::Args)]
struct ExtractArgs {
    /// Input OpenEXR file with Cryptomatte layers.
    #[arg(short, long)]
    input: PathBuf,

    /// Directory for the layer folders (defaults to the input's directory).
    #[arg(short = 'o', long)]
    output_dir: Option<PathBuf>,

    /// Also write a colored preview of each layer.
    #[arg(long)]
    preview: bool,

    /// Also write the 24-bit packed label image of each layer.
    #[arg(long)]
    labels: bool,

    /// Compose masks even for IDs absent from the ID channels.
    #[arg(long)]
    all_ids: bool,

    /// Output format ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Arguments for the hash subcommand.
#[derive(clap::Args)]
struct HashArgs {
    /// Object names to hash.
    #[arg(required = true)]
    names: Vec<String>,

    /// Output format ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Arguments for the manifest subcommand.
#[derive(clap::Args)]
struct ManifestArgs {
    /// Manifest JSON file (object name → hex ID).
    input: PathBuf,

    /// Fail if any ID does not match the hash of its name.
    #[arg(long)]
    strict: bool,

    /// Output format ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

#[derive(Serialize)]
struct HashedName<'a> {
    name: &'a str,
    hex: String,
    value: f32,
}

#[derive(Serialize)]
struct ManifestListing<'a> {
    entries: Vec<HashedName<'a>>,
    check: &'a matte::ManifestCheckReport,
}

/// Run the kriptomatte CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), CryptomatteError> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Some(Commands::Extract(args)) => run_extract(args),
        Some(Commands::Hash(args)) => run_hash(args),
        Some(Commands::Manifest(args)) => run_manifest(args),
        None => {
            println!("kriptomatte {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Decode Cryptomatte object IDs into per-object masks.");
            println!();
            println!("Run 'kriptomatte --help' for usage information.");
            Ok(())
        }
    }
}

/// Installs a stderr log subscriber at the requested verbosity.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };
    // Ignore the error when a subscriber is already installed (e.g. in tests).
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn check_output_format(output: &str) -> Result<(), CryptomatteError> {
    match output {
        "text" | "json" => Ok(()),
        other => Err(CryptomatteError::UnsupportedFormat(format!(
            "'{}' (supported: text, json)",
            other
        ))),
    }
}

/// Execute the extract subcommand.
fn run_extract(args: ExtractArgs) -> Result<(), CryptomatteError> {
    check_output_format(&args.output)?;

    let source = source::ExrImage::open(&args.input)?;
    let opts = extract::ExtractOptions {
        output_dir: args.output_dir,
        skip_invisible: !args.all_ids,
        write_preview: args.preview,
        write_label_image: args.labels,
    };
    let report = extract::extract_all(&source, &mut sink::PngSink, &opts)?;

    if args.output == "json" {
        print_json(&report)?;
    } else {
        print!("{}", report);
    }
    Ok(())
}

/// Execute the hash subcommand.
fn run_hash(args: HashArgs) -> Result<(), CryptomatteError> {
    check_output_format(&args.output)?;

    let hashed: Vec<HashedName<'_>> = args
        .names
        .iter()
        .map(|name| {
            let id = matte::hash_name_to_id(name);
            HashedName {
                name,
                hex: id.to_hex(),
                value: id.value(),
            }
        })
        .collect();

    if args.output == "json" {
        print_json(&hashed)?;
    } else {
        for entry in &hashed {
            println!("{}\t{}\t{:e}", entry.hex, entry.name, entry.value);
        }
    }
    Ok(())
}

/// Execute the manifest subcommand.
fn run_manifest(args: ManifestArgs) -> Result<(), CryptomatteError> {
    check_output_format(&args.output)?;

    let manifest = matte::Manifest::read_file(&args.input)?;
    let opts = matte::ManifestCheckOptions {
        strict: args.strict,
    };
    let report = matte::check_manifest(&manifest, &opts);

    if args.output == "json" {
        let entries = manifest
            .iter()
            .map(|(name, id)| HashedName {
                name,
                hex: id.to_hex(),
                value: id.value(),
            })
            .collect();
        print_json(&ManifestListing {
            entries,
            check: &report,
        })?;
    } else {
        println!("{} entries in {}", manifest.len(), args.input.display());
        for (name, id) in manifest.iter() {
            println!("  {}\t{}", id, name);
        }
        println!();
        print!("{}", report);
    }

    if !report.passed() {
        Err(CryptomatteError::ManifestCheckFailed {
            mismatch_count: report.mismatch_count(),
            report,
        })
    } else {
        Ok(())
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CryptomatteError> {
    let json = serde_json::to_string_pretty(value).map_err(CryptomatteError::JsonWrite)?;
    println!("{}", json);
    Ok(())
}
