//! SM3 Merkle Prover command line
//!
//! Subcommands:
//! 1. `hash`   - SM3 digest of a string or hex input
//! 2. `extend` - length-extension forgery from a digest and secret length
//! 3. `demo`   - build a tree over random records, prove inclusion and
//!    exclusion, and run a length-extension attack

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::Path;
use std::path::PathBuf;
use tracing::{error, info, warn};

use merkle_prover::config;
use merkle_prover::scenario::run_demo;
use merkle_prover::types::{DemoConfig, DemoReport};
use sm3_engine::{digest_from_hex, forge, hash, to_hex};

/// SM3 hash engine and Merkle proof toolkit
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the SM3 digest of the input
    Hash {
        /// Input text (or hex bytes with --hex)
        input: String,

        /// Treat input as hex-encoded bytes
        #[arg(long, default_value_t = false)]
        hex: bool,
    },

    /// Forge H(secret || padding || suffix) from H(secret) and len(secret)
    Extend {
        /// Hex digest of the unknown secret
        #[arg(long)]
        digest: String,

        /// Secret length in bytes
        #[arg(long)]
        secret_len: u64,

        /// Suffix to append
        #[arg(long)]
        suffix: String,
    },

    /// Run the end-to-end Merkle and length-extension demo
    Demo {
        /// Configuration file path
        #[arg(short, long, default_value = "merkle-prover.toml")]
        config: PathBuf,

        /// Number of leaves (overrides config file)
        #[arg(long)]
        leaves: Option<usize>,

        /// RNG seed (overrides config file)
        #[arg(long)]
        seed: Option<u64>,

        /// Keep insertion order instead of sorting leaves by digest
        #[arg(long, default_value_t = false)]
        unsorted: bool,

        /// Print the report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level)?;

    match args.command {
        Command::Hash { input, hex } => run_hash(&input, hex),
        Command::Extend {
            digest,
            secret_len,
            suffix,
        } => run_extend(&digest, secret_len, &suffix),
        Command::Demo {
            config,
            leaves,
            seed,
            unsorted,
            json,
        } => {
            let mut demo_config = load_configuration(&config)?;

            // Command line arguments override config file
            if let Some(leaves) = leaves {
                demo_config.leaf_count = leaves;
                demo_config.sample_index = demo_config.sample_index.min(leaves.saturating_sub(1));
            }
            if seed.is_some() {
                demo_config.seed = seed;
            }
            if unsorted {
                demo_config.sort_leaves = false;
            }

            run_demo_command(&demo_config, json)
        }
    }
}

/// Initialize logging system
fn init_logging(log_level: &str) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => {
            eprintln!("⚠️  Unknown log level: {}, using INFO", log_level);
            tracing::Level::INFO
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Load configuration file, falling back to environment variables
fn load_configuration(config_path: &Path) -> Result<DemoConfig> {
    if !config_path.exists() {
        warn!(
            "Configuration file {} does not exist, using environment/defaults",
            config_path.display()
        );
        return config::load_config_from_env().context("Failed to load configuration from env");
    }

    info!("📋 Loading configuration: {}", config_path.display());
    config::load_config(config_path).context("Failed to load configuration")
}

fn run_hash(input: &str, is_hex: bool) -> Result<()> {
    let bytes = if is_hex {
        hex::decode(input.trim()).context("Input is not valid hex")?
    } else {
        input.as_bytes().to_vec()
    };

    println!("{}", to_hex(&hash(&bytes)));
    Ok(())
}

fn run_extend(digest: &str, secret_len: u64, suffix: &str) -> Result<()> {
    let original = digest_from_hex(digest).context("Invalid digest")?;
    let forgery = forge(&original, secret_len, suffix.as_bytes());

    println!("forged_digest: {}", to_hex(&forgery.digest));
    println!("forged_tail:   {}", hex::encode(&forgery.forged_tail));
    Ok(())
}

fn run_demo_command(demo_config: &DemoConfig, json: bool) -> Result<()> {
    config::validate_config(demo_config).context("Invalid demo configuration")?;

    info!("🚀 Starting SM3 Merkle demo v{}", env!("CARGO_PKG_VERSION"));
    info!("   - Leaves: {}", demo_config.leaf_count);
    info!("   - Record size: {} bytes", demo_config.record_size);
    info!("   - Sorted by digest: {}", demo_config.sort_leaves);

    let report = run_demo(demo_config).context("Demo failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.all_passed() {
        info!("✅ All checks passed");
        Ok(())
    } else {
        error!("❌ Some checks failed");
        std::process::exit(1);
    }
}

fn print_report(report: &DemoReport) {
    let merkle = &report.merkle;
    println!("🌳 Merkle Tree:");
    println!("   Leaves: {}", merkle.leaf_count);
    println!("   Height: {}", merkle.height);
    println!("   Root: {}", merkle.root);
    println!();

    println!("🔐 Inclusion Proof:");
    println!("   Leaf index: {}", merkle.sample_index);
    println!("   Path length: {}", merkle.inclusion_proof_depth);
    println!("   Verified: {}", merkle.inclusion_verified);
    println!("   Tampered proof rejected: {}", merkle.tampered_inclusion_rejected);
    println!();

    match &merkle.exclusion {
        Some(exclusion) => {
            println!("🚫 Exclusion Proof:");
            println!("   Insert position: {}", exclusion.position);
            println!("   Left proof length: {:?}", exclusion.left_proof_depth);
            println!("   Right proof length: {:?}", exclusion.right_proof_depth);
            println!("   Absent record verified: {}", exclusion.absent_verified);
            println!("   Present record rejected: {}", exclusion.present_rejected);
        }
        None => println!("🚫 Exclusion Proof: skipped (leaves not sorted)"),
    }
    println!();

    let extension = &report.extension;
    println!("🧪 Length Extension:");
    println!("   Secret length: {} bytes", extension.secret_len);
    println!("   Suffix: {}", extension.suffix);
    println!("   Original digest: {}", extension.original_digest);
    println!("   Forged digest:   {}", extension.forged_digest);
    println!("   Real digest:     {}", extension.real_digest);
    println!("   Forgery matches: {}", extension.forgery_matches);
    println!("   Padding required: {}", extension.padding_required);
}
