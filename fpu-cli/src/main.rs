//! `fpu` - run transaction scripts against an emulated coprocessor

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fpu_runtime::{QueueBus, Snapshot, SystemContext};
use fpu_script::{parse_file, run_script};
use fpu_spec::CoprocessorConfig;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "fpu", about = "Memory-mapped floating-point coprocessor emulator", version)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a script of bus transactions and coprocessor commands
    Run {
        /// Script file
        script: PathBuf,

        /// Load coprocessor state from a snapshot before running
        #[arg(long)]
        load: Option<PathBuf>,

        /// Save coprocessor state to a snapshot after running
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Do not count unsupported transaction shapes as protocol violations
        #[arg(long)]
        lenient: bool,

        /// Exit non-zero if any command failed or any transaction was dropped
        #[arg(long)]
        strict_exit: bool,
    },

    /// Print the non-zero registers and occupied opcode slots of a snapshot
    Dump {
        /// Snapshot file
        snapshot: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(
    script: PathBuf,
    load: Option<PathBuf>,
    snapshot: Option<PathBuf>,
    lenient: bool,
    strict_exit: bool,
) -> Result<ExitCode> {
    let parsed = parse_file(&script).with_context(|| format!("failed to parse {}", script.display()))?;

    let config = CoprocessorConfig {
        strict_protocol: !lenient,
        ..CoprocessorConfig::DEFAULT
    };
    let mut fpu = SystemContext::new(QueueBus::new(), config).context("invalid configuration")?;

    if let Some(path) = &load {
        let state = Snapshot::load(path).with_context(|| format!("failed to load {}", path.display()))?;
        fpu.restore(&state)?;
        tracing::info!(path = %path.display(), "snapshot loaded");
    }

    let reports = run_script(&parsed, &mut fpu);
    let mut failures = 0;
    for entry in &reports {
        if entry.report.is_failure() {
            failures += 1;
        }
        println!("{:4}: {}", entry.line, entry.report);
    }

    let stats = fpu.stats();
    println!(
        "polled {} | responded {} | written {} | dropped {} | violations {} | ops {} ({} failed)",
        stats.polled,
        stats.responded,
        stats.written,
        stats.dropped,
        stats.violations,
        stats.operations,
        stats.failed_operations
    );

    if let Some(path) = &snapshot {
        fpu.snapshot()
            .save(path)
            .with_context(|| format!("failed to save {}", path.display()))?;
        tracing::info!(path = %path.display(), "snapshot saved");
    }

    if strict_exit && failures > 0 {
        tracing::error!(failures, "script finished with failures");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn dump(path: PathBuf) -> Result<()> {
    let state = Snapshot::load(&path).with_context(|| format!("failed to load {}", path.display()))?;
    for line in describe(&state) {
        println!("{}", line);
    }
    Ok(())
}

/// One line per non-zero register and occupied opcode slot
fn describe(state: &Snapshot) -> Vec<String> {
    let reg32 = state
        .reg32
        .iter()
        .enumerate()
        .filter(|(_, w)| **w != 0)
        .map(|(i, word)| format!("r32[{:3}] = {:#010x} ({})", i, word, f32::from_bits(*word)));
    let reg64 = state
        .reg64
        .iter()
        .enumerate()
        .filter(|(_, w)| **w != 0)
        .map(|(i, word)| format!("r64[{:3}] = {:#018x} ({})", i, word, f64::from_bits(*word)));
    let slots = state
        .opcodes
        .iter()
        .enumerate()
        .filter(|(_, r)| !r.is_nop())
        .map(|(i, record)| format!("slot[{:4}] = {}", i, record));
    reg32.chain(reg64).chain(slots).collect()
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            script,
            load,
            snapshot,
            lenient,
            strict_exit,
        } => run(script, load, snapshot, lenient, strict_exit),
        Commands::Dump { snapshot } => {
            dump(snapshot)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
