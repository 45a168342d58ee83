use anyhow::Result;
use clap::{Parser, Subcommand};
use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use agentgate::{
    check,
    config::GateConfig,
    digest::{self, SigCheck},
    evidence::{runtime_scan, static_scan},
    report::Mode,
};

/// Exit code for usage errors and failed verification alike.
const EXIT_FAIL: u8 = 2;

#[derive(Parser)]
#[command(name = "agentgate", about = "Release-readiness gate for agent bundles", version)]
struct Cli {
    /// Bundle root directory
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Gate config JSON (agent registry + marker table); built-in if omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter (e.g. `debug`, `agentgate=info`)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Structural gate (+ optional static scan); prints a JSON report
    Check {
        /// Exactly one weight payload per agent; promote `expect` issues
        #[arg(long)]
        strict: bool,

        /// Also run the static evidence scan
        #[arg(long = "static")]
        with_static: bool,

        /// Exit 2 when the report status is FAIL
        #[arg(long)]
        enforce: bool,
    },

    /// Static evidence scan over agent sources
    Static,

    /// Runtime evidence scan over logs, plus exact weight counts
    Runtime,

    /// Stamp the SHA-256 of a weight file into its metadata record
    Stamp {
        /// Metadata record (model.yaml)
        metadata: PathBuf,
        /// Weight artifact
        weights: PathBuf,
    },

    /// Compare a weight file against the digest stamped in its record
    VerifySig {
        metadata: PathBuf,
        weights: PathBuf,
    },
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn verdict(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_FAIL)
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.cmd {
        Cmd::Check {
            strict,
            with_static,
            enforce,
        } => {
            let cfg = GateConfig::load(cli.config.as_deref())?;
            run_check(&cli.root, &cfg, Mode::from_strict_flag(strict), with_static, enforce)
        }
        Cmd::Static => {
            let cfg = GateConfig::load(cli.config.as_deref())?;
            run_static(&cli.root, &cfg)
        }
        Cmd::Runtime => {
            let cfg = GateConfig::load(cli.config.as_deref())?;
            Ok(run_runtime(&cli.root, &cfg))
        }
        Cmd::Stamp { metadata, weights } => {
            let d = digest::stamp_artifact_sig(&metadata, &weights)?;
            println!("{d}");
            Ok(ExitCode::SUCCESS)
        }
        Cmd::VerifySig { metadata, weights } => run_verify_sig(&metadata, &weights),
    }
}

fn run_check(root: &Path, cfg: &GateConfig, mode: Mode, with_static: bool, enforce: bool) -> Result<ExitCode> {
    let report = check::run_check(root, cfg, mode, with_static)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    if enforce {
        return Ok(verdict(report.all_passed()));
    }
    Ok(ExitCode::SUCCESS)
}

fn run_static(root: &Path, cfg: &GateConfig) -> Result<ExitCode> {
    let report = static_scan::scan(root, cfg)?;
    for line in report.summary_lines() {
        println!("{line}");
    }
    Ok(verdict(report.status.is_pass()))
}

fn run_runtime(root: &Path, cfg: &GateConfig) -> ExitCode {
    let report = runtime_scan::verify(root, cfg);
    for f in &report.failures {
        println!("{f}");
    }
    if report.passed() {
        println!("PASS: bundle verified ✅");
    } else {
        println!("Bundle verification FAILED ❌");
    }
    verdict(report.passed())
}

fn run_verify_sig(metadata: &Path, weights: &Path) -> Result<ExitCode> {
    let res = digest::check_artifact_sig(metadata, weights)?;
    match &res {
        SigCheck::Match(d) => println!("OK {d}"),
        SigCheck::Mismatch { stamped, actual } => {
            println!("MISMATCH stamped={stamped} actual={actual}");
        }
        SigCheck::Unstamped { actual } => {
            println!("UNSTAMPED actual={actual}");
        }
    }
    Ok(verdict(res.is_match()))
}
