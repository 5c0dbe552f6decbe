//! Scenario runner
//!
//! Usage:
//!   fibra-scenarios                      # Run all scenarios
//!   fibra-scenarios --filter hooks       # Run scenarios matching "hooks"
//!   fibra-scenarios --list               # List all scenarios
//!   fibra-scenarios --config fibra.toml  # Renderer settings from a file

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use fibra_test_suite::{scenarios, SuiteConfig, TestHarness, TestRunner};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "fibra-scenarios")]
#[command(author, version, about = "Run Fibra reconciler scenarios", long_about = None)]
struct Cli {
    /// Only run scenarios whose name or suite contains this pattern
    #[arg(short, long)]
    filter: Option<String>,

    /// List scenarios without running them
    #[arg(long)]
    list: bool,

    /// TOML file with a [renderer] table
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    if cli.list {
        println!("Available scenario suites:");
        for suite in scenarios::all_suites() {
            println!("\n  {}:", suite.name);
            for case in &suite.cases {
                println!("    - {}", case.name);
            }
        }
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => SuiteConfig::load(path)?,
        None => SuiteConfig {
            renderer: fibra_core::RendererConfig::testing(),
        },
    };
    tracing::debug!(?config, "loaded configuration");

    println!("╔══════════════════════════════════════════╗");
    println!("║         FIBRA RECONCILER SCENARIOS       ║");
    println!("╚══════════════════════════════════════════╝\n");

    let mut runner = TestRunner::with_harness(TestHarness::new(config.renderer));
    for suite in scenarios::all_suites() {
        runner.add_suite(suite);
    }

    if let Some(ref pattern) = cli.filter {
        println!("Running scenarios matching: {}\n", pattern);
        runner.filter(pattern);
    }

    let result = runner.run();
    result.print_summary();

    if result.all_passed() {
        println!("\nAll scenarios passed!");
        Ok(())
    } else {
        std::process::exit(1);
    }
}
