//! Tplgen - registry generator
//!
//! Main CLI entry point: expands the algorithm registry config into
//! registration units and reports the generated paths to the build system.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tplgen::{
    generate, GenerateOptions, GroupingOptions, HeaderProbe, RegistryConfig, TemplateRenderer,
    WriterConfig,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "genregistry")]
#[command(version)]
#[command(about = "Generate registration units for parametrized algorithms", long_about = None)]
struct Args {
    /// Algorithm registry config (TOML)
    config: PathBuf,

    /// Configuration header searched by feature patterns
    config_header: PathBuf,

    /// Output directory for generated units
    out_dir: PathBuf,

    /// Print the `;`-separated list of generated units
    #[arg(long)]
    print_deps: bool,

    /// Print hierarchy, path and content of every unit
    #[arg(long = "print", short = 'v')]
    verbose: bool,

    /// Write generated units to the output directory
    #[arg(long)]
    generate_files: bool,

    /// Merge each kind into at most this many compilation groups
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    group: Option<u32>,

    /// Minimum instance count before a kind is grouped (default: --group)
    #[arg(long, requires = "group")]
    group_threshold: Option<u32>,

    /// Delay between write confirmation polls
    #[arg(long, default_value = "10")]
    poll_interval_ms: u64,

    /// Confirmation polls before a write is reported as failed
    #[arg(long, default_value = "500")]
    max_polls: u32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config = RegistryConfig::load(&args.config)
        .with_context(|| format!("Failed to load config {}", args.config.display()))?;
    let probe = HeaderProbe::load(&args.config_header).context("Failed to load config header")?;
    let kinds = config
        .resolve(&probe)
        .context("Failed to resolve algorithm registry")?;

    let renderer = TemplateRenderer::new(config.emit.clone())?;

    let grouping = args.group.map(|target| {
        let opts = GroupingOptions::new(target as usize);
        match args.group_threshold {
            Some(threshold) => opts.with_threshold(threshold as usize),
            None => opts,
        }
    });
    let mut opts = GenerateOptions::new(&args.out_dir)
        .emit_files(args.generate_files)
        .grouping(grouping);
    opts.writer = WriterConfig {
        poll_interval: Duration::from_millis(args.poll_interval_ms),
        max_polls: args.max_polls,
    };

    let report = generate(&kinds, &renderer, &opts).context("Generation failed")?;

    let mut stdout = io::stdout().lock();
    if args.verbose {
        report.write_trace(&mut stdout)?;
    }
    if args.print_deps {
        stdout.write_all(report.deps_line().as_bytes())?;
    }
    stdout.flush()?;

    Ok(())
}
