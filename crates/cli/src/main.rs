//! CLI tool for turning generated slide JSON into a bounded presentation.

use anyhow::{Context, Result};
use clap::Parser;
use slidefit_core::{DecodeMode, PipelineConfig, Presentation, PresentationBuilder};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Repair, normalize and paginate model-generated slide JSON.
#[derive(Parser, Debug)]
#[command(name = "slidefit")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input file(s) with raw model output ("-" reads stdin)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Output directory (default: same as input file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print output to stdout instead of writing to file
    #[arg(short, long)]
    print: bool,

    /// JSON pipeline configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Reject any schema violation instead of coercing
    #[arg(long)]
    strict: bool,

    /// Skip pagination
    #[arg(long)]
    no_paginate: bool,

    /// Override the page budget (inches of content height)
    #[arg(long)]
    page_budget: Option<f64>,

    /// Report slides that exceed the advisory content limits
    #[arg(long)]
    check: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let config = load_config(&args)?;
    let builder = PresentationBuilder::from_config(&config);

    for input_path in &args.input {
        if args.verbose {
            eprintln!("Processing: {}", input_path.display());
        }

        match process_file(input_path, &args, &config, &builder) {
            Ok(output) => {
                if args.print || (is_stdin(input_path) && args.output.is_none()) {
                    println!("{}", output);
                } else {
                    let output_path = get_output_path(input_path, args.output.as_ref())?;
                    write_output(&output_path, &output)?;
                    if args.verbose {
                        eprintln!("Written to: {}", output_path.display());
                    }
                }
            }
            Err(e) => {
                eprintln!("Error processing {}: {:#}", input_path.display(), e);
            }
        }
    }

    Ok(())
}

/// Build the pipeline configuration from the config file and flag overrides.
fn load_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = read_input(path)?;
            PipelineConfig::from_json_str(&text)
                .with_context(|| format!("Invalid config file {}", path.display()))?
        }
        None => PipelineConfig::default(),
    };

    if args.strict {
        config.mode = DecodeMode::Strict;
    }
    if args.no_paginate {
        config.paginate = false;
    }
    if let Some(budget) = args.page_budget {
        config.pagination.page_budget = budget;
    }

    log::debug!("Using configuration: {:?}", config);
    Ok(config)
}

/// Process a single raw model output file.
fn process_file(
    input_path: &Path,
    args: &Args,
    config: &PipelineConfig,
    builder: &PresentationBuilder,
) -> Result<String> {
    let raw = read_input(input_path)?;

    let (presentation, report) = builder.build_with_report(&raw)?;

    if args.verbose {
        eprintln!(
            "  Decoded {} slides, wrote {} ({} paginated)",
            report.input_slides, report.output_slides, report.paginated_slides
        );
    }

    if args.check {
        report_limit_violations(input_path, &presentation, config);
    }

    let output = presentation
        .to_json_pretty()
        .context("Failed to serialize presentation")?;

    Ok(output)
}

/// Log every advisory limit the final slides still exceed.
fn report_limit_violations(input_path: &Path, presentation: &Presentation, config: &PipelineConfig) {
    for (idx, slide) in presentation.slides.iter().enumerate() {
        for violation in config.limits.check_slide(slide) {
            log::warn!(
                "{} slide {}: {}",
                input_path.display(),
                idx + 1,
                violation
            );
        }
    }
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Read a file, or stdin for "-".
fn read_input(path: &Path) -> Result<String> {
    let mut text = String::new();
    if is_stdin(path) {
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
    } else {
        File::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?
            .read_to_string(&mut text)
            .with_context(|| format!("Failed to read {}", path.display()))?;
    }
    Ok(text)
}

/// Determine the output path for a processed file.
fn get_output_path(input_path: &Path, output_dir: Option<&PathBuf>) -> Result<PathBuf> {
    let stem = if is_stdin(input_path) {
        "stdin"
    } else {
        input_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output")
    };

    let output_filename = format!("{}.slides.json", stem);

    let output_path = match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
            dir.join(output_filename)
        }
        None => {
            if let Some(parent) = input_path.parent() {
                parent.join(output_filename)
            } else {
                PathBuf::from(output_filename)
            }
        }
    };

    Ok(output_path)
}

/// Write output to a file.
fn write_output(path: &Path, content: &str) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}
