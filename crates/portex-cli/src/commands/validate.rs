//! Validate command - measure extraction accuracy against a reference dataset.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use portex_core::pipeline::Pipeline;
use portex_core::reference::ReferenceDataset;

/// Arguments for the validate command.
#[derive(Args)]
pub struct ValidateArgs {
    /// Input OCR JSON file
    #[arg(required = true)]
    input: PathBuf,

    /// Reference dataset JSON file with expected values keyed by ISIN
    #[arg(short, long, required = true)]
    reference: PathBuf,

    /// Emit the full report as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

pub fn run(args: ValidateArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let separators = config.extractor.grouping_separators.clone();

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let dataset = ReferenceDataset::from_file(&args.reference)?;
    if dataset.is_empty() {
        anyhow::bail!(
            "Reference dataset is empty: {}",
            args.reference.display()
        );
    }

    info!(
        "Comparing {} against {} reference entries",
        args.input.display(),
        dataset.entries.len()
    );

    let raw = fs::read_to_string(&args.input)?;
    let result = Pipeline::new(config).run_json(&raw)?;
    let report = dataset.compare(&result.records, &separators);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Matched {}/{} reference entries, accuracy {:.1}%",
        report.matched,
        dataset.entries.len(),
        report.accuracy_pct
    );

    for isin in &report.missing {
        println!("  {} missing: {}", style("✗").red(), isin);
    }
    for isin in &report.unexpected {
        println!("  {} unexpected: {}", style("⚠").yellow(), isin);
    }
    for mismatch in &report.mismatches {
        println!(
            "  {} {} {}: expected {}, got {}",
            style("✗").red(),
            mismatch.isin,
            mismatch.field,
            mismatch.expected,
            mismatch.actual
        );
    }

    if report.missing.is_empty() && report.mismatches.is_empty() {
        println!("{} All reference entries reproduced", style("✓").green());
    }

    Ok(())
}
