//! Extract command - run the pipeline on one OCR JSON file.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::{debug, info};

use portex_core::pipeline::{Pipeline, PipelineOutput};
use portex_core::validate::CheckStatus;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input OCR JSON file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Expected portfolio total for the aggregate consistency check
    #[arg(long)]
    expected_total: Option<f64>,

    /// Print the validation report to stderr
    #[arg(long)]
    validate: bool,

    /// Show extraction confidence scores
    #[arg(long)]
    show_confidence: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = super::load_config(config_path)?;
    if args.expected_total.is_some() {
        config.validator.expected_total = args.expected_total;
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let raw = fs::read_to_string(&args.input)?;
    let pipeline = Pipeline::new(config);
    let result = pipeline.run_json(&raw)?;

    debug!(
        "Extracted {} records in {}ms",
        result.records.len(),
        result.metadata.processing_time_ms
    );

    if args.validate {
        print_validation(&result);
    }

    for warning in &result.warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }

    let output = format_output(&result, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_confidence {
        println!();
        println!(
            "{} Average confidence: {:.1}%",
            style("ℹ").blue(),
            result.summary.overall_confidence * 100.0
        );
        println!(
            "{} Processing time: {}ms",
            style("ℹ").blue(),
            result.metadata.processing_time_ms
        );
    }

    Ok(())
}

fn print_validation(result: &PipelineOutput) {
    eprintln!("{}", style("Validation report:").bold());
    for check in &result.validation.checks {
        let marker = match check.status {
            CheckStatus::Pass => style("✓").green(),
            CheckStatus::Warning => style("⚠").yellow(),
            CheckStatus::Error => style("✗").red(),
        };
        eprintln!("  {} {}: {}", marker, check.name, check.message);
    }
}

fn format_output(result: &PipelineOutput, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => format_text(result),
    }
}

fn format_csv(result: &PipelineOutput) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "name",
        "isin",
        "quantity",
        "market_value",
        "unit_price",
        "currency",
        "performance_pct",
        "maturity_date",
        "asset_class",
        "confidence",
        "page",
    ])?;

    for record in &result.records {
        wtr.write_record([
            record.name.as_str(),
            record.isin().unwrap_or_default(),
            record.quantity.as_deref().unwrap_or_default(),
            record.market_value.as_deref().unwrap_or_default(),
            record.unit_price.as_deref().unwrap_or_default(),
            record.currency.as_deref().unwrap_or_default(),
            record.performance_pct.as_deref().unwrap_or_default(),
            record.maturity_date.as_deref().unwrap_or_default(),
            record.asset_class.as_str(),
            &format!("{:.3}", record.confidence_score),
            &record.source_page.to_string(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &PipelineOutput) -> anyhow::Result<String> {
    let mut output = String::new();

    output.push_str(&format!(
        "Securities extracted: {}\n\n",
        result.summary.total_securities
    ));

    for record in &result.records {
        output.push_str(&format!("{}\n", record.name));
        if let Some(isin) = record.isin() {
            output.push_str(&format!("  ISIN: {}\n", isin));
        }
        if let Some(quantity) = &record.quantity {
            output.push_str(&format!("  Quantity: {}\n", quantity));
        }
        if let Some(value) = &record.market_value {
            output.push_str(&format!("  Market value: {}\n", value));
        }
        if let Some(price) = &record.unit_price {
            output.push_str(&format!("  Unit price: {}\n", price));
        }
        if let Some(currency) = &record.currency {
            output.push_str(&format!("  Currency: {}\n", currency));
        }
        output.push_str(&format!(
            "  Confidence: {:.1}% (page {})\n\n",
            record.confidence_score * 100.0,
            record.source_page
        ));
    }

    output.push_str(&format!(
        "Average confidence: {:.1}%\n",
        result.summary.overall_confidence * 100.0
    ));

    Ok(output)
}
