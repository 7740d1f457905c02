//! Process command - run the pipeline on a single extraction document.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::debug;

use incan_core::models::document::RawExtraction;
use incan_core::pipeline::{InvoicePipeline, InvoiceRecord, PipelineOptions};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input extraction document (JSON)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Demote auto-approved records that fail structural validation
    #[arg(long)]
    gate_on_validation: bool,

    /// Show a confidence summary after processing
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

pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let raw = RawExtraction::from_file(&args.input)?;

    let pipeline = InvoicePipeline::with_options(PipelineOptions {
        gate_status_on_validation: args.gate_on_validation,
    });
    let record = pipeline.process(&raw);

    debug!(
        "processed {} with status {}",
        args.input.display(),
        record.status.as_str()
    );

    let output = format_record(&record, args.format)?;

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
            "{} Overall confidence: {:.2}% ({})",
            style("ℹ").blue(),
            record.confidence.overall_confidence,
            record.confidence.confidence_level.as_str()
        );
        if !record.warnings.is_empty() {
            println!(
                "{} {} canonicalization warnings",
                style("!").yellow(),
                record.warnings.len()
            );
        }
        if let Some(error) = &record.validation.error {
            println!("{} Validation: {}", style("!").yellow(), error);
        }
    }

    Ok(())
}

pub fn format_record(record: &InvoiceRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Csv => format_csv(record),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

fn format_csv(record: &InvoiceRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "invoice_number",
        "vendor_name",
        "vendor_id",
        "date",
        "total_amount",
        "currency",
        "tax_amount",
        "status",
        "confidence",
    ])?;
    wtr.write_record(summary_fields(record))?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

/// The summary columns shared by the single-record CSV and the batch
/// summary: invoice number, canonical vendor, totals, status, confidence.
pub fn summary_fields(record: &InvoiceRecord) -> Vec<String> {
    let meta = record.canonical.invoice_metadata.as_ref();
    let vendor = record.canonical.vendor_info.as_ref();
    let pricing = record.canonical.pricing_summary.as_ref();

    vec![
        meta.and_then(|m| m.invoice_number.clone()).unwrap_or_default(),
        vendor
            .map(|v| v.vendor_name_canonical.normalized_name.clone())
            .unwrap_or_default(),
        vendor
            .map(|v| v.vendor_name_canonical.canonical_id.clone())
            .unwrap_or_default(),
        meta.and_then(|m| m.date.clone()).unwrap_or_default(),
        pricing
            .and_then(|p| p.total_amount)
            .map(|amount| amount.to_string())
            .unwrap_or_default(),
        pricing.map(|p| p.currency.clone()).unwrap_or_default(),
        pricing
            .and_then(|p| p.tax.as_ref())
            .and_then(|tax| tax.tax_amount)
            .map(|amount| amount.to_string())
            .unwrap_or_default(),
        record.status.as_str().to_string(),
        format!("{:.2}", record.confidence.overall_confidence),
    ]
}

fn format_text(record: &InvoiceRecord) -> String {
    let mut output = String::new();

    if let Some(meta) = &record.canonical.invoice_metadata {
        output.push_str(&format!(
            "Invoice: {}\n",
            meta.invoice_number.as_deref().unwrap_or("-")
        ));
        output.push_str(&format!(
            "Company: {}\n",
            meta.company_name.as_deref().unwrap_or("-")
        ));
        output.push_str(&format!("Date: {}\n", meta.date.as_deref().unwrap_or("-")));
    }

    if let Some(vendor) = &record.canonical.vendor_info {
        output.push_str("\nVendor:\n");
        output.push_str(&format!(
            "  {}\n",
            vendor.vendor_name.as_deref().unwrap_or("-")
        ));
        output.push_str(&format!(
            "  ID: {}\n",
            vendor.vendor_name_canonical.canonical_id
        ));
    }

    if let Some(pricing) = &record.canonical.pricing_summary {
        output.push_str("\nPricing:\n");
        if let Some(subtotal) = pricing.subtotal {
            output.push_str(&format!("  Subtotal: {} {}\n", subtotal, pricing.currency));
        }
        if let Some(total) = pricing.total_amount {
            output.push_str(&format!("  Total:    {} {}\n", total, pricing.currency));
        }
    }

    output.push_str(&format!(
        "\nStatus: {} ({:.2}%)\n",
        record.status.as_str(),
        record.confidence.overall_confidence
    ));
    if let Some(error) = &record.validation.error {
        output.push_str(&format!("Validation: {}\n", error));
    }
    for warning in &record.warnings {
        output.push_str(&format!("Warning: {}\n", warning));
    }

    output
}
