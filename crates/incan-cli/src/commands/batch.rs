//! Batch processing command for multiple extraction documents.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use incan_core::canon::VendorRegistry;
use incan_core::models::document::RawExtraction;
use incan_core::pipeline::{InvoicePipeline, InvoiceRecord, PipelineOptions};
use incan_core::score::InvoiceStatus;

use super::process::{OutputFormat, format_record, summary_fields};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each document
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Resolve vendor identities through a shared registry so variants of
    /// one vendor name get one canonical ID across the batch
    #[arg(long)]
    use_registry: bool,

    /// Demote auto-approved records that fail structural validation
    #[arg(long)]
    gate_on_validation: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single document.
struct BatchResult {
    path: PathBuf,
    record: Option<InvoiceRecord>,
    error: Option<String>,
}

pub fn run(args: BatchArgs) -> anyhow::Result<()> {
    let start = Instant::now();

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|entry| entry.ok())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("json"))
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} documents to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} documents")
            .unwrap()
            .progress_chars("=>-"),
    );

    let pipeline = InvoicePipeline::with_options(PipelineOptions {
        gate_status_on_validation: args.gate_on_validation,
    });
    let mut registry = args.use_registry.then(VendorRegistry::new);

    let mut results = Vec::with_capacity(files.len());
    for path in files {
        match process_document(&path, &pipeline, registry.as_mut()) {
            Ok(record) => {
                if !record.warnings.is_empty() {
                    debug!(
                        "{}: {} canonicalization warnings",
                        path.display(),
                        record.warnings.len()
                    );
                }
                results.push(BatchResult {
                    path,
                    record: Some(record),
                    error: None,
                });
            }
            Err(e) => {
                let message = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), message);
                    results.push(BatchResult {
                        path,
                        record: None,
                        error: Some(message),
                    });
                } else {
                    error!("Failed to process {}: {}", path.display(), message);
                    anyhow::bail!("Processing failed: {}", message);
                }
            }
        }

        overall_pb.inc(1);
    }

    overall_pb.finish_with_message("Complete");

    let successful: Vec<_> = results.iter().filter(|r| r.record.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    // Write per-document outputs
    for result in &successful {
        if let (Some(record), Some(output_dir)) = (&result.record, &args.output_dir) {
            let output_name = result
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("invoice");

            let extension = match args.format {
                OutputFormat::Json => "json",
                OutputFormat::Csv => "csv",
                OutputFormat::Text => "txt",
            };

            let output_path = output_dir.join(format!("{}.{}", output_name, extension));
            fs::write(&output_path, format_record(record, args.format)?)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    // Print routing split
    let count_status = |status: InvoiceStatus| {
        successful
            .iter()
            .filter(|r| r.record.as_ref().is_some_and(|rec| rec.status == status))
            .count()
    };

    println!();
    println!(
        "{} Processed {} documents in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );
    println!(
        "   {} auto-approved, {} needs review, {} low confidence",
        count_status(InvoiceStatus::AutoApproved),
        count_status(InvoiceStatus::NeedsReview),
        count_status(InvoiceStatus::LowConfidence)
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed documents:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn process_document(
    path: &PathBuf,
    pipeline: &InvoicePipeline,
    registry: Option<&mut VendorRegistry>,
) -> anyhow::Result<InvoiceRecord> {
    let raw = RawExtraction::from_file(path)?;

    Ok(match registry {
        Some(registry) => pipeline.process_with_registry(&raw, registry),
        None => pipeline.process(&raw),
    })
}

fn write_summary(path: &PathBuf, results: &[BatchResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "invoice_number",
        "vendor_name",
        "vendor_id",
        "date",
        "total_amount",
        "currency",
        "tax_amount",
        "status",
        "confidence",
        "valid",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string();

        if let Some(record) = &result.record {
            let mut row = vec![filename];
            row.extend(summary_fields(record));
            row.push(record.validation.valid.to_string());
            row.push(record.validation.error.clone().unwrap_or_default());
            wtr.write_record(&row)?;
        } else {
            let mut row = vec![filename];
            row.extend(std::iter::repeat_n(String::new(), 10));
            row.push(result.error.clone().unwrap_or_default());
            wtr.write_record(&row)?;
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_for(json: &str) -> InvoiceRecord {
        let raw = RawExtraction::from_json_str(json).unwrap();
        InvoicePipeline::new().process(&raw)
    }

    #[test]
    fn test_write_summary_rows() {
        let dir = tempfile::tempdir().unwrap();
        let summary_path = dir.path().join("summary.csv");

        let results = vec![
            BatchResult {
                path: PathBuf::from("a.json"),
                record: Some(record_for(
                    r#"{"invoice_metadata": {"invoice_number": "INV-1", "company_name": "Acme"}}"#,
                )),
                error: None,
            },
            BatchResult {
                path: PathBuf::from("b.json"),
                record: None,
                error: Some("failed to decode extraction document".to_string()),
            },
        ];

        write_summary(&summary_path, &results).unwrap();

        let content = fs::read_to_string(&summary_path).unwrap();
        let mut lines = content.lines();
        assert!(lines.next().unwrap().starts_with("filename,invoice_number,"));
        assert!(lines.next().unwrap().starts_with("a.json,INV-1,"));
        assert!(lines.next().unwrap().contains("failed to decode"));
    }
}
