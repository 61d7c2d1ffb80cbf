//! Batch command - extract records from many page text files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use invex_core::models::invoice::Invoice;
use invex_core::{Document, DocumentReport, InvoiceParser};

use super::extract::{OutputFormat, format_report};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern for input files
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV listing every page
    #[arg(long)]
    summary: bool,

    /// Attach the page text to every record as `rawText`
    #[arg(long)]
    raw_text: bool,
}

/// Result of processing a single file.
struct FileResult {
    path: PathBuf,
    report: Option<DocumentReport>,
    error: Option<String>,
    processing_time_ms: u64,
}

impl FileResult {
    fn failed_pages(&self) -> usize {
        self.report.as_ref().map_or(0, DocumentReport::failure_count)
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = super::load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "json" | "txt" | "text")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut parser = InvoiceParser::from_config(&config)?;
    if args.raw_text {
        parser = parser.with_raw_text(true);
    }

    let mut results = Vec::with_capacity(files.len());
    for path in files {
        let file_start = Instant::now();
        let outcome = process_single_file(&path, &parser);
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        let result = match outcome {
            Ok(report) => FileResult {
                path,
                report: Some(report),
                error: None,
                processing_time_ms,
            },
            Err(e) => {
                warn!("Failed to process {}: {}", path.display(), e);
                FileResult {
                    path,
                    report: None,
                    error: Some(e.to_string()),
                    processing_time_ms,
                }
            }
        };
        results.push(result);

        pb.inc(1);
    }

    pb.finish_and_clear();

    if let Some(output_dir) = &args.output_dir {
        for result in &results {
            let Some(report) = &result.report else {
                continue;
            };

            let output_name = result
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("invoice");
            let output_path = output_dir.join(format!("{}.{}", output_name, args.format.extension()));

            let content = format_report(report, args.format, config.output.pretty)?;
            fs::write(&output_path, content)?;
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

    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();
    let pages_ok: usize = results
        .iter()
        .filter_map(|r| r.report.as_ref())
        .map(DocumentReport::success_count)
        .sum();
    let pages_failed: usize = results.iter().map(FileResult::failed_pages).sum();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} pages extracted, {} pages failed, {} files unreadable",
        style(pages_ok).green(),
        style(pages_failed).red(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
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

fn process_single_file(path: &Path, parser: &InvoiceParser) -> anyhow::Result<DocumentReport> {
    let document = Document::load(path)?;
    if document.is_empty() {
        anyhow::bail!("No pages found");
    }

    Ok(parser.parse_document(&document))
}

fn write_summary(path: &Path, results: &[FileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "page",
        "status",
        "invoice_no",
        "invoice_date",
        "sold_to",
        "total_amount",
        "warnings",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        let Some(report) = &result.report else {
            wtr.write_record([
                filename,
                "",
                "error",
                "",
                "",
                "",
                "",
                "",
                &result.processing_time_ms.to_string(),
                result.error.as_deref().unwrap_or(""),
            ])?;
            continue;
        };

        for outcome in &report.outcomes {
            let page = outcome.page.to_string();
            match &outcome.result {
                Ok(extracted) => {
                    // A page can extract cleanly and still lack the fields
                    // of a complete invoice.
                    let (status, invoice, error) = match Invoice::from_record(&extracted.record) {
                        Ok(invoice) => ("success", Some(invoice), String::new()),
                        Err(e) => ("partial", None, e.to_string()),
                    };

                    wtr.write_record([
                        filename,
                        &page,
                        status,
                        &invoice.as_ref().map(|i| i.invoice_no.to_string()).unwrap_or_default(),
                        &invoice.as_ref().map(|i| i.invoice_date.to_string()).unwrap_or_default(),
                        invoice.as_ref().map(|i| i.sold_to.as_str()).unwrap_or(""),
                        &invoice.as_ref().map(|i| i.total_amount.to_string()).unwrap_or_default(),
                        &extracted.warnings.join("; "),
                        &extracted.processing_time_ms.to_string(),
                        &error,
                    ])?;
                }
                Err(e) => {
                    wtr.write_record([
                        filename,
                        &page,
                        "error",
                        "",
                        "",
                        "",
                        "",
                        "",
                        "",
                        &e.to_string(),
                    ])?;
                }
            }
        }
    }

    wtr.flush()?;
    Ok(())
}
