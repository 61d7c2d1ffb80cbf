//! Extract command - turn one page text file into records.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use invex_core::models::invoice::Invoice;
use invex_core::sanitize::format_amount;
use invex_core::{Document, DocumentReport, FinalRecord, InvoiceParser};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input file (JSON line arrays or form-feed separated text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Attach the page text to every record as `rawText`
    #[arg(long)]
    raw_text: bool,

    /// Fail if any page could not be extracted
    #[arg(long)]
    strict: bool,

    /// Validate extracted invoices
    #[arg(long)]
    validate: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON array of records
    Json,
    /// CSV, one row per page
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = super::load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);

    pb.set_message("Loading pages...");
    let document = Document::load(&args.input)?;
    if document.is_empty() {
        anyhow::bail!("No pages found in {}", args.input.display());
    }

    pb.set_message(format!("Extracting {} pages...", document.page_count()));
    let mut parser = InvoiceParser::from_config(&config)?;
    if args.raw_text {
        parser = parser.with_raw_text(true);
    }
    let report = parser.parse_document(&document);

    pb.finish_and_clear();

    report_failures(&report);
    if args.strict && report.failure_count() > 0 {
        anyhow::bail!(
            "{} of {} pages failed",
            report.failure_count(),
            report.outcomes.len()
        );
    }

    if args.validate {
        for (page, invoice) in typed_invoices(&report) {
            let issues = invoice.validate();
            if !issues.is_empty() {
                eprintln!("{}", style(format!("Page {page} validation issues:")).yellow());
                for issue in &issues {
                    eprintln!("  - {}", issue);
                }
            }
        }
    }

    let output = format_report(&report, args.format, config.output.pretty)?;

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

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn report_failures(report: &DocumentReport) {
    for (page, error) in report.failures() {
        eprintln!("{} Page {}: {}", style("✗").red(), page, error);
    }
}

/// Typed view of every successful page. Pages missing required fields are
/// skipped with a warning.
pub fn typed_invoices(report: &DocumentReport) -> Vec<(usize, Invoice)> {
    report
        .outcomes
        .iter()
        .filter_map(|outcome| outcome.result.as_ref().ok())
        .filter_map(|result| match Invoice::from_record(&result.record) {
            Ok(invoice) => Some((result.page, invoice)),
            Err(e) => {
                warn!("Page {} has no invoice view: {}", result.page, e);
                None
            }
        })
        .collect()
}

pub fn format_report(
    report: &DocumentReport,
    format: OutputFormat,
    pretty: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => format_json(report, pretty),
        OutputFormat::Csv => format_csv(report),
        OutputFormat::Text => Ok(format_text(report)),
    }
}

fn format_json(report: &DocumentReport, pretty: bool) -> anyhow::Result<String> {
    let records: Vec<&FinalRecord> = report.records().collect();
    if pretty {
        Ok(serde_json::to_string_pretty(&records)?)
    } else {
        Ok(serde_json::to_string(&records)?)
    }
}

fn format_csv(report: &DocumentReport) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "page",
        "invoice_no",
        "invoice_date",
        "ship_date",
        "sold_to",
        "account_no",
        "bill_no",
        "ship_via",
        "purchases",
        "total_amount",
    ])?;

    for (page, invoice) in typed_invoices(report) {
        wtr.write_record([
            &page.to_string(),
            &invoice.invoice_no.to_string(),
            &invoice.invoice_date.to_string(),
            &invoice.ship_date.map(|d| d.to_string()).unwrap_or_default(),
            &invoice.sold_to,
            &invoice.account_no.to_string(),
            &invoice.bill_no.to_string(),
            &invoice.ship_via.clone().unwrap_or_default(),
            &invoice.list_of_purchases.len().to_string(),
            &invoice.total_amount.to_string(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(report: &DocumentReport) -> String {
    let mut output = String::new();

    for (page, invoice) in typed_invoices(report) {
        output.push_str(&format!("Page {}\n", page));
        output.push_str(&format!("Invoice: {}\n", invoice.invoice_no));
        output.push_str(&format!("Date: {}\n", invoice.invoice_date));
        if let Some(ship_date) = invoice.ship_date {
            output.push_str(&format!("Ship date: {}\n", ship_date));
        }
        output.push_str(&format!("Sold to: {}\n", invoice.sold_to));
        output.push_str(&format!("Account: {}\n", invoice.account_no));
        output.push_str(&format!("B/L: {}\n", invoice.bill_no));
        if let Some(ship_via) = &invoice.ship_via {
            output.push_str(&format!("Ship via: {}\n", ship_via));
        }
        output.push('\n');

        output.push_str("Purchases:\n");
        for purchase in &invoice.list_of_purchases {
            let code = purchase
                .product_code
                .map(|c| format!(" ({c})"))
                .unwrap_or_default();
            output.push_str(&format!(
                "  {}{}: {} x {} = {}\n",
                purchase.gas_type_name,
                code,
                format_amount(purchase.quantity),
                purchase.price,
                format_amount(purchase.total)
            ));
        }
        output.push_str(&format!("Total: {}\n\n", format_amount(invoice.total_amount)));
    }

    output
}
