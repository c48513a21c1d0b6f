use std::fmt::Write as _;

use anyhow::{anyhow, bail, Result};
use bigspender_lib::Summary;
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

const SEPARATOR: &str = "-----------------------------------------------------";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Table,
    Json,
    Csv,
    Markdown,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Result<Self> {
        Ok(match value.to_lowercase().as_str() {
            "text" => OutputFormat::Text,
            "table" => OutputFormat::Table,
            "json" => OutputFormat::Json,
            "csv" => OutputFormat::Csv,
            "markdown" | "md" => OutputFormat::Markdown,
            other => bail!(
                "unknown output format '{}', expected text, table, json, csv or markdown",
                other
            ),
        })
    }
}

#[derive(Tabled, Serialize)]
struct CategoryRow {
    #[tabled(rename = "Code")]
    #[serde(rename = "Code")]
    code: String,
    #[tabled(rename = "Category")]
    #[serde(rename = "Category")]
    category: String,
    #[tabled(rename = "Transactions")]
    #[serde(rename = "Transactions")]
    transactions: u64,
    #[tabled(rename = "Average")]
    #[serde(rename = "Average")]
    average: String,
    #[tabled(rename = "Total")]
    #[serde(rename = "Total")]
    total: String,
    #[tabled(rename = "Unparsed")]
    #[serde(rename = "Unparsed")]
    unparsed: u64,
}

// -- Row builders --

fn build_category_rows(summary: &Summary) -> Vec<CategoryRow> {
    summary
        .sorted()
        .into_iter()
        .map(|(code, status)| CategoryRow {
            code: code.to_string(),
            category: status.title.clone(),
            transactions: status.count,
            average: format_amount(status.average_display()),
            total: status.sum.to_string(),
            unparsed: status.parse_failures,
        })
        .collect()
}

fn format_amount(value: Option<Decimal>) -> String {
    match value {
        Some(v) => format!("{:.3}", v),
        None => "-".to_string(),
    }
}

// -- Renderers --

/// The plain report: one block per category, averages to three places.
fn render_text(summary: &Summary) -> String {
    let mut out = String::new();
    out.push('\n');
    out.push_str("Hey, big spender:\n");
    for (_, status) in summary.sorted() {
        let _ = writeln!(out, "{}", SEPARATOR);
        let _ = writeln!(out, "Category: {}", status.title);
        let _ = writeln!(out, "Number of Transactions: {}", status.count);
        let _ = writeln!(out, "Average Amount: {}", format_amount(status.average_display()));
    }
    out
}

fn render_table(summary: &Summary) -> String {
    Table::new(build_category_rows(summary)).to_string()
}

fn render_markdown(summary: &Summary) -> String {
    let mut table = Table::new(build_category_rows(summary));
    table.with(Style::markdown());
    table.to_string()
}

fn render_csv(summary: &Summary) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for row in build_category_rows(summary) {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    let bytes = wtr
        .into_inner()
        .map_err(|e| anyhow!("failed to finish CSV output: {}", e.error()))?;
    Ok(String::from_utf8(bytes)?)
}

fn render_json(summary: &Summary) -> Result<String> {
    Ok(serde_json::to_string_pretty(&build_category_rows(summary))?)
}

pub fn render(summary: &Summary, format: &OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => render_text(summary),
        OutputFormat::Table => render_table(summary),
        OutputFormat::Markdown => render_markdown(summary),
        OutputFormat::Csv => render_csv(summary)?,
        OutputFormat::Json => render_json(summary)?,
    })
}

pub fn print_summary(summary: &Summary, format: &OutputFormat) -> Result<()> {
    let rendered = render(summary, format)?;
    if rendered.ends_with('\n') {
        print!("{}", rendered);
    } else {
        println!("{}", rendered);
    }
    Ok(())
}
