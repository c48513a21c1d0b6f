//! The `summarize` subcommand: aggregate a saved transactions response offline.

use std::path::PathBuf;

use anyhow::{Context, Result};
use bigspender_lib::types::TransactionList;
use bigspender_lib::Aggregator;
use clap::Args;

use super::parse_title_policy;
use crate::output::{print_summary, OutputFormat};

#[derive(Args)]
pub struct SummarizeArgs {
    /// JSON body of a transactions response ({"type", "count", "size", "data"})
    pub file: PathBuf,

    /// Category title to display when titles differ: first or last
    #[arg(long, default_value = "first")]
    pub title_policy: String,
}

pub fn run(args: &SummarizeArgs, format: &OutputFormat) -> Result<()> {
    let raw = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let list: TransactionList = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a transactions response", args.file.display()))?;

    let aggregator = Aggregator::new(parse_title_policy(&args.title_policy)?);
    let summary = aggregator.aggregate(&list.data);
    tracing::debug!(
        categories = summary.len(),
        excluded = summary.excluded,
        "Summarized {} transactions",
        list.data.len()
    );

    print_summary(&summary, format)
}
