//! Groups transactions by spending category and accumulates absolute amounts.

use std::collections::HashMap;
use std::str::FromStr;

use basiq_api::types::Transaction;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::error::SpendError;

/// Decimal places shown for averages.
pub const AVERAGE_SCALE: u32 = 3;

/// Which transaction's title a category displays when titles disagree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TitlePolicy {
    /// Keep the title of the first transaction seen for the code.
    #[default]
    FirstSeen,
    /// Overwrite the title with every transaction.
    LastSeen,
}

/// Running totals for one category code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryStatus {
    pub title: String,
    /// Every transaction with this code, including unparseable amounts.
    pub count: u64,
    /// Sum of absolute amounts.
    pub sum: Decimal,
    /// Transactions whose amount could not be parsed and counted as zero.
    pub parse_failures: u64,
}

impl CategoryStatus {
    fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            count: 0,
            sum: Decimal::ZERO,
            parse_failures: 0,
        }
    }

    /// `sum / count`, or `None` for an empty category.
    pub fn average(&self) -> Option<Decimal> {
        if self.count == 0 {
            return None;
        }
        Some(self.sum / Decimal::from(self.count))
    }

    /// Average rounded half away from zero to three decimal places.
    pub fn average_display(&self) -> Option<Decimal> {
        self.average().map(|avg| {
            avg.round_dp_with_strategy(AVERAGE_SCALE, RoundingStrategy::MidpointAwayFromZero)
        })
    }
}

/// Parses a string-encoded decimal amount. Accepts plain and scientific
/// notation, with surrounding whitespace.
pub fn parse_amount(raw: &str) -> Result<Decimal, SpendError> {
    let trimmed = raw.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| SpendError::AmountParse {
            amount: raw.to_string(),
        })
}

/// Result of an aggregation pass: per-code totals plus the number of
/// transactions left out for having no category code.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub categories: HashMap<String, CategoryStatus>,
    pub excluded: u64,
}

impl Summary {
    pub fn get(&self, code: &str) -> Option<&CategoryStatus> {
        self.categories.get(code)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Categories ordered by code, for stable output.
    pub fn sorted(&self) -> Vec<(&str, &CategoryStatus)> {
        let mut rows: Vec<_> = self
            .categories
            .iter()
            .map(|(code, status)| (code.as_str(), status))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(b.0));
        rows
    }

    /// Transactions counted in some category.
    pub fn transaction_count(&self) -> u64 {
        self.categories.values().map(|s| s.count).sum()
    }

    pub fn parse_failures(&self) -> u64 {
        self.categories.values().map(|s| s.parse_failures).sum()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    policy: TitlePolicy,
}

impl Aggregator {
    pub fn new(policy: TitlePolicy) -> Self {
        Self { policy }
    }

    /// Buckets transactions by category code.
    ///
    /// Transactions with an empty code are skipped entirely. An amount that
    /// does not parse still counts toward the category but adds zero.
    pub fn aggregate<'a, I>(&self, transactions: I) -> Summary
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut summary = Summary::default();

        for txn in transactions {
            let code = txn.category_code();
            if code.is_empty() {
                summary.excluded += 1;
                continue;
            }

            let status = summary
                .categories
                .entry(code.to_string())
                .or_insert_with(|| CategoryStatus::new(txn.category_title()));

            status.count += 1;
            if self.policy == TitlePolicy::LastSeen {
                status.title = txn.category_title().to_string();
            }

            match parse_amount(&txn.amount) {
                Ok(amount) => status.sum = status.sum.saturating_add(amount.abs()),
                Err(e) => {
                    status.parse_failures += 1;
                    tracing::warn!(code, "{}, counted as zero", e);
                }
            }
        }

        summary
    }
}
