//! CLI subcommand implementations.

pub mod run;
pub mod summarize;

use anyhow::{bail, Result};
use bigspender_lib::TitlePolicy;

/// Maps `--title-policy` to the aggregator setting.
pub(crate) fn parse_title_policy(value: &str) -> Result<TitlePolicy> {
    match value.to_lowercase().as_str() {
        "first" | "first-seen" => Ok(TitlePolicy::FirstSeen),
        "last" | "last-seen" => Ok(TitlePolicy::LastSeen),
        other => bail!("unknown title policy '{}', expected 'first' or 'last'", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_policy_values() {
        assert_eq!(parse_title_policy("first").unwrap(), TitlePolicy::FirstSeen);
        assert_eq!(parse_title_policy("Last-Seen").unwrap(), TitlePolicy::LastSeen);
        assert!(parse_title_policy("middle").is_err());
    }
}
