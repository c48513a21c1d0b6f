//! Error types for the library layer.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Errors produced by the library layer, wrapping upstream API errors and
/// adding configuration, job and aggregation failures.
#[derive(Debug)]
pub enum SpendError {
    /// No API key was found in the environment or the config file.
    ConfigurationMissing(String),
    /// The config file exists but could not be read or decoded.
    ConfigurationInvalid { path: PathBuf, reason: String },
    /// An error from the underlying API client (transport or decode).
    Api(basiq_api::Error),
    /// The job snapshot has no step with the expected title.
    StepNotFound { title: String },
    /// The step succeeded but carried no result link.
    ResultMissing { title: String },
    /// The step reached the terminal failure status.
    JobFailed { url: Option<String> },
    /// The job did not finish within the configured bounds.
    Timeout { attempts: u32, elapsed: Duration },
    /// The run was cancelled while waiting.
    Cancelled,
    /// An amount field is not a decimal number. Recovered by the aggregator.
    AmountParse { amount: String },
}

impl SpendError {
    /// The failure artifact link of a failed job.
    pub fn failure_url(&self) -> Option<&str> {
        match self {
            Self::JobFailed { url } => url.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for SpendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigurationMissing(msg) => write!(f, "API key not configured: {}", msg),
            Self::ConfigurationInvalid { path, reason } => {
                write!(f, "Invalid config file {}: {}", path.display(), reason)
            }
            Self::Api(e) => write!(f, "API error: {}", e),
            Self::StepNotFound { title } => write!(f, "Job has no '{}' step", title),
            Self::ResultMissing { title } => {
                write!(f, "Job step '{}' succeeded without a result link", title)
            }
            Self::JobFailed { url: Some(url) } => {
                write!(f, "Transaction job failed on server (result: {})", url)
            }
            Self::JobFailed { url: None } => write!(f, "Transaction job failed on server"),
            Self::Timeout { attempts, elapsed } => write!(
                f,
                "Job did not finish after {} polls ({:.1}s)",
                attempts,
                elapsed.as_secs_f64()
            ),
            Self::Cancelled => write!(f, "Cancelled"),
            Self::AmountParse { amount } => write!(f, "Invalid amount: {:?}", amount),
        }
    }
}

impl std::error::Error for SpendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }
}

impl From<basiq_api::Error> for SpendError {
    fn from(e: basiq_api::Error) -> Self {
        Self::Api(e)
    }
}
