use std::fmt;

use serde::{Deserialize, Serialize};

/// Server-side asynchronous task tracking a connection's data retrieval.
///
/// Every poll returns a fresh snapshot; snapshots are never merged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,

    #[serde(rename = "type", default)]
    pub job_type: String,

    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Job {
    /// Returns the first step with the given title, in the order the server
    /// listed them.
    pub fn find_step(&self, title: &str) -> Option<&Step> {
        self.steps.iter().find(|step| step.title == title)
    }
}

/// A named phase within a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub title: String,

    pub status: StepStatus,

    #[serde(default)]
    pub result: Option<StepResult>,
}

impl Step {
    /// The result link, if the server supplied a non-empty one.
    pub fn result_url(&self) -> Option<&str> {
        self.result
            .as_ref()
            .map(|r| r.url.as_str())
            .filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    #[serde(rename = "type", default)]
    pub result_type: String,

    #[serde(default)]
    pub url: String,
}

/// Progress of a job step. Only `success` and `failed` are terminal; any
/// status string the client does not know is kept verbatim and treated as
/// still running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StepStatus {
    Pending,
    InProgress,
    Success,
    Failed,
    Other(String),
}

impl StepStatus {
    pub fn as_str(&self) -> &str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::InProgress => "in-progress",
            StepStatus::Success => "success",
            StepStatus::Failed => "failed",
            StepStatus::Other(s) => s,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, StepStatus::Success | StepStatus::Failed)
    }
}

impl From<String> for StepStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => StepStatus::Pending,
            "in-progress" => StepStatus::InProgress,
            "success" => StepStatus::Success,
            "failed" => StepStatus::Failed,
            _ => StepStatus::Other(s),
        }
    }
}

impl From<StepStatus> for String {
    fn from(status: StepStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(title: &str, status: &str, url: Option<&str>) -> Step {
        Step {
            title: title.to_string(),
            status: StepStatus::from(status.to_string()),
            result: url.map(|u| StepResult {
                result_type: "link".to_string(),
                url: u.to_string(),
            }),
        }
    }

    #[test]
    fn find_step_prefers_first_match() {
        let job = Job {
            id: "j1".to_string(),
            job_type: "job".to_string(),
            steps: vec![
                step("verify-credentials", "success", None),
                step("retrieve-transactions", "pending", Some("/first")),
                step("retrieve-transactions", "success", Some("/second")),
            ],
        };

        let found = job.find_step("retrieve-transactions").unwrap();
        assert_eq!(found.result_url(), Some("/first"));
        assert!(job.find_step("retrieve-accounts").is_none());
    }

    #[test]
    fn unknown_status_is_kept_and_not_terminal() {
        let status = StepStatus::from("queued".to_string());
        assert_eq!(status, StepStatus::Other("queued".to_string()));
        assert!(!status.is_terminal());
        assert_eq!(status.to_string(), "queued");
    }

    #[test]
    fn only_success_and_failed_are_terminal() {
        assert!(StepStatus::Success.is_terminal());
        assert!(StepStatus::Failed.is_terminal());
        assert!(!StepStatus::Pending.is_terminal());
        assert!(!StepStatus::InProgress.is_terminal());
    }

    #[test]
    fn empty_result_url_is_treated_as_missing() {
        let s = step("retrieve-transactions", "success", Some(""));
        assert_eq!(s.result_url(), None);
    }
}
