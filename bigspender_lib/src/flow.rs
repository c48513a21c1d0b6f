//! End-to-end run: create a user, connect a bank, wait for the transaction
//! job, fetch the transactions and aggregate them. Every stage runs in
//! sequence on the caller's task.

use std::fmt;
use std::future::Future;

use basiq_api::types::{Institution, NewConnection, NewUser};
use basiq_api::{Client, ClientConfig, TokenIssuer};
use tokio_util::sync::CancellationToken;

use crate::aggregate::{Aggregator, Summary};
use crate::credentials::ApiKey;
use crate::error::SpendError;
use crate::poller::{JobPoller, PollConfig};

/// Exchanges the API key for a token and returns a client bound to it.
/// Cancelling the token aborts the in-flight token request.
pub async fn authenticate(
    config: &ClientConfig,
    key: &ApiKey,
    cancel: &CancellationToken,
) -> Result<Client, SpendError> {
    tracing::info!("Fetching access token from {}", config.base_url);
    let issuer = TokenIssuer::new(config)?;
    let token = cancellable(cancel, issuer.issue(key.expose())).await?;
    Ok(Client::new(config, token)?)
}

/// Identity of the remote user and the bank login to connect with.
#[derive(Clone)]
pub struct Profile {
    pub email: String,
    pub mobile: String,
    pub login_id: String,
    pub password: String,
    pub institution_id: String,
}

impl Default for Profile {
    /// Sandbox test user and institution.
    fn default() -> Self {
        Self {
            email: "gilfoyle@ppipper.com".to_string(),
            mobile: "+61410999666".to_string(),
            login_id: "gavinBelson".to_string(),
            password: "hooli2016".to_string(),
            institution_id: "AU00000".to_string(),
        }
    }
}

impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Profile")
            .field("email", &self.email)
            .field("mobile", &self.mobile)
            .field("login_id", &self.login_id)
            .field("password", &"<redacted>")
            .field("institution_id", &self.institution_id)
            .finish()
    }
}

impl Profile {
    fn new_user(&self) -> NewUser {
        NewUser {
            email: self.email.clone(),
            mobile: self.mobile.clone(),
        }
    }

    fn new_connection(&self) -> NewConnection {
        NewConnection {
            login_id: self.login_id.clone(),
            password: self.password.clone(),
            institution: Institution {
                id: self.institution_id.clone(),
            },
        }
    }
}

/// Progress markers reported while the flow runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CreatingUser,
    Connecting,
    WaitingForJob,
    FetchingTransactions,
    Aggregating,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::CreatingUser => "creating user",
            Stage::Connecting => "connecting to institution",
            Stage::WaitingForJob => "waiting for transactions job",
            Stage::FetchingTransactions => "fetching transactions",
            Stage::Aggregating => "aggregating",
        };
        f.write_str(s)
    }
}

#[derive(Debug)]
pub struct Report {
    pub user_id: String,
    pub job_id: String,
    pub transactions_url: String,
    /// Transactions returned by the server, before filtering.
    pub fetched: usize,
    pub summary: Summary,
}

pub struct Flow<'a> {
    client: &'a Client,
    profile: Profile,
    poll: PollConfig,
    aggregator: Aggregator,
}

impl<'a> Flow<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self {
            client,
            profile: Profile::default(),
            poll: PollConfig::default(),
            aggregator: Aggregator::default(),
        }
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    pub fn with_aggregator(mut self, aggregator: Aggregator) -> Self {
        self.aggregator = aggregator;
        self
    }

    /// Runs every stage in order. `on_stage` is called as each one starts.
    pub async fn run<O>(
        &self,
        cancel: &CancellationToken,
        mut on_stage: O,
    ) -> Result<Report, SpendError>
    where
        O: FnMut(Stage),
    {
        on_stage(Stage::CreatingUser);
        let user = cancellable(cancel, self.client.create_user(&self.profile.new_user())).await?;
        tracing::info!(user_id = %user.id, "Created user");

        on_stage(Stage::Connecting);
        let job = cancellable(
            cancel,
            self.client
                .create_connection(&user.id, &self.profile.new_connection()),
        )
        .await?;
        tracing::info!(
            job_id = %job.id,
            institution = %self.profile.institution_id,
            "Connection job started"
        );

        on_stage(Stage::WaitingForJob);
        let transactions_url = JobPoller::new(self.client, self.poll.clone())
            .wait_for_transactions(&job.id, cancel)
            .await?;

        on_stage(Stage::FetchingTransactions);
        let list = cancellable(cancel, self.client.get_transactions(&transactions_url)).await?;
        tracing::info!(count = list.data.len(), "Fetched transactions");

        on_stage(Stage::Aggregating);
        let summary = self.aggregator.aggregate(&list.data);
        if summary.excluded > 0 {
            tracing::info!(
                "{} transactions without a category code were left out",
                summary.excluded
            );
        }

        Ok(Report {
            user_id: user.id,
            job_id: job.id,
            transactions_url,
            fetched: list.data.len(),
            summary,
        })
    }
}

async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, SpendError>
where
    F: Future<Output = Result<T, basiq_api::Error>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(SpendError::Cancelled),
        res = fut => res.map_err(SpendError::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_debug_hides_password() {
        let rendered = format!("{:?}", Profile::default());
        assert!(!rendered.contains("hooli2016"));
        assert!(rendered.contains("gavinBelson"));
    }

    #[test]
    fn profile_builds_requests() {
        let profile = Profile::default();
        let conn = profile.new_connection();
        assert_eq!(conn.institution.id, "AU00000");
        assert_eq!(profile.new_user().email, "gilfoyle@ppipper.com");
    }

    #[test]
    fn stages_have_readable_names() {
        assert_eq!(Stage::WaitingForJob.to_string(), "waiting for transactions job");
    }
}
