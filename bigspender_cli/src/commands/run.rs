//! The `run` subcommand: the full connect-poll-fetch-aggregate flow.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use bigspender_lib::basiq_api::{DEFAULT_API_VERSION, DEFAULT_BASE_URL};
use bigspender_lib::{
    authenticate, Aggregator, CancellationToken, ClientConfig, ConfigFile, CredentialSource,
    Flow, PollConfig, Profile,
};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use super::parse_title_policy;
use crate::output::{print_summary, OutputFormat};

#[derive(Args)]
pub struct RunArgs {
    /// API base URL (default: config file, then https://au-api.basiq.io)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Value of the basiq-version header (default: config file, then 2.0)
    #[arg(long)]
    pub api_version: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 5)]
    pub timeout_secs: u64,

    /// JSON config file holding api_key
    #[arg(long, default_value = "config.json")]
    pub config: PathBuf,

    /// Environment variable checked for the API key before the config file
    #[arg(long, default_value = "API_KEY")]
    pub api_key_env: String,

    /// Wait between job polls in milliseconds (default: BIGSPENDER_POLL_INTERVAL_MS or 3000)
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Maximum number of job polls (default: BIGSPENDER_POLL_MAX_ATTEMPTS or 100)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_attempts: Option<u32>,

    /// Give up waiting for the job after this many seconds
    /// (default: BIGSPENDER_POLL_MAX_WAIT_SECS or 300)
    #[arg(long)]
    pub max_wait_secs: Option<u64>,

    /// Email of the user to create
    #[arg(long)]
    pub email: Option<String>,

    /// Mobile number of the user to create
    #[arg(long)]
    pub mobile: Option<String>,

    /// Bank login ID
    #[arg(long)]
    pub login_id: Option<String>,

    /// Bank password
    #[arg(long)]
    pub password: Option<String>,

    /// Institution to connect to
    #[arg(long)]
    pub institution: Option<String>,

    /// Category title to display when titles differ: first or last
    #[arg(long, default_value = "first")]
    pub title_policy: String,
}

impl RunArgs {
    fn poll_config(&self) -> PollConfig {
        let mut poll = PollConfig::from_env();
        if let Some(ms) = self.poll_interval_ms {
            poll.interval = Duration::from_millis(ms);
        }
        if let Some(n) = self.max_attempts {
            poll.max_attempts = n;
        }
        if let Some(secs) = self.max_wait_secs {
            poll.max_wait = Duration::from_secs(secs);
        }
        poll
    }

    fn profile(&self) -> Profile {
        let defaults = Profile::default();
        Profile {
            email: self.email.clone().unwrap_or(defaults.email),
            mobile: self.mobile.clone().unwrap_or(defaults.mobile),
            login_id: self.login_id.clone().unwrap_or(defaults.login_id),
            password: self.password.clone().unwrap_or(defaults.password),
            institution_id: self.institution.clone().unwrap_or(defaults.institution_id),
        }
    }

    fn client_config(&self, file: &ConfigFile) -> ClientConfig {
        ClientConfig {
            base_url: self
                .base_url
                .clone()
                .or_else(|| file.base_url.clone())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_version: self
                .api_version
                .clone()
                .or_else(|| file.api_version.clone())
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

pub async fn run(args: &RunArgs, format: &OutputFormat) -> Result<()> {
    let source = CredentialSource {
        env_var: args.api_key_env.clone(),
        config_path: args.config.clone(),
    };
    let creds = source.load()?;
    let config = args.client_config(&creds.config);
    let aggregator = Aggregator::new(parse_title_policy(&args.title_policy)?);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message("fetching access token");

    let result = async {
        let client = authenticate(&config, &creds.key, &cancel).await?;
        Flow::new(&client)
            .with_profile(args.profile())
            .with_poll_config(args.poll_config())
            .with_aggregator(aggregator)
            .run(&cancel, |stage| pb.set_message(stage.to_string()))
            .await
    }
    .await;
    pb.finish_and_clear();

    let report = result?;
    tracing::debug!(
        user = %report.user_id,
        job = %report.job_id,
        fetched = report.fetched,
        "Transactions fetched from {}",
        report.transactions_url
    );
    if report.summary.parse_failures() > 0 {
        eprintln!(
            "Note: {} transactions had unreadable amounts and were counted as zero.",
            report.summary.parse_failures()
        );
    }

    print_summary(&report.summary, format)
}
