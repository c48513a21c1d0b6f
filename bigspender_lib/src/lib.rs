//! Library layer for Big Spender: credential loading, job polling,
//! spending aggregation and the end-to-end connection flow.
//!
//! Wraps the `basiq_api` crate, which only knows how to talk HTTP, with the
//! control flow that turns a fresh bank connection into per-category totals.

pub mod aggregate;
pub mod credentials;
pub mod error;
pub mod flow;
pub mod poller;

pub use basiq_api;
pub use basiq_api::types;
pub use basiq_api::{Client, ClientConfig};

pub use aggregate::{parse_amount, Aggregator, CategoryStatus, Summary, TitlePolicy};
pub use credentials::{ApiKey, ConfigFile, CredentialSource, Credentials};
pub use error::SpendError;
pub use flow::{authenticate, Flow, Profile, Report, Stage};
pub use poller::{wait_for_step, JobPoller, PollConfig, RETRIEVE_TRANSACTIONS};
pub use tokio_util::sync::CancellationToken;
