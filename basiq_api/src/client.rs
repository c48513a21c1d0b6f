//! HTTP clients for the Basiq open-banking API.

use std::time::Duration;

use chrono::Utc;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

use crate::{
    types::{AccessToken, Job, NewConnection, NewUser, TokenResponse, TransactionList, User},
    Error,
};

/// Production API address.
pub const DEFAULT_BASE_URL: &str = "https://au-api.basiq.io";

/// Value sent in the `basiq-version` header.
pub const DEFAULT_API_VERSION: &str = "2.0";

/// Per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const VERSION_HEADER: &str = "basiq-version";
const TOKEN_SCOPE: &str = "SERVER_ACCESS";

/// Connection settings shared by [`TokenIssuer`] and [`Client`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_version: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Default settings pointed at a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    fn build(&self) -> Result<(reqwest::Client, Url), Error> {
        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::Transport(e)
            })?;
        let base_url = Url::parse(&self.base_url).map_err(|e| {
            tracing::error!("Invalid base URL {}: {}", self.base_url, e);
            Error::InvalidUrl(format!("{}: {}", self.base_url, e))
        })?;
        Ok((http, base_url))
    }
}

/// Exchanges a static API key for a short-lived bearer token.
pub struct TokenIssuer {
    http: reqwest::Client,
    base_url: Url,
    api_version: String,
}

impl TokenIssuer {
    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        let (http, base_url) = config.build()?;
        Ok(Self {
            http,
            base_url,
            api_version: config.api_version.clone(),
        })
    }

    /// Requests a server-access token. The key is sent as-is in a basic
    /// authorization header; it is already encoded by the issuer.
    pub async fn issue(&self, api_key: &str) -> Result<AccessToken, Error> {
        let url = resolve(&self.base_url, "/token")?;
        let resp = self
            .http
            .post(url)
            .header(AUTHORIZATION, format!("Basic {}", api_key))
            .header(VERSION_HEADER, &self.api_version)
            .form(&[("scope", TOKEN_SCOPE)])
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to request access token: {}", e);
                Error::Transport(e)
            })?;

        let body: TokenResponse = read_json(resp).await?;
        let token = AccessToken::from_response(body, Utc::now());
        tracing::debug!(expires_at = ?token.expires_at(), "access token issued");
        Ok(token)
    }
}

/// Authenticated client for the resource endpoints.
///
/// The token is fixed at construction; every request made through the client
/// carries it.
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
    api_version: String,
    token: AccessToken,
}

impl Client {
    pub fn new(config: &ClientConfig, token: AccessToken) -> Result<Self, Error> {
        let (http, base_url) = config.build()?;
        Ok(Self {
            http,
            base_url,
            api_version: config.api_version.clone(),
            token,
        })
    }

    /// Creates a client with a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str, token: AccessToken) -> Result<Self, Error> {
        Self::new(&ClientConfig::with_base_url(base_url), token)
    }

    fn request(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder, Error> {
        let url = resolve(&self.base_url, path)?;
        if self.token.is_expired(Utc::now()) {
            tracing::warn!(
                "Access token expired at {:?}, request to {} will likely be rejected",
                self.token.expires_at(),
                url.path()
            );
        }
        Ok(self
            .http
            .request(method, url)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", self.token.secret()))
            .header(VERSION_HEADER, &self.api_version))
    }

    async fn get<T>(&self, path: &str) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        let resp = self
            .request(Method::GET, path)?
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to get {}: {}", path, e);
                Error::Transport(e)
            })?;
        read_json(resp).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_vec(body).map_err(|e| Error::Decode(e.to_string()))?;
        let resp = self
            .request(Method::POST, path)?
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to post {}: {}", path, e);
                Error::Transport(e)
            })?;
        read_json(resp).await
    }

    /// Creates a user record and returns it with its server-assigned ID.
    pub async fn create_user(&self, user: &NewUser) -> Result<User, Error> {
        self.post("/users", user).await
    }

    /// Opens a bank connection for the user, which starts a job on the server.
    pub async fn create_connection(
        &self,
        user_id: &str,
        connection: &NewConnection,
    ) -> Result<Job, Error> {
        self.post(format!("/users/{}/connections", user_id).as_str(), connection)
            .await
    }

    /// Fetches a fresh snapshot of a job.
    pub async fn get_job(&self, job_id: &str) -> Result<Job, Error> {
        self.get(format!("/jobs/{}", job_id).as_str()).await
    }

    /// Fetches a transaction collection from a server-supplied link, which
    /// may be relative to the base URL or absolute.
    pub async fn get_transactions(&self, url: &str) -> Result<TransactionList, Error> {
        self.get(url).await
    }
}

fn resolve(base: &Url, path: &str) -> Result<Url, Error> {
    base.join(path).map_err(|e| {
        tracing::error!("Invalid URL constructed from {}: {}", path, e);
        Error::InvalidUrl(format!("{}: {}", path, e))
    })
}

async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    let body = resp.text().await.map_err(|e| {
        tracing::error!("Failed to read response body: {}", e);
        Error::Transport(e)
    })?;

    if !status.is_success() {
        let snippet = truncate_body(&body);
        tracing::error!("Request failed with status {}: {}", status, snippet);
        return Err(Error::HttpStatus {
            status: status.as_u16(),
            body: snippet,
        });
    }

    serde_json::from_str::<T>(&body).map_err(|e| {
        let snippet = truncate_body(&body);
        tracing::error!("Failed to parse resource: {} | body: {}", e, snippet);
        Error::Decode(e.to_string())
    })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated]", &body[..end])
}
