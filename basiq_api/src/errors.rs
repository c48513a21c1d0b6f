//! Error types for the API client.

/// Errors that can occur when making API requests.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The request could not be sent or the response was not received.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The API returned a non-success status with a body snippet.
    #[error("Request failed with status {status}")]
    HttpStatus { status: u16, body: String },
    /// The response body was not valid JSON or lacked a required field.
    #[error("Failed to decode response: {0}")]
    Decode(String),
    /// A request URL could not be built from the base address.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl Error {
    /// Returns true when repeating the same request may succeed: the request
    /// never completed, the server throttled it, or the server failed.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Transport(_) => true,
            Error::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            Error::Decode(_) | Error::InvalidUrl(_) => false,
        }
    }
}
