//! Catalog client error types

use thiserror::Error;

/// Catalog fetch error
///
/// The display strings are consumer-facing: the listing engine forwards
/// them verbatim in its failure signal.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The endpoint URL is malformed
    #[error("Invalid URL")]
    InvalidEndpoint,

    /// Transport succeeded but the body was empty
    #[error("No data received")]
    NoData,

    /// Body present but does not parse into the product schema
    #[error("Failed to decode data")]
    Decode,

    /// DNS, connection or timeout failure
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Result type for catalog operations
pub type FetchResult<T> = Result<T, FetchError>;

// Unit variants compare by kind; transport errors compare by status code
// and failure class, the closest stable classification reqwest exposes.
impl PartialEq for FetchError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidEndpoint, Self::InvalidEndpoint)
            | (Self::NoData, Self::NoData)
            | (Self::Decode, Self::Decode) => true,
            (Self::Transport(a), Self::Transport(b)) => {
                a.status() == b.status()
                    && a.is_timeout() == b.is_timeout()
                    && a.is_connect() == b.is_connect()
                    && a.is_request() == b.is_request()
            }
            _ => false,
        }
    }
}
