use reqwest::StatusCode;
use thiserror::Error;

/// Errors produced by the dashboard's fetch-and-render pipeline.
///
/// Every chain in the poll loop catches these at its outer boundary, logs them,
/// and skips only that chain for the current cycle. Nothing here is fatal to
/// the loop itself.
#[derive(Error, Debug)]
pub enum DashError {
    #[error("transport failure for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {url} returned HTTP {status}")]
    HttpStatus { url: String, status: StatusCode },
    #[error("malformed response from {url}: {reason}")]
    MalformedResponse { url: String, reason: String },
    #[error("empty dataset: {0}")]
    EmptyDataset(&'static str),
}
