use thiserror::Error;

/// Failures talking to, or interpreting answers from, the search backend.
///
/// Every variant is a query failure from the caller's point of view; none of
/// them are retried here.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("index \"{index}\" does not exist")]
    IndexNotFound { index: String },

    #[error("unexpected HTTP status {status} from {url}: {body}")]
    UnexpectedStatus {
        status: u16,
        url: String,
        body: String,
    },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed search hit at position {position}: {reason}")]
    MalformedHit { position: usize, reason: String },

    /// `failed`/`total` describe the rejected chunk. Documents from earlier
    /// chunks, `committed` of them, remain indexed.
    #[error("bulk insert rejected {failed} of {total} documents after {committed} were indexed")]
    BulkRejected {
        failed: usize,
        total: usize,
        committed: usize,
    },

    #[error("invalid search backend URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
