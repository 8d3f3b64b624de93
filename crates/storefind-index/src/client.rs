//! HTTP client for an Elasticsearch-compatible search backend.
//!
//! Wraps `reqwest` with index-aware error mapping: a missing index surfaces as
//! [`IndexError::IndexNotFound`], any other non-2xx as
//! [`IndexError::UnexpectedStatus`]. Nothing is retried here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, RequestBuilder, StatusCode, Url};
use serde_json::Value;
use storefind_core::StoreRecord;

use crate::error::IndexError;
use crate::query::DISTANCE_FIELD;
use crate::schema::{store_mappings, GEO_FIELD};
use crate::{GeoIndex, NearestHit, NearestStoreQuery, QueryResult};

/// Documents sent per `_bulk` request.
pub const BULK_CHUNK_SIZE: usize = 500;

/// Longest error body kept in [`IndexError::UnexpectedStatus`].
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Client for a single store index on an Elasticsearch-compatible backend.
///
/// Use [`ElasticsearchIndex::new`] with the configured backend URL; tests
/// point the same constructor at a wiremock server.
pub struct ElasticsearchIndex {
    client: Client,
    base_url: Url,
    index: String,
}

impl ElasticsearchIndex {
    /// Creates a client for `index` on the backend at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`IndexError::InvalidBaseUrl`] if `base_url`
    /// is not a valid URL.
    pub fn new(
        base_url: &str,
        index: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, IndexError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so `Url::join` appends instead of
        // replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| IndexError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            index: index.to_owned(),
        })
    }

    #[must_use]
    pub fn index_name(&self) -> &str {
        &self.index
    }

    /// Creates the index with the store mapping.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::UnexpectedStatus`] if the index already exists or
    /// the mapping is rejected, [`IndexError::Http`] on network failure.
    pub async fn create_index(&self) -> Result<(), IndexError> {
        let url = self.endpoint(&self.index)?;
        self.send_json(self.client.put(url.clone()).json(&store_mappings()), &url)
            .await?;
        tracing::info!(index = %self.index, "created store index");
        Ok(())
    }

    /// Deletes the index. Returns `false` when it did not exist.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Http`] on network failure or
    /// [`IndexError::UnexpectedStatus`] for any non-404 failure status.
    pub async fn delete_index(&self) -> Result<bool, IndexError> {
        let url = self.endpoint(&self.index)?;
        match self.send_json(self.client.delete(url.clone()), &url).await {
            Ok(_) => {
                tracing::info!(index = %self.index, "deleted store index");
                Ok(true)
            }
            Err(IndexError::IndexNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Drops any existing index and creates it afresh with the store mapping.
    ///
    /// # Errors
    ///
    /// Propagates failures from [`Self::delete_index`] and [`Self::create_index`].
    pub async fn recreate_index(&self) -> Result<(), IndexError> {
        self.delete_index().await?;
        self.create_index().await
    }

    /// Inserts `records` through the `_bulk` API, [`BULK_CHUNK_SIZE`] at a time.
    ///
    /// Returns the number of documents accepted.
    ///
    /// # Errors
    ///
    /// - [`IndexError::BulkRejected`] if the backend reports per-document failures.
    ///   Loading stops at the rejected chunk; earlier chunks stay indexed and
    ///   are counted in `committed`, so the index is left partially loaded.
    /// - [`IndexError::Http`] / [`IndexError::UnexpectedStatus`] on transport failure.
    pub async fn bulk_insert(&self, records: &[StoreRecord]) -> Result<usize, IndexError> {
        let url = self.endpoint("_bulk")?;
        let action = serde_json::json!({ "index": { "_index": self.index } }).to_string();
        let mut accepted = 0usize;

        for chunk in records.chunks(BULK_CHUNK_SIZE) {
            let mut body = String::new();
            for record in chunk {
                let doc = serde_json::to_string(record).map_err(|e| IndexError::Deserialize {
                    context: format!("serializing store {:?}", record.name),
                    source: e,
                })?;
                body.push_str(&action);
                body.push('\n');
                body.push_str(&doc);
                body.push('\n');
            }

            let request = self
                .client
                .post(url.clone())
                .header(CONTENT_TYPE, "application/x-ndjson")
                .body(body);
            let response = self.send_json(request, &url).await?;

            if response.get("errors").and_then(Value::as_bool) == Some(true) {
                let failed = count_bulk_failures(&response);
                tracing::error!(
                    index = %self.index,
                    failed,
                    total = chunk.len(),
                    committed = accepted,
                    "bulk insert rejected documents"
                );
                return Err(IndexError::BulkRejected {
                    failed,
                    total: chunk.len(),
                    committed: accepted,
                });
            }
            accepted += chunk.len();
            tracing::debug!(index = %self.index, accepted, "bulk chunk indexed");
        }

        Ok(accepted)
    }

    /// Makes recently inserted documents visible to search.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::IndexNotFound`] if the index is missing.
    pub async fn refresh(&self) -> Result<(), IndexError> {
        let url = self.endpoint(&format!("{}/_refresh", self.index))?;
        self.send_json(self.client.post(url.clone()), &url).await?;
        Ok(())
    }

    /// Returns the backend's cluster health status (`green`, `yellow`, `red`).
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Http`] when the backend is unreachable.
    pub async fn cluster_status(&self) -> Result<String, IndexError> {
        let url = self.endpoint("_cluster/health")?;
        let body = self.send_json(self.client.get(url.clone()), &url).await?;
        Ok(body
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string())
    }

    fn endpoint(&self, path: &str) -> Result<Url, IndexError> {
        self.base_url
            .join(path)
            .map_err(|e| IndexError::InvalidBaseUrl {
                url: format!("{}{path}", self.base_url),
                reason: e.to_string(),
            })
    }

    /// Sends `request`, maps failure statuses, and parses the body as JSON.
    async fn send_json(&self, request: RequestBuilder, url: &Url) -> Result<Value, IndexError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::NOT_FOUND && is_index_not_found(&body) {
            return Err(IndexError::IndexNotFound {
                index: self.index.clone(),
            });
        }
        if !status.is_success() {
            return Err(IndexError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|e| IndexError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }
}

#[async_trait]
impl GeoIndex for ElasticsearchIndex {
    async fn nearest(&self, query: &NearestStoreQuery) -> Result<QueryResult, IndexError> {
        let url = self.endpoint(&format!("{}/_search", self.index))?;
        let body = query.to_search_body(GEO_FIELD);
        let response = self
            .send_json(self.client.post(url.clone()).json(&body), &url)
            .await?;

        let hits = parse_hits(&response, query.count())?;
        tracing::debug!(
            index = %self.index,
            requested = query.count(),
            returned = hits.len(),
            "nearest-store search completed"
        );
        Ok(QueryResult {
            unit: query.unit(),
            hits,
        })
    }

    async fn ping(&self) -> Result<(), IndexError> {
        let status = self.cluster_status().await?;
        tracing::debug!(status, "search backend reachable");
        Ok(())
    }
}

fn is_index_not_found(body: &str) -> bool {
    serde_json::from_str::<Value>(body).is_ok_and(|v| {
        v.pointer("/error/type").and_then(Value::as_str) == Some("index_not_found_exception")
    })
}

fn count_bulk_failures(response: &Value) -> usize {
    response
        .get("items")
        .and_then(Value::as_array)
        .map_or(0, |items| {
            items
                .iter()
                .filter(|item| item.pointer("/index/error").is_some())
                .count()
        })
}

/// Extracts `(source, score, distance)` from each search hit.
///
/// The backend already bounds the hit count; `limit` guards against one that
/// ignores `size`.
fn parse_hits(response: &Value, limit: usize) -> Result<Vec<NearestHit>, IndexError> {
    let Some(raw_hits) = response.pointer("/hits/hits").and_then(Value::as_array) else {
        return Err(IndexError::MalformedHit {
            position: 0,
            reason: "response has no hits.hits array".to_string(),
        });
    };

    raw_hits
        .iter()
        .take(limit)
        .enumerate()
        .map(|(position, hit)| {
            let malformed = |reason: String| IndexError::MalformedHit { position, reason };

            let source = hit
                .get("_source")
                .cloned()
                .ok_or_else(|| malformed("missing _source".to_string()))?;
            let store: StoreRecord = serde_json::from_value(source)
                .map_err(|e| malformed(format!("unreadable _source: {e}")))?;

            let distance = hit
                .pointer(&format!("/fields/{DISTANCE_FIELD}/0"))
                .and_then(Value::as_f64)
                .ok_or_else(|| malformed(format!("missing fields.{DISTANCE_FIELD}[0]")))?;
            let score = hit.get("_score").and_then(Value::as_f64).unwrap_or(0.0);

            Ok(NearestHit {
                store,
                score,
                distance,
            })
        })
        .collect()
}
