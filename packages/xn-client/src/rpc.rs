//! REST API provider.
//!
//! Queries run once; broadcasts retry transient HTTP failures with
//! exponential backoff.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as B64, Engine};
use serde::{Deserialize, Serialize};
use std::sync::atomic::Ordering;
use std::time::Duration;
use tracing::{debug, warn};
use xn_types::Address;

use crate::metrics::METRICS;
use crate::provider::{
    AccountOnNetwork, ContractQuery, NetworkProvider, QueryResponse, TransactionOnNetwork,
    TransactionStatus,
};
use crate::transaction::Transaction;
use crate::Error;

/// Max broadcast attempts.
const MAX_RETRIES: u32 = 3;
/// Base delay for exponential backoff (ms).
const BASE_DELAY_MS: u64 = 200;

fn is_retryable(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 408 | 429 | 500 | 502 | 503 | 504)
}

/// Retry delay for attempt n (0-indexed).
pub fn retry_delay(attempt: u32) -> Duration {
    Duration::from_millis(BASE_DELAY_MS * 2u64.pow(attempt))
}

// --- REST API types ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest {
    sc_address: String,
    func_name: String,
    args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    caller: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponseBody {
    #[serde(default)]
    return_data: Option<Vec<Option<String>>>,
    #[serde(default)]
    return_code: String,
    #[serde(default)]
    return_message: String,
}

#[derive(Deserialize)]
struct AccountBody {
    #[serde(default)]
    nonce: u64,
    #[serde(default)]
    balance: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendResponse {
    tx_hash: String,
}

#[derive(Deserialize)]
struct StatusBody {
    status: String,
}

/// Provider for the public MultiversX REST API.
pub struct ApiProvider {
    http: reqwest::Client,
    base_url: String,
}

impl ApiProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("HTTP client build failed: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        kind: fn(String) -> Error,
    ) -> Result<T, Error> {
        let response = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| kind(format!("GET {path} failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(kind(format!("GET {path} HTTP {status}: {body}")));
        }
        response
            .json()
            .await
            .map_err(|e| kind(format!("GET {path} parse error: {e}")))
    }
}

#[async_trait]
impl NetworkProvider for ApiProvider {
    async fn query_contract(&self, query: &ContractQuery) -> Result<QueryResponse, Error> {
        let request = QueryRequest {
            sc_address: query.address.to_bech32(),
            func_name: query.function.clone(),
            args: query.args.iter().map(hex::encode).collect(),
            caller: query.caller.map(|c| c.to_bech32()),
        };
        debug!(function = %query.function, args = request.args.len(), "Querying contract");

        let response = self
            .http
            .post(self.url("query"))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Query(format!("{} request failed: {e}", query.function)))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Query(format!("{} HTTP {status}: {body}", query.function)));
        }
        let body: QueryResponseBody = response
            .json()
            .await
            .map_err(|e| Error::Query(format!("{} parse error: {e}", query.function)))?;

        let return_data = body
            .return_data
            .unwrap_or_default()
            .into_iter()
            .map(|item| match item {
                Some(b64) => B64
                    .decode(b64)
                    .map_err(|e| Error::Query(format!("returnData base64: {e}"))),
                None => Ok(Vec::new()),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(QueryResponse {
            return_data,
            return_code: body.return_code,
            return_message: body.return_message,
        })
    }

    async fn get_account(&self, address: &Address) -> Result<AccountOnNetwork, Error> {
        let body: AccountBody = self
            .get_json(&format!("accounts/{}", address.to_bech32()), Error::Transaction)
            .await?;
        let balance: u128 = if body.balance.is_empty() {
            0
        } else {
            body.balance
                .parse()
                .map_err(|e| Error::Transaction(format!("account balance: {e}")))?
        };
        Ok(AccountOnNetwork {
            address: *address,
            nonce: body.nonce,
            balance,
        })
    }

    async fn send_transaction(&self, tx: &Transaction) -> Result<String, Error> {
        let body = tx.to_broadcast_json()?;
        let mut last_err = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                tokio::time::sleep(retry_delay(attempt - 1)).await;
            }

            let response = match self.http.post(self.url("transactions")).json(&body).send().await {
                Ok(r) => r,
                Err(e) => {
                    warn!(attempt, error = %e, "Broadcast request failed (retrying)");
                    METRICS.broadcast_retries.fetch_add(1, Ordering::Relaxed);
                    last_err = Some(Error::Transaction(format!("broadcast failed: {e}")));
                    continue;
                }
            };

            let status = response.status();
            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                if is_retryable(status) && attempt + 1 < MAX_RETRIES {
                    warn!(attempt, status = %status, "Broadcast transient error (retrying)");
                    METRICS.broadcast_retries.fetch_add(1, Ordering::Relaxed);
                    last_err = Some(Error::Transaction(format!("broadcast HTTP {status}: {text}")));
                    continue;
                }
                return Err(Error::Transaction(format!("broadcast HTTP {status}: {text}")));
            }

            let sent: SendResponse = response
                .json()
                .await
                .map_err(|e| Error::Transaction(format!("broadcast parse error: {e}")))?;
            return Ok(sent.tx_hash);
        }

        Err(last_err.unwrap_or_else(|| Error::Transaction("broadcast failed".into())))
    }

    async fn get_transaction_status(&self, hash: &str) -> Result<TransactionStatus, Error> {
        let body: StatusBody = self
            .get_json(&format!("transactions/{hash}?fields=status"), Error::Transaction)
            .await?;
        Ok(TransactionStatus::parse(&body.status))
    }

    async fn get_transaction(&self, hash: &str) -> Result<TransactionOnNetwork, Error> {
        let raw: serde_json::Value = self
            .get_json(&format!("transactions/{hash}"), Error::Transaction)
            .await?;
        let status = raw
            .get("status")
            .and_then(|s| s.as_str())
            .map(TransactionStatus::parse)
            .unwrap_or(TransactionStatus::Pending);
        Ok(TransactionOnNetwork {
            hash: hash.to_string(),
            status,
            raw,
        })
    }
}
