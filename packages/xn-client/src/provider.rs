//! The network surface the client depends on.

use async_trait::async_trait;
use std::fmt;
use xn_types::Address;

use crate::transaction::Transaction;
use crate::Error;

/// Read-only contract call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractQuery {
    pub address: Address,
    pub function: String,
    pub args: Vec<Vec<u8>>,
    pub caller: Option<Address>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResponse {
    pub return_data: Vec<Vec<u8>>,
    pub return_code: String,
    pub return_message: String,
}

impl QueryResponse {
    pub fn is_success(&self) -> bool {
        self.return_code == "ok"
    }

    /// First returned buffer; empty when the contract returned nothing.
    pub fn first(&self) -> &[u8] {
        self.return_data.first().map(Vec::as_slice).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountOnNetwork {
    pub address: Address,
    pub nonce: u64,
    pub balance: u128,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Success,
    Fail,
    Invalid,
    Other(String),
}

impl TransactionStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "pending" | "received" | "partially-executed" => Self::Pending,
            "success" | "executed" => Self::Success,
            "fail" | "failed" => Self::Fail,
            "invalid" => Self::Invalid,
            other => Self::Other(other.to_string()),
        }
    }

    /// No further status change is expected.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Success | Self::Fail | Self::Invalid)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Success => f.write_str("success"),
            Self::Fail => f.write_str("fail"),
            Self::Invalid => f.write_str("invalid"),
            Self::Other(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionOnNetwork {
    pub hash: String,
    pub status: TransactionStatus,
    /// Full API payload (results, logs, ...).
    pub raw: serde_json::Value,
}

#[async_trait]
pub trait NetworkProvider: Send + Sync {
    async fn query_contract(&self, query: &ContractQuery) -> Result<QueryResponse, Error>;

    async fn get_account(&self, address: &Address) -> Result<AccountOnNetwork, Error>;

    /// Broadcast a signed transaction and return its hash.
    async fn send_transaction(&self, tx: &Transaction) -> Result<String, Error>;

    async fn get_transaction_status(&self, hash: &str) -> Result<TransactionStatus, Error>;

    async fn get_transaction(&self, hash: &str) -> Result<TransactionOnNetwork, Error>;
}
