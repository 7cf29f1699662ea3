use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use xn_client::provider::{
    AccountOnNetwork, ContractQuery, NetworkProvider, QueryResponse, TransactionOnNetwork,
    TransactionStatus,
};
use xn_client::transaction::Transaction;
use xn_client::{ClientContext, Config, ContractHandle, Error, UserSigner};
use xn_types::Address;

pub const CONTRACT: &str = "erd1qqqqqqqqqqqqqpgqev7w2j8e54tvnzc2rtj6v7mxqdy5lam0vycseduvnh";
pub const ALICE: &str = "erd1qyu5wthldzr8wx5c9ucg8kjagg0jfs53s8nr3zpz3hypefsdd8ssycr6th";
pub const BOB: &str = "erd1spyavw0956vq68xj8y4tenjpq2wd5a9p2c6j8gsz7ztyrnpxrruqzu66jx";
pub const NFT_ID: &str = "XNDOMAIN-a1b2c3";

/// In-memory network: canned query answers, recorded broadcasts, scripted
/// status polls.
pub struct FakeProvider {
    pub account_nonce: u64,
    responses: Mutex<HashMap<String, QueryResponse>>,
    pub queries: Mutex<Vec<ContractQuery>>,
    pub sent: Mutex<Vec<Transaction>>,
    statuses: Mutex<VecDeque<TransactionStatus>>,
    final_status: Mutex<TransactionStatus>,
    broadcast_failures: AtomicU32,
    pub account_fetches: AtomicU32,
}

impl FakeProvider {
    pub fn new(account_nonce: u64) -> Self {
        Self {
            account_nonce,
            responses: Mutex::new(HashMap::new()),
            queries: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            statuses: Mutex::new(VecDeque::new()),
            final_status: Mutex::new(TransactionStatus::Success),
            broadcast_failures: AtomicU32::new(0),
            account_fetches: AtomicU32::new(0),
        }
    }

    /// Answer `function` with these return buffers.
    pub fn respond(&self, function: &str, return_data: Vec<Vec<u8>>) {
        self.respond_with(
            function,
            QueryResponse {
                return_data,
                return_code: "ok".into(),
                return_message: String::new(),
            },
        );
    }

    pub fn respond_with(&self, function: &str, response: QueryResponse) {
        self.responses
            .lock()
            .unwrap()
            .insert(function.to_string(), response);
    }

    /// Statuses returned by successive polls before `final_status`.
    pub fn script_statuses(&self, statuses: impl IntoIterator<Item = TransactionStatus>) {
        self.statuses.lock().unwrap().extend(statuses);
    }

    pub fn set_final_status(&self, status: TransactionStatus) {
        *self.final_status.lock().unwrap() = status;
    }

    /// Reject the next `n` broadcasts.
    pub fn fail_broadcasts(&self, n: u32) {
        self.broadcast_failures.store(n, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<Transaction> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_sent(&self) -> Transaction {
        self.sent
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no transaction was sent")
    }
}

#[async_trait]
impl NetworkProvider for FakeProvider {
    async fn query_contract(&self, query: &ContractQuery) -> Result<QueryResponse, Error> {
        self.queries.lock().unwrap().push(query.clone());
        Ok(self
            .responses
            .lock()
            .unwrap()
            .get(&query.function)
            .cloned()
            .unwrap_or_else(|| QueryResponse {
                return_data: vec![],
                return_code: "ok".into(),
                return_message: String::new(),
            }))
    }

    async fn get_account(&self, address: &Address) -> Result<AccountOnNetwork, Error> {
        self.account_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(AccountOnNetwork {
            address: *address,
            nonce: self.account_nonce,
            balance: 10u128.pow(18),
        })
    }

    async fn send_transaction(&self, tx: &Transaction) -> Result<String, Error> {
        if self
            .broadcast_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(Error::Transaction("broadcast HTTP 400: lowerNonceInTx".into()));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(tx.clone());
        Ok(format!("hash-{}", sent.len()))
    }

    async fn get_transaction_status(&self, _hash: &str) -> Result<TransactionStatus, Error> {
        let next = self.statuses.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| self.final_status.lock().unwrap().clone()))
    }

    async fn get_transaction(&self, hash: &str) -> Result<TransactionOnNetwork, Error> {
        Ok(TransactionOnNetwork {
            hash: hash.to_string(),
            status: self.final_status.lock().unwrap().clone(),
            raw: serde_json::json!({ "txHash": hash }),
        })
    }
}

/// Config with instant polling and a short completion timeout.
pub fn test_config() -> Config {
    Config {
        api_url: "http://localhost:7950".into(),
        contract_address: CONTRACT.into(),
        chain_id: "D".into(),
        poll_interval_secs: 0,
        completion_timeout_secs: 1,
        ..Config::default()
    }
}

pub fn wallet() -> UserSigner {
    UserSigner::from_secret([42u8; 32])
}

pub fn contract_address() -> Address {
    CONTRACT.parse().expect("valid contract address")
}

/// Context over a fake network with a loaded wallet.
pub fn setup(account_nonce: u64) -> ClientContext<FakeProvider> {
    ClientContext::new(
        test_config(),
        FakeProvider::new(account_nonce),
        ContractHandle::new(contract_address()),
    )
    .with_signer(wallet())
}

/// `func@hex@hex` → `("func", [bytes, bytes])`.
pub fn split_data(data: &[u8]) -> Result<(String, Vec<Vec<u8>>)> {
    let text = std::str::from_utf8(data)?;
    let mut parts = text.split('@');
    let function = parts.next().unwrap_or_default().to_string();
    let args = parts
        .map(hex::decode)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok((function, args))
}
