//! Everything one client session needs, passed explicitly.

use std::sync::atomic::Ordering;
use std::time::Instant;
use tracing::{info, warn};
use xn_types::{encode_arguments, AbiRecord, Address, Domain, Reservation, SchemaRegistry, Value};

use crate::config::Config;
use crate::metrics::METRICS;
use crate::provider::{
    ContractQuery, NetworkProvider, QueryResponse, TransactionOnNetwork, TransactionStatus,
};
use crate::signer::UserSigner;
use crate::transaction::{ContractCall, Transaction, TRANSACTION_VERSION};
use crate::watcher::TransactionWatcher;
use crate::Error;

/// Local record schemas paired with the ABI struct names they mirror.
const ABI_STRUCT_NAMES: &[&str] = &["DomainName", "Reservation"];

/// The registry contract: its address and, when loaded, its ABI.
#[derive(Debug, Clone)]
pub struct ContractHandle {
    address: Address,
    abi: Option<SchemaRegistry>,
}

impl ContractHandle {
    pub fn new(address: Address) -> Self {
        if !address.is_smart_contract() {
            warn!(%address, "Contract address is a user account");
        }
        Self { address, abi: None }
    }

    /// Attach the ABI. Local record layouts that disagree with it are logged.
    pub fn with_abi(mut self, abi: SchemaRegistry) -> Self {
        let locals = [Domain::schema(), Reservation::schema()];
        for (local, abi_name) in locals.into_iter().zip(ABI_STRUCT_NAMES) {
            if abi.get(abi_name).is_none() {
                continue;
            }
            if let Err(e) = abi.verify(local, abi_name) {
                warn!(schema = local.name(), abi = %abi_name, error = %e, "Local schema differs from ABI");
            }
        }
        for name in abi.unsupported_endpoints() {
            warn!(endpoint = %name, "ABI endpoint uses types the client cannot encode");
        }
        self.abi = Some(abi);
        self
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn abi(&self) -> Option<&SchemaRegistry> {
        self.abi.as_ref()
    }

    /// Validate arguments against the ABI's endpoint, when both are known.
    pub fn check_call(&self, function: &str, args: &[Value]) -> Result<(), Error> {
        if let Some(endpoint) = self.abi.as_ref().and_then(|abi| abi.endpoint(function)) {
            endpoint.check_arguments(args)?;
        }
        Ok(())
    }
}

/// Config, provider, wallet, contract and the locally tracked account nonce.
pub struct ClientContext<P: NetworkProvider> {
    config: Config,
    provider: P,
    signer: Option<UserSigner>,
    contract: ContractHandle,
    nonce: Option<u64>,
}

impl<P: NetworkProvider> ClientContext<P> {
    pub fn new(config: Config, provider: P, contract: ContractHandle) -> Self {
        Self {
            config,
            provider,
            signer: None,
            contract,
            nonce: None,
        }
    }

    pub fn with_signer(mut self, signer: UserSigner) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn contract(&self) -> &ContractHandle {
        &self.contract
    }

    pub fn signer(&self) -> Result<&UserSigner, Error> {
        self.signer
            .as_ref()
            .ok_or_else(|| Error::Signing("no wallet loaded".into()))
    }

    /// Top-level argument buffers, checked against the ABI first.
    pub fn encode_call(&self, function: &str, args: &[Value]) -> Result<ContractCall, Error> {
        self.contract.check_call(function, args)?;
        Ok(ContractCall::new(function, encode_arguments(args)?))
    }

    /// Run a read-only endpoint. A non-`ok` return code is an error.
    pub async fn query(&self, function: &str, args: &[Value]) -> Result<QueryResponse, Error> {
        let call = self.encode_call(function, args)?;
        let query = ContractQuery {
            address: *self.contract.address(),
            function: call.function,
            args: call.args,
            caller: self.signer.as_ref().map(|s| *s.address()),
        };
        METRICS.queries_total.fetch_add(1, Ordering::Relaxed);
        let response = self.provider.query_contract(&query).await.inspect_err(|_| {
            METRICS.query_errors.fetch_add(1, Ordering::Relaxed);
        })?;
        if !response.is_success() {
            METRICS.query_errors.fetch_add(1, Ordering::Relaxed);
            return Err(Error::Query(format!(
                "{function}: {} {}",
                response.return_code, response.return_message
            )));
        }
        Ok(response)
    }

    /// Next nonce for the wallet: fetched once, then counted locally.
    pub async fn next_nonce(&mut self) -> Result<u64, Error> {
        let nonce = match self.nonce {
            Some(n) => n,
            None => {
                let address = *self.signer()?.address();
                self.provider.get_account(&address).await?.nonce
            }
        };
        self.nonce = Some(nonce + 1);
        Ok(nonce)
    }

    /// Sign, broadcast and await a call to the registry contract.
    pub async fn execute(&mut self, call: ContractCall) -> Result<TransactionOnNetwork, Error> {
        let contract = *self.contract.address();
        self.send(call, contract).await
    }

    /// Sign, broadcast and await `call` addressed to `destination`.
    pub async fn send(
        &mut self,
        call: ContractCall,
        destination: Address,
    ) -> Result<TransactionOnNetwork, Error> {
        let nonce = self.next_nonce().await?;
        let signer = self.signer()?;
        let sender = *signer.address();

        let mut tx = Transaction {
            nonce,
            value: call.value,
            receiver: call.receiver(&sender, &destination),
            sender,
            gas_price: self.config.gas_price,
            gas_limit: self.config.gas_limit,
            data: call.data(&destination).into_bytes(),
            chain_id: self.config.chain_id.clone(),
            version: TRANSACTION_VERSION,
            signature: None,
        };
        tx.sign(signer)?;

        let label = if call.function.is_empty() {
            "transfer"
        } else {
            call.function.as_str()
        };
        let start = Instant::now();
        METRICS.tx_total.fetch_add(1, Ordering::Relaxed);

        let sent = self.provider.send_transaction(&tx).await;
        let hash = match sent {
            Ok(hash) => hash,
            Err(e) => {
                // The network never saw this nonce; refetch next time.
                self.nonce = None;
                METRICS.tx_error.fetch_add(1, Ordering::Relaxed);
                return Err(e);
            }
        };
        info!(tx = %hash, function = label, nonce, "Transaction sent");

        let watcher = TransactionWatcher::new(&self.provider)
            .with_timing(self.config.poll_interval(), self.config.completion_timeout());
        let completed = watcher.await_completed(&hash).await.inspect_err(|_| {
            METRICS.tx_error.fetch_add(1, Ordering::Relaxed);
        })?;
        METRICS.record_tx_duration(start);

        if completed.status == TransactionStatus::Success {
            METRICS.tx_success.fetch_add(1, Ordering::Relaxed);
            info!(tx = %hash, function = label, "Transaction completed");
            Ok(completed)
        } else {
            METRICS.tx_error.fetch_add(1, Ordering::Relaxed);
            Err(Error::Transaction(format!(
                "{label} ({hash}) ended with status {}",
                completed.status
            )))
        }
    }
}
