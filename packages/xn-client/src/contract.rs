//! Registry contract operations.

use tracing::info;
use xn_types::domain::text_records_value;
use xn_types::name::{
    parent_domain, primary_domain, validate_name, DAY_IN_SECONDS, HOUR_IN_SECONDS,
    MINUTE_IN_SECONDS, MONTH_IN_SECONDS, YEAR_IN_SECONDS,
};
use xn_types::reservation::build_reservation_batch;
use xn_types::{
    decode_top, AbiRecord, Address, Clock, CollectionKind, CollectionValue, Domain, DomainState,
    Profile, RentalFee, ReservationEntry, Social, TextRecord, TypeSchema, Value, Wallets,
};

use crate::context::ClientContext;
use crate::provider::{NetworkProvider, TransactionOnNetwork};
use crate::Error;

/// Unit of a registration period, sent as its one-byte discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[repr(u8)]
pub enum PeriodUnit {
    Minutes = 0,
    Hours = 1,
    Days = 2,
    Months = 3,
    Years = 4,
}

impl PeriodUnit {
    /// Length of one unit as the contract counts it (months are 30 days).
    pub fn seconds(self) -> u64 {
        match self {
            Self::Minutes => MINUTE_IN_SECONDS,
            Self::Hours => HOUR_IN_SECONDS,
            Self::Days => DAY_IN_SECONDS,
            Self::Months => MONTH_IN_SECONDS,
            Self::Years => YEAR_IN_SECONDS,
        }
    }
}

impl From<PeriodUnit> for Value {
    fn from(unit: PeriodUnit) -> Self {
        Value::U8(unit as u8)
    }
}

/// A domain owned by the wallet, with the NFT that proves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedDomain {
    pub domain: Domain,
    pub nft_id: String,
}

fn optional_address(address: Option<Address>) -> Value {
    Value::optional(address.map(Value::Address))
}

impl<P: NetworkProvider> ClientContext<P> {
    // --- Queries ---

    /// The stored record, or `None` when the name was never registered.
    pub async fn get_domain(&self, name: &str) -> Result<Option<Domain>, Error> {
        let response = self.query("get_domain_name", &[Value::text(name)]).await?;
        let bytes = response.first();
        if bytes.is_empty() {
            return Ok(None);
        }
        Ok(Some(Domain::decode(bytes)?))
    }

    pub async fn get_egld_usd_price(&self) -> Result<u128, Error> {
        let response = self.query("get_egld_usd_price", &[]).await?;
        Ok(decode_top(response.first(), &TypeSchema::BigUint)?.into_biguint()?)
    }

    pub async fn get_domain_nft_id(&self) -> Result<String, Error> {
        let response = self.query("get_domain_nft_id", &[]).await?;
        let id = decode_top(response.first(), &TypeSchema::TokenIdentifier)?.into_text()?;
        if id.is_empty() {
            return Err(Error::Query("domain NFT is not issued".into()));
        }
        Ok(id)
    }

    /// Address the name currently points at.
    pub async fn resolve(&self, name: &str) -> Result<Option<Address>, Error> {
        self.query_address("resolve", name).await
    }

    pub async fn get_owner_domain_name(&self, name: &str) -> Result<Option<Address>, Error> {
        self.query_address("get_owner_domain_name", name).await
    }

    async fn query_address(&self, function: &str, name: &str) -> Result<Option<Address>, Error> {
        let response = self.query(function, &[Value::text(name)]).await?;
        let bytes = response.first();
        if bytes.is_empty() {
            return Ok(None);
        }
        Ok(Some(Address::from_slice(bytes)?))
    }

    /// `None` for a name that was never registered.
    pub async fn domain_state(
        &self,
        name: &str,
        clock: &impl Clock,
    ) -> Result<Option<DomainState>, Error> {
        let domain = self.get_domain(name).await?;
        Ok(domain.map(|d| d.state(clock.now_secs())))
    }

    /// Value stored under `key` by `update_key_value`.
    pub async fn resolve_domain_name_key(
        &self,
        name: &str,
        key: &str,
    ) -> Result<Option<String>, Error> {
        let response = self
            .query("resolve_domain_name_key", &[Value::text(name), Value::text(key)])
            .await?;
        let bytes = response.first();
        if bytes.is_empty() {
            return Ok(None);
        }
        Ok(Some(decode_top(bytes, &TypeSchema::Bytes)?.into_text()?))
    }

    /// Account asked to `accept` a pending primary-address change.
    pub async fn get_accept_request(&self, name: &str) -> Result<Option<Address>, Error> {
        self.query_address("get_accept_request", name).await
    }

    /// Yearly EGLD price per name length, as set by `set_prices`.
    pub async fn get_prices_egld(&self) -> Result<Vec<u128>, Error> {
        let response = self.query("get_prices_egld", &[]).await?;
        response
            .return_data
            .iter()
            .map(|bytes| -> Result<u128, Error> {
                Ok(decode_top(bytes, &TypeSchema::BigUint)?.into_biguint()?)
            })
            .collect()
    }

    pub async fn get_prices_usd(&self) -> Result<Option<RentalFee>, Error> {
        let response = self.query("get_prices_usd", &[]).await?;
        let bytes = response.first();
        if bytes.is_empty() {
            return Ok(None);
        }
        Ok(Some(RentalFee::decode(bytes)?))
    }

    /// Record and NFT id for a name the caller must hold.
    pub async fn owned_domain(&self, name: &str) -> Result<OwnedDomain, Error> {
        let domain = self
            .get_domain(name)
            .await?
            .ok_or_else(|| Error::Query(format!("domain {name} is not registered")))?;
        let nft_id = self.get_domain_nft_id().await?;
        Ok(OwnedDomain { domain, nft_id })
    }

    // --- Transactions ---

    pub async fn register_or_renew(
        &mut self,
        name: &str,
        period: u64,
        unit: PeriodUnit,
        assign_to: Option<Address>,
        value: u128,
    ) -> Result<TransactionOnNetwork, Error> {
        let tlds: Vec<&str> = self.config().top_level_domains.iter().map(String::as_str).collect();
        validate_name(name, &tlds)?;
        let call = self
            .encode_call(
                "register_or_renew",
                &[
                    Value::text(name),
                    Value::U64(period),
                    unit.into(),
                    optional_address(assign_to),
                ],
            )?
            .with_value(value);
        info!(
            domain = name,
            period,
            unit = ?unit,
            seconds = period.saturating_mul(unit.seconds()),
            "Registering"
        );
        self.execute(call).await
    }

    /// Owner-only: hold names for the given registrants for a year.
    pub async fn set_reservations(
        &mut self,
        entries: &[ReservationEntry],
        clock: &impl Clock,
    ) -> Result<TransactionOnNetwork, Error> {
        let batch = build_reservation_batch(entries, clock)?;
        info!(count = batch.len(), "Submitting reservations");
        let call = self.encode_call("set_reservations", &[batch.into()])?;
        self.execute(call).await
    }

    /// Owner-only: yearly price per name length, shortest first.
    pub async fn set_prices(&mut self, prices: &[u128]) -> Result<TransactionOnNetwork, Error> {
        let items = prices.iter().map(|p| Value::BigUint(*p)).collect();
        let list = CollectionValue::new(CollectionKind::Unbounded, TypeSchema::BigUint, items)?;
        let call = self.encode_call("set_prices", &[list.into()])?;
        self.execute(call).await
    }

    /// Replace the profile and, when given, the social, text-record and
    /// wallet sections. An omitted section cannot precede a given one.
    pub async fn update_domain_profile(
        &mut self,
        name: &str,
        profile: &Profile,
        social: Option<&Social>,
        text_records: Option<&[TextRecord]>,
        wallets: Option<&Wallets>,
    ) -> Result<TransactionOnNetwork, Error> {
        let owned = self.owned_domain(name).await?;
        let args = [
            Value::text(name),
            profile.to_value()?,
            Value::optional(social.map(Social::to_value).transpose()?),
            Value::optional(text_records.map(text_records_value).transpose()?),
            Value::optional(wallets.map(Wallets::to_value).transpose()?),
        ];
        let call = self
            .encode_call("update_domain_profile", &args)?
            .with_nft(owned.nft_id, owned.domain.nft_nonce);
        self.execute(call).await
    }

    pub async fn register_sub_domain(
        &mut self,
        sub_domain: &str,
        address: Address,
        value: u128,
    ) -> Result<TransactionOnNetwork, Error> {
        // The NFT sits on the primary domain, however deep the parent is.
        let owner = parent_domain(sub_domain)
            .and_then(primary_domain)
            .ok_or_else(|| Error::Config(format!("{sub_domain} is not a subdomain")))?;
        let owned = self.owned_domain(owner).await?;
        let call = self
            .encode_call("register_sub_domain", &[Value::text(sub_domain), address.into()])?
            .with_value(value)
            .with_nft(owned.nft_id, owned.domain.nft_nonce);
        self.execute(call).await
    }

    /// Hand the domain NFT, and with it ownership, to another account.
    pub async fn transfer_domain(
        &mut self,
        name: &str,
        new_owner: Address,
    ) -> Result<TransactionOnNetwork, Error> {
        let owned = self.owned_domain(name).await?;
        info!(domain = name, to = %new_owner, "Transferring domain");
        let call =
            crate::transaction::ContractCall::nft_transfer(owned.nft_id, owned.domain.nft_nonce);
        self.send(call, new_owner).await
    }

    /// Point the name at `assign_to`, or clear it. Another account has to
    /// `accept` before the change takes effect.
    pub async fn update_primary_address(
        &mut self,
        name: &str,
        assign_to: Option<Address>,
    ) -> Result<TransactionOnNetwork, Error> {
        let owned = self.owned_domain(name).await?;
        let call = self
            .encode_call(
                "update_primary_address",
                &[Value::text(name), optional_address(assign_to)],
            )?
            .with_nft(owned.nft_id, owned.domain.nft_nonce);
        self.execute(call).await
    }

    /// Set `key` on the name, or clear it when `value` is `None`.
    pub async fn update_key_value(
        &mut self,
        name: &str,
        key: &str,
        value: Option<&str>,
    ) -> Result<TransactionOnNetwork, Error> {
        let call = self.encode_call(
            "update_key_value",
            &[
                Value::text(name),
                Value::text(key),
                Value::optional(value.map(Value::text)),
            ],
        )?;
        self.execute(call).await
    }

    pub async fn accept(&mut self, name: &str) -> Result<TransactionOnNetwork, Error> {
        let call = self.encode_call("accept", &[Value::text(name)])?;
        self.execute(call).await
    }

    pub async fn revoke_accept_request(
        &mut self,
        name: &str,
    ) -> Result<TransactionOnNetwork, Error> {
        let call = self.encode_call("revokeAcceptRequest", &[Value::text(name)])?;
        self.execute(call).await
    }
}
