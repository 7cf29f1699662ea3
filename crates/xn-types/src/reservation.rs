//! Owner-only reservation batches.
//!
//! Registrants come from a search-index export shaped like
//! `{"hits": {"hits": [{"_source": {"userName": .., "address": ..}}]}}`.
//! Each entry becomes one `reservation` struct and the whole batch is sent as
//! a single fixed-length argument.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};

use crate::address::Address;
use crate::domain::AbiRecord;
use crate::name::YEAR_IN_SECONDS;
use crate::schema::{CollectionKind, StructSchema, TypeSchema};
use crate::value::{CollectionValue, Fields, StructValue, Value};
use crate::SchemaError;

/// How long a reservation holds a name.
pub const RESERVATION_PERIOD: u64 = YEAR_IN_SECONDS;

/// Source of the current Unix time in seconds.
pub trait Clock {
    fn now_secs(&self) -> u64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// Always returns the same instant; use it to stamp a whole batch alike.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now_secs(&self) -> u64 {
        self.0
    }
}

static RESERVATION_SCHEMA: LazyLock<Arc<StructSchema>> = LazyLock::new(|| {
    StructSchema::define(
        "reservation",
        [
            ("domain_name", TypeSchema::Bytes),
            ("reserved_for", TypeSchema::Address),
            ("until", TypeSchema::U64),
        ],
    )
    .expect("built-in reservation schema is well-formed")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub domain_name: String,
    pub reserved_for: Address,
    pub until: u64,
}

impl AbiRecord for Reservation {
    fn schema() -> &'static Arc<StructSchema> {
        &RESERVATION_SCHEMA
    }

    fn to_struct(&self) -> Result<StructValue, SchemaError> {
        StructValue::new(
            Self::schema(),
            [
                ("domain_name", Value::text(&self.domain_name)),
                ("reserved_for", Value::Address(self.reserved_for)),
                ("until", Value::U64(self.until)),
            ],
        )
    }

    fn from_fields(fields: &mut Fields) -> Result<Self, SchemaError> {
        Ok(Self {
            domain_name: fields.take("domain_name")?.into_text()?,
            reserved_for: fields.take("reserved_for")?.into_address()?,
            until: fields.take("until")?.into_u64()?,
        })
    }
}

/// One registrant from the export.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReservationEntry {
    #[serde(rename = "userName")]
    pub user_name: String,
    pub address: String,
}

#[derive(Deserialize)]
struct SearchExport {
    hits: SearchHits,
}

#[derive(Deserialize)]
struct SearchHits {
    hits: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    #[serde(rename = "_source")]
    source: ReservationEntry,
}

impl ReservationEntry {
    pub fn from_export_json(json: &str) -> Result<Vec<Self>, serde_json::Error> {
        let export: SearchExport = serde_json::from_str(json)?;
        Ok(export.hits.hits.into_iter().map(|h| h.source).collect())
    }
}

/// Turn entries into reservations expiring [`RESERVATION_PERIOD`] after
/// construction. The clock is read once per entry.
pub fn build_reservations(
    entries: &[ReservationEntry],
    clock: &impl Clock,
) -> Result<Vec<Reservation>, SchemaError> {
    if entries.is_empty() {
        return Err(SchemaError::EmptyBatch);
    }
    entries
        .iter()
        .map(|entry| {
            Ok(Reservation {
                domain_name: entry.user_name.clone(),
                reserved_for: Address::from_bech32(&entry.address)?,
                until: clock.now_secs().saturating_add(RESERVATION_PERIOD),
            })
        })
        .collect()
}

/// `arrayN<reservation>` with `N` equal to the batch size.
pub fn reservation_batch_type(len: usize) -> TypeSchema {
    TypeSchema::collection(CollectionKind::Fixed(len), Reservation::schema_type())
}

pub fn reservation_batch_value(reservations: &[Reservation]) -> Result<CollectionValue, SchemaError> {
    if reservations.is_empty() {
        return Err(SchemaError::EmptyBatch);
    }
    let items = reservations
        .iter()
        .map(Reservation::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    CollectionValue::new(
        CollectionKind::Fixed(items.len()),
        Reservation::schema_type(),
        items,
    )
}

/// Entries → one fixed-length collection argument.
pub fn build_reservation_batch(
    entries: &[ReservationEntry],
    clock: &impl Clock,
) -> Result<CollectionValue, SchemaError> {
    reservation_batch_value(&build_reservations(entries, clock)?)
}
