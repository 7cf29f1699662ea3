//! Domain record layout and its typed Rust counterparts.
//!
//! Schema names and field order follow the registry contract's storage
//! layout. `text_record` is declared as `Option<array1<textrecord>>`.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};

use crate::codec;
use crate::name::GRACE_PERIOD;
use crate::registry::SchemaRegistry;
use crate::reservation::Reservation;
use crate::schema::{CollectionKind, StructSchema, TypeSchema};
use crate::value::{CollectionValue, Fields, StructValue, Value};
use crate::SchemaError;

/// Collection kind of `Domain::text_record` for the deployed ABI revision.
pub const TEXT_RECORD_KIND: CollectionKind = CollectionKind::Fixed(1);

pub struct DomainSchemas {
    pub profile: Arc<StructSchema>,
    pub social: Arc<StructSchema>,
    pub text_record: Arc<StructSchema>,
    pub wallets: Arc<StructSchema>,
    pub domain: Arc<StructSchema>,
    pub rental_fee: Arc<StructSchema>,
}

static SCHEMAS: LazyLock<DomainSchemas> = LazyLock::new(|| {
    define_schemas().expect("built-in domain schemas are well-formed")
});

fn define_schemas() -> Result<DomainSchemas, SchemaError> {
    use TypeSchema::{Bytes, U64};

    let profile = StructSchema::define(
        "profile",
        [
            ("name", Bytes),
            ("avatar", Bytes),
            ("location", Bytes),
            ("website", Bytes),
            ("shortbio", Bytes),
        ],
    )?;
    let social = StructSchema::define(
        "social",
        [
            ("telegram", Bytes),
            ("discord", Bytes),
            ("twitter", Bytes),
            ("medium", Bytes),
            ("facebook", Bytes),
            ("other_link", Bytes),
        ],
    )?;
    let text_record =
        StructSchema::define("textrecord", [("name_value", Bytes), ("link", Bytes)])?;
    let wallets = StructSchema::define("wallets", [("egld", Bytes), ("btc", Bytes), ("eth", Bytes)])?;
    let domain = StructSchema::define(
        "domain",
        [
            ("name", Bytes),
            ("expires_at", U64),
            ("nft_nonce", U64),
            ("profile", TypeSchema::option(TypeSchema::Struct(Arc::clone(&profile)))),
            ("social_media", TypeSchema::option(TypeSchema::Struct(Arc::clone(&social)))),
            (
                "text_record",
                TypeSchema::option(TypeSchema::collection(
                    TEXT_RECORD_KIND,
                    TypeSchema::Struct(Arc::clone(&text_record)),
                )),
            ),
            ("wallets", TypeSchema::option(TypeSchema::Struct(Arc::clone(&wallets)))),
        ],
    )?;

    let rental_fee = StructSchema::define(
        "rentalfee",
        [
            ("one_letter", U64),
            ("two_letter", U64),
            ("three_letter", U64),
            ("four_letter", U64),
            ("other", U64),
        ],
    )?;

    Ok(DomainSchemas {
        profile,
        social,
        text_record,
        wallets,
        domain,
        rental_fee,
    })
}

pub fn schemas() -> &'static DomainSchemas {
    &SCHEMAS
}

/// `array1<textrecord>` (or whatever [`TEXT_RECORD_KIND`] says).
pub fn text_records_type() -> TypeSchema {
    TypeSchema::collection(
        TEXT_RECORD_KIND,
        TypeSchema::Struct(Arc::clone(&schemas().text_record)),
    )
}

/// Registry pre-populated with every built-in record schema.
pub fn registry() -> SchemaRegistry {
    let s = schemas();
    let mut reg = SchemaRegistry::new();
    for schema in [
        &s.profile,
        &s.social,
        &s.text_record,
        &s.wallets,
        &s.domain,
        &s.rental_fee,
    ] {
        reg.register(Arc::clone(schema));
    }
    reg.register(Arc::clone(Reservation::schema()));
    reg
}

/// A Rust struct with a fixed schema counterpart.
pub trait AbiRecord: Sized {
    fn schema() -> &'static Arc<StructSchema>;

    fn to_struct(&self) -> Result<StructValue, SchemaError>;

    fn from_fields(fields: &mut Fields) -> Result<Self, SchemaError>;

    fn schema_type() -> TypeSchema {
        TypeSchema::Struct(Arc::clone(Self::schema()))
    }

    fn to_value(&self) -> Result<Value, SchemaError> {
        self.to_struct().map(Value::Struct)
    }

    fn from_value(value: Value) -> Result<Self, SchemaError> {
        let value = value.into_struct()?;
        if !value.schema().matches(Self::schema()) {
            return Err(SchemaError::TypeMismatch {
                expected: Self::schema().name().to_string(),
                found: value.schema().name().to_string(),
            });
        }
        Self::from_fields(&mut value.into_fields())
    }

    fn encode(&self) -> Result<Vec<u8>, SchemaError> {
        codec::encode_top(&self.to_value()?)
    }

    fn decode(bytes: &[u8]) -> Result<Self, SchemaError> {
        Self::from_value(codec::decode_top(bytes, &Self::schema_type())?)
    }
}

fn text(fields: &mut Fields, name: &str) -> Result<String, SchemaError> {
    fields.take(name)?.into_text()
}

fn optional_record<T: AbiRecord>(fields: &mut Fields, name: &str) -> Result<Option<T>, SchemaError> {
    fields
        .take(name)?
        .into_option()?
        .map(T::from_value)
        .transpose()
}

fn option_value<T: AbiRecord>(record: &Option<T>) -> Result<Value, SchemaError> {
    Ok(match record {
        Some(r) => Value::some(r.to_value()?),
        None => Value::none(),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub avatar: String,
    pub location: String,
    pub website: String,
    pub shortbio: String,
}

impl AbiRecord for Profile {
    fn schema() -> &'static Arc<StructSchema> {
        &schemas().profile
    }

    fn to_struct(&self) -> Result<StructValue, SchemaError> {
        StructValue::new(
            Self::schema(),
            [
                ("name", Value::text(&self.name)),
                ("avatar", Value::text(&self.avatar)),
                ("location", Value::text(&self.location)),
                ("website", Value::text(&self.website)),
                ("shortbio", Value::text(&self.shortbio)),
            ],
        )
    }

    fn from_fields(fields: &mut Fields) -> Result<Self, SchemaError> {
        Ok(Self {
            name: text(fields, "name")?,
            avatar: text(fields, "avatar")?,
            location: text(fields, "location")?,
            website: text(fields, "website")?,
            shortbio: text(fields, "shortbio")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Social {
    pub telegram: String,
    pub discord: String,
    pub twitter: String,
    pub medium: String,
    pub facebook: String,
    pub other_link: String,
}

impl AbiRecord for Social {
    fn schema() -> &'static Arc<StructSchema> {
        &schemas().social
    }

    fn to_struct(&self) -> Result<StructValue, SchemaError> {
        StructValue::new(
            Self::schema(),
            [
                ("telegram", Value::text(&self.telegram)),
                ("discord", Value::text(&self.discord)),
                ("twitter", Value::text(&self.twitter)),
                ("medium", Value::text(&self.medium)),
                ("facebook", Value::text(&self.facebook)),
                ("other_link", Value::text(&self.other_link)),
            ],
        )
    }

    fn from_fields(fields: &mut Fields) -> Result<Self, SchemaError> {
        Ok(Self {
            telegram: text(fields, "telegram")?,
            discord: text(fields, "discord")?,
            twitter: text(fields, "twitter")?,
            medium: text(fields, "medium")?,
            facebook: text(fields, "facebook")?,
            other_link: text(fields, "other_link")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRecord {
    pub name_value: String,
    pub link: String,
}

impl AbiRecord for TextRecord {
    fn schema() -> &'static Arc<StructSchema> {
        &schemas().text_record
    }

    fn to_struct(&self) -> Result<StructValue, SchemaError> {
        StructValue::new(
            Self::schema(),
            [
                ("name_value", Value::text(&self.name_value)),
                ("link", Value::text(&self.link)),
            ],
        )
    }

    fn from_fields(fields: &mut Fields) -> Result<Self, SchemaError> {
        Ok(Self {
            name_value: text(fields, "name_value")?,
            link: text(fields, "link")?,
        })
    }
}

/// Bind text records to the [`TEXT_RECORD_KIND`] collection.
pub fn text_records_value(records: &[TextRecord]) -> Result<Value, SchemaError> {
    let items = records
        .iter()
        .map(TextRecord::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::Collection(CollectionValue::new(
        TEXT_RECORD_KIND,
        TextRecord::schema_type(),
        items,
    )?))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallets {
    pub egld: String,
    pub btc: String,
    pub eth: String,
}

impl AbiRecord for Wallets {
    fn schema() -> &'static Arc<StructSchema> {
        &schemas().wallets
    }

    fn to_struct(&self) -> Result<StructValue, SchemaError> {
        StructValue::new(
            Self::schema(),
            [
                ("egld", Value::text(&self.egld)),
                ("btc", Value::text(&self.btc)),
                ("eth", Value::text(&self.eth)),
            ],
        )
    }

    fn from_fields(fields: &mut Fields) -> Result<Self, SchemaError> {
        Ok(Self {
            egld: text(fields, "egld")?,
            btc: text(fields, "btc")?,
            eth: text(fields, "eth")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub name: String,
    pub expires_at: u64,
    pub nft_nonce: u64,
    pub profile: Option<Profile>,
    pub social_media: Option<Social>,
    pub text_record: Option<Vec<TextRecord>>,
    pub wallets: Option<Wallets>,
}

/// Where a registered name stands at a given moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainState {
    Active,
    /// Expired, but only the previous owner may renew.
    GracePeriod,
    Claimable,
}

impl Domain {
    /// Whether anyone may register the name at `now` (seconds).
    pub fn is_claimable(&self, now: u64) -> bool {
        now >= self.expires_at.saturating_add(GRACE_PERIOD)
    }

    pub fn is_expired(&self, now: u64) -> bool {
        self.expires_at < now
    }

    pub fn state(&self, now: u64) -> DomainState {
        if self.is_claimable(now) {
            DomainState::Claimable
        } else if self.is_expired(now) {
            DomainState::GracePeriod
        } else {
            DomainState::Active
        }
    }
}

impl AbiRecord for Domain {
    fn schema() -> &'static Arc<StructSchema> {
        &schemas().domain
    }

    fn to_struct(&self) -> Result<StructValue, SchemaError> {
        let text_record = match &self.text_record {
            Some(records) => Value::some(text_records_value(records)?),
            None => Value::none(),
        };
        StructValue::new(
            Self::schema(),
            [
                ("name", Value::text(&self.name)),
                ("expires_at", Value::U64(self.expires_at)),
                ("nft_nonce", Value::U64(self.nft_nonce)),
                ("profile", option_value(&self.profile)?),
                ("social_media", option_value(&self.social_media)?),
                ("text_record", text_record),
                ("wallets", option_value(&self.wallets)?),
            ],
        )
    }

    fn from_fields(fields: &mut Fields) -> Result<Self, SchemaError> {
        let text_record = fields
            .take("text_record")?
            .into_option()?
            .map(|v| {
                v.into_collection()?
                    .into_items()
                    .into_iter()
                    .map(TextRecord::from_value)
                    .collect::<Result<Vec<_>, SchemaError>>()
            })
            .transpose()?;
        Ok(Self {
            name: text(fields, "name")?,
            expires_at: fields.take("expires_at")?.into_u64()?,
            nft_nonce: fields.take("nft_nonce")?.into_u64()?,
            profile: optional_record(fields, "profile")?,
            social_media: optional_record(fields, "social_media")?,
            text_record,
            wallets: optional_record(fields, "wallets")?,
        })
    }
}

/// Yearly rent in USD by name length; names of five or more characters pay `other`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalFee {
    pub one_letter: u64,
    pub two_letter: u64,
    pub three_letter: u64,
    pub four_letter: u64,
    pub other: u64,
}

impl RentalFee {
    pub fn for_length(&self, len: usize) -> u64 {
        match len {
            1 => self.one_letter,
            2 => self.two_letter,
            3 => self.three_letter,
            4 => self.four_letter,
            _ => self.other,
        }
    }
}

impl AbiRecord for RentalFee {
    fn schema() -> &'static Arc<StructSchema> {
        &schemas().rental_fee
    }

    fn to_struct(&self) -> Result<StructValue, SchemaError> {
        StructValue::new(
            Self::schema(),
            [
                ("one_letter", Value::U64(self.one_letter)),
                ("two_letter", Value::U64(self.two_letter)),
                ("three_letter", Value::U64(self.three_letter)),
                ("four_letter", Value::U64(self.four_letter)),
                ("other", Value::U64(self.other)),
            ],
        )
    }

    fn from_fields(fields: &mut Fields) -> Result<Self, SchemaError> {
        Ok(Self {
            one_letter: fields.take("one_letter")?.into_u64()?,
            two_letter: fields.take("two_letter")?.into_u64()?,
            three_letter: fields.take("three_letter")?.into_u64()?,
            four_letter: fields.take("four_letter")?.into_u64()?,
            other: fields.take("other")?.into_u64()?,
        })
    }
}

/// A decoded record tagged by its schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Profile(Profile),
    Social(Social),
    TextRecord(TextRecord),
    Wallets(Wallets),
    Domain(Domain),
    Reservation(Reservation),
    RentalFee(RentalFee),
}

/// Decode a top-level buffer as the built-in record named `schema_name`.
pub fn decode_record(schema_name: &str, bytes: &[u8]) -> Result<Record, SchemaError> {
    Ok(match schema_name {
        "profile" => Record::Profile(Profile::decode(bytes)?),
        "social" => Record::Social(Social::decode(bytes)?),
        "textrecord" => Record::TextRecord(TextRecord::decode(bytes)?),
        "wallets" => Record::Wallets(Wallets::decode(bytes)?),
        "domain" => Record::Domain(Domain::decode(bytes)?),
        "reservation" => Record::Reservation(Reservation::decode(bytes)?),
        "rentalfee" => Record::RentalFee(RentalFee::decode(bytes)?),
        other => return Err(SchemaError::UnknownType(other.into())),
    })
}
