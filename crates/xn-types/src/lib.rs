//! Record schemas, binary codec and typed records for the xn domain registry.
//! No network or file I/O; usable from scripts, services and tests alike.

pub mod address;
pub mod codec;
pub mod domain;
mod error;
pub mod name;
pub mod registry;
pub mod reservation;
pub mod schema;
pub mod value;

pub use address::Address;
pub use codec::{decode_arguments, decode_top, encode_arguments, encode_nested, encode_top};
pub use domain::{
    decode_record, AbiRecord, Domain, DomainState, Profile, Record, RentalFee, Social, TextRecord,
    Wallets, TEXT_RECORD_KIND,
};
pub use error::SchemaError;
pub use registry::{EndpointDefinition, Mutability, SchemaRegistry};
pub use reservation::{
    build_reservation_batch, Clock, FixedClock, Reservation, ReservationEntry, SystemClock,
};
pub use schema::{CollectionKind, FieldDefinition, StructSchema, TypeSchema};
pub use value::{CollectionValue, StructValue, Value};
