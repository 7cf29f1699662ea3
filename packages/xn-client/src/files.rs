//! Local inputs: wallet PEM, contract ABI, reservation export.

use std::path::Path;
use tracing::info;
use xn_types::{ReservationEntry, SchemaError, SchemaRegistry};

use crate::signer::UserSigner;
use crate::Error;

fn read(path: &Path) -> Result<String, Error> {
    std::fs::read_to_string(path).map_err(|e| Error::File(format!("{}: {e}", path.display())))
}

pub fn load_signer(path: impl AsRef<Path>) -> Result<UserSigner, Error> {
    let path = path.as_ref();
    let signer = UserSigner::from_pem(&read(path)?)?;
    info!(path = %path.display(), address = %signer.address(), "Loaded wallet");
    Ok(signer)
}

pub fn load_abi(path: impl AsRef<Path>) -> Result<SchemaRegistry, Error> {
    let path = path.as_ref();
    SchemaRegistry::from_abi_json(&read(path)?).map_err(|e| match e {
        SchemaError::InvalidAbi(msg) => Error::File(format!("{}: {msg}", path.display())),
        other => Error::Schema(other),
    })
}

pub fn load_reservations(path: impl AsRef<Path>) -> Result<Vec<ReservationEntry>, Error> {
    let path = path.as_ref();
    let entries = ReservationEntry::from_export_json(&read(path)?)
        .map_err(|e| Error::File(format!("{}: {e}", path.display())))?;
    info!(path = %path.display(), count = entries.len(), "Loaded reservations");
    Ok(entries)
}
