//! Reservation export on disk → owner-only batch transaction, and ABI-checked
//! calls.

use anyhow::Result;
use serde_json::json;
use xn_client::{files, ClientContext, ContractHandle, Error, PeriodUnit};
use xn_types::codec::decode_top;
use xn_types::name::YEAR_IN_SECONDS;
use xn_types::reservation::reservation_batch_type;
use xn_types::{AbiRecord, FixedClock, Reservation, SchemaError};

use crate::utils::{contract_address, split_data, test_config, wallet, FakeProvider, ALICE, BOB};

fn export() -> serde_json::Value {
    json!({
        "took": 3,
        "hits": {
            "total": { "value": 2 },
            "hits": [
                { "_id": "a", "_source": { "userName": "alice.mvx", "address": ALICE } },
                { "_id": "b", "_source": { "userName": "bob.mvx", "address": BOB } }
            ]
        }
    })
}

fn abi() -> serde_json::Value {
    json!({
        "name": "XnMain",
        "endpoints": [
            {
                "name": "register_or_renew",
                "mutability": "mutable",
                "payableInTokens": ["EGLD"],
                "inputs": [
                    { "name": "domain_name", "type": "bytes" },
                    { "name": "period", "type": "u64" },
                    { "name": "unit", "type": "PeriodType" },
                    { "name": "assign_to", "type": "optional<Address>", "multi_arg": true }
                ],
                "outputs": []
            },
            {
                "name": "accept",
                "mutability": "mutable",
                "inputs": [
                    { "name": "domain_name", "type": "bytes" },
                    { "name": "extra", "type": "u64" }
                ],
                "outputs": []
            }
        ],
        "types": {
            "PeriodType": {
                "type": "enum",
                "variants": [
                    { "name": "Minutes", "discriminant": 0 },
                    { "name": "Hours", "discriminant": 1 },
                    { "name": "Days", "discriminant": 2 },
                    { "name": "Months", "discriminant": 3 },
                    { "name": "Years", "discriminant": 4 }
                ]
            },
            "Reservation": {
                "type": "struct",
                "fields": [
                    { "name": "domain_name", "type": "bytes" },
                    { "name": "reserved_for", "type": "Address" },
                    { "name": "until", "type": "u64" }
                ]
            }
        }
    })
}

#[tokio::test]
async fn test_reservations_from_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("reservations.json");
    std::fs::write(&path, export().to_string())?;

    let entries = files::load_reservations(&path)?;
    assert_eq!(entries.len(), 2);

    let mut ctx = crate::utils::setup(0);
    ctx.set_reservations(&entries, &FixedClock(1_700_000_000))
        .await?;

    let (function, args) = split_data(&ctx.provider().last_sent().data)?;
    assert_eq!(function, "set_reservations");
    assert_eq!(args.len(), 1);

    let batch = decode_top(&args[0], &reservation_batch_type(2))?.into_collection()?;
    assert_eq!(batch.len(), 2);
    let reservations = batch
        .into_items()
        .into_iter()
        .map(Reservation::from_value)
        .collect::<Result<Vec<_>, _>>()?;
    assert_eq!(reservations[0].domain_name, "alice.mvx");
    assert_eq!(reservations[1].reserved_for.to_bech32(), BOB);
    for r in &reservations {
        assert_eq!(r.until, 1_700_000_000 + YEAR_IN_SECONDS);
    }
    Ok(())
}

#[tokio::test]
async fn test_empty_export_rejected() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("reservations.json");
    std::fs::write(&path, r#"{"hits":{"hits":[]}}"#)?;

    let entries = files::load_reservations(&path)?;
    let mut ctx = crate::utils::setup(0);
    assert!(matches!(
        ctx.set_reservations(&entries, &FixedClock(0)).await,
        Err(Error::Schema(SchemaError::EmptyBatch))
    ));
    assert!(ctx.provider().sent().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_abi_checked_calls() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("xn-main.abi.json");
    std::fs::write(&path, abi().to_string())?;

    let contract = ContractHandle::new(contract_address()).with_abi(files::load_abi(&path)?);
    assert!(contract.abi().is_some());
    let mut ctx = ClientContext::new(test_config(), FakeProvider::new(0), contract)
        .with_signer(wallet());

    // Matches the declared inputs, enum included.
    ctx.register_or_renew("marko1.mvx", 1, PeriodUnit::Years, None, 0)
        .await?;
    ctx.register_or_renew("marko2.mvx", 300, PeriodUnit::Days, None, 0)
        .await?;
    let (function, args) = split_data(&ctx.provider().last_sent().data)?;
    assert_eq!(function, "register_or_renew");
    assert_eq!(args[1], vec![0x01, 0x2c]);
    assert_eq!(args[2], vec![2]);

    // The ABI wants a second argument the client does not send.
    assert!(matches!(
        ctx.accept("marko1.mvx").await,
        Err(Error::Schema(SchemaError::ArityMismatch { expected: 2, found: 1 }))
    ));
    assert_eq!(ctx.provider().sent().len(), 2);

    // Endpoints the ABI does not describe pass through unchecked.
    ctx.revoke_accept_request("marko1.mvx").await?;
    Ok(())
}

#[tokio::test]
async fn test_local_reservation_layout_matches_abi() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("xn-main.abi.json");
    std::fs::write(&path, abi().to_string())?;
    let registry = files::load_abi(&path)?;
    registry.verify(Reservation::schema(), "Reservation")?;
    Ok(())
}
