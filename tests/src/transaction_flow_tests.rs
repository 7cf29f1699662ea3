//! Build, sign, broadcast and await: nonce handling and failure paths.

use anyhow::Result;
use std::sync::atomic::Ordering;
use xn_client::provider::TransactionStatus;
use xn_client::signer::verify;
use xn_client::{ClientContext, ContractHandle, Error, PeriodUnit};
use xn_types::{Address, SchemaError};

use crate::utils::{contract_address, setup, split_data, test_config, FakeProvider, ALICE};

#[tokio::test]
async fn test_register_builds_signed_call() -> Result<()> {
    let mut ctx = setup(41);
    let done = ctx
        .register_or_renew("marko1.mvx", 1, PeriodUnit::Years, None, 100_000)
        .await?;
    assert_eq!(done.hash, "hash-1");
    assert_eq!(done.status, TransactionStatus::Success);

    let tx = ctx.provider().last_sent();
    assert_eq!(tx.nonce, 41);
    assert_eq!(tx.value, 100_000);
    assert_eq!(tx.receiver, contract_address());
    assert_eq!(tx.sender, *ctx.signer()?.address());
    assert_eq!(tx.gas_limit, 50_000_000);
    assert_eq!(tx.chain_id, "D");

    let (function, args) = split_data(&tx.data)?;
    assert_eq!(function, "register_or_renew");
    // Absent trailing optional contributes no argument.
    assert_eq!(args, vec![b"marko1.mvx".to_vec(), vec![1], vec![4]]);

    let signature = tx.signature.expect("transaction is signed");
    assert!(verify(&tx.sender, &tx.serialize_for_signing()?, &signature));
    Ok(())
}

#[tokio::test]
async fn test_register_with_assignee() -> Result<()> {
    let mut ctx = setup(0);
    let alice: Address = ALICE.parse()?;
    ctx.register_or_renew("marko1.mvx", 2, PeriodUnit::Years, Some(alice), 0)
        .await?;
    let (_, args) = split_data(&ctx.provider().last_sent().data)?;
    assert_eq!(args.len(), 4);
    assert_eq!(args[1], vec![2]);
    assert_eq!(args[3], alice.as_bytes().to_vec());
    Ok(())
}

#[tokio::test]
async fn test_nonce_fetched_once_then_incremented() -> Result<()> {
    let mut ctx = setup(7);
    ctx.accept("marko1.mvx").await?;
    ctx.accept("marko2.mvx").await?;
    ctx.revoke_accept_request("marko2.mvx").await?;

    let nonces: Vec<u64> = ctx.provider().sent().iter().map(|tx| tx.nonce).collect();
    assert_eq!(nonces, vec![7, 8, 9]);
    assert_eq!(ctx.provider().account_fetches.load(Ordering::SeqCst), 1);

    let (function, _) = split_data(&ctx.provider().last_sent().data)?;
    assert_eq!(function, "revokeAcceptRequest");
    Ok(())
}

#[tokio::test]
async fn test_failed_broadcast_resets_nonce() -> Result<()> {
    let mut ctx = setup(5);
    ctx.provider().fail_broadcasts(1);
    assert!(matches!(
        ctx.accept("marko1.mvx").await,
        Err(Error::Transaction(_))
    ));
    ctx.accept("marko1.mvx").await?;

    assert_eq!(ctx.provider().last_sent().nonce, 5);
    assert_eq!(ctx.provider().account_fetches.load(Ordering::SeqCst), 2);
    Ok(())
}

#[tokio::test]
async fn test_pending_then_success() -> Result<()> {
    let mut ctx = setup(0);
    ctx.provider().script_statuses([
        TransactionStatus::Pending,
        TransactionStatus::Pending,
    ]);
    let done = ctx.update_key_value("marko1.mvx", "email", Some("m@x.io")).await?;
    assert_eq!(done.status, TransactionStatus::Success);

    let (function, args) = split_data(&ctx.provider().last_sent().data)?;
    assert_eq!(function, "update_key_value");
    assert_eq!(args[2], b"m@x.io".to_vec());
    Ok(())
}

#[tokio::test]
async fn test_clearing_key_omits_value() -> Result<()> {
    let mut ctx = setup(0);
    ctx.update_key_value("marko1.mvx", "email", None).await?;
    let (_, args) = split_data(&ctx.provider().last_sent().data)?;
    assert_eq!(args.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_failed_execution_is_transaction_error() -> Result<()> {
    let mut ctx = setup(0);
    ctx.provider().set_final_status(TransactionStatus::Fail);
    let err = ctx.accept("marko1.mvx").await.unwrap_err();
    assert!(matches!(err, Error::Transaction(ref msg) if msg.contains("fail")));
    Ok(())
}

#[tokio::test]
async fn test_stuck_transaction_times_out() -> Result<()> {
    let mut ctx = setup(0);
    ctx.provider().set_final_status(TransactionStatus::Pending);
    assert!(matches!(
        ctx.accept("marko1.mvx").await,
        Err(Error::Timeout(_))
    ));
    Ok(())
}

#[tokio::test]
async fn test_invalid_name_rejected_before_broadcast() -> Result<()> {
    let mut ctx = setup(0);
    let err = ctx
        .register_or_renew("Marko.eth", 1, PeriodUnit::Years, None, 0)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Schema(SchemaError::InvalidName("character not allowed"))
    ));
    assert!(ctx.provider().sent().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_transaction_without_wallet() -> Result<()> {
    let mut ctx = ClientContext::new(
        test_config(),
        FakeProvider::new(0),
        ContractHandle::new(contract_address()),
    );
    assert!(matches!(ctx.accept("marko1.mvx").await, Err(Error::Signing(_))));
    // Queries work without one.
    assert!(ctx.resolve("marko1.mvx").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_set_prices_list_argument() -> Result<()> {
    let mut ctx = setup(0);
    ctx.set_prices(&[1_000, 500]).await?;
    let (function, args) = split_data(&ctx.provider().last_sent().data)?;
    assert_eq!(function, "set_prices");
    // One top-level buffer holding both nested BigUints, no count prefix.
    assert_eq!(args, vec![vec![0, 0, 0, 2, 0x03, 0xe8, 0, 0, 0, 2, 0x01, 0xf4]]);
    Ok(())
}
