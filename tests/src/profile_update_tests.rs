//! Calls that prove ownership by sending the domain NFT along.

use anyhow::Result;
use xn_client::Error;
use xn_types::codec::decode_top;
use xn_types::domain::text_records_type;
use xn_types::{AbiRecord, Address, Domain, Profile, SchemaError, Social, TextRecord, TypeSchema, Value};

use crate::utils::{setup, split_data, FakeProvider, BOB, NFT_ID};

fn profile() -> Profile {
    Profile {
        name: "Marko".into(),
        avatar: "avatar".into(),
        location: "Serbia".into(),
        website: "https://facebook.io".into(),
        shortbio: "Dev".into(),
    }
}

fn own(provider: &FakeProvider, name: &str, nft_nonce: u64) -> Result<()> {
    let domain = Domain {
        name: name.into(),
        expires_at: 1_900_000_000,
        nft_nonce,
        ..Domain::default()
    };
    provider.respond("get_domain_name", vec![domain.encode()?]);
    provider.respond("get_domain_nft_id", vec![NFT_ID.as_bytes().to_vec()]);
    Ok(())
}

#[tokio::test]
async fn test_update_profile_wraps_nft_transfer() -> Result<()> {
    let mut ctx = setup(0);
    own(ctx.provider(), "marko1.mvx", 3)?;

    ctx.update_domain_profile("marko1.mvx", &profile(), None, None, None)
        .await?;

    let tx = ctx.provider().last_sent();
    let sender = *ctx.signer()?.address();
    assert_eq!(tx.receiver, sender);

    let (function, args) = split_data(&tx.data)?;
    assert_eq!(function, "ESDTNFTTransfer");
    assert_eq!(args[0], NFT_ID.as_bytes().to_vec());
    assert_eq!(args[1], vec![3]);
    assert_eq!(args[2], vec![1]);
    assert_eq!(args[3], ctx.contract().address().as_bytes().to_vec());
    assert_eq!(args[4], b"update_domain_profile".to_vec());
    assert_eq!(args[5], b"marko1.mvx".to_vec());
    assert_eq!(Profile::decode(&args[6])?, profile());
    // Three absent optionals add nothing.
    assert_eq!(args.len(), 7);
    Ok(())
}

#[tokio::test]
async fn test_update_profile_with_all_sections() -> Result<()> {
    let mut ctx = setup(0);
    own(ctx.provider(), "marko1.mvx", 3)?;

    let social = Social {
        telegram: "@marko".into(),
        ..Social::default()
    };
    let records = [TextRecord {
        name_value: "github".into(),
        link: "https://github.com/marko".into(),
    }];
    let wallets = xn_types::Wallets {
        egld: "erd1...".into(),
        ..Default::default()
    };
    ctx.update_domain_profile(
        "marko1.mvx",
        &profile(),
        Some(&social),
        Some(&records),
        Some(&wallets),
    )
    .await?;

    let (_, args) = split_data(&ctx.provider().last_sent().data)?;
    assert_eq!(args.len(), 10);
    assert_eq!(Social::decode(&args[7])?, social);
    let decoded = decode_top(&args[8], &text_records_type())?;
    let items = decoded.into_collection()?.into_items();
    assert_eq!(TextRecord::from_value(items[0].clone())?, records[0]);
    Ok(())
}

#[tokio::test]
async fn test_skipped_section_before_given_one() -> Result<()> {
    let mut ctx = setup(0);
    own(ctx.provider(), "marko1.mvx", 3)?;
    let wallets = xn_types::Wallets::default();
    let err = ctx
        .update_domain_profile("marko1.mvx", &profile(), None, None, Some(&wallets))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Schema(SchemaError::OptionalGap)));
    assert!(ctx.provider().sent().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_text_records_must_match_arity() -> Result<()> {
    let mut ctx = setup(0);
    own(ctx.provider(), "marko1.mvx", 3)?;
    let records = vec![TextRecord::default(), TextRecord::default()];
    let err = ctx
        .update_domain_profile(
            "marko1.mvx",
            &profile(),
            Some(&Social::default()),
            Some(&records),
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Schema(SchemaError::ArityMismatch { expected: 1, found: 2 })
    ));
    Ok(())
}

#[tokio::test]
async fn test_update_unregistered_domain() -> Result<()> {
    let mut ctx = setup(0);
    let err = ctx
        .update_domain_profile("ghost.mvx", &profile(), None, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Query(ref msg) if msg.contains("ghost.mvx")));
    Ok(())
}

#[tokio::test]
async fn test_register_sub_domain_uses_parent_nft() -> Result<()> {
    let mut ctx = setup(0);
    own(ctx.provider(), "marko1.mvx", 9)?;
    let owner = *ctx.signer()?.address();

    ctx.register_sub_domain("www.marko1.mvx", owner, 10).await?;

    let queries = ctx.provider().queries.lock().unwrap().clone();
    assert_eq!(queries[0].args, vec![b"marko1.mvx".to_vec()]);

    let tx = ctx.provider().last_sent();
    assert_eq!(tx.value, 10);
    let (_, args) = split_data(&tx.data)?;
    assert_eq!(args[1], vec![9]);
    assert_eq!(args[4], b"register_sub_domain".to_vec());
    assert_eq!(args[5], b"www.marko1.mvx".to_vec());
    assert_eq!(args[6], owner.as_bytes().to_vec());

    assert!(matches!(
        ctx.register_sub_domain("marko1.mvx", owner, 0).await,
        Err(Error::Config(_))
    ));
    Ok(())
}

#[tokio::test]
async fn test_nested_sub_domain_uses_primary_nft() -> Result<()> {
    let mut ctx = setup(0);
    own(ctx.provider(), "marko1.mvx", 9)?;
    let owner = *ctx.signer()?.address();

    ctx.register_sub_domain("a.www.marko1.mvx", owner, 0).await?;

    let queries = ctx.provider().queries.lock().unwrap().clone();
    assert_eq!(queries[0].args, vec![b"marko1.mvx".to_vec()]);
    let (_, args) = split_data(&ctx.provider().last_sent().data)?;
    assert_eq!(args[5], b"a.www.marko1.mvx".to_vec());
    Ok(())
}

#[tokio::test]
async fn test_transfer_domain_sends_nft_to_new_owner() -> Result<()> {
    let mut ctx = setup(0);
    own(ctx.provider(), "marko1.mvx", 300)?;
    let bob: Address = BOB.parse()?;

    ctx.transfer_domain("marko1.mvx", bob).await?;

    let tx = ctx.provider().last_sent();
    assert_eq!(tx.receiver, *ctx.signer()?.address());
    let (function, args) = split_data(&tx.data)?;
    assert_eq!(function, "ESDTNFTTransfer");
    assert_eq!(args[1], vec![0x01, 0x2c]);
    assert_eq!(args[3], bob.as_bytes().to_vec());
    assert_eq!(args.len(), 4);
    Ok(())
}

#[tokio::test]
async fn test_update_primary_address() -> Result<()> {
    let mut ctx = setup(0);
    own(ctx.provider(), "marko1.mvx", 3)?;
    let bob: Address = BOB.parse()?;

    ctx.update_primary_address("marko1.mvx", Some(bob)).await?;
    let (_, args) = split_data(&ctx.provider().last_sent().data)?;
    assert_eq!(args[4], b"update_primary_address".to_vec());
    assert_eq!(args[6], bob.as_bytes().to_vec());

    ctx.update_primary_address("marko1.mvx", None).await?;
    let (_, args) = split_data(&ctx.provider().last_sent().data)?;
    assert_eq!(args.len(), 6);

    let arg = decode_top(&args[5], &TypeSchema::Bytes)?;
    assert_eq!(arg, Value::text("marko1.mvx"));
    Ok(())
}
