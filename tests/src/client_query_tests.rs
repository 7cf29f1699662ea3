//! Read-only calls: argument encoding and response decoding.

use anyhow::Result;
use xn_client::provider::QueryResponse;
use xn_client::Error;
use xn_types::name::GRACE_PERIOD;
use xn_types::{AbiRecord, Address, Domain, DomainState, FixedClock, Profile, RentalFee};

use crate::utils::{setup, ALICE, NFT_ID};

fn registered() -> Domain {
    Domain {
        name: "marko1.mvx".into(),
        expires_at: 1_735_689_600,
        nft_nonce: 3,
        profile: Some(Profile {
            name: "Marko".into(),
            avatar: "avatar".into(),
            location: "Serbia".into(),
            website: "https://facebook.io".into(),
            shortbio: "Dev".into(),
        }),
        ..Domain::default()
    }
}

#[tokio::test]
async fn test_get_domain_decodes_record() -> Result<()> {
    let ctx = setup(0);
    ctx.provider()
        .respond("get_domain_name", vec![registered().encode()?]);

    let domain = ctx.get_domain("marko1.mvx").await?.expect("domain is registered");
    assert_eq!(domain, registered());
    assert!(domain.social_media.is_none());

    let queries = ctx.provider().queries.lock().unwrap().clone();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].function, "get_domain_name");
    assert_eq!(queries[0].args, vec![b"marko1.mvx".to_vec()]);
    Ok(())
}

#[tokio::test]
async fn test_unregistered_domain_is_none() -> Result<()> {
    let ctx = setup(0);
    ctx.provider().respond("get_domain_name", vec![vec![]]);
    assert!(ctx.get_domain("nobody.mvx").await?.is_none());

    // No return buffers at all reads the same way.
    ctx.provider().respond("get_domain_name", vec![]);
    assert!(ctx.get_domain("nobody.mvx").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_query_error_code() -> Result<()> {
    let ctx = setup(0);
    ctx.provider().respond_with(
        "get_domain_name",
        QueryResponse {
            return_data: vec![],
            return_code: "user error".into(),
            return_message: "storage decode error".into(),
        },
    );
    let err = ctx.get_domain("marko1.mvx").await.unwrap_err();
    assert!(matches!(err, Error::Query(ref msg) if msg.contains("storage decode error")));
    Ok(())
}

#[tokio::test]
async fn test_truncated_record_is_schema_error() -> Result<()> {
    let ctx = setup(0);
    let mut bytes = registered().encode()?;
    bytes.truncate(bytes.len() - 3);
    ctx.provider().respond("get_domain_name", vec![bytes]);
    assert!(matches!(
        ctx.get_domain("marko1.mvx").await,
        Err(Error::Schema(_))
    ));
    Ok(())
}

#[tokio::test]
async fn test_price_and_nft_id() -> Result<()> {
    let ctx = setup(0);
    ctx.provider().respond("get_egld_usd_price", vec![vec![0x0a, 0x8c]]);
    ctx.provider()
        .respond("get_domain_nft_id", vec![NFT_ID.as_bytes().to_vec()]);

    assert_eq!(ctx.get_egld_usd_price().await?, 2700);
    assert_eq!(ctx.get_domain_nft_id().await?, NFT_ID);
    Ok(())
}

#[tokio::test]
async fn test_missing_nft_id_is_query_error() -> Result<()> {
    let ctx = setup(0);
    assert!(matches!(ctx.get_domain_nft_id().await, Err(Error::Query(_))));
    Ok(())
}

#[tokio::test]
async fn test_resolve_and_owner() -> Result<()> {
    let ctx = setup(0);
    let alice: Address = ALICE.parse()?;
    ctx.provider()
        .respond("resolve", vec![alice.as_bytes().to_vec()]);

    assert_eq!(ctx.resolve("marko1.mvx").await?, Some(alice));
    assert_eq!(ctx.get_owner_domain_name("marko1.mvx").await?, None);

    ctx.provider().respond("resolve", vec![vec![1, 2, 3]]);
    assert!(matches!(ctx.resolve("marko1.mvx").await, Err(Error::Schema(_))));
    Ok(())
}

#[tokio::test]
async fn test_queries_carry_wallet_as_caller() -> Result<()> {
    let ctx = setup(0);
    ctx.get_owner_domain_name("marko1.mvx").await?;
    let queries = ctx.provider().queries.lock().unwrap().clone();
    assert_eq!(queries[0].caller, Some(*ctx.signer()?.address()));
    Ok(())
}

#[tokio::test]
async fn test_key_value_lookup() -> Result<()> {
    let ctx = setup(0);
    ctx.provider()
        .respond("resolve_domain_name_key", vec![b"m@x.io".to_vec()]);

    let value = ctx.resolve_domain_name_key("marko1.mvx", "email").await?;
    assert_eq!(value.as_deref(), Some("m@x.io"));

    let queries = ctx.provider().queries.lock().unwrap().clone();
    assert_eq!(queries[0].function, "resolve_domain_name_key");
    assert_eq!(queries[0].args, vec![b"marko1.mvx".to_vec(), b"email".to_vec()]);

    ctx.provider().respond("resolve_domain_name_key", vec![vec![]]);
    assert!(ctx.resolve_domain_name_key("marko1.mvx", "phone").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_pending_accept_request() -> Result<()> {
    let ctx = setup(0);
    assert!(ctx.get_accept_request("marko1.mvx").await?.is_none());

    let alice: Address = ALICE.parse()?;
    ctx.provider()
        .respond("get_accept_request", vec![alice.as_bytes().to_vec()]);
    assert_eq!(ctx.get_accept_request("marko1.mvx").await?, Some(alice));
    Ok(())
}

#[tokio::test]
async fn test_price_tables() -> Result<()> {
    let ctx = setup(0);
    // One top-level BigUint per return buffer.
    ctx.provider()
        .respond("get_prices_egld", vec![vec![0x03, 0xe8], vec![0x01, 0xf4], vec![]]);
    assert_eq!(ctx.get_prices_egld().await?, vec![1_000, 500, 0]);

    assert!(ctx.get_prices_usd().await?.is_none());
    let fee = RentalFee {
        one_letter: 1_000,
        two_letter: 500,
        three_letter: 100,
        four_letter: 50,
        other: 5,
    };
    ctx.provider().respond("get_prices_usd", vec![fee.encode()?]);
    assert_eq!(ctx.get_prices_usd().await?, Some(fee));
    Ok(())
}

#[tokio::test]
async fn test_domain_state_at_grace_boundary() -> Result<()> {
    let ctx = setup(0);
    let expires_at = registered().expires_at;
    assert!(ctx
        .domain_state("marko1.mvx", &FixedClock(expires_at))
        .await?
        .is_none());

    ctx.provider()
        .respond("get_domain_name", vec![registered().encode()?]);
    for (now, expected) in [
        (expires_at, DomainState::Active),
        (expires_at + 1, DomainState::GracePeriod),
        (expires_at + GRACE_PERIOD - 1, DomainState::GracePeriod),
        (expires_at + GRACE_PERIOD, DomainState::Claimable),
    ] {
        let clock = FixedClock(now);
        assert_eq!(ctx.domain_state("marko1.mvx", &clock).await?, Some(expected));
    }
    Ok(())
}
