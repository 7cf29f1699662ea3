//! `xn` command-line client.

use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use xn_client::provider::TransactionOnNetwork;
use xn_client::{files, ApiProvider, ClientContext, Config, ContractHandle, PeriodUnit};
use xn_types::{Address, Clock, Profile, Social, SystemClock, TextRecord, Wallets};

#[derive(Parser)]
#[command(name = "xn", version, about = "xn domain registry client")]
struct Cli {
    /// Config file stem (`xn` reads `xn.toml`)
    #[arg(short, long, default_value = "xn")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show a domain record and whether it is active, in grace or claimable
    Domain { name: String },
    /// Current EGLD price in USD cents
    Price,
    /// Token identifier of the domain NFT collection
    NftId,
    /// Address a domain resolves to
    Resolve { name: String },
    /// Account that owns a domain
    Owner { name: String },
    /// Value stored under a key
    GetKey { name: String, key: String },
    /// Account with a pending primary-address request
    AcceptRequest { name: String },
    /// Yearly prices in EGLD and USD per name length
    Prices,
    /// Register a domain or extend its expiry
    Register {
        name: String,
        #[arg(short, long, default_value_t = 1)]
        period: u64,
        #[arg(short, long, value_enum, default_value_t = PeriodUnit::Years)]
        unit: PeriodUnit,
        /// Point the domain at this address
        #[arg(long)]
        assign_to: Option<Address>,
        /// Payment in the smallest EGLD denomination
        #[arg(long, default_value_t = 0)]
        value: u128,
    },
    /// Submit the reservation export (owner only)
    Reserve {
        /// Defaults to `reservations_path` from config
        #[arg(long)]
        file: Option<String>,
    },
    /// Set yearly prices per name length (owner only)
    SetPrices { prices: Vec<u128> },
    /// Update profile, social, text-record and wallet sections from a JSON file
    UpdateProfile { name: String, file: String },
    /// Register a subdomain of an owned domain
    RegisterSubDomain {
        name: String,
        address: Address,
        #[arg(long, default_value_t = 0)]
        value: u128,
    },
    /// Send the domain NFT to a new owner
    Transfer { name: String, to: Address },
    /// Set or clear the primary address
    SetPrimary {
        name: String,
        address: Option<Address>,
    },
    /// Set or clear a key/value record
    SetKey {
        name: String,
        key: String,
        value: Option<String>,
    },
    /// Accept a pending primary-address request
    Accept { name: String },
    /// Withdraw a pending primary-address request
    RevokeAccept { name: String },
}

/// Layout of the `update-profile` input file.
#[derive(Deserialize)]
struct ProfileUpdate {
    profile: Profile,
    #[serde(default)]
    social: Option<Social>,
    #[serde(default)]
    text_records: Option<Vec<TextRecord>>,
    #[serde(default)]
    wallets: Option<Wallets>,
}

fn report(tx: &TransactionOnNetwork) {
    info!(tx = %tx.hash, status = %tx.status, "Done");
    println!("{}", tx.hash);
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    info!(api = %config.api_url, contract = %config.contract_address, chain = %config.chain_id, "Configuration loaded");

    let provider = ApiProvider::new(&config.api_url, config.request_timeout())?;
    let mut contract = ContractHandle::new(config.contract_address.parse()?);
    if let Some(path) = &config.abi_path {
        contract = contract.with_abi(files::load_abi(path)?);
    }

    let needs_wallet = !matches!(
        cli.command,
        Command::Domain { .. }
            | Command::Price
            | Command::NftId
            | Command::Resolve { .. }
            | Command::Owner { .. }
            | Command::GetKey { .. }
            | Command::AcceptRequest { .. }
            | Command::Prices
    );
    let signer = if needs_wallet {
        Some(files::load_signer(&config.pem_path)?)
    } else {
        None
    };

    let reservations_path = config.reservations_path.clone();
    let mut ctx = ClientContext::new(config, provider, contract);
    if let Some(signer) = signer {
        ctx = ctx.with_signer(signer);
    }

    let result = run(&mut ctx, cli.command, reservations_path).await;
    xn_client::metrics::METRICS.log_summary();
    if let Err(e) = &result {
        warn!(error = %e, "Command failed");
    }
    result
}

async fn run(
    ctx: &mut ClientContext<ApiProvider>,
    command: Command,
    reservations_path: String,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Domain { name } => match ctx.get_domain(&name).await? {
            Some(domain) => {
                let state = domain.state(SystemClock.now_secs());
                print_json(&serde_json::json!({ "domain": domain, "state": state }))?
            }
            None => println!("{name} is not registered"),
        },
        Command::Price => println!("{}", ctx.get_egld_usd_price().await?),
        Command::NftId => println!("{}", ctx.get_domain_nft_id().await?),
        Command::Resolve { name } => match ctx.resolve(&name).await? {
            Some(address) => println!("{address}"),
            None => println!("{name} does not resolve"),
        },
        Command::Owner { name } => match ctx.get_owner_domain_name(&name).await? {
            Some(address) => println!("{address}"),
            None => println!("{name} has no owner"),
        },
        Command::GetKey { name, key } => match ctx.resolve_domain_name_key(&name, &key).await? {
            Some(value) => println!("{value}"),
            None => println!("{key} is not set on {name}"),
        },
        Command::AcceptRequest { name } => match ctx.get_accept_request(&name).await? {
            Some(address) => println!("{address}"),
            None => println!("{name} has no pending request"),
        },
        Command::Prices => {
            let egld = ctx.get_prices_egld().await?;
            let usd = ctx.get_prices_usd().await?;
            let egld: Vec<String> = egld.iter().map(u128::to_string).collect();
            print_json(&serde_json::json!({ "egld": egld, "usd": usd }))?
        }
        Command::Register {
            name,
            period,
            unit,
            assign_to,
            value,
        } => report(
            &ctx.register_or_renew(&name, period, unit, assign_to, value)
                .await?,
        ),
        Command::Reserve { file } => {
            let entries = files::load_reservations(file.unwrap_or(reservations_path))?;
            report(&ctx.set_reservations(&entries, &SystemClock).await?)
        }
        Command::SetPrices { prices } => report(&ctx.set_prices(&prices).await?),
        Command::UpdateProfile { name, file } => {
            let text = std::fs::read_to_string(&file)
                .map_err(|e| xn_client::Error::File(format!("{file}: {e}")))?;
            let update: ProfileUpdate = serde_json::from_str(&text)
                .map_err(|e| xn_client::Error::File(format!("{file}: {e}")))?;
            report(
                &ctx.update_domain_profile(
                    &name,
                    &update.profile,
                    update.social.as_ref(),
                    update.text_records.as_deref(),
                    update.wallets.as_ref(),
                )
                .await?,
            )
        }
        Command::RegisterSubDomain {
            name,
            address,
            value,
        } => report(&ctx.register_sub_domain(&name, address, value).await?),
        Command::Transfer { name, to } => report(&ctx.transfer_domain(&name, to).await?),
        Command::SetPrimary { name, address } => {
            report(&ctx.update_primary_address(&name, address).await?)
        }
        Command::SetKey { name, key, value } => {
            report(&ctx.update_key_value(&name, &key, value.as_deref()).await?)
        }
        Command::Accept { name } => report(&ctx.accept(&name).await?),
        Command::RevokeAccept { name } => report(&ctx.revoke_accept_request(&name).await?),
    }
    Ok(())
}
