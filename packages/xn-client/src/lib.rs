//! # xn client
//!
//! Queries and transactions against the xn domain registry contract on
//! MultiversX.
//!
//! ## Quick Start
//! ```bash
//! XN_PEM_PATH=./wallet.pem cargo run --bin xn -- domain marko1.mvx
//! ```

pub mod config;
pub mod context;
pub mod contract;
mod error;
pub mod files;
pub mod metrics;
pub mod provider;
pub mod rpc;
pub mod signer;
pub mod transaction;
pub mod watcher;

pub use config::Config;
pub use context::{ClientContext, ContractHandle};
pub use contract::{OwnedDomain, PeriodUnit};
pub use error::Error;
pub use provider::NetworkProvider;
pub use rpc::ApiProvider;
pub use signer::UserSigner;
