//! Transaction building and signing.

use base64::{engine::general_purpose::STANDARD as B64, Engine};
use serde::Serialize;
use xn_types::Address;

use crate::signer::UserSigner;
use crate::Error;

pub const TRANSACTION_VERSION: u32 = 2;

const NFT_TRANSFER_FUNCTION: &str = "ESDTNFTTransfer";

/// A transaction ready for signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub nonce: u64,
    pub value: u128,
    pub receiver: Address,
    pub sender: Address,
    pub gas_price: u64,
    pub gas_limit: u64,
    pub data: Vec<u8>,
    pub chain_id: String,
    pub version: u32,
    pub signature: Option<[u8; 64]>,
}

/// Field order is the network's canonical signing order.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SigningPayload<'a> {
    nonce: u64,
    value: String,
    receiver: String,
    sender: String,
    gas_price: u64,
    gas_limit: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<String>,
    #[serde(rename = "chainID")]
    chain_id: &'a str,
    version: u32,
}

#[derive(Serialize)]
struct BroadcastBody<'a> {
    #[serde(flatten)]
    payload: SigningPayload<'a>,
    signature: String,
}

impl Transaction {
    fn payload(&self) -> SigningPayload<'_> {
        SigningPayload {
            nonce: self.nonce,
            value: self.value.to_string(),
            receiver: self.receiver.to_bech32(),
            sender: self.sender.to_bech32(),
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            data: (!self.data.is_empty()).then(|| B64.encode(&self.data)),
            chain_id: &self.chain_id,
            version: self.version,
        }
    }

    /// Canonical JSON bytes the signature covers.
    pub fn serialize_for_signing(&self) -> Result<Vec<u8>, Error> {
        serde_json::to_vec(&self.payload())
            .map_err(|e| Error::Signing(format!("serialize transaction: {e}")))
    }

    pub fn sign(&mut self, signer: &UserSigner) -> Result<(), Error> {
        if signer.address() != &self.sender {
            return Err(Error::Signing(format!(
                "signer {} is not the sender {}",
                signer.address(),
                self.sender
            )));
        }
        let bytes = self.serialize_for_signing()?;
        self.signature = Some(signer.sign(&bytes).to_bytes());
        Ok(())
    }

    /// JSON body for `POST /transactions`.
    pub fn to_broadcast_json(&self) -> Result<serde_json::Value, Error> {
        let signature = self
            .signature
            .ok_or_else(|| Error::Transaction("transaction is not signed".into()))?;
        serde_json::to_value(BroadcastBody {
            payload: self.payload(),
            signature: hex::encode(signature),
        })
        .map_err(|e| Error::Transaction(format!("serialize transaction: {e}")))
    }
}

/// A single non-fungible token sent along with a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NftTransfer {
    pub token: String,
    pub nonce: u64,
}

/// A smart contract call before nonce, gas price and chain are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    pub function: String,
    pub args: Vec<Vec<u8>>,
    pub value: u128,
    pub nft: Option<NftTransfer>,
}

impl ContractCall {
    pub fn new(function: impl Into<String>, args: Vec<Vec<u8>>) -> Self {
        Self {
            function: function.into(),
            args,
            value: 0,
            nft: None,
        }
    }

    pub fn with_value(mut self, value: u128) -> Self {
        self.value = value;
        self
    }

    pub fn with_nft(mut self, token: impl Into<String>, nonce: u64) -> Self {
        self.nft = Some(NftTransfer {
            token: token.into(),
            nonce,
        });
        self
    }

    /// Send the NFT to `destination` without calling anything.
    pub fn nft_transfer(token: impl Into<String>, nonce: u64) -> Self {
        Self::new("", Vec::new()).with_nft(token, nonce)
    }

    /// `function@arg@arg`, or the NFT transfer wrapping it.
    pub fn data(&self, destination: &Address) -> String {
        match &self.nft {
            None => call_data(&self.function, &self.args),
            Some(nft) => {
                let mut args = vec![
                    nft.token.as_bytes().to_vec(),
                    minimal_be(nft.nonce),
                    vec![1],
                    destination.as_bytes().to_vec(),
                ];
                // A bare transfer carries no call.
                if !self.function.is_empty() {
                    args.push(self.function.as_bytes().to_vec());
                    args.extend(self.args.iter().cloned());
                }
                call_data(NFT_TRANSFER_FUNCTION, &args)
            }
        }
    }

    /// NFT transfers are sent to oneself; the protocol forwards to the contract.
    pub fn receiver(&self, sender: &Address, destination: &Address) -> Address {
        if self.nft.is_some() {
            *sender
        } else {
            *destination
        }
    }
}

pub fn call_data(function: &str, args: &[Vec<u8>]) -> String {
    let mut data = function.to_string();
    for arg in args {
        data.push('@');
        data.push_str(&hex::encode(arg));
    }
    data
}

fn minimal_be(n: u64) -> Vec<u8> {
    let bytes = n.to_be_bytes();
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    bytes[start..].to_vec()
}
