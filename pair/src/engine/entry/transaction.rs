//! Transaction Types
//!
//! State-changing calls, contract deployments and read-only views that the
//! chain engine accepts.

use super::{keccak256, Address, TokenId};
use serde::{Deserialize, Serialize};

/// Contract kinds that can be deployed, with their constructor arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Deployment {
    BasicNft {
        name: Option<String>,
        symbol: Option<String>,
    },
    Pair,
    NftPair { nft: Address },
    NftSingleStaking { nft: Address },
}

/// State-changing contract methods
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Call {
    Deploy(Deployment),
    Mint {
        to: Address,
    },
    Approve {
        to: Address,
        token_id: TokenId,
    },
    SetApprovalForAll {
        operator: Address,
        approved: bool,
    },
    TransferFrom {
        from: Address,
        to: Address,
        token_id: TokenId,
    },
    TransferOwnership {
        new_owner: Address,
    },
    Join,
    Resolve {
        outcome: Address,
    },
    Stake {
        token_id: TokenId,
    },
    Unstake,
}

impl Call {
    pub fn method(&self) -> &'static str {
        match self {
            Call::Deploy(_) => "deploy",
            Call::Mint { .. } => "mint",
            Call::Approve { .. } => "approve",
            Call::SetApprovalForAll { .. } => "setApprovalForAll",
            Call::TransferFrom { .. } => "transferFrom",
            Call::TransferOwnership { .. } => "transferOwnership",
            Call::Join => "join",
            Call::Resolve { .. } => "resolve",
            Call::Stake { .. } => "stake",
            Call::Unstake => "unstake",
        }
    }
}

/// Read-only contract methods
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum View {
    Owner,
    Name,
    Symbol,
    Nft,
    TotalSupply,
    BalanceOf { owner: Address },
    OwnerOf { token_id: TokenId },
    Exists { token_id: TokenId },
    GetApproved { token_id: TokenId },
    IsApprovedForAll { owner: Address, operator: Address },
    NextPair,
    Pair { account: Address },
    Stakers { account: Address },
    StakedTokens { token_id: TokenId },
    IsStaked { account: Address },
}

impl View {
    pub fn method(&self) -> &'static str {
        match self {
            View::Owner => "owner",
            View::Name => "name",
            View::Symbol => "symbol",
            View::Nft => "nft",
            View::TotalSupply => "totalSupply",
            View::BalanceOf { .. } => "balanceOf",
            View::OwnerOf { .. } => "ownerOf",
            View::Exists { .. } => "exists",
            View::GetApproved { .. } => "getApproved",
            View::IsApprovedForAll { .. } => "isApprovedForAll",
            View::NextPair => "nextPair",
            View::Pair { .. } => "pair",
            View::Stakers { .. } => "stakers",
            View::StakedTokens { .. } => "stakedTokens",
            View::IsStaked { .. } => "isStaked",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewResult {
    Address(Address),
    Bool(bool),
    Uint(u64),
    Text(String),
}

impl ViewResult {
    pub fn as_address(&self) -> Option<Address> {
        match self {
            ViewResult::Address(a) => Some(*a),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ViewResult::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<u64> {
        match self {
            ViewResult::Uint(v) => Some(*v),
            _ => None,
        }
    }
}

/// A transaction; `to` is empty for deployments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tx {
    pub from: Address,
    pub to: Option<Address>,
    pub call: Call,
}

impl Tx {
    pub fn call(from: Address, to: Address, call: Call) -> Self {
        Tx {
            from,
            to: Some(to),
            call,
        }
    }

    pub fn deploy(from: Address, deployment: Deployment) -> Self {
        Tx {
            from,
            to: None,
            call: Call::Deploy(deployment),
        }
    }

    /// Hash over the encoded transaction and the sender nonce it was executed with
    pub fn hash(&self, nonce: u64) -> String {
        let mut preimage = bincode::serialize(self).unwrap_or_default();
        preimage.extend_from_slice(&nonce.to_be_bytes());
        format!("0x{}", hex::encode(keccak256(&preimage)))
    }
}
