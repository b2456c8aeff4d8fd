//! Contract Management Module
//!
//! Keeps every deployed contract by address and dispatches calls and views
//! to them. Contracts live in per-kind maps so that a contract can borrow the
//! collection it references while it executes.

use crate::engine::contracts::{
    BasicNft, CallContext, NftPair, NftRegistry, NftSingleStaking, Pair,
};
use crate::engine::entry::{Address, Call, Deployment, Revert, View, ViewResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractKind {
    BasicNft,
    Pair,
    NftPair,
    NftSingleStaking,
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContractKind::BasicNft => "BasicNFT",
            ContractKind::Pair => "Pair",
            ContractKind::NftPair => "NFTPair",
            ContractKind::NftSingleStaking => "NFTSingleStaking",
        };
        f.write_str(name)
    }
}

fn unsupported(kind: ContractKind, method: &str) -> Revert {
    Revert::UnsupportedCall {
        kind: kind.to_string(),
        method: method.to_string(),
    }
}

#[derive(Debug)]
enum Contract {
    Nft(BasicNft),
    Pair(Pair),
    NftPair(NftPair),
    Staking(NftSingleStaking),
}

/// Prior state of the contracts touched by one transaction; `None` marks an
/// address that held no contract
#[derive(Debug)]
pub struct Checkpoint {
    saved: Vec<(Address, Option<Contract>)>,
}

/// Registry of deployed contracts
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ContractManager {
    kinds: HashMap<Address, ContractKind>,
    nfts: HashMap<Address, BasicNft>,
    pairs: HashMap<Address, Pair>,
    nft_pairs: HashMap<Address, NftPair>,
    stakings: HashMap<Address, NftSingleStaking>,
}

impl ContractManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind_of(&self, address: &Address) -> Option<ContractKind> {
        self.kinds.get(address).copied()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Copies the contracts a call at `address` can modify: the contract
    /// itself and, for staking, the collection it takes custody in.
    pub fn checkpoint(&self, address: &Address) -> Checkpoint {
        let mut touched = vec![*address];
        if let Some(staking) = self.stakings.get(address) {
            touched.push(staking.nft());
        }
        Checkpoint {
            saved: touched
                .into_iter()
                .map(|address| (address, self.copy_of(&address)))
                .collect(),
        }
    }

    /// Puts back every contract recorded in `checkpoint`
    pub fn restore(&mut self, checkpoint: Checkpoint) {
        for (address, saved) in checkpoint.saved.into_iter().rev() {
            self.remove(&address);
            if let Some(contract) = saved {
                self.insert(address, contract);
            }
        }
    }

    fn copy_of(&self, address: &Address) -> Option<Contract> {
        match self.kind_of(address)? {
            ContractKind::BasicNft => self.nfts.get(address).cloned().map(Contract::Nft),
            ContractKind::Pair => self.pairs.get(address).cloned().map(Contract::Pair),
            ContractKind::NftPair => self.nft_pairs.get(address).cloned().map(Contract::NftPair),
            ContractKind::NftSingleStaking => {
                self.stakings.get(address).cloned().map(Contract::Staking)
            }
        }
    }

    fn remove(&mut self, address: &Address) {
        match self.kinds.remove(address) {
            Some(ContractKind::BasicNft) => {
                self.nfts.remove(address);
            }
            Some(ContractKind::Pair) => {
                self.pairs.remove(address);
            }
            Some(ContractKind::NftPair) => {
                self.nft_pairs.remove(address);
            }
            Some(ContractKind::NftSingleStaking) => {
                self.stakings.remove(address);
            }
            None => {}
        }
    }

    fn insert(&mut self, address: Address, contract: Contract) {
        let kind = match contract {
            Contract::Nft(nft) => {
                self.nfts.insert(address, nft);
                ContractKind::BasicNft
            }
            Contract::Pair(pair) => {
                self.pairs.insert(address, pair);
                ContractKind::Pair
            }
            Contract::NftPair(pair) => {
                self.nft_pairs.insert(address, pair);
                ContractKind::NftPair
            }
            Contract::Staking(staking) => {
                self.stakings.insert(address, staking);
                ContractKind::NftSingleStaking
            }
        };
        self.kinds.insert(address, kind);
    }

    /// Instantiates a contract at `ctx.this()`
    pub fn deploy(&mut self, ctx: &mut CallContext, deployment: Deployment) -> ContractKind {
        let address = ctx.this();
        let kind = match deployment {
            Deployment::BasicNft { name, symbol } => {
                self.nfts.insert(address, BasicNft::deploy(ctx, name, symbol));
                ContractKind::BasicNft
            }
            Deployment::Pair => {
                self.pairs.insert(address, Pair::deploy());
                ContractKind::Pair
            }
            Deployment::NftPair { nft } => {
                self.nft_pairs.insert(address, NftPair::deploy(ctx, nft));
                ContractKind::NftPair
            }
            Deployment::NftSingleStaking { nft } => {
                self.stakings
                    .insert(address, NftSingleStaking::deploy(ctx, nft));
                ContractKind::NftSingleStaking
            }
        };
        self.kinds.insert(address, kind);
        log::info!("deployed {} at {}", kind, address);
        kind
    }

    /// Executes a state-changing call against the contract at `ctx.this()`
    pub fn invoke(&mut self, ctx: &mut CallContext, call: &Call) -> Result<(), Revert> {
        let address = ctx.this();
        let kind = self.kind_of(&address).ok_or(Revert::NoContract(address))?;
        match kind {
            ContractKind::BasicNft => {
                let nft = self
                    .nfts
                    .get_mut(&address)
                    .ok_or(Revert::NoContract(address))?;
                match call {
                    Call::Mint { to } => nft.mint(ctx, *to).map(|_| ()),
                    Call::Approve { to, token_id } => nft.approve(ctx, *to, *token_id),
                    Call::SetApprovalForAll { operator, approved } => {
                        nft.set_approval_for_all(ctx, *operator, *approved)
                    }
                    Call::TransferFrom { from, to, token_id } => {
                        nft.transfer_from(ctx, *from, *to, *token_id)
                    }
                    Call::TransferOwnership { new_owner } => {
                        nft.transfer_ownership(ctx, *new_owner)
                    }
                    other => Err(unsupported(kind, other.method())),
                }
            }
            ContractKind::Pair => {
                let pair = self
                    .pairs
                    .get_mut(&address)
                    .ok_or(Revert::NoContract(address))?;
                match call {
                    Call::Join => pair.join(ctx),
                    Call::Resolve { outcome } => pair.resolve(ctx, *outcome),
                    other => Err(unsupported(kind, other.method())),
                }
            }
            ContractKind::NftPair => {
                let pair = self
                    .nft_pairs
                    .get_mut(&address)
                    .ok_or(Revert::NoContract(address))?;
                match call {
                    Call::Join => pair.join(ctx),
                    Call::Resolve { outcome } => pair.resolve(ctx, *outcome),
                    other => Err(unsupported(kind, other.method())),
                }
            }
            ContractKind::NftSingleStaking => {
                let staking = self
                    .stakings
                    .get_mut(&address)
                    .ok_or(Revert::NoContract(address))?;
                let nft_address = staking.nft();
                let nft = self
                    .nfts
                    .get_mut(&nft_address)
                    .ok_or(Revert::NoContract(nft_address))?;
                match call {
                    Call::Stake { token_id } => staking.stake(ctx, nft, *token_id),
                    Call::Unstake => staking.unstake(ctx, nft),
                    other => Err(unsupported(kind, other.method())),
                }
            }
        }
    }

    /// Answers a read-only view against the contract at `address`
    pub fn view(&self, address: &Address, view: &View) -> Result<ViewResult, Revert> {
        let kind = self.kind_of(address).ok_or(Revert::NoContract(*address))?;
        let missing = || Revert::NoContract(*address);
        match kind {
            ContractKind::BasicNft => {
                let nft = self.nfts.get(address).ok_or_else(missing)?;
                match view {
                    View::Owner => Ok(ViewResult::Address(nft.owner())),
                    View::Name => Ok(ViewResult::Text(nft.name().clone())),
                    View::Symbol => Ok(ViewResult::Text(nft.symbol().clone())),
                    View::TotalSupply => Ok(ViewResult::Uint(nft.total_supply())),
                    View::BalanceOf { owner } => nft.balance_of(owner).map(ViewResult::Uint),
                    View::OwnerOf { token_id } => nft.owner_of(*token_id).map(ViewResult::Address),
                    View::Exists { token_id } => Ok(ViewResult::Bool(nft.exists(*token_id))),
                    View::GetApproved { token_id } => {
                        nft.get_approved(*token_id).map(ViewResult::Address)
                    }
                    View::IsApprovedForAll { owner, operator } => Ok(ViewResult::Bool(
                        nft.is_approved_for_all(owner, operator),
                    )),
                    other => Err(unsupported(kind, other.method())),
                }
            }
            ContractKind::Pair => {
                let pair = self.pairs.get(address).ok_or_else(missing)?;
                match view {
                    View::NextPair => Ok(ViewResult::Address(pair.matcher().next_pair())),
                    View::Pair { account } => Ok(ViewResult::Address(pair.matcher().pair(account))),
                    other => Err(unsupported(kind, other.method())),
                }
            }
            ContractKind::NftPair => {
                let pair = self.nft_pairs.get(address).ok_or_else(missing)?;
                match view {
                    View::Owner => Ok(ViewResult::Address(pair.owner())),
                    View::Nft => Ok(ViewResult::Address(pair.nft())),
                    View::NextPair => Ok(ViewResult::Address(pair.matcher().next_pair())),
                    View::Pair { account } => Ok(ViewResult::Address(pair.matcher().pair(account))),
                    other => Err(unsupported(kind, other.method())),
                }
            }
            ContractKind::NftSingleStaking => {
                let staking = self.stakings.get(address).ok_or_else(missing)?;
                match view {
                    View::Owner => Ok(ViewResult::Address(staking.owner())),
                    View::Nft => Ok(ViewResult::Address(staking.nft())),
                    View::Stakers { account } => Ok(ViewResult::Uint(staking.stakers(account))),
                    View::StakedTokens { token_id } => {
                        Ok(ViewResult::Address(staking.staked_tokens(*token_id)))
                    }
                    View::IsStaked { account } => Ok(ViewResult::Bool(staking.is_staked(account))),
                    other => Err(unsupported(kind, other.method())),
                }
            }
        }
    }
}
