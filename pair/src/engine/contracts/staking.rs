//! Single NFT Staking Contract
//!
//! Each account may stake at most one token of the referenced collection.
//! Custody of a staked token moves to the staking contract until unstaked.

use crate::engine::contracts::{CallContext, NftRegistry};
use crate::engine::entry::{Address, Event, Revert, TokenId};
use getset::CopyGetters;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize, CopyGetters)]
pub struct NftSingleStaking {
    #[getset(get_copy = "pub")]
    owner: Address,
    #[getset(get_copy = "pub")]
    nft: Address,
    stakers: HashMap<Address, TokenId>,      // staker -> token
    staked_tokens: HashMap<TokenId, Address>, // token -> staker
}

impl NftSingleStaking {
    pub fn deploy(ctx: &mut CallContext, nft: Address) -> Self {
        let owner = ctx.sender();
        ctx.emit(Event::OwnershipTransferred {
            previous_owner: Address::ZERO,
            new_owner: owner,
        });
        Self {
            owner,
            nft,
            stakers: HashMap::new(),
            staked_tokens: HashMap::new(),
        }
    }

    /// Token staked by `account`; 0 when the account holds no stake
    pub fn stakers(&self, account: &Address) -> TokenId {
        self.stakers.get(account).copied().unwrap_or(0)
    }

    /// Staker of `token_id`, or the zero address
    pub fn staked_tokens(&self, token_id: TokenId) -> Address {
        self.staked_tokens
            .get(&token_id)
            .copied()
            .unwrap_or(Address::ZERO)
    }

    pub fn is_staked(&self, account: &Address) -> bool {
        self.stakers.contains_key(account)
    }

    pub fn stake(
        &mut self,
        ctx: &mut CallContext,
        nft: &mut impl NftRegistry,
        token_id: TokenId,
    ) -> Result<(), Revert> {
        let staker = ctx.sender();
        if self.is_staked(&staker) {
            return Err(Revert::AlreadyStaked);
        }
        if nft.owner_of(token_id)? != staker {
            return Err(Revert::NotTokenOwner);
        }

        let this = ctx.this();
        ctx.call_into(self.nft, |inner| {
            nft.transfer_from(inner, staker, this, token_id)
        })?;

        self.stakers.insert(staker, token_id);
        self.staked_tokens.insert(token_id, staker);
        log::info!("{} staked token {}", staker, token_id);
        ctx.emit(Event::Staked { staker, token_id });
        Ok(())
    }

    pub fn unstake(
        &mut self,
        ctx: &mut CallContext,
        nft: &mut impl NftRegistry,
    ) -> Result<(), Revert> {
        let staker = ctx.sender();
        let token_id = *self.stakers.get(&staker).ok_or(Revert::NotStaked)?;

        let this = ctx.this();
        ctx.call_into(self.nft, |inner| {
            nft.transfer_from(inner, this, staker, token_id)
        })?;

        self.stakers.remove(&staker);
        self.staked_tokens.remove(&token_id);
        log::info!("{} unstaked token {}", staker, token_id);
        ctx.emit(Event::Unstaked { staker, token_id });
        Ok(())
    }
}
