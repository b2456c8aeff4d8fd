//! Basic NFT Contract
//!
//! An owner-mintable ERC-721 style collection with sequential token ids.

use crate::engine::contracts::{CallContext, NftRegistry};
use crate::engine::data::TokenLedger;
use crate::engine::entry::{Address, Event, Revert, TokenId};
use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};

pub const DEFAULT_NAME: &str = "BasicNFT";
pub const DEFAULT_SYMBOL: &str = "BNFT";

#[derive(Debug, Clone, Serialize, Deserialize, Getters, CopyGetters)]
pub struct BasicNft {
    #[getset(get_copy = "pub")]
    owner: Address,
    #[getset(get = "pub")]
    name: String,
    #[getset(get = "pub")]
    symbol: String,
    ledger: TokenLedger,
}

impl BasicNft {
    /// Deploys the collection; the deployer becomes its owner
    pub fn deploy(ctx: &mut CallContext, name: Option<String>, symbol: Option<String>) -> Self {
        let owner = ctx.sender();
        ctx.emit(Event::OwnershipTransferred {
            previous_owner: Address::ZERO,
            new_owner: owner,
        });
        Self {
            owner,
            name: name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
            symbol: symbol.unwrap_or_else(|| DEFAULT_SYMBOL.to_string()),
            ledger: TokenLedger::new(),
        }
    }

    fn only_owner(&self, ctx: &CallContext) -> Result<(), Revert> {
        if ctx.sender() != self.owner {
            return Err(Revert::NotOwner);
        }
        Ok(())
    }

    pub fn transfer_ownership(
        &mut self,
        ctx: &mut CallContext,
        new_owner: Address,
    ) -> Result<(), Revert> {
        self.only_owner(ctx)?;
        if new_owner.is_zero() {
            return Err(Revert::NewOwnerIsZero);
        }
        let previous_owner = std::mem::replace(&mut self.owner, new_owner);
        ctx.emit(Event::OwnershipTransferred {
            previous_owner,
            new_owner,
        });
        Ok(())
    }

    /// Mints the next token id to `to`
    pub fn mint(&mut self, ctx: &mut CallContext, to: Address) -> Result<TokenId, Revert> {
        self.only_owner(ctx)?;
        if to.is_zero() {
            return Err(Revert::MintToZero);
        }
        let token_id = self.ledger.mint(to);
        log::debug!("minted token {} to {}", token_id, to);
        ctx.emit(Event::Transfer {
            from: Address::ZERO,
            to,
            token_id,
        });
        Ok(token_id)
    }

    pub fn approve(
        &mut self,
        ctx: &mut CallContext,
        to: Address,
        token_id: TokenId,
    ) -> Result<(), Revert> {
        let owner = self.owner_of(token_id)?;
        if to == owner {
            return Err(Revert::ApprovalToCurrentOwner);
        }
        let sender = ctx.sender();
        if sender != owner && !self.ledger.is_operator(&owner, &sender) {
            return Err(Revert::ApproveNotAllowed);
        }
        self.ledger.set_approved(token_id, to);
        ctx.emit(Event::Approval {
            owner,
            approved: to,
            token_id,
        });
        Ok(())
    }

    pub fn set_approval_for_all(
        &mut self,
        ctx: &mut CallContext,
        operator: Address,
        approved: bool,
    ) -> Result<(), Revert> {
        let owner = ctx.sender();
        if operator == owner {
            return Err(Revert::ApproveToCaller);
        }
        self.ledger.set_operator(owner, operator, approved);
        ctx.emit(Event::ApprovalForAll {
            owner,
            operator,
            approved,
        });
        Ok(())
    }

    pub fn balance_of(&self, owner: &Address) -> Result<u64, Revert> {
        if owner.is_zero() {
            return Err(Revert::BalanceOfZero);
        }
        Ok(self.ledger.balance_of(owner))
    }

    pub fn exists(&self, token_id: TokenId) -> bool {
        self.ledger.exists(token_id)
    }

    pub fn total_supply(&self) -> u64 {
        self.ledger.total_supply()
    }

    pub fn get_approved(&self, token_id: TokenId) -> Result<Address, Revert> {
        if !self.ledger.exists(token_id) {
            return Err(Revert::ApprovedQueryForNonexistent);
        }
        Ok(self.ledger.approved(token_id))
    }

    pub fn is_approved_for_all(&self, owner: &Address, operator: &Address) -> bool {
        self.ledger.is_operator(owner, operator)
    }

    fn is_approved_or_owner(&self, spender: &Address, token_id: TokenId) -> Result<bool, Revert> {
        let owner = self
            .ledger
            .owner_of(token_id)
            .ok_or(Revert::OperatorQueryForNonexistent)?;
        Ok(*spender == owner
            || self.ledger.approved(token_id) == *spender
            || self.ledger.is_operator(&owner, spender))
    }
}

impl NftRegistry for BasicNft {
    fn owner_of(&self, token_id: TokenId) -> Result<Address, Revert> {
        self.ledger
            .owner_of(token_id)
            .ok_or(Revert::OwnerQueryForNonexistent)
    }

    fn transfer_from(
        &mut self,
        ctx: &mut CallContext,
        from: Address,
        to: Address,
        token_id: TokenId,
    ) -> Result<(), Revert> {
        if !self.is_approved_or_owner(&ctx.sender(), token_id)? {
            return Err(Revert::TransferNotAllowed);
        }
        if self.owner_of(token_id)? != from {
            return Err(Revert::TransferOfTokenNotOwn);
        }
        if to.is_zero() {
            return Err(Revert::TransferToZero);
        }

        self.ledger.move_token(from, to, token_id);
        ctx.emit(Event::Approval {
            owner: from,
            approved: Address::ZERO,
            token_id,
        });
        ctx.emit(Event::Transfer { from, to, token_id });
        Ok(())
    }
}
