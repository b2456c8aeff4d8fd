use crate::engine::entry::{Address, TokenId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Ownership and approval book of a non-fungible token collection.
///
/// Pure storage: no access control, callers validate before mutating.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenLedger {
    pub owners: BTreeMap<TokenId, Address>, // token -> owner
    pub balances: HashMap<Address, u64>,
    pub token_approvals: HashMap<TokenId, Address>,
    pub operator_approvals: HashSet<(Address, Address)>, // (owner, operator)
    pub next_token_id: TokenId,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns the next sequential id to `to`
    pub fn mint(&mut self, to: Address) -> TokenId {
        let token_id = self.next_token_id;
        self.next_token_id += 1;
        self.owners.insert(token_id, to);
        *self.balances.entry(to).or_insert(0) += 1;
        token_id
    }

    pub fn owner_of(&self, token_id: TokenId) -> Option<Address> {
        self.owners.get(&token_id).copied()
    }

    pub fn exists(&self, token_id: TokenId) -> bool {
        self.owners.contains_key(&token_id)
    }

    pub fn balance_of(&self, owner: &Address) -> u64 {
        self.balances.get(owner).copied().unwrap_or(0)
    }

    pub fn total_supply(&self) -> u64 {
        self.owners.len() as u64
    }

    pub fn approved(&self, token_id: TokenId) -> Address {
        self.token_approvals
            .get(&token_id)
            .copied()
            .unwrap_or(Address::ZERO)
    }

    pub fn set_approved(&mut self, token_id: TokenId, approved: Address) {
        if approved.is_zero() {
            self.token_approvals.remove(&token_id);
        } else {
            self.token_approvals.insert(token_id, approved);
        }
    }

    pub fn is_operator(&self, owner: &Address, operator: &Address) -> bool {
        self.operator_approvals.contains(&(*owner, *operator))
    }

    pub fn set_operator(&mut self, owner: Address, operator: Address, approved: bool) {
        if approved {
            self.operator_approvals.insert((owner, operator));
        } else {
            self.operator_approvals.remove(&(owner, operator));
        }
    }

    /// Moves `token_id` from `from` to `to` and drops its single-token approval
    pub fn move_token(&mut self, from: Address, to: Address, token_id: TokenId) {
        self.token_approvals.remove(&token_id);
        if let Some(balance) = self.balances.get_mut(&from) {
            *balance = balance.saturating_sub(1);
            if *balance == 0 {
                self.balances.remove(&from);
            }
        }
        *self.balances.entry(to).or_insert(0) += 1;
        self.owners.insert(token_id, to);
    }
}
