use crate::engine::entry::{Address, Revert};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Two-slot rendezvous register.
///
/// The first caller waits in `next_pair`; the next distinct caller is paired
/// with it. Either side of a pair may resolve it, which clears both entries.
/// `pairs` is always symmetric: `pairs[a] == b` iff `pairs[b] == a`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Matcher {
    next_pair: Address,
    pairs: HashMap<Address, Address>,
}

impl Matcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// The caller waiting for a partner, or the zero address
    pub fn next_pair(&self) -> Address {
        self.next_pair
    }

    /// The partner of `account`, or the zero address if unpaired
    pub fn pair(&self, account: &Address) -> Address {
        self.pairs.get(account).copied().unwrap_or(Address::ZERO)
    }

    pub fn is_paired(&self, account: &Address) -> bool {
        self.pairs.contains_key(account)
    }

    /// Number of active pairs
    pub fn pair_count(&self) -> usize {
        self.pairs.len() / 2
    }

    /// Enters `caller` into the register.
    ///
    /// Returns `Some((waiting, caller))` when the call completed a pair and
    /// `None` when the caller now occupies the waiting slot.
    pub fn join(&mut self, caller: Address) -> Result<Option<(Address, Address)>, Revert> {
        if self.next_pair == caller {
            return Err(Revert::AlreadyWaiting);
        }
        if self.is_paired(&caller) {
            return Err(Revert::AlreadyPaired);
        }

        if self.next_pair.is_zero() {
            self.next_pair = caller;
            return Ok(None);
        }

        let waiting = std::mem::replace(&mut self.next_pair, Address::ZERO);
        self.pairs.insert(caller, waiting);
        self.pairs.insert(waiting, caller);
        Ok(Some((waiting, caller)))
    }

    /// Settles the pair `caller` belongs to and returns the partner
    pub fn resolve(&mut self, caller: Address) -> Result<Address, Revert> {
        let partner = self.pairs.remove(&caller).ok_or(Revert::NotPaired)?;
        self.pairs.remove(&partner);
        Ok(partner)
    }
}
