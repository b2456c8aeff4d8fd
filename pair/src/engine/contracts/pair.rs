//! Pairing Contracts
//!
//! `Pair` exposes the matcher directly. `NftPair` runs the same matcher and
//! additionally records its deployer and the NFT collection it references.

use crate::engine::contracts::CallContext;
use crate::engine::entry::{Address, Event, Revert};
use crate::engine::matchlogic::Matcher;
use getset::CopyGetters;
use serde::{Deserialize, Serialize};

fn join(matcher: &mut Matcher, ctx: &mut CallContext) -> Result<(), Revert> {
    let caller = ctx.sender();
    match matcher.join(caller)? {
        Some((first, second)) => {
            log::info!("pair found: {} <-> {}", first, second);
            ctx.emit(Event::PairFound { first, second });
        }
        None => log::debug!("{} is waiting for a pair", caller),
    }
    Ok(())
}

fn resolve(matcher: &mut Matcher, ctx: &mut CallContext, outcome: Address) -> Result<(), Revert> {
    let resolver = ctx.sender();
    let partner = matcher.resolve(resolver)?;
    log::info!(
        "pair resolved: {} <-> {}, outcome {}",
        resolver,
        partner,
        outcome
    );
    ctx.emit(Event::PairResolved {
        resolver,
        partner,
        outcome,
    });
    Ok(())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pair {
    matcher: Matcher,
}

impl Pair {
    pub fn deploy() -> Self {
        Self::default()
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn join(&mut self, ctx: &mut CallContext) -> Result<(), Revert> {
        join(&mut self.matcher, ctx)
    }

    pub fn resolve(&mut self, ctx: &mut CallContext, outcome: Address) -> Result<(), Revert> {
        resolve(&mut self.matcher, ctx, outcome)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, CopyGetters)]
pub struct NftPair {
    #[getset(get_copy = "pub")]
    owner: Address,
    /// Collateral collection; referenced, never owned
    #[getset(get_copy = "pub")]
    nft: Address,
    matcher: Matcher,
}

impl NftPair {
    pub fn deploy(ctx: &mut CallContext, nft: Address) -> Self {
        let owner = ctx.sender();
        ctx.emit(Event::OwnershipTransferred {
            previous_owner: Address::ZERO,
            new_owner: owner,
        });
        Self {
            owner,
            nft,
            matcher: Matcher::new(),
        }
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn join(&mut self, ctx: &mut CallContext) -> Result<(), Revert> {
        join(&mut self.matcher, ctx)
    }

    pub fn resolve(&mut self, ctx: &mut CallContext, outcome: Address) -> Result<(), Revert> {
        resolve(&mut self.matcher, ctx, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_emits_found_and_resolved() {
        let this = Address::from_hash(b"pair");
        let a = Address::from_hash(b"a");
        let b = Address::from_hash(b"b");
        let mut pair = Pair::deploy();

        let mut ctx = CallContext::new(a, this);
        pair.join(&mut ctx).unwrap();
        assert!(ctx.into_logs().is_empty());

        let mut ctx = CallContext::new(b, this);
        pair.join(&mut ctx).unwrap();
        let logs = ctx.into_logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].address, this);
        assert_eq!(logs[0].event, Event::PairFound { first: a, second: b });

        let mut ctx = CallContext::new(a, this);
        pair.resolve(&mut ctx, a).unwrap();
        assert_eq!(
            ctx.into_logs()[0].event,
            Event::PairResolved {
                resolver: a,
                partner: b,
                outcome: a
            }
        );
        assert_eq!(pair.matcher().pair(&a), Address::ZERO);
        assert_eq!(pair.matcher().pair(&b), Address::ZERO);
    }

    #[test]
    fn test_nft_pair_records_owner_and_nft() {
        let owner = Address::from_hash(b"owner");
        let nft = Address::from_hash(b"nft");
        let this = Address::from_hash(b"nft-pair");
        let mut ctx = CallContext::new(owner, this);
        let pair = NftPair::deploy(&mut ctx, nft);

        assert_eq!(pair.owner(), owner);
        assert_eq!(pair.nft(), nft);
        assert_eq!(pair.matcher().next_pair(), Address::ZERO);
    }

    #[test]
    fn test_failed_join_emits_nothing() {
        let this = Address::from_hash(b"pair");
        let a = Address::from_hash(b"a");
        let mut pair = Pair::deploy();
        pair.join(&mut CallContext::new(a, this)).unwrap();

        let mut ctx = CallContext::new(a, this);
        assert_eq!(pair.join(&mut ctx), Err(Revert::AlreadyWaiting));
        assert!(ctx.into_logs().is_empty());
    }
}
