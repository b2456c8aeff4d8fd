mod common;

use common::*;
use pair::engine::chainengine::ChainEngine;
use pair::engine::entry::{Address, Call, Deployment, Event, View};

struct Setup {
    engine: ChainEngine,
    nft: Address,
    staking: Address,
}

fn deployed() -> Setup {
    let [owner, ..] = wallets();
    let mut engine = ChainEngine::new();
    let nft = engine
        .deploy(owner, Deployment::BasicNft { name: None, symbol: None })
        .unwrap();
    let staking = engine
        .deploy(owner, Deployment::NftSingleStaking { nft })
        .unwrap();
    Setup {
        engine,
        nft,
        staking,
    }
}

/// tokens 0 and 1 to account1, token 2 to account2, all approved for the
/// staking contract; account1 has staked token 0
fn staked() -> Setup {
    let [owner, account1, account2, _] = wallets();
    let mut s = deployed();
    send(&mut s.engine, owner, s.nft, Call::Mint { to: account1 });
    send(&mut s.engine, owner, s.nft, Call::Mint { to: account1 });
    send(&mut s.engine, owner, s.nft, Call::Mint { to: account2 });
    send(
        &mut s.engine,
        account1,
        s.nft,
        Call::Approve {
            to: s.staking,
            token_id: 0,
        },
    );
    send(
        &mut s.engine,
        account1,
        s.nft,
        Call::Approve {
            to: s.staking,
            token_id: 1,
        },
    );
    send(
        &mut s.engine,
        account2,
        s.nft,
        Call::Approve {
            to: s.staking,
            token_id: 2,
        },
    );
    send(&mut s.engine, account1, s.staking, Call::Stake { token_id: 0 });
    s
}

/// account1 unstaked token 0, account2 staked token 2
fn unstaked() -> Setup {
    let [_, account1, account2, _] = wallets();
    let mut s = staked();
    send(&mut s.engine, account1, s.staking, Call::Unstake);
    send(&mut s.engine, account2, s.staking, Call::Stake { token_id: 2 });
    s
}

#[test]
fn test_setup() {
    let [owner, ..] = wallets();
    let s = deployed();
    assert_eq!(view_address(&s.engine, s.staking, View::Owner), owner);
    assert_eq!(view_address(&s.engine, s.staking, View::Nft), s.nft);
}

#[test]
fn test_staking_contract_owns_nft_after_staking() {
    let s = staked();
    assert_eq!(
        view_address(&s.engine, s.nft, View::OwnerOf { token_id: 0 }),
        s.staking
    );
}

#[test]
fn test_cannot_stake_twice() {
    let [_, account1, ..] = wallets();
    let mut s = staked();
    assert_eq!(
        reverted_with(&mut s.engine, account1, s.staking, Call::Stake { token_id: 1 }),
        "Sender is already staked."
    );
    // token 1 did not move
    assert_eq!(
        view_address(&s.engine, s.nft, View::OwnerOf { token_id: 1 }),
        account1
    );
}

#[test]
fn test_cannot_stake_foreign_token() {
    let [_, _, account2, _] = wallets();
    let mut s = staked();
    assert_eq!(
        reverted_with(&mut s.engine, account2, s.staking, Call::Stake { token_id: 1 }),
        "Sender is not owner of token."
    );
}

#[test]
fn test_stake_emits_event() {
    let [_, _, account2, _] = wallets();
    let mut s = staked();
    let receipt = send(&mut s.engine, account2, s.staking, Call::Stake { token_id: 2 });
    assert!(receipt.emitted(
        &s.staking,
        &Event::Staked {
            staker: account2,
            token_id: 2
        }
    ));
    assert!(receipt.emitted(
        &s.nft,
        &Event::Transfer {
            from: account2,
            to: s.staking,
            token_id: 2
        }
    ));
}

#[test]
fn test_data_stored_on_staking() {
    let [_, account1, ..] = wallets();
    let s = staked();
    assert_eq!(
        view_uint(&s.engine, s.staking, View::Stakers { account: account1 }),
        0
    );
    assert_eq!(
        view_address(&s.engine, s.staking, View::StakedTokens { token_id: 0 }),
        account1
    );
    assert!(view_bool(
        &s.engine,
        s.staking,
        View::IsStaked { account: account1 }
    ));
}

#[test]
fn test_owner_owns_nft_after_unstaking() {
    let [_, account1, ..] = wallets();
    let s = unstaked();
    assert_eq!(
        view_address(&s.engine, s.nft, View::OwnerOf { token_id: 0 }),
        account1
    );
}

#[test]
fn test_can_stake_again_after_unstaking() {
    let [_, account1, ..] = wallets();
    let mut s = unstaked();
    send(
        &mut s.engine,
        account1,
        s.nft,
        Call::Approve {
            to: s.staking,
            token_id: 0,
        },
    );
    send(&mut s.engine, account1, s.staking, Call::Stake { token_id: 0 });
    assert!(view_bool(
        &s.engine,
        s.staking,
        View::IsStaked { account: account1 }
    ));
}

#[test]
fn test_unstake_emits_event() {
    let [_, _, account2, _] = wallets();
    let mut s = unstaked();
    let receipt = send(&mut s.engine, account2, s.staking, Call::Unstake);
    assert!(receipt.emitted(
        &s.staking,
        &Event::Unstaked {
            staker: account2,
            token_id: 2
        }
    ));
}

#[test]
fn test_data_reset_after_unstaking() {
    let [_, account1, ..] = wallets();
    let mut s = unstaked();
    assert_eq!(
        view_uint(&s.engine, s.staking, View::Stakers { account: account1 }),
        0
    );
    assert_eq!(
        view_address(&s.engine, s.staking, View::StakedTokens { token_id: 0 }),
        Address::ZERO
    );
    assert!(!view_bool(
        &s.engine,
        s.staking,
        View::IsStaked { account: account1 }
    ));
    assert_eq!(
        reverted_with(&mut s.engine, account1, s.staking, Call::Unstake),
        "Sender is not staked."
    );
}
