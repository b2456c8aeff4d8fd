#![allow(dead_code)]

use pair::engine::chainengine::ChainEngine;
use pair::engine::entry::{dev_accounts, Address, Call, Receipt, Revert, Tx, View, ViewResult};

/// owner, account1, account2, account3
pub fn wallets() -> [Address; 4] {
    let accounts = dev_accounts("pair", 4);
    [accounts[0], accounts[1], accounts[2], accounts[3]]
}

pub fn send(engine: &mut ChainEngine, from: Address, to: Address, call: Call) -> Receipt {
    engine
        .transact(Tx::call(from, to, call))
        .unwrap_or_else(|revert| panic!("unexpected revert: {}", revert))
}

pub fn reverted_with(engine: &mut ChainEngine, from: Address, to: Address, call: Call) -> String {
    match engine.transact(Tx::call(from, to, call)) {
        Ok(receipt) => panic!("expected revert, got {:?}", receipt),
        Err(revert) => revert.to_string(),
    }
}

pub fn view(engine: &ChainEngine, to: Address, view: View) -> Result<ViewResult, Revert> {
    engine.call(&to, &view)
}

pub fn view_address(engine: &ChainEngine, to: Address, v: View) -> Address {
    view(engine, to, v).unwrap().as_address().unwrap()
}

pub fn view_uint(engine: &ChainEngine, to: Address, v: View) -> u64 {
    view(engine, to, v).unwrap().as_uint().unwrap()
}

pub fn view_bool(engine: &ChainEngine, to: Address, v: View) -> bool {
    view(engine, to, v).unwrap().as_bool().unwrap()
}
