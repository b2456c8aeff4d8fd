use crate::engine::entry::{Address, Event, Log, Revert, TokenId};

/// Execution context of one contract call: who called, which contract runs,
/// and the logs emitted so far in the transaction.
#[derive(Debug)]
pub struct CallContext {
    sender: Address,
    this: Address,
    logs: Vec<Log>,
}

impl CallContext {
    pub fn new(sender: Address, this: Address) -> Self {
        Self {
            sender,
            this,
            logs: Vec::new(),
        }
    }

    pub fn sender(&self) -> Address {
        self.sender
    }

    /// Address of the executing contract
    pub fn this(&self) -> Address {
        self.this
    }

    pub fn emit(&mut self, event: Event) {
        self.logs.push(Log {
            address: self.this,
            event,
        });
    }

    /// Runs `f` as a call from the current contract into `callee`.
    /// Logs of the inner call are kept in emission order.
    pub fn call_into<T>(
        &mut self,
        callee: Address,
        f: impl FnOnce(&mut CallContext) -> Result<T, Revert>,
    ) -> Result<T, Revert> {
        let mut inner = CallContext::new(self.this, callee);
        let result = f(&mut inner)?;
        self.logs.append(&mut inner.logs);
        Ok(result)
    }

    pub fn into_logs(self) -> Vec<Log> {
        self.logs
    }
}

/// Custody capability of an NFT collection, as seen by other contracts
pub trait NftRegistry {
    fn owner_of(&self, token_id: TokenId) -> Result<Address, Revert>;

    /// Moves `token_id` on behalf of `ctx.sender()`, which must be the owner,
    /// the approved address or an operator of the owner
    fn transfer_from(
        &mut self,
        ctx: &mut CallContext,
        from: Address,
        to: Address,
        token_id: TokenId,
    ) -> Result<(), Revert>;
}
