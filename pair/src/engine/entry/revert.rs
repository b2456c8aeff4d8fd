//! Revert Reasons
//!
//! Every contract failure is a synchronous rejection carrying a fixed,
//! human-readable reason. The `Display` output of each variant is that reason.

use super::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum Revert {
    #[error("Sender is already waiting for a pair.")]
    AlreadyWaiting,
    #[error("Sender is already paired.")]
    AlreadyPaired,
    #[error("Sender is not paired.")]
    NotPaired,

    #[error("Sender is already staked.")]
    AlreadyStaked,
    #[error("Sender is not owner of token.")]
    NotTokenOwner,
    #[error("Sender is not staked.")]
    NotStaked,

    #[error("Ownable: caller is not the owner")]
    NotOwner,
    #[error("Ownable: new owner is the zero address")]
    NewOwnerIsZero,

    #[error("ERC721: mint to the zero address")]
    MintToZero,
    #[error("ERC721: balance query for the zero address")]
    BalanceOfZero,
    #[error("ERC721: owner query for nonexistent token")]
    OwnerQueryForNonexistent,
    #[error("ERC721: approved query for nonexistent token")]
    ApprovedQueryForNonexistent,
    #[error("ERC721: operator query for nonexistent token")]
    OperatorQueryForNonexistent,
    #[error("ERC721: approval to current owner")]
    ApprovalToCurrentOwner,
    #[error("ERC721: approve caller is not owner nor approved for all")]
    ApproveNotAllowed,
    #[error("ERC721: approve to caller")]
    ApproveToCaller,
    #[error("ERC721: transfer caller is not owner nor approved")]
    TransferNotAllowed,
    #[error("ERC721: transfer of token that is not own")]
    TransferOfTokenNotOwn,
    #[error("ERC721: transfer to the zero address")]
    TransferToZero,

    #[error("transaction sent from the zero address")]
    ZeroSender,
    #[error("no contract at {0}")]
    NoContract(Address),
    #[error("{kind} does not implement {method}")]
    UnsupportedCall { kind: String, method: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_strings() {
        assert_eq!(
            Revert::AlreadyWaiting.to_string(),
            "Sender is already waiting for a pair."
        );
        assert_eq!(Revert::AlreadyPaired.to_string(), "Sender is already paired.");
        assert_eq!(Revert::AlreadyStaked.to_string(), "Sender is already staked.");
        assert_eq!(
            Revert::NotTokenOwner.to_string(),
            "Sender is not owner of token."
        );
        assert_eq!(
            Revert::UnsupportedCall {
                kind: "Pair".into(),
                method: "stake".into()
            }
            .to_string(),
            "Pair does not implement stake"
        );
    }
}
