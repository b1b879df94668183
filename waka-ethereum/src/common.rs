// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The failure taxonomy shared by every registry operation.
//!
//! Callers must be able to tell apart a local validation failure, a rejection
//! by the registry, a declined signature request, a transport problem, and a
//! transaction that was included but produced a malformed result. The mapping
//! from raw transport payloads to these kinds happens here and nowhere else.

use alloy::{
    primitives::TxHash,
    rpc::json_rpc::ErrorPayload,
    transports::{RpcError, TransportErrorKind},
};
use thiserror::Error;

/// Revert reason emitted by the registry for an unknown token id.
pub const NOT_FOUND_REASON: &str = "Token ID does not exist";

/// Revert reason emitted by the registry for a verse that is already complete.
pub const ALREADY_COMPLETE_REASON: &str = "Waka is already complete";

/// EIP-1193 error code for a signature request the user rejected.
const USER_REJECTED_REQUEST: i64 = 4001;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// Empty verse text is rejected before anything reaches the chain.
    #[error("verse text must not be empty")]
    EmptyVerse,

    /// The registry holds no verse under this token id.
    #[error("verse {0} does not exist")]
    NotFound(u64),

    /// The verse is already complete; completed verses are immutable.
    #[error("verse {0} is already complete")]
    AlreadyComplete(u64),

    /// The registry reverted for a reason outside the verse lifecycle rules.
    #[error("registry rejected the transaction: {0}")]
    Reverted(String),

    /// The signer declined to sign the transaction. Not a system fault.
    #[error("signature request was declined")]
    Declined,

    /// The submitting account cannot cover the transaction cost.
    #[error("insufficient funds to submit the transaction")]
    InsufficientFunds,

    /// The transaction was included but its receipt reports failure.
    #[error("transaction {tx_hash} was included but failed")]
    TransactionFailed { tx_hash: TxHash },

    /// The transaction succeeded but the expected event is missing from the
    /// receipt. The write may still have happened; callers must not assume
    /// otherwise.
    #[error("transaction {tx_hash} succeeded but the expected event was not emitted")]
    EventMissing { tx_hash: TxHash },

    /// The registry returned a token id this client cannot represent.
    #[error("token id out of range")]
    TokenIdOutOfRange,

    /// Network or connectivity failure. Retryable by the caller.
    #[error(transparent)]
    Transport(#[from] RpcError<TransportErrorKind>),

    /// Waiting for inclusion failed or timed out.
    #[error(transparent)]
    PendingTransaction(#[from] alloy::providers::PendingTransactionError),

    /// URL parsing error
    #[error(transparent)]
    UrlParseError(#[from] url::ParseError),
}

impl RegistryError {
    /// Whether retrying the same call can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RegistryError::Transport(_) | RegistryError::PendingTransaction(_)
        )
    }

    /// Translates a failed contract call that carries no token context.
    pub(crate) fn from_call_error(error: alloy::contract::Error) -> Self {
        match Rejection::of(&error) {
            Some(Rejection::Revert(reason)) => RegistryError::Reverted(reason),
            Some(Rejection::Declined) => RegistryError::Declined,
            Some(Rejection::InsufficientFunds) => RegistryError::InsufficientFunds,
            None => match error {
                alloy::contract::Error::TransportError(error) => RegistryError::Transport(error),
                other => RegistryError::Reverted(other.to_string()),
            },
        }
    }

    /// Translates a failed contract call against a specific token, mapping the
    /// registry's lifecycle revert reasons to their typed counterparts.
    pub(crate) fn from_token_call_error(error: alloy::contract::Error, token_id: u64) -> Self {
        match Rejection::of(&error) {
            Some(Rejection::Revert(reason)) if reason.contains(NOT_FOUND_REASON) => {
                RegistryError::NotFound(token_id)
            }
            Some(Rejection::Revert(reason)) if reason.contains(ALREADY_COMPLETE_REASON) => {
                RegistryError::AlreadyComplete(token_id)
            }
            _ => Self::from_call_error(error),
        }
    }
}

/// A structured rejection extracted from a raw contract call failure.
enum Rejection {
    Revert(String),
    Declined,
    InsufficientFunds,
}

impl Rejection {
    fn of(error: &alloy::contract::Error) -> Option<Self> {
        if let Some(data) = error.as_revert_data() {
            let reason = alloy::sol_types::decode_revert_reason(&data)
                .unwrap_or_else(|| "execution reverted".to_owned());
            return Some(Rejection::Revert(reason));
        }
        if let alloy::contract::Error::TransportError(error) = error {
            if let Some(payload) = error.as_error_resp() {
                if payload.code == USER_REJECTED_REQUEST {
                    return Some(Rejection::Declined);
                }
                if is_insufficient_funds(payload) {
                    return Some(Rejection::InsufficientFunds);
                }
            }
        }
        None
    }
}

/// Execution clients report an underfunded sender through the generic `-32000`
/// (or `-32003`) code; the message check is confined to this one boundary.
fn is_insufficient_funds(payload: &ErrorPayload) -> bool {
    matches!(payload.code, -32000 | -32003) && payload.message.contains("insufficient funds")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_and_pending_failures_are_retryable() {
        let transport = RegistryError::Transport(TransportErrorKind::custom_str("refused"));
        assert!(transport.is_retryable());
        assert!(!RegistryError::NotFound(7).is_retryable());
        assert!(!RegistryError::AlreadyComplete(7).is_retryable());
        assert!(!RegistryError::EventMissing { tx_hash: TxHash::ZERO }.is_retryable());
    }
}
