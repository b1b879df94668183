// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Personal-message signature verification, plus the canonical messages the
//! two verse operations sign.

use alloy::primitives::{Address, Signature};

/// Returns whether `signature` over `message` was produced by
/// `expected_signer`.
///
/// Recovery follows the EIP-191 personal-message scheme. The address
/// comparison happens on parsed addresses, so it is insensitive to the hex
/// casing of `expected_signer`. Malformed input of any kind yields `false`;
/// this function never errors and has no side effects.
pub fn verify_signature(message: &str, signature: &str, expected_signer: &str) -> bool {
    let Ok(signature) = signature.parse::<Signature>() else {
        return false;
    };
    let Ok(expected_signer) = expected_signer.parse::<Address>() else {
        return false;
    };
    signature
        .recover_address_from_msg(message)
        .is_ok_and(|recovered| recovered == expected_signer)
}

/// The message a creator signs when submitting an upper verse.
pub fn upper_verse_message(text: &str) -> String {
    format!("Create upper verse: {text}")
}

/// The message a collaborator signs when completing verse `token_id`.
///
/// The token id is part of the message so a captured signature cannot be
/// replayed against a different verse.
pub fn lower_verse_message(token_id: u64, text: &str) -> String {
    format!("Add lower verse #{token_id}: {text}")
}
