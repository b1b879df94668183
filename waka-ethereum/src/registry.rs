// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Types shared by every backend of the verse registry, and the trait that
//! abstracts over it.

use alloy::primitives::{Address, TxHash};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::common::RegistryError;

/// Upper bound on verse text length, matching the schema enforced at the edge.
pub const MAX_VERSE_LENGTH: usize = 100;

/// The current projection of a verse as held by the registry.
///
/// This mirrors the registry's `getVerse` return value field for field. It is
/// a read-only snapshot: the registry is the sole mutator, and once
/// `is_complete` is true the verse never changes again.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    pub upper_verse: String,
    pub lower_verse: String,
    pub upper_creator: Address,
    pub lower_creator: Address,
    pub is_complete: bool,
}

/// A decoded `UpperVerseCreated` event from the registry's log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseCreated {
    pub token_id: u64,
    pub creator: Address,
    pub upper_verse: String,
    pub block_number: Option<u64>,
}

/// Outcome of a successful `createUpperVerse` submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpperVerseReceipt {
    /// The token id the registry assigned to the new verse.
    pub token_id: u64,
    pub tx_hash: TxHash,
}

/// Outcome of a successful `addLowerVerse` submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionReceipt {
    pub token_id: u64,
    pub tx_hash: TxHash,
}

/// Where the verse registry lives.
///
/// Passed explicitly to the client constructor; there is no ambient or global
/// contract address anywhere in this crate.
#[derive(Clone, Debug)]
pub struct RegistryConfig {
    /// Address of the deployed registry contract.
    pub contract_address: Address,
    /// JSON-RPC endpoint of the node serving it.
    pub rpc_url: Url,
}

/// The fixed interface of the remote verse registry.
///
/// Implementations normalize transaction outcomes into typed
/// success/failure records; see [`RegistryError`] for the categories callers
/// can rely on.
#[async_trait]
pub trait VerseRegistry: Send + Sync {
    /// Mints a new verse holding `text` as its upper half.
    ///
    /// Waits for inclusion and decodes the assigned token id from the
    /// `UpperVerseCreated` event. A successful transaction without that event
    /// is reported as [`RegistryError::EventMissing`], distinct from a revert.
    async fn create_upper_verse(&self, text: &str) -> Result<UpperVerseReceipt, RegistryError>;

    /// Completes the verse under `token_id` with `text` as its lower half.
    ///
    /// The registry enforces that the verse exists and is still pending;
    /// violations surface as [`RegistryError::NotFound`] or
    /// [`RegistryError::AlreadyComplete`]. At most one of two racing calls for
    /// the same token can succeed; the loser observes `AlreadyComplete`.
    async fn add_lower_verse(
        &self,
        token_id: u64,
        text: &str,
    ) -> Result<CompletionReceipt, RegistryError>;

    /// Reads the full current projection of a verse.
    async fn get_verse(&self, token_id: u64) -> Result<Verse, RegistryError>;

    /// Looks up the current owner of the token representing a verse.
    ///
    /// Fails for nonexistent or burned tokens.
    async fn owner_of(&self, token_id: u64) -> Result<Address, RegistryError>;

    /// Enumerates every `UpperVerseCreated` event the registry ever emitted.
    ///
    /// This is an unbounded backward scan from the genesis block; acceptable
    /// for low volume, and the seam to replace with an indexed projection.
    async fn created_verses(&self) -> Result<Vec<VerseCreated>, RegistryError>;
}
