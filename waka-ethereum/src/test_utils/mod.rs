// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Helper types for tests: an in-memory registry double and signing helpers.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use alloy::{
    primitives::{Address, TxHash},
    signers::SignerSync as _,
    transports::TransportErrorKind,
};
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;

use crate::{
    common::RegistryError,
    registry::{CompletionReceipt, UpperVerseReceipt, Verse, VerseCreated, VerseRegistry},
};

/// An in-memory stand-in for the on-chain registry, reproducing its verse
/// lifecycle: create → pending → complete, with the same typed rejections.
///
/// Handles produced by [`MemoryRegistry::as_caller`] share state, so one test
/// can act as several parties. Fault injection covers the failure categories
/// a real chain produces: [`burn`](Self::burn) makes ownership lookups fail,
/// [`set_offline`](Self::set_offline) turns every call into a transport
/// error, and [`drop_created_events`](Self::drop_created_events) produces the
/// included-but-malformed outcome.
pub struct MemoryRegistry {
    state: Arc<Mutex<MemoryState>>,
    caller: Address,
}

struct MemoryState {
    verses: BTreeMap<u64, Verse>,
    owners: BTreeMap<u64, Address>,
    events: Vec<VerseCreated>,
    next_token_id: u64,
    tx_counter: u64,
    offline: bool,
    drop_created_events: bool,
}

impl MemoryRegistry {
    /// Creates an empty registry whose writes are attributed to `caller`.
    pub fn new(caller: Address) -> Self {
        let state = MemoryState {
            verses: BTreeMap::new(),
            owners: BTreeMap::new(),
            events: Vec::new(),
            next_token_id: 1,
            tx_counter: 0,
            offline: false,
            drop_created_events: false,
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            caller,
        }
    }

    /// A handle over the same registry acting as a different party.
    pub fn as_caller(&self, caller: Address) -> Self {
        Self {
            state: self.state.clone(),
            caller,
        }
    }

    /// Removes the token so ownership lookups fail, as for a burned NFT.
    pub fn burn(&self, token_id: u64) {
        self.lock().owners.remove(&token_id);
    }

    /// Makes every subsequent operation fail with a transport error.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Makes `create_upper_verse` perform the write but report the receipt
    /// without the expected event, the malformed-success case.
    pub fn drop_created_events(&self, drop: bool) {
        self.lock().drop_created_events = drop;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().expect("registry state poisoned")
    }
}

impl MemoryState {
    fn next_tx_hash(&mut self) -> TxHash {
        self.tx_counter += 1;
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&self.tx_counter.to_be_bytes());
        TxHash::from(bytes)
    }
}

fn offline() -> RegistryError {
    RegistryError::Transport(TransportErrorKind::custom_str("registry offline"))
}

#[async_trait]
impl VerseRegistry for MemoryRegistry {
    async fn create_upper_verse(&self, text: &str) -> Result<UpperVerseReceipt, RegistryError> {
        if text.is_empty() {
            return Err(RegistryError::EmptyVerse);
        }
        let mut state = self.lock();
        if state.offline {
            return Err(offline());
        }
        let token_id = state.next_token_id;
        state.next_token_id += 1;
        state.verses.insert(
            token_id,
            Verse {
                upper_verse: text.to_owned(),
                lower_verse: String::new(),
                upper_creator: self.caller,
                lower_creator: Address::ZERO,
                is_complete: false,
            },
        );
        state.owners.insert(token_id, self.caller);
        let tx_hash = state.next_tx_hash();
        if state.drop_created_events {
            // The write has happened; only the receipt is malformed.
            return Err(RegistryError::EventMissing { tx_hash });
        }
        let block_number = Some(state.tx_counter);
        state.events.push(VerseCreated {
            token_id,
            creator: self.caller,
            upper_verse: text.to_owned(),
            block_number,
        });
        Ok(UpperVerseReceipt { token_id, tx_hash })
    }

    async fn add_lower_verse(
        &self,
        token_id: u64,
        text: &str,
    ) -> Result<CompletionReceipt, RegistryError> {
        if text.is_empty() {
            return Err(RegistryError::EmptyVerse);
        }
        let mut state = self.lock();
        if state.offline {
            return Err(offline());
        }
        let Some(verse) = state.verses.get_mut(&token_id) else {
            return Err(RegistryError::NotFound(token_id));
        };
        if verse.is_complete {
            return Err(RegistryError::AlreadyComplete(token_id));
        }
        verse.lower_verse = text.to_owned();
        verse.lower_creator = self.caller;
        verse.is_complete = true;
        let tx_hash = state.next_tx_hash();
        Ok(CompletionReceipt { token_id, tx_hash })
    }

    async fn get_verse(&self, token_id: u64) -> Result<Verse, RegistryError> {
        let state = self.lock();
        if state.offline {
            return Err(offline());
        }
        state
            .verses
            .get(&token_id)
            .cloned()
            .ok_or(RegistryError::NotFound(token_id))
    }

    async fn owner_of(&self, token_id: u64) -> Result<Address, RegistryError> {
        let state = self.lock();
        if state.offline {
            return Err(offline());
        }
        state
            .owners
            .get(&token_id)
            .copied()
            .ok_or(RegistryError::NotFound(token_id))
    }

    async fn created_verses(&self) -> Result<Vec<VerseCreated>, RegistryError> {
        let state = self.lock();
        if state.offline {
            return Err(offline());
        }
        Ok(state.events.clone())
    }
}

/// A fresh random signer and its address.
pub fn random_signer() -> (PrivateKeySigner, Address) {
    let signer = PrivateKeySigner::random();
    let address = signer.address();
    (signer, address)
}

/// Signs `message` with the EIP-191 personal scheme, hex-encoded with a `0x`
/// prefix as a wallet would return it.
pub fn sign_message(signer: &PrivateKeySigner, message: &str) -> String {
    let signature = signer
        .sign_message_sync(message.as_bytes())
        .expect("signing cannot fail");
    alloy::primitives::hex::encode_prefixed(signature.as_bytes())
}
