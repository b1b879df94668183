// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Rebuilds the set of verses a wallet can still complete by replaying the
//! registry's event log against its current state.

use alloy::primitives::Address;
use futures::{stream, StreamExt as _};
use serde::{Deserialize, Serialize};

use crate::{
    common::RegistryError,
    registry::{VerseCreated, VerseRegistry},
};

/// Upper bound on concurrent per-token lookups during a scan.
const MAX_CONCURRENT_LOOKUPS: usize = 8;

/// A pending verse the queried address may complete.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableVerse {
    pub token_id: u64,
    pub upper_verse: String,
}

/// Lists the verses currently owned by `owner` that still await their lower
/// verse.
///
/// Every `UpperVerseCreated` event is resolved to the token's current state
/// and owner; the lookups fan out with bounded concurrency and carry no
/// ordering guarantee. Entries that fail to resolve (burned tokens, transient
/// fetch failures) are skipped so a single bad entry cannot sink the whole
/// listing. The result is an eagerly computed point-in-time snapshot, not a
/// subscription.
pub async fn list_available<R>(
    registry: &R,
    owner: Address,
) -> Result<Vec<AvailableVerse>, RegistryError>
where
    R: VerseRegistry + ?Sized,
{
    let events = registry.created_verses().await?;
    let available = stream::iter(events)
        .map(|event| resolve_event(registry, owner, event))
        .buffer_unordered(MAX_CONCURRENT_LOOKUPS)
        .filter_map(|entry| async move { entry })
        .collect::<Vec<_>>()
        .await;
    Ok(available)
}

async fn resolve_event<R>(
    registry: &R,
    owner: Address,
    event: VerseCreated,
) -> Option<AvailableVerse>
where
    R: VerseRegistry + ?Sized,
{
    let token_id = event.token_id;
    let verse = match registry.get_verse(token_id).await {
        Ok(verse) => verse,
        Err(error) => {
            tracing::debug!(token_id, %error, "skipping unresolvable verse");
            return None;
        }
    };
    let current_owner = match registry.owner_of(token_id).await {
        Ok(address) => address,
        Err(error) => {
            tracing::debug!(token_id, %error, "skipping verse without an owner");
            return None;
        }
    };
    (current_owner == owner && !verse.is_complete).then(|| AvailableVerse {
        token_id,
        upper_verse: verse.upper_verse,
    })
}
