// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use alloy::primitives::Address;
use assert_matches::assert_matches;
use waka_ethereum::{
    common::RegistryError,
    reconciler::{list_available, AvailableVerse},
    registry::{Verse, VerseRegistry},
    signature::{lower_verse_message, upper_verse_message, verify_signature},
    test_utils::{random_signer, sign_message, MemoryRegistry},
};

fn address(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

#[tokio::test]
async fn test_create_then_get() -> anyhow::Result<()> {
    let registry = MemoryRegistry::new(address(0xA1));
    let receipt = registry.create_upper_verse("東風吹かば").await?;

    let verse = registry.get_verse(receipt.token_id).await?;
    assert_eq!(verse.upper_verse, "東風吹かば");
    assert_eq!(verse.upper_creator, address(0xA1));
    assert!(!verse.is_complete);
    assert_eq!(registry.owner_of(receipt.token_id).await?, address(0xA1));
    Ok(())
}

#[tokio::test]
async fn test_waka_lifecycle() -> anyhow::Result<()> {
    let creator = address(0xA1);
    let collaborator = address(0xB2);
    let registry = MemoryRegistry::new(creator);

    let receipt = registry.create_upper_verse("春過ぎて").await?;
    let token_id = receipt.token_id;
    assert!(!registry.get_verse(token_id).await?.is_complete);

    registry
        .as_caller(collaborator)
        .add_lower_verse(token_id, "夏来にけらし")
        .await?;

    let verse = registry.get_verse(token_id).await?;
    assert_eq!(
        verse,
        Verse {
            upper_verse: "春過ぎて".to_owned(),
            lower_verse: "夏来にけらし".to_owned(),
            upper_creator: creator,
            lower_creator: collaborator,
            is_complete: true,
        }
    );
    // Completion does not move the token: the upper creator keeps it.
    assert_eq!(registry.owner_of(token_id).await?, creator);
    Ok(())
}

#[tokio::test]
async fn test_add_lower_verse_to_missing_token() -> anyhow::Result<()> {
    let registry = MemoryRegistry::new(address(0xB2));
    let result = registry.add_lower_verse(999, "x").await;
    assert_matches!(result, Err(RegistryError::NotFound(999)));
    // No state change: the event log is still empty.
    assert!(registry.created_verses().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_completed_verse_is_immutable() -> anyhow::Result<()> {
    let registry = MemoryRegistry::new(address(0xA1));
    let token_id = registry.create_upper_verse("春過ぎて").await?.token_id;
    registry
        .as_caller(address(0xB2))
        .add_lower_verse(token_id, "夏来にけらし")
        .await?;

    let before = registry.get_verse(token_id).await?;
    let result = registry
        .as_caller(address(0xB2))
        .add_lower_verse(token_id, "新しい下の句")
        .await;
    assert_matches!(result, Err(RegistryError::AlreadyComplete(id)) if id == token_id);
    // Idempotent rejection: the recorded content is unchanged.
    assert_eq!(registry.get_verse(token_id).await?, before);
    Ok(())
}

#[tokio::test]
async fn test_empty_text_is_rejected_locally() {
    let registry = MemoryRegistry::new(address(0xA1));
    assert_matches!(
        registry.create_upper_verse("").await,
        Err(RegistryError::EmptyVerse)
    );
    assert_matches!(
        registry.add_lower_verse(1, "").await,
        Err(RegistryError::EmptyVerse)
    );
}

#[test]
fn test_signature_recovery() {
    let (signer, signer_address) = random_signer();
    let (_, other_address) = random_signer();
    let message = upper_verse_message("春過ぎて");
    let signature = sign_message(&signer, &message);

    assert!(verify_signature(
        &message,
        &signature,
        &signer_address.to_string()
    ));
    // Address comparison ignores hex casing.
    assert!(verify_signature(
        &message,
        &signature,
        &signer_address.to_string().to_uppercase().replace("0X", "0x")
    ));
    assert!(!verify_signature(
        &message,
        &signature,
        &other_address.to_string()
    ));
    assert!(!verify_signature(
        "a different message",
        &signature,
        &signer_address.to_string()
    ));
}

#[test]
fn test_signature_verification_never_errors() {
    let (_, signer_address) = random_signer();
    assert!(!verify_signature(
        "msg",
        "not a signature",
        &signer_address.to_string()
    ));
    assert!(!verify_signature("msg", "0x1234", &signer_address.to_string()));
    let (signer, _) = random_signer();
    let signature = sign_message(&signer, "msg");
    assert!(!verify_signature("msg", &signature, "not an address"));
}

#[test]
fn test_lower_verse_message_binds_token_id() {
    assert_ne!(
        lower_verse_message(1, "夏来にけらし"),
        lower_verse_message(2, "夏来にけらし")
    );
}

#[tokio::test]
async fn test_reconciler_filters_ownership_and_completion() -> anyhow::Result<()> {
    let owner = address(0xA1);
    let stranger = address(0xC3);
    let registry = MemoryRegistry::new(owner);

    let pending = registry.create_upper_verse("春過ぎて").await?.token_id;
    let completed = registry.create_upper_verse("秋の田の").await?.token_id;
    registry
        .as_caller(address(0xB2))
        .add_lower_verse(completed, "かりほの庵の")
        .await?;
    // A verse created by someone else must never show up for `owner`.
    registry
        .as_caller(stranger)
        .create_upper_verse("田子の浦に")
        .await?;

    let available = list_available(&registry, owner).await?;
    assert_eq!(
        available,
        vec![AvailableVerse {
            token_id: pending,
            upper_verse: "春過ぎて".to_owned(),
        }]
    );

    // The stranger sees only their own pending verse.
    let available = list_available(&registry, stranger).await?;
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].upper_verse, "田子の浦に");
    Ok(())
}

#[tokio::test]
async fn test_reconciler_skips_unresolvable_entries() -> anyhow::Result<()> {
    let owner = address(0xA1);
    let registry = MemoryRegistry::new(owner);
    let kept = registry.create_upper_verse("春過ぎて").await?.token_id;
    let burned = registry.create_upper_verse("秋の田の").await?.token_id;
    registry.burn(burned);

    // The burned entry is skipped; the listing as a whole still succeeds.
    let available = list_available(&registry, owner).await?;
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].token_id, kept);
    Ok(())
}

#[tokio::test]
async fn test_offline_registry_reports_transport_failure() {
    let registry = MemoryRegistry::new(address(0xA1));
    registry.set_offline(true);

    let error = registry.create_upper_verse("春過ぎて").await.unwrap_err();
    assert_matches!(error, RegistryError::Transport(_));
    assert!(error.is_retryable());

    // The scan itself failing is the one case the reconciler propagates.
    assert_matches!(
        list_available(&registry, address(0xA1)).await,
        Err(RegistryError::Transport(_))
    );
}

#[tokio::test]
async fn test_malformed_success_is_distinct_and_preserves_the_write() -> anyhow::Result<()> {
    let registry = MemoryRegistry::new(address(0xA1));
    registry.drop_created_events(true);

    let error = registry.create_upper_verse("春過ぎて").await.unwrap_err();
    assert_matches!(error, RegistryError::EventMissing { .. });
    assert!(!error.is_retryable());

    // The transaction went through; callers must not assume it did not.
    let verse = registry.get_verse(1).await?;
    assert_eq!(verse.upper_verse, "春過ぎて");
    Ok(())
}

#[tokio::test]
async fn test_racing_completions_leave_one_winner() -> anyhow::Result<()> {
    let registry = MemoryRegistry::new(address(0xA1));
    let token_id = registry.create_upper_verse("春過ぎて").await?.token_id;

    let first = registry.as_caller(address(0xB2));
    let second = registry.as_caller(address(0xC3));
    let (one, two) = tokio::join!(
        first.add_lower_verse(token_id, "夏来にけらし"),
        second.add_lower_verse(token_id, "衣ほすてふ"),
    );

    // Exactly one call wins; the loser observes a rejection, never a
    // silent overwrite.
    assert!(one.is_ok() != two.is_ok());
    let verse = registry.get_verse(token_id).await?;
    assert!(verse.is_complete);
    let winner = if one.is_ok() { address(0xB2) } else { address(0xC3) };
    assert_eq!(verse.lower_creator, winner);
    Ok(())
}
