// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Request and response payloads, with field-level validation.
//!
//! Requests deserialize leniently (missing fields become empty defaults) so
//! that every schema violation is reported as a field-level error rather than
//! a deserializer rejection. Validation returns the first failing field with
//! a human-readable reason.

use std::fmt;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use waka_ethereum::registry::{Verse, MAX_VERSE_LENGTH};

/// A request field that failed validation, and why.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn invalid(field: &'static str, message: impl Into<String>) -> ValidationError {
    ValidationError {
        field,
        message: message.into(),
    }
}

/// Verse text must be 1 to [`MAX_VERSE_LENGTH`] characters.
fn validate_verse_text(field: &'static str, text: &str) -> Result<(), ValidationError> {
    if text.is_empty() {
        return Err(invalid(field, "is required"));
    }
    if text.chars().count() > MAX_VERSE_LENGTH {
        return Err(invalid(
            field,
            format!("must be at most {MAX_VERSE_LENGTH} characters"),
        ));
    }
    Ok(())
}

fn validate_signature(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(invalid(field, "is required"));
    }
    Ok(())
}

fn validate_address(field: &'static str, value: &str) -> Result<Address, ValidationError> {
    if value.is_empty() {
        return Err(invalid(field, "is required"));
    }
    value
        .parse()
        .map_err(|_| invalid(field, "must be a hex address"))
}

/// Body of `POST /api/waka/create-upper-verse` (the `upperVerse` schema).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUpperVerseRequest {
    #[serde(default)]
    pub upper_verse: String,
    #[serde(default)]
    pub signature: String,
    #[serde(default)]
    pub signer_address: String,
}

/// A validated upper-verse submission.
#[derive(Debug)]
pub struct UpperVerseSubmission {
    pub upper_verse: String,
    pub signature: String,
    pub signer_address: String,
}

impl CreateUpperVerseRequest {
    pub fn validate(self) -> Result<UpperVerseSubmission, ValidationError> {
        validate_verse_text("upperVerse", &self.upper_verse)?;
        validate_signature("signature", &self.signature)?;
        validate_address("signerAddress", &self.signer_address)?;
        Ok(UpperVerseSubmission {
            upper_verse: self.upper_verse,
            signature: self.signature,
            signer_address: self.signer_address,
        })
    }
}

/// Body of `POST /api/waka/create-lower-verse` (the `lowerVerse` schema).
///
/// `verseId` is accepted as an alias of `tokenId` for callers still on the
/// older field name; both refer to the registry-assigned token id.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLowerVerseRequest {
    #[serde(default, alias = "verseId")]
    pub token_id: Option<u64>,
    #[serde(default)]
    pub lower_verse: String,
    #[serde(default)]
    pub signature: String,
    #[serde(default)]
    pub signer_address: String,
}

/// A validated lower-verse submission.
#[derive(Debug)]
pub struct LowerVerseSubmission {
    pub token_id: u64,
    pub lower_verse: String,
    pub signature: String,
    pub signer_address: String,
}

impl CreateLowerVerseRequest {
    pub fn validate(self) -> Result<LowerVerseSubmission, ValidationError> {
        let token_id = self.token_id.ok_or_else(|| invalid("tokenId", "is required"))?;
        validate_verse_text("lowerVerse", &self.lower_verse)?;
        validate_signature("signature", &self.signature)?;
        validate_address("signerAddress", &self.signer_address)?;
        Ok(LowerVerseSubmission {
            token_id,
            lower_verse: self.lower_verse,
            signature: self.signature,
            signer_address: self.signer_address,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUpperVerseResponse {
    pub token_id: u64,
    pub tx_hash: String,
    pub upper_verse: String,
    /// Where a collaborator completes this verse.
    pub collaboration_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLowerVerseResponse {
    pub token_id: u64,
    pub tx_hash: String,
    pub lower_verse: String,
    pub status: &'static str,
}

/// Body of `GET /api/waka/{id}`.
#[derive(Debug, Serialize)]
pub struct WakaResponse {
    pub payload: WakaPayload,
}

/// The projection of one waka, straight from the registry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WakaPayload {
    pub token_id: u64,
    pub upper_verse: String,
    pub lower_verse: Option<String>,
    pub upper_creator: String,
    pub lower_creator: Option<String>,
    pub is_complete: bool,
}

impl WakaPayload {
    pub fn from_verse(token_id: u64, verse: Verse) -> Self {
        let (lower_verse, lower_creator) = if verse.is_complete {
            (
                Some(verse.lower_verse),
                Some(verse.lower_creator.to_string()),
            )
        } else {
            (None, None)
        };
        Self {
            token_id,
            upper_verse: verse.upper_verse,
            lower_verse,
            upper_creator: verse.upper_creator.to_string(),
            lower_creator,
            is_complete: verse.is_complete,
        }
    }

    /// The `completeWaka` schema: a finished waka must carry both bounded
    /// verses and both creators before it goes out the door.
    pub fn validate_complete(&self) -> Result<(), ValidationError> {
        validate_verse_text("upperVerse", &self.upper_verse)?;
        let lower_verse = self
            .lower_verse
            .as_deref()
            .ok_or_else(|| invalid("lowerVerse", "is required"))?;
        validate_verse_text("lowerVerse", lower_verse)?;
        if self.lower_creator.is_none() {
            return Err(invalid("lowerCreator", "is required"));
        }
        Ok(())
    }
}

/// One entry of `GET /api/waka/available/{address}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableVerseView {
    pub token_id: u64,
    pub upper_verse: String,
}

impl From<waka_ethereum::reconciler::AvailableVerse> for AvailableVerseView {
    fn from(verse: waka_ethereum::reconciler::AvailableVerse) -> Self {
        Self {
            token_id: verse.token_id,
            upper_verse: verse.upper_verse,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    fn upper_request(upper_verse: &str) -> CreateUpperVerseRequest {
        CreateUpperVerseRequest {
            upper_verse: upper_verse.to_owned(),
            signature: "0xsig".to_owned(),
            signer_address: Address::repeat_byte(1).to_string(),
        }
    }

    #[test]
    fn upper_verse_bounds() {
        assert!(upper_request("春過ぎて").validate().is_ok());
        assert!(upper_request(&"あ".repeat(MAX_VERSE_LENGTH)).validate().is_ok());

        let error = upper_request("").validate().unwrap_err();
        assert_eq!(error.field, "upperVerse");
        let error = upper_request(&"あ".repeat(MAX_VERSE_LENGTH + 1))
            .validate()
            .unwrap_err();
        assert_eq!(error.field, "upperVerse");
    }

    #[test]
    fn first_failing_field_is_reported() {
        let request = CreateLowerVerseRequest {
            token_id: None,
            lower_verse: String::new(),
            signature: String::new(),
            signer_address: String::new(),
        };
        assert_eq!(request.validate().unwrap_err().field, "tokenId");

        let request = CreateLowerVerseRequest {
            token_id: Some(1),
            lower_verse: "夏来にけらし".to_owned(),
            signature: String::new(),
            signer_address: String::new(),
        };
        assert_eq!(request.validate().unwrap_err().field, "signature");
    }

    #[test]
    fn signer_address_must_parse() {
        let mut request = upper_request("春過ぎて");
        request.signer_address = "not-an-address".to_owned();
        let error = request.validate().unwrap_err();
        assert_eq!(error.field, "signerAddress");
    }
}
