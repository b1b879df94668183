// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! This crate provides client-side functionality for the WakaNFT verse
//! registry: a collaborative poem where one party mints an upper verse and a
//! second party later completes it with a lower verse.
//!
//! The registry itself is an opaque remote service; everything here is either
//! a typed wrapper around its fixed interface or a read-only projection
//! rebuilt from its event log.

pub mod client;
pub mod common;
pub mod reconciler;
pub mod registry;
pub mod signature;

/// Helper types for tests.
pub mod test_utils;
