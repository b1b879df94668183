// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The Ethereum-backed verse registry client.

use std::time::Duration;

use alloy::{
    network::EthereumWallet,
    primitives::{Address, U256},
    providers::{DynProvider, Provider as _, ProviderBuilder},
    sol,
};
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;

use crate::{
    common::RegistryError,
    registry::{
        CompletionReceipt, RegistryConfig, UpperVerseReceipt, Verse, VerseCreated, VerseRegistry,
    },
};

sol! {
    #[sol(rpc)]
    contract WakaNFT {
        event UpperVerseCreated(uint256 indexed tokenId, address creator, string upperVerse);
        event LowerVerseAdded(uint256 indexed tokenId, address creator, string lowerVerse);
        event WakaCompleted(uint256 indexed tokenId, address upperCreator, address lowerCreator);

        function createUpperVerse(string memory upperVerse) public returns (uint256);
        function addLowerVerse(uint256 tokenId, string memory lowerVerse) public;
        function getVerse(uint256 tokenId) public view returns (
            string memory upperVerse,
            string memory lowerVerse,
            address upperCreator,
            address lowerCreator,
            bool isComplete
        );
        function ownerOf(uint256 tokenId) public view returns (address owner);
    }
}

/// How long to wait for a submitted transaction to be included before giving
/// up. Inclusion is externally paced; this only bounds the hang.
const INCLUSION_TIMEOUT: Duration = Duration::from_secs(60);

/// A verse registry reached over JSON-RPC.
pub struct EthereumVerseRegistry {
    contract: WakaNFT::WakaNFTInstance<DynProvider>,
}

impl EthereumVerseRegistry {
    /// Connects to the registry for read-only use.
    pub fn connect(config: &RegistryConfig) -> Self {
        let provider = ProviderBuilder::new()
            .connect_http(config.rpc_url.clone())
            .erased();
        Self {
            contract: WakaNFT::new(config.contract_address, provider),
        }
    }

    /// Connects with a signer so state-changing operations can be submitted.
    pub fn connect_with_signer(config: &RegistryConfig, signer: PrivateKeySigner) -> Self {
        let wallet = EthereumWallet::from(signer);
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(config.rpc_url.clone())
            .erased();
        Self {
            contract: WakaNFT::new(config.contract_address, provider),
        }
    }

    /// The address of the registry contract this client talks to.
    pub fn contract_address(&self) -> Address {
        *self.contract.address()
    }
}

#[async_trait]
impl VerseRegistry for EthereumVerseRegistry {
    async fn create_upper_verse(&self, text: &str) -> Result<UpperVerseReceipt, RegistryError> {
        if text.is_empty() {
            return Err(RegistryError::EmptyVerse);
        }
        let pending = self
            .contract
            .createUpperVerse(text.to_owned())
            .send()
            .await
            .map_err(RegistryError::from_call_error)?;
        let receipt = pending
            .with_timeout(Some(INCLUSION_TIMEOUT))
            .get_receipt()
            .await?;
        let tx_hash = receipt.transaction_hash;
        if !receipt.status() {
            return Err(RegistryError::TransactionFailed { tx_hash });
        }
        let created = receipt
            .inner
            .logs()
            .iter()
            .find_map(|log| log.log_decode::<WakaNFT::UpperVerseCreated>().ok())
            .ok_or(RegistryError::EventMissing { tx_hash })?;
        let token_id = token_id_from_uint(created.inner.data.tokenId)?;
        tracing::info!(token_id, %tx_hash, "created upper verse");
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
        let pending = self
            .contract
            .addLowerVerse(U256::from(token_id), text.to_owned())
            .send()
            .await
            .map_err(|error| RegistryError::from_token_call_error(error, token_id))?;
        let receipt = pending
            .with_timeout(Some(INCLUSION_TIMEOUT))
            .get_receipt()
            .await?;
        let tx_hash = receipt.transaction_hash;
        if !receipt.status() {
            return Err(RegistryError::TransactionFailed { tx_hash });
        }
        // The decoded event confirms the completion; callers wanting the full
        // projection call `get_verse` explicitly.
        let confirmed = receipt
            .inner
            .logs()
            .iter()
            .any(|log| log.log_decode::<WakaNFT::LowerVerseAdded>().is_ok());
        if !confirmed {
            return Err(RegistryError::EventMissing { tx_hash });
        }
        tracing::info!(token_id, %tx_hash, "added lower verse");
        Ok(CompletionReceipt { token_id, tx_hash })
    }

    async fn get_verse(&self, token_id: u64) -> Result<Verse, RegistryError> {
        let verse = self
            .contract
            .getVerse(U256::from(token_id))
            .call()
            .await
            .map_err(|error| RegistryError::from_token_call_error(error, token_id))?;
        Ok(Verse {
            upper_verse: verse.upperVerse,
            lower_verse: verse.lowerVerse,
            upper_creator: verse.upperCreator,
            lower_creator: verse.lowerCreator,
            is_complete: verse.isComplete,
        })
    }

    async fn owner_of(&self, token_id: u64) -> Result<Address, RegistryError> {
        self.contract
            .ownerOf(U256::from(token_id))
            .call()
            .await
            .map_err(|error| RegistryError::from_token_call_error(error, token_id))
    }

    async fn created_verses(&self) -> Result<Vec<VerseCreated>, RegistryError> {
        let events = self
            .contract
            .UpperVerseCreated_filter()
            .from_block(0)
            .query()
            .await
            .map_err(RegistryError::from_call_error)?;
        events
            .into_iter()
            .map(|(event, log)| {
                Ok(VerseCreated {
                    token_id: token_id_from_uint(event.tokenId)?,
                    creator: event.creator,
                    upper_verse: event.upperVerse,
                    block_number: log.block_number,
                })
            })
            .collect()
    }
}

fn token_id_from_uint(value: U256) -> Result<u64, RegistryError> {
    u64::try_from(value).map_err(|_| RegistryError::TokenIdOutOfRange)
}
