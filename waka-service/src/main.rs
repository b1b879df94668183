// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use alloy::primitives::Address;
use alloy_signer_local::PrivateKeySigner;
use anyhow::Context as _;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter};
use url::Url;
use waka_ethereum::{client::EthereumVerseRegistry, registry::RegistryConfig};
use waka_service::{serve, AppState};

/// Run the REST API in front of the WakaNFT verse registry.
#[derive(Parser)]
#[command(
    name = "waka-service",
    about = "Run the REST API where collaborators mint and complete waka verses"
)]
struct WakaServiceOptions {
    /// Address of the deployed verse registry contract. The service refuses
    /// to start without it.
    #[arg(long, env = "WAKA_REGISTRY_ADDRESS")]
    registry_address: Address,

    /// JSON-RPC endpoint of the Ethereum node.
    #[arg(long, env = "WAKA_RPC_URL", default_value = "http://localhost:8545")]
    rpc_url: Url,

    /// Hex-encoded private key of the operator account submitting
    /// transactions on behalf of verified authors.
    #[arg(long, env = "WAKA_OPERATOR_KEY", hide_env_values = true)]
    operator_key: String,

    /// The port on which to run the server.
    #[arg(long, default_value = "8080")]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let options = WakaServiceOptions::parse();
    let signer: PrivateKeySigner = options
        .operator_key
        .parse()
        .context("WAKA_OPERATOR_KEY is not a valid private key")?;
    let config = RegistryConfig {
        contract_address: options.registry_address,
        rpc_url: options.rpc_url,
    };
    tracing::info!(
        contract = %config.contract_address,
        rpc = %config.rpc_url,
        operator = %signer.address(),
        "connecting to verse registry"
    );
    let registry = EthereumVerseRegistry::connect_with_signer(&config, signer);

    serve(
        AppState {
            registry: Arc::new(registry),
        },
        options.port,
    )
    .await
}
