// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The REST service in front of the waka verse registry.
//!
//! Each endpoint is one sequential pipeline: validate the payload, verify the
//! author's signature, forward to the registry client, and map the outcome to
//! a JSON response. There is no retry at this layer; transient failures are
//! reported to the caller, who owns resubmission.

mod models;
mod routes;

use std::{net::SocketAddr, sync::Arc};

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use waka_ethereum::registry::VerseRegistry;

/// Shared state handed to every route handler.
#[derive(Clone)]
pub struct AppState {
    /// The verse registry of record. All local state is a projection of it.
    pub registry: Arc<dyn VerseRegistry>,
}

/// Builds the API router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(routes::health))
        .route(
            "/api/waka/create-upper-verse",
            post(routes::create_upper_verse),
        )
        .route(
            "/api/waka/create-lower-verse",
            post(routes::create_lower_verse),
        )
        .route("/api/waka/available/{address}", get(routes::available_verses))
        .route("/api/waka/{id}", get(routes::get_waka))
        .layer(cors)
        .with_state(state)
}

/// Serves the API on `port` until ctrl-c.
pub async fn serve(state: AppState, port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("waka service listening on port {}", port);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    tracing::info!("Shutting down server...");
}
