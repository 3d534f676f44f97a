//! `uiforge serve` command implementation.
//!
//! Builds the policy-enforcing CRUD router for every model in the
//! schema snapshot and serves it over an in-memory store. Meant for
//! frontend development against generated components.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use uiforge_core::ComponentRegistry;
use uiforge_policy::aggregate;
use uiforge_rest::{MemoryStore, RestEndpointFactory};

use super::load_config;

pub async fn run(config_path: &Path) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let registry = ComponentRegistry::from_config(&config)?;

    let policies = aggregate(registry.descriptors());
    info!(
        models = policies.len(),
        components = registry.len(),
        "aggregated access policy"
    );

    let store = Arc::new(MemoryStore::new(config.schema.clone()));
    let router = RestEndpointFactory::new(store).router(&config.schema, &policies);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    info!(addr = %config.server.bind_addr, "REST server listening");
    axum::serve(listener, router).await?;
    Ok(())
}
