//! Read-only JSON views over the inventory artifact and the lease source.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use tracing::info;
use ztpinv_core::query::{self, InventoryView, LeaseRow};

use crate::commands::ServeArgs;

#[derive(Clone)]
pub struct QueryState {
    pub leases_path: Arc<PathBuf>,
    pub inventory_path: Arc<PathBuf>,
}

pub fn router(state: QueryState) -> Router {
    Router::new()
        .route("/inventory", get(inventory))
        .route("/leases", get(leases))
        .route("/health", get(health))
        .with_state(state)
}

async fn inventory(State(state): State<QueryState>) -> Json<InventoryView> {
    let path = state.inventory_path.clone();
    let view = tokio::task::spawn_blocking(move || query::read_inventory(&path))
        .await
        .unwrap_or_default();
    Json(view)
}

async fn leases(State(state): State<QueryState>) -> Json<Vec<LeaseRow>> {
    let path = state.leases_path.clone();
    let rows = tokio::task::spawn_blocking(move || query::read_lease_rows(&path))
        .await
        .unwrap_or_default();
    Json(rows)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn serve(args: &ServeArgs) -> anyhow::Result<()> {
    let state = QueryState {
        leases_path: Arc::new(args.leases.clone()),
        inventory_path: Arc::new(args.inventory.clone()),
    };

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("binding {}", args.bind))?;
    info!("Serving inventory and leases on http://{}", args.bind);

    axum::serve(listener, router(state))
        .await
        .context("query server stopped")
}
