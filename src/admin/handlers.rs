use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::admin::AdminState;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SystemStatus {
    pub version: String,
    pub status: String,
    pub endpoints: usize,
    pub live_endpoints: usize,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EndpointStatus {
    pub address: String,
    pub alive: bool,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    let live = state.registry.live_count();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: if live > 0 { "operational" } else { "unavailable" }.to_string(),
        endpoints: state.registry.len(),
        live_endpoints: live,
    })
}

pub async fn get_endpoints(State(state): State<AdminState>) -> Json<Vec<EndpointStatus>> {
    Json(
        state
            .registry
            .iter()
            .map(|e| EndpointStatus {
                address: e.url().to_string(),
                alive: e.is_alive(),
            })
            .collect(),
    )
}
