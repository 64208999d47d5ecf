pub mod draft;
pub mod health;

use axum::Router;
use std::sync::Arc;

use crate::AppState;

/// Build all routes for the gateway
pub fn build_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(draft::routes())
        .merge(health::routes())
}
