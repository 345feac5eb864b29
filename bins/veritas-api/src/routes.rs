use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/verify", post(handlers::verify))
        .route("/constraints", post(handlers::check_constraints))
        .route("/status", get(handlers::health_check))
}
