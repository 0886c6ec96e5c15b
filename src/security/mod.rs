use axum::{
    routing::{get, put},
    Router,
};

use crate::state::AppState;

mod dto;
pub mod generator;
pub mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/security/dashboard", get(handlers::get_dashboard))
        .route("/security/update", put(handlers::update_dashboard))
        .route("/security/trends", get(handlers::get_trends))
}
