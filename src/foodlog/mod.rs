pub mod aggregate;
mod dto;
pub mod handlers;
pub mod model;
pub mod persist;
mod services;
pub mod store;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::read_router())
        .merge(handlers::write_router())
}
