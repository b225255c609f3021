pub mod client;
pub mod dispatcher;
mod dto;
pub mod handlers;
pub mod operation;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::ai_routes())
}
