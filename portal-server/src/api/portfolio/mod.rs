//! Portfolio API 模块

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/getPortfolioValue", post(handler::get_value))
}
