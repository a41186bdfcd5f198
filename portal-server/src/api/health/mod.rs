//! 状态与调试 API 模块

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::status))
        .route("/api/debug/comprehensive", get(handler::comprehensive))
}
