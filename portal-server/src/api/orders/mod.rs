//! Order API 模块

mod handler;

#[cfg(test)]
mod tests;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/createOrder", post(handler::create))
        .route("/api/updateOrderStatus", post(handler::update_status))
        .route("/api/getOrders", post(handler::list_for_investor))
}
