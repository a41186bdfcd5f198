//! Unit API 模块

mod handler;

#[cfg(test)]
mod tests;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/createUnit", post(handler::create))
        .route(
            "/api/createUnitWithForceFolder",
            post(handler::create_with_force_folder),
        )
        .route("/api/getUnits", post(handler::list_for_investor))
        .route("/api/getAllUnits", get(handler::list_all))
}
