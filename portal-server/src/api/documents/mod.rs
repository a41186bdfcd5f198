//! Document API 模块

mod handler;

#[cfg(test)]
mod tests;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/createDocument", post(handler::create))
        .route(
            "/api/createDocumentWithCategory",
            post(handler::create_with_category),
        )
        .route(
            "/api/debug/document-categorization",
            post(handler::debug_categorization),
        )
        .route("/api/refreshDocumentLibrary", post(handler::refresh_library))
}
