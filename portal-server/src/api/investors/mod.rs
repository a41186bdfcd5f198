//! Investor API 模块

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/createInvestor", post(handler::create))
        .route("/api/createInvestorFixed", post(handler::create_fixed))
        .route("/api/findInvestorByEmail", post(handler::find_by_email))
        .route("/api/updateInvestor", post(handler::update))
        .route("/api/getInvestorData", post(handler::get_data))
}
