//! Portfolio API Handlers

use axum::{Json, extract::State};
use serde::Serialize;

use crate::api::{AppResult, InvestorIdBody};
use crate::core::ServerState;
use crate::portfolio::{self, PortfolioValue};

#[derive(Serialize)]
pub struct PortfolioResponse {
    pub success: bool,
    pub data: PortfolioValue,
    /// 计算口径标识，前端据此显示说明
    pub calculation: &'static str,
}

/// POST /api/getPortfolioValue - 投资人持仓估值 (仅 OTP 文档)
pub async fn get_value(
    State(state): State<ServerState>,
    Json(body): Json<InvestorIdBody>,
) -> AppResult<Json<PortfolioResponse>> {
    let investor_id = body.require()?.to_string();

    let data = state
        .store
        .documents
        .read(|documents| portfolio::compute(documents, &investor_id))
        .await;

    tracing::debug!(
        investor = %investor_id,
        value = data.portfolio_value,
        otp = data.otp_count,
        "Portfolio value calculated"
    );

    Ok(Json(PortfolioResponse {
        success: true,
        data,
        calculation: "OTP_DOCUMENTS_ONLY",
    }))
}
