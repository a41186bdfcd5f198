//! 状态与调试 Handlers

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::api::now_iso;
use crate::core::ServerState;

/// GET / - 服务状态概览
///
/// 前端启动页轮询这个端点；fixes 列表是历史遗留的展示文案。
pub async fn status(State(state): State<ServerState>) -> Json<Value> {
    let counts = state.store.counts().await;

    Json(json!({
        "message": "Investor Portal Backend",
        "timestamp": now_iso(),
        "status": "OK",
        "totalInvestors": counts.investors,
        "totalDocuments": counts.documents,
        "totalUnits": counts.units,
        "fixes": [
            "Unit folder creation in Google Drive with force creation",
            "Document categorization persistence after logout/login",
            "Portfolio value calculation from OTP documents only",
            "Clean unit dropdown with simple names",
        ],
    }))
}

/// GET /api/debug/comprehensive - 适配器状态 + 集合总量
pub async fn comprehensive(State(state): State<ServerState>) -> Json<Value> {
    let counts = state.store.counts().await;
    let drive_status = if state.drive.enabled() {
        "Connected"
    } else {
        "Not initialized"
    };

    Json(json!({
        "success": true,
        "timestamp": now_iso(),
        "googleDrive": {
            "status": drive_status,
            "parentFolderId": state.config.drive.parent_folder_id,
        },
        "notion": {
            "enabled": state.notion.enabled(),
        },
        "dataStatus": {
            "investors": counts.investors,
            "documents": counts.documents,
            "units": counts.units,
            "orders": counts.orders,
        },
    }))
}
