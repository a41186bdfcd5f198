//! Order API Handlers

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use shared::models::{Order, OrderCreate};
use shared::{ApiResponse, DataEnvelope};

use crate::api::{AppError, AppResult, InvestorIdBody, now_iso, timestamp_id};
use crate::core::ServerState;

#[derive(Serialize)]
pub struct OrderResponse {
    pub success: bool,
    pub data: Order,
    pub message: &'static str,
}

/// POST /api/createOrder - 创建订单并持久化
pub async fn create(
    State(state): State<ServerState>,
    Json(body): Json<DataEnvelope<OrderCreate>>,
) -> AppResult<Json<OrderResponse>> {
    let data = body
        .data
        .ok_or_else(|| AppError::validation("Invalid order data"))?;
    let Some(investor_id) = data.investor_id.filter(|s| !s.is_empty()) else {
        return Err(AppError::validation("Invalid order data"));
    };
    if data.items.is_empty() {
        return Err(AppError::validation("Invalid order data"));
    }

    let order = Order {
        id: data.id.filter(|s| !s.is_empty()).unwrap_or_else(timestamp_id),
        investor_id,
        items: data.items,
        total_amount: data.total_amount,
        status: data.status.unwrap_or_else(|| "pending".into()),
        bank_transfer_proof: None,
        created_at: data.created_at.unwrap_or_else(now_iso),
        updated_at: None,
    };

    state
        .store
        .orders
        .mutate(|list| list.push(order.clone()))
        .await?;

    tracing::info!(order = %order.id, investor = %order.investor_id, "Order created");

    Ok(Json(OrderResponse {
        success: true,
        data: order,
        message: "Order created successfully",
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusUpdate {
    pub order_id: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub bank_transfer_proof: Option<String>,
}

/// POST /api/updateOrderStatus - 更新订单状态 (银行转账凭证可选)
pub async fn update_status(
    State(state): State<ServerState>,
    Json(body): Json<OrderStatusUpdate>,
) -> AppResult<Json<OrderResponse>> {
    let (Some(order_id), Some(status)) = (
        body.order_id.filter(|s| !s.is_empty()),
        body.status.filter(|s| !s.is_empty()),
    ) else {
        return Err(AppError::validation("Order ID and status are required"));
    };

    let updated = state
        .store
        .orders
        .mutate(|list| {
            let order = list.iter_mut().find(|o| o.id == order_id)?;
            order.status = status.clone();
            if body.bank_transfer_proof.is_some() {
                order.bank_transfer_proof = body.bank_transfer_proof.clone();
            }
            order.updated_at = Some(now_iso());
            Some(order.clone())
        })
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;

    tracing::info!(order = %updated.id, status = %updated.status, "Order updated");

    Ok(Json(OrderResponse {
        success: true,
        data: updated,
        message: "Order updated successfully",
    }))
}

/// POST /api/getOrders - 投资人的订单列表
pub async fn list_for_investor(
    State(state): State<ServerState>,
    Json(body): Json<InvestorIdBody>,
) -> AppResult<Json<ApiResponse<Vec<Order>>>> {
    let investor_id = body.require()?.to_string();

    let orders = state
        .store
        .orders
        .read(|list| {
            list.iter()
                .filter(|o| o.investor_id == investor_id)
                .cloned()
                .collect()
        })
        .await;

    Ok(Json(ApiResponse::success(orders)))
}
