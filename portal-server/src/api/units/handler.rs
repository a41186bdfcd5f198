//! Unit API Handlers

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use shared::models::{Investor, Unit, UnitProjection};
use shared::{ApiResponse, DataEnvelope};

use crate::api::{AppError, AppResult, InvestorIdBody, now_iso, timestamp_id};
use crate::catalog;
use crate::core::ServerState;

/// Legacy 创建 payload (unitName/unitDetails/developer/amount/sqft)
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitCreate {
    pub investor_id: Option<String>,
    pub unit_name: Option<String>,
    #[serde(default)]
    pub unit_details: Option<String>,
    #[serde(default)]
    pub developer: Option<String>,
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub sqft: Option<String>,
}

/// 新式创建 payload - 数值字段前端可能传字符串，用 Value 接收
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitForceCreate {
    pub investor_id: Option<String>,
    pub name: Option<String>,
    pub unit_name: Option<String>,
    #[serde(default)]
    pub unit_number: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub developer: Option<String>,
    #[serde(rename = "type", default)]
    pub unit_type: Option<String>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub sqft: Option<String>,
    #[serde(default)]
    pub current_value: Option<Value>,
    #[serde(default)]
    pub purchase_value: Option<Value>,
    #[serde(default)]
    pub monthly_rental: Option<Value>,
    #[serde(default)]
    pub occupancy_status: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// 数字或数字字符串 → f64，其余归零 (parseFloat 语义)
fn lossy_f64(value: &Option<Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().ok().filter(|v: &f64| v.is_finite()).unwrap_or(0.0),
        _ => 0.0,
    }
}

async fn find_investor(state: &ServerState, id: &str) -> AppResult<Investor> {
    state
        .store
        .investors
        .read(|list| list.iter().find(|inv| inv.id == id).cloned())
        .await
        .ok_or_else(|| AppError::not_found("Investor"))
}

/// POST /api/createUnit - 创建单元 (legacy 字段集)
pub async fn create(
    State(state): State<ServerState>,
    Json(body): Json<DataEnvelope<UnitCreate>>,
) -> AppResult<Json<ApiResponse<Unit>>> {
    let data = body
        .data
        .ok_or_else(|| AppError::validation("Investor ID and unit name are required"))?;
    let (Some(investor_id), Some(unit_name)) = (
        data.investor_id.filter(|s| !s.is_empty()),
        data.unit_name.filter(|s| !s.is_empty()),
    ) else {
        return Err(AppError::validation("Investor ID and unit name are required"));
    };

    let investor = find_investor(&state, &investor_id).await?;

    // 文件夹创建 best-effort，单次尝试
    let folder_id = match investor.google_drive_folder_id.as_deref() {
        Some(root) => state.drive.ensure_folder(&unit_name, root).await.ok(),
        None => None,
    };

    let unit = Unit {
        id: timestamp_id(),
        investor_id,
        name: None,
        unit_name: Some(unit_name),
        unit_number: None,
        project: None,
        unit_type: None,
        area: None,
        unit_details: Some(data.unit_details.unwrap_or_default()),
        developer: Some(data.developer.unwrap_or_default()),
        amount: Some(lossy_f64(&data.amount)),
        sqft: Some(data.sqft.unwrap_or_default()),
        current_value: None,
        purchase_value: None,
        monthly_rental: None,
        occupancy_status: None,
        location: None,
        google_drive_folder_id: folder_id,
        google_drive_error: None,
        folder_creation_attempts: None,
        created_at: Some(now_iso()),
    };

    state
        .store
        .units
        .mutate(|list| list.push(unit.clone()))
        .await?;

    Ok(Json(ApiResponse::success(unit)))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitStorage {
    pub local: bool,
    pub google_drive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_drive_error: Option<String>,
}

/// 文件夹创建过程报告
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderCreationReport {
    pub success: bool,
    pub attempts: u32,
    pub folder_id: Option<String>,
    pub folder_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitForceCreateResponse {
    pub success: bool,
    pub data: Unit,
    pub storage: UnitStorage,
    pub folder_creation: FolderCreationReport,
    pub warnings: Vec<String>,
}

/// POST /api/createUnitWithForceFolder - 创建单元并强制建 Drive 文件夹
pub async fn create_with_force_folder(
    State(state): State<ServerState>,
    Json(body): Json<DataEnvelope<UnitForceCreate>>,
) -> AppResult<Json<UnitForceCreateResponse>> {
    let data = body
        .data
        .ok_or_else(|| AppError::validation("Investor ID and unit name are required"))?;

    // 新旧字段名都接受
    let unit_name = data
        .name
        .clone()
        .or(data.unit_name.clone())
        .filter(|s| !s.is_empty());
    let (Some(investor_id), Some(unit_name)) = (
        data.investor_id.clone().filter(|s| !s.is_empty()),
        unit_name,
    ) else {
        return Err(AppError::validation("Investor ID and unit name are required"));
    };

    let investor = find_investor(&state, &investor_id).await?;
    let Some(investor_root) = investor.google_drive_folder_id.clone() else {
        return Err(AppError::validation(
            "Investor does not have a main Google Drive folder. Cannot create unit folder.",
        ));
    };

    let unit_number = data.unit_number.clone().unwrap_or_default();
    let folder_name = if unit_number.is_empty() {
        unit_name.clone()
    } else {
        format!("{} ({})", unit_name, unit_number)
    };

    let (folder_id, folder_error, attempts) =
        catalog::create_folder_with_retries(&state.drive, &folder_name, &investor_root).await;

    let unit = Unit {
        id: timestamp_id(),
        investor_id,
        name: Some(unit_name.clone()),
        unit_name: None,
        unit_number: Some(unit_number),
        project: Some(
            data.project
                .clone()
                .or(data.developer.clone())
                .unwrap_or_default(),
        ),
        unit_type: Some(data.unit_type.clone().unwrap_or_else(|| "Studio".into())),
        area: Some(
            data.area
                .clone()
                .or(data.sqft.clone())
                .unwrap_or_else(|| "0".into()),
        ),
        unit_details: None,
        developer: None,
        amount: None,
        sqft: None,
        current_value: Some(lossy_f64(&data.current_value)),
        purchase_value: Some(lossy_f64(&data.purchase_value)),
        monthly_rental: Some(lossy_f64(&data.monthly_rental)),
        occupancy_status: Some(
            data.occupancy_status
                .clone()
                .unwrap_or_else(|| "Vacant".into()),
        ),
        location: Some(
            data.location
                .clone()
                .unwrap_or_else(|| "Dubai, UAE".into()),
        ),
        google_drive_folder_id: folder_id.clone(),
        google_drive_error: folder_error.clone(),
        folder_creation_attempts: Some(attempts),
        created_at: Some(now_iso()),
    };

    state
        .store
        .units
        .mutate(|list| list.push(unit.clone()))
        .await?;

    tracing::info!(
        unit = %unit_name,
        folder = ?folder_id,
        attempts = attempts,
        "Unit created"
    );

    Ok(Json(UnitForceCreateResponse {
        success: true,
        storage: UnitStorage {
            local: true,
            google_drive: folder_id.is_some(),
            google_drive_error: folder_error.clone(),
        },
        folder_creation: FolderCreationReport {
            success: folder_id.is_some(),
            attempts,
            folder_id,
            folder_name,
            error: folder_error.clone(),
        },
        warnings: folder_error.into_iter().collect(),
        data: unit,
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitListResponse {
    pub success: bool,
    pub data: Vec<UnitProjection>,
    pub total: usize,
    pub investor_id: String,
}

/// POST /api/getUnits - 投资人的单元列表 (下拉框干净投影)
pub async fn list_for_investor(
    State(state): State<ServerState>,
    Json(body): Json<InvestorIdBody>,
) -> AppResult<Json<UnitListResponse>> {
    let investor_id = body.require()?.to_string();

    let data: Vec<UnitProjection> = state
        .store
        .units
        .read(|list| {
            list.iter()
                .filter(|u| u.investor_id == investor_id)
                .map(UnitProjection::from)
                .collect()
        })
        .await;

    Ok(Json(UnitListResponse {
        success: true,
        total: data.len(),
        data,
        investor_id,
    }))
}

#[derive(Serialize)]
pub struct AllUnitsResponse {
    pub success: bool,
    pub data: Vec<Unit>,
    pub total: usize,
}

/// GET /api/getAllUnits - 全部单元 (原始记录)
pub async fn list_all(State(state): State<ServerState>) -> AppResult<Json<AllUnitsResponse>> {
    let data = state.store.units.read(|list| list.to_vec()).await;
    Ok(Json(AllUnitsResponse {
        success: true,
        total: data.len(),
        data,
    }))
}
