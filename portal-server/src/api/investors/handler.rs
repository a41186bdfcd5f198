//! Investor API Handlers

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use shared::models::{Document, Investor, InvestorCreate, InvestorUpdate, Unit};
use shared::{ApiResponse, DataEnvelope};

use crate::api::{AppError, AppResult, InvestorIdBody, now_iso, timestamp_id};
use crate::core::ServerState;

/// 创建结果的存储位置报告
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestorStorage {
    pub local: bool,
    pub google_drive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_drive_error: Option<String>,
    pub notion: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notion_error: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestorCreateResponse {
    pub success: bool,
    pub data: Investor,
    pub storage: InvestorStorage,
    pub warnings: Vec<String>,
}

/// POST /api/createInvestor - 创建投资人 (legacy 路径，语义同 Fixed)
pub async fn create(
    State(state): State<ServerState>,
    Json(body): Json<DataEnvelope<InvestorCreate>>,
) -> AppResult<Json<InvestorCreateResponse>> {
    create_investor(state, body).await
}

/// POST /api/createInvestorFixed - 创建投资人
pub async fn create_fixed(
    State(state): State<ServerState>,
    Json(body): Json<DataEnvelope<InvestorCreate>>,
) -> AppResult<Json<InvestorCreateResponse>> {
    create_investor(state, body).await
}

async fn create_investor(
    state: ServerState,
    body: DataEnvelope<InvestorCreate>,
) -> AppResult<Json<InvestorCreateResponse>> {
    let Some(data) = body.data else {
        return Err(AppError::validation("Name, email, and password are required"));
    };
    let (Some(name), Some(email), Some(password)) = (
        data.name.filter(|s| !s.is_empty()),
        data.email.filter(|s| !s.is_empty()),
        data.password.filter(|s| !s.is_empty()),
    ) else {
        return Err(AppError::validation("Name, email, and password are required"));
    };

    let duplicate = state
        .store
        .investors
        .read(|list| list.iter().any(|inv| inv.email == email))
        .await;
    if duplicate {
        return Err(AppError::validation(
            "An account with this email already exists",
        ));
    }

    // Drive 层级 best-effort: 失败只降级为 warning
    let hierarchy = state.drive.ensure_investor_hierarchy(&name).await;

    let mut investor = Investor {
        id: timestamp_id(),
        name,
        email,
        phone: data.phone.unwrap_or_default(),
        nationality: data.nationality.unwrap_or_default(),
        birth_date: data.birth_date.unwrap_or_default(),
        password,
        google_drive_folder_id: hierarchy.main_folder_id.clone(),
        personal_docs_folder_id: hierarchy.personal_docs_folder_id.clone(),
        google_drive_error: hierarchy.error.clone(),
        notion_id: None,
        created_at: Some(now_iso()),
        updated_at: None,
    };

    state
        .store
        .investors
        .mutate(|list| list.push(investor.clone()))
        .await?;

    let notion_id = state.notion.mirror_investor(&investor).await;
    let notion_error = if state.notion.enabled() && notion_id.is_none() {
        Some("Notion mirror failed".to_string())
    } else {
        None
    };
    if let Some(page_id) = notion_id.clone() {
        investor.notion_id = Some(page_id.clone());
        state
            .store
            .investors
            .mutate(|list| {
                if let Some(inv) = list.iter_mut().find(|i| i.id == investor.id) {
                    inv.notion_id = Some(page_id.clone());
                }
            })
            .await?;
    }

    tracing::info!(email = %investor.email, "Investor created");

    let warnings = hierarchy.error.clone().into_iter().collect();
    Ok(Json(InvestorCreateResponse {
        success: true,
        storage: InvestorStorage {
            local: true,
            google_drive: hierarchy.main_folder_id.is_some(),
            google_drive_error: hierarchy.error,
            notion: notion_id.is_some(),
            notion_error,
        },
        warnings,
        data: investor,
    }))
}

#[derive(Deserialize)]
pub struct EmailBody {
    pub email: Option<String>,
}

#[derive(Serialize)]
pub struct FindInvestorResponse {
    pub success: bool,
    pub data: Option<Investor>,
    pub source: &'static str,
}

/// POST /api/findInvestorByEmail - 按邮箱查投资人 (登录)
///
/// 老账号可能缺 Drive 文件夹，这里懒补齐后持久化。
pub async fn find_by_email(
    State(state): State<ServerState>,
    Json(body): Json<EmailBody>,
) -> AppResult<Json<FindInvestorResponse>> {
    let email = body
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::validation("Email is required"))?;

    let investor = state
        .store
        .investors
        .read(|list| list.iter().find(|inv| inv.email == email).cloned())
        .await;

    let investor = match investor {
        Some(inv) if inv.personal_docs_folder_id.is_none() => {
            Some(backfill_folders(&state, inv).await?)
        }
        other => other,
    };

    Ok(Json(FindInvestorResponse {
        success: true,
        data: investor,
        source: "memory",
    }))
}

/// 补建缺失的 Drive 文件夹并回写记录
async fn backfill_folders(state: &ServerState, mut investor: Investor) -> AppResult<Investor> {
    if investor.google_drive_folder_id.is_none() {
        let hierarchy = state.drive.ensure_investor_hierarchy(&investor.name).await;
        investor.google_drive_folder_id = hierarchy.main_folder_id;
        investor.personal_docs_folder_id = hierarchy.personal_docs_folder_id;
    } else if let Some(root) = investor.google_drive_folder_id.clone() {
        match state.drive.ensure_folder("Personal Documents", &root).await {
            Ok(id) => investor.personal_docs_folder_id = Some(id),
            Err(e) => {
                tracing::warn!(email = %investor.email, error = %e, "Personal folder backfill failed");
            }
        }
    }

    let snapshot = investor.clone();
    state
        .store
        .investors
        .mutate(|list| {
            if let Some(inv) = list.iter_mut().find(|i| i.id == snapshot.id) {
                inv.google_drive_folder_id = snapshot.google_drive_folder_id.clone();
                inv.personal_docs_folder_id = snapshot.personal_docs_folder_id.clone();
            }
        })
        .await?;

    Ok(investor)
}

#[derive(Serialize)]
pub struct UpdateInvestorResponse {
    pub success: bool,
    pub data: Investor,
    pub message: &'static str,
}

/// POST /api/updateInvestor - 按 id 部分更新档案
pub async fn update(
    State(state): State<ServerState>,
    Json(body): Json<DataEnvelope<InvestorUpdate>>,
) -> AppResult<Json<UpdateInvestorResponse>> {
    let data = body
        .data
        .ok_or_else(|| AppError::validation("Investor ID is required"))?;
    let id = data
        .id
        .clone()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::validation("Investor ID is required"))?;

    let updated = state
        .store
        .investors
        .mutate(|list| {
            let investor = list.iter_mut().find(|inv| inv.id == id)?;
            if let Some(name) = data.name.clone() {
                investor.name = name;
            }
            if let Some(email) = data.email.clone() {
                investor.email = email;
            }
            if let Some(password) = data.password.clone() {
                investor.password = password;
            }
            if let Some(phone) = data.phone.clone() {
                investor.phone = phone;
            }
            if let Some(nationality) = data.nationality.clone() {
                investor.nationality = nationality;
            }
            if let Some(birth_date) = data.birth_date.clone() {
                investor.birth_date = birth_date;
            }
            investor.updated_at = Some(now_iso());
            Some(investor.clone())
        })
        .await?
        .ok_or_else(|| AppError::not_found("Investor"))?;

    tracing::info!(email = %updated.email, "Investor profile updated");

    Ok(Json(UpdateInvestorResponse {
        success: true,
        data: updated,
        message: "Profile updated successfully",
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestorData {
    pub units: Vec<Unit>,
    pub documents: Vec<Document>,
    /// 预留字段，前端期望数组
    pub payments: Vec<serde_json::Value>,
}

/// POST /api/getInvestorData - 投资人的单元 + 文档快照
pub async fn get_data(
    State(state): State<ServerState>,
    Json(body): Json<InvestorIdBody>,
) -> AppResult<Json<ApiResponse<InvestorData>>> {
    let investor_id = body.require()?.to_string();

    let units = state
        .store
        .units
        .read(|list| {
            list.iter()
                .filter(|u| u.investor_id == investor_id)
                .cloned()
                .collect()
        })
        .await;
    let documents = state
        .store
        .documents
        .read(|list| {
            list.iter()
                .filter(|d| d.investor_id == investor_id)
                .cloned()
                .collect()
        })
        .await;

    Ok(Json(ApiResponse::success(InvestorData {
        units,
        documents,
        payments: Vec::new(),
    })))
}
