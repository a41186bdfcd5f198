//! Document API Handlers
//!
//! 上传管线 (createDocumentWithCategory):
//! AI 提取 → 本地落盘 → 归类解析 → Drive 上传 → 记录持久化 → Notion 镜像。
//! 外部适配器失败全部降级为 warnings，本地记录始终写入。

use std::collections::BTreeMap;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use shared::models::{
    Document, ExtractedData, Investor, PersistenceMetadata, STATUS_ERROR, STATUS_PROCESSED,
    STATUS_PROCESSING, Unit,
};
use shared::DataEnvelope;

use crate::api::{AppError, AppResult, InvestorIdBody, now_iso, timestamp_id, today};
use crate::catalog::{self, CATEGORY_PERSONAL};
use crate::core::ServerState;

/// 上传 payload (两条创建路径共用)
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentCreate {
    pub id: Option<String>,
    pub investor_id: Option<String>,
    #[serde(default)]
    pub unit_id: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(rename = "type", default)]
    pub doc_type: Option<String>,
    /// 原始文件名
    pub name: Option<String>,
    /// data-URL 负载
    #[serde(default)]
    pub file_data: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
}

async fn find_investor(state: &ServerState, id: Option<&str>) -> AppResult<Investor> {
    let id = id.unwrap_or_default();
    state
        .store
        .investors
        .read(|list| list.iter().find(|inv| inv.id == id).cloned())
        .await
        .ok_or_else(|| AppError::not_found("Investor"))
}

/// 归类结果报告 (响应的 categorization 字段)
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizationReport {
    pub final_category: String,
    pub original_category: Option<String>,
    pub folder_type: &'static str,
    pub unit_name: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageLocations {
    pub local: bool,
    pub google_drive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_drive_error: Option<String>,
    pub notion: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notion_error: Option<String>,
    pub target_folder: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentCreateResponse {
    pub success: bool,
    pub data: Document,
    pub extracted_data: Option<ExtractedData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categorization: Option<CategorizationReport>,
    pub storage_locations: StorageLocations,
    pub warnings: Vec<String>,
}

/// POST /api/createDocumentWithCategory - 上传文档并归类
pub async fn create_with_category(
    State(state): State<ServerState>,
    Json(body): Json<DataEnvelope<DocumentCreate>>,
) -> AppResult<Json<DocumentCreateResponse>> {
    let Some(data) = body.data else {
        return Err(AppError::validation("No document data provided"));
    };
    let investor = find_investor(&state, data.investor_id.as_deref()).await?;
    let file_name = data.name.clone().unwrap_or_else(|| "document".into());

    tracing::info!(
        investor = %investor.id,
        unit_id = ?data.unit_id,
        category = ?data.category,
        file = %file_name,
        "Document upload started"
    );

    // 1. AI 提取 (file 缺失时跳过；适配器自身永不失败)
    let extracted = match data.file_data.as_deref() {
        Some(file_data) => Some(
            state
                .ai
                .process_document(file_data, data.doc_type.as_deref().unwrap_or(""), &file_name)
                .await,
        ),
        None => None,
    };

    // 2. 本地落盘 - 负载损坏时记录标记为 Error，不中断请求
    let mut warnings = Vec::new();
    let mut local_failed = false;
    let file_url = match data.file_data.as_deref() {
        Some(file_data) => match state.store.save_file_locally(file_data, &file_name) {
            Ok(url) => Some(url),
            Err(e) => {
                warnings.push(format!("Local storage: {}", e));
                local_failed = true;
                None
            }
        },
        None => None,
    };

    // 3. 归类解析
    let categorization = catalog::resolve(
        &state.store,
        &state.drive,
        &investor,
        data.category.as_deref(),
        data.doc_type.as_deref(),
        data.unit_id.as_deref(),
    )
    .await;

    // 4. Drive 上传
    let drive_result = match (data.file_data.as_deref(), categorization.target_folder_id.as_deref())
    {
        (Some(file_data), Some(folder_id)) => {
            state
                .drive
                .upload(file_data, &file_name, data.file_type.as_deref(), folder_id)
                .await
        }
        (None, _) => crate::drive::upload_failure("No file data provided".into()),
        (_, None) => crate::drive::upload_failure("No target folder available".into()),
    };
    // 没有文件可传不算适配器故障，不进 warnings
    if data.file_data.is_some()
        && let Some(e) = drive_result.error.clone()
    {
        warnings.push(format!("Google Drive: {}", e));
    }

    let status = if local_failed {
        STATUS_ERROR
    } else if extracted.is_some() {
        STATUS_PROCESSED
    } else {
        STATUS_PROCESSING
    };

    let unit_name = categorization.unit_name.clone();
    let mut record = Document {
        document_id: extracted
            .as_ref()
            .and_then(|e| e.document_id.clone())
            .unwrap_or_else(timestamp_id),
        id: data.id.clone().unwrap_or_else(timestamp_id),
        investor_id: investor.id.clone(),
        investor_name: investor.name.clone(),
        unit_id: data.unit_id.clone(),
        document_type: data.doc_type.clone(),
        file_name: file_name.clone(),
        upload_date: today(),
        status: status.to_string(),
        file_url: file_url.clone(),
        category: Some(categorization.category.clone()),
        original_category: data.category.clone(),
        extracted_data: extracted.clone(),
        file_type: data.file_type.clone(),
        file_size: data.file_size,
        amount: Some(
            extracted
                .as_ref()
                .and_then(|e| e.numeric_amount())
                .unwrap_or(0.0),
        ),
        google_drive: drive_result.success.then(|| drive_result.clone()),
        google_drive_error: drive_result.error.clone(),
        target_folder: Some(categorization.folder_type.as_str().to_string()),
        target_folder_id: categorization.target_folder_id.clone(),
        notion_id: None,
        persistence_metadata: Some(PersistenceMetadata {
            uploaded_at: now_iso(),
            category_determined: categorization.category.clone(),
            folder_type_used: categorization.folder_type.as_str().to_string(),
            unit_name: unit_name.clone(),
        }),
    };

    state
        .store
        .documents
        .mutate(|list| list.push(record.clone()))
        .await?;

    // 5. Notion 镜像 (best-effort)
    let notion_id = state.notion.mirror_document(&record).await;
    let notion_error = if state.notion.enabled() && notion_id.is_none() {
        Some("Notion mirror failed".to_string())
    } else {
        None
    };
    if let Some(e) = notion_error.clone() {
        warnings.push(format!("Notion: {}", e));
    }
    if let Some(page_id) = notion_id.clone() {
        record.notion_id = Some(page_id.clone());
        let record_id = record.id.clone();
        state
            .store
            .documents
            .mutate(|list| {
                if let Some(doc) = list.iter_mut().find(|d| d.id == record_id) {
                    doc.notion_id = Some(page_id.clone());
                }
            })
            .await?;
    }

    tracing::info!(
        file = %record.file_name,
        category = %categorization.category,
        folder_type = %categorization.folder_type.as_str(),
        "Document saved"
    );

    Ok(Json(DocumentCreateResponse {
        success: true,
        extracted_data: extracted,
        categorization: Some(CategorizationReport {
            final_category: categorization.category,
            original_category: data.category,
            folder_type: categorization.folder_type.as_str(),
            unit_name,
        }),
        storage_locations: StorageLocations {
            local: file_url.is_some(),
            google_drive: drive_result.success,
            google_drive_error: drive_result.error,
            notion: record.notion_id.is_some(),
            notion_error,
            target_folder: categorization.folder_type.as_str(),
        },
        warnings,
        data: record,
    }))
}

/// POST /api/createDocument - 上传文档 (legacy 归类阶梯)
///
/// 与新路径的差异: 个人类型优先、带 unitId 但单元无文件夹时直接回落
/// 主文件夹、兜底文件夹类型串不同 (main_investor / default_personal)。
pub async fn create(
    State(state): State<ServerState>,
    Json(body): Json<DataEnvelope<DocumentCreate>>,
) -> AppResult<Json<DocumentCreateResponse>> {
    let Some(data) = body.data else {
        return Err(AppError::validation("No document data provided"));
    };
    let mut investor = find_investor(&state, data.investor_id.as_deref()).await?;
    let file_name = data.name.clone().unwrap_or_else(|| "document".into());

    // 老账号懒补个人文件夹
    if investor.personal_docs_folder_id.is_none()
        && let Some(root) = investor.google_drive_folder_id.clone()
        && let Ok(folder_id) = state.drive.ensure_folder("Personal Documents", &root).await
    {
        investor.personal_docs_folder_id = Some(folder_id.clone());
        let investor_id = investor.id.clone();
        state
            .store
            .investors
            .mutate(|list| {
                if let Some(inv) = list.iter_mut().find(|i| i.id == investor_id) {
                    inv.personal_docs_folder_id = Some(folder_id.clone());
                }
            })
            .await?;
    }

    let extracted = match data.file_data.as_deref() {
        Some(file_data) => Some(
            state
                .ai
                .process_document(file_data, data.doc_type.as_deref().unwrap_or(""), &file_name)
                .await,
        ),
        None => None,
    };

    let mut warnings = Vec::new();
    let mut local_failed = false;
    let file_url = match data.file_data.as_deref() {
        Some(file_data) => match state.store.save_file_locally(file_data, &file_name) {
            Ok(url) => Some(url),
            Err(e) => {
                warnings.push(format!("Local storage: {}", e));
                local_failed = true;
                None
            }
        },
        None => None,
    };

    // Legacy 阶梯
    let (target_folder_id, folder_type): (Option<String>, &'static str) =
        if data.doc_type.as_deref() == Some("Personal")
            || data.category.as_deref() == Some("personal")
        {
            (investor.personal_docs_folder_id.clone(), "personal_documents")
        } else if let Some(unit_id) = data.unit_id.as_deref() {
            let unit_folder = state
                .store
                .units
                .read(|list| {
                    list.iter()
                        .find(|u| u.id == unit_id)
                        .and_then(|u| u.google_drive_folder_id.clone())
                })
                .await;
            match unit_folder {
                Some(folder_id) => (Some(folder_id), "unit_specific"),
                None => (investor.google_drive_folder_id.clone(), "main_investor"),
            }
        } else {
            (
                investor
                    .personal_docs_folder_id
                    .clone()
                    .or_else(|| investor.google_drive_folder_id.clone()),
                "default_personal",
            )
        };

    let drive_result = match (data.file_data.as_deref(), target_folder_id.as_deref()) {
        (Some(file_data), Some(folder_id)) => {
            state
                .drive
                .upload(file_data, &file_name, data.file_type.as_deref(), folder_id)
                .await
        }
        (None, _) => crate::drive::upload_failure("No file data provided".into()),
        (_, None) => crate::drive::upload_failure("No target folder available".into()),
    };
    // 没有文件可传不算适配器故障，不进 warnings
    if data.file_data.is_some()
        && let Some(e) = drive_result.error.clone()
    {
        warnings.push(format!("Google Drive: {}", e));
    }

    let status = if local_failed {
        STATUS_ERROR
    } else if extracted.is_some() {
        STATUS_PROCESSED
    } else {
        STATUS_PROCESSING
    };

    let mut record = Document {
        document_id: extracted
            .as_ref()
            .and_then(|e| e.document_id.clone())
            .unwrap_or_else(timestamp_id),
        id: data.id.clone().unwrap_or_else(timestamp_id),
        investor_id: investor.id.clone(),
        investor_name: investor.name.clone(),
        unit_id: data.unit_id.clone(),
        document_type: data.doc_type.clone(),
        file_name: file_name.clone(),
        upload_date: today(),
        status: status.to_string(),
        file_url: file_url.clone(),
        category: None,
        original_category: None,
        extracted_data: extracted.clone(),
        file_type: data.file_type.clone(),
        file_size: data.file_size,
        amount: None,
        google_drive: drive_result.success.then(|| drive_result.clone()),
        google_drive_error: drive_result.error.clone(),
        target_folder: Some(folder_type.to_string()),
        target_folder_id,
        notion_id: None,
        persistence_metadata: None,
    };

    state
        .store
        .documents
        .mutate(|list| list.push(record.clone()))
        .await?;

    let notion_id = state.notion.mirror_document(&record).await;
    let notion_error = if state.notion.enabled() && notion_id.is_none() {
        Some("Notion mirror failed".to_string())
    } else {
        None
    };
    if let Some(page_id) = notion_id {
        record.notion_id = Some(page_id.clone());
        let record_id = record.id.clone();
        state
            .store
            .documents
            .mutate(|list| {
                if let Some(doc) = list.iter_mut().find(|d| d.id == record_id) {
                    doc.notion_id = Some(page_id.clone());
                }
            })
            .await?;
    }

    Ok(Json(DocumentCreateResponse {
        success: true,
        extracted_data: extracted,
        categorization: None,
        storage_locations: StorageLocations {
            local: file_url.is_some(),
            google_drive: drive_result.success,
            google_drive_error: drive_result.error,
            notion: record.notion_id.is_some(),
            notion_error,
            target_folder: folder_type,
        },
        warnings,
        data: record,
    }))
}

/// 按持久化的 category 把文档重新分组
///
/// 规则: unitId 命中且非 Personal → 单元桶; Personal 分类或
/// personal_documents 文件夹 → Personal; 其余 → Other。
pub(super) fn group_documents(
    documents: &[Document],
    units: &[Unit],
) -> BTreeMap<String, Vec<Document>> {
    let mut grouped: BTreeMap<String, Vec<Document>> = BTreeMap::new();
    grouped.insert(CATEGORY_PERSONAL.to_string(), Vec::new());
    grouped.insert(catalog::CATEGORY_OTHER.to_string(), Vec::new());
    for unit in units {
        grouped.entry(unit.display_name().to_string()).or_default();
    }

    for doc in documents {
        if let Some(unit_id) = doc.unit_id.as_deref()
            && doc.category.as_deref() != Some(CATEGORY_PERSONAL)
            && let Some(unit) = units.iter().find(|u| u.id == unit_id)
        {
            grouped
                .entry(unit.display_name().to_string())
                .or_default()
                .push(doc.clone());
            continue;
        }

        let bucket = if doc.category.as_deref() == Some(CATEGORY_PERSONAL)
            || doc.target_folder.as_deref() == Some("personal_documents")
        {
            CATEGORY_PERSONAL
        } else {
            catalog::CATEGORY_OTHER
        };
        grouped.entry(bucket.to_string()).or_default().push(doc.clone());
    }

    grouped
}

/// POST /api/debug/document-categorization - 归类诊断视图
pub async fn debug_categorization(
    State(state): State<ServerState>,
    Json(body): Json<InvestorIdBody>,
) -> AppResult<Json<Value>> {
    let investor_id = body.require()?.to_string();

    let documents: Vec<Document> = state
        .store
        .documents
        .read(|list| {
            list.iter()
                .filter(|d| d.investor_id == investor_id)
                .cloned()
                .collect()
        })
        .await;
    let units: Vec<Unit> = state
        .store
        .units
        .read(|list| {
            list.iter()
                .filter(|u| u.investor_id == investor_id)
                .cloned()
                .collect()
        })
        .await;

    let grouped = group_documents(&documents, &units);
    let summary: Vec<Value> = grouped
        .iter()
        .map(|(category, docs)| {
            json!({
                "category": category,
                "count": docs.len(),
                "documents": docs.iter().map(|d| json!({
                    "fileName": d.file_name,
                    "category": d.category,
                    "unitId": d.unit_id,
                    "targetFolder": d.target_folder,
                })).collect::<Vec<_>>(),
            })
        })
        .collect();

    Ok(Json(json!({
        "success": true,
        "debug": {
            "investorId": investor_id,
            "totalDocuments": documents.len(),
            "totalUnits": units.len(),
            "units": units.iter().map(|u| json!({
                "id": u.id,
                "name": u.display_name(),
            })).collect::<Vec<_>>(),
            "categorization": summary,
            "rawDocuments": documents.iter().map(|d| json!({
                "fileName": d.file_name,
                "category": d.category,
                "originalCategory": d.original_category,
                "unitId": d.unit_id,
                "targetFolder": d.target_folder,
                "persistenceMetadata": d.persistence_metadata,
            })).collect::<Vec<_>>(),
        },
    })))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryView {
    pub categorized: BTreeMap<String, Vec<Document>>,
    pub units: Vec<Unit>,
    pub total_documents: usize,
}

#[derive(Serialize)]
pub struct RefreshLibraryResponse {
    pub success: bool,
    pub data: LibraryView,
    pub message: &'static str,
}

/// POST /api/refreshDocumentLibrary - 重建分组视图 (登录后刷新用)
pub async fn refresh_library(
    State(state): State<ServerState>,
    Json(body): Json<InvestorIdBody>,
) -> AppResult<Json<RefreshLibraryResponse>> {
    let investor_id = body.require()?.to_string();

    let documents: Vec<Document> = state
        .store
        .documents
        .read(|list| {
            list.iter()
                .filter(|d| d.investor_id == investor_id)
                .cloned()
                .collect()
        })
        .await;
    let units: Vec<Unit> = state
        .store
        .units
        .read(|list| {
            list.iter()
                .filter(|u| u.investor_id == investor_id)
                .cloned()
                .collect()
        })
        .await;

    let categorized = group_documents(&documents, &units);

    Ok(Json(RefreshLibraryResponse {
        success: true,
        data: LibraryView {
            categorized,
            total_documents: documents.len(),
            units,
        },
        message: "Document library refreshed successfully",
    }))
}

