//! 文档归类规则
//!
//! 给定提交 `(investor, 申报分类, unitId, 申报类型)`，解析出**唯一**的
//! 分类桶与目标 Drive 文件夹。first-match-wins，短路顺序：
//!
//! 1. 申报分类 "Unit Documents" 且带 unitId → 单元名作为分类；已有单元
//!    文件夹直接用，否则在投资人主文件夹下创建 (最多 3 次尝试) 并把
//!    新文件夹 id 回写到单元记录；单元找不到 → 主文件夹 + "Other
//!    Documents"。
//! 2. 申报分类 "Personal Documents" (或类型为 "Personal") → "Personal
//!    Documents"。带 unitId 也不会被改派到单元。
//! 3. 其余 → "Other Documents"，个人文件夹缺失时回落主文件夹。
//!
//! 解析是确定且幂等的：相同的文档/单元状态重跑必得到相同的分类和
//! 目标文件夹。

use serde::Serialize;

use shared::models::Investor;

use crate::drive::DriveService;
use crate::store::Store;

pub const CATEGORY_PERSONAL: &str = "Personal Documents";
pub const CATEGORY_OTHER: &str = "Other Documents";
/// 前端申报"归档到单元"时使用的分类串
pub const CATEGORY_UNIT_DOCUMENTS: &str = "Unit Documents";

/// 文件夹创建重试上限 (无退避)
pub const MAX_FOLDER_ATTEMPTS: u32 = 3;

/// 目标文件夹的定位方式 (序列化串与历史记录一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderType {
    UnitSpecific,
    UnitCreated,
    MainInvestorFallback,
    UnitNotFoundFallback,
    PersonalDocuments,
    DefaultOther,
    None,
}

impl FolderType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnitSpecific => "unit_specific",
            Self::UnitCreated => "unit_created",
            Self::MainInvestorFallback => "main_investor_fallback",
            Self::UnitNotFoundFallback => "unit_not_found_fallback",
            Self::PersonalDocuments => "personal_documents",
            Self::DefaultOther => "default_other",
            Self::None => "none",
        }
    }
}

/// 归类结果
#[derive(Debug, Clone)]
pub struct Categorization {
    /// "Personal Documents" | 单元名 | "Other Documents" — 永不为空
    pub category: String,
    pub folder_type: FolderType,
    pub target_folder_id: Option<String>,
    /// unitId 解析出的单元名 (命中分支 1 时)
    pub unit_name: Option<String>,
    pub folder_error: Option<String>,
    /// 文件夹创建尝试次数 (只有创建路径非零)
    pub attempts: u32,
}

/// 解析文档的分类桶与目标文件夹
///
/// 分支 1 可能产生副作用：为单元懒创建 Drive 文件夹并把 id 持久化
/// 到单元记录，后续上传直接复用 (幂等)。
pub async fn resolve(
    store: &Store,
    drive: &DriveService,
    investor: &Investor,
    declared_category: Option<&str>,
    declared_type: Option<&str>,
    unit_id: Option<&str>,
) -> Categorization {
    tracing::debug!(
        category = ?declared_category,
        doc_type = ?declared_type,
        unit_id = ?unit_id,
        "Determining target folder"
    );

    if declared_category == Some(CATEGORY_UNIT_DOCUMENTS)
        && let Some(unit_id) = unit_id
    {
        return resolve_unit_bucket(store, drive, investor, unit_id).await;
    }

    if declared_category == Some(CATEGORY_PERSONAL) || declared_type == Some("Personal") {
        return Categorization {
            category: CATEGORY_PERSONAL.to_string(),
            folder_type: FolderType::PersonalDocuments,
            target_folder_id: investor.personal_docs_folder_id.clone(),
            unit_name: None,
            folder_error: None,
            attempts: 0,
        };
    }

    Categorization {
        category: CATEGORY_OTHER.to_string(),
        folder_type: FolderType::DefaultOther,
        target_folder_id: investor
            .personal_docs_folder_id
            .clone()
            .or_else(|| investor.google_drive_folder_id.clone()),
        unit_name: None,
        folder_error: None,
        attempts: 0,
    }
}

async fn resolve_unit_bucket(
    store: &Store,
    drive: &DriveService,
    investor: &Investor,
    unit_id: &str,
) -> Categorization {
    let unit = store
        .units
        .read(|units| units.iter().find(|u| u.id == unit_id).cloned())
        .await;

    let Some(unit) = unit else {
        tracing::warn!(unit_id = %unit_id, "Unit not found, falling back to Other Documents");
        return Categorization {
            category: CATEGORY_OTHER.to_string(),
            folder_type: FolderType::UnitNotFoundFallback,
            target_folder_id: investor.google_drive_folder_id.clone(),
            unit_name: None,
            folder_error: None,
            attempts: 0,
        };
    };

    let unit_name = unit.display_name().to_string();

    if let Some(folder_id) = unit.google_drive_folder_id.clone() {
        tracing::debug!(unit = %unit_name, folder = %folder_id, "Using existing unit folder");
        return Categorization {
            category: unit_name.clone(),
            folder_type: FolderType::UnitSpecific,
            target_folder_id: Some(folder_id),
            unit_name: Some(unit_name),
            folder_error: None,
            attempts: 0,
        };
    }

    let Some(investor_root) = investor.google_drive_folder_id.clone() else {
        // 投资人连主文件夹都没有，无处可建
        return Categorization {
            category: unit_name.clone(),
            folder_type: FolderType::None,
            target_folder_id: None,
            unit_name: Some(unit_name),
            folder_error: Some("Investor has no main Google Drive folder".to_string()),
            attempts: 0,
        };
    };

    let folder_name = unit.folder_name();
    let (folder_id, error, attempts) =
        create_folder_with_retries(drive, &folder_name, &investor_root).await;

    match folder_id {
        Some(folder_id) => {
            // 回写单元记录，后续上传复用同一文件夹
            let persisted = store
                .units
                .mutate(|units| {
                    if let Some(u) = units.iter_mut().find(|u| u.id == unit_id) {
                        u.google_drive_folder_id = Some(folder_id.clone());
                    }
                })
                .await;
            if let Err(e) = persisted {
                tracing::error!(unit = %unit_name, error = %e, "Failed to persist unit folder id");
            }
            tracing::info!(unit = %unit_name, folder = %folder_id, "Created unit folder");

            Categorization {
                category: unit_name.clone(),
                folder_type: FolderType::UnitCreated,
                target_folder_id: Some(folder_id),
                unit_name: Some(unit_name),
                folder_error: None,
                attempts,
            }
        }
        None => Categorization {
            category: unit_name.clone(),
            folder_type: FolderType::MainInvestorFallback,
            target_folder_id: Some(investor_root),
            unit_name: Some(unit_name),
            folder_error: error,
            attempts,
        },
    }
}

/// 有界重试的文件夹创建 — 固定次数、无退避，返回 (id, 最后错误, 次数)
pub async fn create_folder_with_retries(
    drive: &DriveService,
    folder_name: &str,
    parent_id: &str,
) -> (Option<String>, Option<String>, u32) {
    let mut last_error = None;
    let mut attempts = 0;

    while attempts < MAX_FOLDER_ATTEMPTS {
        attempts += 1;
        tracing::debug!(folder = %folder_name, attempt = attempts, "Folder creation attempt");
        match drive.ensure_folder(folder_name, parent_id).await {
            Ok(id) => return (Some(id), None, attempts),
            Err(e) => {
                tracing::warn!(folder = %folder_name, attempt = attempts, error = %e, "Attempt failed");
                last_error = Some(e);
            }
        }
    }

    (None, last_error, attempts)
}

#[cfg(test)]
mod tests;
