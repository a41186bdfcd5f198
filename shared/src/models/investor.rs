//! Investor Model

use serde::{Deserialize, Serialize};

/// Investor entity (投资人)
///
/// 密码以明文存储 — 历史文件格式，登录流程依赖原值比对。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investor {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub nationality: String,
    #[serde(default)]
    pub birth_date: String,
    pub password: String,
    /// 投资人主文件夹 (Google Drive)
    pub google_drive_folder_id: Option<String>,
    /// "Personal Documents" 子文件夹
    pub personal_docs_folder_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_drive_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notion_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Investor {
    /// 默认测试账号 - investors.json 不存在或损坏时作为种子数据
    pub fn seed() -> Self {
        Self {
            id: "test-investor-1".to_string(),
            name: "Test Investor".to_string(),
            email: "investor1@test.com".to_string(),
            phone: "+1234567890".to_string(),
            nationality: "UAE".to_string(),
            birth_date: "1990-01-01".to_string(),
            password: "test123".to_string(),
            google_drive_folder_id: None,
            personal_docs_folder_id: None,
            google_drive_error: None,
            notion_id: None,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Create investor payload
///
/// 必填字段为 Option — handler 负责 400 校验，与其余字段的缺省填充。
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestorCreate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
}

/// Update investor payload (partial merge by id)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestorUpdate {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub nationality: Option<String>,
    pub birth_date: Option<String>,
}
