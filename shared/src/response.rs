//! Legacy API 响应结构
//!
//! 前端 SPA 依赖 `{success, data, error}` 三字段格式，所有 handler 统一使用。

use serde::{Deserialize, Serialize};

/// API 响应结构
///
/// ```json
/// { "success": true, "data": { ... } }
/// { "success": false, "error": "Investor not found" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// 创建成功响应
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// 创建错误响应
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// 请求体包装 - 前端把 payload 放在 `data` 字段里
///
/// `data` 为 Option，缺失时由 handler 返回 400 而不是反序列化失败。
#[derive(Debug, Clone, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: Option<T>,
}
