//! 统一错误处理
//!
//! 提供应用级错误类型，`IntoResponse` 输出前端约定的
//! `{success: false, error: "..."}` 格式。
//!
//! # 错误分级
//!
//! | 分类 | HTTP | 说明 |
//! |------|------|------|
//! | Validation | 400 | 缺字段、非法输入、重复邮箱 |
//! | NotFound | 404 | 未知 id |
//! | Internal | 500 | 未预期异常，消息原样回显 (内部工具可接受) |
//!
//! 外部适配器 (Drive / Notion / AI) 的失败**不会**成为 AppError —
//! 它们以 warnings 字段随成功响应返回，绝不阻断核心流程。
//!
//! # 使用示例
//!
//! ```ignore
//! // 返回错误
//! Err(AppError::not_found("Investor"))
//!
//! // 返回成功响应
//! Ok(Json(ApiResponse::success(data)))
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use shared::ApiResponse;
use tracing::error;

/// 应用错误枚举
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    /// 验证失败 (400)
    Validation(String),

    #[error("{0} not found")]
    /// 资源不存在 (404)
    NotFound(String),

    #[error("{0}")]
    /// 内部错误 (500)
    Internal(String),
}

impl AppError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ApiResponse::<()>::error(self.to_string()));
        (status, body).into_response()
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", e))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Internal(format!("Serialization error: {}", e))
    }
}
