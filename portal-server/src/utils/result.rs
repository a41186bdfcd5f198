//! Handler Result 别名

use crate::AppError;

/// API handler 统一返回类型
///
/// 所有路由 handler 返回 `AppResult<Json<...>>`；Err 分支经
/// [`AppError`] 的 `IntoResponse` 统一落成 `{success: false, error}`。
/// 外部适配器 (Drive / Notion / AI) 的失败不会走到这里 — 它们以
/// warnings 随 200 响应返回。
pub type AppResult<T> = Result<T, AppError>;
