//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 状态概览和调试接口
//! - [`investors`] - 投资人账号接口
//! - [`units`] - 房产单元接口
//! - [`documents`] - 文档上传与归类接口
//! - [`portfolio`] - 持仓估值接口
//! - [`orders`] - 服务市场订单接口
//! - [`news`] - 新闻接口
//! - [`uploads`] - 本地文件回放接口
//!
//! 路由沿用历史 RPC 风格 (POST /api/createXxx)，前端 SPA 依赖
//! 这些路径和响应形状，不做 REST 化改造。

pub mod documents;
pub mod health;
pub mod investors;
pub mod news;
pub mod orders;
pub mod portfolio;
pub mod units;
pub mod uploads;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};

/// `{ "investorId": ... }` 请求体 (多个端点共用)
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestorIdBody {
    pub investor_id: Option<String>,
}

impl InvestorIdBody {
    /// 取 investorId，缺失时返回历史错误文案
    pub fn require(&self) -> AppResult<&str> {
        self.investor_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::validation("Investor ID is required"))
    }
}

/// 当前毫秒时间戳字符串 - legacy 记录 id 格式
pub(crate) fn timestamp_id() -> String {
    chrono::Utc::now().timestamp_millis().to_string()
}

/// 当前 ISO 8601 时间戳
pub(crate) fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// 今日日期 YYYY-MM-DD (uploadDate 字段格式)
pub(crate) fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}
