//! Portfolio 估值
//!
//! 只认 OTP 文档：申报类型或提取类型为 "OTP" 的文档计入，金额优先取
//! AI 提取值，其次文档自身 amount，都没有按 0 计。纯函数、无 IO，
//! 每次请求基于当前文档列表重新计算。

use serde::Serialize;

use shared::models::Document;

/// 估值结果 (legacy 响应形状)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioValue {
    pub portfolio_value: f64,
    /// "$1,234,567.89" — 美元千分位 + 两位小数
    pub formatted_value: String,
    pub otp_count: usize,
    pub total_documents: usize,
    pub breakdown: Vec<BreakdownEntry>,
}

/// 单份 OTP 的贡献明细 (仅金额 > 0 的文档入列)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownEntry {
    pub file_name: String,
    pub amount: f64,
    pub unit_details: String,
    pub developer: String,
}

/// 汇总投资人的 OTP 文档
pub fn compute(documents: &[Document], investor_id: &str) -> PortfolioValue {
    let owned: Vec<&Document> = documents
        .iter()
        .filter(|d| d.investor_id == investor_id)
        .collect();

    let mut total = 0.0;
    let mut otp_count = 0;
    let mut breakdown = Vec::new();

    for doc in owned.iter().filter(|d| d.is_otp()) {
        otp_count += 1;
        let amount = doc.monetary_amount();
        if amount > 0.0 {
            total += amount;
            breakdown.push(BreakdownEntry {
                file_name: doc.file_name.clone(),
                amount,
                unit_details: doc
                    .extracted_data
                    .as_ref()
                    .and_then(|e| e.unit_details.clone())
                    .unwrap_or_else(|| "N/A".to_string()),
                developer: doc
                    .extracted_data
                    .as_ref()
                    .and_then(|e| e.developer.clone())
                    .unwrap_or_else(|| "N/A".to_string()),
            });
        }
    }

    PortfolioValue {
        portfolio_value: total,
        formatted_value: format_usd(total),
        otp_count,
        total_documents: owned.len(),
        breakdown,
    }
}

/// 美元格式化: 千分位 + 两位小数 (四舍五入)
pub fn format_usd(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if amount < 0.0 {
        format!("-${}.{:02}", grouped, frac)
    } else {
        format!("${}.{:02}", grouped, frac)
    }
}

#[cfg(test)]
mod tests;
