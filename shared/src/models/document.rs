//! Document Model

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Document processing status strings
pub const STATUS_PROCESSING: &str = "Processing";
pub const STATUS_PROCESSED: &str = "Processed";
pub const STATUS_ERROR: &str = "Error";

/// Uploaded document entity (文档元数据 + 各存储位置)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// AI 生成或时间戳兜底的文档编号
    pub document_id: String,
    pub id: String,
    pub investor_id: String,
    pub investor_name: String,
    pub unit_id: Option<String>,
    /// 用户申报的类型 (自由文本: "Passport" / "OTP Document" / ...)
    pub document_type: Option<String>,
    pub file_name: String,
    /// YYYY-MM-DD
    pub upload_date: String,
    /// Processing | Processed | Error
    pub status: String,
    /// 本地文件 URL (/uploads/...)，base64 解码失败时为 None
    pub file_url: Option<String>,
    /// 解析后的分类: "Personal Documents" | 单元名 | "Other Documents"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// 用户提交的原始分类 (调试用)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_category: Option<String>,
    pub extracted_data: Option<ExtractedData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    /// OTP 金额兜底字段 (extractedData.amount 缺失时使用)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    pub google_drive: Option<DriveFileInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_drive_error: Option<String>,
    /// 文件夹定位结果: unit_specific | unit_created | personal_documents | ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_folder: Option<String>,
    pub target_folder_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notion_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistence_metadata: Option<PersistenceMetadata>,
}

impl Document {
    /// 文档是否为 OTP — 申报类型为准，AI 提取类型仅用于补充识别
    pub fn is_otp(&self) -> bool {
        let declared = self
            .document_type
            .as_deref()
            .map(|t| t.eq_ignore_ascii_case("OTP"))
            .unwrap_or(false);
        let extracted = self
            .extracted_data
            .as_ref()
            .and_then(|d| d.doc_type.as_deref())
            .map(|t| t.eq_ignore_ascii_case("OTP"))
            .unwrap_or(false);
        declared || extracted
    }

    /// 计价金额: extractedData.amount 优先，其次自身 amount，无效值归零
    ///
    /// 非数值 / NaN / 无穷大一律返回 0.0，保证求和结果永不为 NaN。
    pub fn monetary_amount(&self) -> f64 {
        let extracted = self
            .extracted_data
            .as_ref()
            .and_then(|d| d.numeric_amount());
        let amount = extracted.or(self.amount).unwrap_or(0.0);
        if amount.is_finite() { amount } else { 0.0 }
    }
}

/// Google Drive 上传结果元数据 (存储在文档记录上)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFileInfo {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_view_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_content_link: Option<String>,
    /// Drive v3 以字符串返回 size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// AI 提取结果 — 字段集随文档类型变化，全部为 Option
///
/// OTP 是唯一携带金额的类型。模型偶尔把 amount 返回成字符串，
/// 因此保留原始 Value，经 [`numeric_amount`](Self::numeric_amount) 严格换算。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedData {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    // Passport
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passport_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    // OTP
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investor_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sqft: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer: Option<String>,
    // Visa / EID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_uploaded: Option<String>,
}

impl ExtractedData {
    /// amount 的数值化: 数字直接取值，字符串尝试解析，其余为 None
    pub fn numeric_amount(&self) -> Option<f64> {
        match self.amount.as_ref()? {
            Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }
}

/// 归类过程的持久化元数据 (调试 / 重新分组视图使用)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistenceMetadata {
    pub uploaded_at: String,
    pub category_determined: String,
    pub folder_type_used: String,
    pub unit_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn otp_doc(extracted_amount: Option<Value>, own_amount: Option<f64>) -> Document {
        Document {
            document_id: "1".into(),
            id: "1".into(),
            investor_id: "inv-1".into(),
            investor_name: "Test".into(),
            unit_id: None,
            document_type: Some("OTP".into()),
            file_name: "otp.pdf".into(),
            upload_date: "2026-01-01".into(),
            status: STATUS_PROCESSED.into(),
            file_url: None,
            category: None,
            original_category: None,
            extracted_data: extracted_amount.map(|amount| ExtractedData {
                doc_type: Some("OTP".into()),
                document_id: None,
                passport_number: None,
                full_name: None,
                expiry_date: None,
                investor_name: None,
                unit_details: None,
                sqft: None,
                amount: Some(amount),
                developer: None,
                id_number: None,
                date_uploaded: None,
            }),
            file_type: None,
            file_size: None,
            amount: own_amount,
            google_drive: None,
            google_drive_error: None,
            target_folder: None,
            target_folder_id: None,
            notion_id: None,
            persistence_metadata: None,
        }
    }

    #[test]
    fn extracted_amount_takes_precedence() {
        let doc = otp_doc(Some(json!(250000)), Some(99.0));
        assert_eq!(doc.monetary_amount(), 250000.0);
    }

    #[test]
    fn string_amount_is_parsed() {
        let doc = otp_doc(Some(json!("180000.5")), None);
        assert_eq!(doc.monetary_amount(), 180000.5);
    }

    #[test]
    fn garbage_amount_falls_back_to_own_field() {
        let doc = otp_doc(Some(json!("not a number")), Some(42.0));
        assert_eq!(doc.monetary_amount(), 42.0);
    }

    #[test]
    fn missing_amounts_are_zero_not_nan() {
        let doc = otp_doc(None, None);
        assert_eq!(doc.monetary_amount(), 0.0);
    }

    #[test]
    fn extracted_type_widens_otp_detection() {
        let mut doc = otp_doc(Some(json!(1000)), None);
        doc.document_type = Some("Other".into());
        assert!(doc.is_otp());
    }
}
