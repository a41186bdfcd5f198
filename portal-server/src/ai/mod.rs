//! AI 文档提取适配器
//!
//! 每份上传调用一次 chat-completion 端点，system prompt 按申报类型
//! 固定期望的 JSON 形状 (Passport / OTP / Visa / Other，其中只有 OTP
//! 携带金额)。模型偶尔把 JSON 包在 ``` 围栏里，解析前剥掉。
//!
//! 任何失败 (网络、非 2xx、缺 choices、JSON 解析) 都返回该类型的
//! 确定性兜底结果 ("AI_FAILED_…" 哨兵值)，绝不向上抛错 — 下游把
//! 真实结果与兜底结果同样视为"已处理"，提取失败从不阻断上传。

use std::time::Duration;

use serde_json::json;

use shared::models::ExtractedData;

use crate::core::AiConfig;

/// 申报类型归一化后的四种提取档案
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Passport,
    Otp,
    Visa,
    Other,
}

impl DocumentKind {
    /// 申报类型 → 档案；未识别的自由文本落到 Other
    pub fn from_declared(declared: &str) -> Self {
        match declared {
            "Passport" => Self::Passport,
            "OTP" => Self::Otp,
            "Visa" => Self::Visa,
            _ => Self::Other,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Passport => "Passport",
            Self::Otp => "OTP",
            Self::Visa => "Visa",
            Self::Other => "Other",
        }
    }
}

pub struct ExtractionService {
    http: reqwest::Client,
    config: AiConfig,
}

impl ExtractionService {
    pub fn new(config: AiConfig, timeout_ms: u64) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .unwrap_or_default();
        Self { http, config }
    }

    /// 提取文档字段；永不失败，失败路径返回兜底结果
    pub async fn process_document(
        &self,
        file_data: &str,
        declared_type: &str,
        file_name: &str,
    ) -> ExtractedData {
        let kind = DocumentKind::from_declared(declared_type);
        tracing::info!(file = %file_name, declared = %declared_type, "Starting AI extraction");

        match self.try_extract(file_data, declared_type, file_name).await {
            Ok(extracted) => {
                tracing::info!(file = %file_name, "AI extraction succeeded");
                extracted
            }
            Err(e) => {
                tracing::warn!(file = %file_name, error = %e, "AI extraction failed, using fallback");
                fallback_for(kind)
            }
        }
    }

    async fn try_extract(
        &self,
        file_data: &str,
        declared_type: &str,
        file_name: &str,
    ) -> Result<ExtractedData, String> {
        let today = chrono::Utc::now().format("%Y-%m-%d").to_string();

        let mut request = self
            .http
            .post(&self.config.api_url)
            .json(&json!({
                "model": self.config.model,
                "messages": [
                    { "role": "system", "content": system_prompt(&today) },
                    { "role": "user", "content": [
                        {
                            "type": "text",
                            "text": format!(
                                "Extract information from this {} document. Return only JSON.",
                                declared_type
                            )
                        },
                        {
                            "type": "file",
                            "file": { "filename": file_name, "file_data": file_data }
                        }
                    ]}
                ]
            }));

        if let Some(customer_id) = &self.config.customer_id {
            request = request.header("customerId", customer_id);
        }
        if let Some(token) = &self.config.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| format!("AI request failed: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!("AI API error: {} - {}", status, body));
        }

        let completion: serde_json::Value = response
            .json()
            .await
            .map_err(|e| format!("Invalid AI response body: {}", e))?;

        let content = completion
            .pointer("/choices/0/message/content")
            .and_then(|c| c.as_str())
            .ok_or("AI response missing choices")?;

        let json_content = strip_code_fences(content);
        serde_json::from_str::<ExtractedData>(json_content.trim())
            .map_err(|e| format!("AI returned invalid JSON: {}", e))
    }
}

/// 剥掉 ```json / ``` 围栏，没有围栏时原样返回
fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // 跳过语言标记行 ("json" 等)
    let body = rest.split_once('\n').map(|(_, b)| b).unwrap_or(rest);
    body.rsplit_once("```").map(|(b, _)| b).unwrap_or(body).trim()
}

fn system_prompt(today: &str) -> String {
    format!(
        r#"You are a document processing AI for an investor portal. Extract relevant information from documents and return ONLY valid JSON format.

For Passport documents, return:
{{
"type": "Passport",
"documentId": "generated-unique-id",
"passportNumber": "passport number from document",
"fullName": "full name from passport",
"expiryDate": "YYYY-MM-DD",
"dateUploaded": "{today}"
}}

For OTP documents, return:
{{
"type": "OTP",
"documentId": "generated-unique-id",
"investorName": "investor name from document",
"unitDetails": "unit description and details",
"sqft": "area in square feet",
"amount": 250000,
"developer": "developer/project name",
"dateUploaded": "{today}"
}}

For Visa/EID documents, return:
{{
"type": "Visa",
"documentId": "generated-unique-id",
"idNumber": "ID/visa number",
"fullName": "full name from document",
"expiryDate": "YYYY-MM-DD",
"dateUploaded": "{today}"
}}

For Other documents, return:
{{
"type": "Other",
"documentId": "generated-unique-id",
"dateUploaded": "{today}"
}}

Return ONLY the JSON object, no other text or formatting."#
    )
}

/// 每种类型的确定性兜底结果
pub fn fallback_for(kind: DocumentKind) -> ExtractedData {
    let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
    let document_id = chrono::Utc::now().timestamp_millis().to_string();
    let failed_ref = format!("AI_FAILED_{}", &uuid::Uuid::new_v4().simple().to_string()[..6]);
    const MANUAL: &str = "AI Processing Failed - Manual Review Required";

    let mut data = ExtractedData {
        doc_type: Some(kind.label().to_string()),
        document_id: Some(document_id),
        passport_number: None,
        full_name: None,
        expiry_date: None,
        investor_name: None,
        unit_details: None,
        sqft: None,
        amount: None,
        developer: None,
        id_number: None,
        date_uploaded: Some(today),
    };

    match kind {
        DocumentKind::Passport => {
            data.passport_number = Some(failed_ref);
            data.full_name = Some(MANUAL.to_string());
            data.expiry_date = Some("2030-01-01".to_string());
        }
        DocumentKind::Otp => {
            data.investor_name = Some(MANUAL.to_string());
            data.unit_details = Some("Manual review required".to_string());
            data.sqft = Some("0".to_string());
            data.amount = Some(json!(0));
            data.developer = Some("Manual review required".to_string());
        }
        DocumentKind::Visa => {
            data.id_number = Some(failed_ref);
            data.full_name = Some(MANUAL.to_string());
            data.expiry_date = Some("2025-01-01".to_string());
        }
        DocumentKind::Other => {}
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_type_maps_to_kind() {
        assert_eq!(DocumentKind::from_declared("Passport"), DocumentKind::Passport);
        assert_eq!(DocumentKind::from_declared("OTP"), DocumentKind::Otp);
        assert_eq!(DocumentKind::from_declared("Visa"), DocumentKind::Visa);
        // 未识别的自由文本落到 Other
        assert_eq!(DocumentKind::from_declared("OTP Document"), DocumentKind::Other);
        assert_eq!(DocumentKind::from_declared(""), DocumentKind::Other);
    }

    #[test]
    fn fences_are_stripped() {
        assert_eq!(strip_code_fences("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
    }

    #[test]
    fn otp_fallback_has_zero_amount() {
        let data = fallback_for(DocumentKind::Otp);
        assert_eq!(data.doc_type.as_deref(), Some("OTP"));
        assert_eq!(data.numeric_amount(), Some(0.0));
        assert_eq!(
            data.investor_name.as_deref(),
            Some("AI Processing Failed - Manual Review Required")
        );
    }

    #[test]
    fn passport_fallback_has_sentinel_number() {
        let data = fallback_for(DocumentKind::Passport);
        assert!(data.passport_number.unwrap().starts_with("AI_FAILED_"));
        assert_eq!(data.expiry_date.as_deref(), Some("2030-01-01"));
    }

    #[test]
    fn other_fallback_is_minimal() {
        let data = fallback_for(DocumentKind::Other);
        assert!(data.amount.is_none());
        assert!(data.document_id.is_some());
    }
}
