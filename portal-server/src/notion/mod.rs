//! Notion 镜像适配器
//!
//! 投资人与文档记录镜像为远端数据库页面。严格 best-effort：
//! 凭证或数据库 id 缺失时整体跳过；任何异常都被捕获、记日志并
//! 归约为 `None`。镜像页面 id 仅在成功时回写到本地记录。

use serde_json::{Value, json};

use shared::models::{Document, Investor};

use crate::core::NotionConfig;

const PAGES_URL: &str = "https://api.notion.com/v1/pages";
const NOTION_VERSION: &str = "2022-06-28";

pub struct NotionService {
    http: reqwest::Client,
    config: NotionConfig,
    base_url: String,
}

impl NotionService {
    pub fn new(config: NotionConfig, base_url: String) -> Self {
        if config.api_key.is_none() {
            tracing::info!("Notion credentials absent, mirror disabled");
        }
        Self {
            http: reqwest::Client::new(),
            config,
            base_url,
        }
    }

    pub fn enabled(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// 镜像投资人记录，返回页面 id (失败 → None)
    pub async fn mirror_investor(&self, investor: &Investor) -> Option<String> {
        let (api_key, db_id) = (
            self.config.api_key.as_deref()?,
            self.config.investors_db_id.as_deref()?,
        );

        let properties = json!({
            "Name": { "title": [{ "text": { "content": investor.name } }] },
            "Email": { "email": investor.email },
            "Phone": { "phone_number": investor.phone },
            "Nationality": { "rich_text": [{ "text": { "content": investor.nationality } }] },
            "Birth Date": if investor.birth_date.is_empty() {
                Value::Null
            } else {
                json!({ "date": { "start": investor.birth_date } })
            },
            "Password": { "rich_text": [{ "text": { "content": investor.password } }] },
            "Google Drive Folder ID": {
                "rich_text": [{ "text": {
                    "content": investor.google_drive_folder_id.as_deref().unwrap_or("")
                } }]
            },
            "Personal Docs Folder ID": {
                "rich_text": [{ "text": {
                    "content": investor.personal_docs_folder_id.as_deref().unwrap_or("")
                } }]
            },
        });

        match self.create_page(api_key, db_id, properties).await {
            Ok(page_id) => {
                tracing::info!(page = %page_id, "Investor mirrored to Notion");
                Some(page_id)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Notion investor mirror failed");
                None
            }
        }
    }

    /// 镜像文档记录，返回页面 id (失败 → None)
    pub async fn mirror_document(&self, document: &Document) -> Option<String> {
        let (api_key, db_id) = (
            self.config.api_key.as_deref()?,
            self.config.documents_db_id.as_deref()?,
        );

        let mut properties = json!({
            "Document ID": { "title": [{ "text": { "content": document.document_id } }] },
            "Investor Name": { "rich_text": [{ "text": { "content": document.investor_name } }] },
            "Document Type": {
                "rich_text": [{ "text": {
                    "content": document.document_type.as_deref().unwrap_or("Other")
                } }]
            },
            "Upload Date": { "date": { "start": document.upload_date } },
            "Status": { "rich_text": [{ "text": { "content": document.status } }] },
        });

        if let Some(link) = document
            .google_drive
            .as_ref()
            .and_then(|d| d.web_view_link.as_deref())
        {
            properties["Google Drive Link"] = json!({ "url": link });
        }

        if let Some(file_url) = document.file_url.as_deref() {
            let full = if file_url.starts_with("http") {
                file_url.to_string()
            } else {
                format!("{}{}", self.base_url, file_url)
            };
            properties["File"] = json!({ "url": full });
        }

        match self.create_page(api_key, db_id, properties).await {
            Ok(page_id) => {
                tracing::info!(page = %page_id, "Document mirrored to Notion");
                Some(page_id)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Notion document mirror failed");
                None
            }
        }
    }

    async fn create_page(
        &self,
        api_key: &str,
        database_id: &str,
        properties: Value,
    ) -> Result<String, String> {
        let response = self
            .http
            .post(PAGES_URL)
            .bearer_auth(api_key)
            .header("Notion-Version", NOTION_VERSION)
            .json(&json!({
                "parent": { "database_id": database_id },
                "properties": properties,
            }))
            .send()
            .await
            .map_err(|e| format!("Notion request failed: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!("Notion returned {}: {}", status, body));
        }

        #[derive(serde::Deserialize)]
        struct Page {
            id: String,
        }
        let page: Page = response
            .json()
            .await
            .map_err(|e| format!("Invalid Notion response: {}", e))?;
        Ok(page.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NotionConfig;

    #[tokio::test]
    async fn mirror_skipped_without_credentials() {
        let service = NotionService::new(
            NotionConfig {
                api_key: None,
                investors_db_id: None,
                documents_db_id: None,
            },
            "http://localhost:3001".to_string(),
        );
        assert!(service.mirror_investor(&Investor::seed()).await.is_none());
    }
}
