//! Google Drive 适配器
//!
//! 每个投资人一个主文件夹 + "Personal Documents" 子文件夹，每个单元
//! 一个懒创建的专属文件夹，上传文件归档到解析出的目标文件夹。
//!
//! # 失败策略
//!
//! 所有操作返回结构化结果 (`Result<_, String>` / 带 error 字段的结构)，
//! 从不向 handler 抛错 — 调用方把错误并入响应的 `warnings`，本地持久化
//! 独立成功。凭证缺失时整个适配器禁用，一切操作立即返回禁用错误。
//!
//! # 已知限制
//!
//! `ensure_folder` 靠 search-then-create 实现幂等，但不是原子的：同一
//! 投资人的两次并发上传可能各自创建同名远端文件夹。接受此竞争；
//! 加固方案是按投资人加 advisory lock，这里刻意不做分布式协调。

mod auth;

use serde::Deserialize;
use serde_json::json;

use shared::models::DriveFileInfo;

use crate::core::DriveConfig;
use crate::utils::encoding::decode_data_url;
use auth::{ServiceAccountKey, TokenProvider};

const FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";
const FOLDER_MIME: &str = "application/vnd.google-apps.folder";

/// 投资人文件夹层级结果
///
/// `error` 非空且两个 id 为 None 时表示根文件夹不可达 —
/// 这是唯一阻断该投资人全部后续文件夹操作的硬失败。
#[derive(Debug, Clone)]
pub struct FolderHierarchy {
    pub main_folder_id: Option<String>,
    pub personal_docs_folder_id: Option<String>,
    pub error: Option<String>,
}

impl FolderHierarchy {
    fn failed(error: impl Into<String>) -> Self {
        Self {
            main_folder_id: None,
            personal_docs_folder_id: None,
            error: Some(error.into()),
        }
    }
}

/// Drive 服务 — 凭证缺失时为禁用状态
pub struct DriveService {
    client: Option<DriveClient>,
    #[cfg(test)]
    stubbed: bool,
}

struct DriveClient {
    http: reqwest::Client,
    tokens: TokenProvider,
    parent_folder_id: Option<String>,
}

impl DriveService {
    /// 从配置构建；凭证解析失败只降级，不阻止启动
    pub fn from_config(config: &DriveConfig) -> Self {
        let raw = config.credentials_json.clone().or_else(|| {
            std::fs::read_to_string(&config.credentials_file).ok()
        });

        let Some(raw) = raw else {
            tracing::info!("No Google Drive credentials found, adapter disabled");
            return Self::disabled();
        };

        match ServiceAccountKey::parse(&raw) {
            Ok(key) => {
                tracing::info!(account = %key.client_email, "Google Drive adapter initialized");
                let http = reqwest::Client::new();
                Self {
                    client: Some(DriveClient {
                        tokens: TokenProvider::new(key, http.clone()),
                        http,
                        parent_folder_id: config.parent_folder_id.clone(),
                    }),
                    #[cfg(test)]
                    stubbed: false,
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to parse Google Drive credentials, adapter disabled");
                Self::disabled()
            }
        }
    }

    /// 测试/本地模式用: 永远禁用的适配器
    pub fn disabled() -> Self {
        Self {
            client: None,
            #[cfg(test)]
            stubbed: false,
        }
    }

    /// 测试桩: ensure_folder 返回确定性 id，不发网络请求
    #[cfg(test)]
    pub(crate) fn stubbed() -> Self {
        Self {
            client: None,
            stubbed: true,
        }
    }

    pub fn enabled(&self) -> bool {
        self.client.is_some()
    }

    /// 查找或创建文件夹，返回文件夹 id
    ///
    /// 幂等 (search-then-create)；名称先剔除文件系统非法字符。
    pub async fn ensure_folder(&self, name: &str, parent_id: &str) -> Result<String, String> {
        let safe_name = sanitize_folder_name(name);

        #[cfg(test)]
        if self.stubbed {
            return Ok(format!("{}::{}", parent_id, safe_name));
        }

        let client = self.require_client()?;
        tracing::debug!(folder = %safe_name, parent = %parent_id, "Looking for folder");

        if let Some(existing) = client.find_folder(&safe_name, parent_id).await? {
            tracing::debug!(folder = %safe_name, id = %existing, "Folder already exists");
            return Ok(existing);
        }

        let id = client.create_folder(&safe_name, parent_id).await?;
        tracing::info!(folder = %safe_name, id = %id, "Created folder");
        Ok(id)
    }

    /// 创建 (或复用) 投资人文件夹层级: 主文件夹 + "Personal Documents"
    pub async fn ensure_investor_hierarchy(&self, investor_name: &str) -> FolderHierarchy {
        let client = match self.require_client() {
            Ok(c) => c,
            Err(e) => return FolderHierarchy::failed(e),
        };
        let Some(parent_id) = client.parent_folder_id.clone() else {
            return FolderHierarchy::failed("Google Drive parent folder not configured");
        };

        // 根文件夹不可达是唯一的硬失败
        if let Err(e) = client.check_accessible(&parent_id).await {
            tracing::error!(error = %e, "Cannot access Drive parent folder");
            return FolderHierarchy::failed(format!("Cannot access parent folder: {}", e));
        }

        let main_folder_id = match self.ensure_folder(investor_name, &parent_id).await {
            Ok(id) => id,
            Err(e) => return FolderHierarchy::failed(e),
        };

        let personal_docs_folder_id = match self
            .ensure_folder("Personal Documents", &main_folder_id)
            .await
        {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to create Personal Documents subfolder");
                None
            }
        };

        tracing::info!(
            main = %main_folder_id,
            personal = ?personal_docs_folder_id,
            "Investor folder hierarchy ready"
        );

        FolderHierarchy {
            main_folder_id: Some(main_folder_id),
            personal_docs_folder_id,
            error: None,
        }
    }

    /// 上传 data-URL 负载到指定文件夹
    ///
    /// 负载损坏是本地验证失败，同样以 `success: false` 返回。
    pub async fn upload(
        &self,
        file_data: &str,
        file_name: &str,
        mime_type: Option<&str>,
        folder_id: &str,
    ) -> DriveFileInfo {
        let client = match self.require_client() {
            Ok(c) => c,
            Err(e) => return upload_failure(e),
        };

        let bytes = match decode_data_url(file_data) {
            Ok(b) => b,
            Err(e) => return upload_failure(e),
        };

        tracing::info!(
            file = %file_name,
            folder = %folder_id,
            size_mb = format!("{:.2}", bytes.len() as f64 / 1024.0 / 1024.0),
            "Uploading file to Drive"
        );

        match client
            .upload_multipart(bytes, file_name, mime_type, folder_id)
            .await
        {
            Ok(info) => info,
            Err(e) => {
                tracing::warn!(file = %file_name, error = %e, "Drive upload failed");
                upload_failure(e)
            }
        }
    }

    fn require_client(&self) -> Result<&DriveClient, String> {
        self.client
            .as_ref()
            .ok_or_else(|| "Google Drive not available".to_string())
    }
}

/// 统一的上传失败结果 (调用方也用它表达"未尝试")
pub fn upload_failure(error: String) -> DriveFileInfo {
    DriveFileInfo {
        success: false,
        file_id: None,
        file_name: None,
        web_view_link: None,
        web_content_link: None,
        size: None,
        error: Some(error),
    }
}

/// 剔除文件系统非法字符 `<>:"/\|?*`
fn sanitize_folder_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            other => other,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Drive 查询串里的单引号转义
fn escape_query(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileRef>,
}

#[derive(Deserialize)]
struct FileRef {
    id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadedFile {
    id: String,
    name: Option<String>,
    web_view_link: Option<String>,
    web_content_link: Option<String>,
    size: Option<String>,
}

impl DriveClient {
    async fn bearer(&self) -> Result<String, String> {
        self.tokens.access_token().await
    }

    async fn check_accessible(&self, file_id: &str) -> Result<(), String> {
        let token = self.bearer().await?;
        let response = self
            .http
            .get(format!("{}/{}", FILES_URL, file_id))
            .bearer_auth(token)
            .query(&[("fields", "id,name"), ("supportsAllDrives", "true")])
            .send()
            .await
            .map_err(|e| format!("Drive request failed: {}", e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(format!("Drive returned {}", response.status()))
        }
    }

    async fn find_folder(&self, name: &str, parent_id: &str) -> Result<Option<String>, String> {
        let token = self.bearer().await?;
        let query = format!(
            "name='{}' and '{}' in parents and mimeType='{}' and trashed=false",
            escape_query(name),
            escape_query(parent_id),
            FOLDER_MIME
        );

        let response = self
            .http
            .get(FILES_URL)
            .bearer_auth(token)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id, name)"),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ])
            .send()
            .await
            .map_err(|e| format!("Drive search failed: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("Drive search returned {}", response.status()));
        }

        let list: FileList = response
            .json()
            .await
            .map_err(|e| format!("Invalid Drive search response: {}", e))?;

        Ok(list.files.into_iter().next().map(|f| f.id))
    }

    async fn create_folder(&self, name: &str, parent_id: &str) -> Result<String, String> {
        let token = self.bearer().await?;
        let response = self
            .http
            .post(FILES_URL)
            .bearer_auth(token)
            .query(&[("fields", "id, name"), ("supportsAllDrives", "true")])
            .json(&json!({
                "name": name,
                "parents": [parent_id],
                "mimeType": FOLDER_MIME,
            }))
            .send()
            .await
            .map_err(|e| format!("Drive create failed: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("Drive create returned {}", response.status()));
        }

        let file: FileRef = response
            .json()
            .await
            .map_err(|e| format!("Invalid Drive create response: {}", e))?;
        Ok(file.id)
    }

    // multipart/related 上传 — reqwest 只内建 form-data，手工拼 body
    async fn upload_multipart(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        mime_type: Option<&str>,
        folder_id: &str,
    ) -> Result<DriveFileInfo, String> {
        let token = self.bearer().await?;
        let boundary = format!("portal-{}", uuid::Uuid::new_v4());
        let metadata = json!({
            "name": file_name,
            "parents": [folder_id],
        });
        let mime = mime_type.unwrap_or("application/octet-stream");

        let mut body: Vec<u8> = Vec::with_capacity(bytes.len() + 512);
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(
            format!("--{boundary}\r\nContent-Type: {mime}\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(&bytes);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        let response = self
            .http
            .post(UPLOAD_URL)
            .bearer_auth(token)
            .query(&[
                ("uploadType", "multipart"),
                ("fields", "id,name,webViewLink,webContentLink,size"),
                ("supportsAllDrives", "true"),
            ])
            .header(
                "Content-Type",
                format!("multipart/related; boundary={boundary}"),
            )
            .body(body)
            .send()
            .await
            .map_err(|e| format!("Drive upload failed: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("Drive upload returned {}", response.status()));
        }

        let uploaded: UploadedFile = response
            .json()
            .await
            .map_err(|e| format!("Invalid Drive upload response: {}", e))?;

        tracing::info!(file_id = %uploaded.id, "File uploaded to Google Drive");

        Ok(DriveFileInfo {
            success: true,
            file_id: Some(uploaded.id),
            file_name: uploaded.name,
            web_view_link: uploaded.web_view_link,
            web_content_link: uploaded.web_content_link,
            size: uploaded.size,
            error: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_illegal_chars() {
        assert_eq!(sanitize_folder_name("A/B:C?D"), "A_B_C_D");
        assert_eq!(sanitize_folder_name("  Marina View  "), "Marina View");
        assert_eq!(sanitize_folder_name("Apartment 2A"), "Apartment 2A");
    }

    #[test]
    fn query_escapes_quotes() {
        assert_eq!(escape_query("O'Brien"), "O\\'Brien");
    }

    #[tokio::test]
    async fn disabled_adapter_returns_structured_failures() {
        let drive = DriveService::disabled();
        assert!(!drive.enabled());

        let err = drive.ensure_folder("X", "parent").await.unwrap_err();
        assert_eq!(err, "Google Drive not available");

        let hierarchy = drive.ensure_investor_hierarchy("Test Investor").await;
        assert!(hierarchy.main_folder_id.is_none());
        assert!(hierarchy.error.is_some());

        let upload = drive.upload("data:x;base64,QQ==", "a.pdf", None, "f").await;
        assert!(!upload.success);
        assert!(upload.error.is_some());
    }

    #[tokio::test]
    async fn corrupt_payload_is_local_validation_failure() {
        let drive = DriveService::disabled();
        // 即使适配器禁用，坏负载也必须以 success:false 返回而不是 panic
        let result = drive.upload("no-separator", "a.pdf", None, "folder").await;
        assert!(!result.success);
    }
}
