use std::path::PathBuf;

/// 服务器配置 - 门户后端的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖，全部可选 —
/// 外部服务凭证缺失时对应适配器自动降级为本地模式：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | . | 工作目录 (data/ 与 uploads/ 的父目录) |
/// | HTTP_PORT | 3001 | HTTP 服务端口 |
/// | BASE_URL | http://localhost:3001 | 构建文件绝对链接 |
/// | REQUEST_TIMEOUT_MS | 30000 | 出站 AI / RSS 请求超时(毫秒) |
/// | NEWS_REFRESH_MINUTES | 30 | 新闻缓存刷新间隔(分钟) |
/// | GOOGLE_DRIVE_PARENT_FOLDER_ID | - | Drive 根文件夹 |
/// | GOOGLE_DRIVE_CREDENTIALS | - | 服务账号 JSON (内联) |
/// | GOOGLE_CREDENTIALS_FILE | google-credentials.json | 服务账号 JSON 文件路径 |
/// | NOTION_API_KEY | - | Notion 集成令牌 |
/// | NOTION_INVESTORS_DB_ID | - | 投资人镜像数据库 |
/// | NOTION_DOCUMENTS_DB_ID | - | 文档镜像数据库 |
/// | AI_API_URL | https://oi-server.onrender.com/chat/completions | 提取端点 |
/// | AI_CUSTOMER_ID | - | 提取端点 customerId 头 |
/// | AI_AUTH_TOKEN | - | 提取端点 Bearer 令牌 |
/// | AI_MODEL | openrouter/claude-sonnet-4 | 提取模型 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | - | 日志文件目录 (可选) |
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 对外基地址 (Notion 镜像里的文件链接用它拼绝对 URL)
    pub base_url: String,
    /// 出站请求超时 (毫秒)
    pub request_timeout_ms: u64,
    /// 新闻缓存刷新间隔 (分钟)
    pub news_refresh_minutes: u64,
    /// Google Drive 适配器配置
    pub drive: DriveConfig,
    /// Notion 镜像适配器配置
    pub notion: NotionConfig,
    /// AI 提取适配器配置
    pub ai: AiConfig,
}

/// Google Drive 配置 — 凭证缺失时适配器禁用
#[derive(Debug, Clone)]
pub struct DriveConfig {
    pub parent_folder_id: Option<String>,
    /// 内联服务账号 JSON (优先于文件)
    pub credentials_json: Option<String>,
    pub credentials_file: PathBuf,
}

/// Notion 配置 — 任一字段缺失时对应镜像跳过
#[derive(Debug, Clone)]
pub struct NotionConfig {
    pub api_key: Option<String>,
    pub investors_db_id: Option<String>,
    pub documents_db_id: Option<String>,
}

/// AI 提取端点配置
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_url: String,
    pub customer_id: Option<String>,
    pub auth_token: Option<String>,
    pub model: String,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| ".".into());
        let credentials_file = std::env::var("GOOGLE_CREDENTIALS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(&work_dir).join("google-credentials.json"));

        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3001),
            base_url: std::env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3001".into()),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30000),
            news_refresh_minutes: std::env::var("NEWS_REFRESH_MINUTES")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30),
            drive: DriveConfig {
                parent_folder_id: std::env::var("GOOGLE_DRIVE_PARENT_FOLDER_ID").ok(),
                credentials_json: std::env::var("GOOGLE_DRIVE_CREDENTIALS").ok(),
                credentials_file,
            },
            notion: NotionConfig {
                api_key: std::env::var("NOTION_API_KEY").ok(),
                investors_db_id: std::env::var("NOTION_INVESTORS_DB_ID").ok(),
                documents_db_id: std::env::var("NOTION_DOCUMENTS_DB_ID").ok(),
            },
            ai: AiConfig {
                api_url: std::env::var("AI_API_URL")
                    .unwrap_or_else(|_| "https://oi-server.onrender.com/chat/completions".into()),
                customer_id: std::env::var("AI_CUSTOMER_ID").ok(),
                auth_token: std::env::var("AI_AUTH_TOKEN").ok(),
                model: std::env::var("AI_MODEL")
                    .unwrap_or_else(|_| "openrouter/claude-sonnet-4".into()),
            },
            work_dir,
        }
    }

    /// JSON 集合文件目录
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("data")
    }

    /// 上传文件目录
    pub fn uploads_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("uploads")
    }

    /// 确保目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.data_dir())?;
        std::fs::create_dir_all(self.uploads_dir())?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
