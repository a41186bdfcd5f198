use std::sync::Arc;

use crate::ai::ExtractionService;
use crate::core::{Config, Result};
use crate::drive::DriveService;
use crate::news::NewsService;
use crate::notion::NotionService;
use crate::store::Store;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 所有服务用 Arc 包裹，Clone 是浅拷贝，handler 间共享同一实例。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | store | JSON 文件集合 |
/// | drive | Google Drive 适配器 (可禁用) |
/// | notion | Notion 镜像适配器 (可禁用) |
/// | ai | 文档提取适配器 |
/// | news | 新闻聚合缓存 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub store: Arc<Store>,
    pub drive: Arc<DriveService>,
    pub notion: Arc<NotionService>,
    pub ai: Arc<ExtractionService>,
    pub news: Arc<NewsService>,
}

impl ServerState {
    /// 初始化所有服务
    ///
    /// 外部适配器凭证缺失时降级为禁用模式，不阻止启动；
    /// 只有工作目录/集合文件不可写才会失败。
    pub fn initialize(config: &Config) -> Result<Self> {
        config.ensure_work_dir_structure()?;

        let store = Store::open(&config.data_dir(), &config.uploads_dir())?;
        let drive = DriveService::from_config(&config.drive);
        let notion = NotionService::new(config.notion.clone(), config.base_url.clone());
        let ai = ExtractionService::new(config.ai.clone(), config.request_timeout_ms);
        let news = NewsService::new(config.news_refresh_minutes);

        tracing::info!(
            drive = drive.enabled(),
            notion = notion.enabled(),
            "Server state initialized"
        );

        Ok(Self {
            config: config.clone(),
            store: Arc::new(store),
            drive: Arc::new(drive),
            notion: Arc::new(notion),
            ai: Arc::new(ai),
            news: Arc::new(news),
        })
    }

    /// 启动后台任务 (新闻定时刷新)
    pub fn start_background_tasks(&self) {
        crate::news::spawn_refresh_worker(self.news.clone());
    }
}
