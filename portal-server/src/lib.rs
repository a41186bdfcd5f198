//! Investor Portal Backend
//!
//! # 架构概述
//!
//! 投资人门户的后端节点，提供以下核心功能：
//!
//! - **文件存储** (`store`): investors/units/documents/orders 四个 JSON 集合
//! - **云盘适配器** (`drive`): Google Drive 文件夹层级与上传 (best-effort)
//! - **数据库镜像** (`notion`): Notion 页面镜像 (best-effort)
//! - **AI 提取** (`ai`): 文档字段提取，失败时返回兜底结果
//! - **归类规则** (`catalog`): 文档分类与目标文件夹解析
//! - **估值** (`portfolio`): 仅 OTP 文档参与的持仓估值
//! - **新闻聚合** (`news`): RSS 抓取、过滤、缓存与定时刷新
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! portal-server/src/
//! ├── core/       # 配置、状态、服务器
//! ├── store/      # JSON 文件集合
//! ├── drive/      # Google Drive 适配器
//! ├── notion/     # Notion 镜像适配器
//! ├── ai/         # 文档提取适配器
//! ├── catalog/    # 文档归类规则
//! ├── portfolio/  # 持仓估值
//! ├── news/       # 新闻聚合
//! ├── api/        # HTTP 路由和处理器
//! └── utils/      # 错误、日志等工具
//! ```

pub mod ai;
pub mod api;
pub mod catalog;
pub mod core;
pub mod drive;
pub mod news;
pub mod notion;
pub mod portfolio;
pub mod store;
pub mod utils;

// Re-export 公共类型
pub use crate::core::{Config, Server, ServerState};
pub use crate::utils::{AppError, AppResult};

/// 设置运行环境: dotenv + 日志
pub fn setup_environment() -> std::io::Result<()> {
    // .env 不存在不是错误
    let _ = dotenv::dotenv();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    utils::logger::init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   ___           __        __
  / _ \___  ____/ /_____ _/ /
 / ___/ _ \/ __/ __/ __ `/ /
/_/   \___/_/  \__/\__,_/_/
Investor Portal Backend v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
