//! JSON 文件存储
//!
//! 四个独立集合 (investors / units / documents / orders)，每个集合是
//! 内存数组 + 同名 JSON 文件。每次变更全量重写文件，**写盘完成后**
//! handler 才返回响应 — 没有异步持久化窗口。
//!
//! 已知限制：进程在序列化中途崩溃可能留下半写文件；无跨进程锁。
//! 这是既有格式的接受项，不在本层加固。

mod collection;

use std::path::{Path, PathBuf};

use shared::models::{Document, Investor, Order, Unit};

use crate::utils::encoding::decode_data_url;

pub use collection::Collection;

/// 四个集合 + 上传目录的聚合
pub struct Store {
    pub investors: Collection<Investor>,
    pub units: Collection<Unit>,
    pub documents: Collection<Document>,
    pub orders: Collection<Order>,
    uploads_dir: PathBuf,
}

impl Store {
    /// 启动时加载全部集合
    ///
    /// 文件缺失或损坏 → 空列表；investors 额外落入种子测试账号。
    pub fn open(data_dir: &Path, uploads_dir: &Path) -> std::io::Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        std::fs::create_dir_all(uploads_dir)?;

        Ok(Self {
            investors: Collection::load(
                "investors",
                data_dir.join("investors.json"),
                vec![Investor::seed()],
            ),
            units: Collection::load("units", data_dir.join("units.json"), Vec::new()),
            documents: Collection::load("documents", data_dir.join("documents.json"), Vec::new()),
            orders: Collection::load("orders", data_dir.join("orders.json"), Vec::new()),
            uploads_dir: uploads_dir.to_path_buf(),
        })
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    /// 把 data-URL 负载落盘到 uploads 目录
    ///
    /// 文件名: `<basename>_<毫秒时间戳><ext>`。返回相对 URL
    /// (`/uploads/<file>`)；负载损坏或写盘失败返回 Err(原因)，
    /// 调用方据此把文档标记为 Error 而不是中断请求。
    pub fn save_file_locally(&self, file_data: &str, filename: &str) -> Result<String, String> {
        let bytes = decode_data_url(file_data)?;

        let path = Path::new(filename);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "file".to_string());
        let ext = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let unique = format!("{}_{}{}", stem, chrono::Utc::now().timestamp_millis(), ext);

        let target = self.uploads_dir.join(&unique);
        std::fs::write(&target, &bytes).map_err(|e| format!("Failed to write file: {}", e))?;

        tracing::info!(file = %unique, size = bytes.len(), "File saved locally");
        Ok(format!("/uploads/{}", unique))
    }

    /// 集合总数概览 (状态端点用)
    pub async fn counts(&self) -> StoreCounts {
        StoreCounts {
            investors: self.investors.len().await,
            documents: self.documents.len().await,
            units: self.units.len().await,
            orders: self.orders.len().await,
        }
    }
}

#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct StoreCounts {
    pub investors: usize,
    pub documents: usize,
    pub units: usize,
    pub orders: usize,
}

#[cfg(test)]
mod tests;
