//! 单个 JSON 数组文件集合

use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use crate::{AppError, AppResult};

/// 内存数组 + 镜像文件
///
/// 读操作通过闭包借用切片；写操作通过 [`mutate`](Self::mutate)，
/// 闭包返回后、锁释放前全量重写文件。
pub struct Collection<T> {
    name: &'static str,
    path: PathBuf,
    items: RwLock<Vec<T>>,
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync,
{
    /// 从文件加载；缺失或解析失败时使用 seed
    pub fn load(name: &'static str, path: PathBuf, seed: Vec<T>) -> Self {
        let items = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Vec<T>>(&raw) {
                Ok(loaded) => {
                    tracing::info!(collection = name, count = loaded.len(), "Loaded from file storage");
                    loaded
                }
                Err(e) => {
                    tracing::error!(collection = name, error = %e, "Corrupt collection file, starting fresh");
                    seed
                }
            },
            Err(_) => {
                if seed.is_empty() {
                    tracing::info!(collection = name, "No existing file, starting empty");
                } else {
                    tracing::info!(collection = name, "No existing file, using seed data");
                }
                seed
            }
        };

        Self {
            name,
            path,
            items: RwLock::new(items),
        }
    }

    /// 只读访问
    pub async fn read<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        let guard = self.items.read().await;
        f(&guard)
    }

    /// 变更并同步落盘
    ///
    /// 闭包对数组的修改在文件写入成功后才对后续请求可见视为已提交；
    /// 写盘失败以 500 上抛 (accepted write 不会静默丢失)。
    pub async fn mutate<R>(&self, f: impl FnOnce(&mut Vec<T>) -> R) -> AppResult<R> {
        let mut guard = self.items.write().await;
        let result = f(&mut guard);
        self.persist(&guard)?;
        Ok(result)
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    fn persist(&self, items: &[T]) -> AppResult<()> {
        let json = serde_json::to_string_pretty(items)
            .map_err(|e| AppError::internal(format!("Failed to serialize {}: {}", self.name, e)))?;
        std::fs::write(&self.path, json)
            .map_err(|e| AppError::internal(format!("Failed to save {}: {}", self.name, e)))?;
        tracing::debug!(collection = self.name, count = items.len(), "Saved to file storage");
        Ok(())
    }
}
