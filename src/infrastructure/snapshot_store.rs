// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::repositories::snapshot_repository::{SnapshotError, SnapshotRepository};

/// 本地文件系统快照存储
pub struct LocalSnapshotStore {
    base_path: PathBuf,
}

impl LocalSnapshotStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }
}

#[async_trait]
impl SnapshotRepository for LocalSnapshotStore {
    async fn save(&self, name: &str, html: &str) -> Result<String, SnapshotError> {
        fs::create_dir_all(&self.base_path).await?;

        let full_path = self.base_path.join(name);
        let mut file = fs::File::create(&full_path).await?;
        file.write_all(html.as_bytes()).await?;
        file.flush().await?;

        Ok(full_path.to_string_lossy().to_string())
    }
}

/// 内存快照存储，用于测试
#[derive(Default)]
pub struct InMemorySnapshotStore {
    snapshots: RwLock<HashMap<String, String>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.snapshots.read().get(name).cloned()
    }

    /// 已保存快照的名称，按字母排序
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.snapshots.read().keys().cloned().collect();
        names.sort();
        names
    }
}

#[async_trait]
impl SnapshotRepository for InMemorySnapshotStore {
    async fn save(&self, name: &str, html: &str) -> Result<String, SnapshotError> {
        self.snapshots
            .write()
            .insert(name.to_string(), html.to_string());
        Ok(format!("memory://{}", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_store_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalSnapshotStore::new(dir.path().join("snapshots"));

        let location = store
            .save("error_page_de_0.html", "<html>captcha</html>")
            .await
            .unwrap();

        let written = tokio::fs::read_to_string(&location).await.unwrap();
        assert_eq!(written, "<html>captcha</html>");
        assert!(location.ends_with("error_page_de_0.html"));
    }

    #[tokio::test]
    async fn test_local_store_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalSnapshotStore::new(dir.path());

        store.save("error_page_at_1.html", "first").await.unwrap();
        let location = store.save("error_page_at_1.html", "second").await.unwrap();

        assert_eq!(tokio::fs::read_to_string(location).await.unwrap(), "second");
    }

    #[tokio::test]
    async fn test_in_memory_store() {
        let store = InMemorySnapshotStore::new();
        store.save("b.html", "2").await.unwrap();
        store.save("a.html", "1").await.unwrap();

        assert_eq!(store.names(), vec!["a.html".to_string(), "b.html".to_string()]);
        assert_eq!(store.get("a.html").as_deref(), Some("1"));
        assert_eq!(store.get("missing.html"), None);
    }
}
