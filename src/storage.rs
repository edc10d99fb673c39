use crate::Result;
use anyhow::Context;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 当前游戏快照（经过编码）
pub const SNAPSHOT_KEY: &str = "spywords.snapshot";
/// 已使用词语记录，JSON 数组 `[{id, date}]`
pub const USED_WORDS_KEY: &str = "spywords.used_words";
/// 翻错是否换手的偏好设置，仅作为新游戏的默认值
pub const TURN_PASS_RULE_KEY: &str = "spywords.turn_pass_rule";

/// 同步的键值存储
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// 内存存储，测试和一次性会话使用
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// 文件存储：每个键对应数据目录下的一个文件
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("无法创建数据目录: {}", dir.display()))?;
        Ok(FileStore { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.dat", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(crate::Error::Storage(format!(
                "无法读取 {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// 先写临时文件再重命名，保证不会留下写了一半的值
    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, value).with_context(|| format!("无法写入 {}", tmp.display()))?;
        fs::rename(&tmp, &path).with_context(|| format!("无法替换 {}", path.display()))?;
        debug!("已写入 {}", key);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(crate::Error::Storage(format!(
                "无法删除 {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

/// 读取翻错换手的偏好设置
pub fn load_turn_pass_preference(store: &impl KeyValueStore) -> Option<bool> {
    match store.get(TURN_PASS_RULE_KEY) {
        Ok(Some(value)) => value.trim().parse().ok(),
        _ => None,
    }
}

pub fn save_turn_pass_preference(store: &mut impl KeyValueStore, pass_on_miss: bool) -> Result<()> {
    store.set(TURN_PASS_RULE_KEY, if pass_on_miss { "true" } else { "false" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::open(dir.path().join("data")).unwrap();

        assert_eq!(store.get("missing").unwrap(), None);
        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));
        assert!(!store.dir().join("k.tmp").exists());

        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn preference_defaults_to_none() {
        let mut store = MemoryStore::new();
        assert_eq!(load_turn_pass_preference(&store), None);
        save_turn_pass_preference(&mut store, false).unwrap();
        assert_eq!(load_turn_pass_preference(&store), Some(false));
        store.set(TURN_PASS_RULE_KEY, "maybe").unwrap();
        assert_eq!(load_turn_pass_preference(&store), None);
    }
}
