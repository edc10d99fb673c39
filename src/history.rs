use crate::Result;
use crate::storage::{KeyValueStore, USED_WORDS_KEY};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

/// 一个已经出现过的词语
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsedWordRecord {
    pub id: u32,
    pub date: NaiveDate,
}

/// 记录历史对局用过的词，避免下一局重复出现
pub struct UsedWordTracker<S> {
    store: S,
}

impl<S: KeyValueStore> UsedWordTracker<S> {
    pub fn new(store: S) -> Self {
        UsedWordTracker { store }
    }

    /// 读取全部记录；缺失或损坏时返回空列表
    pub fn records(&self) -> Vec<UsedWordRecord> {
        let data = match self.store.get(USED_WORDS_KEY) {
            Ok(Some(data)) => data,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("无法读取已用词记录: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&data) {
            Ok(records) => records,
            Err(e) => {
                warn!("已用词记录格式错误，视为空记录: {}", e);
                Vec::new()
            }
        }
    }

    pub fn load_used_ids(&self) -> HashSet<u32> {
        self.records().into_iter().map(|record| record.id).collect()
    }

    pub fn record_used(&mut self, ids: &[u32]) -> Result<()> {
        self.record_used_on(ids, Utc::now().date_naive())
    }

    /// 按 id 合并：已存在的 id 只更新日期
    pub fn record_used_on(&mut self, ids: &[u32], date: NaiveDate) -> Result<()> {
        let mut records = self.records();
        for &id in ids {
            match records.iter_mut().find(|record| record.id == id) {
                Some(record) => record.date = date,
                None => records.push(UsedWordRecord { id, date }),
            }
        }

        let data = serde_json::to_string(&records)
            .map_err(|e| crate::Error::Storage(e.to_string()))?;
        self.store.set(USED_WORDS_KEY, &data)?;
        debug!("已记录 {} 个已用词，共 {} 条", ids.len(), records.len());
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        self.store.remove(USED_WORDS_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn absent_storage_is_empty() {
        let tracker = UsedWordTracker::new(MemoryStore::new());
        assert!(tracker.load_used_ids().is_empty());
    }

    #[test]
    fn recording_twice_keeps_membership() {
        let mut tracker = UsedWordTracker::new(MemoryStore::new());
        tracker.record_used_on(&[1, 2, 3], day(1)).unwrap();
        tracker.record_used_on(&[1, 2, 3], day(2)).unwrap();

        let records = tracker.records();
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|record| record.date == day(2)));
        assert_eq!(tracker.load_used_ids(), HashSet::from([1, 2, 3]));
    }

    #[test]
    fn merge_updates_date_and_appends_new_ids() {
        let mut tracker = UsedWordTracker::new(MemoryStore::new());
        tracker.record_used_on(&[5, 6], day(1)).unwrap();
        tracker.record_used_on(&[6, 7], day(3)).unwrap();

        assert_eq!(
            tracker.records(),
            vec![
                UsedWordRecord { id: 5, date: day(1) },
                UsedWordRecord { id: 6, date: day(3) },
                UsedWordRecord { id: 7, date: day(3) },
            ]
        );
    }

    #[test]
    fn stored_format_is_iso_dates() {
        let mut store = MemoryStore::new();
        UsedWordTracker::new(&mut store)
            .record_used_on(&[9], day(4))
            .unwrap();
        assert_eq!(
            store.get(USED_WORDS_KEY).unwrap().as_deref(),
            Some(r#"[{"id":9,"date":"2024-05-04"}]"#)
        );
    }

    #[test]
    fn corrupted_history_degrades_to_empty() {
        let mut store = MemoryStore::new();
        store.set(USED_WORDS_KEY, "not json").unwrap();
        let mut tracker = UsedWordTracker::new(&mut store);
        assert!(tracker.load_used_ids().is_empty());
        tracker.record_used_on(&[1], day(1)).unwrap();
        assert_eq!(tracker.load_used_ids().len(), 1);
    }

    #[test]
    fn clear_removes_everything() {
        let mut tracker = UsedWordTracker::new(MemoryStore::new());
        tracker.record_used_on(&[1, 2], day(1)).unwrap();
        tracker.clear().unwrap();
        assert!(tracker.records().is_empty());
    }
}
