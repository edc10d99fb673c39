use crate::Result;
use crate::card::BOARD_SIZE;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// 词库中的一个词条
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    pub id: u32,
    pub word: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordBankData {
    pub words: Vec<WordEntry>,
}

/// 词库：按顺序保存词条，并维护 id → 词语 的索引
#[derive(Debug, Clone)]
pub struct WordBank {
    entries: Vec<WordEntry>,
    index: HashMap<u32, usize>,
}

const DEFAULT_WORDS: &[&str] = &[
    "agent", "anchor", "apple", "bank", "bark", "battery", "bear", "bell", "berlin", "bolt",
    "bridge", "canada", "capital", "castle", "charge", "chest", "circle", "cloak", "code",
    "comet", "crane", "crown", "diamond", "dragon", "eagle", "engine", "field", "fire",
    "forest", "ghost", "glass", "horse", "ice", "jet", "key", "knight", "laser", "lemon",
    "lock", "mask", "mercury", "mint", "moon", "night", "note", "olive", "opera", "palm",
    "pilot", "pipe", "pirate", "plane", "port", "queen", "ring", "robot", "rock", "satellite",
    "scale", "shadow", "ship", "spring", "star", "storm", "temple", "tower", "train", "watch",
];

impl WordBank {
    /// 从文件加载词库，失败时退回内置词库
    pub fn new(file_path: &str) -> Self {
        match Self::load_from_file(file_path) {
            Ok(word_bank) => word_bank,
            Err(e) => {
                warn!("无法加载词库文件: {}, 使用默认词库", e);
                Self::load_default_words()
            }
        }
    }

    pub fn from_entries(entries: Vec<WordEntry>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry.id, i))
            .collect();
        WordBank { entries, index }
    }

    /// 从文件加载词库
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("无法读取词库文件: {}", path))?;

        let data: WordBankData =
            serde_json::from_str(&content).with_context(|| "无法解析词库文件格式")?;

        Ok(Self::from_entries(data.words))
    }

    /// 保存词库到文件
    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let data = WordBankData {
            words: self.entries.clone(),
        };

        let content = serde_json::to_string_pretty(&data).with_context(|| "无法序列化词库")?;

        std::fs::write(path, content).with_context(|| format!("无法写入词库文件: {}", path))?;

        Ok(())
    }

    /// 内置词库，id 从 1 开始
    pub fn load_default_words() -> Self {
        let entries = DEFAULT_WORDS
            .iter()
            .zip(1u32..)
            .map(|(word, id)| WordEntry {
                id,
                word: word.to_string(),
            })
            .collect();
        Self::from_entries(entries)
    }

    pub fn get(&self, id: u32) -> Option<&str> {
        self.index
            .get(&id)
            .map(|&i| self.entries[i].word.as_str())
    }

    pub fn entries(&self) -> &[WordEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 获取词库统计信息
    pub fn get_stats(&self, used: &HashSet<u32>) -> WordBankStats {
        let used_words = self
            .entries
            .iter()
            .filter(|entry| used.contains(&entry.id))
            .count();

        WordBankStats {
            total_words: self.entries.len(),
            used_words,
            unused_words: self.entries.len() - used_words,
        }
    }

    /// 验证词库完整性
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.entries.len() < BOARD_SIZE {
            errors.push(format!(
                "词库只有 {} 个词，至少需要 {} 个",
                self.entries.len(),
                BOARD_SIZE
            ));
        }

        let mut seen_ids = HashSet::new();
        let mut seen_words = HashSet::new();
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.word.trim().is_empty() {
                errors.push(format!("第{}个词条为空", i + 1));
            }
            if !seen_ids.insert(entry.id) {
                errors.push(format!("id {} 重复", entry.id));
            }
            if !seen_words.insert(entry.word.to_lowercase()) {
                errors.push(format!("词语 '{}' 重复", entry.word));
            }
        }

        errors
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordBankStats {
    pub total_words: usize,
    pub used_words: usize,
    pub unused_words: usize,
}
