use crate::Result;
use crate::card::{BOARD_SIZE, Card, TeamColor, TeamCount};
use crate::history::UsedWordTracker;
use crate::storage::KeyValueStore;
use crate::word_bank::{WordBank, WordEntry};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use tracing::{info, warn};

/// 计算本局 25 张卡牌的颜色分布（未打乱）
///
/// 两队：先手 9 张，后手 8 张，中立 7 张，刺客 1 张。
/// 三队：蓝红绿各 8 张，刺客 1 张，没有中立。
pub fn color_distribution(starting_team: TeamColor, team_count: TeamCount) -> Result<Vec<TeamColor>> {
    if !team_count.is_active(starting_team) {
        return Err(crate::Error::Game(format!(
            "{} 不能在 {} 队模式中先手",
            starting_team, team_count
        )));
    }

    let mut colors = Vec::with_capacity(BOARD_SIZE);
    match team_count {
        TeamCount::Two => {
            let second_team = team_count.next_team(starting_team);
            colors.extend(std::iter::repeat_n(starting_team, 9));
            colors.extend(std::iter::repeat_n(second_team, 8));
            colors.extend(std::iter::repeat_n(TeamColor::Neutral, 7));
        }
        TeamCount::Three => {
            for &team in team_count.active_teams() {
                colors.extend(std::iter::repeat_n(team, 8));
            }
        }
    }
    colors.push(TeamColor::Assassin);
    Ok(colors)
}

/// 棋盘生成器
pub struct BoardGenerator<'a> {
    word_bank: &'a WordBank,
}

impl<'a> BoardGenerator<'a> {
    pub fn new(word_bank: &'a WordBank) -> Self {
        BoardGenerator { word_bank }
    }

    /// 从未使用过的词里抽 25 个，并随机分配颜色
    ///
    /// 未使用的词不足 25 个时清空历史记录，改从整个词库抽取。
    pub fn generate<S, R>(
        &self,
        starting_team: TeamColor,
        team_count: TeamCount,
        tracker: &mut UsedWordTracker<S>,
        rng: &mut R,
    ) -> Result<Vec<Card>>
    where
        S: KeyValueStore,
        R: Rng + ?Sized,
    {
        let mut colors = color_distribution(starting_team, team_count)?;

        if self.word_bank.len() < BOARD_SIZE {
            return Err(crate::Error::WordBank(format!(
                "词库只有 {} 个词，无法生成棋盘",
                self.word_bank.len()
            )));
        }

        let distinct: HashSet<u32> = self.word_bank.entries().iter().map(|entry| entry.id).collect();
        if distinct.len() != self.word_bank.len() {
            return Err(crate::Error::WordBank(format!(
                "词库中有 {} 个重复的 id，请先用 word-manager validate 检查",
                self.word_bank.len() - distinct.len()
            )));
        }

        let used = tracker.load_used_ids();
        let mut candidates: Vec<&WordEntry> = self
            .word_bank
            .entries()
            .iter()
            .filter(|entry| !used.contains(&entry.id))
            .collect();

        if candidates.len() < BOARD_SIZE {
            warn!(
                "未使用的词只剩 {} 个，重置已用词记录",
                candidates.len()
            );
            tracker.clear()?;
            candidates = self.word_bank.entries().iter().collect();
        }

        candidates.shuffle(rng);
        candidates.truncate(BOARD_SIZE);

        let ids: Vec<u32> = candidates.iter().map(|entry| entry.id).collect();
        tracker.record_used(&ids)?;

        colors.shuffle(rng);

        let board: Vec<Card> = candidates
            .into_iter()
            .zip(colors)
            .map(|(entry, color)| Card::new(entry.id, entry.word.clone(), color))
            .collect();

        info!("生成新棋盘: {} 队, {} 先手", team_count, starting_team);
        Ok(board)
    }
}
