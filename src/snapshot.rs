use crate::Result;
use crate::card::{BOARD_SIZE, Card, TeamColor, TeamCount, count_color, key_grid};
use crate::codec::{self, DecodeError};
use crate::game::{GameConfig, GameEngine};
use crate::storage::{KeyValueStore, SNAPSHOT_KEY};
use crate::word_bank::WordBank;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("无法解码快照: {0}")]
    Decode(#[from] DecodeError),
    #[error("快照格式错误: {0}")]
    Json(#[from] serde_json::Error),
    #[error("棋盘必须有 25 张牌，实际为 {0}")]
    BoardLength(usize),
    #[error("不支持的队伍数量: {0}")]
    TeamCount(u8),
    #[error("{0} 不是本局的参赛队伍")]
    InactiveTurn(TeamColor),
    #[error("两队模式的棋盘中出现了绿队的牌")]
    UnexpectedGreen,
    #[error("棋盘必须恰好有一张刺客牌，实际为 {0}")]
    AssassinCount(usize),
    #[error("卡牌颜色分布不合法: 蓝 {blue} 红 {red} 绿 {green} 中立 {neutral}")]
    Distribution {
        blue: usize,
        red: usize,
        green: usize,
        neutral: usize,
    },
    #[error("词库中没有 id 为 {0} 的词")]
    UnknownWord(u32),
}

/// 快照中的一张牌，颜色用单字母编码
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedCard {
    pub id: u32,
    #[serde(rename = "type", with = "type_code")]
    pub color: TeamColor,
    #[serde(default)]
    pub revealed: bool,
}

/// 可持久化、可分享的游戏状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSnapshot {
    pub board: Vec<PersistedCard>,
    #[serde(default = "default_turn")]
    pub turn: TeamColor,
    #[serde(default)]
    pub terminated: bool,
    #[serde(rename = "numTeams", default = "default_num_teams")]
    pub num_teams: u8,
    #[serde(rename = "turnPassRule", default = "default_turn_pass_rule")]
    pub turn_pass_rule: bool,
}

fn default_turn() -> TeamColor {
    TeamColor::Blue
}

fn default_num_teams() -> u8 {
    2
}

fn default_turn_pass_rule() -> bool {
    true
}

mod type_code {
    use crate::card::TeamColor;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(color: &TeamColor, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_char(color.code())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TeamColor, D::Error> {
        let code = String::deserialize(deserializer)?;
        let mut chars = code.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => TeamColor::from_code(c)
                .ok_or_else(|| D::Error::custom(format!("未知的卡牌类型: {}", code))),
            _ => Err(D::Error::custom(format!("未知的卡牌类型: {}", code))),
        }
    }
}

impl PersistedSnapshot {
    pub fn from_engine(engine: &GameEngine) -> Self {
        let config = engine.config();
        PersistedSnapshot {
            board: engine
                .board()
                .iter()
                .map(|card| PersistedCard {
                    id: card.id,
                    color: card.color,
                    revealed: card.revealed,
                })
                .collect(),
            turn: engine.current_turn(),
            terminated: engine.is_finished(),
            num_teams: config.team_count.as_u8(),
            turn_pass_rule: config.turn_pass_on_miss,
        }
    }

    pub fn to_json(&self) -> std::result::Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    /// 解析并校验快照，所有读取快照的路径都经过这里
    pub fn parse(json: &str) -> std::result::Result<Self, SnapshotError> {
        let snapshot: PersistedSnapshot = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn from_token(token: &str) -> std::result::Result<Self, SnapshotError> {
        let json = codec::decode(token)?;
        Self::parse(&json)
    }

    pub fn to_token(&self) -> std::result::Result<String, SnapshotError> {
        Ok(codec::encode(&self.to_json()?))
    }

    pub fn team_count(&self) -> std::result::Result<TeamCount, SnapshotError> {
        TeamCount::try_from(self.num_teams).map_err(|_| SnapshotError::TeamCount(self.num_teams))
    }

    pub fn validate(&self) -> std::result::Result<(), SnapshotError> {
        if self.board.len() != BOARD_SIZE {
            return Err(SnapshotError::BoardLength(self.board.len()));
        }

        let team_count = self.team_count()?;
        if !team_count.is_active(self.turn) {
            return Err(SnapshotError::InactiveTurn(self.turn));
        }

        let count = |color: TeamColor| self.board.iter().filter(|card| card.color == color).count();
        if team_count == TeamCount::Two && count(TeamColor::Green) > 0 {
            return Err(SnapshotError::UnexpectedGreen);
        }
        let assassins = count(TeamColor::Assassin);
        if assassins != 1 {
            return Err(SnapshotError::AssassinCount(assassins));
        }

        // 两队为 9/8/7/1（先手 9 张），三队为 8/8/8/1
        let blue = count(TeamColor::Blue);
        let red = count(TeamColor::Red);
        let green = count(TeamColor::Green);
        let neutral = count(TeamColor::Neutral);
        let valid = match team_count {
            TeamCount::Two => neutral == 7 && matches!((blue, red), (9, 8) | (8, 9)),
            TeamCount::Three => neutral == 0 && blue == 8 && red == 8 && green == 8,
        };
        if !valid {
            return Err(SnapshotError::Distribution {
                blue,
                red,
                green,
                neutral,
            });
        }

        Ok(())
    }

    /// 用词库补全词语，生成完整的棋盘
    fn cards(&self, word_bank: &WordBank, reveal_all: bool) -> std::result::Result<Vec<Card>, SnapshotError> {
        self.board
            .iter()
            .map(|entry| -> std::result::Result<Card, SnapshotError> {
                let word = word_bank
                    .get(entry.id)
                    .ok_or(SnapshotError::UnknownWord(entry.id))?;
                Ok(Card {
                    id: entry.id,
                    word: word.to_string(),
                    color: entry.color,
                    revealed: reveal_all || entry.revealed,
                })
            })
            .collect()
    }
}

impl GameEngine {
    /// 从快照还原游戏，终局状态根据棋盘重新计算
    pub fn restore(snapshot: &PersistedSnapshot, word_bank: &WordBank) -> Result<Self> {
        snapshot.validate()?;
        let board = snapshot.cards(word_bank, false)?;
        GameEngine::new(
            board,
            snapshot.turn,
            GameConfig {
                team_count: snapshot.team_count()?,
                turn_pass_on_miss: snapshot.turn_pass_rule,
            },
        )
    }
}

/// 间谍首领视图：所有牌都是翻开的
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderView {
    pub cards: Vec<Card>,
    pub team_count: TeamCount,
    pub turn_pass_on_miss: bool,
}

impl LeaderView {
    /// 每个队伍在棋盘上的牌数
    pub fn team_totals(&self) -> Vec<(TeamColor, usize)> {
        self.team_count
            .active_teams()
            .iter()
            .map(|&team| (team, count_color(&self.cards, team)))
            .collect()
    }

    pub fn key_grid(&self) -> String {
        key_grid(&self.cards)
    }
}

/// 把当前游戏导出为分享令牌
pub fn export_token(engine: &GameEngine) -> Result<String> {
    Ok(PersistedSnapshot::from_engine(engine).to_token()?)
}

/// 解析外部令牌，得到全部翻开的首领视图；不读写本地存储
pub fn import_token(token: &str, word_bank: &WordBank) -> Result<LeaderView> {
    let snapshot = PersistedSnapshot::from_token(token)?;
    Ok(LeaderView {
        cards: snapshot.cards(word_bank, true)?,
        team_count: snapshot.team_count()?,
        turn_pass_on_miss: snapshot.turn_pass_rule,
    })
}

/// 快照存储：快照编码后写入键值存储
pub struct SnapshotStore<S> {
    store: S,
}

impl<S: KeyValueStore> SnapshotStore<S> {
    pub fn new(store: S) -> Self {
        SnapshotStore { store }
    }

    pub fn save(&mut self, engine: &GameEngine) -> Result<()> {
        let token = export_token(engine)?;
        self.store.set(SNAPSHOT_KEY, &token)?;
        debug!("游戏已自动保存");
        Ok(())
    }

    /// 读取快照；不存在返回 None，损坏时清除并返回 None
    pub fn load(&mut self) -> Option<PersistedSnapshot> {
        let token = match self.store.get(SNAPSHOT_KEY) {
            Ok(Some(token)) => token,
            Ok(None) => return None,
            Err(e) => {
                warn!("无法读取游戏快照: {}", e);
                return None;
            }
        };

        match PersistedSnapshot::from_token(&token) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!("游戏快照已损坏，已清除: {}", e);
                if let Err(e) = self.clear() {
                    warn!("清除损坏的快照失败: {}", e);
                }
                None
            }
        }
    }

    /// 存储中原样保存的令牌，分享时直接使用
    pub fn stored_token(&self) -> Option<String> {
        self.store.get(SNAPSHOT_KEY).ok().flatten()
    }

    pub fn clear(&mut self) -> Result<()> {
        self.store.remove(SNAPSHOT_KEY)?;
        debug!("游戏快照已清除");
        Ok(())
    }
}
