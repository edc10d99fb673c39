use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 棋盘固定为 5x5 共 25 张卡牌
pub const BOARD_SIZE: usize = 25;

/// 卡牌类型 / 队伍颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamColor {
    Red,
    Blue,
    Green,
    Neutral,
    Assassin,
}

impl TeamColor {
    pub fn emoji(self) -> &'static str {
        match self {
            TeamColor::Red => "🔴",
            TeamColor::Blue => "🔵",
            TeamColor::Green => "🟢",
            TeamColor::Neutral => "🟡",
            TeamColor::Assassin => "⚫",
        }
    }

    /// 快照中使用的单字母编码
    pub fn code(self) -> char {
        match self {
            TeamColor::Red => 'R',
            TeamColor::Blue => 'B',
            TeamColor::Green => 'V',
            TeamColor::Neutral => 'N',
            TeamColor::Assassin => 'A',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'R' => Some(TeamColor::Red),
            'B' => Some(TeamColor::Blue),
            'V' => Some(TeamColor::Green),
            'N' => Some(TeamColor::Neutral),
            'A' => Some(TeamColor::Assassin),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TeamColor::Red => "red",
            TeamColor::Blue => "blue",
            TeamColor::Green => "green",
            TeamColor::Neutral => "neutral",
            TeamColor::Assassin => "assassin",
        }
    }
}

impl fmt::Display for TeamColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeamColor::Red => write!(f, "红队"),
            TeamColor::Blue => write!(f, "蓝队"),
            TeamColor::Green => write!(f, "绿队"),
            TeamColor::Neutral => write!(f, "中立"),
            TeamColor::Assassin => write!(f, "刺客"),
        }
    }
}

impl FromStr for TeamColor {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "red" => Ok(TeamColor::Red),
            "blue" => Ok(TeamColor::Blue),
            "green" => Ok(TeamColor::Green),
            "neutral" => Ok(TeamColor::Neutral),
            "assassin" => Ok(TeamColor::Assassin),
            _ => Err(crate::Error::Game(format!("未知的颜色: {}", s))),
        }
    }
}

/// 参赛队伍数量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TeamCount {
    Two,
    Three,
}

impl TeamCount {
    /// 按回合轮转顺序排列的参赛队伍
    pub fn active_teams(self) -> &'static [TeamColor] {
        match self {
            TeamCount::Two => &[TeamColor::Blue, TeamColor::Red],
            TeamCount::Three => &[TeamColor::Blue, TeamColor::Red, TeamColor::Green],
        }
    }

    pub fn is_active(self, color: TeamColor) -> bool {
        self.active_teams().contains(&color)
    }

    /// 回合轮转：两队 蓝↔红，三队 蓝→红→绿→蓝
    pub fn next_team(self, current: TeamColor) -> TeamColor {
        let teams = self.active_teams();
        match teams.iter().position(|t| *t == current) {
            Some(index) => teams[(index + 1) % teams.len()],
            None => teams[0],
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            TeamCount::Two => 2,
            TeamCount::Three => 3,
        }
    }
}

impl TryFrom<u8> for TeamCount {
    type Error = crate::Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(TeamCount::Two),
            3 => Ok(TeamCount::Three),
            n => Err(crate::Error::Game(format!("不支持的队伍数量: {}", n))),
        }
    }
}

impl fmt::Display for TeamCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// 棋盘上的一张卡牌
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: u32,
    pub word: String,
    pub color: TeamColor,
    pub revealed: bool,
}

impl Card {
    pub fn new(id: u32, word: impl Into<String>, color: TeamColor) -> Self {
        Card {
            id,
            word: word.into(),
            color,
            revealed: false,
        }
    }
}

/// 统计某个颜色尚未翻开的卡牌数量
pub fn count_unrevealed(board: &[Card], color: TeamColor) -> usize {
    board
        .iter()
        .filter(|card| card.color == color && !card.revealed)
        .count()
}

/// 统计某个颜色的卡牌总数
pub fn count_color(board: &[Card], color: TeamColor) -> usize {
    board.iter().filter(|card| card.color == color).count()
}

/// 把棋盘渲染成 5x5 的 emoji 密钥图，供间谍首领查看
pub fn key_grid(board: &[Card]) -> String {
    let mut grid = String::new();
    for (i, card) in board.iter().enumerate() {
        grid.push_str(card.color.emoji());
        if (i + 1) % 5 == 0 {
            grid.push('\n');
        }
    }
    grid
}
