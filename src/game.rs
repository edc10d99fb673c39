use crate::Result;
use crate::card::{BOARD_SIZE, Card, TeamColor, TeamCount, count_color, count_unrevealed, key_grid};
use std::fmt;
use tracing::info;

/// 开局时确定的规则，整局不变
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub team_count: TeamCount,
    /// 翻到非本队的牌时是否自动换手
    pub turn_pass_on_miss: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            team_count: TeamCount::Two,
            turn_pass_on_miss: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    InProgress,
    Finished,
}

/// 游戏结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 翻到刺客：当前回合的队伍输，其余队伍共同获胜
    Assassinated {
        loser: TeamColor,
        winners: Vec<TeamColor>,
    },
    /// 某队的特工全部被翻开，该队获胜
    Victory { winner: TeamColor },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Assassinated { loser, winners } => {
                let winners: Vec<String> = winners
                    .iter()
                    .map(|team| format!("{} {}", team, team.emoji()))
                    .collect();
                write!(
                    f,
                    "游戏结束！{} 翻到了刺客 ⚫，获胜: {}",
                    loser,
                    winners.join(" 和 ")
                )
            }
            Outcome::Victory { winner } => write!(f, "{} {} 胜利！🏆", winner, winner.emoji()),
        }
    }
}

/// 一次翻牌的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealOutcome {
    pub index: usize,
    pub color: TeamColor,
    /// 这次翻牌是否结束了游戏
    pub finished: bool,
    /// 这次翻牌是否导致换手
    pub turn_passed: bool,
    pub outcome: Option<Outcome>,
}

/// 各队剩余未翻开的特工数，两队模式下 green 为 None
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scores {
    pub blue: usize,
    pub red: usize,
    pub green: Option<usize>,
}

/// 游戏引擎，独占棋盘和回合状态
#[derive(Debug, Clone)]
pub struct GameEngine {
    board: Vec<Card>,
    current_turn: TeamColor,
    config: GameConfig,
    finished: bool,
    outcome: Option<Outcome>,
}

impl GameEngine {
    /// 用生成好的棋盘开始新游戏，也用于从快照还原（棋盘中可能已有翻开的牌）
    pub fn new(board: Vec<Card>, starting_team: TeamColor, config: GameConfig) -> Result<Self> {
        Self::check_board(&board, config.team_count)?;
        if !config.team_count.is_active(starting_team) {
            return Err(crate::Error::Game(format!(
                "{} 不是 {} 队模式中的队伍",
                starting_team, config.team_count
            )));
        }

        let mut engine = GameEngine {
            board,
            current_turn: starting_team,
            config,
            finished: false,
            outcome: None,
        };
        engine.recompute();
        Ok(engine)
    }

    fn check_board(board: &[Card], team_count: TeamCount) -> Result<()> {
        if board.len() != BOARD_SIZE {
            return Err(crate::Error::Game(format!(
                "棋盘必须有 {} 张牌，实际为 {}",
                BOARD_SIZE,
                board.len()
            )));
        }
        if count_color(board, TeamColor::Assassin) != 1 {
            return Err(crate::Error::Game("棋盘必须恰好有一张刺客牌".to_string()));
        }
        if team_count == TeamCount::Two && count_color(board, TeamColor::Green) > 0 {
            return Err(crate::Error::Game("两队模式不能有绿队的牌".to_string()));
        }
        Ok(())
    }

    /// 重新计算终局状态，不会把已结束的游戏改回进行中
    fn recompute(&mut self) {
        if self.finished {
            return;
        }

        if self
            .board
            .iter()
            .any(|card| card.color == TeamColor::Assassin && card.revealed)
        {
            self.finish(Outcome::Assassinated {
                loser: self.current_turn,
                winners: self.other_teams(self.current_turn),
            });
            return;
        }

        let emptied = self
            .config
            .team_count
            .active_teams()
            .iter()
            .copied()
            .find(|&team| self.remaining(team) == 0);
        if let Some(winner) = emptied {
            self.finish(Outcome::Victory { winner });
        }
    }

    fn finish(&mut self, outcome: Outcome) {
        info!("{}", outcome);
        self.finished = true;
        self.outcome = Some(outcome);
    }

    fn other_teams(&self, team: TeamColor) -> Vec<TeamColor> {
        self.config
            .team_count
            .active_teams()
            .iter()
            .copied()
            .filter(|&t| t != team)
            .collect()
    }

    /// 翻开一张牌
    ///
    /// 游戏已结束或该牌已翻开时什么也不做，返回 `Ok(None)`。
    pub fn reveal_card(&mut self, index: usize) -> Result<Option<RevealOutcome>> {
        if index >= self.board.len() {
            return Err(crate::Error::Game(format!("卡牌序号超出范围: {}", index)));
        }
        if self.finished || self.board[index].revealed {
            return Ok(None);
        }

        let card = &mut self.board[index];
        card.revealed = true;
        let color = card.color;

        let mut must_pass = false;
        if color == TeamColor::Assassin {
            self.finish(Outcome::Assassinated {
                loser: self.current_turn,
                winners: self.other_teams(self.current_turn),
            });
        } else if color != self.current_turn && self.config.turn_pass_on_miss {
            must_pass = true;
        }

        // 先翻牌再统计，让翻开最后一张牌的这一步直接结束游戏
        self.recompute();

        let turn_passed = must_pass && !self.finished;
        if turn_passed {
            self.current_turn = self.config.team_count.next_team(self.current_turn);
        }

        Ok(Some(RevealOutcome {
            index,
            color,
            finished: self.finished,
            turn_passed,
            outcome: self.outcome.clone(),
        }))
    }

    /// 主动换手，游戏结束后返回 None
    pub fn pass_turn(&mut self) -> Option<TeamColor> {
        if self.finished {
            return None;
        }
        self.current_turn = self.config.team_count.next_team(self.current_turn);
        info!("换手，现在轮到 {}", self.current_turn);
        Some(self.current_turn)
    }

    pub fn remaining(&self, team: TeamColor) -> usize {
        count_unrevealed(&self.board, team)
    }

    pub fn scores(&self) -> Scores {
        Scores {
            blue: self.remaining(TeamColor::Blue),
            red: self.remaining(TeamColor::Red),
            green: match self.config.team_count {
                TeamCount::Three => Some(self.remaining(TeamColor::Green)),
                TeamCount::Two => None,
            },
        }
    }

    pub fn board(&self) -> &[Card] {
        &self.board
    }

    pub fn current_turn(&self) -> TeamColor {
        self.current_turn
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn phase(&self) -> GamePhase {
        if self.finished {
            GamePhase::Finished
        } else {
            GamePhase::InProgress
        }
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// 间谍首领看的 5x5 密钥图
    pub fn key_grid(&self) -> String {
        key_grid(&self.board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 固定布局的两队棋盘：0..9 蓝, 9..17 红, 17..24 中立, 24 刺客
    fn two_team_board() -> Vec<Card> {
        (0..BOARD_SIZE as u32)
            .map(|i| {
                let color = match i {
                    0..=8 => TeamColor::Blue,
                    9..=16 => TeamColor::Red,
                    17..=23 => TeamColor::Neutral,
                    _ => TeamColor::Assassin,
                };
                Card::new(i, format!("word{}", i), color)
            })
            .collect()
    }

    /// 三队棋盘：0..8 蓝, 8..16 红, 16..24 绿, 24 刺客
    fn three_team_board() -> Vec<Card> {
        (0..BOARD_SIZE as u32)
            .map(|i| {
                let color = match i {
                    0..=7 => TeamColor::Blue,
                    8..=15 => TeamColor::Red,
                    16..=23 => TeamColor::Green,
                    _ => TeamColor::Assassin,
                };
                Card::new(i, format!("word{}", i), color)
            })
            .collect()
    }

    fn engine(pass_on_miss: bool) -> GameEngine {
        GameEngine::new(
            two_team_board(),
            TeamColor::Blue,
            GameConfig {
                team_count: TeamCount::Two,
                turn_pass_on_miss: pass_on_miss,
            },
        )
        .unwrap()
    }

    #[test]
    fn new_game_is_in_progress() {
        let engine = engine(true);
        assert_eq!(engine.phase(), GamePhase::InProgress);
        assert_eq!(
            engine.scores(),
            Scores {
                blue: 9,
                red: 8,
                green: None
            }
        );
    }

    #[test]
    fn rejects_malformed_boards() {
        let mut board = two_team_board();
        board.pop();
        assert!(GameEngine::new(board, TeamColor::Blue, GameConfig::default()).is_err());

        let mut board = two_team_board();
        board[0].color = TeamColor::Assassin;
        assert!(GameEngine::new(board, TeamColor::Blue, GameConfig::default()).is_err());

        assert!(GameEngine::new(two_team_board(), TeamColor::Green, GameConfig::default()).is_err());
    }

    #[test]
    fn hit_keeps_the_turn() {
        let mut engine = engine(true);
        let result = engine.reveal_card(0).unwrap().unwrap();
        assert_eq!(result.color, TeamColor::Blue);
        assert!(!result.turn_passed);
        assert_eq!(engine.current_turn(), TeamColor::Blue);
        assert_eq!(engine.remaining(TeamColor::Blue), 8);
    }

    #[test]
    fn miss_passes_turn_once_when_rule_enabled() {
        let mut engine = engine(true);
        let result = engine.reveal_card(20).unwrap().unwrap();
        assert!(result.turn_passed);
        assert_eq!(engine.current_turn(), TeamColor::Red);

        let result = engine.reveal_card(10).unwrap().unwrap();
        assert!(!result.turn_passed);
        assert_eq!(engine.current_turn(), TeamColor::Red);
    }

    #[test]
    fn miss_keeps_turn_when_rule_disabled() {
        let mut engine = engine(false);
        engine.reveal_card(20).unwrap();
        engine.reveal_card(10).unwrap();
        assert_eq!(engine.current_turn(), TeamColor::Blue);
    }

    #[test]
    fn repeated_reveal_is_a_no_op() {
        let mut engine = engine(true);
        engine.reveal_card(20).unwrap();
        assert_eq!(engine.reveal_card(20).unwrap(), None);
        assert_eq!(engine.current_turn(), TeamColor::Red);
    }

    #[test]
    fn out_of_range_reveal_is_an_error() {
        let mut engine = engine(true);
        assert!(engine.reveal_card(BOARD_SIZE).is_err());
    }

    #[test]
    fn assassin_loses_for_current_team() {
        let mut engine = engine(true);
        engine.pass_turn();
        let result = engine.reveal_card(24).unwrap().unwrap();
        assert!(result.finished);
        assert!(!result.turn_passed);
        assert_eq!(
            result.outcome,
            Some(Outcome::Assassinated {
                loser: TeamColor::Red,
                winners: vec![TeamColor::Blue],
            })
        );
        assert_eq!(engine.current_turn(), TeamColor::Red);
    }

    #[test]
    fn finished_game_ignores_actions() {
        let mut engine = engine(true);
        engine.reveal_card(24).unwrap();
        assert!(engine.is_finished());
        assert_eq!(engine.reveal_card(0).unwrap(), None);
        assert_eq!(engine.pass_turn(), None);
        assert_eq!(engine.current_turn(), TeamColor::Blue);
    }

    #[test]
    fn finding_all_agents_wins() {
        let mut engine = engine(true);
        for i in 0..8 {
            let result = engine.reveal_card(i).unwrap().unwrap();
            assert!(!result.finished);
        }
        let result = engine.reveal_card(8).unwrap().unwrap();
        assert!(result.finished);
        assert_eq!(result.outcome, Some(Outcome::Victory { winner: TeamColor::Blue }));
        assert_eq!(engine.phase(), GamePhase::Finished);
    }

    #[test]
    fn revealing_opponents_last_card_declares_them_winner() {
        let mut engine = engine(false);
        for i in 9..=16 {
            engine.reveal_card(i).unwrap();
        }
        assert_eq!(
            engine.outcome(),
            Some(&Outcome::Victory { winner: TeamColor::Red })
        );
        assert_eq!(engine.current_turn(), TeamColor::Blue);
    }

    #[test]
    fn last_card_on_miss_does_not_pass_turn() {
        let mut engine = engine(true);
        engine.pass_turn();
        for i in 0..8 {
            engine.reveal_card(i).unwrap();
            if engine.current_turn() == TeamColor::Blue {
                engine.pass_turn();
            }
        }
        assert_eq!(engine.current_turn(), TeamColor::Red);
        let result = engine.reveal_card(8).unwrap().unwrap();
        assert!(result.finished);
        assert!(!result.turn_passed);
        assert_eq!(engine.current_turn(), TeamColor::Red);
    }

    #[test]
    fn three_team_turn_cycle_and_joint_winners() {
        let mut engine = GameEngine::new(
            three_team_board(),
            TeamColor::Blue,
            GameConfig {
                team_count: TeamCount::Three,
                turn_pass_on_miss: true,
            },
        )
        .unwrap();
        assert_eq!(engine.scores().green, Some(8));

        assert_eq!(engine.pass_turn(), Some(TeamColor::Red));
        assert_eq!(engine.pass_turn(), Some(TeamColor::Green));

        let result = engine.reveal_card(24).unwrap().unwrap();
        let outcome = result.outcome.unwrap();
        assert_eq!(
            outcome,
            Outcome::Assassinated {
                loser: TeamColor::Green,
                winners: vec![TeamColor::Blue, TeamColor::Red],
            }
        );
        assert!(outcome.to_string().contains("蓝队"));
        assert!(outcome.to_string().contains("红队"));
    }

    #[test]
    fn three_team_miss_advances_to_next_in_cycle() {
        let mut engine = GameEngine::new(
            three_team_board(),
            TeamColor::Green,
            GameConfig {
                team_count: TeamCount::Three,
                turn_pass_on_miss: true,
            },
        )
        .unwrap();
        engine.reveal_card(0).unwrap();
        assert_eq!(engine.current_turn(), TeamColor::Blue);
    }

    #[test]
    fn key_grid_matches_board_colors() {
        let engine = engine(true);
        let grid = engine.key_grid();
        assert!(grid.starts_with("🔵🔵🔵🔵🔵\n"));
        assert!(grid.ends_with("🟡🟡🟡🟡⚫\n"));
    }
}
