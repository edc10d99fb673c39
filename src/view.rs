use crate::card::{Card, TeamColor};
use crate::game::Scores;
use crate::snapshot::LeaderView;
use std::io::Write;

/// 界面协作者：游戏状态每次变化后由会话调用
pub trait GameView {
    fn render_board(&mut self, board: &[Card], finished: bool);
    fn update_scores(&mut self, scores: Scores);
    fn update_turn(&mut self, turn: TeamColor, finished: bool, end_message: Option<&str>);
    /// 给间谍首领看的密钥图
    fn show_key(&mut self, key_grid: &str);
    fn show_leader_view(&mut self, view: &LeaderView);
    fn show_notice(&mut self, message: &str);
}

/// 终端界面
pub struct ConsoleView<W> {
    out: W,
}

impl<W: Write> ConsoleView<W> {
    pub fn new(out: W) -> Self {
        ConsoleView { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_board(&mut self, board: &[Card], show_colors: bool) {
        for (row_index, row) in board.chunks(5).enumerate() {
            let cells: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(col, card)| {
                    let index = row_index * 5 + col;
                    let marker = if card.revealed || show_colors {
                        card.color.emoji()
                    } else {
                        "⬜"
                    };
                    format!("{:>2} {} {:<12}", index, marker, card.word.to_uppercase())
                })
                .collect();
            let _ = writeln!(self.out, "{}", cells.join(" "));
        }
    }
}

impl<W: Write> GameView for ConsoleView<W> {
    fn render_board(&mut self, board: &[Card], _finished: bool) {
        self.write_board(board, false);
    }

    fn update_scores(&mut self, scores: Scores) {
        let mut line = format!("蓝队 🔵 {}  红队 🔴 {}", scores.blue, scores.red);
        if let Some(green) = scores.green {
            line.push_str(&format!("  绿队 🟢 {}", green));
        }
        let _ = writeln!(self.out, "{}", line);
    }

    fn update_turn(&mut self, turn: TeamColor, finished: bool, end_message: Option<&str>) {
        let _ = if finished {
            writeln!(self.out, "{}", end_message.unwrap_or("游戏结束"))
        } else {
            writeln!(self.out, "回合: {} {}", turn, turn.emoji())
        };
    }

    fn show_key(&mut self, key_grid: &str) {
        let _ = writeln!(self.out, "--- 密钥（仅限间谍首领）---");
        let _ = write!(self.out, "{}", key_grid);
        let _ = writeln!(self.out, "---------------------------");
    }

    fn show_leader_view(&mut self, view: &LeaderView) {
        let _ = writeln!(self.out, "🚨 间谍首领模式 🚨");
        let totals: Vec<String> = view
            .team_totals()
            .iter()
            .map(|(team, count)| format!("{} {} {}", team, team.emoji(), count))
            .collect();
        let _ = writeln!(self.out, "{}", totals.join("  "));
        self.write_board(&view.cards, true);
        self.show_key(&view.key_grid());
    }

    fn show_notice(&mut self, message: &str) {
        let _ = writeln!(self.out, "{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Vec<Card> {
        (0..25)
            .map(|i| {
                let mut card = Card::new(i, format!("w{}", i), TeamColor::Red);
                card.revealed = i == 0;
                card
            })
            .collect()
    }

    #[test]
    fn hidden_cards_do_not_leak_colors() {
        let mut view = ConsoleView::new(Vec::new());
        view.render_board(&board(), false);
        let out = String::from_utf8(view.into_inner()).unwrap();
        assert_eq!(out.lines().count(), 5);
        assert_eq!(out.matches("🔴").count(), 1);
        assert!(out.contains("W24"));
    }

    #[test]
    fn scores_include_green_only_for_three_teams() {
        let mut view = ConsoleView::new(Vec::new());
        view.update_scores(Scores { blue: 9, red: 8, green: None });
        view.update_scores(Scores { blue: 8, red: 8, green: Some(8) });
        let out = String::from_utf8(view.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert!(!lines[0].contains("绿队"));
        assert!(lines[1].contains("绿队 🟢 8"));
    }

    #[test]
    fn finished_turn_shows_end_message() {
        let mut view = ConsoleView::new(Vec::new());
        view.update_turn(TeamColor::Blue, true, Some("蓝队 🔵 胜利！🏆"));
        let out = String::from_utf8(view.into_inner()).unwrap();
        assert_eq!(out.trim(), "蓝队 🔵 胜利！🏆");
    }
}
