pub mod card;
pub mod codec;
pub mod config;
pub mod game;
pub mod generator;
pub mod history;
pub mod session;
pub mod share;
pub mod snapshot;
pub mod storage;
pub mod view;
pub mod word_bank;

pub use card::{Card, TeamColor, TeamCount};
pub use config::Config;
pub use game::{GameConfig, GameEngine, Outcome, RevealOutcome};
pub use generator::BoardGenerator;
pub use history::UsedWordTracker;
pub use session::Session;
pub use snapshot::{LeaderView, PersistedSnapshot, SnapshotError, SnapshotStore};
pub use storage::*;
pub use view::{ConsoleView, GameView};
pub use word_bank::WordBank;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("游戏错误: {0}")]
    Game(String),
    #[error("存储错误: {0}")]
    Storage(String),
    #[error("配置错误: {0}")]
    Config(String),
    #[error("词库错误: {0}")]
    WordBank(String),
    #[error("快照错误: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("当前没有进行中的游戏")]
    NoActiveGame,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
