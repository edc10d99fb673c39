use crate::card::{TeamColor, TeamCount};
use anyhow::Result;
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::path::PathBuf;

static CONFIG: OnceCell<Config> = OnceCell::new();

#[derive(Debug, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub word_bank: WordBankConfig,
    pub game: GameDefaults,
    pub share: ShareConfig,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub data_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WordBankConfig {
    pub file_path: String,
}

/// 新游戏的默认参数，命令行参数可以覆盖
#[derive(Debug, Deserialize, Clone)]
pub struct GameDefaults {
    pub team_count: u8,
    pub turn_pass_on_miss: bool,
    pub starting_team: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ShareConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize)]
pub struct LogConfig {
    pub level: String,
}

impl Config {
    /// 依次读取内置默认值、可选的 config 文件、SPYWORDS__ 前缀的环境变量
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .set_default("storage.data_dir", ".spywords")?
            .set_default("word_bank.file_path", "words.json")?
            .set_default("game.team_count", 2i64)?
            .set_default("game.turn_pass_on_miss", true)?
            .set_default("game.starting_team", "blue")?
            .set_default("share.base_url", "https://spywords.local/")?
            .set_default("log.level", "info")?
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("SPYWORDS").separator("__"))
            .build()?;

        Ok(config.try_deserialize::<Config>()?)
    }

    /// 初始化全局配置
    pub fn init() -> Result<()> {
        let config = Self::load()?;
        CONFIG
            .set(config)
            .map_err(|_| anyhow::anyhow!("配置已经初始化"))?;
        Ok(())
    }

    /// 获取全局配置实例
    pub fn get() -> &'static Config {
        CONFIG.get().expect("配置未初始化，请先调用 Config::init()")
    }

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.storage.data_dir)
    }

    pub fn default_team_count(&self) -> crate::Result<TeamCount> {
        TeamCount::try_from(self.game.team_count)
            .map_err(|_| crate::Error::Config(format!("不支持的队伍数量: {}", self.game.team_count)))
    }

    pub fn default_starting_team(&self) -> crate::Result<TeamColor> {
        self.game
            .starting_team
            .parse()
            .map_err(|_| crate::Error::Config(format!("无效的先手队伍: {}", self.game.starting_team)))
    }

    /// 同时作用于库和 spywords 可执行文件的日志目标
    pub fn log_filter(&self) -> String {
        format!("spy_words={0},spywords={0}", self.log.level)
    }
}
