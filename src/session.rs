use crate::Result;
use crate::card::{TeamColor, TeamCount};
use crate::game::{GameConfig, GameEngine, RevealOutcome};
use crate::generator::BoardGenerator;
use crate::history::UsedWordTracker;
use crate::share::{share_link, token_from_input};
use crate::snapshot::{LeaderView, SnapshotStore, import_token};
use crate::storage::{
    KeyValueStore, TURN_PASS_RULE_KEY, load_turn_pass_preference, save_turn_pass_preference,
};
use crate::view::GameView;
use crate::word_bank::WordBank;
use rand::Rng;
use tracing::{debug, info, warn};
use url::Url;

/// 一次游戏会话，负责把引擎、存储和界面串起来
///
/// 没有引擎时处于未开始状态；每次改变状态后都会保存快照并刷新界面。
pub struct Session<S, V> {
    store: S,
    word_bank: WordBank,
    view: V,
    engine: Option<GameEngine>,
    share_base_url: String,
}

impl<S: KeyValueStore, V: GameView> Session<S, V> {
    pub fn new(store: S, word_bank: WordBank, view: V, share_base_url: impl Into<String>) -> Self {
        Session {
            store,
            word_bank,
            view,
            engine: None,
            share_base_url: share_base_url.into(),
        }
    }

    /// 尝试恢复存储中的游戏，成功返回 true
    pub fn resume(&mut self) -> bool {
        let Some(snapshot) = SnapshotStore::new(&mut self.store).load() else {
            return false;
        };

        let engine = match GameEngine::restore(&snapshot, &self.word_bank) {
            Ok(engine) => engine,
            Err(e) => {
                warn!("无法还原保存的游戏，已清除: {}", e);
                self.clear_snapshot();
                return false;
            }
        };

        if engine.is_finished() {
            debug!("保存的游戏已经结束，不再恢复");
            self.clear_snapshot();
            return false;
        }

        info!("已恢复保存的游戏");
        self.engine = Some(engine);
        self.refresh();
        true
    }

    /// 开始新游戏：生成棋盘、记录已用词、覆盖旧快照
    pub fn start_new_game<R: Rng + ?Sized>(
        &mut self,
        starting_team: TeamColor,
        team_count: TeamCount,
        turn_pass_on_miss: bool,
        rng: &mut R,
    ) -> Result<&GameEngine> {
        let board = {
            let mut tracker = UsedWordTracker::new(&mut self.store);
            BoardGenerator::new(&self.word_bank).generate(
                starting_team,
                team_count,
                &mut tracker,
                rng,
            )?
        };

        let engine = GameEngine::new(
            board,
            starting_team,
            GameConfig {
                team_count,
                turn_pass_on_miss,
            },
        )?;

        if let Err(e) = save_turn_pass_preference(&mut self.store, turn_pass_on_miss) {
            warn!("无法保存规则偏好: {}", e);
        }

        self.engine = Some(engine);
        self.persist();
        self.refresh();
        self.engine.as_ref().ok_or(crate::Error::NoActiveGame)
    }

    pub fn reveal(&mut self, index: usize) -> Result<Option<RevealOutcome>> {
        let engine = self.active_engine()?;
        let result = engine.reveal_card(index)?;
        if result.is_some() {
            self.persist();
        }
        self.refresh();
        Ok(result)
    }

    pub fn pass_turn(&mut self) -> Result<Option<TeamColor>> {
        let engine = self.active_engine()?;
        let next = engine.pass_turn();
        if next.is_some() {
            self.persist();
        }
        self.refresh();
        Ok(next)
    }

    /// 放弃当前游戏
    pub fn reset(&mut self) -> Result<()> {
        self.engine = None;
        SnapshotStore::new(&mut self.store).clear()?;
        info!("当前游戏已重置");
        Ok(())
    }

    /// 删除快照、已用词记录和规则偏好
    pub fn clear_all(&mut self) -> Result<()> {
        self.engine = None;
        SnapshotStore::new(&mut self.store).clear()?;
        UsedWordTracker::new(&mut self.store).clear()?;
        self.store.remove(TURN_PASS_RULE_KEY)?;
        info!("已清除全部游戏数据");
        Ok(())
    }

    /// 生成给间谍首领的分享链接，没有进行中的游戏时提示并返回错误
    pub fn share_link(&mut self) -> Result<Url> {
        let token = SnapshotStore::new(&mut self.store).stored_token();
        match token {
            Some(token) => share_link(&self.share_base_url, &token),
            None => {
                self.view.show_notice("游戏尚未开始或已经结束，没有可分享的密钥");
                Err(crate::Error::NoActiveGame)
            }
        }
    }

    /// 给当前的间谍首领显示密钥图
    pub fn show_key(&mut self) -> Result<()> {
        let grid = match &self.engine {
            Some(engine) => engine.key_grid(),
            None => {
                self.view.show_notice("当前没有进行中的游戏");
                return Err(crate::Error::NoActiveGame);
            }
        };
        self.view.show_key(&grid);
        Ok(())
    }

    /// 解析分享链接或令牌并显示首领视图，不影响本地游戏
    pub fn show_leader_view(&mut self, input: &str) -> Result<LeaderView> {
        let token = token_from_input(input);
        match import_token(&token, &self.word_bank) {
            Ok(view) => {
                self.view.show_leader_view(&view);
                Ok(view)
            }
            Err(e) => {
                self.view.show_notice("无法读取密钥，链接格式无效");
                Err(e)
            }
        }
    }

    pub fn turn_pass_preference(&self) -> Option<bool> {
        load_turn_pass_preference(&self.store)
    }

    pub fn engine(&self) -> Option<&GameEngine> {
        self.engine.as_ref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    fn active_engine(&mut self) -> Result<&mut GameEngine> {
        match self.engine.as_mut() {
            Some(engine) => Ok(engine),
            None => {
                self.view.show_notice("当前没有进行中的游戏");
                Err(crate::Error::NoActiveGame)
            }
        }
    }

    /// 进行中的游戏保存快照，已结束的游戏清除快照
    fn persist(&mut self) {
        let Some(engine) = &self.engine else {
            return;
        };
        let mut snapshots = SnapshotStore::new(&mut self.store);
        let result = if engine.is_finished() {
            snapshots.clear()
        } else {
            snapshots.save(engine)
        };
        if let Err(e) = result {
            warn!("保存游戏快照失败: {}", e);
        }
    }

    fn clear_snapshot(&mut self) {
        if let Err(e) = SnapshotStore::new(&mut self.store).clear() {
            warn!("清除游戏快照失败: {}", e);
        }
    }

    fn refresh(&mut self) {
        let Some(engine) = &self.engine else {
            return;
        };
        let end_message = engine.outcome().map(|outcome| outcome.to_string());
        self.view.update_scores(engine.scores());
        self.view.update_turn(
            engine.current_turn(),
            engine.is_finished(),
            end_message.as_deref(),
        );
        self.view.render_board(engine.board(), engine.is_finished());
    }
}
