//! # Player 模块
//!
//! 播放器门面：宿主只和 [`StoryPlayer`] 打交道。
//!
//! ## 设计说明
//!
//! - 推进规则与点击语义一致：有组在演出时点击是"快进"，
//!   没有时点击是"取下一组"。两种含义由播放器内部区分，
//!   宿主只管把输入转发给 [`StoryPlayer::process_next`]
//! - Choice/End 通过回调反向驱动播放器（跳转游标、收束播放），
//!   回调经 `Weak` 回连，播放器与 Handler 之间没有循环强引用
//! - 所有协作对象在构造期注入，播放器不持有任何全局状态

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tracing::{debug, error, info};

use crate::config::StoryConfig;
use crate::cursor::ProgressCursor;
use crate::dataset::StorySceneMeta;
use crate::error::{PlaybackError, StoryResult};
use crate::handler::{standard_registry, HandlerRegistry, OrderContext, SceneGate, StoryHooks};
use crate::runtime::autoplay::AutoPlayController;
use crate::runtime::executor::OrderExecutor;
use crate::surface::PresentationSurface;
use crate::table::OrderTable;

/// 播放器所处阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerPhase {
    /// 尚未装载场景
    Idle,
    /// 正常播放中
    Playing,
    /// 等待玩家选择分支（推进输入被忽略）
    AwaitingChoice,
    /// 已播放到 End，后续推进输入被忽略
    Finished,
}

/// 故事播放器
///
/// 用 [`StoryPlayer::new`] 构造（返回 `Arc`，回调机制需要）。
pub struct StoryPlayer {
    surface: Arc<dyn PresentationSurface>,
    executor: OrderExecutor,
    autoplay: AutoPlayController,
    table: Mutex<Option<OrderTable>>,
    cursor: Mutex<ProgressCursor>,
    phase: Mutex<PlayerPhase>,
    /// 装载新场景时作废上一场景的在途等待
    scene_gate: SceneGate,
    /// 分支跳转后由组收尾续播一次
    resume_after_group: AtomicBool,
    /// 播放收束时通知调用方（至多一次）
    on_complete: Mutex<Option<Box<dyn FnOnce() + Send>>>,
    weak_self: Weak<StoryPlayer>,
}

impl StoryPlayer {
    /// 用标准注册表构造播放器
    pub fn new(surface: Arc<dyn PresentationSurface>, config: StoryConfig) -> Arc<Self> {
        Self::with_registry(surface, config, |_| standard_registry())
    }

    /// 用自定义注册表构造播放器
    ///
    /// `build` 收到回连播放器的回调集合，可以把它们交给自己的
    /// Handler（或忽略，装配一张完全自定义的表）。
    pub fn with_registry(
        surface: Arc<dyn PresentationSurface>,
        config: StoryConfig,
        build: impl FnOnce(&StoryHooks) -> HandlerRegistry,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<StoryPlayer>| {
            let hooks = Self::hooks_for(weak.clone());
            let registry = Arc::new(build(&hooks));
            let scene_gate = SceneGate::new();
            let ctx = OrderContext {
                surface: surface.clone(),
                config: config.clone(),
                hooks,
                gate: scene_gate.clone(),
            };

            Self {
                surface,
                executor: OrderExecutor::new(registry, ctx),
                autoplay: AutoPlayController::new(config.auto_play_interval),
                table: Mutex::new(None),
                cursor: Mutex::new(ProgressCursor::new()),
                phase: Mutex::new(PlayerPhase::Idle),
                scene_gate,
                resume_after_group: AtomicBool::new(false),
                on_complete: Mutex::new(None),
                weak_self: weak.clone(),
            }
        })
    }

    fn hooks_for(weak: Weak<StoryPlayer>) -> StoryHooks {
        let pause_weak = weak.clone();
        let branch_weak = weak.clone();
        let finish_weak = weak;

        StoryHooks {
            pause_for_choice: Arc::new(move || {
                if let Some(player) = pause_weak.upgrade() {
                    player.enter_choice();
                }
            }),
            branch: Arc::new(move |target| {
                if let Some(player) = branch_weak.upgrade() {
                    player.take_branch(target);
                }
            }),
            finish: Arc::new(move || {
                if let Some(player) = finish_weak.upgrade() {
                    player.enter_finished();
                }
            }),
        }
    }

    /// 当前阶段
    pub fn phase(&self) -> PlayerPhase {
        *self.phase.lock().unwrap()
    }

    /// 当前游标位置
    pub fn position(&self) -> usize {
        self.cursor.lock().unwrap().position()
    }

    /// 自动播放是否开启
    pub fn is_auto_play(&self) -> bool {
        self.autoplay.is_enabled()
    }

    /// 装载场景并重置进度
    ///
    /// 只装载不演出：首组由首次 [`process_next`](Self::process_next)
    /// （或自动播放到点）取出。
    pub fn play_scene(&self, table: OrderTable) -> StoryResult<()> {
        self.start_scene(table, None)
    }

    /// 装载场景，并在播放收束时通知调用方（至多调用一次）
    pub fn play_scene_with(
        &self,
        table: OrderTable,
        on_complete: impl FnOnce() + Send + 'static,
    ) -> StoryResult<()> {
        self.start_scene(table, Some(Box::new(on_complete)))
    }

    fn start_scene(
        &self,
        table: OrderTable,
        on_complete: Option<Box<dyn FnOnce() + Send>>,
    ) -> StoryResult<()> {
        info!(target: "story::player", len = table.len(), "装载场景");

        self.scene_gate.reset();
        self.executor.skip();
        self.autoplay.cancel_pending();
        *self.table.lock().unwrap() = Some(table);
        *self.on_complete.lock().unwrap() = on_complete;
        self.cursor.lock().unwrap().reset();
        *self.phase.lock().unwrap() = PlayerPhase::Playing;
        self.resume_after_group.store(false, Ordering::SeqCst);

        // 自动播放已开启时替代首次点击，预约取首组
        if self.autoplay.is_enabled() {
            self.schedule_auto_advance();
        }

        Ok(())
    }

    /// 先按场景元数据准备舞台，再装载场景
    pub async fn play_prepared(
        &self,
        meta: &StorySceneMeta,
        table: OrderTable,
    ) -> StoryResult<()> {
        self.surface.prepare_scene(meta).await?;
        self.play_scene(table)
    }

    /// 推进一步
    ///
    /// 有组在演出时等价于快进该组；否则取出游标处的连续组开始演出。
    /// 尚未装载场景、等待选择或已结束时忽略输入。每次调用都会取消
    /// 在途的自动预约，手动输入优先于自动播放。
    pub fn process_next(&self) -> StoryResult<()> {
        self.autoplay.cancel_pending();

        match self.phase() {
            PlayerPhase::Idle => {
                debug!(target: "story::player", "尚未装载场景，忽略推进输入");
                return Ok(());
            }
            PlayerPhase::AwaitingChoice => {
                debug!(target: "story::player", "等待选择中，忽略推进输入");
                return Ok(());
            }
            PlayerPhase::Finished => {
                debug!(target: "story::player", "播放已结束，忽略推进输入");
                return Ok(());
            }
            PlayerPhase::Playing => {}
        }

        if self.executor.is_executing() {
            debug!(target: "story::player", "组演出中，快进");
            self.executor.skip();
            return Ok(());
        }

        self.dispatch_from_cursor()
    }

    /// 跳到末尾订单并执行
    ///
    /// 快进当前组、把游标移到表中最后一条订单，随即执行它
    /// （正常脚本中即 End 订单）。
    pub fn skip_to_end(&self) -> StoryResult<()> {
        self.autoplay.cancel_pending();

        if self.phase() != PlayerPhase::Playing {
            debug!(target: "story::player", "非播放阶段，忽略跳转到末尾");
            return Ok(());
        }

        let len = {
            let guard = self.table.lock().unwrap();
            guard.as_ref().map(|t| t.len()).unwrap_or(0)
        };
        if len == 0 {
            return Err(PlaybackError::InvalidState {
                message: "场景订单表为空".to_string(),
            }
            .into());
        }

        info!(target: "story::player", last = len - 1, "跳转到末尾订单");
        self.executor.skip();
        self.cursor.lock().unwrap().jump_to(len - 1);
        self.dispatch_from_cursor()
    }

    /// 开关自动播放
    ///
    /// 开启后：当前没有组在演出时立刻预约一次推进；关闭立即取消
    /// 在途预约。
    pub fn set_auto_play(&self, enabled: bool) {
        info!(target: "story::player", enabled, "切换自动播放");
        self.autoplay.set_enabled(enabled);

        if enabled && self.phase() == PlayerPhase::Playing && !self.executor.is_executing() {
            self.schedule_auto_advance();
        }
    }

    /// 取出游标处的连续组并开始演出
    fn dispatch_from_cursor(&self) -> StoryResult<()> {
        let position = self.cursor.lock().unwrap().position();
        let group = {
            let guard = self.table.lock().unwrap();
            let Some(table) = guard.as_ref() else {
                return Err(PlaybackError::InvalidState {
                    message: "尚未装载场景".to_string(),
                }
                .into());
            };
            table.continuous_group_from(position)
        };

        if group.is_empty() {
            error!(
                target: "story::player",
                position,
                "游标处没有可执行的订单（脚本缺少 End 订单？）"
            );
            return Err(PlaybackError::ScriptExhausted { position }.into());
        }

        self.cursor.lock().unwrap().advance_by(group.len());

        let join = self.executor.run_group(group);
        if let Some(player) = self.weak_self.upgrade() {
            tokio::spawn(async move {
                let _ = join.await;
                player.after_group_settled();
            });
        }

        Ok(())
    }

    /// 组收尾：分支续播或预约自动推进
    fn after_group_settled(&self) {
        if self.resume_after_group.swap(false, Ordering::SeqCst) {
            if let Err(e) = self.process_next() {
                error!(target: "story::player", error = %e, "分支跳转后续播失败");
            }
            return;
        }

        if self.phase() == PlayerPhase::Playing && self.autoplay.is_enabled() {
            self.schedule_auto_advance();
        }
    }

    fn schedule_auto_advance(&self) {
        let weak = self.weak_self.clone();
        self.autoplay.schedule(move || {
            if let Some(player) = weak.upgrade() {
                if let Err(e) = player.process_next() {
                    error!(target: "story::player", error = %e, "自动推进失败");
                }
            }
        });
    }

    /// Choice 展示前的暂停（经回调进入）
    fn enter_choice(&self) {
        debug!(target: "story::player", "进入选择分支，暂停推进");
        self.autoplay.cancel_pending();
        *self.phase.lock().unwrap() = PlayerPhase::AwaitingChoice;
    }

    /// 玩家选定选项后的跳转（经回调进入）
    fn take_branch(&self, target: usize) {
        info!(target: "story::player", target_index = target, "分支跳转");
        self.cursor.lock().unwrap().jump_to(target);
        *self.phase.lock().unwrap() = PlayerPhase::Playing;
        // 当前组（含 Choice 订单自身）收尾后从目标处续播
        self.resume_after_group.store(true, Ordering::SeqCst);
    }

    /// End 订单收尾后的收束（经回调进入）
    fn enter_finished(&self) {
        info!(target: "story::player", "播放结束");
        self.autoplay.set_enabled(false);
        *self.phase.lock().unwrap() = PlayerPhase::Finished;

        // take 保证至多通知一次
        if let Some(on_complete) = self.on_complete.lock().unwrap().take() {
            on_complete();
        }
    }
}

impl std::fmt::Debug for StoryPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoryPlayer")
            .field("phase", &self.phase())
            .field("position", &self.position())
            .field("auto_play", &self.is_auto_play())
            .finish_non_exhaustive()
    }
}
