//! # Executor 模块
//!
//! 把一个连续组作为整体执行：组内订单依次分发、并发演出，
//! 全部演完才算一组结束；快进一次作用于整组。
//!
//! ## 设计说明
//!
//! - 组任务在独立的 tokio 任务里运行，`run_group` 立即返回，
//!   宿主输入循环不被演出阻塞
//! - `skip` 同步翻转执行标记并取消组令牌：调用方立刻观察到
//!   "不在执行中"，可以马上开启下一组；旧任务靠代数比对
//!   避免晚到的收尾覆盖新组的状态
//! - 单条订单执行失败只记日志，不影响同组其余订单
//! - 查不到 Handler 的订单记 warn 后跳过

use futures::future::join_all;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::handler::{HandlerRegistry, OrderContext};
use crate::order::OrderData;

/// 连续组执行器
pub struct OrderExecutor {
    registry: Arc<HandlerRegistry>,
    ctx: OrderContext,
    shared: Arc<Shared>,
}

struct Shared {
    executing: AtomicBool,
    generation: AtomicU64,
    token: Mutex<CancellationToken>,
}

impl OrderExecutor {
    /// 创建执行器
    pub fn new(registry: Arc<HandlerRegistry>, ctx: OrderContext) -> Self {
        Self {
            registry,
            ctx,
            shared: Arc::new(Shared {
                executing: AtomicBool::new(false),
                generation: AtomicU64::new(0),
                token: Mutex::new(CancellationToken::new()),
            }),
        }
    }

    /// 当前是否有组在执行
    pub fn is_executing(&self) -> bool {
        self.shared.executing.load(Ordering::SeqCst)
    }

    /// 快进当前组
    ///
    /// 同步生效：返回后 [`is_executing`](Self::is_executing) 即为 `false`。
    /// 组内所有演出被推到终态，挂在演出后面的收尾逻辑照常执行。
    /// 没有组在执行时为空操作，重复调用安全。
    pub fn skip(&self) {
        if self.shared.executing.swap(false, Ordering::SeqCst) {
            self.token().cancel();
        }
    }

    /// 执行一个连续组
    ///
    /// 立即返回组任务的句柄。组内订单按表格顺序分发（Choice 这类
    /// 阻塞型订单会在分发处等待），全部句柄演完后组才结束。
    pub fn run_group(&self, group: Vec<OrderData>) -> JoinHandle<()> {
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.executing.store(true, Ordering::SeqCst);

        let token = CancellationToken::new();
        *self.shared.token.lock().unwrap() = token.clone();

        debug!(
            target: "story::executor",
            generation,
            len = group.len(),
            "开始执行连续组"
        );

        let registry = self.registry.clone();
        let ctx = self.ctx.clone();
        let shared = self.shared.clone();

        tokio::spawn(async move {
            let mut waiters = Vec::with_capacity(group.len());
            let mut skips = Vec::with_capacity(group.len());

            for order in &group {
                let Some(handler) = registry.lookup(order.order_type) else {
                    warn!(
                        target: "story::executor",
                        order_type = ?order.order_type,
                        order_index = order.order_index,
                        "没有对应的 Handler，跳过该订单"
                    );
                    continue;
                };

                match handler.execute(order, &ctx).await {
                    Ok(handle) => {
                        let (waiter, skip) = handle.into_parts();
                        waiters.push(waiter);
                        skips.push(skip);
                    }
                    Err(e) => {
                        error!(
                            target: "story::executor",
                            order_type = ?order.order_type,
                            order_index = order.order_index,
                            error = %e,
                            "订单执行失败，继续同组其余订单"
                        );
                    }
                }
            }

            let mut all = join_all(waiters);
            tokio::select! {
                _ = &mut all => {}
                _ = token.cancelled() => {
                    // 快进：先把所有演出推到终态，再等收尾逻辑跑完
                    for skip in skips.drain(..) {
                        skip();
                    }
                    all.await;
                }
            }

            // 晚到的收尾不许动新组的状态
            if shared.generation.load(Ordering::SeqCst) == generation {
                shared.executing.store(false, Ordering::SeqCst);
            }

            debug!(target: "story::executor", generation, "连续组执行完毕");
        })
    }

    fn token(&self) -> CancellationToken {
        self.shared.token.lock().unwrap().clone()
    }
}

impl Drop for OrderExecutor {
    /// 析构时取消在途的组，不留无人等待的演出
    fn drop(&mut self) {
        self.skip();
    }
}

impl std::fmt::Debug for OrderExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderExecutor")
            .field("executing", &self.is_executing())
            .finish_non_exhaustive()
    }
}
