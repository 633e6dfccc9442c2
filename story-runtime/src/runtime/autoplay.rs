//! # AutoPlay 模块
//!
//! 自动播放的预约机制。
//!
//! ## 设计说明
//!
//! - 一次"预约"等价于：等待配置的间隔后触发一次推进。
//!   同一时刻至多一个预约（预约标记做互斥），手动推进随时可取消
//! - 关闭自动播放立即取消在途预约；预约到点时再查一次开关，
//!   关闭与到点竞争时不会误触发

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// 自动播放控制器
pub struct AutoPlayController {
    enabled: Arc<AtomicBool>,
    reserved: Arc<AtomicBool>,
    pending: Mutex<CancellationToken>,
    interval: Duration,
}

impl AutoPlayController {
    /// 创建控制器，`interval` 为两次推进之间的等待时长
    pub fn new(interval: Duration) -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(false)),
            reserved: Arc::new(AtomicBool::new(false)),
            pending: Mutex::new(CancellationToken::new()),
            interval,
        }
    }

    /// 自动播放是否开启
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// 开关自动播放（关闭时取消在途预约）
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
        if !enabled {
            self.cancel_pending();
        }
    }

    /// 是否有在途预约（测试观察用）
    pub fn is_reserved(&self) -> bool {
        self.reserved.load(Ordering::SeqCst)
    }

    /// 预约一次推进
    ///
    /// 等待间隔后调用 `advance`。未开启、或已有在途预约时为空操作。
    pub fn schedule(&self, advance: impl FnOnce() + Send + 'static) {
        if !self.is_enabled() {
            return;
        }
        if self.reserved.swap(true, Ordering::SeqCst) {
            return;
        }

        let token = CancellationToken::new();
        *self.pending.lock().unwrap() = token.clone();

        debug!(target: "story::autoplay", interval = ?self.interval, "预约自动推进");

        let enabled = self.enabled.clone();
        let reserved = self.reserved.clone();
        let interval = self.interval;
        tokio::spawn(async move {
            let fired = tokio::select! {
                _ = tokio::time::sleep(interval) => true,
                _ = token.cancelled() => false,
            };

            reserved.store(false, Ordering::SeqCst);

            if fired && enabled.load(Ordering::SeqCst) {
                advance();
            }
        });
    }

    /// 取消在途预约（无预约时为空操作）
    pub fn cancel_pending(&self) {
        self.pending.lock().unwrap().cancel();
    }
}

impl std::fmt::Debug for AutoPlayController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoPlayController")
            .field("enabled", &self.is_enabled())
            .field("reserved", &self.is_reserved())
            .field("interval", &self.interval)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter_advance(counter: &Arc<AtomicUsize>) -> impl FnOnce() + Send + 'static {
        let counter = counter.clone();
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_fires_after_interval() {
        let autoplay = AutoPlayController::new(Duration::from_secs(3));
        autoplay.set_enabled(true);

        let fired = Arc::new(AtomicUsize::new(0));
        autoplay.schedule(counter_advance(&fired));
        // 先让预约任务登记计时器，再拨动时钟
        tokio::task::yield_now().await;

        tokio::time::advance(Duration::from_secs(2)).await;
        tokio::task::yield_now().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::advance(Duration::from_secs(1)).await;
        tokio::task::yield_now().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!autoplay.is_reserved());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_pending_suppresses_fire() {
        let autoplay = AutoPlayController::new(Duration::from_secs(3));
        autoplay.set_enabled(true);

        let fired = Arc::new(AtomicUsize::new(0));
        autoplay.schedule(counter_advance(&fired));
        autoplay.cancel_pending();

        tokio::time::advance(Duration::from_secs(10)).await;
        tokio::task::yield_now().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(!autoplay.is_reserved());
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_one_reservation_at_a_time() {
        let autoplay = AutoPlayController::new(Duration::from_secs(3));
        autoplay.set_enabled(true);

        let fired = Arc::new(AtomicUsize::new(0));
        autoplay.schedule(counter_advance(&fired));
        autoplay.schedule(counter_advance(&fired));
        autoplay.schedule(counter_advance(&fired));
        // 先让预约任务登记计时器，再拨动时钟
        tokio::task::yield_now().await;

        tokio::time::advance(Duration::from_secs(10)).await;
        tokio::task::yield_now().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disable_races_with_deadline() {
        // 到点与关闭竞争：关闭后即使计时已走完也不触发
        let autoplay = AutoPlayController::new(Duration::from_secs(3));
        autoplay.set_enabled(true);

        let fired = Arc::new(AtomicUsize::new(0));
        autoplay.schedule(counter_advance(&fired));

        autoplay.set_enabled(false);
        tokio::time::advance(Duration::from_secs(10)).await;
        tokio::task::yield_now().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_noop_when_disabled() {
        let autoplay = AutoPlayController::new(Duration::from_secs(3));

        let fired = Arc::new(AtomicUsize::new(0));
        autoplay.schedule(counter_advance(&fired));
        assert!(!autoplay.is_reserved());

        tokio::time::advance(Duration::from_secs(10)).await;
        tokio::task::yield_now().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
