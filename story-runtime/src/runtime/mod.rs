//! # Runtime 模块
//!
//! 播放时序的三件套：
//!
//! - [`executor`]：把一个连续组的订单并发演出、统一快进
//! - [`autoplay`]：自动播放的预约与取消
//! - [`player`]：对宿主暴露的播放器门面，串起表、游标与上面两者

pub mod autoplay;
pub mod executor;
pub mod player;

pub use autoplay::AutoPlayController;
pub use executor::OrderExecutor;
pub use player::{PlayerPhase, StoryPlayer};
