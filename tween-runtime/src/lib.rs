//! # Tween Runtime
//!
//! 属性补间引擎的核心库。
//!
//! ## 架构概述
//!
//! `tween-runtime` 不依赖任何渲染引擎。宿主把对象注册到 [`TweenSystem`]，
//! 每帧调用 `update(dt)`，系统直接写入对象的属性并返回事件：
//!
//! ```text
//! Host                          TweenSystem
//!   │                              │
//!   │──── recolor / move_to ─────►│ 记录表 + 覆盖策略
//!   │                              │
//!   │──── update(dt) ────────────►│ 推进任务，写入属性
//!   │◄─── Vec<TweenEvent> ────────│
//!   │                              │
//! ```
//!
//! 每个对象在每个属性域（颜色、位置）上最多只有一个进行中的动画，
//! 新请求按覆盖策略接管旧动画。
//!
//! ## 使用示例
//!
//! ```ignore
//! use tween_runtime::{EasingFunction, Rgba, SharedColor, TweenSystem};
//!
//! let mut system = TweenSystem::new();
//! let color = Rc::new(SharedColor::new(Rgba::WHITE));
//! let id = system.register(color.clone());
//!
//! system.recolor(id, Rgba::RED, 1.0, EasingFunction::Linear, None)?;
//! loop {
//!     let events = system.update(1.0 / 60.0);
//!     // ...
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`value`]：可插值的值类型
//! - [`easing`]：缓动曲线
//! - [`animation`]：单段补间任务
//! - [`composite`]：闪烁 / 往返复合任务
//! - [`override_policy`]：覆盖策略
//! - [`registry`]：动画记录表
//! - [`system`]：补间系统

pub mod animation;
pub mod carriers;
pub mod clock;
pub mod composite;
pub mod config;
mod domain;
pub mod easing;
pub mod error;
pub mod override_policy;
pub mod registry;
pub mod system;
pub mod traits;
pub mod value;

// 重导出核心类型
pub use animation::{MorphTask, TaskState, TaskStatus, TweenId};
pub use carriers::{AlphaGroup, SharedColor, SharedPosition, Sprite, SpriteData};
pub use clock::{FrameClock, ManualClock, TickSource};
pub use composite::{
    BlinkMode, CompositeKind, CompositePhase, CompositeStep, CompositeTask, FlashOptions,
    PhaseCallback,
};
pub use config::{ConfigError, DEFAULT_MAX_LOOPS, FlashDefaults, TweenConfig};
pub use easing::{EasingFunction, ease, ease_by_name};
pub use error::{TweenError, TweenResult};
pub use override_policy::{
    ActiveTween, OverrideCase, OverrideDecision, OverrideRequest, resolve_override,
};
pub use registry::{AnimationRecord, AnimationRegistry, CompletionCallback, TweenTask};
pub use system::{FadeMode, TweenSystem};
pub use traits::{Animatable, ColorCarrier, ObjectId, PositionCarrier};
pub use value::{Rgba, TweenValue, Vec3, interpolation_step};

/// 补间事件
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TweenEvent {
    /// 任务已创建
    Started(TweenId),
    /// 任务自然完成
    Completed(TweenId),
    /// 任务被覆盖或停止
    Cancelled(TweenId),
    /// 复合任务的一个阶段结束
    PhaseFinished {
        id: TweenId,
        phase: CompositePhase,
        /// 所在循环序号（从 0 开始）
        iteration: u32,
    },
}

impl TweenEvent {
    /// 事件所属的任务
    pub fn tween_id(&self) -> TweenId {
        match self {
            TweenEvent::Started(id) | TweenEvent::Completed(id) | TweenEvent::Cancelled(id) => *id,
            TweenEvent::PhaseFinished { id, .. } => *id,
        }
    }
}
