//! # Animation 模块
//!
//! 单段补间任务（Morph）：在给定时长内把值从 `from` 按缓动曲线推进到 `to`。
//!
//! 任务本身不读写对象属性，只根据经过的时间计算每一帧应写入的值，
//! 由 `TweenSystem` 负责写入。

use crate::easing::EasingFunction;
use crate::value::TweenValue;

/// 补间任务 ID
///
/// 每次启动任务（包括覆盖、软停止产生的过渡任务）都会分配新的 ID。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TweenId(pub u64);

impl TweenId {
    /// 创建新的任务 ID
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// 获取内部 ID 值
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TweenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskState {
    /// 本帧正在推进
    #[default]
    Running,
    /// 等待下一帧
    Suspended,
    /// 已取消（不会再写入）
    Cancelled,
    /// 已完成
    Completed,
}

impl TaskState {
    /// 是否为活跃状态（需要更新）
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Running | Self::Suspended)
    }

    /// 是否已结束
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed)
    }
}

/// 单帧推进结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TaskStatus<V> {
    /// 写入该值后继续
    Continue(V),
    /// 写入该值（即终点）后结束
    Done(V),
    /// 任务已结束，不写入
    Idle,
}

/// 单段补间任务
#[derive(Debug, Clone)]
pub struct MorphTask<V> {
    id: TweenId,
    from: V,
    to: V,
    duration: f32,
    easing: EasingFunction,
    elapsed: f32,
    progress: f32,
    state: TaskState,
}

impl<V: TweenValue> MorphTask<V> {
    /// 创建新的任务
    ///
    /// 创建时不写入任何值，第一次写入发生在第一次 `advance`。
    pub fn new(id: TweenId, from: V, to: V, duration: f32, easing: EasingFunction) -> Self {
        Self {
            id,
            from,
            to,
            duration: duration.max(0.0),
            easing,
            elapsed: 0.0,
            progress: 0.0,
            state: TaskState::Suspended,
        }
    }

    /// 推进一帧
    ///
    /// 时长为 0 的任务在第一次推进时直接写入终点并结束。
    pub fn advance(&mut self, dt: f32) -> TaskStatus<V> {
        if !self.state.is_live() {
            return TaskStatus::Idle;
        }
        self.state = TaskState::Running;
        self.elapsed += dt.max(0.0);

        if self.duration <= 0.0 || self.elapsed >= self.duration {
            self.progress = 1.0;
            self.state = TaskState::Completed;
            return TaskStatus::Done(self.to);
        }

        self.progress = self.elapsed / self.duration;
        self.state = TaskState::Suspended;
        TaskStatus::Continue(self.current_value())
    }

    /// 取消任务，之后的推进不再产生写入
    pub fn cancel(&mut self) {
        if self.state.is_live() {
            self.state = TaskState::Cancelled;
        }
    }

    /// 按当前进度计算的值
    pub fn current_value(&self) -> V {
        if self.progress >= 1.0 {
            return self.to;
        }
        self.from.lerp(self.to, self.easing.apply(self.progress))
    }

    pub fn id(&self) -> TweenId {
        self.id
    }

    pub fn from(&self) -> V {
        self.from
    }

    pub fn to(&self) -> V {
        self.to
    }

    /// 实际运行时长（秒）
    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn easing(&self) -> EasingFunction {
        self.easing
    }

    /// 时间进度（0.0 - 1.0，未应用缓动）
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn state(&self) -> TaskState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Rgba, Vec3};

    fn create_test_task() -> MorphTask<Vec3> {
        MorphTask::new(
            TweenId::new(1),
            Vec3::zero(),
            Vec3::new(10.0, 0.0, 0.0),
            1.0,
            EasingFunction::Linear,
        )
    }

    #[test]
    fn test_task_creation() {
        let task = create_test_task();
        assert_eq!(task.state(), TaskState::Suspended);
        assert_eq!(task.progress(), 0.0);
        assert_eq!(task.current_value(), Vec3::zero());
        assert_eq!(task.id().to_string(), "#1");
    }

    #[test]
    fn test_task_advance() {
        let mut task = create_test_task();

        assert_eq!(
            task.advance(0.25),
            TaskStatus::Continue(Vec3::new(2.5, 0.0, 0.0))
        );
        assert_eq!(task.state(), TaskState::Suspended);
        assert_eq!(
            task.advance(0.25),
            TaskStatus::Continue(Vec3::new(5.0, 0.0, 0.0))
        );
        assert_eq!(task.advance(0.25), TaskStatus::Continue(Vec3::new(7.5, 0.0, 0.0)));

        // 最后一帧精确落在终点
        assert_eq!(task.advance(0.25), TaskStatus::Done(Vec3::new(10.0, 0.0, 0.0)));
        assert_eq!(task.state(), TaskState::Completed);
        assert_eq!(task.advance(0.25), TaskStatus::Idle);
    }

    #[test]
    fn test_overshooting_step_lands_on_target() {
        let mut task = MorphTask::new(
            TweenId::new(1),
            Rgba::WHITE,
            Rgba::RED,
            0.3,
            EasingFunction::EaseOutBounce,
        );
        assert_eq!(task.advance(1.0), TaskStatus::Done(Rgba::RED));
    }

    #[test]
    fn test_zero_duration() {
        let mut task = MorphTask::new(
            TweenId::new(1),
            Rgba::WHITE,
            Rgba::BLACK,
            0.0,
            EasingFunction::EaseInOut,
        );
        assert_eq!(task.state(), TaskState::Suspended);
        assert_eq!(task.advance(0.0), TaskStatus::Done(Rgba::BLACK));
    }

    #[test]
    fn test_negative_inputs_are_clamped() {
        let mut task = MorphTask::new(
            TweenId::new(1),
            Vec3::zero(),
            Vec3::new(1.0, 0.0, 0.0),
            -2.0,
            EasingFunction::Linear,
        );
        assert_eq!(task.duration(), 0.0);
        assert_eq!(task.advance(-1.0), TaskStatus::Done(Vec3::new(1.0, 0.0, 0.0)));

        let mut task = create_test_task();
        assert_eq!(task.advance(-5.0), TaskStatus::Continue(Vec3::zero()));
    }

    #[test]
    fn test_cancel() {
        let mut task = create_test_task();
        task.advance(0.5);
        task.cancel();
        assert_eq!(task.state(), TaskState::Cancelled);
        assert!(task.state().is_finished());
        assert_eq!(task.advance(0.25), TaskStatus::Idle);

        // 已完成的任务不会变成取消
        let mut done = create_test_task();
        done.advance(2.0);
        done.cancel();
        assert_eq!(done.state(), TaskState::Completed);
    }

    #[test]
    fn test_easing_is_applied() {
        let mut task = MorphTask::new(
            TweenId::new(7),
            Vec3::zero(),
            Vec3::new(4.0, 0.0, 0.0),
            1.0,
            EasingFunction::EaseInQuad,
        );
        assert_eq!(task.advance(0.5), TaskStatus::Continue(Vec3::new(1.0, 0.0, 0.0)));
    }
}
