//! # Clock 模块
//!
//! 帧时间来源。`TweenSystem::tick` 每次从时间源取一帧的时长。

use std::time::Instant;

/// 帧时间来源
pub trait TickSource {
    /// 距上一帧经过的时间（秒）
    fn delta(&mut self) -> f32;
}

/// 固定步长时钟，用于测试和离线模拟
#[derive(Debug, Clone)]
pub struct ManualClock {
    step: f32,
    elapsed: f32,
    ticks: u64,
}

impl ManualClock {
    pub fn new(step: f32) -> Self {
        Self {
            step: step.max(0.0),
            elapsed: 0.0,
            ticks: 0,
        }
    }

    /// 修改之后每帧的步长
    pub fn set_step(&mut self, step: f32) {
        self.step = step.max(0.0);
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    /// 累计经过的时间（秒）
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// 已产生的帧数
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl TickSource for ManualClock {
    fn delta(&mut self) -> f32 {
        self.ticks += 1;
        self.elapsed += self.step;
        self.step
    }
}

/// 实时时钟，按真实经过时间计算帧长
///
/// 单帧时长不超过 `max_delta`，避免卡顿后一帧跳过整段动画。
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    max_delta: f32,
}

impl FrameClock {
    pub fn new(max_delta: f32) -> Self {
        Self {
            last: Instant::now(),
            max_delta: max_delta.max(0.0),
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl TickSource for FrameClock {
    fn delta(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        dt.min(self.max_delta)
    }
}
