//! # Composite 模块
//!
//! 复合动画（闪烁 Flash、明灭 Blink）：由“去、中间等待、回、循环等待”四个阶段组成的循环。
//!
//! ```text
//! Go ──► MiddleWait ──► Back ──► LoopWait ──► Go ...
//! ```
//!
//! 每个去/回阶段开始时从对象当前值出发启动一个新的单段任务。
//! 时长为 0 的等待阶段直接跳过，不占用帧；阶段结束时多余的时间不会带入下一阶段。
//! 最后一次循环同样会执行循环等待，之后整个任务结束。

use serde::{Deserialize, Serialize};

use crate::animation::{MorphTask, TaskState, TaskStatus, TweenId};
use crate::config::{DEFAULT_MAX_LOOPS, FlashDefaults};
use crate::easing::EasingFunction;
use crate::value::{Rgba, TweenValue};

/// 阶段结束回调
pub type PhaseCallback = Box<dyn FnMut()>;

/// 复合动画阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositePhase {
    Go,
    MiddleWait,
    Back,
    LoopWait,
}

impl CompositePhase {
    /// 下一个阶段
    pub fn next(self) -> Self {
        match self {
            CompositePhase::Go => CompositePhase::MiddleWait,
            CompositePhase::MiddleWait => CompositePhase::Back,
            CompositePhase::Back => CompositePhase::LoopWait,
            CompositePhase::LoopWait => CompositePhase::Go,
        }
    }

    pub fn is_wait(self) -> bool {
        matches!(self, CompositePhase::MiddleWait | CompositePhase::LoopWait)
    }

    pub fn name(self) -> &'static str {
        match self {
            CompositePhase::Go => "go",
            CompositePhase::MiddleWait => "middle_wait",
            CompositePhase::Back => "back",
            CompositePhase::LoopWait => "loop_wait",
        }
    }
}

impl std::fmt::Display for CompositePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 明灭方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlinkMode {
    /// 先变为不透明，再变为透明
    #[default]
    InOut,
    /// 先变为透明，再变为不透明
    OutIn,
}

/// 复合动画类型
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompositeKind {
    /// 在当前颜色与给定颜色之间往返
    Flash(Rgba),
    /// 在不透明与透明之间往返
    Blink(BlinkMode),
}

impl CompositeKind {
    /// 以当前颜色计算 (去阶段目标, 回阶段目标)
    pub fn targets(&self, current: Rgba) -> (Rgba, Rgba) {
        match self {
            CompositeKind::Flash(color) => (*color, current),
            CompositeKind::Blink(BlinkMode::InOut) => {
                (current.with_alpha(1.0), current.with_alpha(0.0))
            }
            CompositeKind::Blink(BlinkMode::OutIn) => {
                (current.with_alpha(0.0), current.with_alpha(1.0))
            }
        }
    }
}

/// 复合动画参数
pub struct FlashOptions {
    /// 循环次数（至少 1 次）
    pub loops: u32,
    pub go_time: f32,
    pub back_time: f32,
    pub middle_wait: f32,
    pub loop_wait: f32,
    pub go_easing: EasingFunction,
    pub back_easing: EasingFunction,
    on_go: Option<PhaseCallback>,
    on_back: Option<PhaseCallback>,
}

impl Default for FlashOptions {
    fn default() -> Self {
        Self::from_defaults(&FlashDefaults::default(), DEFAULT_MAX_LOOPS)
    }
}

impl std::fmt::Debug for FlashOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlashOptions")
            .field("loops", &self.loops)
            .field("go_time", &self.go_time)
            .field("back_time", &self.back_time)
            .field("middle_wait", &self.middle_wait)
            .field("loop_wait", &self.loop_wait)
            .field("go_easing", &self.go_easing)
            .field("back_easing", &self.back_easing)
            .field("on_go", &self.on_go.is_some())
            .field("on_back", &self.on_back.is_some())
            .finish()
    }
}

impl FlashOptions {
    /// 从配置的默认值创建
    pub fn from_defaults(defaults: &FlashDefaults, loops: u32) -> Self {
        Self {
            loops,
            go_time: defaults.go_time,
            back_time: defaults.back_time,
            middle_wait: defaults.middle_wait,
            loop_wait: defaults.loop_wait,
            go_easing: defaults.go_easing,
            back_easing: defaults.back_easing,
            on_go: None,
            on_back: None,
        }
    }

    pub fn loops(mut self, loops: u32) -> Self {
        self.loops = loops;
        self
    }

    pub fn go_time(mut self, seconds: f32) -> Self {
        self.go_time = seconds;
        self
    }

    pub fn back_time(mut self, seconds: f32) -> Self {
        self.back_time = seconds;
        self
    }

    pub fn middle_wait(mut self, seconds: f32) -> Self {
        self.middle_wait = seconds;
        self
    }

    pub fn loop_wait(mut self, seconds: f32) -> Self {
        self.loop_wait = seconds;
        self
    }

    pub fn go_easing(mut self, easing: EasingFunction) -> Self {
        self.go_easing = easing;
        self
    }

    pub fn back_easing(mut self, easing: EasingFunction) -> Self {
        self.back_easing = easing;
        self
    }

    /// 每次去阶段结束时调用
    pub fn on_go(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_go = Some(Box::new(callback));
        self
    }

    /// 每次回阶段结束时调用
    pub fn on_back(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_back = Some(Box::new(callback));
        self
    }

    /// 规整参数：循环次数截断到 `[1, max_loops]`，负时长按 0 处理
    pub(crate) fn sanitized(mut self, max_loops: u32) -> Self {
        self.loops = self.loops.clamp(1, max_loops.max(1));
        self.go_time = self.go_time.max(0.0);
        self.back_time = self.back_time.max(0.0);
        self.middle_wait = self.middle_wait.max(0.0);
        self.loop_wait = self.loop_wait.max(0.0);
        self
    }

    /// 记录中使用的名义时长：去、回两段时长的平均值
    pub fn nominal_duration(&self) -> f32 {
        (self.go_time + self.back_time) / 2.0
    }
}

/// 单帧推进结果
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeStep<V> {
    /// 本帧需要写入的值
    pub write: Option<V>,
    /// 本帧结束的阶段及其所在循环序号（从 0 开始）
    pub finished: Vec<(CompositePhase, u32)>,
    /// 整个复合动画是否已结束
    pub done: bool,
}

impl<V> CompositeStep<V> {
    fn idle() -> Self {
        Self {
            write: None,
            finished: Vec::new(),
            done: false,
        }
    }
}

enum Phase<V> {
    /// 去/回阶段尚未开始
    Pending(CompositePhase),
    Morph(CompositePhase, MorphTask<V>),
    Wait(CompositePhase, f32),
}

/// 复合动画任务
pub struct CompositeTask<V> {
    id: TweenId,
    go_target: V,
    back_target: V,
    go_time: f32,
    back_time: f32,
    middle_wait: f32,
    loop_wait: f32,
    go_easing: EasingFunction,
    back_easing: EasingFunction,
    loops: u32,
    iteration: u32,
    phase: Phase<V>,
    state: TaskState,
    on_go: Option<PhaseCallback>,
    on_back: Option<PhaseCallback>,
}

impl<V: std::fmt::Debug> std::fmt::Debug for CompositeTask<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeTask")
            .field("id", &self.id)
            .field("go_target", &self.go_target)
            .field("back_target", &self.back_target)
            .field("loops", &self.loops)
            .field("iteration", &self.iteration)
            .field("phase", &self.current_phase())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<V> CompositeTask<V> {
    /// 当前所处阶段
    pub fn current_phase(&self) -> CompositePhase {
        match &self.phase {
            Phase::Pending(kind) | Phase::Morph(kind, _) | Phase::Wait(kind, _) => *kind,
        }
    }
}

impl<V: TweenValue> CompositeTask<V> {
    /// 创建新的复合任务，`options` 应已规整
    pub fn new(id: TweenId, go_target: V, back_target: V, options: FlashOptions) -> Self {
        Self {
            id,
            go_target,
            back_target,
            go_time: options.go_time,
            back_time: options.back_time,
            middle_wait: options.middle_wait,
            loop_wait: options.loop_wait,
            go_easing: options.go_easing,
            back_easing: options.back_easing,
            loops: options.loops.max(1),
            iteration: 0,
            phase: Phase::Pending(CompositePhase::Go),
            state: TaskState::Suspended,
            on_go: options.on_go,
            on_back: options.on_back,
        }
    }

    /// 推进一帧
    ///
    /// `live` 为对象当前的实际值，去/回阶段开始时作为起点。
    pub fn advance(&mut self, dt: f32, live: V) -> CompositeStep<V> {
        let mut step = CompositeStep::idle();
        if !self.state.is_live() {
            return step;
        }
        self.state = TaskState::Running;
        let dt = dt.max(0.0);

        let phase = match std::mem::replace(&mut self.phase, Phase::Pending(CompositePhase::Go)) {
            Phase::Pending(kind) => Phase::Morph(kind, self.start_morph(kind, live)),
            other => other,
        };

        self.phase = match phase {
            Phase::Morph(kind, mut morph) => match morph.advance(dt) {
                TaskStatus::Continue(value) => {
                    step.write = Some(value);
                    Phase::Morph(kind, morph)
                }
                TaskStatus::Done(value) => {
                    step.write = Some(value);
                    self.finish_phase(kind, &mut step)
                }
                TaskStatus::Idle => Phase::Morph(kind, morph),
            },
            Phase::Wait(kind, elapsed) => {
                let elapsed = elapsed + dt;
                if elapsed >= self.wait_time(kind) {
                    self.finish_phase(kind, &mut step)
                } else {
                    Phase::Wait(kind, elapsed)
                }
            }
            pending @ Phase::Pending(_) => pending,
        };

        if !step.done {
            self.state = TaskState::Suspended;
        }
        step
    }

    /// 结束当前阶段并进入下一阶段，返回下一阶段的状态
    fn finish_phase(&mut self, mut kind: CompositePhase, step: &mut CompositeStep<V>) -> Phase<V> {
        loop {
            step.finished.push((kind, self.iteration));
            if kind == CompositePhase::LoopWait {
                self.iteration += 1;
            }

            let next = kind.next();
            match next {
                CompositePhase::MiddleWait | CompositePhase::LoopWait => {
                    if self.wait_time(next) > 0.0 {
                        return Phase::Wait(next, 0.0);
                    }
                    kind = next;
                }
                CompositePhase::Go => {
                    if self.iteration >= self.loops {
                        self.state = TaskState::Completed;
                        step.done = true;
                    }
                    return Phase::Pending(CompositePhase::Go);
                }
                CompositePhase::Back => return Phase::Pending(CompositePhase::Back),
            }
        }
    }

    fn start_morph(&self, kind: CompositePhase, live: V) -> MorphTask<V> {
        match kind {
            CompositePhase::Back => {
                MorphTask::new(self.id, live, self.back_target, self.back_time, self.back_easing)
            }
            _ => MorphTask::new(self.id, live, self.go_target, self.go_time, self.go_easing),
        }
    }

    fn wait_time(&self, kind: CompositePhase) -> f32 {
        match kind {
            CompositePhase::MiddleWait => self.middle_wait,
            CompositePhase::LoopWait => self.loop_wait,
            _ => 0.0,
        }
    }

    /// 调用阶段结束回调（只有去/回阶段有回调）
    pub fn run_phase_callback(&mut self, phase: CompositePhase) {
        let callback = match phase {
            CompositePhase::Go => self.on_go.as_mut(),
            CompositePhase::Back => self.on_back.as_mut(),
            _ => None,
        };
        if let Some(callback) = callback {
            callback();
        }
    }

    /// 取消任务
    pub fn cancel(&mut self) {
        if self.state.is_live() {
            self.state = TaskState::Cancelled;
        }
    }

    pub fn id(&self) -> TweenId {
        self.id
    }

    pub fn go_target(&self) -> V {
        self.go_target
    }

    pub fn back_target(&self) -> V {
        self.back_target
    }

    pub fn loops(&self) -> u32 {
        self.loops
    }

    /// 已完成的循环次数
    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    pub fn state(&self) -> TaskState {
        self.state
    }
}
