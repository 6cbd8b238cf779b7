//! # Scenario 模块
//!
//! 补间场景：初始对象加按帧调度的请求，JSON 格式。
//!
//! ```json
//! {
//!   "objects": [{ "name": "panel", "color": { "r": 1, "g": 1, "b": 1, "a": 1 } }],
//!   "requests": [
//!     { "at_tick": 0, "object": "panel", "type": "recolor",
//!       "color": { "r": 1, "g": 0, "b": 0, "a": 1 }, "duration": 1.0 }
//!   ]
//! }
//! ```
//!
//! 回放时每帧先提交该帧的请求，再推进一帧，输出一行轨迹。

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::{debug, warn};
use tween_runtime::{
    BlinkMode, EasingFunction, FadeMode, FlashOptions, ManualClock, ObjectId, Rgba, Sprite,
    TweenConfig, TweenEvent, TweenId, TweenResult, TweenSystem, Vec3,
};

/// 补间场景
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub objects: Vec<ObjectSpec>,
    #[serde(default)]
    pub requests: Vec<RequestSpec>,
}

/// 场景中的对象
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectSpec {
    pub name: String,
    #[serde(default = "default_color")]
    pub color: Rgba,
    #[serde(default)]
    pub position: Vec3,
}

fn default_color() -> Rgba {
    Rgba::WHITE
}

/// 在指定帧提交的请求
#[derive(Debug, Clone, Deserialize)]
pub struct RequestSpec {
    /// 提交请求的帧序号（从 0 开始）
    #[serde(default)]
    pub at_tick: u32,
    /// 目标对象名称
    pub object: String,
    #[serde(flatten)]
    pub action: Action,
}

/// 属性域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Color,
    Position,
}

/// 请求动作
///
/// 未给出 `duration` 时使用配置中的 `default_duration`，未给出曲线时为线性。
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Recolor {
        color: Rgba,
        #[serde(default)]
        duration: Option<f32>,
        #[serde(default)]
        easing: Option<String>,
    },
    Move {
        position: Vec3,
        #[serde(default)]
        duration: Option<f32>,
        #[serde(default)]
        easing: Option<String>,
    },
    Fade {
        #[serde(default)]
        mode: FadeMode,
        #[serde(default)]
        duration: Option<f32>,
        #[serde(default)]
        easing: Option<String>,
    },
    Flash {
        color: Rgba,
        #[serde(default)]
        options: FlashSpec,
    },
    Blink {
        #[serde(default)]
        mode: BlinkMode,
        #[serde(default)]
        options: FlashSpec,
    },
    SoftStop {
        domain: Domain,
    },
    ForcedStop {
        domain: Domain,
    },
}

/// 复合动画参数，未给出的字段使用配置中的默认值
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlashSpec {
    pub loops: Option<u32>,
    pub go_time: Option<f32>,
    pub back_time: Option<f32>,
    pub middle_wait: Option<f32>,
    pub loop_wait: Option<f32>,
    pub go_easing: Option<String>,
    pub back_easing: Option<String>,
}

impl FlashSpec {
    fn apply(&self, mut options: FlashOptions) -> TweenResult<FlashOptions> {
        if let Some(loops) = self.loops {
            options = options.loops(loops);
        }
        if let Some(seconds) = self.go_time {
            options = options.go_time(seconds);
        }
        if let Some(seconds) = self.back_time {
            options = options.back_time(seconds);
        }
        if let Some(seconds) = self.middle_wait {
            options = options.middle_wait(seconds);
        }
        if let Some(seconds) = self.loop_wait {
            options = options.loop_wait(seconds);
        }
        if let Some(name) = &self.go_easing {
            options = options.go_easing(parse_easing(Some(name))?);
        }
        if let Some(name) = &self.back_easing {
            options = options.back_easing(parse_easing(Some(name))?);
        }
        Ok(options)
    }
}

/// 未知曲线与补间系统的其他拒绝一样，只记录警告
fn parse_easing(name: Option<&String>) -> TweenResult<EasingFunction> {
    match name {
        Some(name) => EasingFunction::from_name(name).inspect_err(|e| warn!("请求被拒绝: {e}")),
        None => Ok(EasingFunction::Linear),
    }
}

impl Scenario {
    /// 从 JSON 文本解析并验证
    pub fn from_json(json: &str) -> Result<Self> {
        let scenario: Self = serde_json::from_str(json).context("场景 JSON 解析失败")?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// 从文件加载
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("无法读取场景文件: {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("场景文件无效: {}", path.display()))
    }

    /// 对象名称唯一，请求只能引用已声明的对象
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for object in &self.objects {
            if !names.insert(object.name.as_str()) {
                bail!("对象名称重复: {}", object.name);
            }
        }
        for request in &self.requests {
            if !names.contains(request.object.as_str()) {
                bail!("请求引用了未声明的对象: {}", request.object);
            }
        }
        Ok(())
    }

    /// 最后一个请求所在的帧
    pub fn last_request_tick(&self) -> u32 {
        self.requests
            .iter()
            .map(|request| request.at_tick)
            .max()
            .unwrap_or(0)
    }
}

/// 回放参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunOptions {
    /// 每帧时长（秒）
    pub step: f32,
    /// 最多回放的帧数
    pub max_ticks: u32,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            step: 0.25,
            max_ticks: 1000,
        }
    }
}

/// 回放场景，返回每帧一行的轨迹
///
/// 所有请求提交完毕且没有进行中的动画时提前结束。
pub fn run(scenario: &Scenario, config: TweenConfig, options: &RunOptions) -> Result<String> {
    if !options.step.is_finite() || options.step <= 0.0 {
        bail!("帧时长必须为正数: {}", options.step);
    }

    let default_duration = config.default_duration;
    let mut system = TweenSystem::with_config(config);
    let mut sprites = Vec::with_capacity(scenario.objects.len());
    let mut ids = HashMap::new();
    for spec in &scenario.objects {
        let sprite = Rc::new(
            Sprite::new(spec.name.clone())
                .with_color(spec.color)
                .with_position(spec.position),
        );
        let id = system.register(Rc::clone(&sprite));
        ids.insert(spec.name.clone(), id);
        sprites.push(sprite);
    }

    let last_tick = scenario.last_request_tick();
    let mut clock = ManualClock::new(options.step);
    let mut lines = Vec::new();

    for tick in 0..options.max_ticks {
        let mut notes = Vec::new();
        for request in scenario.requests.iter().filter(|r| r.at_tick == tick) {
            let Some(&object_id) = ids.get(&request.object) else {
                bail!("请求引用了未声明的对象: {}", request.object);
            };
            let submitted = submit(&mut system, object_id, &request.action, default_duration);
            if submitted.is_err() {
                notes.push(format!("rejected:{}", request.object));
            }
        }

        let events = system.tick(&mut clock);
        notes.extend(events.iter().map(describe_event));

        let objects: Vec<String> = sprites
            .iter()
            .map(|sprite| {
                let data = sprite.snapshot();
                format!("{} {} {}", data.name, data.color, data.position)
            })
            .collect();
        let mut line = format!(
            "#{} t={:.2} {}",
            clock.ticks(),
            clock.elapsed(),
            objects.join(" | ")
        );
        if !notes.is_empty() {
            line.push_str(&format!(" [{}]", notes.join(" ")));
        }
        lines.push(line);

        if tick >= last_tick && !system.has_active_animations() {
            debug!(ticks = clock.ticks(), "场景回放结束");
            return Ok(lines.join("\n"));
        }
    }

    if system.has_active_animations() {
        warn!(max_ticks = options.max_ticks, "达到最大帧数，仍有动画未结束");
    }
    Ok(lines.join("\n"))
}

/// 提交一个请求，曲线名称无效时同样返回拒绝
fn submit(
    system: &mut TweenSystem,
    object_id: ObjectId,
    action: &Action,
    default_duration: f32,
) -> TweenResult<TweenId> {
    match action {
        Action::Recolor {
            color,
            duration,
            easing,
        } => system.recolor(
            object_id,
            *color,
            duration.unwrap_or(default_duration),
            parse_easing(easing.as_ref())?,
            None,
        ),
        Action::Move {
            position,
            duration,
            easing,
        } => system.move_to(
            object_id,
            *position,
            duration.unwrap_or(default_duration),
            parse_easing(easing.as_ref())?,
            None,
        ),
        Action::Fade {
            mode,
            duration,
            easing,
        } => system.fade(
            object_id,
            *mode,
            duration.unwrap_or(default_duration),
            parse_easing(easing.as_ref())?,
            None,
        ),
        Action::Flash { color, options } => {
            let options = options.apply(system.flash_options())?;
            system.flash(object_id, *color, options)
        }
        Action::Blink { mode, options } => {
            let options = options.apply(system.flash_options())?;
            system.blink(object_id, *mode, options)
        }
        Action::SoftStop { domain } => match domain {
            Domain::Color => system.soft_stop_color(object_id),
            Domain::Position => system.soft_stop_position(object_id),
        },
        Action::ForcedStop { domain } => match domain {
            Domain::Color => system.forced_stop_color(object_id),
            Domain::Position => system.forced_stop_position(object_id),
        },
    }
}

fn describe_event(event: &TweenEvent) -> String {
    match event {
        TweenEvent::Started(id) => format!("started:{}", id.value()),
        TweenEvent::Completed(id) => format!("completed:{}", id.value()),
        TweenEvent::Cancelled(id) => format!("cancelled:{}", id.value()),
        TweenEvent::PhaseFinished {
            id,
            phase,
            iteration,
        } => format!("{phase}:{}:{iteration}", id.value()),
    }
}
