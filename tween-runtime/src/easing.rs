//! # Easing 模块
//!
//! 缓动函数库，把归一化的时间进度映射为缓动后的插值进度。
//!
//! 输入在计算前会截断到 `[0, 1]`，超出范围时输出警告。
//! 通过名称查找曲线时，未知名称返回中点 `0.5` 并输出警告。

use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{TweenError, TweenResult};

/// 缓动函数类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingFunction {
    /// 线性（匀速）
    #[default]
    Linear,
    /// 正弦缓入缓出（两头慢中间快）
    EaseInOut,
    /// 二次缓入
    EaseInQuad,
    /// 二次缓出
    EaseOutQuad,
    /// 弹跳缓出
    EaseOutBounce,
}

impl EasingFunction {
    /// 全部已实现的曲线
    pub const ALL: [EasingFunction; 5] = [
        EasingFunction::Linear,
        EasingFunction::EaseInOut,
        EasingFunction::EaseInQuad,
        EasingFunction::EaseOutQuad,
        EasingFunction::EaseOutBounce,
    ];

    /// 曲线名称（snake_case，与配置文件中的写法一致）
    pub fn name(&self) -> &'static str {
        match self {
            EasingFunction::Linear => "linear",
            EasingFunction::EaseInOut => "ease_in_out",
            EasingFunction::EaseInQuad => "ease_in_quad",
            EasingFunction::EaseOutQuad => "ease_out_quad",
            EasingFunction::EaseOutBounce => "ease_out_bounce",
        }
    }

    /// 按名称查找曲线，未知名称输出警告并返回 [`TweenError::UnknownCurve`]
    pub fn from_name(name: &str) -> TweenResult<Self> {
        name.parse().inspect_err(|err: &TweenError| {
            warn!(curve = name, error = %err, "缓动曲线查找失败");
        })
    }

    /// 计算缓动值
    ///
    /// # 参数
    /// - `t`: 时间进度，期望在 0.0 - 1.0 之间
    ///
    /// # 返回
    /// - 缓动后的进度值，`ease(0) = 0` 且 `ease(1) = 1`
    pub fn apply(&self, t: f32) -> f32 {
        let t = clamp_progress(t);

        match self {
            EasingFunction::Linear => t,
            EasingFunction::EaseInOut => (1.0 - (PI * t).cos()) / 2.0,
            EasingFunction::EaseInQuad => t * t,
            EasingFunction::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            EasingFunction::EaseOutBounce => ease_out_bounce(t),
        }
    }
}

impl fmt::Display for EasingFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EasingFunction {
    type Err = TweenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        EasingFunction::ALL
            .into_iter()
            .find(|curve| curve.name() == normalized)
            .ok_or_else(|| TweenError::UnknownCurve {
                name: s.to_string(),
            })
    }
}

/// 按曲线计算缓动值
pub fn ease(progress: f32, curve: EasingFunction) -> f32 {
    curve.apply(progress)
}

/// 按曲线名称计算缓动值
///
/// 未知名称输出警告并返回 `0.5`。
pub fn ease_by_name(progress: f32, name: &str) -> f32 {
    match name.parse::<EasingFunction>() {
        Ok(curve) => curve.apply(progress),
        Err(_) => {
            warn!(curve = name, "未实现的缓动曲线，返回中点 0.5");
            0.5
        }
    }
}

fn clamp_progress(t: f32) -> f32 {
    if t.is_nan() {
        warn!("缓动进度为 NaN，按 0 处理");
        return 0.0;
    }
    if !(0.0..=1.0).contains(&t) {
        warn!(progress = t, "缓动进度超出 0-1 范围，已截断");
        return t.clamp(0.0, 1.0);
    }
    t
}

/// 弹跳缓出
fn ease_out_bounce(t: f32) -> f32 {
    let n1 = 7.5625;
    let d1 = 2.75;

    if t < 1.0 / d1 {
        n1 * t * t
    } else if t < 2.0 / d1 {
        let t = t - 1.5 / d1;
        n1 * t * t + 0.75
    } else if t < 2.5 / d1 {
        let t = t - 2.25 / d1;
        n1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / d1;
        n1 * t * t + 0.984375
    }
}
