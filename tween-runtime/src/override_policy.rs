//! # Override Policy 模块
//!
//! 同一对象、同一属性域上已有动画时，新请求如何接管。
//!
//! 四种情况：
//!
//! 1. 目标、时长、曲线都相同：拒绝
//! 2. 目标相同但参数不同：保留原始值，时长不同时按剩余比例重新计时
//! 3. 新目标等于原始值（反向）：原始值改为旧目标，时长按回程剩余比例缩短
//! 4. 无关的新目标：以当前值为原始值，使用完整时长
//!
//! 新任务总是从当前实际值出发，这里只决定记录中保存的原始值和任务的实际运行时长。

use crate::easing::EasingFunction;
use crate::value::{TweenValue, interpolation_step};

/// 进行中动画的记录参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveTween<V> {
    pub original: V,
    pub target: V,
    /// 请求时给出的名义时长
    pub duration: f32,
    pub easing: EasingFunction,
}

/// 新的补间请求
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverrideRequest<V> {
    pub target: V,
    pub duration: f32,
    pub easing: EasingFunction,
}

/// 覆盖情况
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideCase {
    /// 目标相同，参数不同
    SameTarget,
    /// 回到原始值
    Reversal,
    /// 无关的新目标
    Unrelated,
}

/// 覆盖决策
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverrideDecision<V> {
    /// 与进行中的动画完全相同，保持不变
    Reject,
    /// 取消旧任务，按给定参数启动新任务
    Retarget {
        case: OverrideCase,
        /// 新记录保存的原始值
        original: V,
        /// 新任务的实际运行时长
        phase_duration: f32,
    },
}

/// 计算覆盖决策
///
/// `current` 为对象当前的实际值。
pub fn resolve_override<V: TweenValue>(
    active: &ActiveTween<V>,
    current: V,
    request: &OverrideRequest<V>,
) -> OverrideDecision<V> {
    if request.target == active.target {
        if request.duration == active.duration && request.easing == active.easing {
            return OverrideDecision::Reject;
        }

        // 曲线不同但时长相同时，以原时长从当前值继续
        let phase_duration = if request.duration != active.duration {
            let step = interpolation_step(active.original, active.target, current);
            request.duration * (1.0 - step)
        } else {
            request.duration
        };

        return OverrideDecision::Retarget {
            case: OverrideCase::SameTarget,
            original: active.original,
            phase_duration,
        };
    }

    if request.target == active.original {
        // 沿反方向测量剩余距离
        let step = interpolation_step(active.target, active.original, current);
        return OverrideDecision::Retarget {
            case: OverrideCase::Reversal,
            original: active.target,
            phase_duration: request.duration * (1.0 - step),
        };
    }

    OverrideDecision::Retarget {
        case: OverrideCase::Unrelated,
        original: current,
        phase_duration: request.duration,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Rgba, Vec3};

    fn active_move() -> ActiveTween<Vec3> {
        ActiveTween {
            original: Vec3::zero(),
            target: Vec3::new(10.0, 0.0, 0.0),
            duration: 4.0,
            easing: EasingFunction::Linear,
        }
    }

    #[test]
    fn test_identical_request_is_rejected() {
        let active = active_move();
        let request = OverrideRequest {
            target: active.target,
            duration: 4.0,
            easing: EasingFunction::Linear,
        };
        assert_eq!(
            resolve_override(&active, Vec3::new(3.0, 0.0, 0.0), &request),
            OverrideDecision::Reject
        );
    }

    #[test]
    fn test_same_target_with_new_duration_rescales() {
        let active = ActiveTween {
            original: Rgba::WHITE,
            target: Rgba::RED,
            duration: 2.0,
            easing: EasingFunction::Linear,
        };
        let halfway = Rgba::new(1.0, 0.5, 0.5, 1.0);
        let request = OverrideRequest {
            target: Rgba::RED,
            duration: 4.0,
            easing: EasingFunction::Linear,
        };
        assert_eq!(
            resolve_override(&active, halfway, &request),
            OverrideDecision::Retarget {
                case: OverrideCase::SameTarget,
                original: Rgba::WHITE,
                phase_duration: 2.0,
            }
        );
    }

    #[test]
    fn test_same_target_with_new_curve_keeps_duration() {
        let active = active_move();
        let request = OverrideRequest {
            target: active.target,
            duration: 4.0,
            easing: EasingFunction::EaseOutQuad,
        };
        assert_eq!(
            resolve_override(&active, Vec3::new(5.0, 0.0, 0.0), &request),
            OverrideDecision::Retarget {
                case: OverrideCase::SameTarget,
                original: Vec3::zero(),
                phase_duration: 4.0,
            }
        );
    }

    #[test]
    fn test_reversal_measures_remaining_distance() {
        let active = active_move();
        let request = OverrideRequest {
            target: Vec3::zero(),
            duration: 4.0,
            easing: EasingFunction::Linear,
        };
        assert_eq!(
            resolve_override(&active, Vec3::new(2.5, 0.0, 0.0), &request),
            OverrideDecision::Retarget {
                case: OverrideCase::Reversal,
                original: Vec3::new(10.0, 0.0, 0.0),
                phase_duration: 1.0,
            }
        );
    }

    #[test]
    fn test_unrelated_target_starts_from_current() {
        let active = active_move();
        let current = Vec3::new(5.0, 0.0, 0.0);
        let request = OverrideRequest {
            target: Vec3::new(0.0, 8.0, 0.0),
            duration: 3.0,
            easing: EasingFunction::EaseInOut,
        };
        assert_eq!(
            resolve_override(&active, current, &request),
            OverrideDecision::Retarget {
                case: OverrideCase::Unrelated,
                original: current,
                phase_duration: 3.0,
            }
        );
    }

    #[test]
    fn test_degenerate_record_gives_zero_step() {
        // 原始值与目标相同时，进度按 0 计算
        let active = ActiveTween {
            original: Rgba::RED,
            target: Rgba::RED,
            duration: 1.0,
            easing: EasingFunction::Linear,
        };
        let request = OverrideRequest {
            target: Rgba::RED,
            duration: 2.0,
            easing: EasingFunction::Linear,
        };
        assert_eq!(
            resolve_override(&active, Rgba::WHITE, &request),
            OverrideDecision::Retarget {
                case: OverrideCase::SameTarget,
                original: Rgba::RED,
                phase_duration: 2.0,
            }
        );
    }
}
