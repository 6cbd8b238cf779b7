//! # Error 模块
//!
//! 定义 tween-runtime 中使用的错误类型。
//!
//! 所有拒绝都以诊断日志的形式输出，同时以 `Err` 返回给调用方，
//! 调用方可以选择忽略。

use thiserror::Error;

use crate::traits::ObjectId;

/// 补间请求被拒绝的原因
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TweenError {
    /// 对象未在系统中注册
    #[error("对象 {0} 未注册")]
    ObjectNotRegistered(ObjectId),

    /// 对象不支持目标属性域
    #[error("对象 {object} 不支持 {domain} 属性")]
    UnsupportedProperty {
        object: ObjectId,
        domain: &'static str,
    },

    /// 目标值与当前值相同
    #[error("对象 {object} 的 {domain} 目标值与当前值相同")]
    SameValue {
        object: ObjectId,
        domain: &'static str,
    },

    /// 未实现的缓动曲线
    #[error("未实现的缓动曲线 '{name}'")]
    UnknownCurve { name: String },

    /// 覆盖请求与进行中的动画参数完全一致
    #[error("对象 {object} 的 {domain} 覆盖请求与进行中的动画完全相同")]
    IdenticalOverride {
        object: ObjectId,
        domain: &'static str,
    },

    /// 没有进行中的动画可停止
    #[error("对象 {object} 没有进行中的 {domain} 动画")]
    NotAnimating {
        object: ObjectId,
        domain: &'static str,
    },
}

/// Result 类型别名
pub type TweenResult<T> = Result<T, TweenError>;
