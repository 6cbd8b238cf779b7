//! # Traits 模块
//!
//! 可动画对象的核心接口定义。
//!
//! ## 核心概念
//!
//! - `ObjectId`: 由 `TweenSystem` 分配的唯一对象标识符
//! - `ColorCarrier` / `PositionCarrier`: 颜色与位置属性的读写接口
//! - `Animatable`: 可动画对象，声明自己支持哪些属性域
//!
//! 所有写入都通过 `&self` 完成，实现方使用内部可变性保存状态。

/// 对象唯一标识符
///
/// 由 `TweenSystem` 在对象注册时分配，保证全局唯一。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub(crate) u64);

impl ObjectId {
    /// 创建新的对象 ID（仅供 TweenSystem 内部使用）
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// 获取内部 ID 值
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObjectId({})", self.0)
    }
}

/// 颜色属性读写接口
pub trait ColorCarrier {
    /// 读取当前颜色
    fn color(&self) -> crate::Rgba;

    /// 写入新颜色
    fn set_color(&self, color: crate::Rgba);
}

/// 位置属性读写接口
pub trait PositionCarrier {
    /// 读取当前位置
    fn position(&self) -> crate::Vec3;

    /// 写入新位置
    fn set_position(&self, position: crate::Vec3);
}

/// 可动画对象接口
///
/// 对象通过返回 `Some` 声明自己支持某个属性域，默认两者都不支持。
///
/// ## 实现示例
///
/// ```rust,ignore
/// struct Panel {
///     tint: Rc<RefCell<Rgba>>,
/// }
///
/// impl ColorCarrier for Panel {
///     fn color(&self) -> Rgba { *self.tint.borrow() }
///     fn set_color(&self, color: Rgba) { *self.tint.borrow_mut() = color; }
/// }
///
/// impl Animatable for Panel {
///     fn as_color(&self) -> Option<&dyn ColorCarrier> { Some(self) }
/// }
/// ```
pub trait Animatable: 'static {
    /// 颜色属性（不支持时返回 `None`）
    fn as_color(&self) -> Option<&dyn ColorCarrier> {
        None
    }

    /// 位置属性（不支持时返回 `None`）
    fn as_position(&self) -> Option<&dyn PositionCarrier> {
        None
    }

    /// 调试用名称
    fn label(&self) -> &str {
        "<anonymous>"
    }
}
