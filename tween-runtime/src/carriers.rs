//! # Carriers 模块
//!
//! 现成的可动画对象实现。
//!
//! 全部使用 `Rc<RefCell<T>>` 实现内部可变性，克隆出的句柄共享同一份数据，
//! 注册到系统之后调用方仍可通过自己持有的句柄读取当前值。

use std::cell::RefCell;
use std::rc::Rc;

use crate::traits::{Animatable, ColorCarrier, PositionCarrier};
use crate::value::{Rgba, Vec3};

/// 只有颜色属性的对象
#[derive(Debug, Clone)]
pub struct SharedColor {
    value: Rc<RefCell<Rgba>>,
}

impl SharedColor {
    pub fn new(initial: Rgba) -> Self {
        Self {
            value: Rc::new(RefCell::new(initial)),
        }
    }

    /// 读取当前颜色
    pub fn get(&self) -> Rgba {
        *self.value.borrow()
    }
}

impl ColorCarrier for SharedColor {
    fn color(&self) -> Rgba {
        self.get()
    }

    fn set_color(&self, color: Rgba) {
        *self.value.borrow_mut() = color;
    }
}

impl Animatable for SharedColor {
    fn as_color(&self) -> Option<&dyn ColorCarrier> {
        Some(self)
    }
}

/// 只有位置属性的对象
#[derive(Debug, Clone)]
pub struct SharedPosition {
    value: Rc<RefCell<Vec3>>,
}

impl SharedPosition {
    pub fn new(initial: Vec3) -> Self {
        Self {
            value: Rc::new(RefCell::new(initial)),
        }
    }

    /// 读取当前位置
    pub fn get(&self) -> Vec3 {
        *self.value.borrow()
    }
}

impl PositionCarrier for SharedPosition {
    fn position(&self) -> Vec3 {
        self.get()
    }

    fn set_position(&self, position: Vec3) {
        *self.value.borrow_mut() = position;
    }
}

impl Animatable for SharedPosition {
    fn as_position(&self) -> Option<&dyn PositionCarrier> {
        Some(self)
    }
}

/// 只有整体透明度的对象（例如一组 UI 元素）
///
/// 读取时表现为白色加当前 alpha，写入时只保留 alpha 并截断到 0 - 1。
#[derive(Debug, Clone)]
pub struct AlphaGroup {
    alpha: Rc<RefCell<f32>>,
}

impl AlphaGroup {
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha: Rc::new(RefCell::new(alpha.clamp(0.0, 1.0))),
        }
    }

    /// 当前透明度
    pub fn alpha(&self) -> f32 {
        *self.alpha.borrow()
    }
}

impl ColorCarrier for AlphaGroup {
    fn color(&self) -> Rgba {
        Rgba::WHITE.with_alpha(self.alpha())
    }

    fn set_color(&self, color: Rgba) {
        *self.alpha.borrow_mut() = color.a.clamp(0.0, 1.0);
    }
}

impl Animatable for AlphaGroup {
    fn as_color(&self) -> Option<&dyn ColorCarrier> {
        Some(self)
    }
}

/// 精灵的内部数据
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteData {
    /// 名称（标识符）
    pub name: String,
    pub color: Rgba,
    pub position: Vec3,
}

impl SpriteData {
    /// 创建白色、位于原点的精灵数据
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: Rgba::WHITE,
            position: Vec3::zero(),
        }
    }
}

/// 同时拥有颜色和位置的精灵
///
/// 两个属性域的动画互相独立，可以同时进行。
#[derive(Debug, Clone)]
pub struct Sprite {
    data: Rc<RefCell<SpriteData>>,
    name: String,
}

impl Sprite {
    /// 创建新的精灵
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_data(SpriteData::new(name))
    }

    /// 从现有数据创建
    pub fn from_data(data: SpriteData) -> Self {
        let name = data.name.clone();
        Self {
            data: Rc::new(RefCell::new(data)),
            name,
        }
    }

    /// 设置初始颜色
    pub fn with_color(self, color: Rgba) -> Self {
        self.data.borrow_mut().color = color;
        self
    }

    /// 设置初始位置
    pub fn with_position(self, position: Vec3) -> Self {
        self.data.borrow_mut().position = position;
        self
    }

    /// 获取名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 获取数据快照
    pub fn snapshot(&self) -> SpriteData {
        self.data.borrow().clone()
    }
}

impl ColorCarrier for Sprite {
    fn color(&self) -> Rgba {
        self.data.borrow().color
    }

    fn set_color(&self, color: Rgba) {
        self.data.borrow_mut().color = color;
    }
}

impl PositionCarrier for Sprite {
    fn position(&self) -> Vec3 {
        self.data.borrow().position
    }

    fn set_position(&self, position: Vec3) {
        self.data.borrow_mut().position = position;
    }
}

impl Animatable for Sprite {
    fn as_color(&self) -> Option<&dyn ColorCarrier> {
        Some(self)
    }

    fn as_position(&self) -> Option<&dyn PositionCarrier> {
        Some(self)
    }

    fn label(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_color_handles_share_state() {
        let color = SharedColor::new(Rgba::WHITE);
        let handle = color.clone();
        color.set_color(Rgba::RED);
        assert_eq!(handle.get(), Rgba::RED);
        assert!(color.as_position().is_none());
    }

    #[test]
    fn test_shared_position() {
        let pos = SharedPosition::new(Vec3::zero());
        pos.set_position(Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(pos.position(), Vec3::new(1.0, 0.0, 0.0));
        assert!(pos.as_color().is_none());
    }

    #[test]
    fn test_alpha_group_reads_white_and_writes_alpha() {
        let group = AlphaGroup::new(0.4);
        assert_eq!(group.color(), Rgba::new(1.0, 1.0, 1.0, 0.4));

        group.set_color(Rgba::new(0.0, 0.0, 0.0, 0.8));
        assert_eq!(group.alpha(), 0.8);
        assert_eq!(group.color(), Rgba::new(1.0, 1.0, 1.0, 0.8));

        group.set_color(Rgba::new(0.0, 0.0, 0.0, 1.5));
        assert_eq!(group.alpha(), 1.0);
    }

    #[test]
    fn test_sprite_carries_both_domains() {
        let sprite = Sprite::new("hero")
            .with_color(Rgba::BLUE)
            .with_position(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(sprite.label(), "hero");
        assert_eq!(sprite.as_color().unwrap().color(), Rgba::BLUE);
        assert_eq!(
            sprite.as_position().unwrap().position(),
            Vec3::new(1.0, 2.0, 3.0)
        );

        sprite.set_position(Vec3::zero());
        assert_eq!(sprite.snapshot().position, Vec3::zero());
        assert_eq!(sprite.snapshot().color, Rgba::BLUE);
    }
}
