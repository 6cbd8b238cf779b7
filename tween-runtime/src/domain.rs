//! # Domain 模块
//!
//! 属性域（颜色、位置）的统一读写入口，系统的通用流程按属性域泛型化。

use crate::registry::{AnimationRegistry, Registries};
use crate::traits::Animatable;
use crate::value::{Rgba, TweenValue, Vec3};

pub(crate) trait PropertyDomain: 'static {
    type Value: TweenValue;

    /// 诊断中使用的属性域名称
    const NAME: &'static str;

    /// 对象不支持该属性域时返回 `None`
    fn read(object: &dyn Animatable) -> Option<Self::Value>;

    /// 写入成功返回 `true`
    fn write(object: &dyn Animatable, value: Self::Value) -> bool;

    fn registry(registries: &Registries) -> &AnimationRegistry<Self::Value>;

    fn registry_mut(registries: &mut Registries) -> &mut AnimationRegistry<Self::Value>;
}

pub(crate) struct ColorDomain;

impl PropertyDomain for ColorDomain {
    type Value = Rgba;

    const NAME: &'static str = "color";

    fn read(object: &dyn Animatable) -> Option<Rgba> {
        object.as_color().map(|carrier| carrier.color())
    }

    fn write(object: &dyn Animatable, value: Rgba) -> bool {
        match object.as_color() {
            Some(carrier) => {
                carrier.set_color(value);
                true
            }
            None => false,
        }
    }

    fn registry(registries: &Registries) -> &AnimationRegistry<Rgba> {
        &registries.colors
    }

    fn registry_mut(registries: &mut Registries) -> &mut AnimationRegistry<Rgba> {
        &mut registries.colors
    }
}

pub(crate) struct PositionDomain;

impl PropertyDomain for PositionDomain {
    type Value = Vec3;

    const NAME: &'static str = "position";

    fn read(object: &dyn Animatable) -> Option<Vec3> {
        object.as_position().map(|carrier| carrier.position())
    }

    fn write(object: &dyn Animatable, value: Vec3) -> bool {
        match object.as_position() {
            Some(carrier) => {
                carrier.set_position(value);
                true
            }
            None => false,
        }
    }

    fn registry(registries: &Registries) -> &AnimationRegistry<Vec3> {
        &registries.positions
    }

    fn registry_mut(registries: &mut Registries) -> &mut AnimationRegistry<Vec3> {
        &mut registries.positions
    }
}
