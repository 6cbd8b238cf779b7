//! # Value 模块
//!
//! 可补间的值类型：RGBA 颜色与三维位置。
//!
//! 两者都支持线性插值与距离度量，距离用于计算“当前值在起止值之间走到了哪一步”。

use std::fmt;

use serde::{Deserialize, Serialize};

/// 可补间值
pub trait TweenValue: Copy + PartialEq + fmt::Debug + 'static {
    /// 线性插值，`t` 为 0 时返回 `self`，为 1 时返回 `other`
    fn lerp(self, other: Self, t: f32) -> Self;

    /// 与另一个值之间的距离（非负）
    fn distance(self, other: Self) -> f32;
}

/// RGBA 颜色，每个通道在 0.0 - 1.0 之间
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);
    pub const RED: Rgba = Rgba::new(1.0, 0.0, 0.0, 1.0);
    pub const GREEN: Rgba = Rgba::new(0.0, 1.0, 0.0, 1.0);
    pub const BLUE: Rgba = Rgba::new(0.0, 0.0, 1.0, 1.0);
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);

    /// 创建新的颜色
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// 替换 alpha 通道
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

impl TweenValue for Rgba {
    fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// 各通道差的绝对值之和
    fn distance(self, other: Self) -> f32 {
        (self.r - other.r).abs()
            + (self.g - other.g).abs()
            + (self.b - other.b).abs()
            + (self.a - other.a).abs()
    }
}

impl From<[f32; 4]> for Rgba {
    fn from([r, g, b, a]: [f32; 4]) -> Self {
        Self { r, g, b, a }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rgba({:.3},{:.3},{:.3},{:.3})",
            self.r, self.g, self.b, self.a
        )
    }
}

/// 三维位置
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    /// 创建新的向量
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// 零向量
    pub const fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }
}

impl TweenValue for Vec3 {
    fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }

    /// 欧氏距离
    fn distance(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl From<(f32, f32, f32)> for Vec3 {
    fn from((x, y, z): (f32, f32, f32)) -> Self {
        Self { x, y, z }
    }
}

impl From<Vec3> for (f32, f32, f32) {
    fn from(v: Vec3) -> Self {
        (v.x, v.y, v.z)
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pos({:.3},{:.3},{:.3})", self.x, self.y, self.z)
    }
}

/// 计算 `point` 在 `start` 到 `end` 之间的位置比例
///
/// 返回值截断到 `[0, 1]`；`start == end` 时返回 0。
pub fn interpolation_step<V: TweenValue>(start: V, end: V, point: V) -> f32 {
    if start == end {
        return 0.0;
    }
    let total = start.distance(end);
    if total.is_nan() || total <= 0.0 {
        return 0.0;
    }
    (start.distance(point) / total).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_lerp() {
        let mid = Rgba::WHITE.lerp(Rgba::RED, 0.5);
        assert_eq!(mid, Rgba::new(1.0, 0.5, 0.5, 1.0));
        assert_eq!(Rgba::WHITE.lerp(Rgba::RED, 0.0), Rgba::WHITE);
        assert_eq!(Rgba::WHITE.lerp(Rgba::RED, 1.0), Rgba::RED);
    }

    #[test]
    fn test_rgba_distance() {
        assert_eq!(Rgba::WHITE.distance(Rgba::RED), 2.0);
        assert_eq!(Rgba::RED.distance(Rgba::RED), 0.0);
        assert_eq!(Rgba::WHITE.distance(Rgba::WHITE.with_alpha(0.0)), 1.0);
    }

    #[test]
    fn test_vec3_lerp_and_distance() {
        let a = Vec3::zero();
        let b = Vec3::new(10.0, 0.0, 0.0);
        assert_eq!(a.lerp(b, 0.3), Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(Vec3::new(0.0, 3.0, 4.0).distance(a), 5.0);
    }

    #[test]
    fn test_interpolation_step() {
        let start = Vec3::zero();
        let end = Vec3::new(10.0, 0.0, 0.0);
        assert_eq!(interpolation_step(start, end, Vec3::new(5.0, 0.0, 0.0)), 0.5);
        assert_eq!(interpolation_step(start, end, end), 1.0);
        assert_eq!(interpolation_step(start, end, start), 0.0);
    }

    #[test]
    fn test_interpolation_step_degenerate_and_clamped() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(interpolation_step(p, p, Vec3::zero()), 0.0);

        // 超出终点的值被截断
        let start = Vec3::zero();
        let end = Vec3::new(1.0, 0.0, 0.0);
        assert_eq!(interpolation_step(start, end, Vec3::new(3.0, 0.0, 0.0)), 1.0);

        assert_eq!(
            interpolation_step(Rgba::WHITE, Rgba::RED, Rgba::new(1.0, 0.5, 0.5, 1.0)),
            0.5
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Rgba::RED.to_string(), "rgba(1.000,0.000,0.000,1.000)");
        assert_eq!(Vec3::new(1.0, 2.5, 0.0).to_string(), "pos(1.000,2.500,0.000)");
    }
}
