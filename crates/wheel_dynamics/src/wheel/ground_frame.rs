//! Ground frame: forward/right касательные к земле, выровненные по колесу
//!
//! На склоне/вираже slip скорости меряются в плоскости контакта, а не
//! в world XZ. Right-handed вариант (Bevy):
//! - ground_forward = normalize(cross(n, wheel_right))
//! - ground_right   = normalize(cross(wheel_forward, n))
//!
//! На ровной земле с прямым колесом это ровно wheel_forward / wheel_right.
//! Вырожденный cross (n ∥ оси) даёт нулевой вектор, не NaN.

use bevy::prelude::*;

use super::steering::WheelBasis;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundFrame {
    pub forward: Vec3,
    pub right: Vec3,
}

/// Скорость точки контакта в ground frame (m/s)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SlipVelocity {
    /// Продольная (вдоль ground_forward)
    pub forward: f32,
    /// Боковая (вдоль ground_right)
    pub right: f32,
}

impl GroundFrame {
    /// Frame в воздухе: нет нормали, нет плоскости
    pub const ZERO: Self = Self {
        forward: Vec3::ZERO,
        right: Vec3::ZERO,
    };

    pub fn from_contact(normal: Vec3, basis: &WheelBasis) -> Self {
        Self {
            forward: normal.cross(basis.right).normalize_or_zero(),
            right: basis.forward.cross(normal).normalize_or_zero(),
        }
    }

    /// Проекция world скорости. Нулевая ось даёт нулевую компоненту.
    pub fn project(&self, velocity: Vec3) -> SlipVelocity {
        SlipVelocity {
            forward: velocity.dot(self.forward),
            right: velocity.dot(self.right),
        }
    }
}
