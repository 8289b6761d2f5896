//! Конфиг колеса и per-step input
//!
//! WheelConfig: immutable после создания колеса (загружается asset-слоем
//! через serde). WheelInput: пишется снаружи каждый tick (driver/AI).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::WheelSetupError;

/// Битовая маска слоёв, которые считаются "землёй" для raycast колеса
///
/// Совпадает по смыслу с Rapier `Group` bits (u32).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroundLayers(pub u32);

impl GroundLayers {
    pub const ALL: Self = Self(u32::MAX);
    pub const NONE: Self = Self(0);

    /// Пересекается ли маска с membership коллайдера
    pub fn intersects(self, memberships: GroundLayers) -> bool {
        self.0 & memberships.0 != 0
    }
}

impl Default for GroundLayers {
    fn default() -> Self {
        Self::ALL
    }
}

/// Параметры колеса и подвески
///
/// Инварианты (проверяются в `validate`):
/// - radius > 0
/// - suspension_travel ≥ 0
/// - spring_rate ≥ 0, damper_rate ≥ 0
/// - всё конечное (без NaN/Inf)
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelConfig {
    /// Радиус колеса (метры), offset контакта от конца подвески
    pub radius: f32,
    /// Максимальный ход подвески (метры)
    pub suspension_travel: f32,
    /// Жёсткость пружины (N/m)
    pub spring_rate: f32,
    /// Демпфирование (N·s/m)
    pub damper_rate: f32,
    /// Какие слои считаются землёй
    pub ground_layers: GroundLayers,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            radius: 0.34,
            suspension_travel: 0.5,
            spring_rate: 50_000.0,
            damper_rate: 2_500.0,
            ground_layers: GroundLayers::ALL,
        }
    }
}

impl WheelConfig {
    pub fn validate(&self) -> Result<(), WheelSetupError> {
        let checks = [
            ("radius", self.radius, self.radius > 0.0),
            ("suspension_travel", self.suspension_travel, self.suspension_travel >= 0.0),
            ("spring_rate", self.spring_rate, self.spring_rate >= 0.0),
            ("damper_rate", self.damper_rate, self.damper_rate >= 0.0),
        ];

        for (field, value, in_range) in checks {
            if !value.is_finite() || !in_range {
                return Err(WheelSetupError::InvalidConfig { field, value });
            }
        }

        Ok(())
    }

    /// Длина raycast'а от mount'а: полный ход подвески + радиус
    pub fn probe_length(&self) -> f32 {
        self.suspension_travel + self.radius
    }
}

/// Per-step input колеса (пишется driver'ом / AI каждый tick)
///
/// Подвеска и контакт читают только `steer_angle`. Остальное уходит
/// в TireModel как есть.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct WheelInput {
    /// Момент двигателя (N·m)
    pub motor_torque: f32,
    /// Тормозной момент (N·m)
    pub brake_torque: f32,
    /// Угол поворота (градусы, вокруг local up, + = влево). Не wrap'ается.
    pub steer_angle: f32,
    /// Угловая скорость колеса (rad/s)
    pub angular_velocity: f32,
}
