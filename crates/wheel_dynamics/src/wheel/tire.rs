//! Tire force model: slip + load → продольная/боковая сила
//!
//! По умолчанию стоит `NullTireModel` (всегда 0): placeholder, не баг.
//! Отличить его от реального "нет скольжения" можно через
//! `TireModel::is_placeholder()`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::config::WheelInput;
use super::ground_frame::SlipVelocity;

/// Сила шины в ground frame (N)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TireForces {
    pub forward: f32,
    pub right: f32,
}

pub trait TireModel {
    fn compute_forces(&self, slip: SlipVelocity, load: f32, input: &WheelInput) -> TireForces;

    /// true для заглушки (ноль не означает отсутствие скольжения)
    fn is_placeholder(&self) -> bool {
        false
    }
}

/// Заглушка: сил трения нет
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NullTireModel;

impl TireModel for NullTireModel {
    fn compute_forces(&self, _slip: SlipVelocity, _load: f32, _input: &WheelInput) -> TireForces {
        TireForces::default()
    }

    fn is_placeholder(&self) -> bool {
        true
    }
}

/// Линейное трение с насыщением по кругу Кулона (per-axis)
///
/// force_axis = -clamp(stiffness_axis * slip_axis, -μ·load, μ·load)
///
/// Противодействует скольжению, не больше μ·load. Нет нагрузки: нет сил.
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearTireModel {
    /// N на 1 m/s продольного скольжения
    pub longitudinal_stiffness: f32,
    /// N на 1 m/s бокового скольжения
    pub lateral_stiffness: f32,
    /// Коэффициент трения μ
    pub friction_coefficient: f32,
}

impl Default for LinearTireModel {
    fn default() -> Self {
        Self {
            longitudinal_stiffness: 1_500.0,
            lateral_stiffness: 3_000.0,
            friction_coefficient: 1.0,
        }
    }
}

impl TireModel for LinearTireModel {
    fn compute_forces(&self, slip: SlipVelocity, load: f32, _input: &WheelInput) -> TireForces {
        let limit = (self.friction_coefficient * load).max(0.0);
        if !limit.is_finite() || limit == 0.0 {
            return TireForces::default();
        }

        let axis = |stiffness: f32, speed: f32| {
            let force = -(stiffness * speed).clamp(-limit, limit);
            if force.is_finite() {
                force
            } else {
                0.0
            }
        };

        TireForces {
            forward: axis(self.longitudinal_stiffness, slip.forward),
            right: axis(self.lateral_stiffness, slip.right),
        }
    }
}

/// Какая tire model используется всеми колёсами (Bevy resource)
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum TireModelSelection {
    #[default]
    Null,
    Linear(LinearTireModel),
}

impl TireModel for TireModelSelection {
    fn compute_forces(&self, slip: SlipVelocity, load: f32, input: &WheelInput) -> TireForces {
        match self {
            TireModelSelection::Null => NullTireModel.compute_forces(slip, load, input),
            TireModelSelection::Linear(model) => model.compute_forces(slip, load, input),
        }
    }

    fn is_placeholder(&self) -> bool {
        match self {
            TireModelSelection::Null => NullTireModel.is_placeholder(),
            TireModelSelection::Linear(model) => model.is_placeholder(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slip(forward: f32, right: f32) -> SlipVelocity {
        SlipVelocity { forward, right }
    }

    #[test]
    fn test_null_model_always_zero() {
        let input = WheelInput {
            motor_torque: 400.0,
            ..default()
        };

        let forces = NullTireModel.compute_forces(slip(12.0, -3.0), 7000.0, &input);

        assert_eq!(forces, TireForces::default());
        assert!(NullTireModel.is_placeholder());
    }

    #[test]
    fn test_linear_model_opposes_slip() {
        let model = LinearTireModel::default();

        let forces = model.compute_forces(slip(0.5, -0.2), 7000.0, &WheelInput::default());

        // 1500 * 0.5 = 750, 3000 * 0.2 = 600: ниже лимита 7000
        assert!((forces.forward + 750.0).abs() < 1e-3);
        assert!((forces.right - 600.0).abs() < 1e-3);
        assert!(!model.is_placeholder());
    }

    #[test]
    fn test_linear_model_saturates_at_friction_limit() {
        let model = LinearTireModel {
            friction_coefficient: 0.8,
            ..default()
        };

        let forces = model.compute_forces(slip(100.0, -100.0), 1000.0, &WheelInput::default());

        assert!((forces.forward + 800.0).abs() < 1e-3);
        assert!((forces.right - 800.0).abs() < 1e-3);
    }

    #[test]
    fn test_linear_model_no_load_no_force() {
        let model = LinearTireModel::default();

        let forces = model.compute_forces(slip(5.0, 5.0), 0.0, &WheelInput::default());

        assert_eq!(forces, TireForces::default());
    }

    #[test]
    fn test_selection_delegates() {
        assert!(TireModelSelection::default().is_placeholder());

        let linear = TireModelSelection::Linear(LinearTireModel::default());
        assert!(!linear.is_placeholder());

        let forces = linear.compute_forces(slip(1.0, 0.0), 5000.0, &WheelInput::default());
        assert!(forces.forward < 0.0);
    }

    #[test]
    fn test_selection_from_json() {
        let selection: TireModelSelection =
            serde_json::from_str(r#"{ "Linear": { "friction_coefficient": 0.8 } }"#).unwrap();

        let TireModelSelection::Linear(model) = selection else {
            panic!("expected linear model, got {:?}", selection);
        };
        assert_eq!(model.friction_coefficient, 0.8);
        assert_eq!(model.lateral_stiffness, LinearTireModel::default().lateral_stiffness);
    }
}
