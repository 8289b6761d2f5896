//! Steered frame: базис колеса (forward/right/up) в world space
//!
//! Конвенция осей Bevy (right-handed): forward = -Z, right = +X, up = +Y.
//! Положительный steer: поворот против часовой вокруг local up (влево).

use bevy::prelude::*;

/// Поза mount'а колеса в world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl WheelPose {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Local → world для направлений (без translation)
    pub fn transform_direction(&self, local: Vec3) -> Vec3 {
        self.rotation * local
    }

    /// Ось raycast'а подвески: local down mount'а
    pub fn down(&self) -> Vec3 {
        self.transform_direction(Vec3::NEG_Y)
    }
}

impl From<&GlobalTransform> for WheelPose {
    fn from(transform: &GlobalTransform) -> Self {
        let (_, rotation, position) = transform.to_scale_rotation_translation();
        Self { position, rotation }
    }
}

/// Ортонормированный базис колеса после поворота руля
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelBasis {
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

/// Базис колеса: mount rotation ∘ поворот на `steer_angle_deg` вокруг local up
///
/// Если нормализация схлопнулась (NaN steer, битый quat): берём
/// не повёрнутую ось mount'а, а если и она вырождена: каноническую.
pub fn steered_basis(mount_rotation: Quat, steer_angle_deg: f32) -> WheelBasis {
    let steered = mount_rotation * Quat::from_rotation_y(steer_angle_deg.to_radians());

    let axis = |local: Vec3| {
        (steered * local)
            .try_normalize()
            .or_else(|| (mount_rotation * local).try_normalize())
            .unwrap_or(local)
    };

    WheelBasis {
        forward: axis(Vec3::NEG_Z),
        right: axis(Vec3::X),
        up: axis(Vec3::Y),
    }
}
