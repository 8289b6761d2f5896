//! Step driver: один fixed step одного колеса
//!
//! Порядок (строго):
//! 1. probe контакта
//! 2. steered basis
//! 3. suspension solve (нужна дистанция контакта)
//! 4. suspension force → кузов (в точке mount'а, вдоль wheel up)
//! 5. ground frame + slip (нули в воздухе)
//! 6. tire model
//! 7. friction force → кузов (в точке контакта; в воздухе не вызывается)
//!
//! Между step'ами живёт только `SuspensionState`. Всё остальное,
//! локальные значения, возвращаются в `WheelStepReport`.

use bevy::prelude::*;

use super::config::{WheelConfig, WheelInput};
use super::contact::{probe, CollisionQuery, ContactSample};
use super::error::WheelSetupError;
use super::ground_frame::{GroundFrame, SlipVelocity};
use super::steering::{steered_basis, WheelBasis, WheelPose};
use super::suspension::{SuspensionOutput, SuspensionState};
use super::tire::{TireForces, TireModel};

/// Rigid body collaborator (владеет интеграцией, массой, инерцией)
///
/// Несколько колёс пишут в одно тело: суммирование сил должно быть
/// коммутативным.
pub trait RigidBodyCollaborator {
    fn add_force_at_point(&mut self, force: Vec3, point: Vec3);

    /// World скорость материальной точки тела, совпадающей с `point`
    fn point_velocity(&self, point: Vec3) -> Vec3;
}

/// Силы, отданные телу за step (не хранятся)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceOutput {
    /// Вдоль wheel up, приложена в mount'е
    pub suspension_force: Vec3,
    pub suspension_point: Vec3,
    /// В ground plane; ноль в воздухе
    pub friction_force: Vec3,
    /// Точка контакта, None в воздухе
    pub friction_point: Option<Vec3>,
    /// max(suspension force, 0)
    pub load: f32,
}

/// Всё, что step насчитал (для тестов, телеметрии, debug overlay)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelStepReport {
    pub contact: ContactSample,
    pub basis: WheelBasis,
    pub ground: GroundFrame,
    pub slip: SlipVelocity,
    pub suspension: SuspensionOutput,
    pub tire: TireForces,
    pub forces: ForceOutput,
    /// Tire model: заглушка (нулевое трение не физическое)
    pub tire_placeholder: bool,
}

/// Модель одного колеса: конфиг + история подвески
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct WheelModel {
    config: WheelConfig,
    suspension: SuspensionState,
}

impl WheelModel {
    pub fn new(config: WheelConfig) -> Result<Self, WheelSetupError> {
        config.validate()?;

        Ok(Self {
            config,
            suspension: SuspensionState::default(),
        })
    }

    /// Модель с заранее известной историей подвески
    pub fn with_suspension(config: WheelConfig, suspension: SuspensionState) -> Result<Self, WheelSetupError> {
        config.validate()?;

        Ok(Self { config, suspension })
    }

    pub fn config(&self) -> &WheelConfig {
        &self.config
    }

    pub fn suspension(&self) -> &SuspensionState {
        &self.suspension
    }

    pub fn step<Q, B, T>(
        &mut self,
        pose: &WheelPose,
        input: &WheelInput,
        dt: f32,
        collision: &Q,
        body: &mut B,
        tire_model: &T,
    ) -> WheelStepReport
    where
        Q: CollisionQuery + ?Sized,
        B: RigidBodyCollaborator + ?Sized,
        T: TireModel + ?Sized,
    {
        let contact = probe(
            collision,
            pose.position,
            pose.down(),
            self.config.probe_length(),
            self.config.ground_layers,
        );

        let basis = steered_basis(pose.rotation, input.steer_angle);

        let suspension = self.suspension.solve(&self.config, &contact, dt);

        let suspension_force = finite_or_zero(basis.up * suspension.force);
        body.add_force_at_point(suspension_force, pose.position);

        let (ground, slip) = match contact {
            ContactSample::Grounded { normal, point, .. } => {
                let ground = GroundFrame::from_contact(normal, &basis);
                let velocity = finite_or_zero(body.point_velocity(point));
                (ground, ground.project(velocity))
            }
            ContactSample::NotGrounded => (GroundFrame::ZERO, SlipVelocity::default()),
        };

        let tire = tire_model.compute_forces(slip, suspension.load, input);

        let (friction_force, friction_point) = match contact.point() {
            Some(point) => {
                let force = finite_or_zero(ground.forward * tire.forward + ground.right * tire.right);
                body.add_force_at_point(force, point);
                (force, Some(point))
            }
            None => (Vec3::ZERO, None),
        };

        WheelStepReport {
            contact,
            basis,
            ground,
            slip,
            suspension,
            tire,
            forces: ForceOutput {
                suspension_force,
                suspension_point: pose.position,
                friction_force,
                friction_point,
                load: suspension.load,
            },
            tire_placeholder: tire_model.is_placeholder(),
        }
    }
}

fn finite_or_zero(v: Vec3) -> Vec3 {
    if v.is_finite() {
        v
    } else {
        Vec3::ZERO
    }
}
