//! Wheel physics module
//!
//! Per-wheel raycast подвеска + контакт с землёй:
//! contact probe → steered basis → suspension → ground frame → tire model.
//!
//! Чистая логика (config, contact, steering, suspension, ground_frame,
//! tire, driver) не зависит от ECS и тестируется без App.
//! ECS слой (systems, rapier): компоненты, системы и Rapier adapters.
//!
//! Интеграцию тела (масса, инерция, integration) делает Rapier, колесо
//! только прикладывает силы.

use bevy::prelude::*;
use bevy_rapier3d::plugin::PhysicsSet;

pub mod config;
pub mod contact;
pub mod driver;
pub mod error;
pub mod ground_frame;
pub mod rapier;
pub mod steering;
pub mod suspension;
pub mod systems;
pub mod tire;

// Re-export основных типов
pub use config::{GroundLayers, WheelConfig, WheelInput};
pub use contact::{probe, CollisionQuery, ContactSample, GroundPlane, RayHit};
pub use driver::{ForceOutput, RigidBodyCollaborator, WheelModel, WheelStepReport};
pub use error::WheelSetupError;
pub use ground_frame::{GroundFrame, SlipVelocity};
pub use rapier::{BodyForceSink, GroundSource, RapierGroundQuery, WheelForceAccumulator};
pub use steering::{steered_basis, WheelBasis, WheelPose};
pub use suspension::{SuspensionOutput, SuspensionPhase, SuspensionState, MIN_STEP_DURATION};
pub use systems::{
    attach_wheel, flush_wheel_forces, prepare_wheel_bodies, step_wheels, HeadlessGround, Wheel,
    WheelContactChanged, WheelDisabled,
};
pub use tire::{LinearTireModel, NullTireModel, TireForces, TireModel, TireModelSelection};

/// System set колёс (для ordering снаружи)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct WheelPhysicsSet;

/// Wheel physics Plugin
///
/// Регистрирует системы в FixedUpdate, ДО rapier physics step.
/// Порядок выполнения:
/// 1. prepare_wheel_bodies: отключение колёс без RigidBody, аккумуляторы
/// 2. step_wheels: contact/suspension/friction всех колёс
/// 3. flush_wheel_forces: сумма сил → ExternalForce
pub struct WheelPhysicsPlugin;

impl Plugin for WheelPhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<Wheel>()
            .register_type::<WheelInput>()
            .register_type::<WheelDisabled>()
            .register_type::<WheelForceAccumulator>()
            .add_event::<WheelContactChanged>()
            .init_resource::<TireModelSelection>();

        app.add_systems(
            FixedUpdate,
            (prepare_wheel_bodies, step_wheels, flush_wheel_forces)
                .chain() // Последовательное выполнение (commands применяются между шагами)
                .in_set(WheelPhysicsSet)
                .before(PhysicsSet::SyncBackend),
        );
    }
}
