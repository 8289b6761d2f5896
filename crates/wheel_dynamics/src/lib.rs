//! Wheel Dynamics Core
//!
//! Per-wheel подвеска и контакт с землёй для vehicle симуляции на Bevy 0.16.
//!
//! Архитектура:
//! - Чистая логика колеса (raycast контакт, spring-damper, ground frame,
//!   tire model): без ECS, детерминистичная, тестируется напрямую
//! - ECS слой: компоненты колеса, FixedUpdate системы, Rapier adapters
//! - Rapier владеет интеграцией тела, колесо только прикладывает силы

use bevy::prelude::*;

pub mod logger;
pub mod wheel;

// Re-export базовых типов для удобства
pub use logger::{init_logger, log, log_error, log_info, log_warning, set_log_level, LogLevel};
pub use wheel::{
    attach_wheel, probe, steered_basis, CollisionQuery, ContactSample, ForceOutput, GroundFrame,
    GroundLayers, GroundPlane, HeadlessGround, LinearTireModel, NullTireModel, RayHit,
    RigidBodyCollaborator, SlipVelocity, SuspensionOutput, SuspensionPhase, SuspensionState,
    TireForces, TireModel, TireModelSelection, Wheel, WheelBasis, WheelConfig, WheelContactChanged, WheelDisabled, WheelForceAccumulator, WheelInput,
    WheelModel, WheelPhysicsPlugin, WheelPhysicsSet, WheelPose, WheelSetupError, WheelStepReport,
};

/// Частота fixed step'а симуляции (50Hz)
pub const FIXED_STEP_HZ: f64 = 50.0;

/// Главный plugin симуляции
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 50Hz для подвески
            .insert_resource(Time::<Fixed>::from_hz(FIXED_STEP_HZ))
            .add_plugins(WheelPhysicsPlugin);
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Rapier не подключается: тесты и headless прогоны дают землю через
/// `HeadlessGround` или оставляют колёса в воздухе.
pub fn create_headless_app() -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(Time::<Fixed>::from_hz(FIXED_STEP_HZ));

    app
}
