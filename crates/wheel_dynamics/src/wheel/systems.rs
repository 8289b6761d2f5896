//! ECS слой колёс: компоненты, spawn helper, FixedUpdate системы
//!
//! Колесо: отдельная entity (ChildOf кузова), поза берётся из её
//! GlobalTransform. Кузов: Rapier RigidBody с `WheelForceAccumulator`
//! и `ExternalForce`.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::config::{WheelConfig, WheelInput};
use super::contact::GroundPlane;
use super::driver::WheelModel;
use super::error::WheelSetupError;
use super::rapier::{BodyForceSink, GroundSource, RapierGroundQuery, WheelForceAccumulator};
use super::steering::WheelPose;
use super::suspension::SuspensionPhase;
use super::tire::TireModelSelection;
use crate::logger;

/// Колесо на кузове `body`
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(WheelInput)]
pub struct Wheel {
    /// Entity кузова (RigidBody), получает силы
    pub body: Entity,
    model: WheelModel,
}

impl Wheel {
    pub fn model(&self) -> &WheelModel {
        &self.model
    }
}

/// Колесо отключено: кузов потерял RigidBody (fatal, повторно не включается)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct WheelDisabled;

/// Headless земля: если ресурс есть, Rapier не опрашивается
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct HeadlessGround(pub GroundPlane);

/// Событие: колесо коснулось земли / оторвалось
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct WheelContactChanged {
    pub wheel: Entity,
    pub body: Entity,
    pub phase: SuspensionPhase,
    /// Коллайдер земли при касании (None при отрыве и для HeadlessGround)
    pub ground: Option<Entity>,
}

/// Прикрепить колесо к кузову
///
/// Кузов обязан существовать и иметь RigidBody: иначе колесо не создаётся
/// (вместо живого-но-сломанного колеса). На кузов добавляются
/// `WheelForceAccumulator` + `ExternalForce`, если их ещё нет.
pub fn attach_wheel(
    world: &mut World,
    body: Entity,
    mount: Transform,
    config: WheelConfig,
) -> Result<Entity, WheelSetupError> {
    let Ok(body_ref) = world.get_entity(body) else {
        logger::log_warning(&format!("Wheel not attached: body {:?} does not exist", body));
        return Err(WheelSetupError::MissingBodyEntity(body));
    };

    if !body_ref.contains::<RigidBody>() {
        logger::log_warning(&format!("Wheel not attached: body {:?} has no RigidBody", body));
        return Err(WheelSetupError::MissingRigidBody(body));
    }

    let model = WheelModel::new(config)?;

    world
        .entity_mut(body)
        .insert_if_new((WheelForceAccumulator::default(), ExternalForce::default()));

    let wheel = world.spawn((Wheel { body, model }, mount, ChildOf(body))).id();

    logger::log_info(&format!("Wheel {:?} attached to body {:?}", wheel, body));
    Ok(wheel)
}

/// Система: проверка кузовов перед step'ом
///
/// - кузов без RigidBody (или despawn) → колесо получает WheelDisabled + warning
/// - кузов без аккумулятора (колесо заспавнено руками) → добавляем
pub fn prepare_wheel_bodies(
    mut commands: Commands,
    wheels: Query<(Entity, &Wheel), Without<WheelDisabled>>,
    bodies: Query<Has<WheelForceAccumulator>, With<RigidBody>>,
) {
    for (entity, wheel) in wheels.iter() {
        match bodies.get(wheel.body) {
            Ok(true) => {}
            Ok(false) => {
                commands
                    .entity(wheel.body)
                    .insert_if_new((WheelForceAccumulator::default(), ExternalForce::default()));
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Disabling wheel {:?}: body {:?} has no RigidBody",
                    entity, wheel.body
                ));
                commands.entity(entity).insert(WheelDisabled);
            }
        }
    }
}

/// Система: fixed step всех активных колёс
///
/// dt читается из Time<Fixed> каждый раз (не кэшируется).
/// Нет Rapier контекста и нет HeadlessGround → все колёса в воздухе.
pub fn step_wheels(
    rapier_context: ReadRapierContext,
    headless_ground: Option<Res<HeadlessGround>>,
    time: Res<Time<Fixed>>,
    tire_model: Res<TireModelSelection>,
    mut wheels: Query<(Entity, &mut Wheel, &WheelInput, &GlobalTransform), Without<WheelDisabled>>,
    mut bodies: Query<
        (
            &GlobalTransform,
            &mut WheelForceAccumulator,
            Option<&Velocity>,
            Option<&ReadMassProperties>,
        ),
        Without<Wheel>,
    >,
    mut contact_events: EventWriter<WheelContactChanged>,
) {
    let dt = time.delta_secs();
    let context = rapier_context.single().ok();

    for (entity, mut wheel, input, transform) in wheels.iter_mut() {
        let body = wheel.body;
        // Аккумулятор уже вставлен prepare_wheel_bodies (её commands применены
        // до этой системы в том же tick'е), пропускаем только кузов без GlobalTransform
        let Ok((body_transform, mut accumulator, velocity, mass)) = bodies.get_mut(body) else {
            continue;
        };

        let ground = match (&headless_ground, &context) {
            (Some(headless), _) => GroundSource::Plane(headless.0),
            (None, Some(context)) => GroundSource::Rapier(RapierGroundQuery {
                context,
                vehicle_body: body,
            }),
            (None, None) => GroundSource::Unavailable,
        };

        let mut sink = BodyForceSink::new(&mut accumulator, body_transform, velocity, mass);

        let report = wheel.model.step(
            &WheelPose::from(transform),
            input,
            dt,
            &ground,
            &mut sink,
            &*tire_model,
        );

        if let Some(phase) = report.suspension.transition {
            logger::log(&format!("Wheel {:?} {:?} (body {:?})", entity, phase, body));
            contact_events.write(WheelContactChanged {
                wheel: entity,
                body,
                phase,
                ground: report.contact.collider(),
            });
        }
    }
}

/// Система: аккумулятор → Rapier ExternalForce, затем обнуление
///
/// ExternalForce кузова с колёсами принадлежит этой системе целиком.
pub fn flush_wheel_forces(mut bodies: Query<(&mut WheelForceAccumulator, &mut ExternalForce)>) {
    for (mut accumulator, mut external) in bodies.iter_mut() {
        external.force = accumulator.force;
        external.torque = accumulator.torque;
        *accumulator = WheelForceAccumulator::default();
    }
}
