//! Rapier adapters для collaborator traits колеса
//!
//! - `RapierGroundQuery`: raycast через RapierContext (sensors игнорируются,
//!   собственный кузов исключён, фильтр по CollisionGroups)
//! - `BodyForceSink`: силы копятся в `WheelForceAccumulator`, скорость
//!   точки считается из `Velocity` + world центра масс

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::config::GroundLayers;
use super::contact::{CollisionQuery, GroundPlane, RayHit};
use super::driver::RigidBodyCollaborator;

/// Raycast колеса в Rapier world
pub struct RapierGroundQuery<'c, 'w> {
    pub context: &'c RapierContext<'w>,
    /// Кузов, к которому прикреплено колесо (его коллайдеры не "земля")
    pub vehicle_body: Entity,
}

impl CollisionQuery for RapierGroundQuery<'_, '_> {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: GroundLayers,
    ) -> Option<RayHit> {
        let filter = QueryFilter::new()
            .exclude_sensors()
            .exclude_rigid_body(self.vehicle_body)
            .groups(CollisionGroups::new(Group::ALL, Group::from_bits_truncate(layers.0)));

        let (collider, hit) = self
            .context
            .cast_ray_and_get_normal(origin, direction, max_distance, true, filter)?;

        Some(RayHit {
            distance: hit.time_of_impact,
            normal: hit.normal,
            point: hit.point,
            collider: Some(collider),
        })
    }
}

/// Откуда колёса берут землю в этом step'е
pub enum GroundSource<'c, 'w> {
    Rapier(RapierGroundQuery<'c, 'w>),
    /// Headless плоскость (без Rapier)
    Plane(GroundPlane),
    /// Collision world недоступен: всегда NotGrounded
    Unavailable,
}

impl CollisionQuery for GroundSource<'_, '_> {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: GroundLayers,
    ) -> Option<RayHit> {
        match self {
            GroundSource::Rapier(query) => query.cast_ray(origin, direction, max_distance, layers),
            GroundSource::Plane(plane) => plane.cast_ray(origin, direction, max_distance, layers),
            GroundSource::Unavailable => None,
        }
    }
}

/// Аккумулятор сил колёс на кузове
///
/// Колёса суммируют сюда (порядок не важен), `flush_wheel_forces`
/// переносит сумму в Rapier `ExternalForce` и обнуляет.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct WheelForceAccumulator {
    pub force: Vec3,
    /// Момент относительно world центра масс
    pub torque: Vec3,
}

impl WheelForceAccumulator {
    pub fn add_force_at_point(&mut self, force: Vec3, point: Vec3, center_of_mass: Vec3) {
        self.force += force;
        self.torque += (point - center_of_mass).cross(force);
    }
}

/// Rigid body collaborator поверх ECS компонентов кузова
pub struct BodyForceSink<'a> {
    pub accumulator: &'a mut WheelForceAccumulator,
    pub center_of_mass: Vec3,
    pub linvel: Vec3,
    pub angvel: Vec3,
}

impl<'a> BodyForceSink<'a> {
    pub fn new(
        accumulator: &'a mut WheelForceAccumulator,
        body_transform: &GlobalTransform,
        velocity: Option<&Velocity>,
        mass: Option<&ReadMassProperties>,
    ) -> Self {
        // Масса ещё не посчитана (или тело без коллайдеров): центр тела
        let center_of_mass = mass
            .map(|mass| body_transform.transform_point(mass.get().local_center_of_mass))
            .unwrap_or_else(|| body_transform.translation());

        let (linvel, angvel) = velocity
            .map(|velocity| (velocity.linvel, velocity.angvel))
            .unwrap_or((Vec3::ZERO, Vec3::ZERO));

        Self {
            accumulator,
            center_of_mass,
            linvel,
            angvel,
        }
    }
}

impl RigidBodyCollaborator for BodyForceSink<'_> {
    fn add_force_at_point(&mut self, force: Vec3, point: Vec3) {
        self.accumulator
            .add_force_at_point(force, point, self.center_of_mass);
    }

    fn point_velocity(&self, point: Vec3) -> Vec3 {
        self.linvel + self.angvel.cross(point - self.center_of_mass)
    }
}
