//! Contact probe: raycast от mount'а колеса вниз
//!
//! Сам raycast делает внешний collision world (Rapier в игре, аналитическая
//! плоскость в headless тестах) через trait `CollisionQuery`.
//! Потеря контакта: нормальное состояние (NotGrounded), не ошибка.

use bevy::prelude::*;

use super::config::GroundLayers;

/// Результат raycast'а от collision world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Расстояние от origin до точки попадания (метры)
    pub distance: f32,
    /// Нормаль поверхности в точке попадания (world space)
    pub normal: Vec3,
    /// Точка попадания (world space)
    pub point: Vec3,
    /// Коллайдер, в который попали (если collision world его знает)
    pub collider: Option<Entity>,
}

/// Collision query collaborator
///
/// Реализация обязана игнорировать non-solid объёмы (sensors/triggers)
/// и возвращать ближайшее попадание в пределах `max_distance`.
pub trait CollisionQuery {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: GroundLayers,
    ) -> Option<RayHit>;
}

/// Недоступный collision world (None) = никогда не попадаем
impl<Q: CollisionQuery> CollisionQuery for Option<Q> {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: GroundLayers,
    ) -> Option<RayHit> {
        self.as_ref()
            .and_then(|query| query.cast_ray(origin, direction, max_distance, layers))
    }
}

/// Бесконечная аналитическая плоскость
///
/// Headless земля: demo binary, тесты, прогон без Rapier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundPlane {
    /// Любая точка на плоскости
    pub origin: Vec3,
    /// Нормаль плоскости (нормализуется при raycast)
    pub normal: Vec3,
    /// Membership слоёв плоскости
    pub layers: GroundLayers,
    /// Sensor/trigger: raycast колеса его не видит
    pub is_sensor: bool,
}

impl GroundPlane {
    /// Горизонтальная плоскость y = height, нормаль +Y
    pub fn horizontal(height: f32) -> Self {
        Self {
            origin: Vec3::new(0.0, height, 0.0),
            normal: Vec3::Y,
            layers: GroundLayers::ALL,
            is_sensor: false,
        }
    }
}

impl CollisionQuery for GroundPlane {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: GroundLayers,
    ) -> Option<RayHit> {
        if self.is_sensor || !layers.intersects(self.layers) {
            return None;
        }

        let normal = self.normal.try_normalize()?;
        let direction = direction.try_normalize()?;

        // Луч параллелен плоскости или смотрит от неё (попадание только в лицевую сторону)
        let denom = direction.dot(normal);
        if denom > -f32::EPSILON {
            return None;
        }

        let distance = (self.origin - origin).dot(normal) / denom;
        if !(0.0..=max_distance).contains(&distance) {
            return None;
        }

        Some(RayHit {
            distance,
            normal,
            point: origin + direction * distance,
            collider: None,
        })
    }
}

/// Результат probe за один step (живёт только внутри step'а)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContactSample {
    Grounded {
        /// Расстояние от mount'а до земли
        distance: f32,
        /// Нормаль земли (unit)
        normal: Vec3,
        /// Точка контакта (world)
        point: Vec3,
        /// Коллайдер земли (None для аналитической плоскости)
        collider: Option<Entity>,
    },
    NotGrounded,
}

impl ContactSample {
    pub fn is_grounded(&self) -> bool {
        matches!(self, ContactSample::Grounded { .. })
    }

    pub fn point(&self) -> Option<Vec3> {
        match *self {
            ContactSample::Grounded { point, .. } => Some(point),
            ContactSample::NotGrounded => None,
        }
    }

    pub fn normal(&self) -> Option<Vec3> {
        match *self {
            ContactSample::Grounded { normal, .. } => Some(normal),
            ContactSample::NotGrounded => None,
        }
    }

    pub fn collider(&self) -> Option<Entity> {
        match *self {
            ContactSample::Grounded { collider, .. } => collider,
            ContactSample::NotGrounded => None,
        }
    }
}

/// Raycast от `origin` вдоль `down` на `max_distance`
///
/// Попадания с NaN/Inf или вырожденной нормалью отбрасываются (NotGrounded),
/// чтобы мусор из collision world не дошёл до сил.
pub fn probe<Q: CollisionQuery + ?Sized>(
    query: &Q,
    origin: Vec3,
    down: Vec3,
    max_distance: f32,
    layers: GroundLayers,
) -> ContactSample {
    let Some(direction) = down.try_normalize() else {
        return ContactSample::NotGrounded;
    };

    if !origin.is_finite() || !max_distance.is_finite() || max_distance <= 0.0 {
        return ContactSample::NotGrounded;
    }

    let Some(hit) = query.cast_ray(origin, direction, max_distance, layers) else {
        return ContactSample::NotGrounded;
    };

    if !hit.distance.is_finite() || hit.distance < 0.0 || hit.distance > max_distance {
        return ContactSample::NotGrounded;
    }

    if !hit.point.is_finite() {
        return ContactSample::NotGrounded;
    }

    let Some(normal) = hit.normal.try_normalize() else {
        return ContactSample::NotGrounded;
    };

    ContactSample::Grounded {
        distance: hit.distance,
        normal,
        point: hit.point,
        collider: hit.collider,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Collision world, который всегда возвращает заранее заданный hit
    struct FixedHit(RayHit);

    impl CollisionQuery for FixedHit {
        fn cast_ray(&self, _: Vec3, _: Vec3, _: f32, _: GroundLayers) -> Option<RayHit> {
            Some(self.0)
        }
    }

    #[test]
    fn test_probe_hits_flat_ground() {
        let ground = GroundPlane::horizontal(0.0);

        let contact = probe(&ground, Vec3::new(1.0, 0.8, 2.0), Vec3::NEG_Y, 0.84, GroundLayers::ALL);

        let ContactSample::Grounded { distance, normal, point, collider } = contact else {
            panic!("expected grounded, got {:?}", contact);
        };
        assert!((distance - 0.8).abs() < 1e-5);
        assert_eq!(normal, Vec3::Y);
        assert!((point - Vec3::new(1.0, 0.0, 2.0)).length() < 1e-5);
        assert_eq!(collider, None);
    }

    #[test]
    fn test_probe_out_of_range_is_not_grounded() {
        let ground = GroundPlane::horizontal(0.0);

        // Mount на 2m над землёй, raycast 0.84m
        let contact = probe(&ground, Vec3::new(0.0, 2.0, 0.0), Vec3::NEG_Y, 0.84, GroundLayers::ALL);

        assert_eq!(contact, ContactSample::NotGrounded);
    }

    #[test]
    fn test_probe_ignores_sensor() {
        let trigger = GroundPlane {
            is_sensor: true,
            ..GroundPlane::horizontal(0.0)
        };

        let contact = probe(&trigger, Vec3::new(0.0, 0.5, 0.0), Vec3::NEG_Y, 0.84, GroundLayers::ALL);

        assert!(!contact.is_grounded());
    }

    #[test]
    fn test_probe_respects_layer_filter() {
        let ground = GroundPlane {
            layers: GroundLayers(0b100),
            ..GroundPlane::horizontal(0.0)
        };
        let origin = Vec3::new(0.0, 0.5, 0.0);

        assert!(!probe(&ground, origin, Vec3::NEG_Y, 0.84, GroundLayers(0b010)).is_grounded());
        assert!(probe(&ground, origin, Vec3::NEG_Y, 0.84, GroundLayers(0b110)).is_grounded());
    }

    #[test]
    fn test_probe_unavailable_collision_world() {
        let missing: Option<GroundPlane> = None;

        let contact = probe(&missing, Vec3::new(0.0, 0.5, 0.0), Vec3::NEG_Y, 0.84, GroundLayers::ALL);

        assert_eq!(contact, ContactSample::NotGrounded);
    }

    #[test]
    fn test_probe_follows_tilted_down_axis() {
        // Mount наклонён: "down" смотрит под 45°, дистанция до земли длиннее
        let ground = GroundPlane::horizontal(0.0);
        let down = Vec3::new(1.0, -1.0, 0.0);

        let contact = probe(&ground, Vec3::new(0.0, 0.5, 0.0), down, 1.0, GroundLayers::ALL);

        let ContactSample::Grounded { distance, .. } = contact else {
            panic!("expected grounded");
        };
        assert!((distance - 0.5 * std::f32::consts::SQRT_2).abs() < 1e-5);
    }

    #[test]
    fn test_probe_rejects_garbage_hit() {
        let nan_hit = FixedHit(RayHit {
            distance: f32::NAN,
            normal: Vec3::Y,
            point: Vec3::ZERO,
            collider: None,
        });
        let zero_normal = FixedHit(RayHit {
            distance: 0.3,
            normal: Vec3::ZERO,
            point: Vec3::ZERO,
            collider: None,
        });

        assert!(!probe(&nan_hit, Vec3::ZERO, Vec3::NEG_Y, 1.0, GroundLayers::ALL).is_grounded());
        assert!(!probe(&zero_normal, Vec3::ZERO, Vec3::NEG_Y, 1.0, GroundLayers::ALL).is_grounded());
    }

    #[test]
    fn test_probe_zero_down_vector() {
        let ground = GroundPlane::horizontal(0.0);
        assert!(!probe(&ground, Vec3::new(0.0, 0.5, 0.0), Vec3::ZERO, 1.0, GroundLayers::ALL).is_grounded());
    }

    #[test]
    fn test_probe_keeps_hit_collider() {
        let ground_collider = Entity::from_raw(7);
        let hit = FixedHit(RayHit {
            distance: 0.5,
            normal: Vec3::Y,
            point: Vec3::new(0.0, -0.5, 0.0),
            collider: Some(ground_collider),
        });

        let contact = probe(&hit, Vec3::ZERO, Vec3::NEG_Y, 1.0, GroundLayers::ALL);

        assert_eq!(contact.collider(), Some(ground_collider));
        assert_eq!(ContactSample::NotGrounded.collider(), None);
    }
}
