//! Ошибки конструирования колеса
//!
//! Runtime аномалии (потеря контакта, вырожденная геометрия, dt = 0)
//! ошибками НЕ являются: они моделируются состоянием. Сюда попадает
//! только то, что делает колесо нерабочим с момента создания.

use bevy::prelude::Entity;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WheelSetupError {
    /// Параметр конфига вне допустимого диапазона (или NaN/Inf)
    #[error("invalid wheel config: {field} = {value}")]
    InvalidConfig { field: &'static str, value: f32 },

    /// Entity кузова не существует
    #[error("wheel body entity {0} does not exist")]
    MissingBodyEntity(Entity),

    /// Entity кузова существует, но без RigidBody: колесу некуда прикладывать силы
    #[error("wheel body entity {0} has no rigid body")]
    MissingRigidBody(Entity),
}
