//! Headless прогон одного колеса
//!
//! Quarter-car drop test: точечная масса на одном колесе падает на плоскость
//! и оседает на подвеске. Печатает высоту mount'а и нагрузку.

use bevy::prelude::*;
use wheel_dynamics::{
    init_logger, log_info, GroundPlane, NullTireModel, RigidBodyCollaborator, WheelConfig,
    WheelInput, WheelModel, WheelPose, FIXED_STEP_HZ,
};

const QUARTER_MASS: f32 = 350.0; // кг, четверть легковушки
const GRAVITY: f32 = -9.81;

/// Точечная масса, интегрируем только вертикаль (semi-implicit Euler)
struct QuarterCar {
    position: Vec3,
    velocity: Vec3,
    force: Vec3,
}

impl RigidBodyCollaborator for QuarterCar {
    fn add_force_at_point(&mut self, force: Vec3, _point: Vec3) {
        self.force += force;
    }

    fn point_velocity(&self, _point: Vec3) -> Vec3 {
        self.velocity
    }
}

impl QuarterCar {
    fn integrate(&mut self, dt: f32) {
        let acceleration = self.force / QUARTER_MASS + Vec3::Y * GRAVITY;
        self.velocity += acceleration * dt;
        self.position += self.velocity * dt;
        self.force = Vec3::ZERO;
    }
}

fn main() {
    init_logger();

    let config = WheelConfig::default();
    let mut wheel = match WheelModel::new(config) {
        Ok(wheel) => wheel,
        Err(err) => {
            wheel_dynamics::log_error(&format!("Invalid wheel config: {}", err));
            return;
        }
    };

    let ground = GroundPlane::horizontal(0.0);
    let input = WheelInput::default();
    let dt = (1.0 / FIXED_STEP_HZ) as f32;

    let mut car = QuarterCar {
        position: Vec3::new(0.0, 1.2, 0.0),
        velocity: Vec3::ZERO,
        force: Vec3::ZERO,
    };

    log_info(&format!(
        "Starting quarter-car drop test (mass {} kg, dt {:.3}s)",
        QUARTER_MASS, dt
    ));

    // 5 секунд симуляции
    for tick in 0..250 {
        let pose = WheelPose::new(car.position, Quat::IDENTITY);
        let report = wheel.step(&pose, &input, dt, &ground, &mut car, &NullTireModel);
        car.integrate(dt);

        if tick % 25 == 0 {
            log_info(&format!(
                "Tick {}: height {:.3}m, compression {:.3}m, load {:.0}N, {:?}",
                tick,
                car.position.y,
                report.suspension.compression,
                report.forces.load,
                report.suspension.phase,
            ));
        }
    }

    log_info(&format!(
        "Settled at {:.3}m (static load {:.0}N)",
        car.position.y,
        -QUARTER_MASS * GRAVITY
    ));
}
