//! Suspension solver: spring-damper подвеска с историей сжатия
//!
//! Две фазы: Grounded и Airborne.
//! - Grounded: compression = clamp(hit_distance - radius, 0, travel)
//! - Airborne: compression = travel (пружина полностью разжата)
//!
//! Сила (каждый step, в обеих фазах: демпфер гасит и переход):
//! force = (travel - current) * spring_rate
//!       + ((previous - current) / dt) * damper_rate
//!
//! "compression" здесь: длина подвески от mount'а до колеса
//! (travel = полностью разжата, 0 = упор).

use bevy::prelude::*;

use super::config::WheelConfig;
use super::contact::ContactSample;

/// dt ниже этого порога считается вырожденным (пауза, первый кадр)
pub const MIN_STEP_DURATION: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum SuspensionPhase {
    Grounded,
    Airborne,
}

/// История подвески (единственное состояние колеса между step'ами)
///
/// Инвариант: current ∈ [0, travel]. На первом step'е previous == current.
#[derive(Debug, Clone, Copy, Default, PartialEq, Reflect)]
pub struct SuspensionState {
    current: f32,
    previous: f32,
    has_history: bool,
    phase: Option<SuspensionPhase>,
}

/// Результат одного solve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuspensionOutput {
    pub phase: SuspensionPhase,
    /// Новое значение compression (уже сохранено в state)
    pub compression: f32,
    pub spring_force: f32,
    pub damper_force: f32,
    /// spring + damper; может быть отрицательной (подвеска тянет)
    pub force: f32,
    /// max(force, 0): нагрузка для tire model
    pub load: f32,
    /// Some(phase) если фаза сменилась относительно прошлого step'а
    pub transition: Option<SuspensionPhase>,
}

impl SuspensionState {
    /// State с уже известной историей (restore, тесты)
    pub fn primed(compression: f32) -> Self {
        Self {
            current: compression,
            previous: compression,
            has_history: true,
            phase: None,
        }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn previous(&self) -> f32 {
        self.previous
    }

    /// None до первого solve
    pub fn phase(&self) -> Option<SuspensionPhase> {
        self.phase
    }

    pub fn solve(&mut self, config: &WheelConfig, contact: &ContactSample, dt: f32) -> SuspensionOutput {
        let (phase, compression) = match *contact {
            ContactSample::Grounded { distance, .. } => (
                SuspensionPhase::Grounded,
                // max/min вместо clamp: невалидный travel (NaN, < 0) не паникует
                (distance - config.radius).max(0.0).min(config.suspension_travel),
            ),
            ContactSample::NotGrounded => (SuspensionPhase::Airborne, config.suspension_travel),
        };

        // Первый step: истории нет, демпфер молчит
        let previous = if self.has_history { self.current } else { compression };

        let spring_force = spring_force(config, compression);
        let damper_force = damper_force(config, previous, compression, dt);
        let force = finite_or_zero(spring_force + damper_force);

        let transition = match self.phase {
            Some(last) if last != phase => Some(phase),
            _ => None,
        };

        self.previous = previous;
        self.current = compression;
        self.has_history = true;
        self.phase = Some(phase);

        SuspensionOutput {
            phase,
            compression,
            spring_force,
            damper_force,
            force,
            load: wheel_load(force),
            transition,
        }
    }
}

/// Линейная пружина от rest length (travel). При compression = travel ровно 0.
pub fn spring_force(config: &WheelConfig, compression: f32) -> f32 {
    (config.suspension_travel - compression) * config.spring_rate
}

/// Backward-difference демпфер. Вырожденный dt → 0 (пропускаем член).
pub fn damper_force(config: &WheelConfig, previous: f32, current: f32, dt: f32) -> f32 {
    if !dt.is_finite() || dt <= MIN_STEP_DURATION {
        return 0.0;
    }

    (previous - current) / dt * config.damper_rate
}

/// Нагрузка на колесо: отрицательной не бывает (колесо отрывается от земли)
pub fn wheel_load(force: f32) -> f32 {
    force.max(0.0)
}

fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grounded_at(distance: f32) -> ContactSample {
        ContactSample::Grounded {
            distance,
            normal: Vec3::Y,
            point: Vec3::ZERO,
            collider: None,
        }
    }

    #[test]
    fn test_first_step_has_no_damping() {
        let config = WheelConfig::default();
        let mut state = SuspensionState::default();

        let output = state.solve(&config, &grounded_at(0.7), 0.02);

        assert_eq!(output.damper_force, 0.0);
        assert_eq!(state.previous(), state.current());
        assert_eq!(output.transition, None);
    }

    #[test]
    fn test_constant_compression_is_spring_only() {
        let config = WheelConfig::default();
        let mut state = SuspensionState::default();

        state.solve(&config, &grounded_at(0.7), 0.02);
        let output = state.solve(&config, &grounded_at(0.7), 0.02);

        // compression = 0.7 - 0.34 = 0.36 → (0.5 - 0.36) * 50000 = 7000
        assert_eq!(output.damper_force, 0.0);
        assert!((output.force - 7000.0).abs() < 0.5, "force = {}", output.force);
        assert_eq!(output.force, output.spring_force);
    }

    #[test]
    fn test_full_extension_has_zero_spring() {
        let config = WheelConfig::default();
        assert_eq!(spring_force(&config, config.suspension_travel), 0.0);
    }

    #[test]
    fn test_airborne_snaps_to_full_travel() {
        let config = WheelConfig::default();
        let mut state = SuspensionState::default();

        let output = state.solve(&config, &ContactSample::NotGrounded, 0.02);

        assert_eq!(output.phase, SuspensionPhase::Airborne);
        assert_eq!(output.compression, config.suspension_travel);
        assert_eq!(output.spring_force, 0.0);
        assert_eq!(output.force, 0.0);
    }

    #[test]
    fn test_compression_clamped_to_travel_range() {
        let config = WheelConfig::default();
        let mut state = SuspensionState::default();

        // Колесо "провалилось" под землю: hit ближе радиуса
        let bottomed = state.solve(&config, &grounded_at(0.1), 0.02);
        assert_eq!(bottomed.compression, 0.0);

        let mut state = SuspensionState::default();
        let extended = state.solve(&config, &grounded_at(0.84), 0.02);
        assert!((extended.compression - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_landing_damps_compression() {
        let config = WheelConfig::default();
        let mut state = SuspensionState::default();

        state.solve(&config, &ContactSample::NotGrounded, 0.02);
        let output = state.solve(&config, &grounded_at(0.8), 0.02);

        // previous 0.5 → current 0.46: damper = (0.04 / 0.02) * 2500 = 5000
        assert!((output.damper_force - 5000.0).abs() < 1.0, "damper = {}", output.damper_force);
        assert_eq!(output.transition, Some(SuspensionPhase::Grounded));
    }

    #[test]
    fn test_extension_produces_negative_force_but_zero_load() {
        let config = WheelConfig::default();
        let mut state = SuspensionState::primed(0.0);

        // Резкое разжатие 0 → 0.5 за один step: демпфер тянет
        let output = state.solve(&config, &ContactSample::NotGrounded, 0.02);

        assert!(output.force < 0.0);
        assert_eq!(output.load, 0.0);
    }

    #[test]
    fn test_zero_dt_skips_damping() {
        let config = WheelConfig::default();
        let mut state = SuspensionState::primed(0.5);

        let output = state.solve(&config, &grounded_at(0.6), 0.0);

        assert_eq!(output.damper_force, 0.0);
        assert!(output.force.is_finite());
        assert!((output.force - output.spring_force).abs() < f32::EPSILON);
    }

    #[test]
    fn test_state_persists_history() {
        let config = WheelConfig::default();
        let mut state = SuspensionState::default();

        state.solve(&config, &grounded_at(0.8), 0.02);
        state.solve(&config, &grounded_at(0.7), 0.02);

        assert!((state.previous() - 0.46).abs() < 1e-6);
        assert!((state.current() - 0.36).abs() < 1e-6);
        assert_eq!(state.phase(), Some(SuspensionPhase::Grounded));
    }

    #[test]
    fn test_takeoff_reports_transition() {
        let config = WheelConfig::default();
        let mut state = SuspensionState::default();

        state.solve(&config, &grounded_at(0.8), 0.02);
        let output = state.solve(&config, &ContactSample::NotGrounded, 0.02);

        assert_eq!(output.transition, Some(SuspensionPhase::Airborne));
    }

    #[test]
    fn test_unvalidated_config_does_not_panic() {
        let broken = [
            WheelConfig {
                suspension_travel: f32::NAN,
                ..default()
            },
            WheelConfig {
                suspension_travel: -1.0,
                ..default()
            },
        ];

        for config in broken {
            let mut state = SuspensionState::default();
            let output = state.solve(&config, &grounded_at(0.7), 0.02);

            assert!(output.force.is_finite());
            assert!(output.load >= 0.0);
        }
    }
}
