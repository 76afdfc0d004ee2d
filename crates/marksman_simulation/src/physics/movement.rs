//! Headless движение hunter'ов
//!
//! В игре `MovementCommand` исполняет хост (navigation + физика). Для headless
//! прогонов (тесты, binary) — прямолинейное движение в плоскости XZ:
//! - MoveToPosition: идём со скоростью `config.move_speed`, по прибытии snap + Idle
//! - Stop: сразу Idle
//!
//! Детерминизм: fixed timestep (64Hz), без RNG.

use bevy::prelude::*;

use crate::components::MovementCommand;
use crate::config::HunterConfig;
use crate::SimulationSet;

/// Система: исполнение MovementCommand без навигации
pub fn drive_headless_movement(
    time: Res<Time<Fixed>>,
    mut query: Query<(&HunterConfig, &mut MovementCommand, &mut Transform)>,
) {
    let delta = time.delta_secs();

    for (config, mut command, mut transform) in query.iter_mut() {
        match *command {
            MovementCommand::Idle => {}
            MovementCommand::Stop => {
                *command = MovementCommand::Idle;
            }
            MovementCommand::MoveToPosition { target } => {
                let position = transform.translation;
                let offset = Vec3::new(target.x - position.x, 0.0, target.z - position.z);
                let distance = offset.length();
                let step = config.move_speed * delta;

                if distance <= step {
                    // Дошли: snap в точку (высоту не трогаем)
                    transform.translation.x = target.x;
                    transform.translation.z = target.z;
                    *command = MovementCommand::Idle;
                    continue;
                }

                let direction = offset / distance;
                transform.translation += direction * step;
                transform.look_to(direction, Vec3::Y);
            }
        }
    }
}

/// Plugin для headless movement (после simulation chain, в том же FixedUpdate)
pub struct HeadlessMovementPlugin;

impl Plugin for HeadlessMovementPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, drive_headless_movement.after(SimulationSet));
    }
}
