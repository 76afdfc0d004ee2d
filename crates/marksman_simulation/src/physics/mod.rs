//! Physics / movement
//!
//! Настоящая физика и навигация — на стороне хоста. Здесь только headless
//! исполнение `MovementCommand` для тестов и standalone прогонов.

pub mod movement;

// Re-export основных типов
pub use movement::{drive_headless_movement, HeadlessMovementPlugin};
