//! Hunter AI — behavior FSM поверх combat state
//!
//! - `components` — `HunterState` + `HunterFsm` (память FSM на entity)
//! - `guards` — read-only per-state guards (authority + observers)
//! - `brain` — чистый шаг authority FSM (тестируется без ECS)
//! - `systems` — ECS обвязка: FSM, реакции на урон / triggers, presentation

pub mod brain;
pub mod components;
pub mod guards;
pub mod systems;


// Re-export основных типов
pub use brain::{enter_state, step_authority, BrainCommand, BrainContext};
pub use components::{HunterFsm, HunterState};
pub use guards::{accepts_interaction, evaluate_guards, AimBlock, GuardVerdict};
pub use systems::{CombatPresentation, WanderCueTimer};
