//! AI systems

pub mod fsm;
pub mod presentation;
pub mod reactions;

pub use fsm::{despawn_finished_hunters, nearest_threat, run_authority_fsm};
pub use presentation::{tick_wander_cues, update_presentation, CombatPresentation, WanderCueTimer};
pub use reactions::{apply_damage_interrupts, handle_interaction_triggers};
