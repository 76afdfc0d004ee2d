//! Authority hand-off (session migration)
//!
//! Хост сообщает, что этот участник стал (или перестал быть) authority для entity.
//! Компоненты меняются местами: `ObserverMirror` ⇄ `AuthorityCombat`.

use bevy::prelude::*;

use crate::ai::HunterFsm;
use crate::combat::{AuthorityCombat, ObserverMirror};
use crate::config::HunterConfig;
use crate::logger::{log_info, log_warning};

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorityTransfer {
    /// Этот участник теперь authority
    Promote { entity: Entity },
    /// Authority ушла другому участнику
    Demote { entity: Entity },
}

/// System: применение hand-off
///
/// Ground truth сохраняется, счётчик неудач Leave сбрасывается.
pub fn handle_authority_transfers(
    mut commands: Commands,
    mut transfers: EventReader<AuthorityTransfer>,
    mut hunters: Query<(
        Option<&AuthorityCombat>,
        Option<&ObserverMirror>,
        &HunterConfig,
        &mut HunterFsm,
    )>,
) {
    for transfer in transfers.read() {
        match *transfer {
            AuthorityTransfer::Promote { entity } => {
                let Ok((_, Some(mirror), config, mut fsm)) = hunters.get_mut(entity) else {
                    log_warning(&format!("⚠️ Promote {:?}: no observer mirror, ignored", entity));
                    continue;
                };

                let combat = AuthorityCombat::promote(mirror, config);
                fsm.leave_failures = 0;
                commands
                    .entity(entity)
                    .remove::<ObserverMirror>()
                    .insert(combat);
                log_info(&format!("👑 {:?} promoted to authority", entity));
            }
            AuthorityTransfer::Demote { entity } => {
                let Ok((Some(combat), _, config, mut fsm)) = hunters.get_mut(entity) else {
                    log_warning(&format!("⚠️ Demote {:?}: not authority, ignored", entity));
                    continue;
                };

                let mirror = ObserverMirror::demote(combat, config);
                fsm.leave_failures = 0;
                commands
                    .entity(entity)
                    .remove::<AuthorityCombat>()
                    .insert(mirror);
                log_info(&format!("{:?} demoted to observer", entity));
            }
        }
    }
}
