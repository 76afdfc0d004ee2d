//! Per-tick countdown системы (authority + observer)

use bevy::prelude::*;

use super::mirror::ObserverMirror;
use super::state::AuthorityCombat;

/// Authority: reload / interrupt countdown (единственный writer ground truth)
pub fn tick_authority_timers(time: Res<Time<Fixed>>, mut hunters: Query<&mut AuthorityCombat>) {
    let delta = time.delta_secs();

    for mut combat in hunters.iter_mut() {
        combat.tick_timers(delta);
    }
}

/// Observer: advisory локальные таймеры (только presentation)
pub fn tick_observer_timers(time: Res<Time<Fixed>>, mut mirrors: Query<&mut ObserverMirror>) {
    let delta = time.delta_secs();

    for mut mirror in mirrors.iter_mut() {
        mirror.tick_local_timers(delta);
    }
}
