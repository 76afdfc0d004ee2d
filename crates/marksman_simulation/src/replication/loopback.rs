//! In-process transport для headless прогонов (binary, integration tests)
//!
//! Забирает `OutboundReplication` у authority world, гонит через wire codec
//! и раздаёт `InboundReplication` observers:
//! - Reliable / Durable доставляются всегда
//! - BestEffort теряется с вероятностью `best_effort_loss` (seeded)
//! - Durable сохраняются для late joiners (`replay_durable`) до despawn hunter'а

use bevy::ecs::event::Events;
use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::codec::{decode_envelope, encode_envelope, Result};
use super::messages::{Channel, InboundReplication, OutboundReplication, ReplicationPayload};
use crate::ai::HunterState;
use crate::components::NetworkId;
use crate::logger::log;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    pub sent: usize,
    pub delivered: usize,
    pub dropped: usize,
}

pub struct LoopbackLink {
    pending: Vec<Vec<u8>>,
    durable: Vec<(NetworkId, Vec<u8>)>,
    best_effort_loss: f64,
    rng: ChaCha8Rng,
    pub stats: LinkStats,
}

impl LoopbackLink {
    pub fn new(seed: u64, best_effort_loss: f64) -> Self {
        Self {
            pending: Vec::new(),
            durable: Vec::new(),
            best_effort_loss: best_effort_loss.clamp(0.0, 1.0),
            rng: ChaCha8Rng::seed_from_u64(seed),
            stats: LinkStats::default(),
        }
    }

    /// Забрать всё отправленное authority за последний update
    pub fn collect(&mut self, authority: &mut World) -> Result<usize> {
        let Some(mut outbound) = authority.get_resource_mut::<Events<OutboundReplication>>() else {
            return Ok(0);
        };
        let envelopes: Vec<_> = outbound.drain().map(|OutboundReplication(envelope)| envelope).collect();

        for envelope in &envelopes {
            let bytes = encode_envelope(envelope)?;
            if envelope.channel == Channel::Durable {
                self.durable.push((envelope.network_id, bytes.clone()));
            } else if matches!(envelope.payload, ReplicationPayload::State(HunterState::Despawn)) {
                self.durable.retain(|(id, _)| *id != envelope.network_id);
            }
            self.pending.push(bytes);
        }

        self.stats.sent += envelopes.len();
        Ok(envelopes.len())
    }

    /// Доставить накопленное всем observers (потери best-effort независимы на каждого)
    pub fn deliver(&mut self, observers: &mut [&mut World]) -> Result<usize> {
        let pending = std::mem::take(&mut self.pending);
        let mut delivered = 0;

        for bytes in &pending {
            let envelope = decode_envelope(bytes)?;
            for world in observers.iter_mut() {
                if envelope.channel == Channel::BestEffort && self.rng.gen_bool(self.best_effort_loss) {
                    self.stats.dropped += 1;
                    continue;
                }
                world.send_event(InboundReplication(envelope));
                delivered += 1;
            }
        }

        self.stats.delivered += delivered;
        Ok(delivered)
    }

    /// Late join: все сохранённые durable сообщения новому участнику
    pub fn replay_durable(&mut self, observer: &mut World) -> Result<usize> {
        for (_, bytes) in &self.durable {
            observer.send_event(InboundReplication(decode_envelope(bytes)?));
        }

        log(&format!("Durable replay: {} messages", self.durable.len()));
        self.stats.delivered += self.durable.len();
        Ok(self.durable.len())
    }

    pub fn durable_len(&self) -> usize {
        self.durable.len()
    }
}
