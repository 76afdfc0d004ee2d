//! Replication messages — всё, что authority отправляет observers
//!
//! Wire contract (для interoperability):
//! - snapshot: `is_reloading, ammo_remaining, is_permanently_out_of_ammo, is_interrupted,
//!   is_burst_active` — ровно в этом порядке
//! - init: `{skill_tier_index, initial_ammo}`
//! - config: `HunterConfig` hunter'а (durable, сразу после init) — guards на observers
//!   читают тот же config, что и authority
//! - prediction: один float `duration`

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::codec::WireError;
use crate::ai::HunterState;
use crate::combat::SkillTier;
use crate::components::NetworkId;
use crate::config::HunterConfig;

/// Полный combat snapshot (порядок полей = порядок на wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CombatSnapshot {
    pub is_reloading: bool,
    pub ammo_remaining: u32,
    pub is_permanently_out_of_ammo: bool,
    pub is_interrupted: bool,
    pub is_burst_active: bool,
}

/// Durable init — хранится транспортом и доставляется late joiners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitMessage {
    pub skill_tier_index: u32,
    pub initial_ammo: u32,
}

impl InitMessage {
    /// Strict decode skill tier
    pub fn skill_tier(&self) -> Result<SkillTier, WireError> {
        SkillTier::from_index(self.skill_tier_index)
            .ok_or(WireError::UnknownSkillTier(self.skill_tier_index))
    }
}

/// Best-effort prediction — только для локального countdown на observers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PredictionEvent {
    ReloadStarted { duration: f32 },
    InterruptStarted { duration: f32 },
}

impl PredictionEvent {
    pub fn duration(&self) -> f32 {
        match *self {
            PredictionEvent::ReloadStarted { duration }
            | PredictionEvent::InterruptStarted { duration } => duration,
        }
    }
}

/// Класс доставки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// Ordered per entity (snapshots, state changes)
    Reliable,
    /// Может потеряться или прийти не по порядку (predictions)
    BestEffort,
    /// Хранится транспортом для late joiners (init, config)
    Durable,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ReplicationPayload {
    Snapshot(CombatSnapshot),
    Prediction(PredictionEvent),
    Init(InitMessage),
    Config(HunterConfig),
    State(HunterState),
}

impl ReplicationPayload {
    pub fn channel(&self) -> Channel {
        match self {
            ReplicationPayload::Snapshot(_) | ReplicationPayload::State(_) => Channel::Reliable,
            ReplicationPayload::Prediction(_) => Channel::BestEffort,
            ReplicationPayload::Init(_) | ReplicationPayload::Config(_) => Channel::Durable,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplicationEnvelope {
    pub network_id: NetworkId,
    pub channel: Channel,
    pub payload: ReplicationPayload,
}

impl ReplicationEnvelope {
    pub fn new(network_id: NetworkId, payload: ReplicationPayload) -> Self {
        Self {
            network_id,
            channel: payload.channel(),
            payload,
        }
    }
}

/// Authority → транспорт (хост забирает и рассылает)
#[derive(Event, Debug, Clone, Copy)]
pub struct OutboundReplication(pub ReplicationEnvelope);

/// Транспорт → observer (хост кладёт полученные сообщения)
#[derive(Event, Debug, Clone, Copy)]
pub struct InboundReplication(pub ReplicationEnvelope);
