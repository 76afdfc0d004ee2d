//! Wire codec — bincode поверх replication messages
//!
//! Единственная fallible поверхность симуляции: транспорт хоста получает
//! `WireError` и решает сам (drop пакета / disconnect).

use thiserror::Error;

use super::messages::{CombatSnapshot, ReplicationEnvelope};

/// Размер snapshot на wire: 1 + 4 + 1 + 1 + 1
pub const SNAPSHOT_WIRE_SIZE: usize = 8;

#[derive(Debug, Error)]
pub enum WireError {
    #[error("encode error: {0}")]
    Encode(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("snapshot must be {expected} bytes, got {actual}")]
    SnapshotLength { expected: usize, actual: usize },

    #[error("unknown skill tier index {0}")]
    UnknownSkillTier(u32),
}

pub type Result<T> = std::result::Result<T, WireError>;

pub fn encode_envelope(envelope: &ReplicationEnvelope) -> Result<Vec<u8>> {
    bincode::serialize(envelope).map_err(|e| WireError::Encode(e.to_string()))
}

pub fn decode_envelope(bytes: &[u8]) -> Result<ReplicationEnvelope> {
    bincode::deserialize(bytes).map_err(|e| WireError::Decode(e.to_string()))
}

pub fn encode_snapshot(snapshot: &CombatSnapshot) -> Result<Vec<u8>> {
    bincode::serialize(snapshot).map_err(|e| WireError::Encode(e.to_string()))
}

pub fn decode_snapshot(bytes: &[u8]) -> Result<CombatSnapshot> {
    if bytes.len() != SNAPSHOT_WIRE_SIZE {
        return Err(WireError::SnapshotLength {
            expected: SNAPSHOT_WIRE_SIZE,
            actual: bytes.len(),
        });
    }
    bincode::deserialize(bytes).map_err(|e| WireError::Decode(e.to_string()))
}
