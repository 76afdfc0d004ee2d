//! External adapters — всё, что симуляция спрашивает у хоста
//!
//! - `RetreatLocator`: точка отступления (хост обычно сэмплирует navmesh)
//! - `CompatibilityOracle`: активен ли «last stand» override у стороннего мода
//!
//! Оба резолвятся один раз и живут как Resource.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bevy::prelude::*;

use crate::logger::log_info;

pub trait RetreatLocator: Send + Sync {
    /// Точка, уводящая actor'а от угрозы; `None` — не нашли
    fn find_retreat_point(&self, actor: Vec3, threat: Vec3) -> Option<Vec3>;
}

impl<F> RetreatLocator for F
where
    F: Fn(Vec3, Vec3) -> Option<Vec3> + Send + Sync,
{
    fn find_retreat_point(&self, actor: Vec3, threat: Vec3) -> Option<Vec3> {
        self(actor, threat)
    }
}

/// Прямоугольная проходимая область (XZ плоскость)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkableArea {
    pub min: Vec2,
    pub max: Vec2,
}

impl WalkableArea {
    fn clamp(&self, point: Vec3) -> Vec3 {
        Vec3::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y,
            point.z.clamp(self.min.y, self.max.y),
        )
    }
}

/// Дефолтный locator: бежим прочь от угрозы
///
/// Направление «от угрозы» без Y, пробуем `preferred_distance`, потом
/// `fallback_distance`. Точка принимается, если ближайшая проходимая точка
/// в пределах `sample_radius` и не ближе к угрозе, чем actor.
#[derive(Debug, Clone, PartialEq)]
pub struct AwayFromThreat {
    pub preferred_distance: f32,
    pub fallback_distance: f32,
    pub sample_radius: f32,
    pub walkable: Option<WalkableArea>,
}

impl Default for AwayFromThreat {
    fn default() -> Self {
        Self {
            preferred_distance: 20.0,
            fallback_distance: 8.0,
            sample_radius: 15.0,
            walkable: None,
        }
    }
}

impl AwayFromThreat {
    fn sample(&self, candidate: Vec3, actor: Vec3, threat: Vec3) -> Option<Vec3> {
        let point = match self.walkable {
            Some(area) => area.clamp(candidate),
            None => candidate,
        };

        if point.distance(candidate) > self.sample_radius {
            return None;
        }
        if point.distance(threat) < actor.distance(threat) {
            return None;
        }
        Some(point)
    }
}

impl RetreatLocator for AwayFromThreat {
    fn find_retreat_point(&self, actor: Vec3, threat: Vec3) -> Option<Vec3> {
        let mut away = actor - threat;
        away.y = 0.0;
        // Угроза прямо на нас — бежим вдоль +Z
        let direction = away.try_normalize().unwrap_or(Vec3::Z);

        [self.preferred_distance, self.fallback_distance]
            .into_iter()
            .find_map(|distance| self.sample(actor + direction * distance, actor, threat))
    }
}

/// Resource с активным locator'ом
#[derive(Resource)]
pub struct RetreatService {
    pub locator: Box<dyn RetreatLocator>,
}

impl RetreatService {
    pub fn new(locator: impl RetreatLocator + 'static) -> Self {
        Self {
            locator: Box::new(locator),
        }
    }
}

impl Default for RetreatService {
    fn default() -> Self {
        Self::new(AwayFromThreat::default())
    }
}

pub trait CompatibilityOracle: Send + Sync {
    fn is_override_active(&self) -> bool;
}

impl<F> CompatibilityOracle for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_override_active(&self) -> bool {
        self()
    }
}

/// Флаг override, который хост может переключать после старта
#[derive(Debug, Clone, Default)]
pub struct SharedOverrideFlag(Arc<AtomicBool>);

impl SharedOverrideFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, active: bool) {
        self.0.store(active, Ordering::Relaxed);
    }
}

impl CompatibilityOracle for SharedOverrideFlag {
    fn is_override_active(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Override «last stand»: `None` — компаньон не обнаружен, всегда false
#[derive(Resource, Default)]
pub struct CompatibilityOverride {
    oracle: Option<Box<dyn CompatibilityOracle>>,
}

impl CompatibilityOverride {
    /// Резолвится один раз при старте
    pub fn resolve(oracle: Option<Box<dyn CompatibilityOracle>>) -> Self {
        match oracle {
            Some(_) => log_info("🛡️ Last-stand compatibility detected"),
            None => log_info("Last-stand compatibility not present"),
        }
        Self { oracle }
    }

    pub fn is_active(&self) -> bool {
        self.oracle
            .as_ref()
            .is_some_and(|oracle| oracle.is_override_active())
    }
}
