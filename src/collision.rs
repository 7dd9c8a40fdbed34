//! Collision result structures.
//!
//! These structures carry the results of the backend's physics queries into
//! the controller: the downward ground probe and contact-start impacts.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Surface identity attached to ground colliders.
///
/// The ground probe reports the tag of whatever it hits. The feedback
/// dispatcher uses it to pick a footstep sound set; an untagged surface
/// falls back to the default set.
#[derive(Component, Reflect, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[reflect(Component)]
pub struct SurfaceTag(pub String);

impl SurfaceTag {
    /// Create a new surface tag.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the tag name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Information about a downward ground probe hit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroundHit {
    /// Distance from the probe origin to the hit point.
    pub distance: f32,
    /// World position of the hit point.
    pub point: Vec3,
    /// Entity that was hit (if any).
    pub entity: Option<Entity>,
    /// Surface tag of the hit collider, if it has one.
    pub surface: Option<SurfaceTag>,
}

impl GroundHit {
    /// Create a ground hit result.
    pub fn new(distance: f32, point: Vec3, entity: Option<Entity>) -> Self {
        Self {
            distance,
            point,
            entity,
            surface: None,
        }
    }

    /// Builder: attach the hit surface's tag.
    pub fn with_surface(mut self, surface: Option<SurfaceTag>) -> Self {
        self.surface = surface;
        self
    }
}

/// A collision between a controlled actor and something else started.
///
/// Backends translate their native collision-start events into this event.
/// `relative_speed` is the magnitude of the actor's velocity relative to the
/// other body at the moment of impact.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ContactImpact {
    /// The controlled actor.
    pub actor: Entity,
    /// The other collider's entity.
    pub other: Entity,
    /// Relative impact speed (units/second).
    pub relative_speed: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ground_hit_new_has_no_surface() {
        let hit = GroundHit::new(0.05, Vec3::new(1.0, 0.0, 2.0), None);

        assert_eq!(hit.distance, 0.05);
        assert_eq!(hit.point, Vec3::new(1.0, 0.0, 2.0));
        assert!(hit.surface.is_none());
    }

    #[test]
    fn ground_hit_with_surface() {
        let entity = Entity::from_raw(42);
        let hit = GroundHit::new(0.0, Vec3::ZERO, Some(entity))
            .with_surface(Some(SurfaceTag::new("Dirt")));

        assert_eq!(hit.entity, Some(entity));
        assert_eq!(hit.surface.as_ref().map(SurfaceTag::as_str), Some("Dirt"));
    }
}
