//! Physics backend abstraction.
//!
//! This module defines the trait that physics backends must implement
//! to work with the first-person controller. The controller only decides
//! what the body should do; the backend owns integration, queries and
//! collision reporting for a specific physics engine.

use bevy::prelude::*;

/// Lift applied to the probe origin above the collider's bottom.
///
/// A body resting exactly on the floor would otherwise start its ray
/// on (or just below) the surface and miss it.
pub const GROUND_PROBE_LIFT: f32 = 0.05;

/// Trait for physics backend implementations.
///
/// Implement this trait to integrate a physics engine with the controller.
/// In addition to the methods below, the backend's plugin is expected to:
///
/// - write [`FirstPersonController::ground_probe`](crate::config::FirstPersonController)
///   once per fixed tick, in [`LocomotionSet::Probe`](crate::LocomotionSet);
/// - translate its collision-start events into
///   [`ContactImpact`](crate::collision::ContactImpact) events.
///
/// See the `rapier` module's `Rapier3dBackend` for a full implementation.
///
/// ```rust
/// use bevy::prelude::*;
/// use fp_locomotion::prelude::*;
///
/// // Backends are used statically by the controller systems
/// fn horizontal_speed<B: LocomotionBackend>(world: &World, actor: Entity) -> f32 {
///     let velocity = B::get_velocity(world, actor);
///     Vec2::new(velocity.x, velocity.z).length()
/// }
/// ```
pub trait LocomotionBackend: 'static + Send + Sync {
    /// Returns the plugin that sets up this backend.
    fn plugin() -> impl Plugin;

    /// Get the current linear velocity of an entity.
    fn get_velocity(world: &World, entity: Entity) -> Vec3;

    /// Set the linear velocity of an entity.
    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec3);

    /// Apply an impulse to an entity.
    ///
    /// Impulse is an instantaneous change in momentum.
    fn apply_impulse(world: &mut World, entity: Entity, impulse: Vec3);

    /// Get the current world position of an entity.
    fn get_position(world: &World, entity: Entity) -> Vec3;

    /// Get the current world rotation of an entity.
    fn get_rotation(world: &World, entity: Entity) -> Quat;

    /// Get the fixed timestep delta time.
    fn get_fixed_timestep(world: &World) -> f32 {
        world
            .get_resource::<Time<Fixed>>()
            .map(|t| t.delta_secs())
            .filter(|&d| d > 0.0)
            .unwrap_or(1.0 / 64.0)
    }

    /// Get the collision groups for an entity (memberships, filters).
    /// Returns None if the entity doesn't have collision groups.
    fn get_collision_groups(_world: &World, _entity: Entity) -> Option<(u32, u32)> {
        None
    }
}

/// Empty plugin for backends that don't need additional setup.
pub struct NoOpBackendPlugin;

impl Plugin for NoOpBackendPlugin {
    fn build(&self, _app: &mut App) {}
}

/// Helper for building the downward ground probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundProbeRequest {
    /// Origin of the ray.
    pub origin: Vec3,
    /// Maximum distance to cast, straight down.
    pub max_distance: f32,
    /// Collision-group bits that count as ground.
    pub layer_mask: u32,
    /// Entity to exclude from results.
    pub exclude: Option<Entity>,
}

impl GroundProbeRequest {
    /// Build the probe for an actor.
    ///
    /// `bottom_offset` is the distance from the body's origin down to its
    /// collider's bottom. The ray starts [`GROUND_PROBE_LIFT`] above that
    /// bottom and reaches `reach` below it.
    pub fn below(position: Vec3, bottom_offset: f32, reach: f32, layer_mask: u32) -> Self {
        let origin = position - Vec3::Y * (bottom_offset - GROUND_PROBE_LIFT);
        Self {
            origin,
            max_distance: reach.max(0.0) + GROUND_PROBE_LIFT,
            layer_mask,
            exclude: None,
        }
    }

    /// Exclude an entity from the probe.
    pub fn excluding(mut self, entity: Entity) -> Self {
        self.exclude = Some(entity);
        self
    }

    /// Lowest point the probe can reach.
    pub fn end(&self) -> Vec3 {
        self.origin - Vec3::Y * self.max_distance
    }

    /// Whether a surface at `height` lies within the probe's reach.
    pub fn reaches(&self, height: f32) -> bool {
        height <= self.origin.y && height >= self.end().y
    }
}
