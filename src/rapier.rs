//! Rapier3D physics backend implementation.
//!
//! This module provides the physics backend for Bevy Rapier3D.
//! Enable with the `rapier3d` feature.

use bevy::prelude::*;
use bevy_rapier3d::geometry::Group;
use bevy_rapier3d::prelude::*;

use crate::backend::{GroundProbeRequest, LocomotionBackend};
use crate::collision::{ContactImpact, GroundHit, SurfaceTag};
use crate::config::{FirstPersonController, LocomotionTuning};
use crate::LocomotionSet;

/// Rapier3D physics backend for the first-person controller.
///
/// This backend uses `bevy_rapier3d` for velocity and impulse access. The
/// ground probe and contact translation are handled by dedicated Rapier
/// systems that receive `RapierContext` as a system parameter.
pub struct Rapier3dBackend;

impl LocomotionBackend for Rapier3dBackend {
    fn plugin() -> impl Plugin {
        Rapier3dBackendPlugin
    }

    fn get_velocity(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<Velocity>(entity)
            .map(|v| v.linvel)
            .unwrap_or(Vec3::ZERO)
    }

    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec3) {
        if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
            vel.linvel = velocity;
        }
    }

    fn apply_impulse(world: &mut World, entity: Entity, impulse: Vec3) {
        if let Some(mut ext_impulse) = world.get_mut::<ExternalImpulse>(entity) {
            ext_impulse.impulse += impulse;
        } else if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
            // Without an ExternalImpulse the impulse becomes an immediate velocity change
            vel.linvel += impulse;
        }
    }

    fn get_position(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<Transform>(entity)
            .map(|t| t.translation)
            .or_else(|| {
                world
                    .get::<GlobalTransform>(entity)
                    .map(|t| t.translation())
            })
            .unwrap_or(Vec3::ZERO)
    }

    fn get_rotation(world: &World, entity: Entity) -> Quat {
        world
            .get::<Transform>(entity)
            .map(|t| t.rotation)
            .unwrap_or(Quat::IDENTITY)
    }

    fn get_collision_groups(world: &World, entity: Entity) -> Option<(u32, u32)> {
        world
            .get::<CollisionGroups>(entity)
            .map(|cg| (cg.memberships.bits(), cg.filters.bits()))
    }
}

/// Plugin that sets up Rapier3D-specific systems for the controller.
pub struct Rapier3dBackendPlugin;

impl Plugin for Rapier3dBackendPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (rapier_ground_probe, rapier_contact_impacts).in_set(LocomotionSet::Probe),
        );
    }
}

/// Distance from the collider origin down to its lowest point.
/// For capsules, this is half_height + radius.
pub fn collider_bottom_offset(collider: &Collider) -> f32 {
    if let Some(capsule) = collider.as_capsule() {
        // For capsule_y(half_height, radius), the segment endpoints are at y = ±half_height
        let segment = capsule.segment();
        let half_height = (segment.a().y - segment.b().y).abs() / 2.0;
        half_height + capsule.radius()
    } else if let Some(ball) = collider.as_ball() {
        ball.radius()
    } else if let Some(cuboid) = collider.as_cuboid() {
        cuboid.half_extents().y
    } else if let Some(cylinder) = collider.as_cylinder() {
        cylinder.half_height()
    } else {
        // Unknown shape: probe from the body origin
        0.0
    }
}

/// Cast a ground probe using RapierContext.
fn rapier_cast_down(context: &RapierContext, request: &GroundProbeRequest) -> Option<(Entity, f32)> {
    let mut filter = QueryFilter::default().exclude_sensors().groups(CollisionGroups::new(
        Group::ALL,
        Group::from_bits_truncate(request.layer_mask),
    ));

    if let Some(exclude) = request.exclude {
        filter = filter.exclude_rigid_body(exclude);
    }

    context.cast_ray(
        request.origin,
        Vec3::NEG_Y,
        request.max_distance,
        true,
        filter,
    )
}

fn surface_of(
    entity: Entity,
    q_surfaces: &Query<&SurfaceTag>,
    q_parents: &Query<&ChildOf>,
) -> Option<SurfaceTag> {
    q_surfaces
        .get(entity)
        .ok()
        .or_else(|| {
            q_parents
                .get(entity)
                .ok()
                .and_then(|child_of| q_surfaces.get(child_of.parent()).ok())
        })
        .cloned()
}

/// Rapier-specific ground probe.
///
/// Casts one ray straight down from just above the collider's bottom, limited
/// to the actor's ground layer and ignoring the actor's own body and sensors.
/// The tag of the hit collider (or its parent) becomes the ground surface.
fn rapier_ground_probe(
    rapier_context: ReadRapierContext,
    q_surfaces: Query<&SurfaceTag>,
    q_parents: Query<&ChildOf>,
    mut q_controllers: Query<(
        Entity,
        &GlobalTransform,
        &LocomotionTuning,
        &mut FirstPersonController,
        Option<&Collider>,
    )>,
) {
    let Ok(context) = rapier_context.single() else {
        return;
    };

    for (entity, transform, tuning, mut controller, collider) in &mut q_controllers {
        let bottom = collider.map(collider_bottom_offset).unwrap_or(0.0);
        let request = GroundProbeRequest::below(
            transform.translation(),
            bottom,
            tuning.ground_check_distance,
            tuning.ground_layer,
        )
        .excluding(entity);

        controller.ground_probe = rapier_cast_down(&context, &request).map(|(hit, toi)| {
            let point = request.origin + Vec3::NEG_Y * toi;
            GroundHit::new(toi, point, Some(hit))
                .with_surface(surface_of(hit, &q_surfaces, &q_parents))
        });
    }
}

/// Translate Rapier collision starts into [`ContactImpact`] events.
///
/// The relative speed uses the actor's measured velocity against the other
/// body's velocity (zero for fixed bodies).
fn rapier_contact_impacts(
    mut collisions: EventReader<CollisionEvent>,
    mut impacts: EventWriter<ContactImpact>,
    q_controllers: Query<&FirstPersonController>,
    q_velocities: Query<&Velocity>,
) {
    for event in collisions.read() {
        let (a, b) = match event {
            CollisionEvent::Started(a, b, _) => (*a, *b),
            CollisionEvent::Stopped(..) => continue,
        };

        for (actor, other) in [(a, b), (b, a)] {
            let Ok(controller) = q_controllers.get(actor) else {
                continue;
            };
            let other_velocity = q_velocities
                .get(other)
                .map(|v| v.linvel)
                .unwrap_or(Vec3::ZERO);

            impacts.write(ContactImpact {
                actor,
                other,
                relative_speed: (controller.measured_velocity - other_velocity).length(),
            });
        }
    }
}

/// Bundle containing the Rapier physics components for a first-person actor.
///
/// The body is dynamic with rotation locked on every axis: yaw is written
/// to the `Transform` by the camera systems, and the body never tips over.
/// Collision events are enabled so airborne impacts can produce wall-hit cues.
///
/// # Example
///
/// ```ignore
/// use bevy::prelude::*;
/// use bevy_rapier3d::prelude::*;
/// use fp_locomotion::prelude::*;
///
/// fn spawn_player(mut commands: Commands) {
///     commands
///         .spawn((
///             Transform::from_xyz(0.0, 2.0, 0.0),
///             FirstPersonController::new(),
///             InputBindings::default(),
///             Rapier3dCharacterBundle::new(),
///             Collider::capsule_y(0.5, 0.4),
///             CollisionGroups::new(Group::GROUP_2, Group::ALL),
///         ))
///         .with_children(|actor| {
///             actor.spawn((HeadPivot, Transform::from_xyz(0.0, 0.6, 0.0)));
///         });
/// }
/// ```
///
/// # Defaults
///
/// - `rigid_body`: [`RigidBody::Dynamic`]
/// - `velocity`: Zero velocity
/// - `external_impulse`: Zero impulse (used for jump impulses)
/// - `locked_axes`: [`LockedAxes::ROTATION_LOCKED`]
/// - `damping`: Linear 0.0, Angular 1.0 (horizontal speed is commanded directly)
/// - `active_events`: [`ActiveEvents::COLLISION_EVENTS`]
/// - `mass_properties`: Default (computed by Rapier from collider)
#[derive(Bundle)]
pub struct Rapier3dCharacterBundle {
    /// The rigid body type. Should typically be [`RigidBody::Dynamic`].
    pub rigid_body: RigidBody,
    /// Linear and angular velocity; the horizontal part is written every fixed tick.
    pub velocity: Velocity,
    /// Accumulated impulses applied this step. Used for jumps.
    pub external_impulse: ExternalImpulse,
    /// Which axes are locked.
    pub locked_axes: LockedAxes,
    /// Damping coefficients for velocity reduction.
    pub damping: Damping,
    /// Which Rapier events the collider reports.
    pub active_events: ActiveEvents,
    /// Mass properties, read back from Rapier once the collider is attached.
    pub mass_properties: ReadMassProperties,
}

impl Default for Rapier3dCharacterBundle {
    fn default() -> Self {
        Self::new()
    }
}

impl Rapier3dCharacterBundle {
    /// Create a new character bundle.
    pub fn new() -> Self {
        Self {
            rigid_body: RigidBody::Dynamic,
            velocity: Velocity::default(),
            external_impulse: ExternalImpulse::default(),
            locked_axes: LockedAxes::ROTATION_LOCKED,
            damping: Damping {
                linear_damping: 0.0,
                angular_damping: 1.0,
            },
            active_events: ActiveEvents::COLLISION_EVENTS,
            // Filled in by Rapier from the collider on the first step
            mass_properties: ReadMassProperties::default(),
        }
    }

    /// Builder: rigid body type (kinematic bodies for cutscenes and tests).
    pub fn with_body(mut self, body: RigidBody) -> Self {
        self.rigid_body = body;
        self
    }

    /// Builder: linear and angular damping.
    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.damping = Damping {
            linear_damping: linear,
            angular_damping: angular,
        };
        self
    }
}
