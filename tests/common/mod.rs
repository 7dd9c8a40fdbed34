//! Shared test harness: a deterministic flat-world physics backend.
//!
//! Bodies are points with a half height, integrated with constant gravity and
//! clamped against one infinite floor. Every `app.update()` advances exactly
//! one fixed tick of 1/64 s (the very first update only starts the clock).

#![allow(dead_code)]

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use fp_locomotion::backend::GroundProbeRequest;
use fp_locomotion::prelude::*;

pub const HZ: f64 = 64.0;
pub const GRAVITY: f32 = -9.81;
pub const HALF_HEIGHT: f32 = 1.0;
pub const HEAD_HEIGHT: f32 = 0.6;

/// Point body simulated by [`FlatWorldBackend`].
#[derive(Component, Debug, Clone, Copy)]
pub struct SimBody {
    pub velocity: Vec3,
    pub pending_impulse: Vec3,
    pub mass: f32,
    pub half_height: f32,
    pub memberships: u32,
}

impl Default for SimBody {
    fn default() -> Self {
        Self {
            velocity: Vec3::ZERO,
            pending_impulse: Vec3::ZERO,
            mass: 1.0,
            half_height: HALF_HEIGHT,
            memberships: 0b10,
        }
    }
}

/// The single floor of the flat world.
#[derive(Resource, Debug, Clone)]
pub struct Floor {
    pub height: f32,
    pub layers: u32,
    pub surface: Option<SurfaceTag>,
}

impl Default for Floor {
    fn default() -> Self {
        Self {
            height: 0.0,
            layers: 1,
            surface: None,
        }
    }
}

pub struct FlatWorldBackend;

impl LocomotionBackend for FlatWorldBackend {
    fn plugin() -> impl Plugin {
        FlatWorldPlugin
    }

    fn get_velocity(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<SimBody>(entity)
            .map(|b| b.velocity)
            .unwrap_or(Vec3::ZERO)
    }

    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec3) {
        if let Some(mut body) = world.get_mut::<SimBody>(entity) {
            body.velocity = velocity;
        }
    }

    fn apply_impulse(world: &mut World, entity: Entity, impulse: Vec3) {
        if let Some(mut body) = world.get_mut::<SimBody>(entity) {
            body.pending_impulse += impulse;
        }
    }

    fn get_position(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<Transform>(entity)
            .map(|t| t.translation)
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
            .get::<SimBody>(entity)
            .map(|b| (b.memberships, u32::MAX))
    }
}

pub struct FlatWorldPlugin;

impl Plugin for FlatWorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Floor>();
        app.add_systems(FixedUpdate, flat_ground_probe.in_set(LocomotionSet::Probe));
        app.add_systems(FixedPostUpdate, integrate_bodies);
    }
}

fn flat_ground_probe(
    floor: Res<Floor>,
    mut q_controllers: Query<(
        &Transform,
        &SimBody,
        &LocomotionTuning,
        &mut FirstPersonController,
    )>,
) {
    for (transform, body, tuning, mut controller) in &mut q_controllers {
        let request = GroundProbeRequest::below(
            transform.translation,
            body.half_height,
            tuning.ground_check_distance,
            tuning.ground_layer,
        );

        let on_layer = floor.layers & request.layer_mask != 0;
        controller.ground_probe = (on_layer && request.reaches(floor.height)).then(|| {
            let point = Vec3::new(request.origin.x, floor.height, request.origin.z);
            GroundHit::new(request.origin.y - floor.height, point, None)
                .with_surface(floor.surface.clone())
        });
    }
}

fn integrate_bodies(
    time: Res<Time>,
    floor: Res<Floor>,
    mut q_bodies: Query<(&mut SimBody, &mut Transform)>,
) {
    let dt = time.delta_secs();
    for (mut body, mut transform) in &mut q_bodies {
        let impulse = std::mem::take(&mut body.pending_impulse);
        let mass = body.mass;
        body.velocity += impulse / mass;
        body.velocity.y += GRAVITY * dt;
        transform.translation += body.velocity * dt;

        let rest = floor.height + body.half_height;
        if transform.translation.y < rest {
            transform.translation.y = rest;
            body.velocity.y = body.velocity.y.max(0.0);
        }
    }
}

// ============================================================================
// Event Logs
// ============================================================================

#[derive(Resource, Default)]
pub struct CueLog(pub Vec<FeedbackCue>);

#[derive(Resource, Default)]
pub struct ImpactLog(pub Vec<ImpactEvent>);

impl CueLog {
    pub fn count(&self, actor: Entity, matches: impl Fn(&CueKind) -> bool) -> usize {
        self.0
            .iter()
            .filter(|cue| cue.actor == actor && matches(&cue.kind))
            .count()
    }
}

impl ImpactLog {
    pub fn started(&self, actor: Entity) -> Vec<ImpactEventKind> {
        self.0
            .iter()
            .filter(|event| event.actor == actor)
            .map(|event| event.kind)
            .filter(|kind| matches!(kind, ImpactEventKind::Started { .. }))
            .collect()
    }
}

fn record_events(
    mut cues: EventReader<FeedbackCue>,
    mut impacts: EventReader<ImpactEvent>,
    mut cue_log: ResMut<CueLog>,
    mut impact_log: ResMut<ImpactLog>,
) {
    cue_log.0.extend(cues.read().cloned());
    impact_log.0.extend(impacts.read().copied());
}

// ============================================================================
// App Setup
// ============================================================================

/// Create a minimal test app with the flat-world backend and the controller.
pub fn create_test_app() -> App {
    let mut app = App::new();

    app.add_plugins(MinimalPlugins);
    app.add_plugins(TransformPlugin);
    app.add_plugins(FirstPersonControllerPlugin::<FlatWorldBackend>::default());
    app.insert_resource(Time::<Fixed>::from_hz(HZ));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
        1.0 / HZ,
    )));
    app.init_resource::<CueLog>();
    app.init_resource::<ImpactLog>();
    app.add_systems(Last, record_events);

    app.finish();
    app.cleanup();
    app
}

/// Spawn an actor whose feet are `feet_height` above the floor.
pub fn spawn_actor(app: &mut App, feet_height: f32, tuning: LocomotionTuning) -> Entity {
    let actor = app
        .world_mut()
        .spawn((
            Transform::from_xyz(0.0, feet_height + HALF_HEIGHT, 0.0),
            FirstPersonController::new(),
            tuning,
            SimBody::default(),
        ))
        .id();
    app.world_mut().spawn((
        HeadPivot,
        Transform::from_xyz(0.0, HEAD_HEIGHT, 0.0),
        ChildOf(actor),
    ));
    actor
}

/// Run the app for N updates (one fixed tick each).
pub fn run_frames(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

/// Step until `done` holds, up to `max_frames`. Returns the frames taken.
pub fn run_until(
    app: &mut App,
    max_frames: usize,
    mut done: impl FnMut(&World) -> bool,
) -> Option<usize> {
    for frame in 1..=max_frames {
        app.update();
        if done(app.world()) {
            return Some(frame);
        }
    }
    None
}

pub fn controller(app: &App, actor: Entity) -> &FirstPersonController {
    app.world()
        .get::<FirstPersonController>(actor)
        .expect("actor has a controller")
}

pub fn body(app: &App, actor: Entity) -> SimBody {
    *app.world().get::<SimBody>(actor).expect("actor has a body")
}

pub fn intent_mut(app: &mut App, actor: Entity) -> Mut<'_, MovementIntent> {
    app.world_mut()
        .get_mut::<MovementIntent>(actor)
        .expect("actor has an intent")
}

pub fn overlay_nodes(app: &mut App) -> usize {
    app.world_mut()
        .query_filtered::<Entity, With<fp_locomotion::feedback::DarkenOverlayNode>>()
        .iter(app.world())
        .count()
}

pub fn horizontal_speed(velocity: Vec3) -> f32 {
    Vec2::new(velocity.x, velocity.z).length()
}
