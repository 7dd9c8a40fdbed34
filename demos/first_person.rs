//! First Person Example
//!
//! A walkable arena with towers of different heights to jump off:
//! - A floor split into grass and stone
//! - Three towers (2, 5 and 9 units tall) with ramps up to them
//! - Walls to bump into while airborne
//!
//! ## Controls
//! - **WASD**: Move
//! - **Shift** (hold): Run
//! - **Space**: Jump
//! - **Mouse**: Look (click to grab the cursor, **Escape** to release)
//! - **R**: Respawn on top of the tallest tower
//!
//! Falls from the taller towers darken the screen and shake the camera.

use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow};
use bevy_rapier3d::prelude::*;
use fp_locomotion::prelude::*;

// ==================== Constants ====================

const ACTOR_HALF_HEIGHT: f32 = 0.5;
const ACTOR_RADIUS: f32 = 0.4;
const EYE_HEIGHT: f32 = 0.6;

const ARENA_HALF_SIZE: f32 = 30.0;
const WALL_HEIGHT: f32 = 4.0;

const TOWERS: [(f32, f32); 3] = [(-10.0, 2.0), (0.0, 5.0), (10.0, 9.0)];

/// Collision group of the actor; everything else is ground.
const ACTOR_GROUP: Group = Group::GROUP_2;
const GROUND_GROUP: Group = Group::GROUP_1;

// ==================== Main ====================

fn spawn_position() -> Vec3 {
    Vec3::new(0.0, ACTOR_HALF_HEIGHT + ACTOR_RADIUS + 0.1, 12.0)
}

fn tower_top() -> Vec3 {
    let (x, height) = TOWERS[2];
    Vec3::new(x, height + ACTOR_HALF_HEIGHT + ACTOR_RADIUS + 0.1, -10.0)
}

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "First Person - Locomotion Example".into(),
                resolution: (1280.0, 720.0).into(),
                ..default()
            }),
            ..default()
        }))
        // Physics
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
        // Character controller
        .add_plugins(FirstPersonControllerPlugin::<Rapier3dBackend>::default())
        .add_systems(Startup, (setup_scene, spawn_player))
        .add_systems(Update, (grab_cursor, respawn, log_impacts))
        .run();
}

// ==================== Setup ====================

#[derive(Component)]
struct Player;

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 12.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let grass = materials.add(Color::srgb(0.3, 0.55, 0.25));
    let stone = materials.add(Color::srgb(0.55, 0.55, 0.6));

    // Floor halves, tagged for footstep selection
    for (x, material, surface) in [
        (-ARENA_HALF_SIZE / 2.0, grass.clone(), "Grass"),
        (ARENA_HALF_SIZE / 2.0, stone.clone(), "Stone"),
    ] {
        let half = Vec3::new(ARENA_HALF_SIZE / 2.0, 0.5, ARENA_HALF_SIZE);
        commands.spawn((
            Mesh3d(meshes.add(Cuboid::from_size(half * 2.0))),
            MeshMaterial3d(material),
            Transform::from_xyz(x, -0.5, 0.0),
            RigidBody::Fixed,
            Collider::cuboid(half.x, half.y, half.z),
            CollisionGroups::new(GROUND_GROUP, Group::ALL),
            SurfaceTag::new(surface),
        ));
    }

    // Towers with a ramp leading up to each
    for (x, height) in TOWERS {
        let half = Vec3::new(2.0, height / 2.0, 2.0);
        commands.spawn((
            Mesh3d(meshes.add(Cuboid::from_size(half * 2.0))),
            MeshMaterial3d(stone.clone()),
            Transform::from_xyz(x, half.y, -10.0),
            RigidBody::Fixed,
            Collider::cuboid(half.x, half.y, half.z),
            CollisionGroups::new(GROUND_GROUP, Group::ALL),
            SurfaceTag::new("Stone"),
        ));

        let length = height * 3.0;
        let angle = (height / length).atan();
        let ramp = Vec3::new(1.0, 0.1, length.hypot(height) / 2.0);
        commands.spawn((
            Mesh3d(meshes.add(Cuboid::from_size(ramp * 2.0))),
            MeshMaterial3d(grass.clone()),
            Transform::from_xyz(x, height / 2.0, -10.0 + 2.0 + length / 2.0)
                .with_rotation(Quat::from_rotation_x(angle)),
            RigidBody::Fixed,
            Collider::cuboid(ramp.x, ramp.y, ramp.z),
            CollisionGroups::new(GROUND_GROUP, Group::ALL),
        ));
    }

    // Perimeter walls
    let wall_material = materials.add(Color::srgb(0.4, 0.35, 0.3));
    for (position, half) in [
        (
            Vec3::new(0.0, WALL_HEIGHT / 2.0, -ARENA_HALF_SIZE),
            Vec3::new(ARENA_HALF_SIZE, WALL_HEIGHT / 2.0, 0.5),
        ),
        (
            Vec3::new(0.0, WALL_HEIGHT / 2.0, ARENA_HALF_SIZE),
            Vec3::new(ARENA_HALF_SIZE, WALL_HEIGHT / 2.0, 0.5),
        ),
        (
            Vec3::new(-ARENA_HALF_SIZE, WALL_HEIGHT / 2.0, 0.0),
            Vec3::new(0.5, WALL_HEIGHT / 2.0, ARENA_HALF_SIZE),
        ),
        (
            Vec3::new(ARENA_HALF_SIZE, WALL_HEIGHT / 2.0, 0.0),
            Vec3::new(0.5, WALL_HEIGHT / 2.0, ARENA_HALF_SIZE),
        ),
    ] {
        commands.spawn((
            Mesh3d(meshes.add(Cuboid::from_size(half * 2.0))),
            MeshMaterial3d(wall_material.clone()),
            Transform::from_translation(position),
            RigidBody::Fixed,
            Collider::cuboid(half.x, half.y, half.z),
            CollisionGroups::new(GROUND_GROUP, Group::ALL),
        ));
    }
}

fn spawn_player(mut commands: Commands) {
    let tuning = LocomotionTuning::default().with_ground_probe(0.15, GROUND_GROUP.bits());

    let player = commands
        .spawn((
            Name::new("Player"),
            Player,
            Transform::from_translation(spawn_position()),
            FirstPersonController::new(),
            tuning,
            InputBindings::default(),
            Rapier3dCharacterBundle::new(),
            Collider::capsule_y(ACTOR_HALF_HEIGHT, ACTOR_RADIUS),
            CollisionGroups::new(ACTOR_GROUP, Group::ALL),
            SoundBank::default(),
        ))
        .id();

    commands.spawn((
        Name::new("Head"),
        HeadPivot,
        Camera3d::default(),
        Transform::from_xyz(0.0, EYE_HEIGHT, 0.0),
        ChildOf(player),
    ));
}

// ==================== Systems ====================

/// Lock the cursor on click and release it on Escape.
fn grab_cursor(
    mouse: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    let Ok(mut window) = windows.single_mut() else {
        return;
    };

    if mouse.just_pressed(MouseButton::Left) {
        window.cursor_options.grab_mode = CursorGrabMode::Locked;
        window.cursor_options.visible = false;
    }
    if keyboard.just_pressed(KeyCode::Escape) {
        window.cursor_options.grab_mode = CursorGrabMode::None;
        window.cursor_options.visible = true;
    }
}

fn respawn(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut q_player: Query<(&mut Transform, &mut Velocity), With<Player>>,
) {
    if !keyboard.just_pressed(KeyCode::KeyR) {
        return;
    }
    for (mut transform, mut velocity) in &mut q_player {
        transform.translation = tower_top();
        *velocity = Velocity::zero();
    }
}

fn log_impacts(mut events: EventReader<ImpactEvent>) {
    for event in events.read() {
        if let ImpactEventKind::Started { severity, .. } = event.kind {
            info!("Hard landing, severity {severity:.2}");
        }
    }
}
