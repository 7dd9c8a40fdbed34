//! Integration tests for the first-person controller.
//!
//! These tests run the full plugin against a deterministic flat-world backend.
//! Each test produces PROOF through explicit state, event and velocity checks.

mod common;

use approx::assert_relative_eq;
use bevy::prelude::*;
use common::*;
use fp_locomotion::prelude::*;

/// Tuning with a long recovery window so restarts land inside a running effect.
fn long_recovery() -> LocomotionTuning {
    LocomotionTuning::default().with_landing_slow(2.0, 0.5, 1.0)
}

fn has<T: Component>(app: &App, actor: Entity) -> bool {
    app.world().get::<T>(actor).is_some()
}

/// Drop the actor from `feet_height` and step until the landing is processed.
fn drop_and_land(app: &mut App, actor: Entity) -> usize {
    run_until(app, 400, |world| {
        world
            .get::<FirstPersonController>(actor)
            .is_some_and(|c| c.is_grounded() && c.is_sensed())
    })
    .expect("actor should land")
}

// ==================== Ground Sensor Tests ====================

mod ground_sensor {
    use super::*;

    #[test]
    fn spawning_on_ground_is_not_a_landing() {
        let mut app = create_test_app();
        let actor = spawn_actor(&mut app, 0.0, LocomotionTuning::default());

        run_frames(&mut app, 30);

        let controller = controller(&app, actor);
        println!("PROOF: grounded={}, ground={:?}", controller.is_grounded(), controller.ground);

        assert!(controller.is_grounded());
        assert!(has::<Grounded>(&app, actor));
        assert!(!has::<Airborne>(&app, actor));
        assert!(app.world().resource::<ImpactLog>().0.is_empty());
        assert_eq!(
            app.world()
                .resource::<CueLog>()
                .count(actor, |k| matches!(k, CueKind::Landing { .. })),
            0
        );
    }

    #[test]
    fn spawning_in_air_seeds_apex_at_spawn_height() {
        let mut app = create_test_app();
        let actor = spawn_actor(&mut app, 3.0, LocomotionTuning::default());

        run_frames(&mut app, 2);

        let controller = controller(&app, actor);
        assert!(!controller.is_grounded());
        assert!(has::<Airborne>(&app, actor));
        assert_relative_eq!(controller.fall.apex_height, 3.0 + HALF_HEIGHT, epsilon = 1e-3);
    }

    #[test]
    fn measured_velocity_follows_the_fall() {
        let mut app = create_test_app();
        let actor = spawn_actor(&mut app, 10.0, LocomotionTuning::default());

        run_frames(&mut app, 20);

        let measured = controller(&app, actor).measured_velocity;
        println!("PROOF: measured_velocity={measured:?}");
        assert!(measured.y < -1.0);
        assert_relative_eq!(measured.x, 0.0);
    }

    #[test]
    fn surface_tag_reaches_the_controller() {
        let mut app = create_test_app();
        app.world_mut().resource_mut::<Floor>().surface = Some(SurfaceTag::new("Dirt"));
        let actor = spawn_actor(&mut app, 0.0, LocomotionTuning::default());

        run_frames(&mut app, 3);

        assert_eq!(
            controller(&app, actor).surface().map(SurfaceTag::as_str),
            Some("Dirt")
        );
    }

    #[test]
    fn floor_outside_ground_layer_is_not_ground() {
        let mut app = create_test_app();
        app.world_mut().resource_mut::<Floor>().layers = 0b100;
        let actor = spawn_actor(&mut app, 0.0, LocomotionTuning::default());

        run_frames(&mut app, 3);

        assert!(!controller(&app, actor).is_grounded());
    }
}

// ==================== Landing Impact Tests ====================

mod landing_impact {
    use super::*;

    #[test]
    fn six_unit_fall_stuns_and_darkens() {
        let mut app = create_test_app();
        let tuning = LocomotionTuning::default();
        let actor = spawn_actor(&mut app, 6.0, tuning);

        drop_and_land(&mut app, actor);

        let effect = controller(&app, actor).impact.expect("hard landing creates an effect");
        println!("PROOF: effect={effect:?}");
        assert_relative_eq!(effect.severity, 1.0);
        assert!(has::<Stunned>(&app, actor));
        assert!(!has::<Grounded>(&app, actor));

        // Overlay at a quarter opacity, owned by the actor
        let overlay = app.world().resource::<DarkenOverlay>();
        assert_eq!(overlay.owner(), Some(actor));
        assert_relative_eq!(overlay.opacity().unwrap(), 0.25);
        assert_eq!(overlay_nodes(&mut app), 1);

        // Camera shake on the head
        let mut heads = app
            .world_mut()
            .query_filtered::<&CameraShake, With<HeadPivot>>();
        assert_eq!(heads.iter(app.world()).count(), 1);

        // Landing cue plays
        let cues = app.world().resource::<CueLog>();
        assert_eq!(cues.count(actor, |k| matches!(k, CueKind::Landing { .. })), 1);
    }

    #[test]
    fn stun_then_recovery_then_release() {
        let mut app = create_test_app();
        let tuning = LocomotionTuning::default();
        let actor = spawn_actor(&mut app, 6.0, tuning);

        drop_and_land(&mut app, actor);

        // Hard stun lasts max_landing_stun (1 s = 64 frames)
        run_frames(&mut app, 70);
        let controller_state = controller(&app, actor);
        assert_eq!(controller_state.state(), LocomotionState::Grounded);
        assert!(controller_state.impact.is_some(), "recovery window still running");
        assert_relative_eq!(controller_state.speed_multiplier(), tuning.landing_slow_factor);
        assert!(has::<Grounded>(&app, actor));
        assert!(!has::<Stunned>(&app, actor));

        // Recovery lasts landing_slow_duration (0.5 s = 32 frames)
        run_frames(&mut app, 40);
        let controller_state = controller(&app, actor);
        assert!(controller_state.impact.is_none());
        assert_eq!(controller_state.speed_multiplier(), 1.0);
        assert_eq!(overlay_nodes(&mut app), 0);
        assert!(!app.world().resource::<DarkenOverlay>().is_active());

        let log = app.world().resource::<ImpactLog>();
        let kinds: Vec<_> = log.0.iter().map(|e| e.kind).collect();
        assert!(matches!(kinds[0], ImpactEventKind::Started { restarted: false, .. }));
        assert!(kinds.contains(&ImpactEventKind::StunEnded));
        assert_eq!(kinds.last(), Some(&ImpactEventKind::Ended));
    }

    #[test]
    fn small_fall_has_no_effects() {
        let mut app = create_test_app();
        let actor = spawn_actor(&mut app, 0.2, LocomotionTuning::default());

        drop_and_land(&mut app, actor);
        run_frames(&mut app, 5);

        println!("PROOF: impact={:?}", controller(&app, actor).impact);
        assert!(controller(&app, actor).impact.is_none());
        assert!(has::<Grounded>(&app, actor));
        assert_eq!(overlay_nodes(&mut app), 0);

        let cues = app.world().resource::<CueLog>();
        assert_eq!(cues.count(actor, |k| matches!(k, CueKind::Landing { .. })), 0);
    }

    #[test]
    fn moderate_fall_plays_landing_without_stun() {
        let mut app = create_test_app();
        let tuning = LocomotionTuning {
            stun_threshold: 0.3,
            ..default()
        };
        let actor = spawn_actor(&mut app, 1.0, tuning);

        drop_and_land(&mut app, actor);

        assert!(controller(&app, actor).impact.is_none());
        let cues = app.world().resource::<CueLog>();
        assert_eq!(cues.count(actor, |k| matches!(k, CueKind::Landing { .. })), 1);
    }

    #[test]
    fn apex_resets_after_landing() {
        let mut app = create_test_app();
        let actor = spawn_actor(&mut app, 6.0, LocomotionTuning::default());

        drop_and_land(&mut app, actor);

        // Apex sits at the landing position, within probe reach of the floor
        let apex = controller(&app, actor).fall.apex_height;
        println!("PROOF: apex after landing={apex}");
        assert!(apex >= HALF_HEIGHT - 1e-4);
        assert!(apex <= HALF_HEIGHT + 0.1 + 1e-4);
    }

    #[test]
    fn landing_during_effect_restarts_it() {
        let mut app = create_test_app();
        let actor = spawn_actor(&mut app, 6.0, long_recovery());

        drop_and_land(&mut app, actor);
        let first_node = app.world().resource::<DarkenOverlay>().node();

        // Lift the actor straight back up and drop it again
        app.world_mut()
            .get_mut::<Transform>(actor)
            .unwrap()
            .translation
            .y = 6.0 + HALF_HEIGHT;
        run_frames(&mut app, 2);
        assert!(!controller(&app, actor).is_grounded());

        let mut max_nodes = 0;
        for _ in 0..400 {
            app.update();
            max_nodes = max_nodes.max(overlay_nodes(&mut app));
            if controller(&app, actor).is_grounded() {
                break;
            }
        }
        assert!(controller(&app, actor).is_grounded(), "second landing");

        let started = app.world().resource::<ImpactLog>().started(actor);
        println!("PROOF: started events={started:?}");
        assert_eq!(started.len(), 2);
        assert!(matches!(started[1], ImpactEventKind::Started { restarted: true, .. }));

        // One overlay, freshly created
        assert_eq!(max_nodes, 1);
        assert_eq!(overlay_nodes(&mut app), 1);
        assert_ne!(app.world().resource::<DarkenOverlay>().node(), first_node);
        assert!(has::<Stunned>(&app, actor));
    }

    #[test]
    fn two_actors_share_one_overlay() {
        let mut app = create_test_app();
        let first = spawn_actor(&mut app, 6.0, LocomotionTuning::default());
        let second = spawn_actor(&mut app, 6.0, LocomotionTuning::default());

        drop_and_land(&mut app, first);
        run_frames(&mut app, 2);

        assert!(controller(&app, first).impact.is_some());
        assert!(controller(&app, second).impact.is_some());
        assert_eq!(overlay_nodes(&mut app), 1);

        // Both effects run out together; the overlay goes with its owner
        run_frames(&mut app, 120);
        assert_eq!(overlay_nodes(&mut app), 0);
    }

    #[test]
    fn despawning_owner_mid_stun_releases_overlay() {
        let mut app = create_test_app();
        let first = spawn_actor(&mut app, 6.0, LocomotionTuning::default());

        drop_and_land(&mut app, first);
        assert!(controller(&app, first).is_stunned());
        assert_eq!(overlay_nodes(&mut app), 1);

        app.world_mut().entity_mut(first).despawn();
        run_frames(&mut app, 1);

        println!("PROOF: overlay active={}", app.world().resource::<DarkenOverlay>().is_active());
        assert_eq!(overlay_nodes(&mut app), 0);
        assert!(!app.world().resource::<DarkenOverlay>().is_active());

        // A later hard landing by another actor gets its own overlay
        let second = spawn_actor(&mut app, 6.0, LocomotionTuning::default());
        drop_and_land(&mut app, second);

        let overlay = app.world().resource::<DarkenOverlay>();
        assert_eq!(overlay.owner(), Some(second));
        assert_eq!(overlay_nodes(&mut app), 1);

        // And it goes away when that effect ends
        run_frames(&mut app, 120);
        assert_eq!(overlay_nodes(&mut app), 0);
    }
}

// ==================== Locomotion Tests ====================

mod locomotion {
    use super::*;

    #[test]
    fn walk_forward_sets_horizontal_velocity() {
        let mut app = create_test_app();
        let actor = spawn_actor(&mut app, 0.0, LocomotionTuning::default());
        run_frames(&mut app, 2);

        intent_mut(&mut app, actor).set_forward(1.0);
        run_frames(&mut app, 1);

        let velocity = body(&app, actor).velocity;
        println!("PROOF: velocity={velocity:?}");
        assert_relative_eq!(velocity.z, -5.0, epsilon = 1e-4);
        assert_relative_eq!(velocity.x, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn run_and_backward_speeds() {
        let mut app = create_test_app();
        let actor = spawn_actor(&mut app, 0.0, LocomotionTuning::default());
        run_frames(&mut app, 2);

        {
            let mut intent = intent_mut(&mut app, actor);
            intent.set_forward(1.0);
            intent.set_run(true);
        }
        run_frames(&mut app, 1);
        assert_relative_eq!(horizontal_speed(body(&app, actor).velocity), 8.0, epsilon = 1e-4);

        {
            let mut intent = intent_mut(&mut app, actor);
            intent.set_forward(-1.0);
            intent.set_run(false);
        }
        run_frames(&mut app, 1);
        assert_relative_eq!(horizontal_speed(body(&app, actor).velocity), 3.0, epsilon = 1e-4);
    }

    #[test]
    fn releasing_input_stops_immediately() {
        let mut app = create_test_app();
        let actor = spawn_actor(&mut app, 0.0, LocomotionTuning::default());
        run_frames(&mut app, 2);

        intent_mut(&mut app, actor).set_strafe(1.0);
        run_frames(&mut app, 3);
        assert!(horizontal_speed(body(&app, actor).velocity) > 0.0);

        intent_mut(&mut app, actor).clear();
        run_frames(&mut app, 1);
        assert_eq!(horizontal_speed(body(&app, actor).velocity), 0.0);
    }

    #[test]
    fn stunned_actor_cannot_move_then_recovers_slowly() {
        let mut app = create_test_app();
        let tuning = LocomotionTuning::default();
        let actor = spawn_actor(&mut app, 6.0, tuning);

        drop_and_land(&mut app, actor);
        {
            let mut intent = intent_mut(&mut app, actor);
            intent.set_forward(1.0);
            intent.set_strafe(1.0);
        }
        run_frames(&mut app, 2);

        let stunned_velocity = body(&app, actor).velocity;
        println!("PROOF: stunned velocity={stunned_velocity:?}");
        assert!(controller(&app, actor).is_stunned());
        assert_eq!(horizontal_speed(stunned_velocity), 0.0);

        // Past the stun, inside the recovery window
        run_frames(&mut app, 70);
        {
            let mut intent = intent_mut(&mut app, actor);
            intent.set_strafe(0.0);
        }
        run_frames(&mut app, 1);
        assert!(!controller(&app, actor).is_stunned());
        assert_relative_eq!(
            horizontal_speed(body(&app, actor).velocity),
            tuning.walk_speed * tuning.landing_slow_factor,
            epsilon = 1e-4
        );
    }

    #[test]
    fn movement_follows_yaw() {
        let mut app = create_test_app();
        let actor = spawn_actor(&mut app, 0.0, LocomotionTuning::default());
        app.world_mut().get_mut::<LookConfig>(actor).unwrap().sensitivity = 1.0;
        run_frames(&mut app, 2);

        {
            let mut intent = intent_mut(&mut app, actor);
            intent.add_look_delta(Vec2::new(90.0, 0.0));
            intent.set_forward(1.0);
        }
        // Look is applied in Update, after this frame's fixed tick
        run_frames(&mut app, 2);

        let velocity = body(&app, actor).velocity;
        println!("PROOF: turned velocity={velocity:?}");
        assert_relative_eq!(velocity.x, 5.0, epsilon = 1e-3);
        assert_relative_eq!(velocity.z, 0.0, epsilon = 1e-3);
    }
}

// ==================== Jump Tests ====================

mod jump {
    use super::*;

    fn jump_tuning() -> LocomotionTuning {
        LocomotionTuning {
            jump_impulse: 4.0,
            stun_threshold: 0.5,
            ..default()
        }
    }

    fn jumps(app: &App, actor: Entity) -> usize {
        app.world()
            .resource::<CueLog>()
            .count(actor, |k| matches!(k, CueKind::Jump))
    }

    #[test]
    fn holding_jump_jumps_once() {
        let mut app = create_test_app();
        let actor = spawn_actor(&mut app, 0.0, jump_tuning());
        run_frames(&mut app, 2);

        for _ in 0..30 {
            intent_mut(&mut app, actor).set_jump_pressed(true);
            app.update();
        }

        println!("PROOF: jumps={}", jumps(&app, actor));
        assert_eq!(jumps(&app, actor), 1);
        assert!(!controller(&app, actor).is_grounded());
    }

    #[test]
    fn jump_impulse_changes_velocity() {
        let mut app = create_test_app();
        let actor = spawn_actor(&mut app, 0.0, jump_tuning());
        run_frames(&mut app, 2);

        intent_mut(&mut app, actor).set_jump_pressed(true);
        run_frames(&mut app, 1);

        let velocity = body(&app, actor).velocity;
        println!("PROOF: velocity after jump={velocity:?}");
        assert!(velocity.y > 3.5);
    }

    #[test]
    fn release_and_press_jumps_again_after_landing() {
        let mut app = create_test_app();
        let actor = spawn_actor(&mut app, 0.0, jump_tuning());
        run_frames(&mut app, 2);

        intent_mut(&mut app, actor).set_jump_pressed(true);
        run_frames(&mut app, 3);
        intent_mut(&mut app, actor).set_jump_pressed(false);

        drop_and_land(&mut app, actor);
        run_frames(&mut app, 1);

        intent_mut(&mut app, actor).set_jump_pressed(true);
        run_frames(&mut app, 1);
        assert_eq!(jumps(&app, actor), 2);
    }

    #[test]
    fn press_in_air_is_discarded() {
        let mut app = create_test_app();
        let actor = spawn_actor(&mut app, 0.5, jump_tuning());
        run_frames(&mut app, 2);

        // Pressed and held through the landing: no buffered jump
        intent_mut(&mut app, actor).set_jump_pressed(true);
        drop_and_land(&mut app, actor);
        run_frames(&mut app, 10);

        assert_eq!(jumps(&app, actor), 0);
        assert!(!intent_mut(&mut app, actor).has_jump_request());
    }

    #[test]
    fn stunned_actor_cannot_jump() {
        let mut app = create_test_app();
        let actor = spawn_actor(&mut app, 6.0, LocomotionTuning::default());

        drop_and_land(&mut app, actor);
        intent_mut(&mut app, actor).set_jump_pressed(true);
        run_frames(&mut app, 2);

        assert!(controller(&app, actor).is_stunned());
        assert_eq!(jumps(&app, actor), 0);
    }
}

// ==================== Feedback Tests ====================

mod feedback {
    use super::*;

    fn footsteps(app: &App, actor: Entity) -> usize {
        app.world()
            .resource::<CueLog>()
            .count(actor, |k| matches!(k, CueKind::Footstep { .. }))
    }

    #[test]
    fn footsteps_while_walking() {
        let mut app = create_test_app();
        let actor = spawn_actor(&mut app, 0.0, LocomotionTuning::default());
        run_frames(&mut app, 2);
        assert_eq!(footsteps(&app, actor), 0);

        intent_mut(&mut app, actor).set_forward(1.0);
        run_frames(&mut app, 64);

        // One immediately, then every 0.4 s
        let count = footsteps(&app, actor);
        println!("PROOF: footsteps in 1s={count}");
        assert!((3..=4).contains(&count));
    }

    #[test]
    fn running_steps_are_faster() {
        let mut walking_app = create_test_app();
        let walker = spawn_actor(&mut walking_app, 0.0, LocomotionTuning::default());
        let mut running_app = create_test_app();
        let runner = spawn_actor(&mut running_app, 0.0, LocomotionTuning::default());
        run_frames(&mut walking_app, 2);
        run_frames(&mut running_app, 2);

        intent_mut(&mut walking_app, walker).set_forward(1.0);
        {
            let mut intent = intent_mut(&mut running_app, runner);
            intent.set_forward(1.0);
            intent.set_run(true);
        }
        run_frames(&mut walking_app, 128);
        run_frames(&mut running_app, 128);

        assert!(footsteps(&running_app, runner) > footsteps(&walking_app, walker));
    }

    #[test]
    fn footsteps_carry_surface() {
        let mut app = create_test_app();
        app.world_mut().resource_mut::<Floor>().surface = Some(SurfaceTag::new("Dirt"));
        let actor = spawn_actor(&mut app, 0.0, LocomotionTuning::default());
        run_frames(&mut app, 2);

        intent_mut(&mut app, actor).set_forward(1.0);
        run_frames(&mut app, 2);

        let cues = app.world().resource::<CueLog>();
        let dirt = SurfaceTag::new("Dirt");
        assert_eq!(
            cues.count(actor, |k| *k == CueKind::Footstep { surface: Some(dirt.clone()) }),
            1
        );
    }

    #[test]
    fn no_footsteps_in_air_or_standing() {
        let mut app = create_test_app();
        let standing = spawn_actor(&mut app, 0.0, LocomotionTuning::default());
        let falling = spawn_actor(&mut app, 50.0, LocomotionTuning::default());
        run_frames(&mut app, 2);

        intent_mut(&mut app, falling).set_forward(1.0);
        run_frames(&mut app, 40);

        assert_eq!(footsteps(&app, standing), 0);
        assert_eq!(footsteps(&app, falling), 0);
    }

    #[test]
    fn wall_hits_respect_cooldown_and_contact() {
        let mut app = create_test_app();
        let tuning = LocomotionTuning::default().with_wall_hit(2.0, 0.15);
        let flying = spawn_actor(&mut app, 30.0, tuning);
        let standing = spawn_actor(&mut app, 0.0, tuning);
        let wall = app.world_mut().spawn_empty().id();
        run_frames(&mut app, 2);

        let hit = |actor: Entity, relative_speed: f32| ContactImpact {
            actor,
            other: wall,
            relative_speed,
        };

        // Three fast hits in consecutive ticks: only the first plays
        for _ in 0..3 {
            app.world_mut().send_event(hit(flying, 5.0));
            app.update();
        }
        // Too slow, and grounded actors never play it
        app.world_mut().send_event(hit(flying, 1.0));
        app.world_mut().send_event(hit(standing, 10.0));
        app.update();

        let count = |app: &App, actor| {
            app.world()
                .resource::<CueLog>()
                .count(actor, |k| matches!(k, CueKind::WallHit { .. }))
        };
        assert_eq!(count(&app, flying), 1);
        assert_eq!(count(&app, standing), 0);

        // After the cooldown, hits play again
        run_frames(&mut app, 12);
        app.world_mut().send_event(hit(flying, 5.0));
        app.update();

        println!("PROOF: wall hits={}", count(&app, flying));
        assert_eq!(count(&app, flying), 2);
    }

    #[test]
    fn zero_cooldown_plays_every_hit() {
        let mut app = create_test_app();
        let tuning = LocomotionTuning::default().with_wall_hit(2.0, 0.0);
        let actor = spawn_actor(&mut app, 30.0, tuning);
        let wall = app.world_mut().spawn_empty().id();
        run_frames(&mut app, 2);

        for _ in 0..3 {
            app.world_mut().send_event(ContactImpact {
                actor,
                other: wall,
                relative_speed: 5.0,
            });
            app.update();
        }

        let cues = app.world().resource::<CueLog>();
        assert_eq!(cues.count(actor, |k| matches!(k, CueKind::WallHit { .. })), 3);
    }

    #[test]
    fn cues_spawn_audio_from_sound_bank() {
        let mut app = create_test_app();
        let actor = spawn_actor(&mut app, 0.0, LocomotionTuning::default());
        app.world_mut().entity_mut(actor).insert(SoundBank {
            jump: Some(Handle::default()),
            ..default()
        });
        run_frames(&mut app, 2);

        intent_mut(&mut app, actor).set_jump_pressed(true);
        run_frames(&mut app, 1);

        let mut players = app.world_mut().query::<&AudioPlayer>();
        assert_eq!(players.iter(app.world()).count(), 1);
    }
}

// ==================== Camera Tests ====================

mod camera {
    use super::*;

    #[test]
    fn pitch_is_clamped_on_the_head() {
        let mut app = create_test_app();
        let actor = spawn_actor(&mut app, 0.0, LocomotionTuning::default());
        run_frames(&mut app, 1);

        intent_mut(&mut app, actor).add_look_delta(Vec2::new(0.0, 1e6));
        run_frames(&mut app, 1);

        let angles = *app.world().get::<LookAngles>(actor).unwrap();
        assert_eq!(angles.pitch_degrees, 45.0);

        let mut heads = app
            .world_mut()
            .query_filtered::<&Transform, With<HeadPivot>>();
        let head = heads.single(app.world()).unwrap();
        let forward = head.rotation * Vec3::NEG_Z;
        assert_relative_eq!(forward.y, 45f32.to_radians().sin(), epsilon = 1e-4);
    }

    #[test]
    fn shake_leaves_head_at_rest() {
        let mut app = create_test_app();
        let actor = spawn_actor(&mut app, 6.0, LocomotionTuning::default());

        drop_and_land(&mut app, actor);
        run_frames(&mut app, 60);

        let mut heads = app
            .world_mut()
            .query_filtered::<(&Transform, Option<&CameraShake>), With<HeadPivot>>();
        let (head, shake) = heads.single(app.world()).unwrap();
        assert!(shake.is_none());
        assert_relative_eq!(head.translation.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(head.translation.y, HEAD_HEIGHT, epsilon = 1e-5);
    }
}

// ==================== Validation Tests ====================

mod validation {
    use super::*;

    #[test]
    #[should_panic]
    fn missing_head_is_fatal() {
        let mut app = create_test_app();
        app.world_mut().spawn((
            Transform::default(),
            FirstPersonController::new(),
            SimBody::default(),
        ));
        app.update();
    }

    #[test]
    #[should_panic]
    fn invalid_tuning_is_fatal() {
        let mut app = create_test_app();
        spawn_actor(
            &mut app,
            0.0,
            LocomotionTuning::default().with_reference_fall_distance(0.0),
        );
        app.update();
    }

    #[test]
    fn actor_in_ground_layer_only_warns() {
        let mut app = create_test_app();
        let actor = spawn_actor(&mut app, 0.0, LocomotionTuning::default());
        app.world_mut().get_mut::<SimBody>(actor).unwrap().memberships = 1;

        run_frames(&mut app, 3);
        assert!(controller(&app, actor).is_grounded());
    }
}
