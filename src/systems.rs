//! Core controller systems.
//!
//! These systems implement the first-person controller behavior. The fixed
//! tick systems are generic over the physics backend to allow different
//! physics engines to be used; the per-frame systems only touch controller
//! state.

use bevy::prelude::*;

use crate::backend::LocomotionBackend;
use crate::camera::HeadPivot;
use crate::collision::ContactImpact;
use crate::config::{FirstPersonController, LocomotionTuning};
use crate::detection::{derive_velocity, GroundState};
use crate::error::ControllerError;
use crate::feedback::{CueKind, FeedbackCue};
use crate::impact::{
    track_fall, FallTracker, ImpactEvent, ImpactEventKind, ImpactTick, LandingOutcome,
    LocomotionState,
};
use crate::intent::MovementIntent;
use crate::locomotion::{can_jump, compute_velocity};
use crate::state::{Airborne, Grounded, Stunned};

// ============================================================================
// Fixed Tick
// ============================================================================

/// Fold the backend's ground probe into each controller's [`GroundState`].
///
/// The first tick an actor is sensed seeds the contact history and the fall
/// apex from the current state, so spawning never produces a landing.
pub fn update_ground_state<B: LocomotionBackend>(world: &mut World) {
    let dt = B::get_fixed_timestep(world);

    let entities: Vec<Entity> = world
        .query_filtered::<Entity, With<FirstPersonController>>()
        .iter(world)
        .collect();

    for entity in entities {
        let position = B::get_position(world, entity);
        let Some(mut controller) = world.get_mut::<FirstPersonController>(entity) else {
            continue;
        };

        let probe = controller.ground_probe.clone();
        match controller.previous_position {
            None => {
                controller.ground = GroundState::seeded(probe.as_ref());
                controller.fall = FallTracker::new(position);
                controller.measured_velocity = Vec3::ZERO;
            }
            Some(previous) => {
                controller.ground.advance(probe.as_ref());
                controller.measured_velocity = derive_velocity(previous, position, dt);
            }
        }
        controller.previous_position = Some(position);
    }
}

/// Track the fall apex and evaluate landings.
///
/// A qualifying landing installs a new [`ImpactEffect`](crate::impact::ImpactEffect),
/// replacing any running one, and announces it with [`ImpactEvent`]. The
/// landing cue is independent of the stun.
pub fn track_landing_impact<B: LocomotionBackend>(world: &mut World) {
    let entities: Vec<(Entity, LocomotionTuning)> = world
        .query::<(Entity, &LocomotionTuning, &FirstPersonController)>()
        .iter(world)
        .filter(|(_, _, controller)| controller.is_sensed())
        .map(|(e, tuning, _)| (e, *tuning))
        .collect();

    for (entity, tuning) in entities {
        let position = B::get_position(world, entity);

        let (outcome, impact) = {
            let Some(mut controller) = world.get_mut::<FirstPersonController>(entity) else {
                continue;
            };
            let controller = &mut *controller;

            let Some(fall_height) = track_fall(&mut controller.fall, &controller.ground, position)
            else {
                continue;
            };

            let outcome = LandingOutcome::evaluate(fall_height, &tuning);
            let impact = outcome.effect.map(|effect| {
                let restarted = controller.begin_impact(effect);
                ImpactEvent {
                    actor: entity,
                    kind: ImpactEventKind::Started {
                        severity: effect.severity,
                        overlay_opacity: effect.overlay_opacity(),
                        shake_intensity: tuning.stun_effect_intensity,
                        shake_duration: effect.shake_duration(&tuning),
                        restarted,
                    },
                }
            });
            (outcome, impact)
        };

        debug!(
            "{entity} landed: fall {:.2}, severity {:.2}, stun {}",
            outcome.fall_height,
            outcome.severity,
            impact.is_some()
        );

        if let Some(impact) = impact {
            world.send_event(impact);
        }
        if outcome.landing_sound {
            world.send_event(FeedbackCue::new(
                entity,
                CueKind::Landing {
                    fall_height: outcome.fall_height,
                },
            ));
        }
    }
}

/// Write the horizontal velocity command.
///
/// Vertical velocity is left to the physics engine.
pub fn apply_locomotion<B: LocomotionBackend>(world: &mut World) {
    let entities: Vec<(Entity, MovementIntent, LocomotionTuning, f32, bool)> = world
        .query::<(
            Entity,
            &MovementIntent,
            &LocomotionTuning,
            &FirstPersonController,
        )>()
        .iter(world)
        .filter(|(_, _, _, controller)| controller.is_sensed())
        .map(|(e, intent, tuning, controller)| {
            (
                e,
                intent.clone(),
                *tuning,
                controller.speed_multiplier(),
                controller.is_stunned(),
            )
        })
        .collect();

    for (entity, intent, tuning, speed_multiplier, is_stunned) in entities {
        let current = B::get_velocity(world, entity);
        let facing = B::get_rotation(world, entity);
        let velocity = compute_velocity(
            &intent,
            facing,
            &tuning,
            speed_multiplier,
            is_stunned,
            current,
        );
        B::set_velocity(world, entity, velocity);
    }
}

/// Turn latched jump requests into jumps.
///
/// Every latched request is consumed this tick; one that cannot jump is
/// discarded rather than buffered.
pub fn apply_jump<B: LocomotionBackend>(world: &mut World) {
    let entities: Vec<(Entity, f32, bool)> = world
        .query::<(
            Entity,
            &MovementIntent,
            &LocomotionTuning,
            &FirstPersonController,
        )>()
        .iter(world)
        .filter(|(_, intent, _, _)| intent.has_jump_request())
        .map(|(e, _, tuning, controller)| {
            (
                e,
                tuning.jump_impulse,
                can_jump(controller.is_grounded(), controller.is_stunned()),
            )
        })
        .collect();

    for (entity, jump_impulse, allowed) in entities {
        // Consume the jump request
        if let Some(mut intent) = world.get_mut::<MovementIntent>(entity) {
            intent.take_jump_request();
        }

        if !allowed {
            continue;
        }

        B::apply_impulse(world, entity, Vec3::Y * jump_impulse);
        world.send_event(FeedbackCue::new(entity, CueKind::Jump));
    }
}

/// Turn airborne contact impacts into wall-hit cues.
///
/// Each actor is rate limited by its `wall_hit_cooldown`.
pub fn detect_wall_hits(
    time: Res<Time>,
    mut contacts: EventReader<ContactImpact>,
    mut cues: EventWriter<FeedbackCue>,
    mut q_controllers: Query<(&mut FirstPersonController, &LocomotionTuning)>,
) {
    let dt = time.delta_secs();
    for (mut controller, _) in &mut q_controllers {
        if controller.wall_hit_cooldown > 0.0 {
            controller.wall_hit_cooldown = (controller.wall_hit_cooldown - dt).max(0.0);
        }
    }

    for contact in contacts.read() {
        let Ok((mut controller, tuning)) = q_controllers.get_mut(contact.actor) else {
            continue;
        };

        if controller.is_grounded()
            || contact.relative_speed <= tuning.wall_hit_speed
            || controller.wall_hit_cooldown > 0.0
        {
            continue;
        }

        controller.wall_hit_cooldown = tuning.wall_hit_cooldown;
        cues.write(FeedbackCue::new(
            contact.actor,
            CueKind::WallHit {
                relative_speed: contact.relative_speed,
            },
        ));
    }
}

// ============================================================================
// Per Frame
// ============================================================================

/// Count down impact effects and drop them once they run out.
pub fn advance_impact_effects(
    time: Res<Time>,
    mut events: EventWriter<ImpactEvent>,
    mut q_controllers: Query<(Entity, &mut FirstPersonController)>,
) {
    let dt = time.delta_secs();

    for (entity, mut controller) in &mut q_controllers {
        let Some(effect) = controller.impact.as_mut() else {
            continue;
        };

        match effect.advance(dt) {
            ImpactTick::Continuing => {}
            ImpactTick::StunEnded => {
                debug!("{entity} stun ended");
                events.write(ImpactEvent {
                    actor: entity,
                    kind: ImpactEventKind::StunEnded,
                });
            }
            ImpactTick::Finished => {
                controller.impact = None;
                debug!("{entity} impact effect ended");
                events.write(ImpactEvent {
                    actor: entity,
                    kind: ImpactEventKind::Ended,
                });
            }
        }
    }
}

/// Emit footstep cues while moving on the ground.
pub fn update_footsteps(
    time: Res<Time>,
    mut cues: EventWriter<FeedbackCue>,
    mut q_controllers: Query<(
        Entity,
        &mut FirstPersonController,
        &MovementIntent,
        &LocomotionTuning,
    )>,
) {
    let dt = time.delta_secs();

    for (entity, mut controller, intent, tuning) in &mut q_controllers {
        if !controller.is_grounded() || controller.is_stunned() || !intent.has_direction() {
            continue;
        }

        let interval = tuning.footstep_interval_for(intent.run);
        if controller.footsteps.advance(dt, interval) {
            cues.write(FeedbackCue::new(
                entity,
                CueKind::Footstep {
                    surface: controller.surface().cloned(),
                },
            ));
        }
    }
}

/// Sync state marker components with the controller state.
pub fn sync_state_markers(
    mut commands: Commands,
    q_controllers: Query<(
        Entity,
        &FirstPersonController,
        Has<Grounded>,
        Has<Airborne>,
        Has<Stunned>,
    )>,
) {
    for (entity, controller, has_grounded, has_airborne, has_stunned) in &q_controllers {
        if !controller.is_sensed() {
            continue;
        }

        let state = controller.state();
        let want_grounded = state == LocomotionState::Grounded;
        let want_airborne = state == LocomotionState::Airborne;
        let want_stunned = state == LocomotionState::Stunned;

        let mut entity_commands = commands.entity(entity);
        if want_grounded != has_grounded {
            if want_grounded {
                entity_commands.insert(Grounded);
            } else {
                entity_commands.remove::<Grounded>();
            }
        }
        if want_airborne != has_airborne {
            if want_airborne {
                entity_commands.insert(Airborne);
            } else {
                entity_commands.remove::<Airborne>();
            }
        }
        if want_stunned != has_stunned {
            if want_stunned {
                entity_commands.insert(Stunned);
            } else {
                entity_commands.remove::<Stunned>();
            }
        }
    }
}

/// Validate newly added controllers.
///
/// A missing [`HeadPivot`] child or an invalid tuning value is fatal. An actor
/// that is itself a member of its ground layer only gets a warning, since its
/// probe excludes its own body.
pub fn validate_controllers<B: LocomotionBackend>(
    world: &World,
    q_new: Query<(Entity, &LocomotionTuning), Added<FirstPersonController>>,
    q_heads: Query<&ChildOf, With<HeadPivot>>,
) -> Result {
    for (actor, tuning) in &q_new {
        tuning.validate()?;

        if !q_heads.iter().any(|child_of| child_of.parent() == actor) {
            return Err(ControllerError::MissingHead { actor }.into());
        }

        if let Some((memberships, _)) = B::get_collision_groups(world, actor) {
            if memberships & tuning.ground_layer != 0 {
                warn!(
                    "{actor} is a member of its own ground layer ({:#x}); use a different collision group for the actor",
                    tuning.ground_layer
                );
            }
        }
    }
    Ok(())
}
