//! Locomotion integrator.
//!
//! Turns a [`MovementIntent`] into a horizontal velocity command. The math is
//! kept free of ECS access so it can be reasoned about directly; the fixed
//! tick systems feed it the actor's facing and the active speed multiplier.

use bevy::prelude::*;

use crate::config::LocomotionTuning;
use crate::intent::MovementIntent;

/// Direction-weighted local intent vector `(lateral, longitudinal)`.
///
/// Backward input is scaled by `backward_speed_multiplier`, lateral input by
/// `side_speed_multiplier`. The result is clamped to unit length so that a
/// diagonal is never faster than a straight line.
pub fn local_direction(intent: &MovementIntent, tuning: &LocomotionTuning) -> Vec2 {
    let longitudinal = if intent.forward >= 0.0 {
        intent.forward
    } else {
        intent.forward * tuning.backward_speed_multiplier
    };
    let lateral = intent.strafe * tuning.side_speed_multiplier;

    Vec2::new(lateral, longitudinal).clamp_length_max(1.0)
}

/// Horizontal velocity command for one fixed tick.
///
/// `facing` is the actor's rotation; only its yaw matters since forward and
/// right are flattened onto the ground plane. The vertical component of
/// `current` is carried over untouched.
pub fn compute_velocity(
    intent: &MovementIntent,
    facing: Quat,
    tuning: &LocomotionTuning,
    speed_multiplier: f32,
    is_stunned: bool,
    current: Vec3,
) -> Vec3 {
    if is_stunned || !intent.has_direction() {
        return Vec3::new(0.0, current.y, 0.0);
    }

    let forward = flatten(facing * Vec3::NEG_Z);
    let right = flatten(facing * Vec3::X);
    let local = local_direction(intent, tuning);
    let speed = tuning.base_speed(intent.run) * speed_multiplier;

    let horizontal = (right * local.x + forward * local.y) * speed;
    Vec3::new(horizontal.x, current.y, horizontal.z)
}

fn flatten(direction: Vec3) -> Vec3 {
    Vec3::new(direction.x, 0.0, direction.z).normalize_or_zero()
}

/// Whether a latched jump request may turn into a jump this tick.
#[inline]
pub fn can_jump(is_grounded: bool, is_stunned: bool) -> bool {
    is_grounded && !is_stunned
}
