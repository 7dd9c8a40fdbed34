//! Camera orientation.
//!
//! Yaw turns the actor's body; pitch tilts a child [`HeadPivot`] that carries
//! the camera. Both are accumulated in degrees from the pointer delta stored
//! on the [`MovementIntent`].

use bevy::prelude::*;

use crate::config::{FirstPersonController, LookConfig};
use crate::intent::MovementIntent;

/// Marker for the child entity that pitches with the view.
///
/// Every controlled actor needs exactly one. Put the camera on it or below it.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
#[require(Transform)]
pub struct HeadPivot;

/// Accumulated view angles in degrees.
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct LookAngles {
    /// Unbounded; positive turns right.
    pub yaw_degrees: f32,
    /// Clamped to the configured pitch limit; positive looks up.
    pub pitch_degrees: f32,
}

impl LookAngles {
    /// Body rotation for the current yaw.
    pub fn body_rotation(&self) -> Quat {
        Quat::from_rotation_y(-self.yaw_degrees.to_radians())
    }

    /// Head rotation for the current pitch.
    pub fn head_rotation(&self) -> Quat {
        Quat::from_rotation_x(self.pitch_degrees.to_radians())
    }
}

/// Apply a pointer delta to the view angles.
pub fn apply_look(angles: &mut LookAngles, delta: Vec2, config: &LookConfig) {
    let limit = config.pitch_limit.abs();
    angles.yaw_degrees += delta.x * config.sensitivity;
    angles.pitch_degrees =
        (angles.pitch_degrees + delta.y * config.sensitivity).clamp(-limit, limit);
}

/// Consume each actor's pointer delta and orient body and head.
pub fn orient_camera(
    mut q_actors: Query<
        (&mut MovementIntent, &LookConfig, &mut LookAngles, &mut Transform),
        (With<FirstPersonController>, Without<HeadPivot>),
    >,
    mut q_heads: Query<(&ChildOf, &mut Transform), (With<HeadPivot>, Without<FirstPersonController>)>,
) {
    for (mut intent, config, mut angles, mut transform) in &mut q_actors {
        let delta = intent.take_look_delta();
        apply_look(&mut angles, delta, config);
        transform.rotation = angles.body_rotation();
    }

    for (child_of, mut transform) in &mut q_heads {
        let Ok((_, _, angles, _)) = q_actors.get(child_of.parent()) else {
            continue;
        };
        transform.rotation = angles.head_rotation();
    }
}
