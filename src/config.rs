//! Controller configuration components.
//!
//! This module defines the central controller state component and the static
//! tuning records supplied when an actor is spawned.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::camera::LookAngles;
use crate::collision::{GroundHit, SurfaceTag};
use crate::detection::GroundState;
use crate::error::ControllerError;
use crate::feedback::FootstepCadence;
use crate::impact::{FallTracker, ImpactEffect, LocomotionState};
use crate::intent::MovementIntent;

/// Core first-person controller component.
///
/// This is the **central hub** for all controller state. Backends write the
/// ground probe; the controller systems derive everything else from it.
///
/// Spawning it pulls in a default [`MovementIntent`], [`LocomotionTuning`],
/// [`LookConfig`] and [`LookAngles`] unless they are provided.
#[derive(Component, Reflect, Debug, Clone, Default)]
#[reflect(Component)]
#[require(MovementIntent, LocomotionTuning, LookConfig, LookAngles)]
pub struct FirstPersonController {
    /// Raw result of this tick's downward probe, written by the backend.
    #[reflect(ignore)]
    pub ground_probe: Option<GroundHit>,
    /// Contact state derived from the probe.
    pub ground: GroundState,
    /// Apex tracking for the current fall.
    pub fall: FallTracker,
    /// The active landing effect, if any.
    pub impact: Option<ImpactEffect>,
    /// Footstep timer.
    pub footsteps: FootstepCadence,
    /// Velocity derived from position change over the last fixed tick.
    pub measured_velocity: Vec3,

    /// Position sampled on the previous fixed tick. `None` until first sensed.
    pub(crate) previous_position: Option<Vec3>,
    /// Seconds until another wall-hit cue may fire.
    pub(crate) wall_hit_cooldown: f32,
}

impl FirstPersonController {
    /// Create a new controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current high-level state.
    pub fn state(&self) -> LocomotionState {
        if !self.ground.is_grounded {
            LocomotionState::Airborne
        } else if self.is_stunned() {
            LocomotionState::Stunned
        } else {
            LocomotionState::Grounded
        }
    }

    /// Check if grounded.
    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.ground.is_grounded
    }

    /// Check if a hard stun is running.
    pub fn is_stunned(&self) -> bool {
        self.impact.as_ref().is_some_and(ImpactEffect::is_stunning)
    }

    /// Speed multiplier imposed by the active impact effect (1.0 when none).
    pub fn speed_multiplier(&self) -> f32 {
        self.impact
            .as_ref()
            .map(ImpactEffect::speed_multiplier)
            .unwrap_or(1.0)
    }

    /// Surface tag of the ground under the actor.
    pub fn surface(&self) -> Option<&SurfaceTag> {
        self.ground.surface.as_ref()
    }

    /// Whether the actor has been sensed at least once.
    pub fn is_sensed(&self) -> bool {
        self.previous_position.is_some()
    }

    /// Install a new impact effect, replacing any running one.
    ///
    /// Returns `true` when a running effect was cancelled.
    pub(crate) fn begin_impact(&mut self, effect: ImpactEffect) -> bool {
        self.impact.replace(effect).is_some()
    }
}

/// Static locomotion tuning for one actor.
///
/// Supplied at spawn and never mutated at runtime; the only transient speed
/// scaling comes from the active impact effect. Can be loaded from any serde
/// format, with missing fields taking their defaults.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct LocomotionTuning {
    // === Movement ===
    /// Walking speed (units/second).
    pub walk_speed: f32,
    /// Running speed is `walk_speed * run_multiplier`.
    pub run_multiplier: f32,
    /// Scale applied to backward input.
    pub backward_speed_multiplier: f32,
    /// Scale applied to strafe input.
    pub side_speed_multiplier: f32,
    /// Upward impulse of a jump.
    pub jump_impulse: f32,

    // === Ground Probe ===
    /// Reach of the downward probe below the collider's bottom.
    pub ground_check_distance: f32,
    /// Collision-group bits considered ground.
    pub ground_layer: u32,

    // === Landing ===
    /// Fall height at which severity saturates.
    pub reference_fall_distance: f32,
    /// Severity above which a landing stuns.
    pub stun_threshold: f32,
    /// Fall height above which the landing sound plays.
    pub landing_sound_height: f32,
    /// Recovery window at full severity (seconds).
    pub landing_slow_duration: f32,
    /// Speed multiplier at full severity.
    pub landing_slow_factor: f32,
    /// Longest possible hard stun (seconds).
    pub max_landing_stun: f32,

    // === Feedback ===
    /// Seconds between footsteps while walking.
    pub footstep_interval: f32,
    /// Footsteps come this many times faster while running.
    pub run_cadence_factor: f32,
    /// Peak camera shake amplitude (scaled by severity and 0.01).
    pub stun_effect_intensity: f32,
    /// Camera shake duration at full severity (seconds).
    pub stun_effect_duration: f32,
    /// Relative speed above which an airborne collision plays the wall-hit cue.
    pub wall_hit_speed: f32,
    /// Minimum seconds between wall-hit cues. Zero disables the limit.
    pub wall_hit_cooldown: f32,
}

impl Default for LocomotionTuning {
    fn default() -> Self {
        Self {
            // Movement
            walk_speed: 5.0,
            run_multiplier: 1.6,
            backward_speed_multiplier: 0.6,
            side_speed_multiplier: 0.8,
            jump_impulse: 8.0,

            // Ground probe
            ground_check_distance: 0.1,
            ground_layer: 1,

            // Landing
            reference_fall_distance: 5.0,
            stun_threshold: 0.1,
            landing_sound_height: 0.5,
            landing_slow_duration: 0.5,
            landing_slow_factor: 0.5,
            max_landing_stun: 1.0,

            // Feedback
            footstep_interval: 0.4,
            run_cadence_factor: 1.5,
            stun_effect_intensity: 10.0,
            stun_effect_duration: 0.3,
            wall_hit_speed: 2.0,
            wall_hit_cooldown: 0.15,
        }
    }
}

fn ensure(
    ok: bool,
    field: &'static str,
    value: f32,
    reason: &'static str,
) -> Result<(), ControllerError> {
    if ok {
        Ok(())
    } else {
        Err(ControllerError::invalid(field, value, reason))
    }
}

impl LocomotionTuning {
    /// Running speed.
    #[inline]
    pub fn run_speed(&self) -> f32 {
        self.walk_speed * self.run_multiplier
    }

    /// Selected base speed for the run modifier state.
    #[inline]
    pub fn base_speed(&self, running: bool) -> f32 {
        if running {
            self.run_speed()
        } else {
            self.walk_speed
        }
    }

    /// Footstep interval for the run modifier state.
    pub fn footstep_interval_for(&self, running: bool) -> f32 {
        if running {
            self.footstep_interval / self.run_cadence_factor
        } else {
            self.footstep_interval
        }
    }

    /// Check every value against its valid range.
    pub fn validate(&self) -> Result<(), ControllerError> {
        let positive = "must be positive";
        let unit = "must be in (0, 1]";
        let non_negative = "must not be negative";

        ensure(self.walk_speed > 0.0, "walk_speed", self.walk_speed, positive)?;
        ensure(self.run_multiplier > 0.0, "run_multiplier", self.run_multiplier, positive)?;
        ensure(
            self.backward_speed_multiplier > 0.0 && self.backward_speed_multiplier <= 1.0,
            "backward_speed_multiplier",
            self.backward_speed_multiplier,
            unit,
        )?;
        ensure(
            self.side_speed_multiplier > 0.0 && self.side_speed_multiplier <= 1.0,
            "side_speed_multiplier",
            self.side_speed_multiplier,
            unit,
        )?;
        ensure(self.jump_impulse >= 0.0, "jump_impulse", self.jump_impulse, non_negative)?;
        ensure(
            self.ground_check_distance > 0.0,
            "ground_check_distance",
            self.ground_check_distance,
            positive,
        )?;
        ensure(
            self.reference_fall_distance > 0.0,
            "reference_fall_distance",
            self.reference_fall_distance,
            positive,
        )?;
        ensure(
            (0.0..1.0).contains(&self.stun_threshold),
            "stun_threshold",
            self.stun_threshold,
            "must be in [0, 1)",
        )?;
        ensure(
            self.landing_sound_height >= 0.0,
            "landing_sound_height",
            self.landing_sound_height,
            non_negative,
        )?;
        ensure(
            self.landing_slow_duration >= 0.0,
            "landing_slow_duration",
            self.landing_slow_duration,
            non_negative,
        )?;
        ensure(
            self.landing_slow_factor > 0.0 && self.landing_slow_factor <= 1.0,
            "landing_slow_factor",
            self.landing_slow_factor,
            unit,
        )?;
        ensure(
            self.max_landing_stun >= 0.0,
            "max_landing_stun",
            self.max_landing_stun,
            non_negative,
        )?;
        ensure(
            self.footstep_interval > 0.0,
            "footstep_interval",
            self.footstep_interval,
            positive,
        )?;
        ensure(
            self.run_cadence_factor > 0.0,
            "run_cadence_factor",
            self.run_cadence_factor,
            positive,
        )?;
        ensure(
            self.stun_effect_duration >= 0.0,
            "stun_effect_duration",
            self.stun_effect_duration,
            non_negative,
        )?;
        ensure(
            self.wall_hit_cooldown >= 0.0,
            "wall_hit_cooldown",
            self.wall_hit_cooldown,
            non_negative,
        )?;
        Ok(())
    }

    /// Builder: set walk speed and run multiplier.
    pub fn with_speeds(mut self, walk_speed: f32, run_multiplier: f32) -> Self {
        self.walk_speed = walk_speed;
        self.run_multiplier = run_multiplier;
        self
    }

    /// Builder: set backward and strafe multipliers.
    pub fn with_direction_weights(mut self, backward: f32, side: f32) -> Self {
        self.backward_speed_multiplier = backward;
        self.side_speed_multiplier = side;
        self
    }

    /// Builder: set jump impulse.
    pub fn with_jump_impulse(mut self, impulse: f32) -> Self {
        self.jump_impulse = impulse;
        self
    }

    /// Builder: set the ground probe reach and layer.
    pub fn with_ground_probe(mut self, distance: f32, layer: u32) -> Self {
        self.ground_check_distance = distance;
        self.ground_layer = layer;
        self
    }

    /// Builder: set the fall distance at which severity saturates.
    pub fn with_reference_fall_distance(mut self, distance: f32) -> Self {
        self.reference_fall_distance = distance;
        self
    }

    /// Builder: set landing slow parameters.
    pub fn with_landing_slow(mut self, duration: f32, factor: f32, max_stun: f32) -> Self {
        self.landing_slow_duration = duration;
        self.landing_slow_factor = factor;
        self.max_landing_stun = max_stun;
        self
    }

    /// Builder: set footstep interval.
    pub fn with_footstep_interval(mut self, interval: f32) -> Self {
        self.footstep_interval = interval;
        self
    }

    /// Builder: set wall-hit cue threshold and retrigger interval.
    pub fn with_wall_hit(mut self, speed: f32, cooldown: f32) -> Self {
        self.wall_hit_speed = speed;
        self.wall_hit_cooldown = cooldown;
        self
    }
}

/// Mouse-look configuration.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct LookConfig {
    /// Degrees of rotation per unit of pointer delta.
    pub sensitivity: f32,
    /// Pitch is clamped to `[-pitch_limit, pitch_limit]` degrees.
    pub pitch_limit: f32,
}

impl Default for LookConfig {
    fn default() -> Self {
        Self {
            sensitivity: 0.1,
            pitch_limit: 45.0,
        }
    }
}
