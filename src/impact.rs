//! Landing-impact state machine.
//!
//! While airborne the [`FallTracker`] records the apex height. On the landing
//! edge the fall height is turned into a normalized severity, and a severe
//! enough landing creates an [`ImpactEffect`]: a hard stun followed by a
//! recovery window during which speed stays scaled down.
//!
//! The effect is an explicit timer advanced by the frame callback. At most one
//! exists per actor; a new qualifying landing replaces it rather than stacking.

use bevy::prelude::*;

use crate::config::LocomotionTuning;
use crate::detection::GroundState;

/// Speed multiplier of the mildest qualifying landing.
pub const MILD_SLOW_FACTOR: f32 = 0.7;

/// Stun and recovery window of the mildest qualifying landing, in seconds.
pub const MILD_WINDOW: f32 = 0.2;

/// Overlay opacity is the severity divided by this, so a fall never fully blacks the screen.
pub const OVERLAY_OPACITY_DIVISOR: f32 = 4.0;

#[inline]
fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// High-level locomotion state of an actor.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LocomotionState {
    /// No ground contact.
    #[default]
    Airborne,
    /// On the ground with full control.
    Grounded,
    /// On the ground after a hard landing; lateral input is suppressed.
    Stunned,
}

/// Tracks the apex of the current fall.
///
/// `apex_height` is only written while the actor is airborne, except for the
/// reset to the landing height once a landing has been processed.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq)]
pub struct FallTracker {
    /// Highest point reached since leaving the ground.
    pub apex_height: f32,
    /// Position at the instant the actor last left the ground.
    pub last_grounded_position: Vec3,
}

impl FallTracker {
    /// Create a tracker whose apex starts at the given position.
    pub fn new(position: Vec3) -> Self {
        Self {
            apex_height: position.y,
            last_grounded_position: position,
        }
    }

    /// Fall distance from the apex down to `height`, never negative.
    pub fn fall_height(&self, height: f32) -> f32 {
        (self.apex_height - height).max(0.0)
    }

    fn record_takeoff(&mut self, position: Vec3) {
        self.last_grounded_position = position;
        self.apex_height = position.y;
    }

    fn observe_airborne(&mut self, height: f32) {
        if height > self.apex_height {
            self.apex_height = height;
        }
    }
}

/// Feed one tick of ground state and position into the fall tracker.
///
/// Returns the fall height when this tick is a landing. The apex is reset to
/// the landing height before returning.
pub fn track_fall(fall: &mut FallTracker, ground: &GroundState, position: Vec3) -> Option<f32> {
    if ground.just_took_off() {
        fall.record_takeoff(position);
    }

    if !ground.is_grounded {
        fall.observe_airborne(position.y);
        return None;
    }

    if ground.just_landed() {
        let height = fall.fall_height(position.y);
        fall.apex_height = position.y;
        return Some(height);
    }

    None
}

/// Normalized fall severity in `[0, 1]`.
///
/// Saturates at `reference_fall_distance`.
pub fn fall_severity(fall_height: f32, reference_fall_distance: f32) -> f32 {
    if reference_fall_distance <= 0.0 {
        return if fall_height > 0.0 { 1.0 } else { 0.0 };
    }
    (fall_height / reference_fall_distance).clamp(0.0, 1.0)
}

/// Transient effect of a hard landing.
///
/// The effect owns the actor's speed multiplier for its whole lifetime. The
/// first `stun_remaining` seconds are a hard stun; the rest is recovery.
/// `remaining_duration` covers both, so the actor leaves `Stunned` when the
/// stun runs out and only returns to full speed when the effect ends.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct ImpactEffect {
    /// Severity of the landing that created this effect.
    pub severity: f32,
    /// Speed multiplier while the effect is active.
    pub slow_factor: f32,
    /// Seconds of hard stun left.
    pub stun_remaining: f32,
    /// Seconds until the effect ends.
    pub remaining_duration: f32,
}

impl ImpactEffect {
    /// Build the effect for a landing of the given severity.
    ///
    /// The slow factor and recovery window interpolate linearly from the mild
    /// floor to the configured values. The stun window scales with the square
    /// of severity and reaches `max_landing_stun` at full severity.
    pub fn from_severity(severity: f32, tuning: &LocomotionTuning) -> Self {
        let severity = severity.clamp(0.0, 1.0);
        let slow_factor = lerp(MILD_SLOW_FACTOR, tuning.landing_slow_factor, severity);
        let stun = lerp(MILD_WINDOW, tuning.max_landing_stun, severity * severity)
            .min(tuning.max_landing_stun)
            .max(0.0);
        let recovery = lerp(MILD_WINDOW, tuning.landing_slow_duration, severity).max(0.0);

        Self {
            severity,
            slow_factor,
            stun_remaining: stun,
            remaining_duration: stun + recovery,
        }
    }

    /// Whether the hard stun is still running.
    #[inline]
    pub fn is_stunning(&self) -> bool {
        self.stun_remaining > 0.0
    }

    /// Whether the effect has run out.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.remaining_duration <= 0.0
    }

    /// Multiplier applied to the actor's selected speed.
    #[inline]
    pub fn speed_multiplier(&self) -> f32 {
        self.slow_factor
    }

    /// Opacity of the darken overlay for this effect.
    pub fn overlay_opacity(&self) -> f32 {
        self.severity / OVERLAY_OPACITY_DIVISOR
    }

    /// Camera shake duration for this effect.
    pub fn shake_duration(&self, tuning: &LocomotionTuning) -> f32 {
        tuning.stun_effect_duration * self.severity
    }

    /// Advance both timers by `dt` seconds.
    pub fn advance(&mut self, dt: f32) -> ImpactTick {
        let was_stunning = self.is_stunning();
        let dt = dt.max(0.0);
        self.stun_remaining = (self.stun_remaining - dt).max(0.0);
        self.remaining_duration = (self.remaining_duration - dt).max(0.0);

        if self.is_finished() {
            ImpactTick::Finished
        } else if was_stunning && !self.is_stunning() {
            ImpactTick::StunEnded
        } else {
            ImpactTick::Continuing
        }
    }
}

/// Result of advancing an [`ImpactEffect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactTick {
    /// Nothing changed phase.
    Continuing,
    /// The hard stun ended; recovery continues.
    StunEnded,
    /// The effect ran out and should be dropped.
    Finished,
}

/// What a landing produces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandingOutcome {
    /// Fall height, clamped to be non-negative.
    pub fall_height: f32,
    /// Normalized severity.
    pub severity: f32,
    /// The impact effect, when the severity passes the stun threshold.
    pub effect: Option<ImpactEffect>,
    /// Whether the landing sound should play. Independent of the stun.
    pub landing_sound: bool,
}

impl LandingOutcome {
    /// Evaluate a landing from its fall height.
    pub fn evaluate(fall_height: f32, tuning: &LocomotionTuning) -> Self {
        let fall_height = fall_height.max(0.0);
        let severity = fall_severity(fall_height, tuning.reference_fall_distance);
        let effect = (severity > tuning.stun_threshold)
            .then(|| ImpactEffect::from_severity(severity, tuning));

        Self {
            fall_height,
            severity,
            effect,
            landing_sound: fall_height > tuning.landing_sound_height,
        }
    }
}

/// Impact lifecycle notifications for the feedback dispatcher.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ImpactEvent {
    /// The actor the effect belongs to.
    pub actor: Entity,
    /// What happened.
    pub kind: ImpactEventKind,
}

/// Kinds of [`ImpactEvent`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImpactEventKind {
    /// A new effect started. `restarted` is set when it replaced a running one.
    Started {
        severity: f32,
        overlay_opacity: f32,
        shake_intensity: f32,
        shake_duration: f32,
        restarted: bool,
    },
    /// The hard stun ended.
    StunEnded,
    /// The effect ran out.
    Ended,
}
