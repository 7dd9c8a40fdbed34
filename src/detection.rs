//! Ground contact state.
//!
//! The backend's probe result is folded into a [`GroundState`] once per
//! fixed tick. Downstream systems only read it, and the landing/takeoff
//! edges it exposes drive the impact state machine.

use bevy::prelude::*;

use crate::collision::{GroundHit, SurfaceTag};

/// Contact state for one fixed tick.
///
/// `previous_is_grounded` holds the prior tick's value so that edges can be
/// detected. A landing is exactly `false -> true`; a takeoff is `true -> false`.
#[derive(Reflect, Debug, Clone, Default, PartialEq)]
pub struct GroundState {
    /// Whether the probe found ground this tick.
    pub is_grounded: bool,
    /// The value of `is_grounded` on the previous tick.
    pub previous_is_grounded: bool,
    /// Surface tag of the ground under the actor, if tagged.
    pub surface: Option<SurfaceTag>,
}

impl GroundState {
    /// Seed the state from the first probe an actor ever sees.
    ///
    /// Both the current and previous contact are set from the probe, so an
    /// actor spawned on the ground does not register a landing.
    pub fn seeded(probe: Option<&GroundHit>) -> Self {
        let grounded = probe.is_some();
        Self {
            is_grounded: grounded,
            previous_is_grounded: grounded,
            surface: probe.and_then(|hit| hit.surface.clone()),
        }
    }

    /// Shift the current contact into `previous_is_grounded` and apply a new probe.
    pub fn advance(&mut self, probe: Option<&GroundHit>) {
        self.previous_is_grounded = self.is_grounded;
        self.is_grounded = probe.is_some();
        self.surface = probe.and_then(|hit| hit.surface.clone());
    }

    /// True on the tick contact was regained.
    #[inline]
    pub fn just_landed(&self) -> bool {
        !self.previous_is_grounded && self.is_grounded
    }

    /// True on the tick contact was lost.
    #[inline]
    pub fn just_took_off(&self) -> bool {
        self.previous_is_grounded && !self.is_grounded
    }
}

/// Derive a velocity from two positions sampled `dt` seconds apart.
///
/// Returns zero for a non-positive `dt` instead of dividing by it.
pub fn derive_velocity(previous: Vec3, current: Vec3, dt: f32) -> Vec3 {
    if dt <= 0.0 {
        return Vec3::ZERO;
    }
    (current - previous) / dt
}
