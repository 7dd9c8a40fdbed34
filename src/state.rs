//! State marker components.
//!
//! These components mirror the landing-impact state machine for host
//! queries. They are added and removed by the controller systems; never
//! insert them by hand.

use bevy::prelude::*;

/// Marker component indicating the actor is on the ground with full control.
///
/// Mutually exclusive with [`Airborne`] and [`Stunned`].
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use fp_locomotion::prelude::*;
///
/// // Grounded is a marker component - just use it in queries
/// fn count_grounded(q: Query<(), With<Grounded>>) -> usize {
///     q.iter().count()
/// }
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Grounded;

/// Marker component indicating the actor has no ground contact.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Airborne;

/// Marker component indicating the actor is in the hard stun after a landing.
///
/// Lateral input is ignored and jumping is blocked while present.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Stunned;
