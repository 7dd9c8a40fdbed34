//! # `fp_locomotion`
//!
//! A first-person rigidbody locomotion controller with landing-impact feedback
//! and physics backend abstraction.
//!
//! This crate provides a character controller that:
//! - Walks and runs relative to the view yaw, with direction-weighted speeds
//! - Detects ground contact with a single downward probe per fixed tick
//! - Tracks the apex of every fall and turns hard landings into a stun
//!   followed by a recovery slow
//! - Emits footstep, jump, landing and wall-hit cues and plays them from a
//!   per-actor [`SoundBank`](feedback::SoundBank)
//! - Darkens the screen and shakes the camera in proportion to fall severity
//! - Abstracts the physics backend (Rapier3D included)
//!
//! ## Architecture
//!
//! Each fixed tick the backend probes for ground, the sensor folds the probe
//! into a contact history, the landing-impact state machine reacts to contact
//! edges, and the locomotion integrator writes a horizontal velocity command.
//! Each frame the input sampler fills the intent, the camera consumes the
//! pointer delta, impact timers count down and the feedback dispatcher
//! presents whatever the other stages requested.
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use fp_locomotion::prelude::*;
//!
//! // Tuning is immutable at runtime and can come from any serde format
//! let tuning = LocomotionTuning::default().with_speeds(4.0, 1.5);
//! assert!(tuning.validate().is_ok());
//!
//! // An actor is a controller plus a HeadPivot child carrying the camera
//! let actor = (FirstPersonController::new(), tuning, InputBindings::default());
//! let head = (HeadPivot, Transform::from_xyz(0.0, 0.6, 0.0));
//! ```

use bevy::prelude::*;

pub mod backend;
pub mod camera;
pub mod collision;
pub mod config;
pub mod detection;
pub mod error;
pub mod feedback;
pub mod impact;
pub mod intent;
pub mod locomotion;
pub mod state;
pub mod systems;

#[cfg(feature = "rapier3d")]
pub mod rapier;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::backend::{GroundProbeRequest, LocomotionBackend};
    pub use crate::camera::{HeadPivot, LookAngles};
    pub use crate::collision::{ContactImpact, GroundHit, SurfaceTag};
    pub use crate::config::{FirstPersonController, LocomotionTuning, LookConfig};
    pub use crate::detection::GroundState;
    pub use crate::error::ControllerError;
    pub use crate::feedback::{CameraShake, CueKind, DarkenOverlay, FeedbackCue, SoundBank};
    pub use crate::impact::{ImpactEffect, ImpactEvent, ImpactEventKind, LocomotionState};
    pub use crate::intent::{InputBindings, MovementIntent};
    pub use crate::state::{Airborne, Grounded, Stunned};
    pub use crate::{FirstPersonControllerPlugin, LocomotionFrameSet, LocomotionSet};

    #[cfg(feature = "rapier3d")]
    pub use crate::rapier::{Rapier3dBackend, Rapier3dCharacterBundle};
}

/// Fixed-tick stages, run in order in `FixedUpdate`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocomotionSet {
    /// Backend physics queries (ground probe, contact translation).
    Probe,
    /// Contact history and measured velocity.
    Sensors,
    /// Fall tracking and landing evaluation.
    Impact,
    /// Velocity command and jump.
    Movement,
    /// Wall-hit cues and state markers.
    Feedback,
}

/// Per-frame stages, run in order in `Update`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocomotionFrameSet {
    /// Keyboard and mouse sampling.
    Input,
    /// Camera orientation.
    Look,
    /// Impact countdown and footstep cadence.
    Effects,
    /// Overlay, camera shake and audio.
    Presentation,
}

/// Main plugin for the first-person controller.
///
/// This plugin is generic over a physics backend `B` which provides the actual
/// physics operations (ground probe, velocity and impulse access, etc.).
///
/// # Type Parameters
/// - `B`: The physics backend implementation (e.g., `Rapier3dBackend`)
///
/// # Examples
///
/// With Rapier3D backend:
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_rapier3d::prelude::*;
/// use fp_locomotion::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
///     .add_plugins(FirstPersonControllerPlugin::<Rapier3dBackend>::default())
///     .run();
/// ```
pub struct FirstPersonControllerPlugin<B: backend::LocomotionBackend> {
    _marker: std::marker::PhantomData<B>,
}

impl<B: backend::LocomotionBackend> Default for FirstPersonControllerPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::LocomotionBackend> Plugin for FirstPersonControllerPlugin<B> {
    fn build(&self, app: &mut App) {
        // Register core types
        app.register_type::<config::FirstPersonController>();
        app.register_type::<config::LocomotionTuning>();
        app.register_type::<config::LookConfig>();
        app.register_type::<intent::MovementIntent>();
        app.register_type::<intent::InputBindings>();
        app.register_type::<camera::HeadPivot>();
        app.register_type::<camera::LookAngles>();
        app.register_type::<collision::SurfaceTag>();
        app.register_type::<feedback::CameraShake>();
        app.register_type::<feedback::DarkenOverlayNode>();
        app.register_type::<state::Grounded>();
        app.register_type::<state::Airborne>();
        app.register_type::<state::Stunned>();

        app.add_event::<collision::ContactImpact>();
        app.add_event::<impact::ImpactEvent>();
        app.add_event::<feedback::FeedbackCue>();
        app.init_resource::<feedback::DarkenOverlay>();

        // Add the physics backend plugin
        app.add_plugins(B::plugin());

        app.configure_sets(
            FixedUpdate,
            (
                LocomotionSet::Probe,
                LocomotionSet::Sensors,
                LocomotionSet::Impact,
                LocomotionSet::Movement,
                LocomotionSet::Feedback,
            )
                .chain(),
        );
        app.configure_sets(
            Update,
            (
                LocomotionFrameSet::Input,
                LocomotionFrameSet::Look,
                LocomotionFrameSet::Effects,
                LocomotionFrameSet::Presentation,
            )
                .chain(),
        );

        app.add_systems(PreUpdate, systems::validate_controllers::<B>);

        // Core systems run in FixedUpdate for consistent physics behavior
        app.add_systems(
            FixedUpdate,
            (
                systems::update_ground_state::<B>.in_set(LocomotionSet::Sensors),
                systems::track_landing_impact::<B>.in_set(LocomotionSet::Impact),
                (systems::apply_locomotion::<B>, systems::apply_jump::<B>)
                    .chain()
                    .in_set(LocomotionSet::Movement),
                (systems::detect_wall_hits, systems::sync_state_markers)
                    .chain()
                    .in_set(LocomotionSet::Feedback),
            ),
        );

        app.add_systems(
            Update,
            (
                intent::sample_input.in_set(LocomotionFrameSet::Input),
                camera::orient_camera.in_set(LocomotionFrameSet::Look),
                (
                    systems::advance_impact_effects,
                    systems::update_footsteps,
                    systems::sync_state_markers,
                )
                    .chain()
                    .in_set(LocomotionFrameSet::Effects),
                (
                    feedback::present_impact_overlay,
                    (feedback::start_camera_shake, feedback::drive_camera_shake).chain(),
                    feedback::play_cue_audio,
                )
                    .in_set(LocomotionFrameSet::Presentation),
            ),
        );
    }
}
