//! Configuration errors.
//!
//! The controller has no recoverable runtime errors: it is a continuous
//! control loop. These errors describe misconfiguration found when a
//! controller is first validated, and are fatal for that actor.

use bevy::prelude::Entity;
use thiserror::Error;

/// Fatal configuration errors for a first-person controller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControllerError {
    /// The actor has no child entity carrying [`HeadPivot`](crate::camera::HeadPivot).
    #[error("actor {actor} has no HeadPivot child; camera pitch needs a head entity")]
    MissingHead {
        /// The misconfigured actor.
        actor: Entity,
    },

    /// A tuning value is outside its valid range.
    #[error("invalid tuning value {field} = {value}: {reason}")]
    InvalidTuning {
        /// Name of the offending field.
        field: &'static str,
        /// The value that was rejected.
        value: f32,
        /// What the field requires.
        reason: &'static str,
    },
}

impl ControllerError {
    pub(crate) fn invalid(field: &'static str, value: f32, reason: &'static str) -> Self {
        Self::InvalidTuning {
            field,
            value,
            reason,
        }
    }
}
