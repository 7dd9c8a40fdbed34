//! Feedback dispatcher.
//!
//! A reactive sink for the controller's edges and timers. Fixed-tick and
//! frame systems emit [`FeedbackCue`] and [`ImpactEvent`]s; the systems in
//! this module turn them into one-shot audio, the darken overlay and the
//! camera shake. Nothing here feeds back into locomotion.

use std::collections::HashMap;

use bevy::prelude::*;
use rand::Rng;

use crate::camera::HeadPivot;
use crate::collision::SurfaceTag;
use crate::config::FirstPersonController;
use crate::impact::{ImpactEvent, ImpactEventKind};

/// Shake amplitude is scaled by this so intensities read as whole numbers.
pub const SHAKE_SCALE: f32 = 0.01;

#[inline]
fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// A one-shot feedback request.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct FeedbackCue {
    /// The actor the cue belongs to.
    pub actor: Entity,
    /// What to play.
    pub kind: CueKind,
}

impl FeedbackCue {
    /// Create a cue for an actor.
    pub fn new(actor: Entity, kind: CueKind) -> Self {
        Self { actor, kind }
    }
}

/// Kinds of [`FeedbackCue`].
#[derive(Debug, Clone, PartialEq)]
pub enum CueKind {
    /// A jump was performed.
    Jump,
    /// A landing from high enough to be heard.
    Landing { fall_height: f32 },
    /// An airborne collision above the wall-hit speed.
    WallHit { relative_speed: f32 },
    /// A footstep on the given surface.
    Footstep { surface: Option<SurfaceTag> },
}

// ============================================================================
// Footsteps
// ============================================================================

/// Footstep timer.
///
/// Starts at zero so the first step fires on the first moving frame.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq)]
pub struct FootstepCadence {
    /// Seconds until the next step.
    pub timer: f32,
    /// Interval currently in effect. A shorter interval (starting to run)
    /// cuts the pending wait down to it.
    pub interval: f32,
}

impl FootstepCadence {
    /// Advance by `dt` seconds. Returns `true` when a step is due, resetting
    /// the timer to `interval`.
    pub fn advance(&mut self, dt: f32, interval: f32) -> bool {
        if interval != self.interval {
            self.timer = self.timer.min(interval);
            self.interval = interval;
        }
        self.timer -= dt.max(0.0);
        if self.timer <= 0.0 {
            self.timer = interval;
            self.interval = interval;
            true
        } else {
            false
        }
    }
}

// ============================================================================
// Audio
// ============================================================================

/// Audio clips for one actor's feedback cues.
///
/// Footsteps are picked at random from the set registered for the ground's
/// surface tag, falling back to `footsteps` for untagged or unknown surfaces.
/// When the chosen set is empty, `default_footstep` plays instead.
#[derive(Component, Debug, Clone, Default)]
pub struct SoundBank {
    pub footsteps: Vec<Handle<AudioSource>>,
    pub surface_footsteps: HashMap<SurfaceTag, Vec<Handle<AudioSource>>>,
    pub default_footstep: Option<Handle<AudioSource>>,
    pub jump: Option<Handle<AudioSource>>,
    pub landing: Option<Handle<AudioSource>>,
    pub wall_hit: Option<Handle<AudioSource>>,
}

impl SoundBank {
    /// Builder: register a footstep set for a surface.
    pub fn with_surface(
        mut self,
        surface: SurfaceTag,
        clips: impl IntoIterator<Item = Handle<AudioSource>>,
    ) -> Self {
        self.surface_footsteps
            .insert(surface, clips.into_iter().collect());
        self
    }

    /// Footstep set for a surface.
    pub fn footsteps_for(&self, surface: Option<&SurfaceTag>) -> &[Handle<AudioSource>] {
        surface
            .and_then(|tag| self.surface_footsteps.get(tag))
            .filter(|clips| !clips.is_empty())
            .unwrap_or(&self.footsteps)
    }

    /// Resolve the clip for a cue, if any.
    pub fn clip_for<R: Rng>(
        &self,
        kind: &CueKind,
        rng: &mut R,
    ) -> Option<Handle<AudioSource>> {
        match kind {
            CueKind::Jump => self.jump.clone(),
            CueKind::Landing { .. } => self.landing.clone(),
            CueKind::WallHit { .. } => self.wall_hit.clone(),
            CueKind::Footstep { surface } => pick_clip(self.footsteps_for(surface.as_ref()), rng)
                .cloned()
                .or_else(|| self.default_footstep.clone()),
        }
    }
}

/// Pick a random clip. An empty set yields nothing.
pub fn pick_clip<'a, T, R: Rng>(clips: &'a [T], rng: &mut R) -> Option<&'a T> {
    if clips.is_empty() {
        return None;
    }
    clips.get(rng.random_range(0..clips.len()))
}

/// Play cues through each actor's [`SoundBank`] as one-shot audio entities.
///
/// Every cue is fire-and-forget. Looping sounds (wind while falling, ambient
/// loops) are left to the host.
pub fn play_cue_audio(
    mut commands: Commands,
    mut cues: EventReader<FeedbackCue>,
    q_banks: Query<&SoundBank>,
) {
    let mut rng = rand::rng();
    for cue in cues.read() {
        let Ok(bank) = q_banks.get(cue.actor) else {
            continue;
        };
        let Some(clip) = bank.clip_for(&cue.kind, &mut rng) else {
            continue;
        };
        commands.spawn((AudioPlayer::new(clip), PlaybackSettings::DESPAWN));
    }
}

// ============================================================================
// Darken Overlay
// ============================================================================

/// Marker for the full-screen darken overlay node.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct DarkenOverlayNode;

#[derive(Debug, Clone, Copy, PartialEq)]
struct OverlayInstance {
    owner: Entity,
    node: Entity,
    opacity: f32,
}

/// Handle to the single full-screen darken overlay.
///
/// At most one overlay exists at a time. `create` is a no-op while one is
/// active, and `destroy` only tears down the overlay owned by the given actor.
#[derive(Resource, Debug, Default)]
pub struct DarkenOverlay {
    active: Option<OverlayInstance>,
}

impl DarkenOverlay {
    /// Whether an overlay currently exists.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Actor that owns the current overlay.
    pub fn owner(&self) -> Option<Entity> {
        self.active.map(|instance| instance.owner)
    }

    /// UI node entity of the current overlay.
    pub fn node(&self) -> Option<Entity> {
        self.active.map(|instance| instance.node)
    }

    /// Opacity of the current overlay.
    pub fn opacity(&self) -> Option<f32> {
        self.active.map(|instance| instance.opacity)
    }

    /// Spawn the overlay for `owner`. Returns `false` if one already exists.
    pub fn create(&mut self, commands: &mut Commands, owner: Entity, opacity: f32) -> bool {
        if self.active.is_some() {
            return false;
        }

        let opacity = opacity.clamp(0.0, 1.0);
        let node = commands
            .spawn((
                Name::new("Darken Overlay"),
                DarkenOverlayNode,
                Node {
                    position_type: PositionType::Absolute,
                    width: Val::Percent(100.0),
                    height: Val::Percent(100.0),
                    ..default()
                },
                BackgroundColor(Color::srgba(0.0, 0.0, 0.0, opacity)),
                GlobalZIndex(i32::MAX),
            ))
            .id();

        self.active = Some(OverlayInstance {
            owner,
            node,
            opacity,
        });
        true
    }

    /// Despawn the overlay if `owner` owns it. Returns `true` if one was removed.
    pub fn destroy(&mut self, commands: &mut Commands, owner: Entity) -> bool {
        match self.active {
            Some(instance) if instance.owner == owner => {
                commands.entity(instance.node).try_despawn();
                self.active = None;
                true
            }
            _ => false,
        }
    }
}

/// Create, restart and tear down the darken overlay from impact events.
///
/// An overlay whose owner no longer has a controller (despawned mid-effect)
/// is torn down before this frame's events are handled.
pub fn present_impact_overlay(
    mut commands: Commands,
    mut overlay: ResMut<DarkenOverlay>,
    mut events: EventReader<ImpactEvent>,
    q_controllers: Query<(), With<FirstPersonController>>,
) {
    if let Some(owner) = overlay.owner().filter(|o| !q_controllers.contains(*o)) {
        debug!("{owner} despawned with an active overlay");
        overlay.destroy(&mut commands, owner);
    }

    for event in events.read() {
        match event.kind {
            ImpactEventKind::Started {
                overlay_opacity, ..
            } => {
                // Restart: the old overlay goes before the new one is created
                overlay.destroy(&mut commands, event.actor);
                overlay.create(&mut commands, event.actor, overlay_opacity);
            }
            ImpactEventKind::Ended => {
                overlay.destroy(&mut commands, event.actor);
            }
            ImpactEventKind::StunEnded => {}
        }
    }
}

// ============================================================================
// Camera Shake
// ============================================================================

/// Decaying camera shake on a head pivot.
///
/// The offset applied last frame is stored so it can be removed before the
/// next one is applied; the head never drifts from its rest position.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct CameraShake {
    /// Peak amplitude before severity scaling.
    pub intensity: f32,
    /// Severity of the landing that caused the shake.
    pub severity: f32,
    /// Total duration (seconds).
    pub duration: f32,
    /// Seconds elapsed so far.
    pub elapsed: f32,
    /// Offset currently applied to the head's translation.
    pub offset: Vec3,
}

impl CameraShake {
    /// Create a shake.
    pub fn new(intensity: f32, severity: f32, duration: f32) -> Self {
        Self {
            intensity,
            severity,
            duration: duration.max(0.0),
            elapsed: 0.0,
            offset: Vec3::ZERO,
        }
    }

    /// Whether the shake has run out.
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Current amplitude: decays linearly from the peak to zero.
    pub fn amplitude(&self) -> f32 {
        if self.is_finished() {
            return 0.0;
        }
        let t = (self.elapsed / self.duration).clamp(0.0, 1.0);
        lerp(self.intensity, 0.0, t) * self.severity * SHAKE_SCALE
    }

    /// Random offset in the head's local XY plane within the current amplitude.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Vec3 {
        let amplitude = self.amplitude();
        if amplitude <= 0.0 {
            return Vec3::ZERO;
        }
        Vec3::new(
            rng.random_range(-amplitude..=amplitude),
            rng.random_range(-amplitude..=amplitude),
            0.0,
        )
    }
}

/// Attach a [`CameraShake`] to the actor's head when an impact starts.
///
/// A running shake is replaced; its offset is removed first.
pub fn start_camera_shake(
    mut commands: Commands,
    mut events: EventReader<ImpactEvent>,
    mut q_heads: Query<(Entity, &ChildOf, &mut Transform, Option<&CameraShake>), With<HeadPivot>>,
) {
    for event in events.read() {
        let ImpactEventKind::Started {
            severity,
            shake_intensity,
            shake_duration,
            ..
        } = event.kind
        else {
            continue;
        };

        for (head, child_of, mut transform, running) in &mut q_heads {
            if child_of.parent() != event.actor {
                continue;
            }
            if let Some(running) = running {
                transform.translation -= running.offset;
            }
            if shake_duration > 0.0 {
                commands
                    .entity(head)
                    .insert(CameraShake::new(shake_intensity, severity, shake_duration));
            } else {
                commands.entity(head).remove::<CameraShake>();
            }
        }
    }
}

/// Advance camera shakes and apply their offsets.
pub fn drive_camera_shake(
    mut commands: Commands,
    time: Res<Time>,
    mut q_shakes: Query<(Entity, &mut CameraShake, &mut Transform)>,
) {
    let dt = time.delta_secs();
    let mut rng = rand::rng();

    for (entity, mut shake, mut transform) in &mut q_shakes {
        transform.translation -= shake.offset;
        shake.offset = Vec3::ZERO;

        if shake.is_finished() {
            commands.entity(entity).remove::<CameraShake>();
            continue;
        }

        let offset = shake.sample(&mut rng);
        transform.translation += offset;
        shake.offset = offset;
        shake.elapsed += dt;
    }
}
