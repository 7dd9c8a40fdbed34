//! Movement intent and the built-in input sampler.
//!
//! Intents represent the desired movement from player input or AI. The
//! controller systems read these intents and apply the appropriate physics.
//! Actors carrying [`InputBindings`] are filled from the keyboard and mouse
//! every frame; everything else is driven by host code writing the intent.

use bevy::input::mouse::AccumulatedMouseMotion;
use bevy::prelude::*;

/// Below this magnitude an axis counts as released.
pub const AXIS_DEADZONE: f32 = 0.001;

/// Per-frame movement intent snapshot.
///
/// # Example
///
/// ```rust
/// use fp_locomotion::prelude::*;
///
/// let mut intent = MovementIntent::new();
/// intent.set_forward(1.0);
/// intent.set_strafe(-1.0);
/// assert!(intent.has_direction());
///
/// // Holding jump latches exactly one request
/// intent.set_jump_pressed(true);
/// intent.set_jump_pressed(true);
/// assert!(intent.take_jump_request());
/// assert!(!intent.take_jump_request());
/// ```
#[derive(Component, Reflect, Debug, Clone, Default)]
#[reflect(Component)]
pub struct MovementIntent {
    /// Longitudinal axis (-1.0 = backward, 1.0 = forward).
    pub forward: f32,
    /// Lateral axis (-1.0 = left, 1.0 = right).
    pub strafe: f32,
    /// Whether the run modifier is held.
    pub run: bool,
    /// Accumulated pointer delta since the camera last consumed it.
    /// Positive x turns right, positive y looks up.
    pub look_delta: Vec2,
    /// Whether the jump input is currently held.
    pub jump_pressed: bool,
    /// Rising edge of `jump_pressed` waiting for the next fixed tick.
    pub(crate) jump_requested: bool,
}

impl MovementIntent {
    /// Create a new empty movement intent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the longitudinal axis (-1.0 = backward, 1.0 = forward).
    pub fn set_forward(&mut self, axis: f32) {
        self.forward = axis.clamp(-1.0, 1.0);
    }

    /// Set the lateral axis (-1.0 = left, 1.0 = right).
    pub fn set_strafe(&mut self, axis: f32) {
        self.strafe = axis.clamp(-1.0, 1.0);
    }

    /// Set whether the run modifier is held.
    pub fn set_run(&mut self, run: bool) {
        self.run = run;
    }

    /// Add a pointer delta for the camera to consume.
    pub fn add_look_delta(&mut self, delta: Vec2) {
        self.look_delta += delta;
    }

    /// Take the accumulated pointer delta, leaving zero behind.
    pub fn take_look_delta(&mut self) -> Vec2 {
        std::mem::take(&mut self.look_delta)
    }

    /// Set the jump state.
    ///
    /// Call this every frame with the current button state. A `false -> true`
    /// change latches a jump request; holding the button does not latch
    /// another one until it is released and pressed again.
    pub fn set_jump_pressed(&mut self, pressed: bool) {
        if pressed && !self.jump_pressed {
            self.jump_requested = true;
        }
        self.jump_pressed = pressed;
    }

    /// Consume the latched jump request, if any.
    pub fn take_jump_request(&mut self) -> bool {
        std::mem::take(&mut self.jump_requested)
    }

    /// Check if a jump request is latched.
    pub fn has_jump_request(&self) -> bool {
        self.jump_requested
    }

    /// Check if there is any directional input.
    pub fn has_direction(&self) -> bool {
        self.forward.abs() > AXIS_DEADZONE || self.strafe.abs() > AXIS_DEADZONE
    }

    /// Clear directional input and the run modifier.
    pub fn clear(&mut self) {
        self.forward = 0.0;
        self.strafe = 0.0;
        self.run = false;
    }
}

/// Keyboard bindings for the built-in input sampler.
///
/// Add this to an actor to have its [`MovementIntent`] filled from the
/// keyboard and mouse every frame.
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
pub struct InputBindings {
    pub forward: Vec<KeyCode>,
    pub backward: Vec<KeyCode>,
    pub left: Vec<KeyCode>,
    pub right: Vec<KeyCode>,
    pub run: Vec<KeyCode>,
    pub jump: Vec<KeyCode>,
}

impl Default for InputBindings {
    fn default() -> Self {
        Self {
            forward: vec![KeyCode::KeyW],
            backward: vec![KeyCode::KeyS],
            left: vec![KeyCode::KeyA],
            right: vec![KeyCode::KeyD],
            run: vec![KeyCode::ShiftLeft, KeyCode::ShiftRight],
            jump: vec![KeyCode::Space],
        }
    }
}

fn axis(keyboard: &ButtonInput<KeyCode>, negative: &[KeyCode], positive: &[KeyCode]) -> f32 {
    let mut value = 0.0;
    if keyboard.any_pressed(negative.iter().copied()) {
        value -= 1.0;
    }
    if keyboard.any_pressed(positive.iter().copied()) {
        value += 1.0;
    }
    value
}

/// Sample keyboard and mouse into the intent of every actor with bindings.
///
/// Raw axes are used (-1, 0 or 1), matching digital key input. Mouse y is
/// flipped so that moving the pointer up looks up.
pub fn sample_input(
    keyboard: Option<Res<ButtonInput<KeyCode>>>,
    mouse_motion: Option<Res<AccumulatedMouseMotion>>,
    mut q_actors: Query<(&InputBindings, &mut MovementIntent)>,
) {
    let mouse_delta = mouse_motion
        .map(|motion| Vec2::new(motion.delta.x, -motion.delta.y))
        .unwrap_or(Vec2::ZERO);

    for (bindings, mut intent) in &mut q_actors {
        if let Some(keyboard) = keyboard.as_deref() {
            intent.set_forward(axis(keyboard, &bindings.backward, &bindings.forward));
            intent.set_strafe(axis(keyboard, &bindings.left, &bindings.right));
            intent.set_run(keyboard.any_pressed(bindings.run.iter().copied()));
            intent.set_jump_pressed(keyboard.any_pressed(bindings.jump.iter().copied()));
        }
        intent.add_look_delta(mouse_delta);
    }
}
