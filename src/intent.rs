//! Ability input components.
//!
//! Game code feeds raw input in here (button state and movement axes); the
//! ability systems derive held/released edges themselves, once per fixed
//! tick.

use bevy::prelude::*;

use crate::authorization::INPUT_THRESHOLD;

/// Input state for the bump abilities of one character.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct AbilityIntent {
    /// Movement axes (-1.0 to 1.0 on each).
    pub move_axis: Vec2,
    bump_pressed: bool,
    bump_pressed_last_tick: bool,
}

impl AbilityIntent {
    /// Create an empty intent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current bump button state.
    pub fn set_bump_pressed(&mut self, pressed: bool) {
        self.bump_pressed = pressed;
    }

    /// Set the movement axes (clamped to -1.0..1.0).
    pub fn set_move(&mut self, axis: Vec2) {
        self.move_axis = axis.clamp(Vec2::NEG_ONE, Vec2::ONE);
    }

    /// Whether the bump button is currently down.
    pub fn bump_held(&self) -> bool {
        self.bump_pressed
    }

    /// Whether the bump button was released since the previous tick.
    pub fn bump_released(&self) -> bool {
        self.bump_pressed_last_tick && !self.bump_pressed
    }

    /// Whether there is active downward input.
    pub fn pressing_down(&self) -> bool {
        self.move_axis.y < -INPUT_THRESHOLD
    }

    /// Horizontal axis value.
    pub fn horizontal(&self) -> f32 {
        self.move_axis.x
    }

    /// Store the current button state for next tick's edge detection.
    /// Called at the end of each fixed tick.
    pub fn finish_tick(&mut self) {
        self.bump_pressed_last_tick = self.bump_pressed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_edge_spans_one_tick() {
        let mut intent = AbilityIntent::new();
        intent.set_bump_pressed(true);
        assert!(intent.bump_held());
        assert!(!intent.bump_released());
        intent.finish_tick();

        intent.set_bump_pressed(false);
        assert!(intent.bump_released());
        intent.finish_tick();

        // Edge is gone the tick after.
        assert!(!intent.bump_released());
    }

    #[test]
    fn no_release_edge_without_a_press() {
        let mut intent = AbilityIntent::new();
        assert!(!intent.bump_released());
        intent.finish_tick();
        assert!(!intent.bump_released());
    }

    #[test]
    fn move_axis_is_clamped() {
        let mut intent = AbilityIntent::new();
        intent.set_move(Vec2::new(5.0, -3.0));
        assert_eq!(intent.move_axis, Vec2::new(1.0, -1.0));
    }

    #[test]
    fn pressing_down_respects_the_threshold() {
        let mut intent = AbilityIntent::new();
        intent.set_move(Vec2::new(0.0, -0.05));
        assert!(!intent.pressing_down());
        intent.set_move(Vec2::new(0.0, -0.5));
        assert!(intent.pressing_down());
    }
}
