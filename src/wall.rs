//! Wall cling and wall jump.
//!
//! Clinging slows the fall while the character holds toward a wall; a tap of
//! the bump button while clinging fires a wall jump, and a full charge cycle
//! performs a wall bump through the same probe/commit path as a grounded
//! bump.

use bevy::prelude::*;

use crate::authorization::INPUT_THRESHOLD;
use crate::config::WallClingConfig;
use crate::state::CharacterState;

/// Per-character wall interaction state.
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
pub struct WallState {
    /// Currently clinging to a wall.
    pub clinging: bool,
    /// Facing captured when the cling started; the wall jump pushes the
    /// other way.
    pub facing_right_while_clinging: bool,
    /// Wall jumps left before the character has to land again.
    pub wall_jumps_left: u32,
    /// Set after a wall jump; cleared when clinging again or landing.
    pub has_wall_jumped: bool,
}

impl Default for WallState {
    fn default() -> Self {
        Self::new(1)
    }
}

impl WallState {
    /// Wall state with a full jump budget.
    pub fn new(max_wall_jumps: u32) -> Self {
        Self {
            clinging: false,
            facing_right_while_clinging: true,
            wall_jumps_left: max_wall_jumps,
            has_wall_jumped: false,
        }
    }

    /// Restore the jump budget (on landing).
    pub fn refill(&mut self, max_wall_jumps: u32) {
        self.wall_jumps_left = max_wall_jumps;
    }
}

/// Whether the character should enter (or stay in) a wall cling this tick.
///
/// Clinging requires being airborne, falling, and a wall on the side the
/// character is pushing toward (or simply the facing side when
/// `input_independent` is set).
pub fn should_cling(config: &WallClingConfig, state: &CharacterState, horizontal_input: f32) -> bool {
    if state.grounded || state.vertical_speed >= 0.0 {
        return false;
    }

    if config.input_independent {
        if state.facing_right {
            state.wall_right
        } else {
            state.wall_left
        }
    } else if horizontal_input <= -INPUT_THRESHOLD {
        state.wall_left
    } else if horizontal_input >= INPUT_THRESHOLD {
        state.wall_right
    } else {
        false
    }
}

/// Wall jump launch vector.
///
/// Pushes away from the clung wall; the vertical component converts the
/// configured jump height into a speed via `sqrt(2 * h * |g|)`, so the jump
/// reaches the same apex regardless of gravity tuning.
pub fn wall_jump_impulse(facing_right_while_clinging: bool, force: Vec2, gravity: f32) -> Vec2 {
    let direction = if facing_right_while_clinging { -1.0 } else { 1.0 };
    Vec2::new(
        direction * force.x,
        (2.0 * force.y * gravity.abs()).sqrt(),
    )
}
