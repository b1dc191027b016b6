//! Configuration for wall jump mechanics.

use bevy::prelude::*;

/// How the wall jump impulse combines with the current velocity.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForceMode {
    /// Add the impulse to the current velocity.
    #[default]
    Add,
    /// Replace the current velocity with the impulse.
    Set,
}

/// Configuration for wall jump mechanics.
#[derive(Reflect, Debug, Clone, Copy)]
pub struct WallJumpConfig {
    /// Horizontal force and jump height of a wall jump. The vertical
    /// component is a height; the applied speed is `sqrt(2 * height * |g|)`.
    pub force: Vec2,

    /// How the impulse is applied.
    pub force_mode: ForceMode,

    /// Whether the number of wall jumps per airtime is limited.
    pub limited: bool,

    /// Maximum wall jumps before the character has to land again.
    pub max_wall_jumps: u32,

    /// Whether the character is flipped to face the jump direction.
    pub flip_towards_direction: bool,
}

impl Default for WallJumpConfig {
    fn default() -> Self {
        Self {
            force: Vec2::new(10.0, 4.0),
            force_mode: ForceMode::Add,
            limited: true,
            max_wall_jumps: 1,
            flip_towards_direction: false,
        }
    }
}
