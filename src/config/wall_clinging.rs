//! Configuration for wall cling mechanics.

use bevy::prelude::*;

/// Configuration for wall cling mechanics.
#[derive(Reflect, Debug, Clone, Copy)]
pub struct WallClingConfig {
    /// Per-tick damping applied to downward velocity while clinging
    /// (close to 0: near freeze, 1.0: normal fall).
    pub slow_factor: f32,

    /// If true, clinging happens whenever the character faces a wall;
    /// otherwise input toward the wall is required.
    pub input_independent: bool,

    /// Whether vertical velocity is zeroed when the cling starts.
    pub reset_vertical_speed_on_entry: bool,
}

impl Default for WallClingConfig {
    fn default() -> Self {
        Self {
            slow_factor: 0.2,
            input_independent: false,
            reset_vertical_speed_on_entry: true,
        }
    }
}
