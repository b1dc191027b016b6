//! Presentation signals for the animation layer.
//!
//! Write-only from gameplay's point of view: the ability systems refresh
//! this component at the end of every fixed tick and nothing reads it back.
//! Hook it up to whatever drives sprites or animation graphs.

use bevy::prelude::*;

/// Animation-facing signals for one character.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct AbilityAnimation {
    /// Charging on the ground.
    pub shrinking: bool,
    /// Charging while clinging to a wall.
    pub wall_shrinking: bool,
    /// Clinging to a wall.
    pub wall_clinging: bool,
    /// Seconds the bump button has been held.
    pub charge_time: f32,
    /// One-shot: a bump committed this tick.
    pub bumped: bool,
    /// One-shot: landed this tick.
    pub just_landed: bool,
}
